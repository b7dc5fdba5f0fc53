//! # Inference — Derivação de um Novo Fato
//!
//! Uma [`Inference`] produz **um** fato quando **todas** as suas regras
//! valem (conjunção com falha rápida, sem crédito parcial).
//!
//! ## Disparo
//!
//! ```text
//! regra 1 ──► regra 2 ──► ... ──► regra N      (em ordem; a primeira falsa aborta)
//!                                     │
//!                                     ▼
//!                  id   = fact_id     (ou expressão, se is_id_calculated)
//!                  valor = fact_value (ou expressão, se is_value_calculated)
//!                  derived_from = ∪ ids lidos por todas as expressões
//! ```
//!
//! ## Estatísticas
//!
//! `count_of_true` e `probability` são mantidas pelo motor, não pela
//! configuração. A cada disparo bem-sucedido:
//!
//! ```text
//! probability = (probability + count_of_true / running_count) / 2
//! ```
//!
//! `running_count` é o contador de sessões da KB (compartilhado por todas
//! as inferências). Um contador zerado usa denominador 1.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::rules::WeightedRule;
use crate::core::{Fact, Value, SOURCE_INFERRED};
use crate::error::{EngineError, EngineResult};
use crate::expr::Evaluator;

/// Derivação nomeada: regras ponderadas → um novo fato.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inference {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub rules: Vec<WeightedRule>,

    /// Id literal do fato produzido, ou expressão se `is_id_calculated`.
    pub fact_id: String,

    /// Valor literal do fato produzido, ou expressão se `is_value_calculated`.
    #[serde(default)]
    pub fact_value: Value,

    #[serde(default)]
    pub is_id_calculated: bool,

    #[serde(default)]
    pub is_value_calculated: bool,

    /// Prioridade na varredura (menor primeiro).
    #[serde(default)]
    pub order: i64,

    #[serde(default)]
    pub count_of_true: u64,

    #[serde(default)]
    pub probability: f64,
}

impl Inference {
    /// Tenta disparar a inferência e devolve o fato derivado.
    ///
    /// # Erros
    ///
    /// - [`EngineError::RuleFailed`] — uma regra avaliou para `false`
    /// - erros de expressão de qualquer regra ou do id/valor calculado
    /// - [`EngineError::NonStringFactId`] — id calculado não é texto
    pub fn infer(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> EngineResult<Fact> {
        let mut derived = BTreeSet::new();

        for rule in &self.rules {
            let (holds, referenced) = rule.evaluate(facts, evaluator)?;
            if !holds {
                return Err(EngineError::RuleFailed {
                    rule: rule_label(rule),
                });
            }
            derived.extend(referenced);
        }

        let (id, referenced) = self.resolve_fact_id(facts, evaluator)?;
        derived.extend(referenced);

        let (value, referenced) = self.resolve_fact_value(facts, evaluator)?;
        derived.extend(referenced);

        Ok(Fact {
            id,
            description: self.description.clone(),
            value,
            derived_from: derived.into_iter().collect(),
            accumulative: false,
            source: SOURCE_INFERRED.to_string(),
        })
    }

    /// Id alvo e os ids que o cálculo dele leu.
    pub fn resolve_fact_id(
        &self,
        facts: &HashMap<String, Fact>,
        evaluator: &Evaluator,
    ) -> EngineResult<(String, BTreeSet<String>)> {
        if !self.is_id_calculated {
            return Ok((self.fact_id.clone(), BTreeSet::new()));
        }
        let evaluation = evaluator.calculate(&self.fact_id, facts)?;
        match evaluation.value {
            Value::String(id) => Ok((id, evaluation.referenced)),
            _ => Err(EngineError::NonStringFactId {
                expression: self.fact_id.clone(),
            }),
        }
    }

    fn resolve_fact_value(
        &self,
        facts: &HashMap<String, Fact>,
        evaluator: &Evaluator,
    ) -> EngineResult<(Value, BTreeSet<String>)> {
        if !self.is_value_calculated {
            return Ok((self.fact_value.clone(), BTreeSet::new()));
        }
        let expression = self
            .fact_value
            .as_str()
            .ok_or(EngineError::NonStringValueExpression {
                found: self.fact_value.type_name(),
            })?;
        let evaluation = evaluator.calculate(expression, facts)?;
        Ok((evaluation.value, evaluation.referenced))
    }

    /// A inferência é necessária se **nenhum** fato tem id começando pelo id alvo.
    ///
    /// É prefixo, não igualdade: um fato `x` bloqueia tanto `x` quanto `x_foo`.
    /// Um id calculado que não resolve torna a inferência desnecessária.
    pub fn is_needed(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> bool {
        let id = match self.resolve_fact_id(facts, evaluator) {
            Ok((id, _)) => id,
            Err(e) => {
                tracing::trace!(inference = %self.description, error = %e, "id alvo não resolvido");
                return false;
            }
        };
        !facts.keys().any(|key| key.starts_with(id.as_str()))
    }

    /// Peso das regras satisfeitas sobre o peso total, em `[0, 1]`.
    pub fn certainty(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> f64 {
        let total: f64 = self.rules.iter().map(|r| r.weight).sum();
        if total <= 0.0 {
            return 0.0;
        }
        let satisfied: f64 = self
            .rules
            .iter()
            .filter(|r| r.is_satisfied(facts, evaluator))
            .map(|r| r.weight)
            .sum();
        (satisfied / total).clamp(0.0, 1.0)
    }

    /// Regras ainda não satisfeitas, da de menor peso para a de maior.
    pub fn pending_rules(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> Vec<&WeightedRule> {
        let mut pending: Vec<&WeightedRule> = self
            .rules
            .iter()
            .filter(|r| !r.is_satisfied(facts, evaluator))
            .collect();
        pending.sort_by(|a, b| a.weight.total_cmp(&b.weight));
        pending
    }

    /// Atualiza as estatísticas após um disparo bem-sucedido.
    pub fn record_success(&mut self, running_count: u64) {
        self.count_of_true += 1;
        let denominator = running_count.max(1) as f64;
        self.probability = (self.probability + self.count_of_true as f64 / denominator) / 2.0;
    }
}

fn rule_label(rule: &WeightedRule) -> String {
    if rule.description.is_empty() {
        rule.expression.clone()
    } else {
        rule.description.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::inference::Rule;

    fn facts(entries: &[(&str, Value)]) -> HashMap<String, Fact> {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), Fact::new(*id, v.clone())))
            .collect()
    }

    fn weighted(expression: &str, weight: f64) -> WeightedRule {
        WeightedRule::new(Rule::new(expression), weight)
    }

    fn urgency() -> Inference {
        Inference {
            description: "Febre alta".into(),
            rules: vec![weighted("temperature > 39", 1.0)],
            fact_id: "urgency".into(),
            fact_value: Value::from("red"),
            ..Default::default()
        }
    }

    #[test]
    fn fires_when_all_rules_hold() {
        let evaluator = Evaluator::new();
        let fact = urgency()
            .infer(&facts(&[("temperature", Value::from(41.0))]), &evaluator)
            .unwrap();
        assert_eq!(fact.id, "urgency");
        assert_eq!(fact.value, Value::from("red"));
        assert_eq!(fact.derived_from, vec!["temperature".to_string()]);
        assert_eq!(fact.source, SOURCE_INFERRED);
        assert_eq!(fact.description, "Febre alta");
    }

    #[test]
    fn first_false_rule_aborts() {
        let evaluator = Evaluator::new();
        let mut inference = urgency();
        inference.rules.insert(0, weighted("age < 2", 0.5));
        let env = facts(&[("temperature", Value::from(41.0)), ("age", Value::from(30.0))]);
        let err = inference.infer(&env, &evaluator).unwrap_err();
        assert!(matches!(err, EngineError::RuleFailed { ref rule } if rule == "age < 2"));
    }

    #[test]
    fn calculated_id_and_value_contribute_provenance() {
        let evaluator = Evaluator::new();
        let mut sale = BTreeMap::new();
        sale.insert("product".to_string(), Value::from("pizza"));
        sale.insert("price".to_string(), Value::from(100.0));
        let env = facts(&[("sale", Value::Map(sale)), ("bonus", Value::from(5.0))]);

        let inference = Inference {
            rules: vec![weighted("sale.price >= 100", 1.0)],
            fact_id: "'reward_' + sale.product".into(),
            is_id_calculated: true,
            fact_value: Value::from("bonus * 2"),
            is_value_calculated: true,
            ..Default::default()
        };
        let fact = inference.infer(&env, &evaluator).unwrap();
        assert_eq!(fact.id, "reward_pizza");
        assert_eq!(fact.value, Value::from(10.0));
        assert_eq!(fact.derived_from, vec!["bonus".to_string(), "sale".to_string()]);
    }

    #[test]
    fn non_string_calculated_id_is_rejected() {
        let evaluator = Evaluator::new();
        let inference = Inference {
            fact_id: "1 + 1".into(),
            is_id_calculated: true,
            ..Default::default()
        };
        let err = inference.infer(&facts(&[]), &evaluator).unwrap_err();
        assert!(matches!(err, EngineError::NonStringFactId { .. }));
    }

    /// Prefixo, não igualdade: `urgency_level` bloqueia a inferência de `urgency`.
    #[test]
    fn is_needed_uses_prefix_semantics() {
        let evaluator = Evaluator::new();
        let inference = urgency();
        assert!(inference.is_needed(&facts(&[("temperature", Value::from(41.0))]), &evaluator));
        assert!(!inference.is_needed(&facts(&[("urgency", Value::from("red"))]), &evaluator));
        assert!(!inference.is_needed(&facts(&[("urgency_level", Value::from(3.0))]), &evaluator));
        // O contrário não bloqueia
        assert!(inference.is_needed(&facts(&[("urg", Value::from(1.0))]), &evaluator));
    }

    #[test]
    fn certainty_is_satisfied_weight_over_total() {
        let evaluator = Evaluator::new();
        let inference = Inference {
            rules: vec![weighted("a", 1.0), weighted("b", 3.0)],
            fact_id: "c".into(),
            ..Default::default()
        };
        let env = facts(&[("a", Value::from(true)), ("b", Value::from(false))]);
        assert!((inference.certainty(&env, &evaluator) - 0.25).abs() < 1e-9);

        let empty = Inference::default();
        assert_eq!(empty.certainty(&env, &evaluator), 0.0);
    }

    #[test]
    fn pending_rules_sorted_by_weight() {
        let evaluator = Evaluator::new();
        let inference = Inference {
            rules: vec![weighted("heavy", 0.9), weighted("done", 0.1), weighted("light", 0.2)],
            fact_id: "x".into(),
            ..Default::default()
        };
        let env = facts(&[("done", Value::from(true))]);
        let pending: Vec<&str> = inference
            .pending_rules(&env, &evaluator)
            .iter()
            .map(|r| r.expression.as_str())
            .collect();
        assert_eq!(pending, vec!["light", "heavy"]);
    }

    #[test]
    fn record_success_smooths_probability() {
        let mut inference = urgency();
        inference.record_success(2);
        assert_eq!(inference.count_of_true, 1);
        assert!((inference.probability - 0.25).abs() < 1e-9);
        inference.record_success(2);
        assert!((inference.probability - 0.625).abs() < 1e-9);
    }

    #[test]
    fn zero_running_count_uses_unit_denominator() {
        let mut inference = urgency();
        inference.record_success(0);
        assert!((inference.probability - 0.5).abs() < 1e-9);
    }
}
