//! # Regras — Predicados sobre Fatos
//!
//! Uma [`Rule`] é um **predicado puro**: uma expressão booleana avaliada
//! sobre o ambiente `id do fato → valor`. A [`WeightedRule`] acrescenta um
//! peso, usado para ordenar regras pendentes e para medir a certeza de uma
//! [`Inference`](super::Inference).
//!
//! ## Resultado da Avaliação
//!
//! | Situação | [`Rule::evaluate`] |
//! |----------|--------------------|
//! | Expressão verdadeira | `Ok((true, referenciados))` |
//! | Expressão falsa | `Ok((false, referenciados))` |
//! | Fato ausente / sintaxe | `Err(ExpressionCompile)` |
//! | Erro de execução | `Err(ExpressionRuntime)` |
//! | Resultado não booleano | `Err(NonBooleanRuleResult)` |
//!
//! Para quem só quer saber "vale ou não vale", [`Rule::is_satisfied`]
//! colapsa todos os erros em `false`: um fato ausente é indistinguível de
//! um predicado falso.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::{Fact, Value};
use crate::error::{EngineError, EngineResult};
use crate::expr::Evaluator;

/// Predicado sobre os fatos atuais.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub expression: String,

    /// Fato que, se informado, tende a satisfazer esta regra.
    #[serde(default)]
    pub fact_target_id: String,

    #[serde(default)]
    pub description: String,

    /// Pergunta exibida ao usuário quando a regra não é satisfeita.
    #[serde(default)]
    pub question: String,
}

impl Rule {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            ..Default::default()
        }
    }

    /// Avalia a regra e devolve o booleano e os ids lidos.
    pub fn evaluate(
        &self,
        facts: &HashMap<String, Fact>,
        evaluator: &Evaluator,
    ) -> EngineResult<(bool, BTreeSet<String>)> {
        let evaluation = evaluator.calculate(&self.expression, facts)?;
        match evaluation.value {
            Value::Bool(b) => Ok((b, evaluation.referenced)),
            _ => Err(EngineError::NonBooleanRuleResult {
                expression: self.expression.clone(),
            }),
        }
    }

    /// `true` somente se a regra avalia sem erro para `true`.
    pub fn is_satisfied(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> bool {
        matches!(self.evaluate(facts, evaluator), Ok((true, _)))
    }
}

/// Regra com peso.
///
/// No JSON os campos de [`Rule`] ficam achatados ao lado de `weight`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightedRule {
    #[serde(flatten)]
    pub rule: Rule,

    #[serde(default)]
    pub weight: f64,
}

impl WeightedRule {
    pub fn new(rule: Rule, weight: f64) -> Self {
        Self { rule, weight }
    }
}

impl std::ops::Deref for WeightedRule {
    type Target = Rule;

    fn deref(&self) -> &Rule {
        &self.rule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(entries: &[(&str, Value)]) -> HashMap<String, Fact> {
        entries
            .iter()
            .map(|(id, v)| (id.to_string(), Fact::new(*id, v.clone())))
            .collect()
    }

    #[test]
    fn true_rule_reports_referenced_ids() {
        let evaluator = Evaluator::new();
        let rule = Rule::new("temperature > 39");
        let (ok, referenced) = rule
            .evaluate(&facts(&[("temperature", Value::from(41.0))]), &evaluator)
            .unwrap();
        assert!(ok);
        assert!(referenced.contains("temperature"));
    }

    #[test]
    fn non_boolean_result_is_an_error() {
        let evaluator = Evaluator::new();
        let rule = Rule::new("temperature + 1");
        let err = rule
            .evaluate(&facts(&[("temperature", Value::from(41.0))]), &evaluator)
            .unwrap_err();
        assert!(matches!(err, EngineError::NonBooleanRuleResult { .. }));
    }

    /// Fato ausente e predicado falso são iguais para `is_satisfied`.
    #[test]
    fn missing_fact_and_false_are_both_unsatisfied() {
        let evaluator = Evaluator::new();
        let rule = Rule::new("temperature > 39");
        assert!(!rule.is_satisfied(&facts(&[]), &evaluator));
        assert!(!rule.is_satisfied(&facts(&[("temperature", Value::from(36.5))]), &evaluator));
    }

    #[test]
    fn weighted_rule_json_is_flat() {
        let json = r#"{"expression": "age >= 18", "fact_target_id": "age",
                       "question": "Qual a idade?", "weight": 0.7}"#;
        let rule: WeightedRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.expression, "age >= 18");
        assert_eq!(rule.fact_target_id, "age");
        assert_eq!(rule.weight, 0.7);
    }
}
