//! # Extração de Entidades
//!
//! Cada [`ExtractionRule`] é uma expressão (não precisa ser booleana)
//! avaliada sobre os fatos de entrada. O resultado vira uma [`Entity`],
//! que o pipeline insere na KB como fato de origem `extracted`.
//!
//! ```text
//! regra { fact_id: "customer_tier", expression: "total > 1000 ? 'gold' : 'silver'" }
//!   └─► Entity { fact_id: "customer_tier", value: "gold", source, confidence }
//! ```
//!
//! Resultados `nil` ou `false` são descartados. Regras que citam fatos
//! ausentes são ignoradas; outros erros de expressão abortam a extração.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Fact, Value};
use crate::error::{EngineError, EngineResult};
use crate::expr::Evaluator;

/// Entidade extraída dos fatos de entrada.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub fact_id: String,
    pub value: Value,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Como extrair uma entidade.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRule {
    pub fact_id: String,
    pub expression: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityExtractor {
    #[serde(default)]
    pub rules: Vec<ExtractionRule>,
}

impl EntityExtractor {
    /// Avalia todas as regras, na ordem em que foram declaradas.
    pub fn extract(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> EngineResult<Vec<Entity>> {
        let mut entities = Vec::new();

        for rule in &self.rules {
            let value = match evaluator.calculate(&rule.expression, facts) {
                Ok(evaluation) => evaluation.value,
                Err(e) => {
                    let err = EngineError::from(e);
                    if err.is_missing_fact() {
                        tracing::trace!(fact_id = %rule.fact_id, error = %err, "Regra de extração ignorada");
                        continue;
                    }
                    return Err(err);
                }
            };

            if matches!(value, Value::Null | Value::Bool(false)) {
                continue;
            }

            entities.push(Entity {
                fact_id: rule.fact_id.clone(),
                value,
                source: rule.source.clone(),
                confidence: rule.confidence,
            });
        }

        Ok(entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(list: Vec<Fact>) -> HashMap<String, Fact> {
        list.into_iter().map(|f| (f.id.clone(), f)).collect()
    }

    fn rule(fact_id: &str, expression: &str) -> ExtractionRule {
        ExtractionRule {
            fact_id: fact_id.into(),
            expression: expression.into(),
            source: "rule".into(),
            confidence: 0.9,
        }
    }

    #[test]
    fn extracts_non_boolean_values() {
        let extractor = EntityExtractor {
            rules: vec![rule("tier", "total > 1000 ? 'gold' : 'silver'")],
        };
        let input = facts(vec![Fact::new("total", 1500.0)]);
        let entities = extractor.extract(&input, &Evaluator::new()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].fact_id, "tier");
        assert_eq!(entities[0].value, Value::from("gold"));
        assert_eq!(entities[0].source, "rule");
        assert_eq!(entities[0].confidence, 0.9);
    }

    #[test]
    fn nil_and_false_are_discarded_but_true_is_kept() {
        let extractor = EntityExtractor {
            rules: vec![
                rule("missing_field", "order.coupon"),
                rule("big", "total > 5000"),
                rule("positive", "total > 0"),
            ],
        };
        let mut order = std::collections::BTreeMap::new();
        order.insert("id".to_string(), Value::from(7.0));
        let input = facts(vec![Fact::new("total", 10.0), Fact::new("order", Value::Map(order))]);
        let entities = extractor.extract(&input, &Evaluator::new()).unwrap();
        let ids: Vec<&str> = entities.iter().map(|e| e.fact_id.as_str()).collect();
        assert_eq!(ids, vec!["positive"]);
    }

    #[test]
    fn missing_fact_skips_rule() {
        let extractor = EntityExtractor {
            rules: vec![rule("x", "absent * 2"), rule("y", "total * 2")],
        };
        let input = facts(vec![Fact::new("total", 2.0)]);
        let entities = extractor.extract(&input, &Evaluator::new()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].value, Value::from(4.0));
    }

    #[test]
    fn syntax_error_aborts() {
        let extractor = EntityExtractor {
            rules: vec![rule("x", "total * ")],
        };
        let input = facts(vec![Fact::new("total", 2.0)]);
        assert!(extractor.extract(&input, &Evaluator::new()).is_err());
    }
}
