//! # Classificador de Intenção por Regras
//!
//! O [`IntentClassifier`] avalia uma lista de regras booleanas sobre os
//! fatos de entrada e escolhe a de **maior peso** que casou.
//!
//! | Situação | Resultado |
//! |----------|-----------|
//! | Sem regras / nenhuma casou | `query` ("default") |
//! | Várias casaram | maior peso; empate fica com a primeira |
//! | Regra cita fato ausente | regra ignorada |
//! | Resultado não booleano | regra ignorada |
//! | Erro de sintaxe ou de execução | **erro** (configuração quebrada) |

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::{Fact, Value};
use crate::error::{EngineError, EngineResult};
use crate::expr::Evaluator;

/// Tipo de intenção.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentType {
    #[default]
    Query,
    Decision,
    Analysis,
    Action,
}

impl IntentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::Query => "query",
            IntentType::Decision => "decision",
            IntentType::Analysis => "analysis",
            IntentType::Action => "action",
        }
    }
}

impl std::fmt::Display for IntentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Intenção classificada.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    #[serde(rename = "type")]
    pub intent_type: IntentType,

    pub description: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            intent_type: IntentType::Query,
            description: "default".to_string(),
            context: BTreeMap::new(),
        }
    }
}

/// Expressão → tipo de intenção, com peso.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub expression: String,
    pub intent_type: IntentType,
    #[serde(default)]
    pub weight: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntentClassifier {
    #[serde(default)]
    pub rules: Vec<IntentRule>,
}

impl IntentClassifier {
    /// Classifica os fatos de entrada.
    ///
    /// A descrição da intenção escolhida é a própria expressão da regra.
    pub fn classify(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> EngineResult<Intent> {
        let mut best: Option<&IntentRule> = None;

        for rule in &self.rules {
            let evaluation = match evaluator.calculate(&rule.expression, facts) {
                Ok(evaluation) => evaluation,
                Err(e) => {
                    let err = EngineError::from(e);
                    if err.is_missing_fact() {
                        tracing::trace!(expression = %rule.expression, error = %err, "Regra de intent ignorada");
                        continue;
                    }
                    return Err(err);
                }
            };

            if evaluation.value != Value::Bool(true) {
                continue;
            }
            if best.map_or(true, |b| rule.weight > b.weight) {
                best = Some(rule);
            }
        }

        Ok(best.map_or_else(Intent::default, |rule| Intent {
            intent_type: rule.intent_type,
            description: rule.expression.clone(),
            context: BTreeMap::new(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(list: Vec<Fact>) -> HashMap<String, Fact> {
        list.into_iter().map(|f| (f.id.clone(), f)).collect()
    }

    fn rule(expression: &str, intent_type: IntentType, weight: f64) -> IntentRule {
        IntentRule {
            expression: expression.into(),
            intent_type,
            weight,
        }
    }

    #[test]
    fn higher_weight_wins() {
        let classifier = IntentClassifier {
            rules: vec![
                rule("action == true", IntentType::Action, 1.0),
                rule("query == true", IntentType::Query, 0.5),
            ],
        };
        let input = facts(vec![Fact::new("action", true), Fact::new("query", true)]);
        let intent = classifier.classify(&input, &Evaluator::new()).unwrap();
        assert_eq!(intent.intent_type, IntentType::Action);
        assert_eq!(intent.description, "action == true");
    }

    #[test]
    fn ties_keep_first_match() {
        let classifier = IntentClassifier {
            rules: vec![
                rule("a", IntentType::Analysis, 0.5),
                rule("b", IntentType::Decision, 0.5),
            ],
        };
        let input = facts(vec![Fact::new("a", true), Fact::new("b", true)]);
        let intent = classifier.classify(&input, &Evaluator::new()).unwrap();
        assert_eq!(intent.intent_type, IntentType::Analysis);
    }

    #[test]
    fn no_rules_or_no_match_is_default_query() {
        let input = facts(vec![Fact::new("a", false)]);
        let evaluator = Evaluator::new();
        assert_eq!(IntentClassifier::default().classify(&input, &evaluator).unwrap(), Intent::default());

        let classifier = IntentClassifier {
            rules: vec![rule("a", IntentType::Action, 1.0)],
        };
        let intent = classifier.classify(&input, &evaluator).unwrap();
        assert_eq!(intent.intent_type, IntentType::Query);
        assert_eq!(intent.description, "default");
    }

    #[test]
    fn missing_facts_and_non_booleans_are_skipped() {
        let classifier = IntentClassifier {
            rules: vec![
                rule("budget > 100", IntentType::Decision, 2.0),
                rule("a + 1", IntentType::Analysis, 1.5),
                rule("a > 0", IntentType::Action, 0.0),
            ],
        };
        let input = facts(vec![Fact::new("a", 3.0)]);
        let intent = classifier.classify(&input, &Evaluator::new()).unwrap();
        assert_eq!(intent.intent_type, IntentType::Action, "peso 0 ainda vence sozinho");
    }

    #[test]
    fn runtime_error_aborts_classification() {
        let classifier = IntentClassifier {
            rules: vec![rule("a / 0 > 1", IntentType::Action, 1.0)],
        };
        let input = facts(vec![Fact::new("a", 3.0)]);
        let err = classifier.classify(&input, &Evaluator::new()).unwrap_err();
        assert!(matches!(err, EngineError::ExpressionRuntime(_)));
    }

    #[test]
    fn unknown_intent_type_fails_to_parse() {
        let json = r#"{"expression": "a", "intent_type": "wish", "weight": 1}"#;
        assert!(serde_json::from_str::<IntentRule>(json).is_err());
    }

    #[test]
    fn intent_serializes_type_and_omits_empty_context() {
        let json = serde_json::to_value(Intent::default()).unwrap();
        assert_eq!(json["type"], "query");
        assert!(json.get("context").is_none());
    }
}
