//! Restrições rígidas e flexíveis.
//!
//! Uma restrição é **ativa** quando sua expressão avalia sem erro sobre os
//! fatos atuais, qualquer que seja o resultado. Restrições ativas não
//! satisfeitas viram trade-offs (rígidas) ou suposições (flexíveis) no
//! relatório do pipeline.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Fact, Value};
use crate::error::EngineResult;
use crate::expr::Evaluator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintType {
    /// Precisa ser satisfeita.
    Hard,
    /// Deveria ser satisfeita.
    Soft,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    #[serde(default)]
    pub description: String,

    #[serde(rename = "type")]
    pub constraint_type: ConstraintType,

    pub expression: String,

    #[serde(default)]
    pub weight: f64,
}

impl Constraint {
    /// Avalia a restrição. Resultado não booleano conta como não satisfeita.
    pub fn satisfied(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> EngineResult<bool> {
        let evaluation = evaluator.calculate(&self.expression, facts)?;
        Ok(evaluation.value == Value::Bool(true))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Restrições ativas, cada uma com seu resultado.
    pub fn identify(&self, facts: &HashMap<String, Fact>, evaluator: &Evaluator) -> Vec<(Constraint, bool)> {
        self.constraints
            .iter()
            .filter_map(|c| match c.satisfied(facts, evaluator) {
                Ok(satisfied) => Some((c.clone(), satisfied)),
                Err(e) => {
                    tracing::trace!(constraint = %c.description, error = %e, "Restrição inativa");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(list: Vec<Fact>) -> HashMap<String, Fact> {
        list.into_iter().map(|f| (f.id.clone(), f)).collect()
    }

    fn constraint(description: &str, constraint_type: ConstraintType, expression: &str) -> Constraint {
        Constraint {
            description: description.into(),
            constraint_type,
            expression: expression.into(),
            weight: 1.0,
        }
    }

    #[test]
    fn only_evaluable_constraints_are_active() {
        let set = ConstraintSet {
            constraints: vec![
                constraint("Orçamento", ConstraintType::Hard, "budget <= 1000"),
                constraint("Prazo", ConstraintType::Soft, "deadline_days > 30"),
                constraint("Quebrada", ConstraintType::Soft, "budget / 0 > 1"),
            ],
        };
        let input = facts(vec![Fact::new("budget", 5000.0)]);
        let active = set.identify(&input, &Evaluator::new());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].0.description, "Orçamento");
        assert!(!active[0].1);
    }

    #[test]
    fn non_boolean_counts_as_unsatisfied() {
        let c = constraint("Valor", ConstraintType::Soft, "budget * 2");
        let input = facts(vec![Fact::new("budget", 5.0)]);
        assert!(!c.satisfied(&input, &Evaluator::new()).unwrap());
    }

    #[test]
    fn type_field_is_lowercase() {
        let c: Constraint =
            serde_json::from_str(r#"{"description": "x", "type": "hard", "expression": "a"}"#).unwrap();
        assert_eq!(c.constraint_type, ConstraintType::Hard);
        assert!(serde_json::from_str::<Constraint>(r#"{"type": "maybe", "expression": "a"}"#).is_err());
    }
}
