//! # Análise de Riscos
//!
//! Três fontes de risco, nesta ordem:
//!
//! 1. Riscos configurados cuja expressão avalia para `true` (erros pulam o item)
//! 2. Um risco **alto** por contradição detectada nos fatos atuais
//! 3. Um risco **médio** por conclusão com certeza em `(0, 0.5)`

use serde::{Deserialize, Serialize};

use crate::core::{KnowledgeBase, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Risk {
    #[serde(default)]
    pub description: String,

    pub level: RiskLevel,

    /// Vazia nos riscos sintetizados.
    #[serde(default)]
    pub expression: String,

    #[serde(default)]
    pub mitigation: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalyzer {
    #[serde(default)]
    pub risks: Vec<Risk>,
}

impl RiskAnalyzer {
    /// Riscos disparados pelo estado atual da KB.
    pub fn analyze(&self, kb: &KnowledgeBase) -> Vec<Risk> {
        let evaluator = kb.evaluator();

        let mut triggered: Vec<Risk> = self
            .risks
            .iter()
            .filter(|risk| match evaluator.calculate(&risk.expression, &kb.facts) {
                Ok(evaluation) => evaluation.value == Value::Bool(true),
                Err(e) => {
                    tracing::trace!(risk = %risk.description, error = %e, "Risco não avaliado");
                    false
                }
            })
            .cloned()
            .collect();

        triggered.extend(
            kb.contradictions
                .iter()
                .filter(|c| c.detect(&kb.facts))
                .map(|c| Risk {
                    description: format!("Active contradiction: {}", c.description),
                    level: RiskLevel::High,
                    expression: String::new(),
                    mitigation: "Resolve conflicting facts".to_string(),
                }),
        );

        triggered.extend(
            kb.conclusions
                .iter()
                .filter(|c| {
                    let certainty = c.certainty(&kb.facts);
                    certainty > 0.0 && certainty < 0.5
                })
                .map(|c| Risk {
                    description: format!("Low certainty conclusion: {}", c.description),
                    level: RiskLevel::Medium,
                    expression: String::new(),
                    mitigation: "Gather additional evidence".to_string(),
                }),
        );

        triggered
    }
}
