//! Conclusões: resultados candidatos sustentados por um padrão de fatos.
//!
//! Duas leituras do mesmo padrão, para chamadores diferentes:
//!
//! | Método | Fato ausente | Fato divergente | Padrão vazio |
//! |--------|--------------|-----------------|--------------|
//! | [`Conclusion::assert`] | `false` | `false` | `false` |
//! | [`Conclusion::certainty`] | crédito parcial | `0` imediato | `0` |

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::Fact;

/// Resultado nomeado, sustentado por fatos.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conclusion {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub facts: Vec<Fact>,
}

impl Conclusion {
    /// Passa/falha estrito: todo padrão presente e igual.
    ///
    /// Padrão vazio é `false`, não verdade vacuosa: uma conclusão sem fatos
    /// nunca é sustentada.
    pub fn assert(&self, facts: &HashMap<String, Fact>) -> bool {
        !self.facts.is_empty()
            && self
                .facts
                .iter()
                .all(|pattern| facts.get(&pattern.id).is_some_and(|f| f.value == pattern.value))
    }

    /// Fração dos padrões presentes e iguais; qualquer divergência zera.
    pub fn certainty(&self, facts: &HashMap<String, Fact>) -> f64 {
        if self.facts.is_empty() {
            return 0.0;
        }
        let mut matched = 0usize;
        for pattern in &self.facts {
            match facts.get(&pattern.id) {
                None => continue,
                Some(f) if f.value != pattern.value => return 0.0,
                Some(_) => matched += 1,
            }
        }
        matched as f64 / self.facts.len() as f64
    }
}
