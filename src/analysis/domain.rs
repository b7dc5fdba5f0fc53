//! # Detecção de Domínio por Palavras-Chave
//!
//! O [`DomainDetector`] pontua cada domínio configurado contando, para cada
//! palavra-chave e cada fato de entrada:
//!
//! - +1 se o **id** do fato contém a palavra-chave
//! - +1 se o **valor** do fato é texto e contém a palavra-chave
//!
//! A comparação é feita sobre texto normalizado (Unicode NFC + minúsculas),
//! então `"Café"` composto e decomposto casam igualmente.
//!
//! ## Desempate
//!
//! Os domínios são percorridos em ordem lexicográfica e só uma pontuação
//! **estritamente maior** troca o vencedor: empates ficam com o menor nome.
//! Sem sinais ou sem nenhum acerto, o domínio é [`DOMAIN_GENERAL`].

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use crate::core::{Fact, Value};
use crate::scoring::SolutionScore;

/// Domínio de negócio (texto livre; os nomes abaixo têm pesos prontos).
pub type Domain = String;

pub const DOMAIN_FINANCE: &str = "finance";
pub const DOMAIN_ECOMMERCE: &str = "ecommerce";
pub const DOMAIN_INFRASTRUCTURE: &str = "infrastructure";
pub const DOMAIN_DATA: &str = "data";
pub const DOMAIN_AIML: &str = "aiml";
pub const DOMAIN_GENERAL: &str = "general";

/// Detector de domínio: domínio → palavras-chave.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainDetector {
    #[serde(default)]
    pub signals: BTreeMap<Domain, Vec<String>>,
}

impl DomainDetector {
    /// Domínio com mais acertos nos fatos dados.
    pub fn detect(&self, facts: &HashMap<String, Fact>) -> Domain {
        // Normaliza ids e valores textuais uma única vez
        let haystacks: Vec<(String, Option<String>)> = facts
            .iter()
            .map(|(id, fact)| {
                let value = match &fact.value {
                    Value::String(s) => Some(normalize(s)),
                    _ => None,
                };
                (normalize(id), value)
            })
            .collect();

        let mut best = DOMAIN_GENERAL.to_string();
        let mut best_score = 0usize;

        for (domain, keywords) in &self.signals {
            let score: usize = keywords
                .iter()
                .map(|k| normalize(k))
                .filter(|k| !k.is_empty())
                .map(|keyword| {
                    haystacks
                        .iter()
                        .map(|(id, value)| {
                            usize::from(id.contains(&keyword))
                                + usize::from(value.as_ref().is_some_and(|v| v.contains(&keyword)))
                        })
                        .sum::<usize>()
                })
                .sum();

            tracing::trace!(domain = %domain, score, "Domínio pontuado");
            if score > best_score {
                best = domain.clone();
                best_score = score;
            }
        }

        best
    }
}

fn normalize(text: &str) -> String {
    text.nfc().collect::<String>().to_lowercase()
}

/// Pesos de pontuação prontos por domínio.
pub fn default_domain_weights() -> BTreeMap<Domain, SolutionScore> {
    BTreeMap::from([
        (DOMAIN_FINANCE.to_string(), SolutionScore::new(0.4, 0.2, 0.3, 0.1)),
        (DOMAIN_ECOMMERCE.to_string(), SolutionScore::new(0.3, 0.2, 0.2, 0.3)),
        (DOMAIN_INFRASTRUCTURE.to_string(), SolutionScore::new(0.2, 0.3, 0.3, 0.2)),
        (DOMAIN_DATA.to_string(), SolutionScore::new(0.3, 0.3, 0.2, 0.2)),
        (DOMAIN_AIML.to_string(), SolutionScore::new(0.3, 0.3, 0.2, 0.2)),
        (DOMAIN_GENERAL.to_string(), SolutionScore::uniform()),
    ])
}
