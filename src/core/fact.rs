//! # Fact — Dado Nomeado da Base de Conhecimento
//!
//! Um [`Fact`] é um valor com nome (`id`), descrição e **proveniência**.
//!
//! ## Ciclo de Vida
//!
//! ```text
//!  entrada direta ──┐
//!  extração ────────┼──► facts[id] ──► sobrescrita / invalidação / contradição
//!  inferência ──────┘
//! ```
//!
//! - `derived_from` lista os ids que uma inferência **leu** para produzir
//!   este fato. Quando um desses ids muda, o fato é removido (um nível só).
//! - `accumulative` isenta o fato dessa remoção (contadores, agregados).
//!
//! ## Padrões
//!
//! [`Contradiction`](crate::reasoning::Contradiction) e
//! [`Conclusion`](crate::reasoning::Conclusion) também usam `Fact` como
//! **padrão**: só `id` e `value` importam para o casamento
//! (ver [`Fact::matches`]).

use serde::{Deserialize, Serialize};

use super::Value;

/// Origem de um fato informado diretamente pelo chamador.
pub const SOURCE_INPUT: &str = "input";
/// Origem de um fato criado pela extração de entidades.
pub const SOURCE_EXTRACTED: &str = "extracted";
/// Origem de um fato produzido por uma inferência.
pub const SOURCE_INFERRED: &str = "inferred";

/// Fato da base de conhecimento.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Chave de busca. Único apenas dentro do mapa vivo de fatos.
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub value: Value,

    /// Ids lidos pela inferência que criou este fato.
    #[serde(default)]
    pub derived_from: Vec<String>,

    /// Se `true`, sobrevive à invalidação quando um ancestral muda.
    #[serde(default)]
    pub accumulative: bool,

    /// `input`, `extracted`, `inferred` ou vazio.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
}

impl Fact {
    /// Cria um fato simples, sem descrição nem proveniência.
    pub fn new(id: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            value: value.into(),
            derived_from: Vec::new(),
            accumulative: false,
            source: String::new(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn derived_from<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derived_from = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn accumulative(mut self, accumulative: bool) -> Self {
        self.accumulative = accumulative;
        self
    }

    /// `true` se `id` aparece diretamente em `derived_from`.
    pub fn depends_on(&self, id: &str) -> bool {
        self.derived_from.iter().any(|d| d == id)
    }
}
