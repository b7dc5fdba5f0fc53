//! # Relatório Estruturado do Pipeline
//!
//! [`PipelineResult`] é o que um `run` devolve ao chamador (e o que a API
//! HTTP serializa). Todos os campos são dados prontos, sem referência à KB.
//!
//! ```json
//! {
//!   "result": "Critical patient",
//!   "reasoning": { "signals": [..], "assumptions": [..], "tradeoffs": [..] },
//!   "confidence": "high",
//!   "follow_up": { "missing_data": [..], "next_actions": [..] },
//!   "domain": "general",
//!   "intent": { "type": "query", "description": "default" },
//!   "entities": [..], "constraints": [..], "risks": [..], "solutions": [..]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::analysis::{Constraint, Domain, Entity, Intent, Risk};
use crate::scoring::{ConfidenceLevel, RankedSolution};

/// Texto de `result` quando nenhuma conclusão se sustenta.
pub const NO_CONCLUSIONS: &str = "No conclusions reached";

/// Cadeia de explicação.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Reasoning {
    pub signals: Vec<String>,
    pub assumptions: Vec<String>,
    pub tradeoffs: Vec<String>,
}

/// O que ainda falta depois do run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowUp {
    /// Ids de fatos que ajudariam e não existem.
    pub missing_data: Vec<String>,
    /// Perguntas das regras pendentes.
    pub next_actions: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub result: String,
    pub reasoning: Reasoning,
    pub confidence: ConfidenceLevel,
    pub follow_up: FollowUp,
    pub domain: Domain,
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub constraints: Vec<Constraint>,
    pub risks: Vec<Risk>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub solutions: Vec<RankedSolution>,
}
