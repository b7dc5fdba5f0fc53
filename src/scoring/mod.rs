//! # Módulo Scoring — Confiança e Ranking
//!
//! - [`compute_confidence`] — certeza `[0, 1]` → [`ConfidenceLevel`]
//! - [`SolutionScore`] / [`rank_solutions`] — nota multicritério e ranking

pub mod confidence;
pub mod solution;

pub use confidence::{compute_confidence, ConfidenceLevel};
pub use solution::{rank_solutions, RankedSolution, SolutionScore};
