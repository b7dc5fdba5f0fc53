//! # Pontuação e Ranking de Soluções
//!
//! Cada conclusão sustentada vira uma solução com quatro notas em `[0, 1]`.
//! Complexidade e risco são **invertidos** antes de pesar (menor é melhor):
//!
//! ```text
//! composite = bi·w.bi + (1 − ic)·w.ic + (1 − rl)·w.rl + ttv·w.ttv
//! ```
//!
//! O ranking é uma ordenação **estável** decrescente: empates mantêm a
//! ordem de entrada.

use serde::{Deserialize, Serialize};

use crate::reasoning::Conclusion;

/// Notas de uma solução, ou pesos de cada dimensão.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SolutionScore {
    #[serde(default)]
    pub business_impact: f64,
    #[serde(default)]
    pub implementation_complexity: f64,
    #[serde(default)]
    pub risk_level: f64,
    #[serde(default)]
    pub time_to_value: f64,
}

impl SolutionScore {
    pub fn new(business_impact: f64, implementation_complexity: f64, risk_level: f64, time_to_value: f64) -> Self {
        Self {
            business_impact,
            implementation_complexity,
            risk_level,
            time_to_value,
        }
    }

    /// Pesos iguais (0.25 cada).
    pub fn uniform() -> Self {
        Self::new(0.25, 0.25, 0.25, 0.25)
    }

    pub fn composite(&self, weights: &SolutionScore) -> f64 {
        self.business_impact * weights.business_impact
            + (1.0 - self.implementation_complexity) * weights.implementation_complexity
            + (1.0 - self.risk_level) * weights.risk_level
            + self.time_to_value * weights.time_to_value
    }
}

/// Conclusão com suas notas e nota composta.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedSolution {
    pub conclusion: Conclusion,
    pub score: SolutionScore,
    #[serde(default)]
    pub composite_score: f64,
}

impl RankedSolution {
    pub fn new(conclusion: Conclusion, score: SolutionScore) -> Self {
        Self {
            conclusion,
            score,
            composite_score: 0.0,
        }
    }
}

/// Calcula a nota composta de cada solução e ordena da maior para a menor.
pub fn rank_solutions(mut solutions: Vec<RankedSolution>, weights: &SolutionScore) -> Vec<RankedSolution> {
    for solution in &mut solutions {
        solution.composite_score = solution.score.composite(weights);
    }
    solutions.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));
    solutions
}
