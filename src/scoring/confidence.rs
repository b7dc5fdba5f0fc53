//! Faixas de confiança.
//!
//! | Certeza | Nível |
//! |---------|-------|
//! | `≥ 0.8` | `high` |
//! | `≥ 0.5` | `medium` |
//! | demais | `low` |

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Mapeia uma certeza em `[0, 1]` para uma faixa.
pub fn compute_confidence(certainty: f64) -> ConfidenceLevel {
    if certainty >= 0.8 {
        ConfidenceLevel::High
    } else if certainty >= 0.5 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_boundaries() {
        assert_eq!(compute_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(compute_confidence(1.0), ConfidenceLevel::High);
        assert_eq!(compute_confidence(0.5), ConfidenceLevel::Medium);
        assert_eq!(compute_confidence(0.79), ConfidenceLevel::Medium);
        assert_eq!(compute_confidence(0.49), ConfidenceLevel::Low);
        assert_eq!(compute_confidence(0.0), ConfidenceLevel::Low);
    }

    #[test]
    fn fallback_certainty_maps_to_low() {
        assert_eq!(compute_confidence(0.3), ConfidenceLevel::Low);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ConfidenceLevel::Medium).unwrap(), "\"medium\"");
    }
}
