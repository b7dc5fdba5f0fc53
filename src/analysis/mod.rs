//! # Módulo Analysis — Analisadores Plugáveis do Pipeline
//!
//! Cada analisador é uma **lista de regras em dados** avaliada pelo mesmo
//! [`Evaluator`](crate::expr::Evaluator) da KB. Nenhum deles guarda estado.
//!
//! | Analisador | Entrada | Saída |
//! |------------|---------|-------|
//! | [`DomainDetector`] | fatos de entrada | domínio |
//! | [`IntentClassifier`] | fatos de entrada | [`Intent`] |
//! | [`EntityExtractor`] | fatos de entrada | [`Entity`]s (viram fatos) |
//! | [`ConstraintSet`] | fatos da KB | restrições ativas |
//! | [`RiskAnalyzer`] | KB inteira | [`Risk`]s |

pub mod constraint;
pub mod domain;
pub mod extractor;
pub mod intent;
pub mod risk;

pub use constraint::{Constraint, ConstraintSet, ConstraintType};
pub use domain::{default_domain_weights, Domain, DomainDetector, DOMAIN_GENERAL};
pub use extractor::{Entity, EntityExtractor, ExtractionRule};
pub use intent::{Intent, IntentClassifier, IntentRule, IntentType};
pub use risk::{Risk, RiskAnalyzer, RiskLevel};
