//! # Módulo Inference — Regras e Derivações
//!
//! Este módulo contém a parte **declarativa** do motor: predicados
//! ([`Rule`], [`WeightedRule`]) e derivações ([`Inference`]). Quem decide
//! *quando* disparar cada inferência é a varredura da
//! [`KnowledgeBase`](crate::core::KnowledgeBase).
//!
//! ## Exemplo
//!
//! ```text
//! Inferência "Febre alta" (order 1)
//!   regra: temperature > 39   (peso 1.0)
//!   ⇒ urgency = "red"
//!
//! KB contém temperature = 41.0
//! Varredura produz urgency = "red", derived_from = [temperature]
//! ```

/// Sub-módulo com [`Rule`] e [`WeightedRule`].
pub mod rules;

/// Sub-módulo com [`Inference`].
pub mod engine;

pub use engine::Inference;
pub use rules::{Rule, WeightedRule};
