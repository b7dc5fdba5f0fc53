//! # Módulo Core — Fatos e a Base de Conhecimento
//!
//! Tipos fundamentais sobre os quais todo o resto opera:
//!
//! - [`Value`] — valor dinâmico fechado (bool, número, texto, lista, estrutura)
//! - [`Fact`] — dado nomeado com proveniência (`derived_from`) e flag `accumulative`
//! - [`KnowledgeBase`] — Fact Store da sessão, varredura de inferência e
//!   resolução de contradições
//!
//! ## Exemplo de Uso
//!
//! ```rust,ignore
//! use crate::core::{Fact, KnowledgeBase};
//!
//! let mut kb: KnowledgeBase = serde_json::from_str(DEFINICAO)?;
//! kb.start();
//! kb.add_fact(Fact::new("temperature", 41.0));
//!
//! for conclusion in kb.true_conclusions() {
//!     println!("{}", conclusion.description);
//! }
//! ```

/// Sub-módulo com [`Value`].
pub mod value;

/// Sub-módulo com [`Fact`] e as constantes de origem.
pub mod fact;

/// Sub-módulo com [`KnowledgeBase`].
pub mod knowledge_base;

pub use fact::{Fact, SOURCE_EXTRACTED, SOURCE_INFERRED, SOURCE_INPUT};
pub use knowledge_base::{remove_derived_from, KnowledgeBase};
pub use value::Value;
