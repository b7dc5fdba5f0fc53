//! # Módulo Reasoning — Contradições e Conclusões
//!
//! Ambos são **padrões de fatos** (`id` + `value`), com leituras opostas:
//!
//! - [`Contradiction`] — o padrão inteiro presente é um problema e é apagado
//! - [`Conclusion`] — o padrão presente sustenta um resultado

pub mod conclusion;
pub mod contradiction;

pub use conclusion::Conclusion;
pub use contradiction::Contradiction;
