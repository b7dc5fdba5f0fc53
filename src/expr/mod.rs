//! # Módulo Expr — Avaliador de Expressões
//!
//! Regras, inferências calculadas, intents, extração de entidades,
//! restrições e riscos são todos **expressões textuais** avaliadas sobre os
//! fatos atuais. Este módulo é a única porta de entrada para isso.
//!
//! ## Contrato
//!
//! ```text
//! compile(expr, env)      → CompiledExpr | erro de compilação
//! evaluate(compiled, env) → (valor, identificadores referenciados) | erro de execução
//! ```
//!
//! O ambiente é plano: `id do fato → valor do fato`. Um identificador que
//! não existe no ambiente é **erro de compilação**
//! ([`ExprError::UnknownIdentifier`]), igual a um fato que ainda não foi
//! informado. Os identificadores referenciados viram a proveniência
//! (`derived_from`) dos fatos inferidos.
//!
//! ## Cache
//!
//! O parse é independente do ambiente, então cada texto de expressão é
//! compilado uma única vez e guardado em um cache compartilhado, junto com
//! as regex dos padrões literais de `matches`. Só a verificação de nomes
//! roda a cada chamada.
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`lexer`] | Texto → tokens |
//! | [`parser`] | Tokens → [`Expr`] |
//! | [`eval`] | [`Expr`] × ambiente → [`Value`] |

pub mod eval;
pub mod lexer;
pub mod parser;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::core::{Fact, Value};
pub use parser::Expr;
use parser::Parser;

/// Erro de compilação ou execução de uma expressão.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ExprError {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("{0}")]
    Runtime(String),
}

impl ExprError {
    /// `true` para erros detectados antes da execução.
    pub fn is_compile(&self) -> bool {
        matches!(self, ExprError::Syntax { .. } | ExprError::UnknownIdentifier(_))
    }
}

/// Ambiente de variáveis de uma expressão.
pub trait Environment {
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// Os fatos da KB são o ambiente natural: `id → fact.value`.
impl Environment for HashMap<String, Fact> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|fact| &fact.value)
    }
}

impl Environment for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

/// Expressão compilada, pronta para ser avaliada várias vezes.
#[derive(Debug)]
pub struct CompiledExpr {
    ast: Expr,
    identifiers: BTreeSet<String>,
    /// Regex dos padrões literais de `matches`, compiladas junto com a árvore.
    patterns: eval::Patterns,
}

impl CompiledExpr {
    /// Identificadores-raiz que a expressão lê.
    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }
}

/// Resultado de uma avaliação: valor + nomes lidos.
#[derive(Clone, Debug, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub referenced: BTreeSet<String>,
}

/// Avaliador de expressões com cache de compilação.
///
/// Clonar um `Evaluator` compartilha o mesmo cache (é um `Arc`).
#[derive(Clone, Default)]
pub struct Evaluator {
    cache: Arc<RwLock<HashMap<String, Arc<CompiledExpr>>>>,
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Evaluator")
            .field("cached", &self.cache.read().len())
            .finish()
    }
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compila `source` e verifica que todo identificador existe em `env`.
    ///
    /// # Erros
    ///
    /// - [`ExprError::Syntax`] — texto mal formado (não é cacheado)
    /// - [`ExprError::UnknownIdentifier`] — referência a um fato ausente
    pub fn compile(&self, source: &str, env: &dyn Environment) -> Result<Arc<CompiledExpr>, ExprError> {
        let compiled = self.parse_cached(source)?;
        if let Some(missing) = compiled
            .identifiers
            .iter()
            .find(|name| env.lookup(name).is_none())
        {
            return Err(ExprError::UnknownIdentifier(missing.clone()));
        }
        Ok(compiled)
    }

    /// Avalia uma expressão já compilada.
    pub fn evaluate(&self, compiled: &CompiledExpr, env: &dyn Environment) -> Result<Evaluation, ExprError> {
        let value = eval::eval(&compiled.ast, env, &compiled.patterns)?;
        Ok(Evaluation {
            value,
            referenced: compiled.identifiers.clone(),
        })
    }

    /// Atalho: compila e avalia.
    pub fn calculate(&self, source: &str, env: &dyn Environment) -> Result<Evaluation, ExprError> {
        let compiled = self.compile(source, env)?;
        self.evaluate(&compiled, env)
    }

    /// Número de expressões distintas no cache.
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn parse_cached(&self, source: &str) -> Result<Arc<CompiledExpr>, ExprError> {
        if let Some(hit) = self.cache.read().get(source) {
            return Ok(hit.clone());
        }
        let ast = Parser::parse(source)?;
        let compiled = Arc::new(CompiledExpr {
            identifiers: ast.identifiers(),
            patterns: eval::literal_patterns(&ast),
            ast,
        });
        tracing::trace!(expression = %source, "Expr: compilada e cacheada");
        self.cache
            .write()
            .insert(source.to_string(), compiled.clone());
        Ok(compiled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(entries: &[(&str, Value)]) -> HashMap<String, Fact> {
        entries
            .iter()
            .map(|(id, value)| (id.to_string(), Fact::new(*id, value.clone())))
            .collect()
    }

    #[test]
    fn calculate_reports_referenced_identifiers() {
        let evaluator = Evaluator::new();
        let env = facts(&[("age", Value::from(20.0)), ("country", Value::from("AR"))]);
        let result = evaluator
            .calculate("age >= 18 && country == 'AR'", &env)
            .unwrap();
        assert_eq!(result.value, Value::Bool(true));
        assert_eq!(
            result.referenced.into_iter().collect::<Vec<_>>(),
            vec!["age".to_string(), "country".to_string()]
        );
    }

    #[test]
    fn missing_fact_is_compile_error() {
        let evaluator = Evaluator::new();
        let env = facts(&[("other", Value::from(15.0))]);
        let err = evaluator.calculate("age >= 18", &env).unwrap_err();
        assert_eq!(err, ExprError::UnknownIdentifier("age".into()));
        assert!(err.is_compile());
    }

    #[test]
    fn compilation_is_cached_per_source() {
        let evaluator = Evaluator::new();
        let env = facts(&[("age", Value::from(20.0))]);
        evaluator.calculate("age >= 18", &env).unwrap();
        evaluator.calculate("age >= 18", &env).unwrap();
        evaluator.calculate("age < 18", &env).unwrap();
        assert_eq!(evaluator.cached_len(), 2);
    }

    #[test]
    fn clones_share_the_cache() {
        let evaluator = Evaluator::new();
        let clone = evaluator.clone();
        let env = facts(&[("x", Value::from(1.0))]);
        clone.calculate("x + 1", &env).unwrap();
        assert_eq!(evaluator.cached_len(), 1);
    }

    #[test]
    fn literal_patterns_are_compiled_once() {
        let evaluator = Evaluator::new();
        let env = facts(&[("status", Value::from("critical")), ("code", Value::from("^cr"))]);
        let compiled = evaluator
            .compile("status matches '^cr.*al$' || status matches '^cr.*al$'", &env)
            .unwrap();
        assert_eq!(compiled.pattern_count(), 1);
        assert_eq!(evaluator.evaluate(&compiled, &env).unwrap().value, Value::Bool(true));

        // Padrão vindo de um fato é compilado na avaliação
        let computed = evaluator.compile("status matches code", &env).unwrap();
        assert_eq!(computed.pattern_count(), 0);
        assert_eq!(evaluator.evaluate(&computed, &env).unwrap().value, Value::Bool(true));
    }

    #[test]
    fn invalid_literal_pattern_fails_at_evaluation() {
        let evaluator = Evaluator::new();
        let env = facts(&[("status", Value::from("critical"))]);
        let compiled = evaluator.compile("status matches '('", &env).unwrap();
        assert_eq!(compiled.pattern_count(), 0);
        assert!(matches!(
            evaluator.evaluate(&compiled, &env),
            Err(ExprError::Runtime(_))
        ));
    }

    #[test]
    fn syntax_errors_are_not_cached() {
        let evaluator = Evaluator::new();
        let env = facts(&[]);
        assert!(evaluator.calculate("1 +", &env).is_err());
        assert_eq!(evaluator.cached_len(), 0);
    }
}
