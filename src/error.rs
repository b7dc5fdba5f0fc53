//! # Erros do Motor — Taxonomia Tipada
//!
//! Todos os erros que o núcleo (Fact Store, inferência, pipeline) pode
//! reportar ao chamador passam por [`EngineError`].
//!
//! ## Política de Propagação
//!
//! | Origem | Variante | Efeito |
//! |--------|----------|--------|
//! | Documento de configuração inválido | `Config` | Fatal no carregamento |
//! | Pipeline sem KB | `MissingKnowledgeBase` | Aborta o run antes do passo 1 |
//! | Expressão mal formada / fato ausente | `ExpressionCompile` | Pula o item (regras, restrições, riscos) |
//! | Expressão falhou ao executar | `ExpressionRuntime` | Pula o item |
//! | Regra não retornou booleano | `NonBooleanRuleResult` | Aborta **uma** inferência |
//! | Intent / extração de entidades | `Step` | Aborta o run inteiro |
//!
//! Nenhuma operação do núcleo faz retry: tudo é em memória e determinístico.

use crate::expr::ExprError;

/// Erro do motor de inferência e do pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Documento de configuração persistido inválido ou ilegível.
    #[error("invalid configuration '{path}': {message}")]
    Config { path: String, message: String },

    /// Pipeline invocado sem base de conhecimento.
    #[error("knowledge base is required")]
    MissingKnowledgeBase,

    /// Expressão não compilou (sintaxe ou identificador desconhecido).
    #[error("expression compile error: {0}")]
    ExpressionCompile(#[source] ExprError),

    /// Expressão compilou mas falhou ao executar.
    #[error("expression runtime error: {0}")]
    ExpressionRuntime(#[source] ExprError),

    /// A expressão de uma regra executou mas não produziu um booleano.
    #[error("expression '{expression}' did not evaluate to a boolean")]
    NonBooleanRuleResult { expression: String },

    /// O id calculado de uma inferência não é uma string.
    #[error("calculated fact id '{expression}' did not evaluate to a string")]
    NonStringFactId { expression: String },

    /// `is_value_calculated` ligado, mas `fact_value` não é texto de expressão.
    #[error("calculated fact value must be an expression string, got {found}")]
    NonStringValueExpression { found: &'static str },

    /// Uma regra da conjunção avaliou para `false`.
    #[error("rule '{rule}' is false")]
    RuleFailed { rule: String },

    /// Falha fatal dentro de um passo do pipeline.
    #[error("{step} failed: {source}")]
    Step {
        step: &'static str,
        #[source]
        source: Box<EngineError>,
    },
}

impl EngineError {
    /// `true` para erros de expressão causados por um fato que ainda não existe.
    ///
    /// Esses erros dizem "a regra não se aplica a este run", não "a
    /// configuração está quebrada".
    pub fn is_missing_fact(&self) -> bool {
        matches!(
            self,
            EngineError::ExpressionCompile(ExprError::UnknownIdentifier(_))
        )
    }

    /// Envolve o erro indicando o passo do pipeline que falhou.
    pub fn in_step(self, step: &'static str) -> Self {
        EngineError::Step {
            step,
            source: Box::new(self),
        }
    }
}

impl From<ExprError> for EngineError {
    fn from(err: ExprError) -> Self {
        if err.is_compile() {
            EngineError::ExpressionCompile(err)
        } else {
            EngineError::ExpressionRuntime(err)
        }
    }
}

/// Alias de resultado do motor.
pub type EngineResult<T> = Result<T, EngineError>;
