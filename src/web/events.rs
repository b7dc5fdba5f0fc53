//! # Eventos SSE de Sessão
//!
//! Todo evento carrega o `session_id` e é serializado com o discriminador
//! `type`:
//!
//! ```json
//! { "type": "RunCompleted", "session_id": "…", "result": "Critical patient", … }
//! ```
//!
//! ```text
//! SessionCreated → (RunCompleted | RunFailed | SessionReset)* → SessionClosed
//! ```

use serde::Serialize;
use uuid::Uuid;

use crate::scoring::ConfidenceLevel;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    SessionCreated {
        session_id: Uuid,
        example: String,
        running_count: u64,
    },

    /// Run terminado com relatório.
    RunCompleted {
        session_id: Uuid,
        result: String,
        confidence: ConfidenceLevel,
        /// Fatos na KB após o run.
        fact_count: usize,
    },

    /// Run abortado (intenção/entidades com erro, KB ausente).
    RunFailed {
        session_id: Uuid,
        message: String,
    },

    SessionReset {
        session_id: Uuid,
        running_count: u64,
    },

    /// Sessão removida; a KB deixa de existir.
    SessionClosed {
        session_id: Uuid,
    },
}

impl PipelineEvent {
    pub fn session_id(&self) -> Uuid {
        match self {
            Self::SessionCreated { session_id, .. }
            | Self::RunCompleted { session_id, .. }
            | Self::RunFailed { session_id, .. }
            | Self::SessionReset { session_id, .. }
            | Self::SessionClosed { session_id } => *session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let id = Uuid::new_v4();
        let event = PipelineEvent::RunCompleted {
            session_id: id,
            result: "Critical patient".into(),
            confidence: ConfidenceLevel::High,
            fact_count: 6,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "RunCompleted");
        assert_eq!(json["confidence"], "high");
        assert_eq!(json["session_id"], id.to_string());
        assert_eq!(event.session_id(), id);
    }

    #[test]
    fn closed_event_carries_only_the_id() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(PipelineEvent::SessionClosed { session_id: id }).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "SessionClosed", "session_id": id.to_string() }));
    }
}
