//! # Handlers HTTP — API de Sessões
//!
//! | Handler | Método | Rota | Retorno |
//! |---------|--------|------|---------|
//! | `index` | GET | `/` | HTML (Maud) |
//! | `list_examples` | GET | `/api/examples` | JSON |
//! | `create_session` | POST | `/api/sessions` | JSON, 201 |
//! | `get_session` | GET | `/api/sessions/{id}` | JSON |
//! | `run_session` | POST | `/api/sessions/{id}/run` | JSON (`PipelineResult`) |
//! | `pending_inferences` | GET | `/api/sessions/{id}/pending` | JSON |
//! | `knowledge` | GET | `/api/sessions/{id}/knowledge` | JSON (dump da KB) |
//! | `reset_session` | POST | `/api/sessions/{id}/reset` | JSON |
//! | `dump_session` | POST | `/api/sessions/{id}/dump` | JSON (arquivos gravados) |
//! | `close_session` | DELETE | `/api/sessions/{id}` | 204 |
//! | `sse_events` | GET | `/events` | SSE stream |
//!
//! ## Erros
//!
//! Toda falha vira `{ "error": "..." }` com o status:
//!
//! | Situação | Status |
//! |----------|--------|
//! | sessão ou demo inexistente | 404 |
//! | arquivo de demo inválido, KB ausente, falha de escrita | 500 |
//! | erro de expressão que aborta o run | 422 |

use std::collections::HashMap;
use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use futures_util::stream::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_stream::wrappers::BroadcastStream;
use uuid::Uuid;

use super::state::{AppState, SharedSession};
use super::templates;
use crate::core::{Fact, KnowledgeBase};
use crate::error::EngineError;
use crate::inference::Inference;
use crate::output::PipelineResult;
use crate::session::{find_demo, DemoInfo, Session, SessionInfo, DEMOS};
use crate::web::events::PipelineEvent;

/// Erro de API serializado como `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: String) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match e {
            EngineError::Config { .. } | EngineError::MissingKnowledgeBase => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{:#}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({
                "error": self.message
            })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub example_id: String,
}

/// Arquivos gravados por um dump.
#[derive(Debug, Serialize)]
pub struct DumpResponse {
    pub session_id: Uuid,
    pub files: Vec<String>,
}

fn find_session(state: &AppState, id: Uuid) -> Result<SharedSession, ApiError> {
    state
        .session(id)
        .ok_or_else(|| ApiError::not_found(format!("session '{}' not found", id)))
}

/// GET `/` — Página com as demos e a API.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let sessions = state.sessions.read().len();
    Html(templates::index_page(DEMOS, sessions).into_string())
}

/// GET `/api/examples` — Catálogo de demos.
pub async fn list_examples() -> Json<&'static [DemoInfo]> {
    Json(DEMOS)
}

/// POST `/api/sessions` — Carrega a demo, inicia a KB e registra a sessão.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionInfo>), ApiError> {
    let demo = find_demo(&req.example_id)
        .ok_or_else(|| ApiError::not_found(format!("example '{}' not found", req.example_id)))?;

    let config = state.load_demo(demo).map_err(|e| {
        tracing::error!(example = demo.id, error = %e, "Falha ao carregar demo");
        e
    })?;
    let session = Session::new(demo.id, config)?;
    let info = session.info();
    state.insert_session(session);

    state.publish(PipelineEvent::SessionCreated {
        session_id: info.id,
        example: info.example.clone(),
        running_count: info.running_count,
    });
    Ok((StatusCode::CREATED, Json(info)))
}

/// GET `/api/sessions/{id}`
pub async fn get_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<SessionInfo>, ApiError> {
    let session = find_session(&state, id)?;
    let info = session.lock().info();
    Ok(Json(info))
}

/// POST `/api/sessions/{id}/run` — Executa o pipeline sobre os fatos do corpo.
///
/// O corpo é um mapa `id → fato`; um fato sem `id` usa a chave.
pub async fn run_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<HashMap<String, Fact>>,
) -> Result<Json<PipelineResult>, ApiError> {
    let session = find_session(&state, id)?;

    // Lock exclusivo só durante o run (síncrono, sem await)
    let outcome = {
        let mut session = session.lock();
        session.run(input).map(|result| (result, session.info().fact_count))
    };

    match outcome {
        Ok((result, fact_count)) => {
            state.publish(PipelineEvent::RunCompleted {
                session_id: id,
                result: result.result.clone(),
                confidence: result.confidence,
                fact_count,
            });
            Ok(Json(result))
        }
        Err(e) => {
            tracing::warn!(session = %id, error = %e, "Run falhou");
            state.publish(PipelineEvent::RunFailed {
                session_id: id,
                message: e.to_string(),
            });
            Err(e.into())
        }
    }
}

/// GET `/api/sessions/{id}/pending`
pub async fn pending_inferences(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Inference>>, ApiError> {
    let session = find_session(&state, id)?;
    let pending = session.lock().pending()?;
    Ok(Json(pending))
}

/// GET `/api/sessions/{id}/knowledge` — Snapshot da KB.
pub async fn knowledge(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<KnowledgeBase>, ApiError> {
    let session = find_session(&state, id)?;
    let kb = session.lock().knowledge()?.clone();
    Ok(Json(kb))
}

/// POST `/api/sessions/{id}/reset`
pub async fn reset_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionInfo>, ApiError> {
    let session = find_session(&state, id)?;
    let info = {
        let mut session = session.lock();
        session.reset();
        session.info()
    };
    state.publish(PipelineEvent::SessionReset {
        session_id: id,
        running_count: info.running_count,
    });
    Ok(Json(info))
}

/// POST `/api/sessions/{id}/dump` — Grava os snapshots em `DATA_DIR/<id>/`.
pub async fn dump_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DumpResponse>, ApiError> {
    let session = find_session(&state, id)?;
    let files = session.lock().dump(&state.settings.data_dir).map_err(|e| {
        tracing::error!(session = %id, error = %e, "Falha ao salvar sessão");
        e
    })?;
    Ok(Json(DumpResponse {
        session_id: id,
        files: files.iter().map(|f| f.display().to_string()).collect(),
    }))
}

/// DELETE `/api/sessions/{id}` — Encerra a sessão e libera a KB.
pub async fn close_session(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode, ApiError> {
    state
        .remove_session(id)
        .ok_or_else(|| ApiError::not_found(format!("session '{}' not found", id)))?;
    state.publish(PipelineEvent::SessionClosed { session_id: id });
    Ok(StatusCode::NO_CONTENT)
}

/// GET `/events` — Stream SSE de eventos de sessão.
///
/// Assinantes atrasados perdem as mensagens que saíram do buffer.
pub async fn sse_events(
    State(state): State<AppState>,
) -> Sse<impl futures_util::Stream<Item = Result<SseEvent, Infallible>>> {
    let rx = state.events_tx.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(SseEvent::default().data(data)))
            }
            Err(_) => None,
        }
    });
    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("keep-alive"))
}
