//! # Módulo Web — Shell de Demonstração
//!
//! API JSON sobre sessões explícitas, construída com **Axum** + **Maud** + **SSE**.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (página Maud + fetch + EventSource)             │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── GET  /                          → página           │
//! │  ├── GET  /api/examples              → catálogo         │
//! │  ├── POST /api/sessions              → nova sessão      │
//! │  ├── GET  /api/sessions/{id}         → resumo           │
//! │  ├── DELETE /api/sessions/{id}       → encerra          │
//! │  ├── POST /api/sessions/{id}/run     → PipelineResult   │
//! │  ├── GET  /api/sessions/{id}/pending → inferências      │
//! │  ├── GET  /api/sessions/{id}/knowledge → dump da KB     │
//! │  ├── POST /api/sessions/{id}/reset   → resumo           │
//! │  ├── POST /api/sessions/{id}/dump    → arquivos JSON    │
//! │  └── GET  /events                    → SSE              │
//! ├─────────────────────────────────────────────────────────┤
//! │ Session (Arc<Mutex>) ──► Pipeline ──► KnowledgeBase     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | `AppState`: settings, sessões, canal de eventos |
//! | [`events`] | `PipelineEvent` para o SSE |
//! | [`handlers`] | Handlers Axum |
//! | [`templates`] | Página Maud |

pub mod events;
pub mod handlers;
pub mod state;
pub mod templates;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router com todas as rotas e o estado compartilhado.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/events", get(handlers::sse_events))
        // ── API JSON ──────────────────────────────────────────
        .route("/api/examples", get(handlers::list_examples))
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session).delete(handlers::close_session),
        )
        .route("/api/sessions/{id}/run", post(handlers::run_session))
        .route("/api/sessions/{id}/pending", get(handlers::pending_inferences))
        .route("/api/sessions/{id}/knowledge", get(handlers::knowledge))
        .route("/api/sessions/{id}/reset", post(handlers::reset_session))
        .route("/api/sessions/{id}/dump", post(handlers::dump_session))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
