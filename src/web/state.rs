//! # Estado da Aplicação Web
//!
//! ```text
//! AppState (Clone, barato)
//!  ├── settings        Arc<Settings>
//!  ├── sessions        Arc<RwLock<HashMap<Uuid, Arc<Mutex<Session>>>>>
//!  │                         │                  └── um lock exclusivo por KB
//!  │                         └── lock curto: só insere/busca/remove
//!  └── events_tx       Arc<broadcast::Sender<PipelineEvent>>
//! ```
//!
//! O lock do mapa nunca é mantido enquanto uma sessão executa: o handler
//! clona o `Arc` da sessão e solta o mapa antes de travar a sessão.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::EngineResult;
use crate::orchestrator::PipelineConfig;
use crate::persistence;
use crate::session::{DemoInfo, Session};
use crate::settings::Settings;
use crate::web::events::PipelineEvent;

pub type SharedSession = Arc<Mutex<Session>>;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    /// Canal broadcast para o stream SSE.
    pub events_tx: Arc<broadcast::Sender<PipelineEvent>>,
}

impl AppState {
    pub fn new(settings: Settings, events_tx: Arc<broadcast::Sender<PipelineEvent>>) -> Self {
        Self {
            settings: Arc::new(settings),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events_tx,
        }
    }

    /// Lê a configuração de uma demo do diretório configurado.
    pub fn load_demo(&self, demo: &DemoInfo) -> EngineResult<PipelineConfig> {
        persistence::load_config(&self.settings.demos_dir.join(demo.file))
    }

    pub fn insert_session(&self, session: Session) -> SharedSession {
        let id = session.id();
        let shared = Arc::new(Mutex::new(session));
        self.sessions.write().insert(id, shared.clone());
        shared
    }

    pub fn session(&self, id: Uuid) -> Option<SharedSession> {
        self.sessions.read().get(&id).cloned()
    }

    /// Tira a sessão do mapa. Um run em andamento termina sobre o `Arc`
    /// que já segura; a KB é liberada quando o último clone cai.
    pub fn remove_session(&self, id: Uuid) -> Option<SharedSession> {
        let removed = self.sessions.write().remove(&id);
        if removed.is_some() {
            tracing::info!(session = %id, "Sessão encerrada");
        }
        removed
    }

    /// Publica um evento. Sem assinantes, o evento é descartado.
    pub fn publish(&self, event: PipelineEvent) {
        if self.events_tx.send(event).is_err() {
            tracing::trace!("Evento sem assinantes SSE");
        }
    }
}
