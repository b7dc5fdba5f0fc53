#![allow(dead_code)]
//! # Inference Pipeline — Motor de Regras com Encadeamento Progressivo
//!
//! **Ponto de entrada** do servidor de demonstração.
//!
//! O núcleo é uma base de fatos tipados sobre a qual regras ponderadas
//! derivam fatos novos, com proveniência, invalidação, resolução de
//! contradições e ranking de conclusões. Um pipeline em seis passos
//! (domínio → intenção → entidades → restrições → conhecimento → riscos)
//! envolve esse núcleo e produz um relatório de decisão.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing (RUST_LOG, padrão "info")
//!   ├── Lê Settings do ambiente (PORT, BIND_ADDR, DEMOS_DIR, DATA_DIR)
//!   ├── Valida os JSON de demo (só avisa)
//!   ├── Cria broadcast channel para SSE
//!   ├── Monta AppState e Router
//!   └── Serve em BIND_ADDR:PORT
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! RUST_LOG=debug PORT=3000 cargo run
//!
//! curl -X POST localhost:3000/api/sessions -d '{"example_id":"triage"}' \
//!      -H 'content-type: application/json'
//! curl -X POST localhost:3000/api/sessions/<id>/run \
//!      -H 'content-type: application/json' \
//!      -d '{"temperature":{"value":41},"heart_rate":{"value":130}}'
//! ```

/// Módulo `analysis` — analisadores plugáveis do pipeline.
mod analysis;

/// Módulo `core` — Value, Fact e KnowledgeBase.
mod core;

/// Módulo `error` — taxonomia de erros do motor.
mod error;

/// Módulo `expr` — linguagem de expressões das regras.
mod expr;

/// Módulo `inference` — regras e inferências.
mod inference;

/// Módulo `orchestrator` — pipeline de decisão.
mod orchestrator;

mod output;

/// Módulo `persistence` — configuração e snapshots em JSON.
mod persistence;

/// Módulo `reasoning` — contradições e conclusões.
mod reasoning;

mod scoring;

/// Módulo `session` — sessões explícitas sobre uma KB.
mod session;

mod settings;

/// Módulo `web` — servidor axum, handlers, template e SSE.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use crate::session::DEMOS;
use crate::settings::Settings;
use crate::web::events::PipelineEvent;
use crate::web::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Inference Pipeline iniciando");

    let settings = Settings::from_env();

    // Demos quebradas não impedem o servidor de subir
    for demo in DEMOS {
        let path = settings.demos_dir.join(demo.file);
        match persistence::load_config(&path) {
            Ok(config) => tracing::info!(
                demo = demo.id,
                inferences = config.knowledge_base.as_ref().map_or(0, |kb| kb.inferences.len()),
                "Demo disponível"
            ),
            Err(e) => tracing::warn!(demo = demo.id, error = %e, "Demo indisponível"),
        }
    }

    // Capacidade de 256 eventos; assinantes lentos perdem os mais antigos.
    let (events_tx, _) = broadcast::channel::<PipelineEvent>(256);
    let addr = settings.addr();
    let state = AppState::new(settings, Arc::new(events_tx));

    let app = web::create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha ao fazer bind em {addr}"))?;
    tracing::info!(addr = %addr, "Server running");

    axum::serve(listener, app).await?;

    Ok(())
}
