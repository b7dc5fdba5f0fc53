//! # Session — Uma Base de Conhecimento Viva
//!
//! Cada [`Session`] possui seu próprio [`Pipeline`] (e portanto sua
//! própria KB). Nada é compartilhado entre sessões.
//!
//! ## Ciclo de Vida
//!
//! ```text
//! Session::new(config) ──► kb.start()          running_count += 1, fatos limpos
//!        │
//!        ├── run(fatos) ──► Pipeline::run      fatos acumulam entre runs
//!        ├── run(fatos) ──► ...
//!        │
//!        ├── dump(dir) ──► dir/<id>/{config,knowledge_base,inferences}.json
//!        │
//!        └── reset() ────► kb.start() + Pipeline novo sobre a mesma config
//! ```
//!
//! As estatísticas das inferências (`count_of_true`, `probability`)
//! sobrevivem ao reset; só os fatos são descartados.
//!
//! ## Concorrência
//!
//! A sessão não se sincroniza sozinha. A camada web guarda cada uma em
//! um `Arc<Mutex<Session>>`, um lock exclusivo por KB.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::core::{Fact, KnowledgeBase};
use crate::error::{EngineError, EngineResult};
use crate::inference::Inference;
use crate::orchestrator::{Pipeline, PipelineConfig};
use crate::output::PipelineResult;
use crate::persistence;

/// Configuração de demonstração disponível.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DemoInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// Arquivo dentro do diretório de demos.
    pub file: &'static str,
}

pub const DEMOS: &[DemoInfo] = &[
    DemoInfo {
        id: "triage",
        name: "Hospital Triage",
        file: "triage.json",
    },
    DemoInfo {
        id: "gamification",
        name: "Pizza Gamification",
        file: "gamification.json",
    },
];

pub fn find_demo(id: &str) -> Option<&'static DemoInfo> {
    DEMOS.iter().find(|demo| demo.id == id)
}

/// Resumo serializável de uma sessão.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub example: String,
    pub created_at: DateTime<Utc>,
    pub last_run_at: Option<DateTime<Utc>>,
    pub running_count: u64,
    pub fact_count: usize,
}

#[derive(Debug)]
pub struct Session {
    id: Uuid,
    example: String,
    created_at: DateTime<Utc>,
    last_run_at: Option<DateTime<Utc>>,
    pipeline: Pipeline,
}

impl Session {
    /// Abre uma sessão sobre a configuração e inicia a KB.
    ///
    /// Falha com [`EngineError::MissingKnowledgeBase`] se a configuração
    /// não traz KB.
    pub fn new(example: impl Into<String>, mut config: PipelineConfig) -> EngineResult<Self> {
        config
            .knowledge_base
            .as_mut()
            .ok_or(EngineError::MissingKnowledgeBase)?
            .start();

        let session = Self {
            id: Uuid::new_v4(),
            example: example.into(),
            created_at: Utc::now(),
            last_run_at: None,
            pipeline: Pipeline::new(config),
        };
        tracing::info!(session = %session.id, example = %session.example, "Sessão criada");
        Ok(session)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    pub fn run(&mut self, input: HashMap<String, Fact>) -> EngineResult<PipelineResult> {
        self.last_run_at = Some(Utc::now());
        self.pipeline.run(input)
    }

    /// Reinicia a KB e reconstrói o pipeline sobre a mesma configuração.
    pub fn reset(&mut self) {
        let mut config = std::mem::take(&mut self.pipeline).into_config();
        if let Some(kb) = config.knowledge_base.as_mut() {
            kb.start();
        }
        self.pipeline = Pipeline::new(config);
        tracing::info!(session = %self.id, "Sessão resetada");
    }

    pub fn knowledge(&self) -> EngineResult<&KnowledgeBase> {
        self.pipeline.knowledge_base().ok_or(EngineError::MissingKnowledgeBase)
    }

    /// Inferências ainda necessárias, da menos para a mais provável.
    pub fn pending(&self) -> EngineResult<Vec<Inference>> {
        Ok(self
            .knowledge()?
            .pending_inferences()
            .into_iter()
            .cloned()
            .collect())
    }

    /// Grava configuração, KB e inferências em `dir/<id>/`.
    ///
    /// O `config.json` gravado pode ser recarregado com
    /// [`persistence::load_config`] e continua de onde a sessão parou.
    pub fn dump(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let kb = self.knowledge()?;
        let target = dir.join(self.id.to_string());
        let config_path = target.join("config.json");
        let kb_path = target.join("knowledge_base.json");
        let inferences_path = target.join("inferences.json");

        persistence::save_config(self.pipeline.config(), &config_path)?;
        persistence::save_knowledge_base(kb, &kb_path)?;
        persistence::save_inferences(kb, &inferences_path)?;

        tracing::info!(session = %self.id, dir = %target.display(), "Sessão salva em disco");
        Ok(vec![config_path, kb_path, inferences_path])
    }

    pub fn info(&self) -> SessionInfo {
        let (running_count, fact_count) = self
            .pipeline
            .knowledge_base()
            .map_or((0, 0), |kb| (kb.running_count, kb.facts.len()));
        SessionInfo {
            id: self.id,
            example: self.example.clone(),
            created_at: self.created_at,
            last_run_at: self.last_run_at,
            running_count,
            fact_count,
        }
    }
}
