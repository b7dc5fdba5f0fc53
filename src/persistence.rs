//! # Persistência — Configuração e Snapshots em JSON
//!
//! | Função | Conteúdo | Erro |
//! |--------|----------|------|
//! | [`load_config`] / [`parse_config`] | [`PipelineConfig`] | [`EngineError::Config`] |
//! | [`save_config`] | [`PipelineConfig`] | `anyhow` |
//! | [`save_knowledge_base`] | KB inteira (fatos + estatísticas) | `anyhow` |
//! | [`save_inferences`] | só as inferências | `anyhow` |
//!
//! Os arquivos são JSON pretty-printed. O cache de expressões da KB não é
//! serializado e recomeça vazio após o load.
//!
//! A escrita **não é atômica**: um crash durante a escrita pode deixar o
//! arquivo truncado.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::KnowledgeBase;
use crate::error::{EngineError, EngineResult};
use crate::orchestrator::PipelineConfig;

/// Carrega um documento de configuração do disco.
pub fn load_config(path: &Path) -> EngineResult<PipelineConfig> {
    let origin = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|e| EngineError::Config {
        path: origin.clone(),
        message: e.to_string(),
    })?;
    parse_config(&json, &origin)
}

/// Interpreta um documento de configuração já em memória.
///
/// `origin` só aparece na mensagem de erro.
pub fn parse_config(json: &str, origin: &str) -> EngineResult<PipelineConfig> {
    let config: PipelineConfig = serde_json::from_str(json).map_err(|e| {
        tracing::warn!(origin, error = %e, "Configuração inválida");
        EngineError::Config {
            path: origin.to_string(),
            message: e.to_string(),
        }
    })?;
    tracing::debug!(
        origin,
        inferences = config.knowledge_base.as_ref().map_or(0, |kb| kb.inferences.len()),
        "Configuração carregada"
    );
    Ok(config)
}

pub fn save_config(config: &PipelineConfig, path: &Path) -> Result<()> {
    write_json(config, path).context("Falha ao salvar configuração")
}

/// Snapshot completo da KB, incluindo `count_of_true` e `probability`.
pub fn save_knowledge_base(kb: &KnowledgeBase, path: &Path) -> Result<()> {
    write_json(kb, path).context("Falha ao salvar KnowledgeBase")
}

pub fn save_inferences(kb: &KnowledgeBase, path: &Path) -> Result<()> {
    write_json(&kb.inferences, path).context("Falha ao salvar inferências")
}

fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).context("Falha ao serializar JSON")?;
    std::fs::write(path, json).with_context(|| format!("Falha ao escrever {}", path.display()))?;
    tracing::debug!(path = %path.display(), "JSON salvo");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Fact;
    use crate::inference::Inference;

    const MINIMAL: &str = r#"{
        "knowledge_base": {
            "running_count": 3,
            "facts": {},
            "inferences": [
                {"description": "Febre", "fact_id": "urgency", "fact_value": "red",
                 "rules": [{"expression": "temperature > 39", "weight": 1}]}
            ],
            "conclusions": [{"description": "Critical patient", "facts": [{"id": "urgency", "value": "red"}]}]
        },
        "scoring_weights": {"business_impact": 0.4, "implementation_complexity": 0.2,
                            "risk_level": 0.2, "time_to_value": 0.2}
    }"#;

    #[test]
    fn parses_minimal_document() {
        let config = parse_config(MINIMAL, "minimal").unwrap();
        let kb = config.knowledge_base.unwrap();
        assert_eq!(kb.running_count, 3);
        assert_eq!(kb.inferences[0].rules[0].expression, "temperature > 39");
        assert!(kb.contradictions.is_empty());
        assert_eq!(config.scoring_weights.unwrap().business_impact, 0.4);
        assert!(config.intent_classifier.is_none());
    }

    #[test]
    fn malformed_document_is_config_error() {
        let err = parse_config("{ \"knowledge_base\": [", "broken.json").unwrap_err();
        assert!(matches!(err, EngineError::Config { ref path, .. } if path == "broken.json"));
    }

    #[test]
    fn unknown_enum_value_is_config_error() {
        let json = r#"{"knowledge_base": {}, "risk_analyzer": {"risks": [{"level": "extreme", "expression": "x"}]}}"#;
        assert!(matches!(parse_config(json, "x").unwrap_err(), EngineError::Config { .. }));
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EngineError::Config { .. }));
    }

    #[test]
    fn config_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("pipeline.json");
        let config = parse_config(MINIMAL, "minimal").unwrap();

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();

        let kb = loaded.knowledge_base.unwrap();
        assert_eq!(kb.inferences.len(), 1);
        assert_eq!(kb.conclusions[0].description, "Critical patient");
        assert_eq!(loaded.scoring_weights, config.scoring_weights);
    }

    #[test]
    fn knowledge_base_dump_keeps_statistics() {
        let dir = tempfile::tempdir().unwrap();
        let mut kb = parse_config(MINIMAL, "minimal").unwrap().knowledge_base.unwrap();
        kb.start();
        kb.add_fact(Fact::new("temperature", 41.0));

        let kb_path = dir.path().join("kb.json");
        save_knowledge_base(&kb, &kb_path).unwrap();
        let restored: KnowledgeBase =
            serde_json::from_str(&std::fs::read_to_string(&kb_path).unwrap()).unwrap();
        assert_eq!(restored.running_count, 4);
        assert_eq!(restored.inferences[0].count_of_true, 1);
        assert!(restored.facts.contains_key("urgency"));

        let inf_path = dir.path().join("inferences.json");
        save_inferences(&kb, &inf_path).unwrap();
        let inferences: Vec<Inference> =
            serde_json::from_str(&std::fs::read_to_string(&inf_path).unwrap()).unwrap();
        assert_eq!(inferences[0].count_of_true, 1);
        assert!((inferences[0].probability - 0.125).abs() < 1e-9);
    }
}
