//! # KnowledgeBase — Fact Store e Motor de Encadeamento
//!
//! A [`KnowledgeBase`] guarda os **fatos vivos** de uma sessão junto com
//! a configuração que age sobre eles: inferências, contradições e
//! conclusões.
//!
//! ## Fluxo de `add_fact`
//!
//! ```text
//! add_fact(f)
//!   1. facts[f.id] = f
//!   2. remove fatos não acumulativos com f.id em derived_from (UM nível)
//!   3. varredura de inferência (pode criar cadeias de fatos novos)
//!   4. resolução de contradições
//! ```
//!
//! A remoção do passo 2 é **rasa de propósito**: um fato derivado de um
//! fato removido continua na base. Só as derivações novas encadeiam.
//!
//! ## Sessões
//!
//! [`start()`](KnowledgeBase::start) abre uma sessão: incrementa
//! `running_count` e limpa os fatos. O contador é o denominador comum da
//! probabilidade de todas as inferências durante a sessão.
//!
//! ## Concorrência
//!
//! Nenhuma sincronização interna. Quem compartilha uma KB entre tarefas
//! deve serializar o acesso (a [`Session`](crate::session::Session) vive
//! atrás de um `Mutex`).
//!
//! ## Persistência
//!
//! Serializada como JSON (ver [`persistence`](crate::persistence)). O
//! cache de expressões é `#[serde(skip)]` e recomeça vazio após o load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Fact;
use crate::expr::Evaluator;
use crate::inference::Inference;
use crate::reasoning::{Conclusion, Contradiction};

/// Base de conhecimento de uma sessão.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct KnowledgeBase {
    /// Sessões iniciadas desde a criação.
    #[serde(default, alias = "runnings_count")]
    pub running_count: u64,

    /// Fatos vivos: id → fato. Toda chave é igual ao `id` do fato.
    #[serde(default)]
    pub facts: HashMap<String, Fact>,

    #[serde(default)]
    pub inferences: Vec<Inference>,

    #[serde(default)]
    pub contradictions: Vec<Contradiction>,

    #[serde(default)]
    pub conclusions: Vec<Conclusion>,

    /// Cache de compilação de expressões. **Não serializado.**
    #[serde(skip, default)]
    evaluator: Evaluator,
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Avaliador compartilhado (e seu cache) desta KB.
    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Abre uma nova sessão: incrementa o contador e limpa os fatos.
    pub fn start(&mut self) {
        self.running_count += 1;
        self.facts.clear();
        tracing::info!(running_count = self.running_count, "KB: sessão iniciada");
    }

    /// Insere (ou sobrescreve) um fato e propaga as consequências.
    pub fn add_fact(&mut self, fact: Fact) {
        let id = fact.id.clone();
        tracing::debug!(id = %id, value = %fact.value, source = %fact.source, "KB: fato armazenado");
        self.facts.insert(id.clone(), fact);

        let invalidated = remove_derived_from(&mut self.facts, &id, true);
        if invalidated > 0 {
            tracing::debug!(id = %id, invalidated, "KB: dependentes invalidados");
        }

        self.infer();
        self.resolve_contradictions();
    }

    /// Varredura de inferência, em ordem crescente de `order`.
    ///
    /// Cada inferência necessária é tentada uma vez; falhas são isoladas e
    /// não interrompem a varredura. Retorna quantos fatos foram derivados.
    pub fn infer(&mut self) -> usize {
        let mut sweep: Vec<usize> = (0..self.inferences.len()).collect();
        sweep.sort_by_key(|&i| self.inferences[i].order);

        let mut derived = 0;
        for i in sweep {
            let inference = &self.inferences[i];
            if !inference.is_needed(&self.facts, &self.evaluator) {
                continue;
            }

            let mut fact = match inference.infer(&self.facts, &self.evaluator) {
                Ok(fact) => fact,
                Err(e) => {
                    tracing::debug!(inference = %inference.description, error = %e, "Inferência não disparou");
                    continue;
                }
            };

            self.inferences[i].record_success(self.running_count);

            if let Some(existing) = self.facts.get(&fact.id) {
                fact.accumulative = existing.accumulative;
            }
            tracing::debug!(
                id = %fact.id,
                value = %fact.value,
                derived_from = ?fact.derived_from,
                probability = self.inferences[i].probability,
                "KB: fato inferido"
            );
            self.facts.insert(fact.id.clone(), fact);
            derived += 1;
        }
        derived
    }

    /// Detecta e resolve todas as contradições ativas.
    ///
    /// Retorna quantas contradições foram resolvidas.
    pub fn resolve_contradictions(&mut self) -> usize {
        let mut resolved = 0;
        for contradiction in &self.contradictions {
            if !contradiction.detect(&self.facts) {
                continue;
            }
            let removed = contradiction.resolve(&mut self.facts);
            tracing::info!(
                contradiction = %contradiction.description,
                removed,
                "KB: contradição resolvida"
            );
            resolved += 1;
        }
        resolved
    }

    /// Inferências ainda necessárias, da menos provável para a mais provável.
    pub fn pending_inferences(&self) -> Vec<&Inference> {
        let mut pending: Vec<&Inference> = self
            .inferences
            .iter()
            .filter(|inf| inf.is_needed(&self.facts, &self.evaluator))
            .collect();
        pending.sort_by(|a, b| a.probability.total_cmp(&b.probability));
        pending
    }

    /// Conclusões cujo padrão está inteiramente satisfeito.
    pub fn true_conclusions(&self) -> Vec<&Conclusion> {
        self.conclusions
            .iter()
            .filter(|c| c.assert(&self.facts))
            .collect()
    }

    pub fn certainty_for_conclusion(&self, conclusion: &Conclusion) -> f64 {
        conclusion.certainty(&self.facts)
    }

    /// Ids que ajudariam a avançar e ainda não existem.
    ///
    /// Vêm dos padrões das conclusões e do `fact_target_id` das regras das
    /// inferências pendentes. Sem repetição, na ordem em que aparecem.
    pub fn missing_fact_ids(&self) -> Vec<String> {
        let from_conclusions = self
            .conclusions
            .iter()
            .flat_map(|c| c.facts.iter().map(|f| f.id.as_str()));
        let pending = self.pending_inferences();
        let from_rules = pending
            .iter()
            .flat_map(|inf| inf.rules.iter().map(|r| r.fact_target_id.as_str()));

        let mut missing: Vec<String> = Vec::new();
        for id in from_conclusions.chain(from_rules) {
            if id.is_empty() || self.facts.contains_key(id) || missing.iter().any(|m| m == id) {
                continue;
            }
            missing.push(id.to_string());
        }
        missing
    }
}

/// Remove os fatos que têm `id` diretamente em `derived_from`.
///
/// Com `keep_accumulative`, fatos acumulativos sobrevivem. O próprio fato
/// `id` nunca é removido aqui. Retorna quantos fatos saíram.
pub fn remove_derived_from(facts: &mut HashMap<String, Fact>, id: &str, keep_accumulative: bool) -> usize {
    let before = facts.len();
    facts.retain(|key, fact| {
        key == id || !fact.depends_on(id) || (keep_accumulative && fact.accumulative)
    });
    before - facts.len()
}
