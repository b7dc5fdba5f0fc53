//! # Orquestrador — Pipeline de Decisão em Seis Passos
//!
//! O [`Pipeline`] conduz um `run` estritamente sequencial sobre a
//! [`KnowledgeBase`] da configuração:
//!
//! ```text
//! fatos de entrada
//!   │
//!   ├── 1. Domínio      DomainDetector (entrada)      → domínio + pesos
//!   ├── 2. Intenção     IntentClassifier (entrada)    → Intent        ✗ erro aborta
//!   ├── 3. Entidades    EntityExtractor (entrada)     → fatos "extracted" ✗ erro aborta
//!   │      + ingestão dos fatos de entrada (ordem de chave, origem "input")
//!   ├── 4. Restrições   ConstraintSet (KB)            → trade-offs / suposições
//!   ├── 5. Conhecimento infer() + resolve_contradictions()
//!   └── 6. Riscos       RiskAnalyzer (KB)             → riscos, trade-offs
//!   │
//!   └── montagem do PipelineResult (conclusões, confiança, soluções, follow-up)
//! ```
//!
//! ## Pesos de Pontuação
//!
//! | Prioridade | Fonte |
//! |------------|-------|
//! | 1 | `scoring_weights` explícito |
//! | 2 | `domain_weights[domínio detectado]` da configuração |
//! | 3 | preset de [`default_domain_weights`] para o domínio |
//! | 4 | uniforme `{0.25, 0.25, 0.25, 0.25}` |
//!
//! ## Falhas
//!
//! Sem KB o run falha antes do passo 1. Erros de sintaxe ou execução na
//! classificação de intenção ou na extração de entidades abortam o run
//! com [`EngineError::Step`]. Qualquer outra expressão com erro só faz o
//! item ser ignorado.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::analysis::{
    default_domain_weights, Constraint, ConstraintSet, ConstraintType, Domain, DomainDetector, Entity,
    EntityExtractor, Intent, IntentClassifier, Risk, RiskAnalyzer, RiskLevel, DOMAIN_GENERAL,
};
use crate::core::{Fact, KnowledgeBase, SOURCE_EXTRACTED, SOURCE_INPUT};
use crate::error::{EngineError, EngineResult};
use crate::output::{FollowUp, PipelineResult, Reasoning, NO_CONCLUSIONS};
use crate::scoring::{compute_confidence, rank_solutions, RankedSolution, SolutionScore};

/// Certeza usada quando há fatos mas nenhuma conclusão verdadeira.
const FALLBACK_CERTAINTY: f64 = 0.3;

/// Documento de configuração: a unidade de load/save e semente do pipeline.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub knowledge_base: Option<KnowledgeBase>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_detector: Option<DomainDetector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent_classifier: Option<IntentClassifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_extractor: Option<EntityExtractor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint_set: Option<ConstraintSet>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_analyzer: Option<RiskAnalyzer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_weights: Option<SolutionScore>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub domain_weights: BTreeMap<Domain, SolutionScore>,
}

/// Resultados intermediários acumulados ao longo dos passos.
#[derive(Clone, Debug, Default)]
pub struct PipelineState {
    pub domain: Domain,
    pub intent: Intent,
    pub entities: Vec<Entity>,
    pub constraints: Vec<Constraint>,
    pub risks: Vec<Risk>,
    pub signals: Vec<String>,
    pub assumptions: Vec<String>,
    pub tradeoffs: Vec<String>,
}

/// Pipeline de decisão sobre uma configuração.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Devolve a configuração (com a KB no estado atual).
    pub fn into_config(self) -> PipelineConfig {
        self.config
    }

    pub fn knowledge_base(&self) -> Option<&KnowledgeBase> {
        self.config.knowledge_base.as_ref()
    }

    /// Executa os seis passos sobre os fatos de entrada.
    pub fn run(&mut self, input: HashMap<String, Fact>) -> EngineResult<PipelineResult> {
        let config = &mut self.config;
        let kb = config
            .knowledge_base
            .as_mut()
            .ok_or(EngineError::MissingKnowledgeBase)?;
        let evaluator = kb.evaluator().clone();

        // Fatos sem id herdam a chave do mapa
        let input: HashMap<String, Fact> = input
            .into_iter()
            .map(|(key, mut fact)| {
                if fact.id.is_empty() {
                    fact.id = key.clone();
                }
                (key, fact)
            })
            .collect();

        let mut state = PipelineState::default();
        state
            .signals
            .push(format!("Pipeline started with {} input facts", input.len()));

        // ─── Passo 1: domínio e pesos ────────────────────────────
        state.domain = match &config.domain_detector {
            Some(detector) => detector.detect(&input),
            None => DOMAIN_GENERAL.to_string(),
        };
        state.signals.push(format!("Detected domain: {}", state.domain));
        let weights = config
            .scoring_weights
            .or_else(|| config.domain_weights.get(&state.domain).copied())
            .or_else(|| default_domain_weights().get(&state.domain).copied())
            .unwrap_or_else(SolutionScore::uniform);
        tracing::debug!(domain = %state.domain, ?weights, "Pipeline: domínio detectado");

        // ─── Passo 2: intenção ───────────────────────────────────
        state.intent = match &config.intent_classifier {
            Some(classifier) => classifier
                .classify(&input, &evaluator)
                .map_err(|e| e.in_step("intent classification"))?,
            None => Intent::default(),
        };
        state
            .signals
            .push(format!("Classified intent: {}", state.intent.intent_type));
        tracing::debug!(intent = %state.intent.intent_type, "Pipeline: intenção classificada");

        // ─── Passo 3: entidades + ingestão ───────────────────────
        if let Some(extractor) = &config.entity_extractor {
            state.entities = extractor
                .extract(&input, &evaluator)
                .map_err(|e| e.in_step("entity extraction"))?;
            for entity in &state.entities {
                kb.add_fact(Fact::new(entity.fact_id.clone(), entity.value.clone()).with_source(SOURCE_EXTRACTED));
            }
            if !state.entities.is_empty() {
                state
                    .signals
                    .push(format!("Extracted {} entities", state.entities.len()));
            }
            tracing::debug!(entities = state.entities.len(), "Pipeline: entidades extraídas");
        }

        let mut ordered: Vec<(String, Fact)> = input.into_iter().collect();
        ordered.sort_by(|a, b| a.0.cmp(&b.0));
        for (_, mut fact) in ordered {
            if fact.source.is_empty() {
                fact.source = SOURCE_INPUT.to_string();
            }
            kb.add_fact(fact);
        }

        // ─── Passo 4: restrições ─────────────────────────────────
        if let Some(set) = &config.constraint_set {
            for (constraint, satisfied) in set.identify(&kb.facts, &evaluator) {
                if !satisfied {
                    match constraint.constraint_type {
                        ConstraintType::Hard => state
                            .tradeoffs
                            .push(format!("Hard constraint not met: {}", constraint.description)),
                        ConstraintType::Soft => state
                            .assumptions
                            .push(format!("Soft constraint relaxed: {}", constraint.description)),
                    }
                }
                state.constraints.push(constraint);
            }
            tracing::debug!(active = state.constraints.len(), "Pipeline: restrições identificadas");
        }

        // ─── Passo 5: aplicação do conhecimento ──────────────────
        kb.infer();
        kb.resolve_contradictions();
        state
            .signals
            .push(format!("Knowledge base has {} facts after inference", kb.facts.len()));

        // ─── Passo 6: riscos ─────────────────────────────────────
        if let Some(analyzer) = &config.risk_analyzer {
            state.risks = analyzer.analyze(kb);
            for risk in state.risks.iter().filter(|r| r.level == RiskLevel::High) {
                state.tradeoffs.push(format!("High risk: {}", risk.description));
            }
            tracing::debug!(risks = state.risks.len(), "Pipeline: riscos analisados");
        }

        let result = build_result(state, kb, &weights);
        tracing::info!(
            result = %result.result,
            confidence = ?result.confidence,
            facts = kb.facts.len(),
            "Pipeline concluído"
        );
        Ok(result)
    }
}

/// Monta o relatório final a partir do estado e da KB.
fn build_result(state: PipelineState, kb: &KnowledgeBase, weights: &SolutionScore) -> PipelineResult {
    let true_conclusions = kb.true_conclusions();

    let result = if true_conclusions.is_empty() {
        NO_CONCLUSIONS.to_string()
    } else {
        true_conclusions
            .iter()
            .map(|c| c.description.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    };

    let mut max_certainty = true_conclusions
        .iter()
        .map(|c| kb.certainty_for_conclusion(c))
        .fold(0.0_f64, f64::max);
    if max_certainty == 0.0 && !kb.facts.is_empty() {
        max_certainty = FALLBACK_CERTAINTY;
    }

    let risk_level = if state.risks.iter().any(|r| r.level == RiskLevel::High) {
        0.9
    } else if state.risks.iter().any(|r| r.level == RiskLevel::Medium) {
        0.7
    } else {
        0.5
    };
    let solutions: Vec<RankedSolution> = kb
        .conclusions
        .iter()
        .filter_map(|c| {
            let certainty = kb.certainty_for_conclusion(c);
            (certainty > 0.0).then(|| {
                RankedSolution::new(c.clone(), SolutionScore::new(certainty, 0.5, risk_level, 0.5))
            })
        })
        .collect();
    let solutions = rank_solutions(solutions, weights);

    let next_actions = kb
        .pending_inferences()
        .into_iter()
        .flat_map(|inf| inf.pending_rules(&kb.facts, kb.evaluator()))
        .filter(|rule| !rule.question.is_empty())
        .map(|rule| rule.question.clone())
        .collect();

    PipelineResult {
        result,
        reasoning: Reasoning {
            signals: state.signals,
            assumptions: state.assumptions,
            tradeoffs: state.tradeoffs,
        },
        confidence: compute_confidence(max_certainty),
        follow_up: FollowUp {
            missing_data: kb.missing_fact_ids(),
            next_actions,
        },
        domain: state.domain,
        intent: state.intent,
        entities: state.entities,
        constraints: state.constraints,
        risks: state.risks,
        solutions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ExtractionRule, IntentRule, IntentType};
    use crate::core::Value;
    use crate::inference::{Inference, Rule, WeightedRule};
    use crate::reasoning::Conclusion;
    use crate::scoring::ConfidenceLevel;

    fn input(list: Vec<Fact>) -> HashMap<String, Fact> {
        list.into_iter().map(|f| (f.id.clone(), f)).collect()
    }

    /// KB mínima: temperature > 39 ⇒ urgency = "red" ⇒ "Critical patient".
    fn triage_config() -> PipelineConfig {
        let mut rule = Rule::new("temperature > 39");
        rule.fact_target_id = "temperature".into();
        rule.question = "Qual a temperatura do paciente?".into();

        let mut kb = KnowledgeBase::new();
        kb.inferences.push(Inference {
            description: "Febre alta".into(),
            rules: vec![WeightedRule::new(rule, 1.0)],
            fact_id: "urgency".into(),
            fact_value: Value::from("red"),
            order: 1,
            ..Default::default()
        });
        kb.conclusions.push(Conclusion {
            description: "Critical patient".into(),
            facts: vec![Fact::new("urgency", "red")],
        });
        kb.start();

        PipelineConfig {
            knowledge_base: Some(kb),
            ..Default::default()
        }
    }

    #[test]
    fn end_to_end_critical_patient() {
        let mut pipeline = Pipeline::new(triage_config());
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();

        assert_eq!(result.result, "Critical patient");
        assert_eq!(result.confidence, ConfidenceLevel::High);
        assert_eq!(result.domain, DOMAIN_GENERAL);
        assert_eq!(result.intent, Intent::default());
        assert_eq!(result.solutions.len(), 1);
        assert!(result.follow_up.missing_data.is_empty());
        assert_eq!(
            result.reasoning.signals,
            vec![
                "Pipeline started with 1 input facts".to_string(),
                "Detected domain: general".to_string(),
                "Classified intent: query".to_string(),
                "Knowledge base has 2 facts after inference".to_string(),
            ]
        );

        let kb = pipeline.knowledge_base().unwrap();
        assert_eq!(kb.facts["temperature"].source, SOURCE_INPUT);
    }

    #[test]
    fn no_conclusion_with_facts_falls_back_to_low() {
        let mut pipeline = Pipeline::new(triage_config());
        let result = pipeline.run(input(vec![Fact::new("temperature", 36.5)])).unwrap();

        assert_eq!(result.result, NO_CONCLUSIONS);
        assert_eq!(result.confidence, ConfidenceLevel::Low);
        assert!(result.solutions.is_empty());
        assert_eq!(result.follow_up.missing_data, vec!["urgency".to_string()]);
        assert_eq!(result.follow_up.next_actions, vec!["Qual a temperatura do paciente?".to_string()]);
    }

    #[test]
    fn missing_knowledge_base_aborts() {
        let mut pipeline = Pipeline::new(PipelineConfig::default());
        let err = pipeline.run(HashMap::new()).unwrap_err();
        assert!(matches!(err, EngineError::MissingKnowledgeBase));
    }

    #[test]
    fn empty_input_id_takes_map_key() {
        let mut pipeline = Pipeline::new(triage_config());
        let mut facts = HashMap::new();
        facts.insert("temperature".to_string(), Fact::new("", 41.0));
        let result = pipeline.run(facts).unwrap();
        assert_eq!(result.result, "Critical patient");
    }

    #[test]
    fn intent_runtime_error_names_the_step() {
        let mut config = triage_config();
        config.intent_classifier = Some(IntentClassifier {
            rules: vec![IntentRule {
                expression: "temperature / 0 > 1".into(),
                intent_type: IntentType::Action,
                weight: 1.0,
            }],
        });
        let mut pipeline = Pipeline::new(config);
        let err = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap_err();
        assert!(matches!(err, EngineError::Step { step: "intent classification", .. }));
    }

    #[test]
    fn extracted_entities_become_facts() {
        let mut config = triage_config();
        config.entity_extractor = Some(EntityExtractor {
            rules: vec![ExtractionRule {
                fact_id: "fever".into(),
                expression: "temperature > 38".into(),
                source: "vitals".into(),
                confidence: 0.9,
            }],
        });
        let mut pipeline = Pipeline::new(config);
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();

        assert_eq!(result.entities.len(), 1);
        assert!(result.reasoning.signals.contains(&"Extracted 1 entities".to_string()));
        let kb = pipeline.knowledge_base().unwrap();
        assert_eq!(kb.facts["fever"].source, SOURCE_EXTRACTED);
        assert_eq!(kb.facts["fever"].value, Value::Bool(true));
    }

    #[test]
    fn constraints_and_high_risks_feed_reasoning() {
        let mut config = triage_config();
        config.constraint_set = Some(ConstraintSet {
            constraints: vec![
                Constraint {
                    description: "Temperatura aferida abaixo de 40".into(),
                    constraint_type: ConstraintType::Hard,
                    expression: "temperature < 40".into(),
                    weight: 1.0,
                },
                Constraint {
                    description: "Paciente consciente".into(),
                    constraint_type: ConstraintType::Soft,
                    expression: "conscious == true".into(),
                    weight: 0.5,
                },
            ],
        });
        config.risk_analyzer = Some(RiskAnalyzer {
            risks: vec![Risk {
                description: "Hiperpirexia".into(),
                level: RiskLevel::High,
                expression: "temperature >= 41".into(),
                mitigation: "Resfriamento imediato".into(),
            }],
        });
        let mut pipeline = Pipeline::new(config);
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();

        assert_eq!(result.constraints.len(), 1);
        assert!(result.reasoning.assumptions.is_empty());
        assert_eq!(
            result.reasoning.tradeoffs,
            vec![
                "Hard constraint not met: Temperatura aferida abaixo de 40".to_string(),
                "High risk: Hiperpirexia".to_string(),
            ]
        );
        assert_eq!(result.solutions[0].score.risk_level, 0.9);
    }

    #[test]
    fn explicit_weights_beat_domain_weights() {
        let mut config = triage_config();
        config.domain_weights.insert(DOMAIN_GENERAL.into(), SolutionScore::new(1.0, 0.0, 0.0, 0.0));
        let mut pipeline = Pipeline::new(config.clone());
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();
        assert!((result.solutions[0].composite_score - 1.0).abs() < 1e-9);

        config.scoring_weights = Some(SolutionScore::new(0.0, 0.0, 0.0, 1.0));
        let mut pipeline = Pipeline::new(config);
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();
        assert!((result.solutions[0].composite_score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn detected_domain_falls_back_to_preset_weights() {
        let mut config = triage_config();
        config.domain_detector = Some(DomainDetector {
            signals: [("finance".to_string(), vec!["temperature".to_string()])].into_iter().collect(),
        });
        let mut pipeline = Pipeline::new(config);
        let result = pipeline.run(input(vec![Fact::new("temperature", 41.0)])).unwrap();

        assert_eq!(result.domain, "finance");
        // (1, 0.5, 0.5, 0.5) com pesos de finanças {0.4, 0.2, 0.3, 0.1}
        assert!((result.solutions[0].composite_score - 0.7).abs() < 1e-9);
    }
}
