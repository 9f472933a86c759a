//! # CertaintyEngine — Pontuação de Regras por Certeza
//!
//! A certeza de uma regra é a fração das suas evidências que foi observada
//! nesta consulta:
//!
//! ```text
//! certainty = factCount / totalFacts
//!
//! flu exige [/skin/red, /fever]
//! observado  [/skin/red]
//! → flu: factCount = 1, totalFacts = 2, certainty = 0.5
//! ```
//!
//! ## Regras de Contagem
//!
//! - cada **caminho distinto** conta uma vez por regra, mesmo que a folha
//!   repita o nome da regra
//! - nomes de regra em branco são ignorados
//! - `totalFacts == 0` (regra sem evidências ou ausente do índice) ⇒
//!   `certainty = 0`, nunca divisão por zero
//! - a certeza é limitada a `[0, 1]` mesmo com índices inconsistentes

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::core::{FactPath, RuleId, RuleIndex};

/// Fatos resolvidos numa consulta: caminho → lista de regras da folha.
pub type MatchResult = BTreeMap<FactPath, Vec<RuleId>>;

/// Pontuações da consulta, por regra. A ordem não é significativa.
pub type Scores = HashMap<RuleId, Candidate>;

/// Uma regra candidata e a sua certeza.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Quantos fatos observados sustentam a regra.
    pub fact_count: usize,
    /// Tamanho do conjunto de evidências da regra.
    pub total_facts: usize,
    /// `fact_count / total_facts`, em `[0, 1]`.
    pub certainty: f64,
}

impl Candidate {
    /// `true` quando todas as evidências da regra foram observadas.
    pub fn is_certain(&self) -> bool {
        self.total_facts > 0 && self.fact_count >= self.total_facts
    }
}

/// Motor de certeza — struct sem estado, como o motor de inferência.
pub struct CertaintyEngine;

impl CertaintyEngine {
    /// Agrega os fatos resolvidos em candidatos pontuados.
    pub fn score(resolved: &MatchResult, rules: &RuleIndex) -> Scores {
        let mut scores: Scores = HashMap::new();

        for rule_ids in resolved.values() {
            let mut counted: HashSet<&str> = HashSet::new();
            for rule in rule_ids {
                let rule = rule.trim();
                if rule.is_empty() || !counted.insert(rule) {
                    continue;
                }
                let candidate = scores.entry(rule.to_string()).or_insert_with(|| Candidate {
                    fact_count: 0,
                    total_facts: rules.total_facts(rule),
                    certainty: 0.0,
                });
                candidate.fact_count += 1;
            }
        }

        for (rule, candidate) in scores.iter_mut() {
            if candidate.total_facts > 0 && candidate.fact_count > candidate.total_facts {
                tracing::warn!(
                    rule = %rule,
                    fact_count = candidate.fact_count,
                    total_facts = candidate.total_facts,
                    "Folhas citam a regra mais vezes que a sua evidência; índice inconsistente"
                );
            }
            candidate.certainty = if candidate.total_facts == 0 {
                0.0
            } else {
                (candidate.fact_count as f64 / candidate.total_facts as f64).min(1.0)
            };
            tracing::debug!(
                rule = %rule,
                fact_count = candidate.fact_count,
                total_facts = candidate.total_facts,
                certainty = %format!("{:.2}", candidate.certainty),
                "Candidato pontuado"
            );
        }

        scores
    }

    /// Candidatos em ordem de certeza decrescente (empate: nome da regra).
    ///
    /// Usado apenas para exibição; o resultado de [`score`](Self::score)
    /// não tem ordem.
    pub fn ranked(scores: &Scores) -> Vec<(&RuleId, &Candidate)> {
        let mut ranked: Vec<(&RuleId, &Candidate)> = scores.iter().collect();
        ranked.sort_by(|a, b| {
            b.1.certainty
                .partial_cmp(&a.1.certainty)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RuleIndex {
        serde_json::from_str(
            r#"{"flu": ["/skin/red", "/fever"], "bruise": ["/skin/purple"], "empty": []}"#,
        )
        .unwrap()
    }

    fn resolved(entries: &[(&str, &[&str])]) -> MatchResult {
        entries
            .iter()
            .map(|(path, rules)| {
                (
                    FactPath::parse(path).unwrap(),
                    rules.iter().map(|r| r.to_string()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn half_of_the_evidence_gives_half_certainty() {
        let scores = CertaintyEngine::score(&resolved(&[("/skin/red", &["flu"])]), &rules());
        assert_eq!(
            scores["flu"],
            Candidate { fact_count: 1, total_facts: 2, certainty: 0.5 }
        );
    }

    #[test]
    fn full_evidence_is_certain() {
        let scores = CertaintyEngine::score(
            &resolved(&[("/skin/red", &["flu"]), ("/fever", &["flu"])]),
            &rules(),
        );
        assert_eq!(scores["flu"].certainty, 1.0);
        assert!(scores["flu"].is_certain());
    }

    #[test]
    fn repeated_rule_in_one_leaf_counts_once() {
        let scores = CertaintyEngine::score(&resolved(&[("/skin/red", &["flu", "flu"])]), &rules());
        assert_eq!(scores["flu"].fact_count, 1);
    }

    #[test]
    fn blank_rule_ids_are_skipped() {
        let scores = CertaintyEngine::score(&resolved(&[("/skin/red", &["", "  ", "flu"])]), &rules());
        assert_eq!(scores.len(), 1);
    }

    #[test]
    fn zero_total_facts_means_zero_certainty() {
        let scores = CertaintyEngine::score(
            &resolved(&[("/fever", &["empty", "unknown"])]),
            &rules(),
        );
        assert_eq!(scores["empty"].certainty, 0.0);
        assert_eq!(scores["unknown"].total_facts, 0);
        assert_eq!(scores["unknown"].certainty, 0.0);
    }

    #[test]
    fn certainty_stays_within_bounds() {
        // Índice inconsistente: a folha cita a regra, o índice não cita a folha.
        let scores = CertaintyEngine::score(
            &resolved(&[("/skin/purple", &["bruise"]), ("/fever", &["bruise"])]),
            &rules(),
        );
        for candidate in scores.values() {
            assert!((0.0..=1.0).contains(&candidate.certainty));
        }
        let bruise = &scores["bruise"];
        assert_eq!((bruise.fact_count, bruise.total_facts), (2, 1));
        assert_eq!(bruise.certainty, 1.0);
    }

    #[test]
    fn ranked_orders_by_certainty() {
        let scores = CertaintyEngine::score(
            &resolved(&[("/skin/red", &["flu"]), ("/skin/purple", &["bruise"])]),
            &rules(),
        );
        let ranked = CertaintyEngine::ranked(&scores);
        assert_eq!(ranked[0].0, "bruise");
        assert_eq!(ranked[1].0, "flu");
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let json = serde_json::to_value(Candidate { fact_count: 1, total_facts: 2, certainty: 0.5 })
            .unwrap();
        assert_eq!(json["factCount"], 1);
        assert_eq!(json["totalFacts"], 2);
    }
}
