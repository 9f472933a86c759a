//! # RuleIndex — Regras como Dados
//!
//! Cada regra é apenas um nome e o seu **conjunto de evidências**: a lista
//! de [`FactPath`]s que, observados todos juntos, tornam a regra certa.
//!
//! ```text
//! flu → [/skin/red, /fever]      totalFacts = 2
//! ```
//!
//! Regras nunca são código executável.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::fact_tree::FactPath;

/// Identificador de uma regra (o seu nome).
pub type RuleId = String;

/// Índice nome da regra → conjunto de evidências.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleIndex {
    rules: BTreeMap<RuleId, Vec<FactPath>>,
}

impl RuleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evidências da regra, se ela existir.
    pub fn evidence(&self, rule: &str) -> Option<&[FactPath]> {
        self.rules.get(rule).map(Vec::as_slice)
    }

    /// Tamanho do conjunto de evidências (`totalFacts`); 0 se a regra não existe.
    pub fn total_facts(&self, rule: &str) -> usize {
        self.rules.get(rule).map_or(0, Vec::len)
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains_key(rule)
    }

    /// Registra `rule` ou estende suas evidências com os caminhos que ainda
    /// não estão lá. A ordem de chegada é preservada.
    ///
    /// Retorna quantos caminhos foram acrescentados.
    pub fn extend(&mut self, rule: &str, evidence: &[FactPath]) -> usize {
        let entry = self.rules.entry(rule.to_string()).or_default();
        let mut added = 0;
        for path in evidence {
            if !entry.contains(path) {
                entry.push(path.clone());
                added += 1;
            }
        }
        added
    }

    /// Regras cuja evidência fica em `path`, abaixo dele ou acima dele.
    ///
    /// É a fila de trabalho de um `tell`: as regras que precisam ser
    /// reavaliadas quando o fato em `path` muda.
    pub fn affected_by(&self, path: &FactPath) -> Vec<RuleId> {
        self.rules
            .iter()
            .filter(|(_, evidence)| {
                evidence
                    .iter()
                    .any(|e| e.starts_with(path) || path.starts_with(e))
            })
            .map(|(rule, _)| rule.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, &Vec<FactPath>)> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extend_creates_then_grows_without_duplicates() {
        let red = FactPath::parse("/skin/red").unwrap();
        let fever = FactPath::parse("/fever").unwrap();
        let mut index = RuleIndex::new();

        assert_eq!(index.extend("flu", &[red.clone()]), 1);
        assert_eq!(index.extend("flu", &[red.clone(), fever.clone()]), 1);
        assert_eq!(index.evidence("flu"), Some(&[red, fever][..]));
        assert_eq!(index.total_facts("flu"), 2);
        assert_eq!(index.total_facts("unknown"), 0);
    }

    #[test]
    fn deserializes_from_json_map() {
        let index: RuleIndex =
            serde_json::from_str(r#"{"flu": ["/skin/red", "/fever"]}"#).unwrap();
        assert!(index.contains("flu"));
        assert_eq!(index.total_facts("flu"), 2);
    }

    #[test]
    fn affected_by_follows_the_path_in_both_directions() {
        let index: RuleIndex = serde_json::from_str(
            r#"{"flu": ["/skin/red", "/fever"], "bruise": ["/skin/purple"], "cold": ["/cough"]}"#,
        )
        .unwrap();
        let path = |raw: &str| FactPath::parse(raw).unwrap();

        assert_eq!(index.affected_by(&path("/fever")), vec!["flu".to_string()]);
        assert_eq!(
            index.affected_by(&path("/skin")),
            vec!["bruise".to_string(), "flu".to_string()]
        );
        assert_eq!(index.affected_by(&path("/skin/red/shade")), vec!["flu".to_string()]);
        assert!(index.affected_by(&path("/skinny")).is_empty());
    }

    #[test]
    fn rejects_malformed_evidence_paths() {
        let parsed: Result<RuleIndex, _> = serde_json::from_str(r#"{"flu": ["/skin//red"]}"#);
        assert!(parsed.is_err());
    }
}
