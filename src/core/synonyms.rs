//! # SynonymTable — Formas Alternativas dos Termos
//!
//! Quando a busca direta na árvore falha, o termo do usuário pode ser só uma
//! outra forma de dizer um termo conhecido:
//!
//! ```text
//! fever → [hot, temperature]
//! "temperature high"  →  resolve()  →  ["fever"]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Tabela termo canônico → formas alternativas.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SynonymTable {
    entries: BTreeMap<String, Vec<String>>,
}

impl SynonymTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Termos canônicos encontrados em `term`, na ordem dos tokens.
    ///
    /// Cada token é comparado com todas as entradas; uma entrada casa se o
    /// token for o próprio termo canônico ou uma das alternativas. A
    /// comparação não diferencia maiúsculas de minúsculas.
    pub fn resolve(&self, term: &str) -> Vec<String> {
        let mut found = Vec::new();
        for token in term.split_whitespace() {
            let token = token.to_lowercase();
            for (canonical, alternates) in &self.entries {
                let hit = canonical.to_lowercase() == token
                    || alternates.iter().any(|alt| alt.to_lowercase() == token);
                if hit {
                    found.push(canonical.clone());
                }
            }
        }
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SynonymTable {
        serde_json::from_str(
            r#"{"fever": ["hot", "temperature"], "shakings": ["shivers", "trembling"]}"#,
        )
        .unwrap()
    }

    #[test]
    fn canonical_term_resolves_to_itself() {
        assert_eq!(table().resolve("fever"), vec!["fever"]);
    }

    #[test]
    fn every_alternate_resolves_to_its_canonical() {
        let t = table();
        assert_eq!(t.resolve("hot"), vec!["fever"]);
        assert_eq!(t.resolve("Temperature"), vec!["fever"]);
        assert_eq!(t.resolve("trembling"), vec!["shakings"]);
    }

    #[test]
    fn scans_all_tokens_in_order() {
        assert_eq!(
            table().resolve("shivers and hot"),
            vec!["shakings".to_string(), "fever".to_string()]
        );
    }

    #[test]
    fn unknown_term_resolves_to_nothing() {
        assert!(table().resolve("cold skin").is_empty());
    }
}
