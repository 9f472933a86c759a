//! # KnowledgeBase — Um Snapshot Consistente do Conhecimento
//!
//! A [`KnowledgeBase`] junta as três estruturas que o motor consulta:
//!
//! - **facts**: [`FactTree`] — o que pode ser observado
//! - **rules**: [`RuleIndex`] — o que cada diagnóstico exige
//! - **synonyms**: [`SynonymTable`] — outras formas de dizer a mesma coisa
//!
//! Ela é sempre tratada como **um valor único**: o gateway entrega um
//! snapshot inteiro, e o motor troca o snapshot local de uma vez
//! (nunca mescla campos de dois snapshots diferentes).
//!
//! ## Formato Serializado
//!
//! ```json
//! {
//!   "facts":    { "skin": { "red": ["flu"] }, "fever": ["flu"] },
//!   "rules":    { "flu": ["/skin/red", "/fever"] },
//!   "synonyms": { "fever": ["hot"] }
//! }
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use symptom_inference::core::{FactPath, KnowledgeBase};
//!
//! let mut kb = KnowledgeBase::new();
//! let red = FactPath::parse("/skin/red").unwrap();
//! kb.learn_rule("flu", &[red.clone()]).unwrap();
//!
//! assert_eq!(kb.rules.total_facts("flu"), 1);
//! assert_eq!(kb.facts.leaf_rules(&red), Some(&["flu".to_string()][..]));
//! ```

use serde::{Deserialize, Serialize};

use super::fact_tree::{FactPath, FactTree};
use super::rules::RuleIndex;
use super::synonyms::SynonymTable;
use crate::error::EngineResult;

/// Snapshot completo da base de conhecimento.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBase {
    /// Árvore hierárquica de fatos.
    pub facts: FactTree,
    /// Regras e seus conjuntos de evidências.
    pub rules: RuleIndex,
    /// Sinônimos consultados quando a busca direta falha.
    pub synonyms: SynonymTable,
}

impl KnowledgeBase {
    /// Cria uma base vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra a regra `name` com as evidências `evidence`, ou estende as
    /// evidências de uma regra existente, e anota `name` em cada folha.
    ///
    /// É a única mutação de regras do motor: usada pelo fluxo de
    /// aprendizado e por `assert_rule`. Folhas ausentes são criadas vazias
    /// antes de receberem o nome. Tudo ou nada: se algum caminho for
    /// rejeitado, nem a árvore nem o índice mudam.
    ///
    /// Emite log de nível `info` com o nome e o total de evidências.
    ///
    /// # Erros
    ///
    /// [`EngineError::InvalidPath`](crate::error::EngineError::InvalidPath) se algum caminho atravessar ou apontar
    /// para um nó que não é folha.
    pub fn learn_rule(&mut self, name: &str, evidence: &[FactPath]) -> EngineResult<usize> {
        let mut facts = self.facts.clone();
        for path in evidence {
            facts.append_rule(path, name)?;
        }
        self.facts = facts;

        let added = self.rules.extend(name, evidence);
        tracing::info!(
            rule = %name,
            added,
            total_facts = self.rules.total_facts(name),
            "KB: regra aprendida"
        );
        Ok(added)
    }

    /// Regras cuja evidência menciona uma folha inexistente na árvore.
    ///
    /// Útil para avisar, na carga, que um snapshot chegou inconsistente.
    pub fn dangling_evidence(&self) -> Vec<(String, FactPath)> {
        self.rules
            .iter()
            .flat_map(|(rule, paths)| {
                paths
                    .iter()
                    .filter(|p| self.facts.leaf_rules(p).is_none())
                    .map(move |p| (rule.clone(), p.clone()))
            })
            .collect()
    }

    /// Número de fatos observáveis (folhas).
    pub fn fact_count(&self) -> usize {
        self.facts.leaf_count()
    }

    /// Número de regras.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    #[test]
    fn deserializes_full_snapshot() {
        let kb: KnowledgeBase = serde_json::from_str(
            r#"{
                "facts": {"skin": {"red": ["flu"], "purple": ["bruise"]}, "fever": ["flu"]},
                "rules": {"flu": ["/skin/red", "/fever"], "bruise": ["/skin/purple"]},
                "synonyms": {"fever": ["hot"]}
            }"#,
        )
        .unwrap();
        assert_eq!(kb.fact_count(), 3);
        assert_eq!(kb.rule_count(), 2);
        assert_eq!(kb.synonyms.resolve("hot"), vec!["fever"]);
        assert!(kb.dangling_evidence().is_empty());
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let kb: KnowledgeBase = serde_json::from_str(r#"{"facts": {"fever": []}}"#).unwrap();
        assert_eq!(kb.fact_count(), 1);
        assert!(kb.rules.is_empty());
        assert!(kb.synonyms.is_empty());
    }

    #[test]
    fn learn_rule_extends_existing_rule() {
        let red = FactPath::parse("/skin/red").unwrap();
        let fever = FactPath::parse("/fever").unwrap();
        let mut kb = KnowledgeBase::new();
        kb.learn_rule("flu", &[red.clone()]).unwrap();
        let added = kb.learn_rule("flu", &[red.clone(), fever.clone()]).unwrap();

        assert_eq!(added, 1);
        assert_eq!(kb.rules.evidence("flu"), Some(&[red.clone(), fever.clone()][..]));
        assert_eq!(kb.facts.leaf_rules(&red), Some(&["flu".to_string()][..]));
        assert_eq!(kb.facts.leaf_rules(&fever), Some(&["flu".to_string()][..]));
    }

    #[test]
    fn learn_rule_rejects_non_leaf_evidence_without_changes() {
        let mut kb: KnowledgeBase = serde_json::from_str(
            r#"{
                "facts": {"skin": {"red": ["flu"], "purple": ["bruise"]}, "fever": ["flu"]},
                "rules": {"flu": ["/skin/red", "/fever"], "bruise": ["/skin/purple"]}
            }"#,
        )
        .unwrap();
        let before = kb.clone();
        let path = |raw: &str| FactPath::parse(raw).unwrap();

        let result = kb.learn_rule("rash", &[path("/skin")]);
        assert!(matches!(result, Err(EngineError::InvalidPath(_))));
        let result = kb.learn_rule("highfever", &[path("/cough"), path("/fever/high")]);
        assert!(matches!(result, Err(EngineError::InvalidPath(_))));
        let result = kb.learn_rule("nested", &[path("/eyes"), path("/eyes/dry")]);
        assert!(matches!(result, Err(EngineError::InvalidPath(_))));

        assert_eq!(kb, before);
        assert!(kb.dangling_evidence().is_empty());
    }

    #[test]
    fn reports_dangling_evidence() {
        let kb: KnowledgeBase = serde_json::from_str(
            r#"{"facts": {"fever": ["flu"]}, "rules": {"flu": ["/fever", "/cough"]}}"#,
        )
        .unwrap();
        let dangling = kb.dangling_evidence();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].1.to_string(), "/cough");
    }
}
