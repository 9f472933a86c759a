//! # Módulo Core — Modelo de Dados do Conhecimento
//!
//! Os tipos que formam a base de conhecimento diagnóstica:
//!
//! - [`FactTree`] / [`FactNode`] — árvore hierárquica de fatos observáveis
//! - [`FactPath`] — endereço único de uma folha (`/skin/red`)
//! - [`Scalar`] — valor do armazenamento escalar legado
//! - [`RuleIndex`] — regra → conjunto de evidências
//! - [`SynonymTable`] — termo canônico → formas alternativas
//! - [`KnowledgeBase`] — um snapshot consistente com os três acima
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use symptom_inference::core::{FactPath, KnowledgeBase};
//!
//! let kb: KnowledgeBase = serde_json::from_str(
//!     r#"{"facts": {"skin": {"red": ["flu"]}}, "rules": {"flu": ["/skin/red", "/fever"]}}"#,
//! ).unwrap();
//!
//! let red = FactPath::parse("/skin/red").unwrap();
//! assert_eq!(kb.facts.leaf_rules(&red), Some(&["flu".to_string()][..]));
//! assert_eq!(kb.rules.total_facts("flu"), 2);
//! ```

/// Árvore de fatos, caminhos e escalares.
pub mod fact_tree;

/// Índice de regras.
pub mod rules;

/// Tabela de sinônimos.
pub mod synonyms;

/// Snapshot completo da base.
pub mod knowledge_base;

pub use fact_tree::{FactNode, FactPath, FactTree, Scalar, PATH_SEPARATOR};
pub use knowledge_base::KnowledgeBase;
pub use rules::{RuleId, RuleIndex};
pub use synonyms::SynonymTable;
