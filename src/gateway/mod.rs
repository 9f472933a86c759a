//! # Gateway — Armazenamento Durável e Notificação de Mudanças
//!
//! O motor não sabe onde a base de conhecimento mora. Ele conversa com um
//! [`KnowledgeGateway`]:
//!
//! ```text
//! subscribe() ──► watch::Receiver<KnowledgeBase>
//!                   ├── snapshot atual, disponível imediatamente
//!                   └── um novo snapshot inteiro a cada mudança
//!
//! save(KnowledgeUpdate { facts?, rules? })
//!                   └── mescla os campos dados no armazenamento
//!                       e notifica os assinantes
//! ```
//!
//! ## Implementações
//!
//! | Tipo | Armazenamento | Uso |
//! |------|---------------|-----|
//! | [`FileGateway`] | arquivo JSON | binário / produção |
//! | [`MemoryGateway`] | memória do processo | testes, embutir o motor |
//!
//! Instâncias diferentes do motor gravando no mesmo armazenamento competem
//! com semântica "última escrita vence".

/// Gateway baseado em arquivo JSON.
pub mod file;

/// Gateway em memória.
pub mod memory;

use async_trait::async_trait;
use tokio::sync::watch;

use crate::core::{FactTree, KnowledgeBase, RuleIndex};
use crate::error::EngineResult;

pub use file::FileGateway;
pub use memory::MemoryGateway;

/// Atualização parcial: só os campos `Some` são gravados.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KnowledgeUpdate {
    pub facts: Option<FactTree>,
    pub rules: Option<RuleIndex>,
}

impl KnowledgeUpdate {
    /// Atualização com a árvore de fatos e o índice de regras.
    pub fn facts_and_rules(kb: &KnowledgeBase) -> Self {
        Self {
            facts: Some(kb.facts.clone()),
            rules: Some(kb.rules.clone()),
        }
    }

    /// Atualização só com a árvore de fatos.
    pub fn facts_only(kb: &KnowledgeBase) -> Self {
        Self {
            facts: Some(kb.facts.clone()),
            rules: None,
        }
    }

    /// Sobrescreve em `kb` os campos presentes nesta atualização.
    pub fn apply_to(self, kb: &mut KnowledgeBase) {
        if let Some(facts) = self.facts {
            kb.facts = facts;
        }
        if let Some(rules) = self.rules {
            kb.rules = rules;
        }
    }
}

/// Armazenamento durável da base de conhecimento.
#[async_trait]
pub trait KnowledgeGateway: Send + Sync {
    /// Assina os snapshots da base.
    ///
    /// # Erros
    ///
    /// [`EngineError::Connection`](crate::error::EngineError::Connection)
    /// se o armazenamento não puder ser aberto.
    async fn subscribe(&self) -> EngineResult<watch::Receiver<KnowledgeBase>>;

    /// Grava os campos presentes em `update`. Atômico apenas por chamada.
    async fn save(&self, update: KnowledgeUpdate) -> EngineResult<()>;
}
