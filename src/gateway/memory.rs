//! Gateway em memória: o snapshot vive num `watch` do tokio.
//!
//! Serve para testes e para embutir o motor sem disco. `publish` simula
//! uma mudança vinda de outro processo.

use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::watch;

use super::{KnowledgeGateway, KnowledgeUpdate};
use crate::core::KnowledgeBase;
use crate::error::{EngineError, EngineResult};

pub struct MemoryGateway {
    tx: watch::Sender<KnowledgeBase>,
    read_only: bool,
    saves: AtomicUsize,
}

impl MemoryGateway {
    pub fn new(initial: KnowledgeBase) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            tx,
            read_only: false,
            saves: AtomicUsize::new(0),
        }
    }

    /// Gateway que recusa gravações com [`EngineError::Persistence`].
    pub fn read_only(initial: KnowledgeBase) -> Self {
        Self {
            read_only: true,
            ..Self::new(initial)
        }
    }

    /// Substitui o snapshot inteiro e notifica os assinantes.
    pub fn publish(&self, kb: KnowledgeBase) {
        self.tx.send_replace(kb);
    }

    /// Cópia do snapshot armazenado.
    pub fn current(&self) -> KnowledgeBase {
        self.tx.borrow().clone()
    }

    /// Quantas gravações foram aceitas.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KnowledgeGateway for MemoryGateway {
    async fn subscribe(&self) -> EngineResult<watch::Receiver<KnowledgeBase>> {
        Ok(self.tx.subscribe())
    }

    async fn save(&self, update: KnowledgeUpdate) -> EngineResult<()> {
        if self.read_only {
            return Err(EngineError::Persistence(anyhow!(
                "armazenamento em memória somente leitura"
            )));
        }
        self.tx.send_modify(|kb| update.apply_to(kb));
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FactPath;

    #[tokio::test]
    async fn save_notifies_subscribers() {
        let gateway = MemoryGateway::new(KnowledgeBase::new());
        let mut rx = gateway.subscribe().await.unwrap();

        let mut kb = KnowledgeBase::new();
        kb.learn_rule("flu", &[FactPath::parse("/fever").unwrap()]).unwrap();
        gateway.save(KnowledgeUpdate::facts_and_rules(&kb)).await.unwrap();

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().rule_count(), 1);
        assert_eq!(gateway.save_count(), 1);
    }

    #[tokio::test]
    async fn read_only_rejects_saves() {
        let gateway = MemoryGateway::read_only(KnowledgeBase::new());
        let result = gateway.save(KnowledgeUpdate::default()).await;
        assert!(matches!(result, Err(EngineError::Persistence(_))));
        assert_eq!(gateway.save_count(), 0);
    }
}
