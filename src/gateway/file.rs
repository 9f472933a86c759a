//! # FileGateway — Base de Conhecimento em Arquivo JSON
//!
//! Serializa/desserializa a [`KnowledgeBase`] como JSON em disco
//! (por padrão `data/knowledge.json`).
//!
//! ## Formato de Armazenamento
//!
//! JSON "pretty-printed" para facilitar inspeção e edição manual:
//!
//! ```json
//! {
//!   "facts": { "skin": { "red": ["flu"] } },
//!   "rules": { "flu": ["/skin/red", "/fever"] },
//!   "synonyms": { "fever": ["hot"] }
//! }
//! ```
//!
//! ## Quando o Arquivo é Gravado?
//!
//! - Após o fluxo de aprendizado criar/estender uma regra
//! - Após `tell` e `assert_rule`
//!
//! A gravação escreve num arquivo temporário e renomeia por cima do
//! original, então um crash no meio não corrompe a base.
//!
//! Mudanças feitas por outro processo no arquivo só são vistas na próxima
//! assinatura.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use super::{KnowledgeGateway, KnowledgeUpdate};
use crate::core::KnowledgeBase;
use crate::error::{EngineError, EngineResult};

/// Gateway que guarda a base num arquivo JSON.
pub struct FileGateway {
    /// Caminho do arquivo da base.
    path: PathBuf,
    /// Canal de snapshots para os assinantes.
    tx: watch::Sender<KnowledgeBase>,
    /// Serializa o ciclo ler-mesclar-gravar.
    write_lock: Mutex<()>,
}

impl FileGateway {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(KnowledgeBase::new());
        Self {
            path: path.into(),
            tx,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl KnowledgeGateway for FileGateway {
    /// Carrega o arquivo e publica o snapshot.
    ///
    /// Arquivo inexistente ⇒ base vazia. Arquivo ilegível ou corrompido ⇒
    /// [`EngineError::Connection`].
    async fn subscribe(&self) -> EngineResult<watch::Receiver<KnowledgeBase>> {
        let kb = load_kb(&self.path).map_err(|e| EngineError::Connection(format!("{e:#}")))?;
        tracing::info!(
            path = %self.path.display(),
            facts = kb.fact_count(),
            rules = kb.rule_count(),
            synonyms = kb.synonyms.len(),
            "KB carregada do disco"
        );
        self.tx.send_replace(kb);
        Ok(self.tx.subscribe())
    }

    async fn save(&self, update: KnowledgeUpdate) -> EngineResult<()> {
        let kb = {
            let _guard = self.write_lock.lock();
            let mut kb = load_kb(&self.path)?;
            update.apply_to(&mut kb);
            save_kb(&self.path, &kb)?;
            kb
        };
        tracing::debug!(path = %self.path.display(), "KB gravada no disco");
        self.tx.send_replace(kb);
        Ok(())
    }
}

/// Carrega a base do disco, ou cria uma vazia se o arquivo não existir.
///
/// # Erros
///
/// Retorna erro se o arquivo existir mas estiver corrompido ou
/// incompatível com o formato atual.
pub fn load_kb(path: &Path) -> Result<KnowledgeBase> {
    if !path.exists() {
        tracing::info!("Nenhum {} encontrado, iniciando KB vazia", path.display());
        return Ok(KnowledgeBase::new());
    }
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Falha ao ler {}", path.display()))?;
    let kb: KnowledgeBase = serde_json::from_str(&json)
        .with_context(|| format!("Falha ao desserializar {}", path.display()))?;
    for (rule, missing) in kb.dangling_evidence() {
        tracing::warn!(rule = %rule, path = %missing, "Evidência aponta para fato inexistente");
    }
    Ok(kb)
}

/// Grava a base como JSON pretty-printed (escreve em `.tmp` e renomeia).
///
/// Cria o diretório pai se não existir.
pub fn save_kb(path: &Path, kb: &KnowledgeBase) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Falha ao criar diretório {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(kb).context("Falha ao serializar KnowledgeBase")?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).with_context(|| format!("Falha ao escrever {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Falha ao substituir {}", path.display()))?;
    Ok(())
}
