//! # Erros do Motor de Inferência
//!
//! Taxonomia única de falhas do motor, usada por todas as camadas
//! (base de conhecimento, gateway, orquestrador).
//!
//! | Variante | Quando acontece | Fatal? |
//! |----------|-----------------|--------|
//! | `Configuration` | configuração inválida na inicialização | sim |
//! | `Connection` | gateway não consegue abrir/assinar o armazenamento | sim |
//! | `FactNotFound` | modo estrito, termo sem correspondência | aborta o `ask` |
//! | `AmbiguousValue` | leitura escalar caiu numa sub-árvore | não |
//! | `InvalidPath` | caminho com segmento vazio | não |
//! | `InvalidRule` | regra sem nome ou sem evidências | não |
//! | `Persistence` | falha ao gravar no armazenamento | não |
//!
//! O cancelamento de um prompt **não** é erro: ele é modelado por
//! [`PromptResponse::Cancelled`](crate::dialog::PromptResponse::Cancelled).

use thiserror::Error;

/// Erros do motor de inferência.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuração inválida: {0}")]
    Configuration(String),

    #[error("falha de conexão com a base de conhecimento: {0}")]
    Connection(String),

    #[error("fato não encontrado: {0}")]
    FactNotFound(String),

    #[error("o campo buscado não contém um valor único, refine a busca: {0}")]
    AmbiguousValue(String),

    #[error("caminho de fato inválido: '{0}'")]
    InvalidPath(String),

    #[error("regra inválida: {0}")]
    InvalidRule(String),

    /// Falha de escrita no armazenamento durável. A mutação em memória
    /// não é desfeita.
    #[error("falha de persistência: {0:#}")]
    Persistence(#[from] anyhow::Error),
}

/// Alias de resultado usado em todo o crate.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
