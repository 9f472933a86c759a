//! # Módulo Dialog — Conversa com o Usuário
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`prompt`] | protocolo `PromptSpec` / `PromptResponse` / `PromptCollaborator` |
//! | [`question`] | textos das perguntas de esclarecimento e aprendizado |

/// Protocolo de perguntas e o trait do colaborador.
pub mod prompt;

/// Gerador dos textos das perguntas.
pub mod question;

pub use prompt::{PromptCollaborator, PromptResponse, PromptSpec};
pub use question::QuestionGenerator;
