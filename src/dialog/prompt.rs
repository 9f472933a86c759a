//! # Protocolo de Perguntas ao Usuário
//!
//! O motor nunca lê o terminal diretamente. Toda pergunta passa por um
//! [`PromptCollaborator`], que recebe um [`PromptSpec`] e devolve um
//! [`PromptResponse`]:
//!
//! ```text
//! motor ──PromptSpec::Text{"I don't understand: cold skin"}──► colaborador
//! motor ◄──────── Answer("shivers") | Cancelled ────────────── colaborador
//! ```
//!
//! `Cancelled` significa "encerre esta linha de perguntas" — é um sinal de
//! controle, não um erro.

use async_trait::async_trait;
use serde::Serialize;

/// O que perguntar.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PromptSpec {
    /// Pergunta de texto livre.
    Text { message: String },
    /// Escolha entre opções fixas.
    Select { message: String, options: Vec<String> },
}

impl PromptSpec {
    pub fn message(&self) -> &str {
        match self {
            PromptSpec::Text { message } | PromptSpec::Select { message, .. } => message,
        }
    }
}

/// Resposta do colaborador.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptResponse {
    /// Texto digitado ou opção escolhida.
    Answer(String),
    /// O usuário abandonou esta pergunta.
    Cancelled,
}

impl PromptResponse {
    /// Resposta sem espaços nas pontas; `None` se cancelada ou em branco.
    pub fn into_answer(self) -> Option<String> {
        match self {
            PromptResponse::Answer(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            PromptResponse::Cancelled => None,
        }
    }
}

/// Quem faz as perguntas ao humano (terminal, UI, testes).
///
/// Um tempo limite de espera, se desejado, é responsabilidade da
/// implementação; o motor espera indefinidamente.
#[async_trait]
pub trait PromptCollaborator: Send + Sync {
    async fn prompt(&self, spec: PromptSpec, conversation_id: &str) -> PromptResponse;
}

#[cfg(test)]
pub(crate) use scripted::ScriptedPrompter;

#[cfg(test)]
mod scripted {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::*;

    /// Colaborador roteirizado: devolve as respostas na ordem dada e
    /// `Cancelled` quando o roteiro acaba. Guarda as perguntas recebidas.
    pub(crate) struct ScriptedPrompter {
        answers: Mutex<VecDeque<PromptResponse>>,
        asked: Mutex<Vec<PromptSpec>>,
    }

    impl ScriptedPrompter {
        pub(crate) fn new(answers: impl IntoIterator<Item = PromptResponse>) -> Self {
            Self {
                answers: Mutex::new(answers.into_iter().collect()),
                asked: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn answering<'a>(answers: impl IntoIterator<Item = &'a str>) -> Self {
            Self::new(answers.into_iter().map(|a| PromptResponse::Answer(a.to_string())))
        }

        pub(crate) fn asked(&self) -> Vec<PromptSpec> {
            self.asked.lock().clone()
        }
    }

    #[async_trait]
    impl PromptCollaborator for ScriptedPrompter {
        async fn prompt(&self, spec: PromptSpec, _conversation_id: &str) -> PromptResponse {
            self.asked.lock().push(spec);
            self.answers
                .lock()
                .pop_front()
                .unwrap_or(PromptResponse::Cancelled)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_answer_counts_as_no_answer() {
        assert_eq!(PromptResponse::Answer("  ".into()).into_answer(), None);
        assert_eq!(PromptResponse::Cancelled.into_answer(), None);
        assert_eq!(
            PromptResponse::Answer(" migraine ".into()).into_answer(),
            Some("migraine".to_string())
        );
    }

    #[test]
    fn spec_serializes_with_kind_tag() {
        let json = serde_json::to_value(PromptSpec::Select {
            message: "Find your diagnosis?".into(),
            options: vec!["yes".into(), "no".into()],
        })
        .unwrap();
        assert_eq!(json["kind"], "select");
        assert_eq!(json["options"][1], "no");
    }

    #[tokio::test]
    async fn scripted_prompter_cancels_when_exhausted() {
        let prompter = ScriptedPrompter::answering(["shivers"]);
        let spec = PromptSpec::Text { message: "?".into() };
        assert_eq!(
            prompter.prompt(spec.clone(), "c").await,
            PromptResponse::Answer("shivers".into())
        );
        assert_eq!(prompter.prompt(spec, "c").await, PromptResponse::Cancelled);
        assert_eq!(prompter.asked().len(), 2);
    }
}
