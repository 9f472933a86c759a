//! # Gerador de Perguntas do Diálogo
//!
//! Centraliza os textos que o motor apresenta ao usuário, para que o
//! orquestrador só decida **quando** perguntar.
//!
//! | Método | Momento | Tipo |
//! |--------|---------|------|
//! | `clarify` | termo sem correspondência | texto livre |
//! | `confirm_diagnosis` | depois da pontuação | sim/não |
//! | `diagnosis_name` | usuário rejeitou os candidatos | texto livre |

use super::prompt::PromptSpec;

/// Resposta afirmativa da confirmação.
pub const YES: &str = "yes";
/// Resposta negativa da confirmação.
pub const NO: &str = "no";

/// Gerador de perguntas — unit struct sem estado.
pub struct QuestionGenerator;

impl QuestionGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Pede ao usuário outra forma de descrever um termo desconhecido.
    pub fn clarify(&self, term: &str) -> PromptSpec {
        PromptSpec::Text {
            message: format!("I don't understand: {}", term),
        }
    }

    /// Pergunta se algum dos diagnósticos apresentados serve.
    pub fn confirm_diagnosis(&self) -> PromptSpec {
        PromptSpec::Select {
            message: "Find your diagnosis?".to_string(),
            options: vec![YES.to_string(), NO.to_string()],
        }
    }

    /// Pede o nome do diagnóstico a aprender.
    pub fn diagnosis_name(&self) -> PromptSpec {
        PromptSpec::Text {
            message: "What is your diagnosis?".to_string(),
        }
    }

    /// Interpreta a resposta da confirmação. Só "no" (ou "n") é negativa.
    pub fn is_negative(answer: &str) -> bool {
        matches!(answer.trim().to_lowercase().as_str(), "no" | "n")
    }
}

impl Default for QuestionGenerator {
    fn default() -> Self {
        Self::new()
    }
}
