//! # Módulo Inference — Casamento de Fatos e Certeza
//!
//! Duas etapas puras, sem I/O, usadas a cada consulta:
//!
//! | Etapa | Entrada | Saída |
//! |-------|---------|-------|
//! | [`FactMatcher`] | termo composto ("skin red") | caminhos de fato |
//! | [`CertaintyEngine`] | caminhos → regras | certeza por regra |
//!
//! ## Exemplo
//!
//! ```text
//! "skin red"  → FactMatcher → [/skin/red] → leaf ["flu"]
//!             → CertaintyEngine → flu: 1/2 = 0.5
//! ```

/// Resolução de termos compostos em caminhos da árvore.
pub mod matcher;

/// Pontuação de regras candidatas.
pub mod certainty;

pub use certainty::{Candidate, CertaintyEngine, MatchResult, Scores};
pub use matcher::{difference, FactMatcher};
