//! # Symptom Inference
//!
//! Motor de inferência diagnóstica baseado em regras. O usuário descreve
//! sintomas em texto livre; o motor resolve cada descrição em fatos de
//! uma árvore, pontua as regras (diagnósticos) que dependem desses fatos
//! e aprende regras novas quando o usuário rejeita os candidatos.
//!
//! ## Camadas
//!
//! ```text
//! orchestrator   InferenceEngine: ask / tell / ask_fact / assert_rule
//!   ├── dialog     perguntas ao usuário (PromptCollaborator)
//!   ├── gateway    armazenamento durável (KnowledgeGateway)
//!   ├── inference  FactMatcher + CertaintyEngine
//!   └── core       FactTree, RuleIndex, SynonymTable, KnowledgeBase
//! ```
//!
//! ## Exemplo
//!
//! ```no_run
//! use std::sync::Arc;
//! use symptom_inference::{EngineConfig, FileGateway, InferenceEngine};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = EngineConfig::load()?;
//! let gateway = Arc::new(FileGateway::new(&config.knowledge_path));
//! let mut engine = InferenceEngine::new(config);
//! engine.subscribe_to_knowledge(gateway).await?;
//!
//! let consultation = engine.ask("skin red, fever", "conversa-1").await?;
//! for (rule, candidate) in symptom_inference::inference::CertaintyEngine::ranked(&consultation.scores) {
//!     println!("{rule}: {:.0}%", candidate.certainty * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

/// Configuração em camadas (padrões, TOML, ambiente).
pub mod config;

/// Tipos fundamentais: FactTree, RuleIndex, SynonymTable, KnowledgeBase.
pub mod core;

/// Perguntas ao usuário.
pub mod dialog;

/// Erros do motor.
pub mod error;

/// Armazenamento durável e notificação de snapshots.
pub mod gateway;

/// Casamento de fatos e pontuação de certeza.
pub mod inference;

/// O motor de inferência e o ciclo de consulta.
pub mod orchestrator;

pub use config::{EngineConfig, ResolutionMode};
pub use error::{EngineError, EngineResult};
pub use gateway::{FileGateway, KnowledgeGateway, KnowledgeUpdate, MemoryGateway};
pub use orchestrator::{Consultation, InferenceEngine, LearnedRule};
