//! # Symptom Inference — Terminal
//!
//! Front-end de terminal do motor de inferência diagnóstica.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (stderr)
//!   ├── EngineConfig::load()  (padrões → data/engine.toml → ambiente)
//!   ├── FileGateway sobre knowledge_path
//!   ├── InferenceEngine + assinatura de snapshots
//!   ├── TerminalPrompter como colaborador
//!   └── Loop de comandos até EOF ou "quit"
//! ```
//!
//! ## Comandos
//!
//! | Entrada | Ação |
//! |---------|------|
//! | `skin red, fever` | consulta diagnóstica |
//! | `tell /a/b 5` | grava um escalar |
//! | `fact /a/b` | lê um escalar |
//! | `rule flu /skin/red /fever` | registra uma regra |
//! | `quit` | encerra |
//!
//! Nas perguntas, uma linha vazia cancela.
//!
//! ```bash
//! RUST_LOG=debug cargo run
//! SYMPTOM_MODE=interactive SYMPTOM_KB_PATH=/tmp/kb.json cargo run
//! ```

use std::io::Write;
use std::sync::{Arc, OnceLock};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use symptom_inference::core::{FactPath, Scalar};
use symptom_inference::dialog::{PromptCollaborator, PromptResponse, PromptSpec};
use symptom_inference::inference::CertaintyEngine;
use symptom_inference::{Consultation, EngineConfig, EngineError, FileGateway, InferenceEngine};

/// Colaborador que pergunta no terminal.
struct TerminalPrompter {
    lines: Mutex<Lines<BufReader<Stdin>>>,
}

impl TerminalPrompter {
    fn new() -> Self {
        Self {
            lines: Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Mostra `prompt` e lê uma linha. `None` em EOF.
    async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        self.lines.lock().await.next_line().await
    }
}

#[async_trait]
impl PromptCollaborator for TerminalPrompter {
    async fn prompt(&self, spec: PromptSpec, _conversation_id: &str) -> PromptResponse {
        let shown = match &spec {
            PromptSpec::Text { message } => format!("{message}\n> "),
            PromptSpec::Select { message, options } => {
                let numbered: Vec<String> = options
                    .iter()
                    .enumerate()
                    .map(|(i, option)| format!("{}) {option}", i + 1))
                    .collect();
                format!("{message} [{}]\n> ", numbered.join("  "))
            }
        };

        let line = match self.read_line(&shown).await {
            Ok(Some(line)) if !line.trim().is_empty() => line.trim().to_string(),
            Ok(_) => return PromptResponse::Cancelled,
            Err(e) => {
                tracing::warn!(error = %e, "Falha ao ler do terminal");
                return PromptResponse::Cancelled;
            }
        };

        // Em seleções, aceita o número da opção.
        if let PromptSpec::Select { options, .. } = &spec {
            if let Some(option) = line
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i))
            {
                return PromptResponse::Answer(option.clone());
            }
        }
        PromptResponse::Answer(line)
    }
}

/// Um comando do loop principal.
#[derive(Debug, PartialEq)]
enum Command {
    Quit,
    Tell { path: String, value: Scalar },
    Fact { path: String },
    Rule { name: String, evidence: Vec<String> },
    Symptoms(String),
}

fn tell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^tell\s+(/\S+)\s+(.+)$").unwrap())
}

fn fact_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^fact\s+(/\S+)$").unwrap())
}

fn rule_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^rule\s+(\S+)((?:\s+/\S+)+)$").unwrap())
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if matches!(line, "quit" | "exit") {
            return Self::Quit;
        }
        if let Some(caps) = tell_re().captures(line) {
            return Self::Tell {
                path: caps[1].to_string(),
                value: Scalar::parse(&caps[2]),
            };
        }
        if let Some(caps) = fact_re().captures(line) {
            return Self::Fact {
                path: caps[1].to_string(),
            };
        }
        if let Some(caps) = rule_re().captures(line) {
            return Self::Rule {
                name: caps[1].to_string(),
                evidence: caps[2].split_whitespace().map(str::to_string).collect(),
            };
        }
        Self::Symptoms(line.to_string())
    }
}

fn print_consultation(consultation: &Consultation) {
    let ranked = CertaintyEngine::ranked(&consultation.scores);
    if ranked.is_empty() {
        println!("Nenhum diagnóstico candidato.");
    }
    for (rule, candidate) in ranked {
        let mark = if candidate.is_certain() { " ✓" } else { "" };
        println!(
            "  {rule}: {}/{} ({:.0}%){mark}",
            candidate.fact_count,
            candidate.total_facts,
            candidate.certainty * 100.0
        );
    }
    for term in &consultation.skipped {
        println!("  (ignorado: {term})");
    }
    if let Some(learned) = &consultation.learned {
        let status = if learned.persisted { "gravada" } else { "NÃO gravada" };
        println!("  regra '{}' aprendida ({status})", learned.name);
    }
}

async fn run_command(
    engine: &InferenceEngine,
    command: Command,
    conversation_id: &str,
) -> Result<(), EngineError> {
    match command {
        Command::Quit => {}
        Command::Tell { path, value } => {
            let affected = engine.tell(&path, value).await?;
            if affected.is_empty() {
                println!("  ok");
            } else {
                println!("  ok; regras a reavaliar: {}", affected.join(", "));
            }
        }
        Command::Fact { path } => match engine.ask_fact(&path)? {
            Some(value) => println!("  {path} = {value}"),
            None => println!("  {path} não definido"),
        },
        Command::Rule { name, evidence } => {
            let evidence = evidence
                .iter()
                .map(|raw| FactPath::parse(raw))
                .collect::<Result<Vec<_>, _>>()?;
            engine.assert_rule(&name, &evidence).await?;
            println!("  regra '{name}' registrada");
        }
        Command::Symptoms(input) => {
            let consultation = engine.ask(&input, conversation_id).await?;
            print_consultation(&consultation);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs vão para stderr para não misturar com as perguntas.
    // Exemplo: RUST_LOG=debug cargo run
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("🩺 Symptom Inference — Starting...");

    let config = EngineConfig::load()?;
    let gateway = Arc::new(FileGateway::new(&config.knowledge_path));
    tracing::info!(path = %gateway.path().display(), mode = ?config.mode, "Configuração pronta");
    let mut engine = InferenceEngine::new(config);
    engine.subscribe_to_knowledge(gateway).await?;

    let terminal = Arc::new(TerminalPrompter::new());
    engine.subscribe_to_prompts(terminal.clone());

    let conversation_id = Uuid::new_v4().to_string();
    tracing::info!(conversation = %conversation_id, "✅ System ready!");

    while let Some(line) = terminal.read_line("sintomas> ").await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = Command::parse(&line);
        if command == Command::Quit {
            break;
        }
        if let Err(e) = run_command(&engine, command, &conversation_id).await {
            println!("  erro: {e}");
        }
    }

    Ok(())
}
