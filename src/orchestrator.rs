//! # Orquestrador — O Motor de Inferência Diagnóstica
//!
//! O [`InferenceEngine`] é a fachada que o front-end usa. Ele coordena o
//! casamento de fatos, sinônimos, perguntas de esclarecimento, pontuação
//! de certeza e o aprendizado de regras novas.
//!
//! ## Ciclo de uma Consulta (`ask`)
//!
//! ```text
//! "shakings, skin red, cold skin"
//!   │  NFC + minúsculas, split por vírgula
//!   ├── para cada termo, da esquerda para a direita:
//!   │     Matching ──vazio──► SynonymLookup ──vazio──► Clarifying ──┐
//!   │        │                    │                      │    ▲     │
//!   │        └──────► Resolved ◄──┘◄─────── match ───────┘    └─────┘ sem match
//!   │                                                      Cancelled ► Skipped
//!   │     (sem colaborador: Strict ⇒ FactNotFound, Interactive ⇒ Skipped)
//!   │
//!   ├── CertaintyEngine::score(fatos resolvidos)
//!   │
//!   └── com colaborador: "Find your diagnosis?"
//!         no  ► "What is your diagnosis?" ► aprende a regra ► gateway.save
//!         yes / cancelado ► fim
//! ```
//!
//! ## Consistência
//!
//! Cada consulta trabalha sobre uma **cópia** do snapshot tirada no início.
//! Snapshots novos do gateway substituem a base inteira; uma consulta em
//! andamento nunca vê uma árvore pela metade. O aprendizado grava a cópia
//! mutada de volta como um valor único.
//!
//! O fluxo de aprendizado não é reentrante: chame `ask` uma vez por vez
//! em cada instância.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use unicode_normalization::UnicodeNormalization;

use crate::config::{EngineConfig, ResolutionMode};
use crate::core::{FactPath, KnowledgeBase, RuleId, Scalar};
use crate::dialog::{PromptCollaborator, PromptResponse, QuestionGenerator};
use crate::error::{EngineError, EngineResult};
use crate::gateway::{KnowledgeGateway, KnowledgeUpdate};
use crate::inference::{CertaintyEngine, FactMatcher, MatchResult, Scores};

/// Resultado de uma consulta.
#[derive(Clone, Debug, Default)]
pub struct Consultation {
    /// Regras candidatas e suas certezas.
    pub scores: Scores,
    /// Todos os caminhos resolvidos na sessão, em ordem de resolução.
    pub resolved: Vec<FactPath>,
    /// Termos ignorados (cancelados ou sem correspondência no modo interativo).
    pub skipped: Vec<String>,
    /// Regra aprendida no fim da consulta, se houve aprendizado.
    pub learned: Option<LearnedRule>,
}

/// Regra criada (ou estendida) pelo fluxo de aprendizado.
#[derive(Clone, Debug, PartialEq)]
pub struct LearnedRule {
    pub name: String,
    /// Evidência completa da regra depois do aprendizado (inclui a que ela
    /// já tinha, se o nome já existia).
    pub evidence: Vec<FactPath>,
    /// `false` se a gravação falhou ou não há gateway; a mutação em
    /// memória é mantida mesmo assim.
    pub persisted: bool,
}

/// Estados da resolução de um termo composto.
#[derive(Debug)]
enum TermState {
    Matching,
    SynonymLookup,
    Clarifying,
    Resolved(Vec<FactPath>),
    Skipped,
}

/// Motor de inferência diagnóstica.
pub struct InferenceEngine {
    config: EngineConfig,
    /// Snapshot atual; trocado inteiro a cada entrega do gateway.
    kb: Arc<RwLock<KnowledgeBase>>,
    prompts: Option<Arc<dyn PromptCollaborator>>,
    gateway: Option<Arc<dyn KnowledgeGateway>>,
    questions: QuestionGenerator,
    /// Tarefa que aplica os snapshots recebidos.
    watcher: Option<JoinHandle<()>>,
}

impl InferenceEngine {
    /// Motor com base vazia, sem gateway e sem colaborador (modo estrito
    /// até `subscribe_to_prompts`).
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            kb: Arc::new(RwLock::new(KnowledgeBase::new())),
            prompts: None,
            gateway: None,
            questions: QuestionGenerator::new(),
            watcher: None,
        }
    }

    /// Conecta o colaborador que faz perguntas ao usuário.
    pub fn subscribe_to_prompts(&mut self, collaborator: Arc<dyn PromptCollaborator>) {
        self.prompts = Some(collaborator);
    }

    /// Assina o gateway: aplica o snapshot atual e passa a aplicar cada
    /// snapshot novo em background.
    ///
    /// # Erros
    ///
    /// Propaga [`EngineError::Connection`] do gateway.
    pub async fn subscribe_to_knowledge(
        &mut self,
        gateway: Arc<dyn KnowledgeGateway>,
    ) -> EngineResult<()> {
        let mut rx = gateway.subscribe().await?;
        let initial = rx.borrow_and_update().clone();
        tracing::info!(
            facts = initial.fact_count(),
            rules = initial.rule_count(),
            "Snapshot inicial aplicado"
        );
        *self.kb.write() = initial;

        let kb = Arc::clone(&self.kb);
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let snapshot = rx.borrow_and_update().clone();
                tracing::debug!(
                    facts = snapshot.fact_count(),
                    rules = snapshot.rule_count(),
                    "Snapshot novo aplicado"
                );
                *kb.write() = snapshot;
            }
            tracing::debug!("Gateway encerrou a assinatura");
        });

        if let Some(previous) = self.watcher.replace(handle) {
            previous.abort();
        }
        self.gateway = Some(gateway);
        Ok(())
    }

    /// Cópia do snapshot atual.
    pub fn snapshot(&self) -> KnowledgeBase {
        self.kb.read().clone()
    }

    /// Consulta diagnóstica: resolve cada sintoma, pontua as regras e, se
    /// houver colaborador, conduz a confirmação/aprendizado.
    ///
    /// # Erros
    ///
    /// [`EngineError::FactNotFound`] no modo estrito, sem colaborador,
    /// quando um termo não pode ser resolvido.
    pub async fn ask(&self, input: &str, conversation_id: &str) -> EngineResult<Consultation> {
        let input: String = input.nfc().collect::<String>().to_lowercase();
        let kb = self.snapshot();

        let mut resolved: Vec<FactPath> = Vec::new();
        let mut skipped = Vec::new();
        for term in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            match self.resolve(&kb, term, conversation_id).await? {
                Some(paths) => {
                    let shown: Vec<String> = paths.iter().map(ToString::to_string).collect();
                    tracing::info!(term = %term, paths = ?shown, "Termo resolvido");
                    for path in paths {
                        if !resolved.contains(&path) {
                            resolved.push(path);
                        }
                    }
                }
                None => {
                    tracing::debug!(term = %term, "Termo ignorado");
                    skipped.push(term.to_string());
                }
            }
        }

        let matches: MatchResult = resolved
            .iter()
            .filter_map(|path| {
                kb.facts
                    .leaf_rules(path)
                    .map(|rules| (path.clone(), rules.to_vec()))
            })
            .collect();
        let scores = CertaintyEngine::score(&matches, &kb.rules);

        let learned = self.learn(&resolved, conversation_id).await;

        Ok(Consultation {
            scores,
            resolved,
            skipped,
            learned,
        })
    }

    /// Máquina de estados de um termo. `None` = termo ignorado.
    async fn resolve(
        &self,
        kb: &KnowledgeBase,
        term: &str,
        conversation_id: &str,
    ) -> EngineResult<Option<Vec<FactPath>>> {
        let matcher = FactMatcher::new(&kb.facts);
        let mut state = TermState::Matching;

        loop {
            state = match state {
                TermState::Matching => {
                    let paths = matcher.resolve_term(term);
                    if paths.is_empty() {
                        TermState::SynonymLookup
                    } else {
                        TermState::Resolved(paths)
                    }
                }
                TermState::SynonymLookup => {
                    let paths = via_synonyms(kb, &matcher, term);
                    if !paths.is_empty() {
                        TermState::Resolved(paths)
                    } else if self.prompts.is_some() {
                        TermState::Clarifying
                    } else {
                        match self.config.mode {
                            ResolutionMode::Strict => {
                                return Err(EngineError::FactNotFound(term.to_string()))
                            }
                            ResolutionMode::Interactive => TermState::Skipped,
                        }
                    }
                }
                TermState::Clarifying => {
                    let Some(prompts) = &self.prompts else {
                        return Ok(None);
                    };
                    match prompts.prompt(self.questions.clarify(term), conversation_id).await {
                        PromptResponse::Cancelled => TermState::Skipped,
                        PromptResponse::Answer(answer) => {
                            let answer: String = answer.nfc().collect::<String>().to_lowercase();
                            let mut paths = matcher.resolve_term(&answer);
                            if paths.is_empty() {
                                paths = via_synonyms(kb, &matcher, &answer);
                            }
                            if paths.is_empty() {
                                tracing::debug!(term = %term, answer = %answer, "Esclarecimento sem correspondência");
                                TermState::Clarifying
                            } else {
                                TermState::Resolved(paths)
                            }
                        }
                    }
                }
                TermState::Resolved(paths) => return Ok(Some(paths)),
                TermState::Skipped => return Ok(None),
            };
        }
    }

    /// Confirmação e aprendizado depois da pontuação.
    ///
    /// A regra é aplicada ao snapshot vivo, não à cópia da consulta: um
    /// snapshot que chegou durante as perguntas é preservado.
    async fn learn(&self, resolved: &[FactPath], conversation_id: &str) -> Option<LearnedRule> {
        let prompts = self.prompts.as_ref()?;
        if resolved.is_empty() {
            return None;
        }

        let delay = self.config.confirm_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let answer = prompts
            .prompt(self.questions.confirm_diagnosis(), conversation_id)
            .await
            .into_answer()?;
        if !QuestionGenerator::is_negative(&answer) {
            return None;
        }

        let name = prompts
            .prompt(self.questions.diagnosis_name(), conversation_id)
            .await
            .into_answer()?;

        let (evidence, update) = {
            let mut live = self.kb.write();
            if let Err(e) = live.learn_rule(&name, resolved) {
                tracing::error!(rule = %name, error = %e, "Regra não pôde ser aprendida");
                return None;
            }
            let evidence = live.rules.evidence(&name).map(<[FactPath]>::to_vec);
            (evidence.unwrap_or_default(), KnowledgeUpdate::facts_and_rules(&live))
        };

        let persisted = match self.push(update).await {
            Ok(saved) => saved,
            Err(e) => {
                tracing::error!(rule = %name, error = %e, "Regra aprendida não foi gravada");
                false
            }
        };

        Some(LearnedRule {
            name,
            evidence,
            persisted,
        })
    }

    /// Grava um escalar no caminho dado (armazenamento legado).
    ///
    /// Retorna as regras cuja evidência toca `path`: a fila de regras a
    /// reavaliar depois da mudança. Regras são dados, então reavaliar é
    /// pontuar de novo com `ask`; nada é executado aqui.
    pub async fn tell(&self, path: &str, value: impl Into<Scalar>) -> EngineResult<Vec<RuleId>> {
        let path = FactPath::parse(path)?;
        let value = value.into();
        let (affected, update) = {
            let mut kb = self.kb.write();
            kb.facts.set_value(&path, value.clone());
            (kb.rules.affected_by(&path), KnowledgeUpdate::facts_only(&kb))
        };
        tracing::info!(path = %path, value = %value, affected = ?affected, "Fato escalar gravado");
        self.push(update).await?;
        Ok(affected)
    }

    /// Lê o escalar no caminho dado (armazenamento legado).
    ///
    /// # Erros
    ///
    /// [`EngineError::AmbiguousValue`] se o caminho for uma sub-árvore ou
    /// uma folha de regras.
    pub fn ask_fact(&self, path: &str) -> EngineResult<Option<Scalar>> {
        let path = FactPath::parse(path)?;
        let kb = self.kb.read();
        Ok(kb.facts.value(&path)?.cloned())
    }

    /// Registra (ou estende) uma regra a partir de dados: nome + evidências.
    ///
    /// # Erros
    ///
    /// [`EngineError::InvalidRule`] sem nome ou sem evidências;
    /// [`EngineError::InvalidPath`] se alguma evidência não puder ser folha.
    /// Nesses casos a base não muda.
    pub async fn assert_rule(&self, name: &str, evidence: &[FactPath]) -> EngineResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidRule("nome vazio".to_string()));
        }
        if evidence.is_empty() {
            return Err(EngineError::InvalidRule(format!("'{name}' sem evidências")));
        }
        let update = {
            let mut kb = self.kb.write();
            kb.learn_rule(name, evidence)?;
            KnowledgeUpdate::facts_and_rules(&kb)
        };
        self.push(update).await.map(|_| ())
    }

    /// Envia a atualização ao gateway. `Ok(false)` quando não há gateway.
    async fn push(&self, update: KnowledgeUpdate) -> EngineResult<bool> {
        let Some(gateway) = &self.gateway else {
            tracing::debug!("Sem gateway; mudança mantida só em memória");
            return Ok(false);
        };
        gateway.save(update).await?;
        Ok(true)
    }
}

impl Drop for InferenceEngine {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
    }
}

/// Resolve `text` pelo último termo canônico encontrado nos sinônimos.
fn via_synonyms(kb: &KnowledgeBase, matcher: &FactMatcher<'_>, text: &str) -> Vec<FactPath> {
    kb.synonyms
        .resolve(text)
        .last()
        .map(|canonical| matcher.resolve_term(canonical))
        .unwrap_or_default()
}
