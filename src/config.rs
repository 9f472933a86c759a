//! # Configuração do Motor
//!
//! A configuração é montada em três camadas, cada uma sobrescrevendo a
//! anterior:
//!
//! ```text
//! padrões  →  arquivo TOML (opcional)  →  variáveis de ambiente
//! ```
//!
//! | Chave TOML | Variável | Padrão |
//! |------------|----------|--------|
//! | `knowledge_path` | `SYMPTOM_KB_PATH` | `data/knowledge.json` |
//! | `mode` | `SYMPTOM_MODE` | `strict` |
//! | `confirm_delay_ms` | `SYMPTOM_CONFIRM_DELAY_MS` | `0` |
//!
//! O arquivo TOML é `data/engine.toml`, ou o caminho em `SYMPTOM_CONFIG`.
//!
//! ```toml
//! knowledge_path = "data/knowledge.json"
//! mode = "interactive"
//! confirm_delay_ms = 1000
//! ```

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Arquivo de configuração padrão.
const CONFIG_PATH: &str = "data/engine.toml";

/// O que fazer com um termo que não foi resolvido quando não há
/// colaborador para perguntar ao usuário.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionMode {
    /// A consulta inteira falha com `FactNotFound`.
    #[default]
    Strict,
    /// O termo é ignorado e a consulta continua com os demais.
    Interactive,
}

impl FromStr for ResolutionMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "interactive" => Ok(Self::Interactive),
            other => Err(EngineError::Configuration(format!(
                "modo desconhecido '{other}' (use 'strict' ou 'interactive')"
            ))),
        }
    }
}

/// Configuração do motor de inferência.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Arquivo JSON da base de conhecimento.
    pub knowledge_path: PathBuf,
    /// Política para termos não resolvidos sem colaborador.
    pub mode: ResolutionMode,
    /// Pausa antes da pergunta de confirmação. Puramente cosmética.
    pub confirm_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            knowledge_path: PathBuf::from("data/knowledge.json"),
            mode: ResolutionMode::Strict,
            confirm_delay_ms: 0,
        }
    }
}

impl EngineConfig {
    /// Carrega padrões → TOML → ambiente e valida.
    ///
    /// # Erros
    ///
    /// [`EngineError::Configuration`] se o TOML for inválido, algum valor
    /// de ambiente não puder ser interpretado, ou a validação falhar.
    pub fn load() -> EngineResult<Self> {
        let explicit = std::env::var("SYMPTOM_CONFIG").ok().map(PathBuf::from);
        let file = explicit.clone().unwrap_or_else(|| PathBuf::from(CONFIG_PATH));

        let mut config = if file.exists() {
            Self::from_toml_file(&file)?
        } else if let Some(missing) = explicit {
            return Err(EngineError::Configuration(format!(
                "arquivo de configuração {} não existe",
                missing.display()
            )));
        } else {
            Self::default()
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        tracing::debug!(config = ?config, "Configuração carregada");
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> EngineResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Configuration(format!("falha ao ler {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> EngineResult<Self> {
        toml::from_str(raw).map_err(|e| EngineError::Configuration(e.to_string()))
    }

    /// Aplica as variáveis de ambiente lidas por `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> EngineResult<()> {
        if let Some(path) = lookup("SYMPTOM_KB_PATH") {
            self.knowledge_path = PathBuf::from(path);
        }
        if let Some(mode) = lookup("SYMPTOM_MODE") {
            self.mode = mode.parse()?;
        }
        if let Some(delay) = lookup("SYMPTOM_CONFIRM_DELAY_MS") {
            self.confirm_delay_ms = delay.trim().parse().map_err(|_| {
                EngineError::Configuration(format!("SYMPTOM_CONFIRM_DELAY_MS inválido: '{delay}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.knowledge_path.as_os_str().is_empty() {
            return Err(EngineError::Configuration(
                "knowledge_path não pode ser vazio".to_string(),
            ));
        }
        Ok(())
    }

    pub fn confirm_delay(&self) -> Duration {
        Duration::from_millis(self.confirm_delay_ms)
    }
}
