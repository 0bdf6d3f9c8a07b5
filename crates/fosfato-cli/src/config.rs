//! Configuração local do `fosfato`.
//!
//! Lê `<config_dir>/fosfato/config.toml`; sem arquivo, valem os padrões.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuracao {
    /// Arquivo do banco redb.
    pub banco: PathBuf,

    /// Filtro de log padrão; `RUST_LOG` tem prioridade.
    pub log: String,
}

impl Default for Configuracao {
    fn default() -> Self {
        Self {
            banco: banco_padrao(),
            log: "info".to_string(),
        }
    }
}

impl Configuracao {
    pub fn caminho_padrao() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fosfato")
            .join("config.toml")
    }

    pub fn carregar(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path)
            .with_context(|| format!("Falha ao ler configuração em {}", path.display()))?;
        let config: Configuracao = toml::from_str(&text)
            .with_context(|| format!("Configuração inválida em {}", path.display()))?;
        Ok(config)
    }
}

fn banco_padrao() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fosfato")
        .join("fosfato.redb")
}
