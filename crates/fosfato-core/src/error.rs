use std::fmt;

use thiserror::Error;

/// Campos do formulário que passam por validação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Campo {
    Codigo,
    Lote,
    Quantidade,
    Data,
    Hora,
}

impl fmt::Display for Campo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Campo::Codigo => write!(f, "codigo"),
            Campo::Lote => write!(f, "lote"),
            Campo::Quantidade => write!(f, "quantidade"),
            Campo::Data => write!(f, "data"),
            Campo::Hora => write!(f, "hora"),
        }
    }
}

/// Mensagens de validação por campo, na ordem em que o formulário exibe.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrosValidacao {
    erros: Vec<(Campo, String)>,
}

impl ErrosValidacao {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adicionar(&mut self, campo: Campo, mensagem: impl Into<String>) {
        self.erros.push((campo, mensagem.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.erros.is_empty()
    }

    /// Mensagem do campo, se houver erro nele.
    pub fn mensagem(&self, campo: Campo) -> Option<&str> {
        self.erros
            .iter()
            .find(|(c, _)| *c == campo)
            .map(|(_, m)| m.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Campo, &str)> {
        self.erros.iter().map(|(c, m)| (*c, m.as_str()))
    }
}

impl fmt::Display for ErrosValidacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mensagens: Vec<&str> = self.erros.iter().map(|(_, m)| m.as_str()).collect();
        write!(f, "{}", mensagens.join(" "))
    }
}

#[derive(Error, Debug)]
pub enum ErroRegistro {
    /// Campo obrigatório ausente ou inválido; nada chegou ao banco.
    #[error("formulário inválido: {0}")]
    Validacao(ErrosValidacao),

    #[error("peça {0} não encontrada")]
    NaoEncontrada(u64),

    /// Falha da operação no banco local.
    #[error("erro de persistência: {0}")]
    Persistencia(String),

    #[error("esquema do banco na versão {encontrada}, suportada apenas a {suportada}")]
    EsquemaIncompativel { encontrada: u64, suportada: u64 },
}

impl ErroRegistro {
    pub fn persistencia(e: impl fmt::Display) -> Self {
        ErroRegistro::Persistencia(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ErroRegistro>;
