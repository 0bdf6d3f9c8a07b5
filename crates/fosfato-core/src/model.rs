use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefixo fixo gravado na frente do código digitado.
pub const PREFIXO_CODIGO: &str = "BR";

/// Máquinas da linha de fosfato.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Maquina {
    #[serde(rename = "LFOS-0201")]
    Lfos0201,
    #[serde(rename = "LFOS-0202")]
    Lfos0202,
}

impl Maquina {
    pub const TODAS: [Maquina; 2] = [Maquina::Lfos0201, Maquina::Lfos0202];

    pub fn as_str(&self) -> &'static str {
        match self {
            Maquina::Lfos0201 => "LFOS-0201",
            Maquina::Lfos0202 => "LFOS-0202",
        }
    }
}

impl fmt::Display for Maquina {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Maquina {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Maquina::TODAS
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("máquina desconhecida: '{s}'"))
    }
}

/// Campos de uma peça, sem o identificador do banco.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DadosPeca {
    pub codigo: String,
    pub lote: String,
    pub quantidade: u32,
    /// Data ISO (`AAAA-MM-DD`).
    pub data: String,
    /// Hora `HH:MM`.
    pub hora: String,
    #[serde(default)]
    pub maquina: Option<Maquina>,
    #[serde(default)]
    pub retrabalho: bool,
    #[serde(default)]
    pub motivo: String,
}

impl DadosPeca {
    /// Motivo só tem significado quando a peça foi para retrabalho.
    pub fn motivo_exibido(&self) -> Option<&str> {
        self.retrabalho.then_some(self.motivo.as_str())
    }
}

/// Peça persistida; `id` é atribuído pelo banco no cadastro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peca {
    pub id: u64,
    #[serde(flatten)]
    pub dados: DadosPeca,
}

impl Peca {
    pub fn new(id: u64, dados: DadosPeca) -> Self {
        Self { id, dados }
    }
}

/// Aplica o prefixo uma única vez: um `BR` já presente não é duplicado.
pub fn com_prefixo(codigo: &str) -> String {
    format!("{PREFIXO_CODIGO}{}", sem_prefixo(codigo))
}

/// Sufixo digitado pelo usuário, como o formulário exibe ao lado do prefixo.
pub fn sem_prefixo(codigo: &str) -> &str {
    let codigo = codigo.trim();
    codigo.strip_prefix(PREFIXO_CODIGO).unwrap_or(codigo)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixo_aplicado_uma_vez() {
        assert_eq!(com_prefixo("001"), "BR001");
        assert_eq!(com_prefixo(" 001 "), "BR001");
        assert_eq!(com_prefixo("BR001"), "BR001");
        assert_eq!(com_prefixo(&com_prefixo("001")), "BR001");
    }

    #[test]
    fn test_sem_prefixo() {
        assert_eq!(sem_prefixo("BR001"), "001");
        assert_eq!(sem_prefixo("001"), "001");
        // só o prefixo exato, sensível a maiúsculas
        assert_eq!(sem_prefixo("br001"), "br001");
    }

    #[test]
    fn test_maquina_from_str() {
        assert_eq!("LFOS-0201".parse::<Maquina>(), Ok(Maquina::Lfos0201));
        assert_eq!("lfos-0202".parse::<Maquina>(), Ok(Maquina::Lfos0202));
        assert!("LFOS-0300".parse::<Maquina>().is_err());
    }

    #[test]
    fn test_peca_serializa_achatada() {
        let peca = Peca::new(
            3,
            DadosPeca {
                codigo: "BR001".to_string(),
                lote: "L1".to_string(),
                quantidade: 10,
                data: "2024-01-01".to_string(),
                hora: "08:00".to_string(),
                maquina: Some(Maquina::Lfos0201),
                retrabalho: false,
                motivo: String::new(),
            },
        );

        let json = serde_json::to_value(&peca).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["codigo"], "BR001");
        assert_eq!(json["maquina"], "LFOS-0201");
    }

    #[test]
    fn test_motivo_exibido_apenas_com_retrabalho() {
        let mut dados = DadosPeca {
            codigo: "BR002".to_string(),
            lote: "L1".to_string(),
            quantidade: 1,
            data: "2024-01-01".to_string(),
            hora: "08:00".to_string(),
            maquina: None,
            retrabalho: false,
            motivo: "crack".to_string(),
        };
        assert_eq!(dados.motivo_exibido(), None);

        dados.retrabalho = true;
        assert_eq!(dados.motivo_exibido(), Some("crack"));
    }
}
