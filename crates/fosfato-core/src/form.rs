//! Valores do formulário de cadastro, como o usuário digita, e a validação
//! que roda antes de qualquer chamada ao registro.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{Campo, ErrosValidacao};
use crate::model::{sem_prefixo, DadosPeca, Maquina, Peca};

/// Estado bruto dos campos do formulário.
///
/// `codigo` guarda apenas o sufixo; o prefixo é exibido fixo ao lado do campo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormularioPeca {
    pub codigo: String,
    pub lote: String,
    pub quantidade: String,
    pub data: String,
    pub hora: String,
    pub maquina: Option<Maquina>,
    pub retrabalho: bool,
    pub motivo: String,
}

impl FormularioPeca {
    /// Preenche o formulário a partir de uma peça gravada (modo edição).
    pub fn de_peca(peca: &Peca) -> Self {
        let d = &peca.dados;
        Self {
            codigo: sem_prefixo(&d.codigo).to_string(),
            lote: d.lote.clone(),
            quantidade: d.quantidade.to_string(),
            data: d.data.clone(),
            hora: d.hora.clone(),
            maquina: d.maquina,
            retrabalho: d.retrabalho,
            motivo: d.motivo.clone(),
        }
    }

    /// O campo de motivo só aparece com retrabalho marcado.
    pub fn mostra_motivo(&self) -> bool {
        self.retrabalho
    }

    pub fn limpar(&mut self) {
        *self = Self::default();
    }

    /// Valida os campos obrigatórios e converte para [`DadosPeca`].
    ///
    /// O código sai sem prefixo; quem aplica o prefixo é o registro.
    pub fn validar(&self) -> Result<DadosPeca, ErrosValidacao> {
        let mut erros = ErrosValidacao::new();

        let codigo = sem_prefixo(&self.codigo);
        if codigo.is_empty() {
            erros.adicionar(Campo::Codigo, "Código é obrigatório!");
        }

        let lote = self.lote.trim();
        if lote.is_empty() {
            erros.adicionar(Campo::Lote, "Lote é obrigatório!");
        }

        let quantidade = match self.quantidade.trim() {
            "" => {
                erros.adicionar(Campo::Quantidade, "Quantidade é obrigatória!");
                None
            }
            texto => match texto.parse::<u32>() {
                Ok(0) => {
                    erros.adicionar(Campo::Quantidade, "Quantidade mínima é 1!");
                    None
                }
                Ok(q) => Some(q),
                Err(_) => {
                    erros.adicionar(Campo::Quantidade, "Quantidade inválida!");
                    None
                }
            },
        };

        let data = self.data.trim();
        if data.is_empty() {
            erros.adicionar(Campo::Data, "Data é obrigatória!");
        } else if NaiveDate::parse_from_str(data, "%Y-%m-%d").is_err() {
            erros.adicionar(Campo::Data, "Data inválida!");
        }

        let hora = self.hora.trim();
        if hora.is_empty() {
            erros.adicionar(Campo::Hora, "Hora é obrigatória!");
        } else if NaiveTime::parse_from_str(hora, "%H:%M").is_err() {
            erros.adicionar(Campo::Hora, "Hora inválida!");
        }

        match quantidade {
            Some(quantidade) if erros.is_empty() => Ok(DadosPeca {
                codigo: codigo.to_string(),
                lote: lote.to_string(),
                quantidade,
                data: data.to_string(),
                hora: hora.to_string(),
                maquina: self.maquina,
                retrabalho: self.retrabalho,
                motivo: self.motivo.trim().to_string(),
            }),
            _ => Err(erros),
        }
    }
}

/// Converte o valor textual de um checkbox/select em booleano.
///
/// Só valores afirmativos explícitos contam; qualquer outra coisa é `false`.
pub fn retrabalho_de_texto(valor: &str) -> bool {
    matches!(
        valor.trim().to_lowercase().as_str(),
        "true" | "sim" | "s" | "1" | "on"
    )
}
