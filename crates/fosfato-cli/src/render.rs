//! Exibição em texto: cartões de peças, avisos e erros do formulário.

use std::io::{self, Write};

use fosfato_core::{ErrosValidacao, Notificacao, Peca, TipoNotificacao};

pub const TITULO: &str = "FOSFATO 1136 - Cadastro de Peças";

/// Cartão de uma peça, como na lista da tela.
pub fn cartao<W: Write>(w: &mut W, peca: &Peca) -> io::Result<()> {
    let d = &peca.dados;
    writeln!(w, "[{}] Código: {}", peca.id, d.codigo)?;
    writeln!(w, "    Lote: {}", d.lote)?;
    writeln!(w, "    Quantidade: {}", d.quantidade)?;
    writeln!(w, "    Data: {}", d.data)?;
    writeln!(w, "    Hora: {}", d.hora)?;
    writeln!(
        w,
        "    Máquina: {}",
        d.maquina.map(|m| m.as_str()).unwrap_or("")
    )?;
    writeln!(w, "    Retrabalho: {}", if d.retrabalho { "Sim" } else { "Não" })?;
    if let Some(motivo) = d.motivo_exibido() {
        writeln!(w, "    Motivo: {motivo}")?;
    }
    Ok(())
}

pub fn lista<W: Write>(w: &mut W, pecas: &[Peca]) -> io::Result<()> {
    writeln!(w, "Peças Cadastradas:")?;
    if pecas.is_empty() {
        writeln!(w, "  (nenhuma peça encontrada)")?;
    }
    for peca in pecas {
        cartao(w, peca)?;
    }
    Ok(())
}

pub fn notificacao<W: Write>(w: &mut W, aviso: &Notificacao) -> io::Result<()> {
    let marca = match aviso.tipo {
        TipoNotificacao::Sucesso => "✔",
        TipoNotificacao::Erro => "✖",
        TipoNotificacao::Remocao => "🗑️",
    };
    writeln!(w, "{marca} {aviso}")
}

pub fn erros_validacao<W: Write>(w: &mut W, erros: &ErrosValidacao) -> io::Result<()> {
    for (campo, mensagem) in erros.iter() {
        writeln!(w, "  {campo}: {mensagem}")?;
    }
    Ok(())
}
