//! Sessão interativa: a tela de cadastro em modo texto.
//!
//! Os avisos e a releitura da lista chegam como eventos do controlador e
//! são exibidos depois de cada comando.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use anyhow::Result;
use fosfato_core::{
    filtro_maquina, filtro_retrabalho, retrabalho_de_texto, ControladorFormulario, ErroRegistro,
    EstadoFormulario, Evento, FormularioPeca, Maquina, PecaRepository, PREFIXO_CODIGO,
};
use tracing::warn;

use crate::render;

const AJUDA: &str = "\
Comandos:
  cadastrar             preenche e cadastra uma nova peça
  alterar <id>          edita a peça <id>
  cancelar              sai do modo edição
  remover <id>          remove a peça <id>
  listar                mostra as peças filtradas
  buscar [trecho]       filtra pelo código (vazio limpa)
  maquina <id|todas>    filtra por máquina
  retrabalho <sim|nao|todos>
  ajuda | sair";

pub fn executar<R, I, O>(
    controlador: &mut ControladorFormulario<R>,
    mut entrada: I,
    saida: &mut O,
) -> Result<()>
where
    R: PecaRepository,
    I: BufRead,
    O: Write,
{
    let eventos: Rc<RefCell<Vec<Evento>>> = Rc::new(RefCell::new(Vec::new()));
    let fila = Rc::clone(&eventos);
    controlador.inscrever(move |e| fila.borrow_mut().push(e.clone()));

    writeln!(saida, "{}", render::TITULO)?;
    writeln!(saida, "{AJUDA}")?;
    render::lista(saida, controlador.visiveis())?;

    loop {
        write!(saida, "> ")?;
        saida.flush()?;
        let Some(linha) = ler_linha(&mut entrada)? else {
            break;
        };
        let (comando, resto) = match linha.split_once(' ') {
            Some((c, r)) => (c, r.trim()),
            None => (linha.as_str(), ""),
        };

        match comando {
            "" => continue,
            "sair" => break,
            "ajuda" => writeln!(saida, "{AJUDA}")?,
            "listar" => render::lista(saida, controlador.visiveis())?,
            "cadastrar" => {
                if controlador.estado() != EstadoFormulario::Cadastrando {
                    controlador.cancelar();
                }
                writeln!(saida, "== {} ==", controlador.rotulo_envio())?;
                if preencher(controlador.formulario_mut(), &mut entrada, saida)? {
                    enviar(controlador, saida)?;
                }
            }
            "alterar" => match resto.parse::<u64>() {
                Ok(id) => match controlador.alterar(id) {
                    Ok(()) => {
                        writeln!(saida, "== {} ==", controlador.rotulo_envio())?;
                        writeln!(saida, "Alterando peça {id} (Enter mantém o valor atual)")?;
                        if preencher(controlador.formulario_mut(), &mut entrada, saida)? {
                            enviar(controlador, saida)?;
                        }
                    }
                    Err(e) => writeln!(saida, "{e}")?,
                },
                Err(_) => writeln!(saida, "Uso: alterar <id>")?,
            },
            "cancelar" => {
                controlador.cancelar();
                writeln!(saida, "Edição cancelada")?;
            }
            "remover" => match resto.parse::<u64>() {
                Ok(id) => {
                    if let Err(e) = controlador.remover(id) {
                        warn!(id, erro = %e, "remoção falhou");
                    }
                }
                Err(_) => writeln!(saida, "Uso: remover <id>")?,
            },
            "buscar" => {
                controlador.definir_busca(resto);
                render::lista(saida, controlador.visiveis())?;
            }
            "maquina" => match filtro_maquina(resto) {
                Ok(maquina) => {
                    controlador.definir_filtro_maquina(maquina);
                    render::lista(saida, controlador.visiveis())?;
                }
                Err(e) => writeln!(saida, "{e}")?,
            },
            "retrabalho" => match filtro_retrabalho(resto) {
                Ok(retrabalho) => {
                    controlador.definir_filtro_retrabalho(retrabalho);
                    render::lista(saida, controlador.visiveis())?;
                }
                Err(e) => writeln!(saida, "{e}")?,
            },
            outro => writeln!(saida, "Comando desconhecido: '{outro}'. Digite 'ajuda'.")?,
        }

        let pendentes: Vec<Evento> = eventos.borrow_mut().drain(..).collect();
        for evento in pendentes {
            match evento {
                Evento::Notificacao(aviso) => render::notificacao(saida, &aviso)?,
                Evento::DadosAlterados => render::lista(saida, controlador.visiveis())?,
            }
        }
    }

    Ok(())
}

fn enviar<R: PecaRepository, O: Write>(
    controlador: &mut ControladorFormulario<R>,
    saida: &mut O,
) -> Result<()> {
    match controlador.submeter() {
        Ok(_) => {}
        Err(ErroRegistro::Validacao(erros)) => {
            writeln!(saida, "Corrija os campos:")?;
            render::erros_validacao(saida, &erros)?;
        }
        // o aviso de erro já foi emitido pelo controlador
        Err(e) => warn!(erro = %e, "envio do formulário falhou"),
    }
    Ok(())
}

/// Pergunta campo a campo; Enter mantém o valor atual. `false` em fim de entrada.
fn preencher<I: BufRead, O: Write>(
    form: &mut FormularioPeca,
    entrada: &mut I,
    saida: &mut O,
) -> Result<bool> {
    let rotulo_codigo = format!("Código da Peça: {PREFIXO_CODIGO}");
    if !ler_campo(entrada, saida, &rotulo_codigo, &mut form.codigo)?
        || !ler_campo(entrada, saida, "Lote", &mut form.lote)?
        || !ler_campo(entrada, saida, "Quantidade", &mut form.quantidade)?
        || !ler_campo(entrada, saida, "Data (AAAA-MM-DD)", &mut form.data)?
        || !ler_campo(entrada, saida, "Hora (HH:MM)", &mut form.hora)?
    {
        return Ok(false);
    }

    let atual = form.maquina.map(|m| m.to_string()).unwrap_or_default();
    let opcoes: Vec<&str> = Maquina::TODAS.iter().map(|m| m.as_str()).collect();
    let rotulo_maquina = format!("Máquina ({}, - para nenhuma)", opcoes.join("/"));
    let Some(valor) = perguntar(entrada, saida, &rotulo_maquina, &atual)? else {
        return Ok(false);
    };
    if valor == "-" {
        form.maquina = None;
    } else if !valor.is_empty() {
        match valor.parse::<Maquina>() {
            Ok(maquina) => form.maquina = Some(maquina),
            Err(e) => writeln!(saida, "{e}; máquina mantida")?,
        }
    }

    let atual = if form.retrabalho { "s" } else { "n" };
    let Some(valor) = perguntar(entrada, saida, "Retrabalho (s/n)", atual)? else {
        return Ok(false);
    };
    form.retrabalho = retrabalho_de_texto(&valor);

    if form.mostra_motivo() {
        return ler_campo(entrada, saida, "Motivo do Retrabalho", &mut form.motivo);
    }

    Ok(true)
}

fn ler_campo<I: BufRead, O: Write>(
    entrada: &mut I,
    saida: &mut O,
    rotulo: &str,
    valor: &mut String,
) -> Result<bool> {
    match perguntar(entrada, saida, rotulo, valor)? {
        Some(novo) => {
            *valor = novo;
            Ok(true)
        }
        None => Ok(false),
    }
}

fn perguntar<I: BufRead, O: Write>(
    entrada: &mut I,
    saida: &mut O,
    rotulo: &str,
    atual: &str,
) -> Result<Option<String>> {
    if atual.is_empty() {
        write!(saida, "{rotulo}: ")?;
    } else {
        write!(saida, "{rotulo} [{atual}]: ")?;
    }
    saida.flush()?;

    Ok(ler_linha(entrada)?.map(|valor| {
        if valor.is_empty() {
            atual.to_string()
        } else {
            valor
        }
    }))
}

fn ler_linha<I: BufRead>(entrada: &mut I) -> Result<Option<String>> {
    let mut linha = String::new();
    if entrada.read_line(&mut linha)? == 0 {
        return Ok(None);
    }
    Ok(Some(linha.trim().to_string()))
}
