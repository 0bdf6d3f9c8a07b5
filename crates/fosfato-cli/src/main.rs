mod config;
mod render;
mod session;

use crate::config::Configuracao;
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use fosfato_core::{
    filtro_maquina, filtro_retrabalho, retrabalho_de_texto, ControladorFormulario, ErroRegistro,
    Evento, FiltroPecas, Maquina, Notificacao, RedbRepository, RegistroPecas,
};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "fosfato",
    about = "FOSFATO 1136: cadastro de peças da linha de fosfatização"
)]
struct Cli {
    /// Arquivo de configuração TOML
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Caminho do banco (sobrepõe o da configuração)
    #[arg(long, global = true)]
    banco: Option<PathBuf>,

    #[command(subcommand)]
    comando: Comando,
}

#[derive(Debug, Subcommand)]
enum Comando {
    /// Cadastra uma nova peça
    Cadastrar(CamposCadastro),

    /// Altera uma peça existente; campos omitidos mantêm o valor gravado
    Alterar {
        id: u64,
        #[command(flatten)]
        campos: CamposAlteracao,
    },

    /// Remove uma peça (remover de novo não é erro)
    Remover { id: u64 },

    /// Lista as peças, com filtros opcionais
    Listar {
        /// Trecho do código
        #[arg(long, default_value = "")]
        busca: String,

        /// LFOS-0201, LFOS-0202 ou "todas"
        #[arg(long, default_value = "")]
        maquina: String,

        /// true, false ou vazio
        #[arg(long, default_value = "")]
        retrabalho: String,
    },

    /// Abre a tela de cadastro interativa
    Sessao,
}

#[derive(Debug, Args)]
struct CamposCadastro {
    /// Código sem o prefixo BR
    #[arg(long)]
    codigo: String,
    #[arg(long)]
    lote: String,
    #[arg(long)]
    quantidade: String,
    /// AAAA-MM-DD
    #[arg(long)]
    data: String,
    /// HH:MM
    #[arg(long)]
    hora: String,
    #[arg(long)]
    maquina: Option<String>,
    #[arg(long)]
    retrabalho: bool,
    #[arg(long, default_value = "")]
    motivo: String,
}

#[derive(Debug, Args)]
struct CamposAlteracao {
    #[arg(long)]
    codigo: Option<String>,
    #[arg(long)]
    lote: Option<String>,
    #[arg(long)]
    quantidade: Option<String>,
    #[arg(long)]
    data: Option<String>,
    #[arg(long)]
    hora: Option<String>,
    /// Máquina; "-" remove
    #[arg(long)]
    maquina: Option<String>,
    /// true/false
    #[arg(long)]
    retrabalho: Option<String>,
    #[arg(long)]
    motivo: Option<String>,
}

type Controlador = ControladorFormulario<RedbRepository>;

fn iniciar_log(padrao: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(padrao)),
        )
        .with_writer(io::stderr)
        .init();
}

fn ler_maquina(valor: &str) -> anyhow::Result<Option<Maquina>> {
    match valor.trim() {
        "" | "-" => Ok(None),
        v => v.parse().map(Some).map_err(|e: String| anyhow!(e)),
    }
}

/// Envia o formulário e traduz erros de validação em mensagens por campo.
fn enviar(controlador: &mut Controlador) -> anyhow::Result<()> {
    match controlador.submeter() {
        Ok(_) => Ok(()),
        Err(ErroRegistro::Validacao(erros)) => {
            eprintln!("Corrija os campos:");
            render::erros_validacao(&mut io::stderr(), &erros)?;
            anyhow::bail!("formulário inválido")
        }
        Err(e) => Err(e.into()),
    }
}

fn cadastrar(controlador: &mut Controlador, campos: CamposCadastro) -> anyhow::Result<()> {
    let form = controlador.formulario_mut();
    form.codigo = campos.codigo;
    form.lote = campos.lote;
    form.quantidade = campos.quantidade;
    form.data = campos.data;
    form.hora = campos.hora;
    form.maquina = ler_maquina(campos.maquina.as_deref().unwrap_or(""))?;
    form.retrabalho = campos.retrabalho;
    form.motivo = campos.motivo;
    enviar(controlador)
}

fn alterar(controlador: &mut Controlador, id: u64, campos: CamposAlteracao) -> anyhow::Result<()> {
    controlador.alterar(id)?;

    let form = controlador.formulario_mut();
    if let Some(codigo) = campos.codigo {
        form.codigo = codigo;
    }
    if let Some(lote) = campos.lote {
        form.lote = lote;
    }
    if let Some(quantidade) = campos.quantidade {
        form.quantidade = quantidade;
    }
    if let Some(data) = campos.data {
        form.data = data;
    }
    if let Some(hora) = campos.hora {
        form.hora = hora;
    }
    if let Some(maquina) = campos.maquina {
        form.maquina = ler_maquina(&maquina)?;
    }
    if let Some(retrabalho) = campos.retrabalho {
        form.retrabalho = retrabalho_de_texto(&retrabalho);
    }
    if let Some(motivo) = campos.motivo {
        form.motivo = motivo;
    }
    enviar(controlador)
}

/// Avisos chegam por callback; uma falha de escrita só é registrada no log.
fn exibir_aviso<W: Write>(w: &mut W, aviso: &Notificacao) {
    if let Err(e) = render::notificacao(w, aviso) {
        warn!(erro = %e, aviso = %aviso, "falha ao exibir aviso");
    }
}

fn listar(
    controlador: &mut Controlador,
    busca: String,
    maquina: &str,
    retrabalho: &str,
) -> anyhow::Result<()> {
    let filtro = FiltroPecas {
        busca,
        maquina: filtro_maquina(maquina).map_err(|e| anyhow!(e))?,
        retrabalho: filtro_retrabalho(retrabalho).map_err(|e| anyhow!(e))?,
    };
    controlador.definir_filtro(filtro);
    render::lista(&mut io::stdout(), controlador.visiveis())?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Configuracao::caminho_padrao);
    let config = Configuracao::carregar(&config_path)?;
    iniciar_log(&config.log);

    let banco = cli.banco.unwrap_or(config.banco);
    info!(banco = %banco.display(), "usando banco de peças");
    let repo = RedbRepository::open(&banco)
        .with_context(|| format!("Falha ao abrir o banco em {}", banco.display()))?;
    let mut controlador = ControladorFormulario::new(RegistroPecas::new(repo))?;

    if !matches!(cli.comando, Comando::Sessao) {
        controlador.inscrever(|evento| {
            if let Evento::Notificacao(aviso) = evento {
                exibir_aviso(&mut io::stdout(), aviso);
            }
        });
    }

    let resultado = match cli.comando {
        Comando::Cadastrar(campos) => cadastrar(&mut controlador, campos),
        Comando::Alterar { id, campos } => alterar(&mut controlador, id, campos),
        Comando::Remover { id } => controlador.remover(id).map_err(Into::into),
        Comando::Listar {
            busca,
            maquina,
            retrabalho,
        } => listar(&mut controlador, busca, &maquina, &retrabalho),
        Comando::Sessao => {
            let stdin = io::stdin();
            session::executar(&mut controlador, stdin.lock(), &mut io::stdout())
        }
    };

    controlador.into_registro().into_inner().close();
    resultado
}
