use tracing::{error, info};

use crate::error::Result;
use crate::model::{com_prefixo, DadosPeca, Peca};
use crate::repository::PecaRepository;

/// Registro de peças: aplica as regras de gravação sobre um repositório.
///
/// O repositório é construído fora e injetado; o registro não abre nem
/// fecha o banco.
pub struct RegistroPecas<R: PecaRepository> {
    repo: R,
}

impl<R: PecaRepository> RegistroPecas<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn into_inner(self) -> R {
        self.repo
    }

    /// Cadastra uma peça e devolve o id atribuído pelo banco.
    pub fn cadastrar(&self, dados: DadosPeca) -> Result<u64> {
        let dados = preparar(dados);
        let codigo = dados.codigo.clone();
        match self.repo.inserir(dados) {
            Ok(id) => {
                info!(id, %codigo, "Peça adicionada com sucesso");
                Ok(id)
            }
            Err(e) => {
                error!(%codigo, erro = %e, "Erro ao adicionar peça");
                Err(e)
            }
        }
    }

    /// Substitui todos os campos da peça `id`, mantendo o id.
    pub fn atualizar(&self, id: u64, dados: DadosPeca) -> Result<()> {
        let dados = preparar(dados);
        match self.repo.substituir(id, dados) {
            Ok(()) => {
                info!(id, "Peça atualizada com sucesso");
                Ok(())
            }
            Err(e) => {
                error!(id, erro = %e, "Erro ao atualizar peça");
                Err(e)
            }
        }
    }

    /// Remove a peça; ids inexistentes são ignorados.
    pub fn remover(&self, id: u64) -> Result<()> {
        match self.repo.remover(id) {
            Ok(()) => {
                info!(id, "Peça removida com sucesso");
                Ok(())
            }
            Err(e) => {
                error!(id, erro = %e, "Erro ao remover peça");
                Err(e)
            }
        }
    }

    pub fn listar(&self) -> Result<Vec<Peca>> {
        self.repo.listar()
    }

    pub fn obter(&self, id: u64) -> Result<Option<Peca>> {
        self.repo.obter(id)
    }
}

fn preparar(mut dados: DadosPeca) -> DadosPeca {
    dados.codigo = com_prefixo(&dados.codigo);
    dados
}
