use crate::error::{ErroRegistro, Result};
use crate::model::{DadosPeca, Peca};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Tabela `pecas`: armazenamento bruto, sem regras de negócio.
///
/// Os ids são auto-incrementais e nunca reaproveitados. A listagem segue
/// a ordem de iteração do banco (id crescente).
pub trait PecaRepository: Send + Sync {
    fn inserir(&self, dados: DadosPeca) -> Result<u64>;
    /// Substitui todos os campos da peça; falha com `NaoEncontrada` se o id não existe.
    fn substituir(&self, id: u64, dados: DadosPeca) -> Result<()>;
    /// Remove se existir. Remover um id ausente não é erro.
    fn remover(&self, id: u64) -> Result<()>;
    fn listar(&self) -> Result<Vec<Peca>>;
    fn obter(&self, id: u64) -> Result<Option<Peca>>;
}

#[derive(Default)]
struct Tabela {
    proximo_id: u64,
    linhas: BTreeMap<u64, DadosPeca>,
}

/// Repositório em memória, usado em testes e sessões descartáveis.
#[derive(Default)]
pub struct InMemoryRepository {
    inner: Mutex<Tabela>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tabela(&self) -> Result<MutexGuard<'_, Tabela>> {
        self.inner
            .lock()
            .map_err(|_| ErroRegistro::Persistencia("mutex poisoned".to_string()))
    }
}

impl PecaRepository for InMemoryRepository {
    fn inserir(&self, dados: DadosPeca) -> Result<u64> {
        let mut tabela = self.tabela()?;
        tabela.proximo_id += 1;
        let id = tabela.proximo_id;
        tabela.linhas.insert(id, dados);
        Ok(id)
    }

    fn substituir(&self, id: u64, dados: DadosPeca) -> Result<()> {
        let mut tabela = self.tabela()?;
        match tabela.linhas.get_mut(&id) {
            Some(linha) => {
                *linha = dados;
                Ok(())
            }
            None => Err(ErroRegistro::NaoEncontrada(id)),
        }
    }

    fn remover(&self, id: u64) -> Result<()> {
        self.tabela()?.linhas.remove(&id);
        Ok(())
    }

    fn listar(&self) -> Result<Vec<Peca>> {
        let tabela = self.tabela()?;
        Ok(tabela
            .linhas
            .iter()
            .map(|(id, dados)| Peca::new(*id, dados.clone()))
            .collect())
    }

    fn obter(&self, id: u64) -> Result<Option<Peca>> {
        let tabela = self.tabela()?;
        Ok(tabela.linhas.get(&id).map(|d| Peca::new(id, d.clone())))
    }
}
