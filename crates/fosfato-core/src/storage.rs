use std::path::{Path, PathBuf};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, info};

use crate::error::{ErroRegistro, Result};
use crate::model::{DadosPeca, Peca};
use crate::repository::PecaRepository;

/// Versão do esquema gravada no banco. Não há migração além da 1.
pub const VERSAO_ESQUEMA: u64 = 1;

const PECAS: TableDefinition<u64, &[u8]> = TableDefinition::new("pecas");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const CHAVE_VERSAO: &str = "versao_esquema";
const CHAVE_ULTIMO_ID: &str = "ultimo_id";

/// Banco local de peças sobre redb.
///
/// Cada peça é gravada em JSON na tabela `pecas`, indexada pelo id. O último
/// id atribuído fica em `meta`, então ids removidos não voltam a ser usados.
pub struct RedbRepository {
    db: Database,
    caminho: PathBuf,
}

impl RedbRepository {
    /// Abre (ou cria) o banco e confere a versão do esquema.
    pub fn open(caminho: &Path) -> Result<Self> {
        if let Some(parent) = caminho.parent() {
            std::fs::create_dir_all(parent).map_err(ErroRegistro::persistencia)?;
        }

        let db = Database::create(caminho).map_err(ErroRegistro::persistencia)?;

        let txn = db.begin_write().map_err(ErroRegistro::persistencia)?;
        {
            txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;
            let mut meta = txn.open_table(META).map_err(ErroRegistro::persistencia)?;
            let versao = meta
                .get(CHAVE_VERSAO)
                .map_err(ErroRegistro::persistencia)?
                .map(|v| v.value());
            match versao {
                None => {
                    meta.insert(CHAVE_VERSAO, VERSAO_ESQUEMA)
                        .map_err(ErroRegistro::persistencia)?;
                }
                Some(v) if v == VERSAO_ESQUEMA => {}
                Some(v) => {
                    return Err(ErroRegistro::EsquemaIncompativel {
                        encontrada: v,
                        suportada: VERSAO_ESQUEMA,
                    })
                }
            }
        }
        txn.commit().map_err(ErroRegistro::persistencia)?;

        info!(caminho = %caminho.display(), "banco de peças aberto");
        Ok(Self {
            db,
            caminho: caminho.to_path_buf(),
        })
    }

    /// Fecha o banco; o handle deixa de existir.
    pub fn close(self) {
        info!(caminho = %self.caminho.display(), "banco de peças fechado");
        drop(self.db);
    }
}

fn codificar(dados: &DadosPeca) -> Result<Vec<u8>> {
    serde_json::to_vec(dados).map_err(ErroRegistro::persistencia)
}

fn decodificar(bytes: &[u8]) -> Result<DadosPeca> {
    serde_json::from_slice(bytes).map_err(ErroRegistro::persistencia)
}

impl PecaRepository for RedbRepository {
    fn inserir(&self, dados: DadosPeca) -> Result<u64> {
        let bytes = codificar(&dados)?;
        let txn = self.db.begin_write().map_err(ErroRegistro::persistencia)?;
        let id = {
            let mut meta = txn.open_table(META).map_err(ErroRegistro::persistencia)?;
            let ultimo = meta
                .get(CHAVE_ULTIMO_ID)
                .map_err(ErroRegistro::persistencia)?
                .map(|v| v.value())
                .unwrap_or(0);
            let id = ultimo + 1;
            meta.insert(CHAVE_ULTIMO_ID, id)
                .map_err(ErroRegistro::persistencia)?;

            let mut pecas = txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;
            pecas
                .insert(id, bytes.as_slice())
                .map_err(ErroRegistro::persistencia)?;
            id
        };
        txn.commit().map_err(ErroRegistro::persistencia)?;
        debug!(id, "linha inserida em pecas");
        Ok(id)
    }

    fn substituir(&self, id: u64, dados: DadosPeca) -> Result<()> {
        let bytes = codificar(&dados)?;
        let txn = self.db.begin_write().map_err(ErroRegistro::persistencia)?;
        {
            let mut pecas = txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;
            let existe = pecas
                .get(id)
                .map_err(ErroRegistro::persistencia)?
                .is_some();
            if !existe {
                return Err(ErroRegistro::NaoEncontrada(id));
            }
            pecas
                .insert(id, bytes.as_slice())
                .map_err(ErroRegistro::persistencia)?;
        }
        txn.commit().map_err(ErroRegistro::persistencia)?;
        debug!(id, "linha substituída em pecas");
        Ok(())
    }

    fn remover(&self, id: u64) -> Result<()> {
        let txn = self.db.begin_write().map_err(ErroRegistro::persistencia)?;
        {
            let mut pecas = txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;
            pecas.remove(id).map_err(ErroRegistro::persistencia)?;
        }
        txn.commit().map_err(ErroRegistro::persistencia)?;
        debug!(id, "linha removida de pecas");
        Ok(())
    }

    fn listar(&self) -> Result<Vec<Peca>> {
        let txn = self.db.begin_read().map_err(ErroRegistro::persistencia)?;
        let pecas = txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;

        let mut resultado = Vec::new();
        for entrada in pecas.iter().map_err(ErroRegistro::persistencia)? {
            let (id, valor) = entrada.map_err(ErroRegistro::persistencia)?;
            resultado.push(Peca::new(id.value(), decodificar(valor.value())?));
        }
        Ok(resultado)
    }

    fn obter(&self, id: u64) -> Result<Option<Peca>> {
        let txn = self.db.begin_read().map_err(ErroRegistro::persistencia)?;
        let pecas = txn.open_table(PECAS).map_err(ErroRegistro::persistencia)?;
        match pecas.get(id).map_err(ErroRegistro::persistencia)? {
            Some(valor) => Ok(Some(Peca::new(id, decodificar(valor.value())?))),
            None => Ok(None),
        }
    }
}
