//! Cadastro de peças da linha de fosfato.
//!
//! O [`RegistroPecas`] grava peças num repositório injetado (em memória ou
//! redb), o [`FiltroPecas`] calcula a lista visível e o
//! [`ControladorFormulario`] cuida do ciclo cadastro/edição da tela.

pub mod controller;
pub mod error;
pub mod filter;
pub mod form;
pub mod model;
pub mod registry;
pub mod repository;
pub mod storage;

pub use controller::{
    ControladorFormulario, Envio, EstadoFormulario, Evento, Notificacao, TipoNotificacao,
};
pub use error::{Campo, ErroRegistro, ErrosValidacao, Result};
pub use filter::{filtro_maquina, filtro_retrabalho, FiltroPecas};
pub use form::{retrabalho_de_texto, FormularioPeca};
pub use model::{com_prefixo, sem_prefixo, DadosPeca, Maquina, Peca, PREFIXO_CODIGO};
pub use registry::RegistroPecas;
pub use repository::{InMemoryRepository, PecaRepository};
pub use storage::{RedbRepository, VERSAO_ESQUEMA};
