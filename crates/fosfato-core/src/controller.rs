//! Controlador da tela de cadastro: alterna entre cadastro e edição,
//! mantém a lista em cache e a visão filtrada, e avisa a camada de
//! exibição sempre que os dados mudam.

use std::fmt;

use tracing::{debug, warn};

use crate::error::{ErroRegistro, Result};
use crate::filter::FiltroPecas;
use crate::form::FormularioPeca;
use crate::model::{Maquina, Peca};
use crate::registry::RegistroPecas;
use crate::repository::PecaRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstadoFormulario {
    Cadastrando,
    Editando(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TipoNotificacao {
    Sucesso,
    Erro,
    Remocao,
}

/// Aviso curto para o usuário após uma operação.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notificacao {
    pub tipo: TipoNotificacao,
    pub mensagem: String,
}

impl Notificacao {
    fn new(tipo: TipoNotificacao, mensagem: &str) -> Self {
        Self {
            tipo,
            mensagem: mensagem.to_string(),
        }
    }
}

impl fmt::Display for Notificacao {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.mensagem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evento {
    /// A lista foi recarregada do banco e a visão recalculada.
    DadosAlterados,
    Notificacao(Notificacao),
}

/// Resultado de um envio bem-sucedido do formulário.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envio {
    Cadastrada(u64),
    Atualizada(u64),
}

type Ouvinte = Box<dyn FnMut(&Evento)>;

pub struct ControladorFormulario<R: PecaRepository> {
    registro: RegistroPecas<R>,
    estado: EstadoFormulario,
    formulario: FormularioPeca,
    pecas: Vec<Peca>,
    filtro: FiltroPecas,
    visiveis: Vec<Peca>,
    ouvintes: Vec<Ouvinte>,
}

impl<R: PecaRepository> ControladorFormulario<R> {
    /// Cria o controlador em modo cadastro e carrega a lista inicial.
    pub fn new(registro: RegistroPecas<R>) -> Result<Self> {
        let mut controlador = Self {
            registro,
            estado: EstadoFormulario::Cadastrando,
            formulario: FormularioPeca::default(),
            pecas: Vec::new(),
            filtro: FiltroPecas::default(),
            visiveis: Vec::new(),
            ouvintes: Vec::new(),
        };
        controlador.atualizar_lista()?;
        Ok(controlador)
    }

    /// Registra um ouvinte para os eventos do controlador.
    pub fn inscrever<F>(&mut self, ouvinte: F)
    where
        F: FnMut(&Evento) + 'static,
    {
        self.ouvintes.push(Box::new(ouvinte));
    }

    pub fn estado(&self) -> EstadoFormulario {
        self.estado
    }

    pub fn formulario(&self) -> &FormularioPeca {
        &self.formulario
    }

    pub fn formulario_mut(&mut self) -> &mut FormularioPeca {
        &mut self.formulario
    }

    /// Lista completa, na ordem do banco.
    pub fn pecas(&self) -> &[Peca] {
        &self.pecas
    }

    pub fn visiveis(&self) -> &[Peca] {
        &self.visiveis
    }

    pub fn registro(&self) -> &RegistroPecas<R> {
        &self.registro
    }

    pub fn into_registro(self) -> RegistroPecas<R> {
        self.registro
    }

    pub fn rotulo_envio(&self) -> &'static str {
        match self.estado {
            EstadoFormulario::Cadastrando => "Cadastrar Peça",
            EstadoFormulario::Editando(_) => "Atualizar Peça",
        }
    }

    pub fn definir_filtro(&mut self, filtro: FiltroPecas) {
        self.filtro = filtro;
        self.recalcular_visao();
    }

    pub fn definir_busca(&mut self, busca: &str) {
        self.filtro.busca = busca.to_string();
        self.recalcular_visao();
    }

    pub fn definir_filtro_maquina(&mut self, maquina: Option<Maquina>) {
        self.filtro.maquina = maquina;
        self.recalcular_visao();
    }

    pub fn definir_filtro_retrabalho(&mut self, retrabalho: Option<bool>) {
        self.filtro.retrabalho = retrabalho;
        self.recalcular_visao();
    }

    /// "Alterar": entra em modo edição com o formulário preenchido.
    pub fn alterar(&mut self, id: u64) -> Result<()> {
        let peca = self
            .pecas
            .iter()
            .find(|p| p.id == id)
            .ok_or(ErroRegistro::NaoEncontrada(id))?;
        self.formulario = FormularioPeca::de_peca(peca);
        self.estado = EstadoFormulario::Editando(id);
        debug!(id, "formulário em modo edição");
        Ok(())
    }

    /// Sai do modo edição descartando o que foi digitado.
    pub fn cancelar(&mut self) {
        self.estado = EstadoFormulario::Cadastrando;
        self.formulario.limpar();
    }

    /// Envia o formulário: cadastra ou atualiza conforme o estado.
    ///
    /// Formulário e estado de edição só são limpos depois que o banco
    /// confirma a gravação; em caso de falha tudo fica como estava.
    pub fn submeter(&mut self) -> Result<Envio> {
        let dados = self.formulario.validar().map_err(ErroRegistro::Validacao)?;

        let envio = match self.estado {
            EstadoFormulario::Cadastrando => match self.registro.cadastrar(dados) {
                Ok(id) => {
                    self.notificar(TipoNotificacao::Sucesso, "Peça adicionada com sucesso!");
                    Envio::Cadastrada(id)
                }
                Err(e) => {
                    self.notificar(TipoNotificacao::Erro, "Erro ao adicionar a peça!");
                    return Err(e);
                }
            },
            EstadoFormulario::Editando(id) => match self.registro.atualizar(id, dados) {
                Ok(()) => {
                    self.estado = EstadoFormulario::Cadastrando;
                    self.notificar(TipoNotificacao::Sucesso, "Peça atualizada com sucesso!");
                    Envio::Atualizada(id)
                }
                Err(e) => {
                    self.notificar(TipoNotificacao::Erro, "Erro ao atualizar a peça!");
                    return Err(e);
                }
            },
        };

        self.formulario.limpar();
        self.recarregar_apos_gravacao();
        Ok(envio)
    }

    /// "Remover": apaga a peça; se era a que estava em edição, volta ao cadastro.
    pub fn remover(&mut self, id: u64) -> Result<()> {
        if let Err(e) = self.registro.remover(id) {
            self.notificar(TipoNotificacao::Erro, "Erro ao remover a peça!");
            return Err(e);
        }
        if self.estado == EstadoFormulario::Editando(id) {
            self.cancelar();
        }
        self.notificar(TipoNotificacao::Remocao, "Peça removida com sucesso!");
        self.recarregar_apos_gravacao();
        Ok(())
    }

    /// Recarrega a lista do banco, recalcula a visão e emite `DadosAlterados`.
    pub fn atualizar_lista(&mut self) -> Result<()> {
        self.pecas = self.registro.listar()?;
        self.recalcular_visao();
        self.emitir(&Evento::DadosAlterados);
        Ok(())
    }

    /// A gravação já foi confirmada: uma falha ao reler a lista vira aviso,
    /// nunca erro do envio, senão o usuário reenviaria e duplicaria a peça.
    fn recarregar_apos_gravacao(&mut self) {
        if let Err(e) = self.atualizar_lista() {
            warn!(erro = %e, "gravação confirmada, mas a lista não foi recarregada");
            self.notificar(TipoNotificacao::Erro, "Erro ao recarregar a lista de peças!");
        }
    }

    fn recalcular_visao(&mut self) {
        self.visiveis = self.filtro.aplicar(&self.pecas);
        debug!(
            total = self.pecas.len(),
            visiveis = self.visiveis.len(),
            "visão de peças recalculada"
        );
    }

    fn notificar(&mut self, tipo: TipoNotificacao, mensagem: &str) {
        self.emitir(&Evento::Notificacao(Notificacao::new(tipo, mensagem)));
    }

    fn emitir(&mut self, evento: &Evento) {
        for ouvinte in self.ouvintes.iter_mut() {
            ouvinte(evento);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DadosPeca;
    use crate::repository::InMemoryRepository;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Repositório que falha em toda escrita.
    struct RepositorioQuebrado {
        inner: InMemoryRepository,
    }

    impl PecaRepository for RepositorioQuebrado {
        fn inserir(&self, _dados: DadosPeca) -> Result<u64> {
            Err(ErroRegistro::Persistencia("cota excedida".to_string()))
        }

        fn substituir(&self, _id: u64, _dados: DadosPeca) -> Result<()> {
            Err(ErroRegistro::Persistencia("cota excedida".to_string()))
        }

        fn remover(&self, _id: u64) -> Result<()> {
            Err(ErroRegistro::Persistencia("banco indisponível".to_string()))
        }

        fn listar(&self) -> Result<Vec<Peca>> {
            self.inner.listar()
        }

        fn obter(&self, id: u64) -> Result<Option<Peca>> {
            self.inner.obter(id)
        }
    }

    /// Grava normalmente, mas só consegue listar na primeira leitura.
    struct LeituraInstavel {
        inner: InMemoryRepository,
        leituras: AtomicUsize,
    }

    impl PecaRepository for LeituraInstavel {
        fn inserir(&self, dados: DadosPeca) -> Result<u64> {
            self.inner.inserir(dados)
        }

        fn substituir(&self, id: u64, dados: DadosPeca) -> Result<()> {
            self.inner.substituir(id, dados)
        }

        fn remover(&self, id: u64) -> Result<()> {
            self.inner.remover(id)
        }

        fn listar(&self) -> Result<Vec<Peca>> {
            if self.leituras.fetch_add(1, Ordering::SeqCst) > 0 {
                return Err(ErroRegistro::Persistencia("leitura interrompida".to_string()));
            }
            self.inner.listar()
        }

        fn obter(&self, id: u64) -> Result<Option<Peca>> {
            self.inner.obter(id)
        }
    }

    fn preencher(form: &mut FormularioPeca, codigo: &str) {
        form.codigo = codigo.to_string();
        form.lote = "L1".to_string();
        form.quantidade = "10".to_string();
        form.data = "2024-01-01".to_string();
        form.hora = "08:00".to_string();
        form.maquina = Some(Maquina::Lfos0201);
    }

    fn controlador() -> ControladorFormulario<InMemoryRepository> {
        ControladorFormulario::new(RegistroPecas::new(InMemoryRepository::new())).unwrap()
    }

    fn gravar_eventos<R: PecaRepository>(
        controlador: &mut ControladorFormulario<R>,
    ) -> Rc<RefCell<Vec<Evento>>> {
        let eventos = Rc::new(RefCell::new(Vec::new()));
        let destino = Rc::clone(&eventos);
        controlador.inscrever(move |e| destino.borrow_mut().push(e.clone()));
        eventos
    }

    #[test]
    fn test_cadastro_limpa_formulario_e_avisa() {
        let mut c = controlador();
        let eventos = gravar_eventos(&mut c);

        preencher(c.formulario_mut(), "001");
        let envio = c.submeter().unwrap();

        assert_eq!(envio, Envio::Cadastrada(1));
        assert_eq!(c.estado(), EstadoFormulario::Cadastrando);
        assert_eq!(c.formulario(), &FormularioPeca::default());
        assert_eq!(c.visiveis().len(), 1);
        assert_eq!(c.visiveis()[0].dados.codigo, "BR001");

        let eventos = eventos.borrow();
        assert_eq!(
            eventos[0],
            Evento::Notificacao(Notificacao::new(
                TipoNotificacao::Sucesso,
                "Peça adicionada com sucesso!"
            ))
        );
        assert_eq!(eventos[1], Evento::DadosAlterados);
    }

    #[test]
    fn test_validacao_bloqueia_envio() {
        let mut c = controlador();
        let eventos = gravar_eventos(&mut c);
        c.formulario_mut().codigo = "001".to_string();

        let erro = c.submeter().unwrap_err();
        match erro {
            ErroRegistro::Validacao(erros) => assert!(!erros.is_empty()),
            outro => panic!("erro inesperado: {outro}"),
        }
        assert_eq!(c.formulario().codigo, "001");
        assert!(c.pecas().is_empty());
        assert!(eventos.borrow().is_empty());
    }

    #[test]
    fn test_edicao_completa() {
        let mut c = controlador();
        preencher(c.formulario_mut(), "001");
        c.submeter().unwrap();
        let id = c.pecas()[0].id;

        c.alterar(id).unwrap();
        assert_eq!(c.estado(), EstadoFormulario::Editando(id));
        assert_eq!(c.rotulo_envio(), "Atualizar Peça");
        // formulário mostra só o sufixo
        assert_eq!(c.formulario().codigo, "001");

        c.formulario_mut().quantidade = "20".to_string();
        assert_eq!(c.submeter().unwrap(), Envio::Atualizada(id));

        assert_eq!(c.estado(), EstadoFormulario::Cadastrando);
        assert_eq!(c.rotulo_envio(), "Cadastrar Peça");
        let pecas = c.pecas();
        assert_eq!(pecas.len(), 1);
        assert_eq!(pecas[0].dados.quantidade, 20);
        assert_eq!(pecas[0].dados.codigo, "BR001");
    }

    #[test]
    fn test_alterar_id_ausente() {
        let mut c = controlador();
        assert!(matches!(c.alterar(3), Err(ErroRegistro::NaoEncontrada(3))));
        assert_eq!(c.estado(), EstadoFormulario::Cadastrando);
    }

    #[test]
    fn test_cancelar_edicao() {
        let mut c = controlador();
        preencher(c.formulario_mut(), "001");
        c.submeter().unwrap();

        c.alterar(1).unwrap();
        c.cancelar();
        assert_eq!(c.estado(), EstadoFormulario::Cadastrando);
        assert_eq!(c.formulario(), &FormularioPeca::default());
    }

    #[test]
    fn test_falha_de_persistencia_preserva_estado() {
        let repo = RepositorioQuebrado {
            inner: InMemoryRepository::new(),
        };
        repo.inner
            .inserir(DadosPeca {
                codigo: "BR001".to_string(),
                lote: "L1".to_string(),
                quantidade: 10,
                data: "2024-01-01".to_string(),
                hora: "08:00".to_string(),
                maquina: None,
                retrabalho: false,
                motivo: String::new(),
            })
            .unwrap();
        let mut c = ControladorFormulario::new(RegistroPecas::new(repo)).unwrap();
        let eventos = gravar_eventos(&mut c);

        // cadastro
        preencher(c.formulario_mut(), "002");
        let antes = c.formulario().clone();
        assert!(matches!(c.submeter(), Err(ErroRegistro::Persistencia(_))));
        assert_eq!(c.formulario(), &antes);

        // edição
        c.alterar(1).unwrap();
        assert!(c.submeter().is_err());
        assert_eq!(c.estado(), EstadoFormulario::Editando(1));

        // remoção
        assert!(c.remover(1).is_err());
        assert_eq!(c.pecas().len(), 1);

        let mensagens: Vec<String> = eventos
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Evento::Notificacao(n) if n.tipo == TipoNotificacao::Erro => {
                    Some(n.mensagem.clone())
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            mensagens,
            vec![
                "Erro ao adicionar a peça!",
                "Erro ao atualizar a peça!",
                "Erro ao remover a peça!"
            ]
        );
        assert!(!eventos.borrow().contains(&Evento::DadosAlterados));
    }

    #[test]
    fn test_gravacao_confirmada_nao_vira_erro_se_releitura_falha() {
        let repo = LeituraInstavel {
            inner: InMemoryRepository::new(),
            leituras: AtomicUsize::new(0),
        };
        let mut c = ControladorFormulario::new(RegistroPecas::new(repo)).unwrap();
        let eventos = gravar_eventos(&mut c);

        preencher(c.formulario_mut(), "001");
        assert_eq!(c.submeter().unwrap(), Envio::Cadastrada(1));
        assert_eq!(c.formulario(), &FormularioPeca::default());

        // reenviar o formulário limpo não duplica a peça
        assert!(matches!(c.submeter(), Err(ErroRegistro::Validacao(_))));
        assert_eq!(c.registro().obter(1).unwrap().map(|p| p.id), Some(1));
        assert_eq!(c.registro().obter(2).unwrap(), None);

        c.remover(1).unwrap();
        assert_eq!(c.registro().obter(1).unwrap(), None);

        let avisos: Vec<Notificacao> = eventos
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Evento::Notificacao(n) => Some(n.clone()),
                Evento::DadosAlterados => None,
            })
            .collect();
        assert_eq!(
            avisos,
            vec![
                Notificacao::new(TipoNotificacao::Sucesso, "Peça adicionada com sucesso!"),
                Notificacao::new(TipoNotificacao::Erro, "Erro ao recarregar a lista de peças!"),
                Notificacao::new(TipoNotificacao::Remocao, "Peça removida com sucesso!"),
                Notificacao::new(TipoNotificacao::Erro, "Erro ao recarregar a lista de peças!"),
            ]
        );
        assert!(!eventos.borrow().contains(&Evento::DadosAlterados));
    }

    #[test]
    fn test_remover_peca_em_edicao() {
        let mut c = controlador();
        preencher(c.formulario_mut(), "001");
        c.submeter().unwrap();

        c.alterar(1).unwrap();
        c.remover(1).unwrap();
        assert_eq!(c.estado(), EstadoFormulario::Cadastrando);
        assert!(c.pecas().is_empty());
    }

    #[test]
    fn test_filtros_recalculam_visao() {
        let mut c = controlador();
        preencher(c.formulario_mut(), "001");
        c.submeter().unwrap();
        preencher(c.formulario_mut(), "002");
        c.formulario_mut().maquina = Some(Maquina::Lfos0202);
        c.formulario_mut().retrabalho = true;
        c.submeter().unwrap();

        c.definir_filtro_retrabalho(Some(true));
        assert_eq!(c.visiveis().len(), 1);
        assert_eq!(c.visiveis()[0].dados.codigo, "BR002");

        c.definir_filtro_retrabalho(None);
        c.definir_filtro_maquina(Some(Maquina::Lfos0201));
        assert_eq!(c.visiveis()[0].dados.codigo, "BR001");

        c.definir_filtro(FiltroPecas::default());
        c.definir_busca("br00");
        assert_eq!(c.visiveis().len(), 2);
        assert_eq!(c.pecas().len(), 2);
    }
}
