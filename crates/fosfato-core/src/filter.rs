use crate::model::{Maquina, Peca};

/// Critérios da lista de peças. `None` significa "sem filtro".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FiltroPecas {
    /// Trecho do código, sem diferenciar maiúsculas.
    pub busca: String,
    pub maquina: Option<Maquina>,
    pub retrabalho: Option<bool>,
}

impl FiltroPecas {
    /// Uma peça passa só se atender aos três critérios.
    /// `busca` já vem em minúsculas.
    fn aceita(&self, peca: &Peca, busca: &str) -> bool {
        let codigo = peca.dados.codigo.to_lowercase().contains(busca);
        let maquina = self.maquina.map_or(true, |m| peca.dados.maquina == Some(m));
        let retrabalho = self.retrabalho.map_or(true, |r| peca.dados.retrabalho == r);
        codigo && maquina && retrabalho
    }

    /// Subconjunto visível, na mesma ordem da lista de entrada.
    pub fn aplicar(&self, pecas: &[Peca]) -> Vec<Peca> {
        let busca = self.busca.to_lowercase();
        pecas
            .iter()
            .filter(|p| self.aceita(p, &busca))
            .cloned()
            .collect()
    }
}

/// Lê o filtro de retrabalho no formato do select: `""`, `"true"` ou `"false"`.
pub fn filtro_retrabalho(valor: &str) -> Result<Option<bool>, String> {
    match valor.trim().to_lowercase().as_str() {
        "" | "todos" => Ok(None),
        "true" | "sim" => Ok(Some(true)),
        "false" | "nao" | "não" => Ok(Some(false)),
        outro => Err(format!("filtro de retrabalho inválido: '{outro}'")),
    }
}

/// Lê o filtro de máquina; vazio ou "todas" desliga o filtro.
pub fn filtro_maquina(valor: &str) -> Result<Option<Maquina>, String> {
    match valor.trim() {
        "" => Ok(None),
        v if v.eq_ignore_ascii_case("todas") => Ok(None),
        v => v.parse().map(Some),
    }
}
