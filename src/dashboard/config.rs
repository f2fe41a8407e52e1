/// Column layout and outcome labels of a production dashboard variant.
///
/// The daily and monthly pages are the same pipeline over slightly different
/// sheets: the team column changes name and the daily summary pivots by team
/// AND sector. One config per page replaces the duplicated scripts.
#[derive(Debug, Clone)]
pub struct ProducaoConfig {
    pub nome: &'static str,
    /// Categorical columns standardized on load (trim, collapse, upper).
    pub colunas_texto: Vec<String>,
    pub coluna_setor: String,
    pub coluna_equipe: String,
    pub coluna_servico: String,
    pub coluna_resultado: String,
    pub resultado_positivo: String,
    pub resultado_negativo: String,
    /// Daily page pivots the team summary by team and sector together.
    pub resumo_equipe_com_setor: bool,
}

impl ProducaoConfig {
    pub fn producao_diaria() -> ProducaoConfig {
        ProducaoConfig::variante("producao_diaria", "Chefe/Responsável de Equipe", true)
    }

    pub fn producao_mensal() -> ProducaoConfig {
        ProducaoConfig::variante("producao_mensal", "Código Equipe", false)
    }

    fn variante(
        nome: &'static str,
        coluna_equipe: &str,
        resumo_equipe_com_setor: bool,
    ) -> ProducaoConfig {
        ProducaoConfig {
            nome,
            colunas_texto: vec![
                "Setor".into(),
                coluna_equipe.into(),
                "Resultado".into(),
                "Serviço".into(),
                "Tipo Operação".into(),
            ],
            coluna_setor: "Setor".into(),
            coluna_equipe: coluna_equipe.into(),
            coluna_servico: "Serviço".into(),
            coluna_resultado: "Resultado".into(),
            resultado_positivo: "PRODUTIVO".into(),
            resultado_negativo: "IMPRODUTIVO".into(),
            resumo_equipe_com_setor,
        }
    }

    /// Canonical outcome labels, positive first (the order the summary
    /// tables display).
    pub fn resultados_esperados(&self) -> [&str; 2] {
        [&self.resultado_positivo, &self.resultado_negativo]
    }

    /// Columns the page's global filters act on. All three are required:
    /// the page cannot build its dropdowns without them.
    pub fn colunas_filtro(&self) -> [&str; 3] {
        [
            &self.coluna_setor,
            &self.coluna_equipe,
            &self.coluna_resultado,
        ]
    }
}
