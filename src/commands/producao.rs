use log::debug;
use serde::{Deserialize, Serialize};

use crate::dashboard::config::ProducaoConfig;
use crate::dashboard::producao::{build_producao, PainelProducao};
use crate::error::AppError;
use crate::loader::DataSource;
use crate::pipeline::filter::{apply_filters, FilterValue, Selection};
use crate::pipeline::normalize::normalize_text_columns;
use crate::pipeline::table::Table;
use crate::secrets::Secrets;
use crate::state::AppState;

/// One production page render: source plus the sidebar filter state.
///
/// The multiselects arrive as the UI sends them, sentinel included; `None`
/// means the control was never touched (no restriction), while an explicit
/// empty list means the user cleared it (matches nothing).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducaoRequest {
    pub fonte: DataSource,
    #[serde(default)]
    pub setores: Option<Vec<String>>,
    #[serde(default)]
    pub equipes: Option<Vec<String>>,
    #[serde(default)]
    pub resultados: Option<Vec<String>>,
    /// "Detalhar por Equipe" drill-down select.
    #[serde(default)]
    pub detalhe_equipe: Option<String>,
    /// "Detalhar por Setor" drill-down select.
    #[serde(default)]
    pub detalhe_setor: Option<String>,
}

/// Everything the production page needs for one render.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducaoView {
    /// Dropdown option lists, built from the normalized table so they match
    /// what the filters compare against.
    pub opcoes_setor: Vec<String>,
    pub opcoes_equipe: Vec<String>,
    pub opcoes_resultado: Vec<String>,
    /// The filtered table, shown in the expandable data grid.
    pub dados_filtrados: Table,
    pub painel: PainelProducao,
}

fn multiselect(escolhas: &Option<Vec<String>>) -> FilterValue {
    match escolhas {
        Some(v) => FilterValue::from_multiselect(v),
        None => FilterValue::All,
    }
}

/// Shared render logic for both production pages.
pub fn run_producao_logic(
    state: &AppState,
    secrets: &Secrets,
    config: &ProducaoConfig,
    request: &ProducaoRequest,
) -> Result<ProducaoView, AppError> {
    let bruto = state.load_table(&request.fonte, secrets)?;
    let colunas: Vec<&str> = config.colunas_texto.iter().map(String::as_str).collect();
    let tabela = normalize_text_columns(&bruto, &colunas);
    tabela.require_columns(&config.colunas_filtro())?;

    let selection = Selection::new()
        .with(&config.coluna_setor, multiselect(&request.setores))
        .with(&config.coluna_equipe, multiselect(&request.equipes))
        .with(&config.coluna_resultado, multiselect(&request.resultados));
    let filtrado = apply_filters(&tabela, &selection)?;
    debug!(
        "{}: {} de {} linhas após filtros",
        config.nome,
        filtrado.len(),
        tabela.len()
    );

    let painel = build_producao(
        &filtrado,
        config,
        &FilterValue::from_opt_select(request.detalhe_equipe.as_deref()),
        &FilterValue::from_opt_select(request.detalhe_setor.as_deref()),
    )?;

    Ok(ProducaoView {
        opcoes_setor: tabela.distinct_values(&config.coluna_setor),
        opcoes_equipe: tabela.distinct_values(&config.coluna_equipe),
        opcoes_resultado: tabela.distinct_values(&config.coluna_resultado),
        dados_filtrados: filtrado,
        painel,
    })
}

/// Daily production page (uploaded workbook, team = "Chefe/Responsável de Equipe").
pub fn run_producao_diaria_logic(
    state: &AppState,
    secrets: &Secrets,
    request: &ProducaoRequest,
) -> Result<ProducaoView, AppError> {
    run_producao_logic(state, secrets, &ProducaoConfig::producao_diaria(), request)
}

/// Monthly production page (cloud/base sheet, team = "Código Equipe").
pub fn run_producao_mensal_logic(
    state: &AppState,
    secrets: &Secrets,
    request: &ProducaoRequest,
) -> Result<ProducaoView, AppError> {
    run_producao_logic(state, secrets, &ProducaoConfig::producao_mensal(), request)
}
