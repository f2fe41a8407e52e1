use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::dashboard::fiscalizacao::{
    build_fiscalizacao, intervalo_datas, meses_disponiveis, preparar_base, PainelFiscalizacao,
    COLUNA_AGENTE, COLUNA_DATA_ANALISE, COLUNA_MES_ANO, COLUNA_RESPONSAVEL, COLUNA_STATUS,
};
use crate::error::AppError;
use crate::loader::DataSource;
use crate::pipeline::dates::parse_dayfirst_date;
use crate::pipeline::filter::{apply_filters, FilterValue, Selection};
use crate::pipeline::table::Table;
use crate::secrets::Secrets;
use crate::state::AppState;

/// One inspection page render: source, period controls and the three
/// categorical selects (sentinel-aware, "TODOS" = no restriction).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalizacaoRequest {
    pub fonte: DataSource,
    /// "Mês Referência" dropdown ("MM/YYYY" or the sentinel). Narrows the
    /// slider bounds; the actual row filter is the date range.
    #[serde(default)]
    pub mes: Option<String>,
    /// Slider range, day-first ("DD/MM/YYYY"). Absent = full slider bounds.
    #[serde(default)]
    pub data_inicio: Option<String>,
    #[serde(default)]
    pub data_fim: Option<String>,
    #[serde(default)]
    pub agente: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub responsavel: Option<String>,
}

/// Everything the inspection page needs for one render. `painel` is `None`
/// when no row survived the filters (the "no data" notice).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalizacaoView {
    pub meses_disponiveis: Vec<String>,
    /// Slider bounds for the chosen month; `None` disables the slider.
    pub intervalo_slider: Option<(NaiveDate, NaiveDate)>,
    pub opcoes_agente: Vec<String>,
    pub opcoes_status: Vec<String>,
    pub opcoes_responsavel: Vec<String>,
    pub dados_filtrados: Table,
    pub painel: Option<PainelFiscalizacao>,
}

fn parse_data_request(valor: &Option<String>, rotulo: &str) -> Result<Option<NaiveDate>, AppError> {
    match valor {
        None => Ok(None),
        Some(s) => parse_dayfirst_date(s)
            .map(Some)
            .ok_or_else(|| AppError::Custom(format!("Data de {} inválida: {}", rotulo, s))),
    }
}

/// Inspection page render logic.
pub fn run_fiscalizacao_logic(
    state: &AppState,
    secrets: &Secrets,
    request: &FiscalizacaoRequest,
) -> Result<FiscalizacaoView, AppError> {
    let bruto = state.load_table(&request.fonte, secrets)?;
    let base = preparar_base(&bruto)?;
    let meses = meses_disponiveis(&base);

    // Month narrows only the slider bounds; rows are cut by the date range.
    let filtro_mes = FilterValue::from_opt_select(request.mes.as_deref());
    let base_mes = if filtro_mes.is_all() {
        base.clone()
    } else {
        apply_filters(&base, &Selection::new().with(COLUNA_MES_ANO, filtro_mes))?
    };
    let intervalo_slider = intervalo_datas(&base_mes);

    let inicio = parse_data_request(&request.data_inicio, "início")?
        .or(intervalo_slider.map(|(min, _)| min));
    let fim = parse_data_request(&request.data_fim, "fim")?
        .or(intervalo_slider.map(|(_, max)| max));

    let mut selection = Selection::new()
        .with(
            COLUNA_AGENTE,
            FilterValue::from_opt_select(request.agente.as_deref()),
        )
        .with(
            COLUNA_STATUS,
            FilterValue::from_opt_select(request.status.as_deref()),
        )
        .with(
            COLUNA_RESPONSAVEL,
            FilterValue::from_opt_select(request.responsavel.as_deref()),
        );
    if let (Some(start), Some(end)) = (inicio, fim) {
        selection.set(COLUNA_DATA_ANALISE, FilterValue::DateRange { start, end });
    }
    let filtrado = apply_filters(&base, &selection)?;
    debug!(
        "fiscalizacao: {} de {} linhas após filtros",
        filtrado.len(),
        base.len()
    );

    let painel = build_fiscalizacao(&filtrado)?;

    Ok(FiscalizacaoView {
        meses_disponiveis: meses,
        intervalo_slider,
        opcoes_agente: base.distinct_values(COLUNA_AGENTE),
        opcoes_status: base.distinct_values(COLUNA_STATUS),
        opcoes_responsavel: base.distinct_values(COLUNA_RESPONSAVEL),
        dados_filtrados: filtrado,
        painel,
    })
}
