use chrono::NaiveDate;
use serde::Serialize;

use crate::dashboard::{contagem_ordenada, CategoriaContagem};
use crate::error::AppError;
use crate::pipeline::aggregate::{count_total, pct, value_counts};
use crate::pipeline::dates::{mes_ano, parse_dayfirst_date, parse_mes_ano};
use crate::pipeline::normalize::normalize_text_columns;
use crate::pipeline::table::{CellValue, Table};

// ─── Column contract ─────────────────────────────────────────────────────────

pub const COLUNA_STATUS: &str = "Status";
pub const COLUNA_ERRO: &str = "Erro";
pub const COLUNA_AGENTE: &str = "Agente";
pub const COLUNA_RESPONSAVEL: &str = "Responsável";
pub const COLUNA_DATA_ANALISE: &str = "Data da analise";
pub const COLUNA_PLANO_ACAO: &str = "Status Plano Ação";
/// Derived month key column ("MM/YYYY"), appended by [`preparar_base`].
pub const COLUNA_MES_ANO: &str = "Mês Ano";

/// All six are mandatory: the page refuses to render without them.
const COLUNAS_ESSENCIAIS: &[&str] = &[
    COLUNA_STATUS,
    COLUNA_ERRO,
    COLUNA_AGENTE,
    COLUNA_DATA_ANALISE,
    COLUNA_RESPONSAVEL,
    COLUNA_PLANO_ACAO,
];

const COLUNAS_TEXTO: &[&str] = &[
    COLUNA_STATUS,
    COLUNA_ERRO,
    COLUNA_AGENTE,
    COLUNA_RESPONSAVEL,
    COLUNA_PLANO_ACAO,
];

pub const STATUS_PROCEDENTE: &str = "PROCEDENTE";
pub const STATUS_IMPROCEDENTE: &str = "IMPROCEDENTE";
pub const PLANO_PENDENTE: &str = "PENDENTE";
pub const PLANO_REALIZADO: &str = "REALIZADO";

// ─── Prepare ─────────────────────────────────────────────────────────────────

/// Centralized data prep the inspection page runs once per load:
/// validate the essential columns, normalize the text columns, parse the
/// analysis date day-first (rows without a parseable date are dropped),
/// keep only upheld/overturned rows, and derive the "Mês Ano" key.
pub fn preparar_base(bruto: &Table) -> Result<Table, AppError> {
    bruto.require_columns(COLUNAS_ESSENCIAIS)?;

    let normalizado = normalize_text_columns(bruto, COLUNAS_TEXTO);

    let com_datas = normalizado.map_column(COLUNA_DATA_ANALISE, |cell| match cell {
        CellValue::Date(d) => CellValue::Date(*d),
        CellValue::Text(s) => parse_dayfirst_date(s)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Empty),
        _ => CellValue::Empty,
    });
    let idx_data = com_datas.column_index(COLUNA_DATA_ANALISE).unwrap();
    let idx_status = com_datas.column_index(COLUNA_STATUS).unwrap();
    let com_datas = com_datas.retain_rows(|row| row[idx_data].as_date().is_some());

    let base = com_datas.retain_rows(|row| {
        let status = row[idx_status].display_text();
        status == STATUS_PROCEDENTE || status == STATUS_IMPROCEDENTE
    });

    let meses: Vec<CellValue> = base
        .rows()
        .map(|row| {
            row[idx_data]
                .as_date()
                .map(|d| CellValue::Text(mes_ano(d)))
                .unwrap_or(CellValue::Empty)
        })
        .collect();
    Ok(base.with_column(COLUNA_MES_ANO, meses))
}

/// Month keys available in the prepared base, most recent first. Feeds the
/// "Mês Referência" dropdown.
pub fn meses_disponiveis(base: &Table) -> Vec<String> {
    let mut meses = base.distinct_values(COLUNA_MES_ANO);
    meses.sort_by_key(|m| std::cmp::Reverse(parse_mes_ano(m)));
    meses
}

/// Min/max analysis dates of a prepared table (the slider bounds).
/// `None` when the table has no dated rows.
pub fn intervalo_datas(tabela: &Table) -> Option<(NaiveDate, NaiveDate)> {
    let datas: Vec<NaiveDate> = tabela
        .column_values(COLUNA_DATA_ANALISE)?
        .filter_map(|c| c.as_date())
        .collect();
    let min = datas.iter().min()?;
    let max = datas.iter().max()?;
    Some((*min, *max))
}

// ─── View structs ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumoFiscalizacao {
    pub total_fiscalizado: usize,
    /// Rows whose `Erro` is non-empty.
    pub total_erros: usize,
    /// Percentage, two decimals, 0.0 when nothing was inspected.
    pub percentual_erro: f64,
}

/// Everything the inspection page renders for the current filter state.
/// Optional sections carry `None` when their slice of the data is empty,
/// which the page renders as an informational notice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PainelFiscalizacao {
    pub resumo: ResumoFiscalizacao,
    pub status_contagens: Vec<CategoriaContagem>,
    pub tipos_erro: Option<Vec<CategoriaContagem>>,
    pub plano_acao: Option<Vec<CategoriaContagem>>,
    pub ranking_improcedentes: Option<Vec<CategoriaContagem>>,
    pub periodo: Option<(NaiveDate, NaiveDate)>,
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Builds the inspection view from an already-filtered, prepared table.
/// Returns `Ok(None)` when no row survived the filters ("no data" notice).
pub fn build_fiscalizacao(filtrado: &Table) -> Result<Option<PainelFiscalizacao>, AppError> {
    if filtrado.is_empty() {
        return Ok(None);
    }

    let idx_erro = filtrado
        .column_index(COLUNA_ERRO)
        .ok_or_else(|| AppError::MissingColumns(vec![COLUNA_ERRO.to_string()]))?;
    let com_erros = filtrado.retain_rows(|row| !row[idx_erro].is_blank());

    let total_fiscalizado = count_total(filtrado);
    let total_erros = count_total(&com_erros);
    let resumo = ResumoFiscalizacao {
        total_fiscalizado,
        total_erros,
        percentual_erro: pct(total_erros, total_fiscalizado),
    };

    let status_contagens = contagem_ordenada(&value_counts(filtrado, COLUNA_STATUS)?);

    let tipos_erro = if com_erros.is_empty() {
        None
    } else {
        Some(contagem_ordenada(&value_counts(&com_erros, COLUNA_ERRO)?))
    };

    let idx_plano = filtrado
        .column_index(COLUNA_PLANO_ACAO)
        .ok_or_else(|| AppError::MissingColumns(vec![COLUNA_PLANO_ACAO.to_string()]))?;
    let com_plano = filtrado.retain_rows(|row| {
        let plano = row[idx_plano].display_text();
        plano == PLANO_PENDENTE || plano == PLANO_REALIZADO
    });
    let plano_acao = if com_plano.is_empty() {
        None
    } else {
        Some(contagem_ordenada(&value_counts(
            &com_plano,
            COLUNA_PLANO_ACAO,
        )?))
    };

    let idx_status = filtrado
        .column_index(COLUNA_STATUS)
        .ok_or_else(|| AppError::MissingColumns(vec![COLUNA_STATUS.to_string()]))?;
    let improcedentes =
        filtrado.retain_rows(|row| row[idx_status].display_text() == STATUS_IMPROCEDENTE);
    let ranking_improcedentes = if improcedentes.is_empty() {
        None
    } else {
        Some(contagem_ordenada(&value_counts(
            &improcedentes,
            COLUNA_AGENTE,
        )?))
    };

    Ok(Some(PainelFiscalizacao {
        resumo,
        status_contagens,
        tipos_erro,
        plano_acao,
        ranking_improcedentes,
        periodo: intervalo_datas(filtrado),
    }))
}
