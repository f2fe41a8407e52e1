use std::collections::BTreeMap;

use serde::Serialize;

use crate::dashboard::config::ProducaoConfig;
use crate::dashboard::{contagem_ordenada, CategoriaContagem};
use crate::error::AppError;
use crate::pipeline::aggregate::{
    count_by_category, count_total, group_counts, pct, pivot_counts, value_counts, PivotTable,
};
use crate::pipeline::filter::{apply_filters, FilterValue, Selection};
use crate::pipeline::table::Table;

// ─── View structs ────────────────────────────────────────────────────────────

/// The three KPI cards at the top of the production pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicadoresProducao {
    pub total_atividades: usize,
    pub total_produtivo: usize,
    pub total_improdutivo: usize,
    /// Percentage, two decimals, 0.0 when there are no activities.
    pub taxa_produtividade: f64,
}

/// One team's outcome counts (grouped-bar chart source). Outcome categories
/// are zero-filled, so every team carries the same series.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SerieEquipe {
    pub equipe: String,
    pub contagens: BTreeMap<String, usize>,
}

/// Everything a production page renders below the upload box.
///
/// Sections are `Option`: a missing optional column or an empty filter
/// result disables only that chart/table, with the reason in `avisos`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PainelProducao {
    pub indicadores: IndicadoresProducao,
    pub produtividade_equipe: Option<Vec<SerieEquipe>>,
    pub produtividade_setor: Option<Vec<CategoriaContagem>>,
    pub resumo_equipe: Option<PivotTable>,
    pub resumo_servico: Option<PivotTable>,
    pub avisos: Vec<String>,
}

const AVISO_SEM_DADOS: &str = "Nenhum dado para exibir com os filtros atuais.";

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Builds the production view from an already-filtered table.
///
/// `detalhe_equipe` / `detalhe_setor` are the per-chart drill-down selects;
/// pass `FilterValue::All` to chart the whole filtered table.
pub fn build_producao(
    filtrado: &Table,
    config: &ProducaoConfig,
    detalhe_equipe: &FilterValue,
    detalhe_setor: &FilterValue,
) -> Result<PainelProducao, AppError> {
    filtrado.require_columns(&[&config.coluna_resultado])?;

    let total_atividades = count_total(filtrado);
    let total_produtivo =
        count_by_category(filtrado, &config.coluna_resultado, &config.resultado_positivo)?;
    let total_improdutivo =
        count_by_category(filtrado, &config.coluna_resultado, &config.resultado_negativo)?;
    let indicadores = IndicadoresProducao {
        total_atividades,
        total_produtivo,
        total_improdutivo,
        taxa_produtividade: pct(total_produtivo, total_atividades),
    };

    let mut avisos: Vec<String> = Vec::new();
    if filtrado.is_empty() {
        avisos.push(AVISO_SEM_DADOS.to_string());
        return Ok(PainelProducao {
            indicadores,
            produtividade_equipe: None,
            produtividade_setor: None,
            resumo_equipe: None,
            resumo_servico: None,
            avisos,
        });
    }

    let produtividade_equipe =
        secao_produtividade_equipe(filtrado, config, detalhe_equipe, &mut avisos)?;
    let produtividade_setor =
        secao_produtividade_setor(filtrado, config, detalhe_setor, &mut avisos)?;

    let mut colunas_resumo_equipe: Vec<&str> = vec![&config.coluna_equipe];
    if config.resumo_equipe_com_setor {
        colunas_resumo_equipe.push(&config.coluna_setor);
    }
    let resumo_equipe = secao_resumo(
        filtrado,
        &colunas_resumo_equipe,
        config,
        "resumo por equipe",
        &mut avisos,
    );
    let resumo_servico = secao_resumo(
        filtrado,
        &[&config.coluna_servico],
        config,
        "resumo por serviço",
        &mut avisos,
    );

    Ok(PainelProducao {
        indicadores,
        produtividade_equipe,
        produtividade_setor,
        resumo_equipe,
        resumo_servico,
        avisos,
    })
}

fn secao_produtividade_equipe(
    filtrado: &Table,
    config: &ProducaoConfig,
    detalhe: &FilterValue,
    avisos: &mut Vec<String>,
) -> Result<Option<Vec<SerieEquipe>>, AppError> {
    if !filtrado.has_column(&config.coluna_equipe) {
        avisos.push(aviso_coluna_ausente(
            &[&config.coluna_equipe],
            "gráfico de produtividade por equipe",
        ));
        return Ok(None);
    }
    let recorte = apply_filters(
        filtrado,
        &Selection::new().with(&config.coluna_equipe, detalhe.clone()),
    )?;
    let contagens = group_counts(&recorte, &config.coluna_equipe, &config.coluna_resultado)?;
    Ok(Some(
        contagens
            .into_iter()
            .map(|(equipe, contagens)| SerieEquipe { equipe, contagens })
            .collect(),
    ))
}

fn secao_produtividade_setor(
    filtrado: &Table,
    config: &ProducaoConfig,
    detalhe: &FilterValue,
    avisos: &mut Vec<String>,
) -> Result<Option<Vec<CategoriaContagem>>, AppError> {
    if !filtrado.has_column(&config.coluna_setor) {
        avisos.push(aviso_coluna_ausente(
            &[&config.coluna_setor],
            "gráfico de produtividade por setor",
        ));
        return Ok(None);
    }
    let recorte = apply_filters(
        filtrado,
        &Selection::new().with(&config.coluna_setor, detalhe.clone()),
    )?;
    let contagens = value_counts(&recorte, &config.coluna_resultado)?;
    Ok(Some(contagem_ordenada(&contagens)))
}

/// Pivot section that degrades to a warning when its columns are absent.
fn secao_resumo(
    filtrado: &Table,
    colunas: &[&str],
    config: &ProducaoConfig,
    rotulo: &str,
    avisos: &mut Vec<String>,
) -> Option<PivotTable> {
    match pivot_counts(
        filtrado,
        colunas,
        &config.coluna_resultado,
        &config.resultados_esperados(),
    ) {
        Ok(pivot) => Some(pivot),
        Err(AppError::MissingColumns(cols)) => {
            let refs: Vec<&str> = cols.iter().map(|c| c.as_str()).collect();
            avisos.push(aviso_coluna_ausente(&refs, rotulo));
            None
        }
        Err(_) => None,
    }
}

fn aviso_coluna_ausente(colunas: &[&str], secao: &str) -> String {
    format!(
        "Colunas ausentes ({}): {} indisponível.",
        colunas.join(", "),
        secao
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::table::CellValue;

    fn tabela(rows: &[(&str, &str, &str, &str)]) -> Table {
        let mut t = Table::new(vec![
            "Setor".into(),
            "Código Equipe".into(),
            "Resultado".into(),
            "Serviço".into(),
        ]);
        for (setor, equipe, resultado, servico) in rows {
            t.push_row(vec![
                CellValue::Text(setor.to_string()),
                CellValue::Text(equipe.to_string()),
                CellValue::Text(resultado.to_string()),
                CellValue::Text(servico.to_string()),
            ]);
        }
        t
    }

    fn base() -> Table {
        tabela(&[
            ("ZONA NORTE", "E1", "PRODUTIVO", "PODA"),
            ("ZONA NORTE", "E1", "IMPRODUTIVO", "PODA"),
            ("ZONA SUL", "E2", "PRODUTIVO", "CAPINA"),
            ("ZONA SUL", "E2", "PRODUTIVO", "CAPINA"),
        ])
    }

    #[test]
    fn test_indicadores() {
        let painel = build_producao(
            &base(),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        assert_eq!(painel.indicadores.total_atividades, 4);
        assert_eq!(painel.indicadores.total_produtivo, 3);
        assert_eq!(painel.indicadores.total_improdutivo, 1);
        assert_eq!(painel.indicadores.taxa_produtividade, 75.0);
        assert!(painel.avisos.is_empty());
    }

    #[test]
    fn test_tabela_vazia_zera_indicadores_e_avisa() {
        let painel = build_producao(
            &tabela(&[]),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        assert_eq!(painel.indicadores.total_atividades, 0);
        assert_eq!(painel.indicadores.taxa_produtividade, 0.0);
        assert!(painel.produtividade_equipe.is_none());
        assert!(painel.resumo_servico.is_none());
        assert_eq!(painel.avisos, vec![AVISO_SEM_DADOS.to_string()]);
    }

    #[test]
    fn test_produtividade_equipe_zero_preenchida() {
        let painel = build_producao(
            &base(),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        let series = painel.produtividade_equipe.unwrap();
        assert_eq!(series.len(), 2);
        let e2 = series.iter().find(|s| s.equipe == "E2").unwrap();
        assert_eq!(e2.contagens["PRODUTIVO"], 2);
        assert_eq!(e2.contagens["IMPRODUTIVO"], 0);
    }

    #[test]
    fn test_detalhe_equipe_restringe_grafico() {
        let painel = build_producao(
            &base(),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::from_select("E1"),
            &FilterValue::All,
        )
        .unwrap();
        let series = painel.produtividade_equipe.unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].equipe, "E1");
        // KPI cards keep the whole filtered table
        assert_eq!(painel.indicadores.total_atividades, 4);
    }

    #[test]
    fn test_detalhe_setor_restringe_pizza() {
        let painel = build_producao(
            &base(),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::from_select("ZONA SUL"),
        )
        .unwrap();
        let pizza = painel.produtividade_setor.unwrap();
        assert_eq!(pizza, vec![CategoriaContagem {
            categoria: "PRODUTIVO".into(),
            contagem: 2,
        }]);
    }

    #[test]
    fn test_coluna_servico_ausente_desativa_somente_resumo() {
        let mut t = Table::new(vec![
            "Setor".into(),
            "Código Equipe".into(),
            "Resultado".into(),
        ]);
        t.push_row(vec![
            CellValue::Text("ZONA NORTE".into()),
            CellValue::Text("E1".into()),
            CellValue::Text("PRODUTIVO".into()),
        ]);
        let painel = build_producao(
            &t,
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        assert!(painel.resumo_servico.is_none());
        assert!(painel.resumo_equipe.is_some());
        assert!(painel.produtividade_equipe.is_some());
        assert_eq!(painel.avisos.len(), 1);
        assert!(painel.avisos[0].contains("Serviço"));
    }

    #[test]
    fn test_coluna_resultado_ausente_e_erro_duro() {
        let t = Table::new(vec!["Setor".into()]);
        let err = build_producao(
            &t,
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MissingColumns(_)));
    }

    #[test]
    fn test_resumo_equipe_diaria_pivota_com_setor() {
        let mut t = tabela(&[
            ("ZONA NORTE", "x", "PRODUTIVO", "PODA"),
            ("ZONA SUL", "x", "PRODUTIVO", "PODA"),
        ]);
        // daily sheets name the team column differently
        t = {
            let mut nova = Table::new(vec![
                "Setor".into(),
                "Chefe/Responsável de Equipe".into(),
                "Resultado".into(),
                "Serviço".into(),
            ]);
            for row in t.rows() {
                nova.push_row(row.to_vec());
            }
            nova
        };
        let painel = build_producao(
            &t,
            &ProducaoConfig::producao_diaria(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        let resumo = painel.resumo_equipe.unwrap();
        assert_eq!(resumo.linhas.len(), 2);
        assert_eq!(resumo.linhas[0].chave.len(), 2);
    }

    #[test]
    fn test_resumo_servico_total_geral() {
        let painel = build_producao(
            &base(),
            &ProducaoConfig::producao_mensal(),
            &FilterValue::All,
            &FilterValue::All,
        )
        .unwrap();
        let resumo = painel.resumo_servico.unwrap();
        assert_eq!(resumo.totais["PRODUTIVO"], 3);
        assert_eq!(resumo.totais["IMPRODUTIVO"], 1);
        assert_eq!(resumo.total_geral, 4);
    }
}
