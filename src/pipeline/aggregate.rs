use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::AppError;
use crate::pipeline::table::Table;

// ─── Scalar helpers ──────────────────────────────────────────────────────────

/// Row count of a table.
pub fn count_total(table: &Table) -> usize {
    table.len()
}

/// Rows whose `column` equals `category` exactly (post-normalization).
pub fn count_by_category(
    table: &Table,
    column: &str,
    category: &str,
) -> Result<usize, AppError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| AppError::MissingColumns(vec![column.to_string()]))?;
    Ok(values.filter(|c| c.display_text() == category).count())
}

/// `numerator / denominator` in [0, 1]; 0.0 when the denominator is 0.
pub fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Percentage with the display rounding the cards use (two decimals),
/// zero-guarded like [`ratio`].
pub fn pct(count: usize, total: usize) -> f64 {
    round2(ratio(count, total) * 100.0)
}

// ─── Grouped tallies ─────────────────────────────────────────────────────────

/// Two-key tally: group value → outcome value → count.
///
/// Every group observed in the table appears as a key, and every outcome
/// category observed anywhere in the table appears under every group
/// (zero-filled), so chart series stay consistent across groups.
pub fn group_counts(
    table: &Table,
    group_column: &str,
    outcome_column: &str,
) -> Result<BTreeMap<String, BTreeMap<String, usize>>, AppError> {
    table.require_columns(&[group_column, outcome_column])?;
    let group_idx = table.column_index(group_column).unwrap();
    let outcome_idx = table.column_index(outcome_column).unwrap();

    let mut outcomes: BTreeSet<String> = BTreeSet::new();
    let mut tally: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();
    for row in table.rows() {
        let group = row[group_idx].display_text();
        let outcome = row[outcome_idx].display_text();
        outcomes.insert(outcome.clone());
        *tally.entry(group).or_default().entry(outcome).or_insert(0) += 1;
    }

    for counts in tally.values_mut() {
        for outcome in &outcomes {
            counts.entry(outcome.clone()).or_insert(0);
        }
    }
    Ok(tally)
}

/// Simple one-column tally (the `value_counts` of the charts).
pub fn value_counts(table: &Table, column: &str) -> Result<BTreeMap<String, usize>, AppError> {
    let values = table
        .column_values(column)
        .ok_or_else(|| AppError::MissingColumns(vec![column.to_string()]))?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v.display_text()).or_insert(0) += 1;
    }
    Ok(counts)
}

/// Orders a tally by count descending, ties broken by key ascending.
/// Deterministic, so "top N" charts render the same for the same data.
pub fn rank_descending(counts: &BTreeMap<String, usize>) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> =
        counts.iter().map(|(k, v)| (k.clone(), *v)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

// ─── Pivot summaries ─────────────────────────────────────────────────────────

/// One row of a pivot summary: composite key, per-outcome counts, row total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotRow {
    pub chave: Vec<String>,
    pub contagens: BTreeMap<String, usize>,
    pub total: usize,
}

/// Pivot of counts by composite row key and outcome category, plus the
/// grand-total row the summary tables display underneath.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotTable {
    /// Outcome categories in display order: the expected ones first, then
    /// any extra category the data happened to contain.
    pub colunas: Vec<String>,
    /// Rows ordered by key ascending.
    pub linhas: Vec<PivotRow>,
    /// Column sums across all rows.
    pub totais: BTreeMap<String, usize>,
    pub total_geral: usize,
}

/// Generalization of [`group_counts`] to composite row keys.
///
/// `expected_outcomes` are force-filled with 0 even when absent from the
/// data, so totals and side-by-side comparisons stay stable across renders.
pub fn pivot_counts(
    table: &Table,
    row_columns: &[&str],
    outcome_column: &str,
    expected_outcomes: &[&str],
) -> Result<PivotTable, AppError> {
    let mut all_columns: Vec<&str> = row_columns.to_vec();
    all_columns.push(outcome_column);
    table.require_columns(&all_columns)?;

    let key_idx: Vec<usize> = row_columns
        .iter()
        .map(|c| table.column_index(c).unwrap())
        .collect();
    let outcome_idx = table.column_index(outcome_column).unwrap();

    let mut observed: BTreeSet<String> = BTreeSet::new();
    let mut tally: BTreeMap<Vec<String>, BTreeMap<String, usize>> = BTreeMap::new();
    for row in table.rows() {
        let key: Vec<String> = key_idx.iter().map(|&i| row[i].display_text()).collect();
        let outcome = row[outcome_idx].display_text();
        observed.insert(outcome.clone());
        *tally.entry(key).or_default().entry(outcome).or_insert(0) += 1;
    }

    let mut colunas: Vec<String> = expected_outcomes.iter().map(|s| s.to_string()).collect();
    for extra in &observed {
        if !colunas.contains(extra) {
            colunas.push(extra.clone());
        }
    }

    let mut totais: BTreeMap<String, usize> =
        colunas.iter().map(|c| (c.clone(), 0)).collect();
    let mut total_geral = 0usize;
    let linhas = tally
        .into_iter()
        .map(|(chave, counts)| {
            let contagens: BTreeMap<String, usize> = colunas
                .iter()
                .map(|c| (c.clone(), counts.get(c).copied().unwrap_or(0)))
                .collect();
            let total: usize = contagens.values().sum();
            for (c, n) in &contagens {
                *totais.get_mut(c).unwrap() += n;
            }
            total_geral += total;
            PivotRow {
                chave,
                contagens,
                total,
            }
        })
        .collect();

    Ok(PivotTable {
        colunas,
        linhas,
        totais,
        total_geral,
    })
}
