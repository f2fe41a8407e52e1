pub mod config;
pub mod fiscalizacao;
pub mod producao;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::pipeline::aggregate::rank_descending;

/// (category, count) pair feeding pie/bar chart sources and rankings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoriaContagem {
    pub categoria: String,
    pub contagem: usize,
}

/// Tally ordered for display: count descending, ties by category ascending.
pub(crate) fn contagem_ordenada(counts: &BTreeMap<String, usize>) -> Vec<CategoriaContagem> {
    rank_descending(counts)
        .into_iter()
        .map(|(categoria, contagem)| CategoriaContagem {
            categoria,
            contagem,
        })
        .collect()
}
