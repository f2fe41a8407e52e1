use crate::pipeline::table::{CellValue, Table};

/// Canonical text form used for every categorical comparison: trimmed,
/// internal whitespace collapsed to single spaces, upper-cased.
///
/// Filtering and display must both go through this form, otherwise a
/// dropdown selection silently stops matching the data it was built from.
pub fn normalize_text(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ").to_uppercase()
}

/// Returns a new table with the named columns normalized via
/// [`normalize_text`]. Non-text cells are coerced to their display text
/// first; columns absent from the table are skipped without error.
pub fn normalize_text_columns(table: &Table, columns: &[&str]) -> Table {
    let targets: Vec<usize> = columns
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();
    if targets.is_empty() {
        return table.clone();
    }
    let rows = table
        .rows()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| {
                    if targets.contains(&i) {
                        CellValue::Text(normalize_text(&cell.display_text()))
                    } else {
                        cell.clone()
                    }
                })
                .collect()
        })
        .collect();
    Table::from_clean_parts(table.headers().to_vec(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_with(setor: &[&str]) -> Table {
        let mut t = Table::new(vec!["Setor".into(), "Obs".into()]);
        for s in setor {
            t.push_row(vec![
                CellValue::Text(s.to_string()),
                CellValue::Text("  raw  ".into()),
            ]);
        }
        t
    }

    #[test]
    fn test_normalize_text_trims_collapses_uppercases() {
        assert_eq!(normalize_text("  zona   norte "), "ZONA NORTE");
        assert_eq!(normalize_text("Zona\tNorte"), "ZONA NORTE");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_text_idempotent() {
        let once = normalize_text("  serviço   de poda ");
        assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn test_normalize_columns_only_touches_targets() {
        let t = table_with(&["zona norte "]);
        let n = normalize_text_columns(&t, &["Setor"]);
        assert_eq!(n.value(0, "Setor"), Some(&CellValue::Text("ZONA NORTE".into())));
        // untouched column keeps its raw whitespace
        assert_eq!(n.value(0, "Obs"), Some(&CellValue::Text("  raw  ".into())));
    }

    #[test]
    fn test_normalize_columns_skips_absent() {
        let t = table_with(&["zona norte"]);
        let n = normalize_text_columns(&t, &["Setor", "Inexistente"]);
        assert_eq!(n.value(0, "Setor"), Some(&CellValue::Text("ZONA NORTE".into())));
        assert_eq!(n.len(), t.len());
    }

    #[test]
    fn test_normalize_columns_coerces_non_text() {
        let mut t = Table::new(vec!["Código Equipe".into()]);
        t.push_row(vec![CellValue::Number(12.0)]);
        t.push_row(vec![CellValue::Empty]);
        let n = normalize_text_columns(&t, &["Código Equipe"]);
        assert_eq!(n.value(0, "Código Equipe"), Some(&CellValue::Text("12".into())));
        assert_eq!(n.value(1, "Código Equipe"), Some(&CellValue::Text("".into())));
    }

    #[test]
    fn test_normalize_columns_applied_twice_equals_once() {
        let t = table_with(&["  zona   SUL "]);
        let once = normalize_text_columns(&t, &["Setor"]);
        let twice = normalize_text_columns(&once, &["Setor"]);
        let a: Vec<Vec<String>> = once.rows().map(|r| r.iter().map(|c| c.display_text()).collect()).collect();
        let b: Vec<Vec<String>> = twice.rows().map(|r| r.iter().map(|c| c.display_text()).collect()).collect();
        assert_eq!(a, b);
    }
}
