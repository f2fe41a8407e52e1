use std::io::Read;

use log::debug;

use crate::error::AppError;
use crate::pipeline::table::{CellValue, Table};

/// Parses a `;`-delimited CSV export into a [`Table`].
///
/// Accepts any `Read` source, which keeps tests on in-memory strings. Ragged
/// rows are tolerated (`flexible`); blank cells load as `Empty` so they
/// behave like blank spreadsheet cells everywhere downstream.
pub fn parse_csv_reader<R: Read>(reader: R) -> Result<Table, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(AppError::EmptyTable);
    }
    let mut table = Table::new(headers.iter().map(|h| h.to_string()).collect());

    for record in rdr.records() {
        let record = record?;
        let cells: Vec<CellValue> = record
            .iter()
            .map(|field| {
                if field.trim().is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(field.to_string())
                }
            })
            .collect();
        if cells.iter().all(|c| c.is_blank()) {
            continue;
        }
        table.push_row(cells);
    }
    debug!(
        "CSV: {} linhas, {} colunas",
        table.len(),
        table.headers().len()
    );
    Ok(table)
}

/// Parses CSV bytes (an uploaded file already in memory).
pub fn parse_csv_bytes(bytes: &[u8]) -> Result<Table, AppError> {
    parse_csv_reader(bytes)
}

/// Convenience wrapper for on-disk exports.
pub fn parse_csv_file(path: &str) -> Result<Table, AppError> {
    let file = std::fs::File::open(path)
        .map_err(|_| AppError::SourceNotFound(path.to_string()))?;
    parse_csv_reader(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_csv() {
        let csv = "Setor;Resultado\nZONA NORTE;PRODUTIVO\nZONA SUL;IMPRODUTIVO\n";
        let t = parse_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.headers(), &["Setor", "Resultado"]);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_headers_are_trimmed() {
        let csv = " Setor ; Resultado \nZONA NORTE;PRODUTIVO\n";
        let t = parse_csv_reader(csv.as_bytes()).unwrap();
        assert!(t.has_column("Setor"));
        assert!(t.has_column("Resultado"));
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let csv = "A;B;C\n1;2\n1;2;3;4\n";
        let t = parse_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t.value(0, "C"), Some(&CellValue::Empty));
        assert_eq!(t.value(1, "C").unwrap().display_text(), "3");
    }

    #[test]
    fn test_blank_cells_load_as_empty() {
        let csv = "Erro;Status\n;PROCEDENTE\nPODA IRREGULAR;IMPROCEDENTE\n";
        let t = parse_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.value(0, "Erro"), Some(&CellValue::Empty));
        assert!(t.value(0, "Erro").unwrap().is_blank());
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let csv = "A;B\n1;2\n;\n3;4\n";
        let t = parse_csv_reader(csv.as_bytes()).unwrap();
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn test_empty_input_is_an_error() {
        assert!(parse_csv_reader("".as_bytes()).is_err());
    }
}
