use std::io::Cursor;

use calamine::{Data, DataType, Reader, Xlsx};
use log::debug;

use crate::error::AppError;
use crate::pipeline::table::{CellValue, Table};

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => cell_value(other).display_text(),
    }
}

/// Maps a calamine cell onto the pipeline's cell model. Error cells count as
/// empty, the same way the pages treat unreadable values.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) => {
            if s.trim().is_empty() {
                CellValue::Empty
            } else {
                CellValue::Text(s.clone())
            }
        }
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string().to_uppercase()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Date(dt.date()))
            .unwrap_or(CellValue::Empty),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(_) => CellValue::Empty,
        Data::Empty => CellValue::Empty,
    }
}

/// Parses XLSX bytes into a [`Table`]: first worksheet, first row as the
/// header row. An empty workbook or worksheet is [`AppError::EmptyTable`].
pub fn parse_xlsx_bytes(bytes: &[u8]) -> Result<Table, AppError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(AppError::EmptyTable)?;
    let range = workbook.worksheet_range(&sheet)?;

    let mut rows = range.rows();
    let headers = rows.next().ok_or(AppError::EmptyTable)?;
    let mut table = Table::new(headers.iter().map(header_text).collect());

    let mut skipped_blank = 0usize;
    for row in rows {
        let cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        if cells.iter().all(|c| c.is_blank()) {
            skipped_blank += 1;
            continue;
        }
        table.push_row(cells);
    }
    debug!(
        "XLSX '{}': {} linhas, {} colunas, {} linhas em branco ignoradas",
        sheet,
        table.len(),
        table.headers().len(),
        skipped_blank
    );
    Ok(table)
}

/// Convenience wrapper for on-disk workbooks.
pub fn parse_xlsx_file(path: &str) -> Result<Table, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|_| AppError::SourceNotFound(path.to_string()))?;
    parse_xlsx_bytes(&bytes)
}
