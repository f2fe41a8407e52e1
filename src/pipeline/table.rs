use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppError;

/// One cell of a loaded spreadsheet.
///
/// Spreadsheet sources are weakly typed: the same column can carry text in
/// one export and numbers or dates in another. Comparisons in the pipeline
/// always go through [`CellValue::display_text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl CellValue {
    /// Text coercion used for grouping, filtering and display.
    ///
    /// Integral numbers render without the trailing `.0` ("12", not "12.0"),
    /// dates render day-first as the pages show them.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::Date(d) => d.format("%d/%m/%Y").to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// True for `Empty` cells and for blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// An in-memory table: ordered rows over a shared header set.
///
/// Insertion order is source order; nothing here sorts rows. Header names
/// are trimmed and de-duplicated on construction, so `column_index` lookups
/// match what the UI shows in the dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    headers: Vec<String>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Builds an empty table from raw header names.
    ///
    /// Headers are trimmed; duplicated names get a numeric suffix
    /// (`col`, `col_1`, `col_2`, ...) so every column stays addressable.
    pub fn new(raw_headers: Vec<String>) -> Table {
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut headers = Vec::with_capacity(raw_headers.len());
        for raw in raw_headers {
            let name = raw.trim().to_string();
            match seen.get_mut(&name) {
                Some(count) => {
                    *count += 1;
                    headers.push(format!("{}_{}", name, count));
                }
                None => {
                    seen.insert(name.clone(), 0);
                    headers.push(name);
                }
            }
        }
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Table {
            headers,
            index,
            rows: Vec::new(),
        }
    }

    /// Builds a table from already-clean headers and rows. Used by pipeline
    /// stages that derive a new table from an existing one.
    pub(crate) fn from_clean_parts(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Table {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), i))
            .collect();
        Table {
            headers,
            index,
            rows,
        }
    }

    /// Appends a row, padding or truncating it to the header width so that
    /// ragged source rows (flexible CSV) stay addressable by column.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.headers.len(), CellValue::Empty);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.index.contains_key(column)
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellValue]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    /// Cell at (row, column name). `None` when either does not exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// All cells of a named column, in row order.
    pub fn column_values<'a>(
        &'a self,
        column: &str,
    ) -> Option<impl Iterator<Item = &'a CellValue>> {
        let col = self.column_index(column)?;
        Some(self.rows.iter().map(move |r| &r[col]))
    }

    /// Verifies that every listed column is present.
    ///
    /// All missing columns are reported at once so the user fixes the sheet
    /// in one round trip instead of one error per reload.
    pub fn require_columns(&self, columns: &[&str]) -> Result<(), AppError> {
        let missing: Vec<String> = columns
            .iter()
            .filter(|c| !self.has_column(c))
            .map(|c| c.to_string())
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::MissingColumns(missing))
        }
    }

    /// Sorted, de-duplicated non-blank values of a column. This is the option
    /// list a filter dropdown shows, so it must use the same text form the
    /// filters compare against.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let Some(values) = self.column_values(column) else {
            return Vec::new();
        };
        let set: BTreeSet<String> = values
            .filter(|c| !c.is_blank())
            .map(|c| c.display_text())
            .collect();
        set.into_iter().collect()
    }

    /// New table with the rows that satisfy `keep`, headers shared.
    pub fn retain_rows<F>(&self, keep: F) -> Table
    where
        F: Fn(&[CellValue]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|r| keep(r.as_slice()))
            .cloned()
            .collect();
        Table::from_clean_parts(self.headers.clone(), rows)
    }

    /// New table with one extra column appended. `values` must have one entry
    /// per row; shorter input is padded with `Empty`.
    pub fn with_column(&self, name: &str, mut values: Vec<CellValue>) -> Table {
        values.resize(self.rows.len(), CellValue::Empty);
        let mut headers = self.headers.clone();
        headers.push(name.trim().to_string());
        let rows = self
            .rows
            .iter()
            .zip(values)
            .map(|(r, v)| {
                let mut row = r.clone();
                row.push(v);
                row
            })
            .collect();
        Table::from_clean_parts(headers, rows)
    }

    /// New table with a named column rewritten cell by cell. Returns a plain
    /// clone when the column does not exist.
    pub fn map_column<F>(&self, column: &str, f: F) -> Table
    where
        F: Fn(&CellValue) -> CellValue,
    {
        let Some(col) = self.column_index(column) else {
            return self.clone();
        };
        let rows = self
            .rows
            .iter()
            .map(|r| {
                let mut row = r.clone();
                row[col] = f(&row[col]);
                row
            })
            .collect();
        Table::from_clean_parts(self.headers.clone(), rows)
    }
}
