use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use crate::error::AppError;
use crate::pipeline::dates::parse_dayfirst_date;
use crate::pipeline::table::{CellValue, Table};

/// Spellings the UI dropdowns use for "no restriction". Kept only in the
/// compatibility constructors; everywhere else the explicit `All` variant is
/// the canonical form, so a real data value equal to the sentinel text can
/// never be swallowed by accident.
const SENTINEL_ALL: &[&str] = &["TODOS", "Todos"];

/// One restriction over a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    /// No restriction.
    All,
    /// Cell must equal this value exactly (post-normalization).
    One(String),
    /// Cell must be one of these values. An empty set matches nothing,
    /// which is what a cleared multiselect means.
    Many(BTreeSet<String>),
    /// Cell date must fall within `[start, end]`, inclusive on both ends.
    /// Cells without a parseable date never match.
    DateRange { start: NaiveDate, end: NaiveDate },
}

impl FilterValue {
    /// Interprets a single-choice dropdown value, mapping the legacy
    /// "TODOS"/"Todos" sentinel to `All`.
    pub fn from_select(choice: &str) -> FilterValue {
        if SENTINEL_ALL.contains(&choice) {
            FilterValue::All
        } else {
            FilterValue::One(choice.to_string())
        }
    }

    /// Interprets an optional single-choice dropdown (absent = `All`).
    pub fn from_opt_select(choice: Option<&str>) -> FilterValue {
        match choice {
            Some(c) => FilterValue::from_select(c),
            None => FilterValue::All,
        }
    }

    /// Interprets a multiselect: the sentinel anywhere in the list means no
    /// restriction, otherwise the chosen set applies.
    pub fn from_multiselect(choices: &[String]) -> FilterValue {
        if choices.iter().any(|c| SENTINEL_ALL.contains(&c.as_str())) {
            FilterValue::All
        } else {
            FilterValue::Many(choices.iter().cloned().collect())
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterValue::All)
    }

    /// Does a cell satisfy this restriction?
    pub fn matches(&self, cell: &CellValue) -> bool {
        match self {
            FilterValue::All => true,
            FilterValue::One(v) => cell.display_text() == *v,
            FilterValue::Many(set) => set.contains(&cell.display_text()),
            FilterValue::DateRange { start, end } => {
                let date = match cell {
                    CellValue::Date(d) => Some(*d),
                    CellValue::Text(s) => parse_dayfirst_date(s),
                    _ => None,
                };
                match date {
                    Some(d) => *start <= d && d <= *end,
                    None => false,
                }
            }
        }
    }
}

/// A set of restrictions, one per column, combined with AND.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    filters: BTreeMap<String, FilterValue>,
}

impl Selection {
    pub fn new() -> Selection {
        Selection::default()
    }

    pub fn with(mut self, column: &str, value: FilterValue) -> Selection {
        self.set(column, value);
        self
    }

    pub fn set(&mut self, column: &str, value: FilterValue) {
        self.filters.insert(column.to_string(), value);
    }

    /// Restrictions that actually restrict something (`All` entries skipped).
    pub fn active(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.filters
            .iter()
            .filter(|(_, v)| !v.is_all())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_unrestricted(&self) -> bool {
        self.active().next().is_none()
    }
}

/// Applies every active restriction of `selection` to `table`.
///
/// A row survives only if it satisfies all of them. The empty result is a
/// legitimate outcome, not an error; a restriction over a column the table
/// does not have is the recoverable `MissingColumns` condition.
pub fn apply_filters(table: &Table, selection: &Selection) -> Result<Table, AppError> {
    let mut active: Vec<(usize, &FilterValue)> = Vec::new();
    let mut missing: Vec<String> = Vec::new();
    for (column, value) in selection.active() {
        match table.column_index(column) {
            Some(i) => active.push((i, value)),
            None => missing.push(column.to_string()),
        }
    }
    if !missing.is_empty() {
        return Err(AppError::MissingColumns(missing));
    }
    if active.is_empty() {
        return Ok(table.clone());
    }
    Ok(table.retain_rows(|row| active.iter().all(|(i, v)| v.matches(&row[*i]))))
}
