use chrono::{NaiveDate, NaiveDateTime};

/// Day-first formats the spreadsheets actually contain, tried in order.
const DAYFIRST_DATETIME_FMTS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DAYFIRST_DATE_FMTS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%Y-%m-%d"];

/// Parse a day-first date string ("03/07/2025", "03-07-2025 14:30", ISO).
/// Returns None for empty or unparseable input; callers drop such rows from
/// date-bounded aggregates instead of failing the render.
pub fn parse_dayfirst_date(s: &str) -> Option<NaiveDate> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DAYFIRST_DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DAYFIRST_DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    None
}

/// Month key used by the inspection dashboard ("07/2025").
pub fn mes_ano(d: NaiveDate) -> String {
    d.format("%m/%Y").to_string()
}

/// Parses a "MM/YYYY" key back into (year, month) for chronological sorting.
pub fn parse_mes_ano(s: &str) -> Option<(i32, u32)> {
    let (mes, ano) = s.trim().split_once('/')?;
    let mes: u32 = mes.parse().ok()?;
    let ano: i32 = ano.parse().ok()?;
    if (1..=12).contains(&mes) {
        Some((ano, mes))
    } else {
        None
    }
}
