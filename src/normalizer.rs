//! Statement normalization: turns the first worksheet of a decrypted bank
//! statement into [`NormalizedTransaction`] values.
//!
//! This stage is pure. Category resolution and persistence live in
//! [`crate::importer`].

use std::io::Cursor;
use std::sync::OnceLock;

use calamine::{open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader, Rows};
use chrono::{Days, NaiveDate};
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{CasaError, Result};
use crate::models::{NormalizedTransaction, TransactionType, UNCATEGORIZED};

/// Absolute sheet row holding the column headers; row 0 is a banner.
const HEADER_ROW: u32 = 1;

const AMOUNT_LABEL: &str = "Valor";
const CURRENCY_MARKER: &str = "(em R$)";
const DATE_COLUMN: &str = "Data de compra";
const CATEGORY_COLUMN: &str = "Categoria";
const DESCRIPTION_COLUMN: &str = "Descrição";

/// Largest serial Excel can represent (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

// ---------------------------------------------------------------------------
// Table loading
// ---------------------------------------------------------------------------

/// Open plaintext workbook bytes (xls or xlsx) and return the first sheet.
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| CasaError::TableParse(e.to_string()))?;
    workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CasaError::TableParse("workbook has no worksheets".to_string()))?
        .map_err(|e| CasaError::TableParse(e.to_string()))
}

// ---------------------------------------------------------------------------
// Headers
// ---------------------------------------------------------------------------

fn line_break() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*[\r\n]+\s*").expect("static regex"))
}

/// Trim a header and fold line breaks into single spaces, so a header that
/// wraps over two display lines ("Valor\n(em R$)") matches its one-line form.
pub fn normalize_header(raw: &str) -> String {
    line_break().replace_all(raw.trim(), " ").into_owned()
}

/// Index of the first header naming the amount in reais.
pub fn locate_amount_column(headers: &[String]) -> Result<usize> {
    let mut matches = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| h.contains(AMOUNT_LABEL) && h.contains(CURRENCY_MARKER))
        .map(|(i, _)| i);
    let first = matches
        .next()
        .ok_or_else(|| CasaError::Schema("expected amount column not found".to_string()))?;
    let others: Vec<&str> = matches.map(|i| headers[i].as_str()).collect();
    if !others.is_empty() {
        warn!(
            chosen = %headers[first],
            ignored = ?others,
            "several amount columns found; using the first"
        );
    }
    Ok(first)
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers.iter().position(|h| h == name)
}

// ---------------------------------------------------------------------------
// Cell cleaning
// ---------------------------------------------------------------------------

/// Parse an amount cell, falling back to zero for anything that is not a
/// number. Statement exports end with blank or summary rows, so a bad cell
/// is not an error. The sign is discarded.
pub fn lenient_parse(cell: &Data) -> f64 {
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::String(s) => lenient_parse_text(s),
        _ => 0.0,
    };
    if value.is_finite() {
        value.abs()
    } else {
        0.0
    }
}

fn thousands_only() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d{1,3}\.\d{3}$").expect("static regex"))
}

/// Text form of [`lenient_parse`]. Accepts both `R$ 1.234,56` and
/// `R$1234.56`: when both separators occur the last one is decimal, a lone
/// separator is decimal unless it repeats. With a currency marker, a single
/// `.` grouping exactly three digits (`R$ 1.234`) is read as thousands.
pub fn lenient_parse_text(raw: &str) -> f64 {
    let has_marker = raw.contains("R$");
    let s: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '$' | '(' | ')'))
        .collect();

    let plain = match (s.rfind(','), s.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => s.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => s.replace(',', ""),
        (Some(_), None) if s.matches(',').count() == 1 => s.replace(',', "."),
        (Some(_), None) => s.replace(',', ""),
        (None, Some(_)) if s.matches('.').count() > 1 => s.replace('.', ""),
        (None, Some(_)) if has_marker && thousands_only().is_match(&s) => s.replace('.', ""),
        _ => s,
    };

    plain
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(f64::abs)
        .unwrap_or(0.0)
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_days(Days::new(serial.trunc() as u64))
}

/// Date part of a typed date cell. calamine applies the workbook's 1904
/// offset; the range check keeps its millisecond conversion in bounds.
fn excel_datetime_to_date(dt: &ExcelDateTime) -> Option<NaiveDate> {
    let serial = dt.as_f64();
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    dt.as_datetime().map(|d| d.date())
}

/// Day-first date text: `dd/mm/yyyy`, `dd-mm-yyyy`, `dd.mm.yyyy`, `dd/mm/yy`,
/// or ISO `yyyy-mm-dd`. A trailing time part is ignored.
pub fn parse_day_first_text(raw: &str) -> Option<NaiveDate> {
    let token = raw.split_whitespace().next()?;
    let token = token.split('T').next()?;
    let parts: Vec<&str> = token.split(['/', '-', '.']).collect();
    if parts.len() != 3 {
        return None;
    }
    let (y, m, d) = if parts[0].len() == 4 {
        (parts[0], parts[1], parts[2])
    } else {
        (parts[2], parts[1], parts[0])
    };
    let mut year: i32 = y.parse().ok()?;
    match y.len() {
        2 => year += 2000,
        4 => {}
        _ => return None,
    }
    NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
}

pub fn parse_day_first(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(dt) if !dt.is_duration() => excel_datetime_to_date(dt),
        Data::Float(f) => excel_serial_to_date(*f),
        Data::Int(i) => excel_serial_to_date(*i as f64),
        Data::String(s) | Data::DateTimeIso(s) => parse_day_first_text(s),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty | Data::Error(_) => String::new(),
        other => other.to_string(),
    }
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Row normalization
// ---------------------------------------------------------------------------

/// Column positions resolved from the header row.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLayout {
    pub amount: usize,
    pub date: usize,
    pub category: Option<usize>,
    pub description: Option<usize>,
}

impl StatementLayout {
    pub fn from_headers(headers: &[String]) -> Result<Self> {
        let amount = locate_amount_column(headers)?;
        let date = find_column(headers, DATE_COLUMN).ok_or_else(|| {
            CasaError::Schema(format!("expected date column '{DATE_COLUMN}' not found"))
        })?;
        Ok(Self {
            amount,
            date,
            category: find_column(headers, CATEGORY_COLUMN),
            description: find_column(headers, DESCRIPTION_COLUMN),
        })
    }

    pub fn normalize_row(&self, row: &[Data]) -> NormalizedTransaction {
        let amount = row.get(self.amount).map(lenient_parse).unwrap_or(0.0);
        let date = row.get(self.date).and_then(parse_day_first);
        let category_name = self
            .category
            .and_then(|i| row.get(i))
            .map(cell_text)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        let description = self
            .description
            .and_then(|i| row.get(i))
            .map(cell_text)
            .unwrap_or_default();

        NormalizedTransaction {
            kind: TransactionType::from_amount(amount),
            amount,
            description,
            date,
            category_name,
        }
    }
}

/// Lazy sequence of normalized rows over a borrowed sheet.
pub struct StatementRows<'a> {
    rows: Rows<'a, Data>,
    layout: StatementLayout,
}

impl StatementRows<'_> {
    pub fn layout(&self) -> &StatementLayout {
        &self.layout
    }
}

impl Iterator for StatementRows<'_> {
    type Item = NormalizedTransaction;

    fn next(&mut self) -> Option<Self::Item> {
        for row in self.rows.by_ref() {
            if row.iter().all(is_blank) {
                continue;
            }
            return Some(self.layout.normalize_row(row));
        }
        None
    }
}

/// Validate the sheet layout and return its rows as a lazy sequence.
///
/// Layout problems surface here, before a single row is produced.
pub fn normalize_statement(range: &Range<Data>) -> Result<StatementRows<'_>> {
    let start_row = range.start().map(|(r, _)| r).unwrap_or(0);
    let mut rows = range.rows();
    for _ in 0..HEADER_ROW.saturating_sub(start_row) {
        rows.next();
    }
    let header = rows
        .next()
        .ok_or_else(|| CasaError::TableParse("sheet has no header row".to_string()))?;
    let headers: Vec<String> = header
        .iter()
        .map(|cell| normalize_header(&cell.to_string()))
        .collect();
    let layout = StatementLayout::from_headers(&headers)?;
    debug!(?headers, ?layout, "statement layout resolved");
    Ok(StatementRows { rows, layout })
}
