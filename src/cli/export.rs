use std::path::{Path, PathBuf};

use crate::cli::parse_month;
use crate::db::open_ledger;
use crate::error::Result;
use crate::reports::{self, MonthlyReport};
use crate::settings::get_data_dir;

const HEADER: [&str; 6] = ["Date", "Type", "Amount", "Category", "Description", "Owner"];

fn default_path(name: &str) -> PathBuf {
    get_data_dir().join("exports").join(format!("{name}.csv"))
}

fn write_csv(bytes: &[u8], path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    let display = format!("{}", path.display());
    println!("Wrote {display}");
    Ok(display)
}

/// One line per transaction of the month. Amounts are plain decimals so the
/// file opens as numbers in any spreadsheet.
pub fn render_monthly(report: &MonthlyReport) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADER)?;
    for txn in &report.transactions {
        let amount = format!("{:.2}", txn.amount);
        wtr.write_record([
            txn.date.as_deref().unwrap_or(""),
            txn.kind.as_str(),
            amount.as_str(),
            txn.category.as_deref().unwrap_or(""),
            txn.description.as_str(),
            txn.owner.as_deref().unwrap_or(""),
        ])?;
    }
    Ok(wtr.into_inner().map_err(|e| e.into_error())?)
}

/// Export one month of transactions as CSV. Returns the written path.
pub fn monthly(month: &str, output: Option<String>) -> Result<String> {
    let (year, month) = parse_month(month)?;
    let conn = open_ledger(&get_data_dir())?;
    let report = reports::monthly(&conn, year, month)?;
    let bytes = render_monthly(&report)?;
    let path = output
        .map(PathBuf::from)
        .unwrap_or_else(|| default_path(&format!("monthly-{year:04}-{month:02}")));
    write_csv(&bytes, &path)
}
