use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{Cell, Table};
use zeroize::Zeroize;

use crate::cli::open_session;
use crate::db::open_ledger;
use crate::error::{CasaError, Result};
use crate::fmt::money;
use crate::importer::{import_statement, preview, ImportSummary};
use crate::models::NormalizedTransaction;
use crate::settings::load_settings;

pub fn run(file: &str, password: Option<String>, user: Option<&str>, dry_run: bool) -> Result<()> {
    let file_path = PathBuf::from(file);
    let mut password = match password {
        Some(p) => p,
        None => rpassword::prompt_password("Statement password: ")
            .map_err(|e| CasaError::Other(format!("Could not read password: {e}")))?,
    };

    let result = if dry_run {
        preview(&file_path, &password).map(|rows| print_preview(&rows))
    } else {
        run_import(&file_path, &password, user)
    };
    password.zeroize();
    result
}

fn run_import(file_path: &Path, password: &str, user: Option<&str>) -> Result<()> {
    let settings = load_settings();
    let mut session = open_session(&settings, user)?;
    let mut conn = open_ledger(&PathBuf::from(&settings.data_dir))?;

    let summary = import_statement(&mut conn, &session, file_path, password);
    session.logout();
    let summary = summary?;
    if summary.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }
    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &ImportSummary) {
    println!(
        "{} imported ({} expenses, {} income)",
        summary.imported.to_string().green().bold(),
        summary.expense,
        summary.income
    );
    println!("Total spent: {}", money(summary.expense_total));
    if let (Some(first), Some(last)) = (summary.first_date, summary.last_date) {
        println!("Period: {first} to {last}");
    }
    if summary.undated > 0 {
        println!(
            "{}",
            format!("{} rows had an unreadable purchase date and were stored undated", summary.undated)
                .yellow()
        );
    }
}

fn print_preview(rows: &[NormalizedTransaction]) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Type", "Amount", "Category", "Description"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.iso_date().unwrap_or_else(|| "-".to_string())),
            Cell::new(row.kind),
            Cell::new(money(row.amount)),
            Cell::new(&row.category_name),
            Cell::new(&row.description),
        ]);
    }
    println!("{table}");
    println!("{} rows (dry run, nothing written)", rows.len());
}
