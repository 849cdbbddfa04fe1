use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::parse_month;
use crate::cli::transactions::transactions_table;
use crate::db::open_ledger;
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::reports;
use crate::settings::get_data_dir;

pub fn monthly(month: &str) -> Result<()> {
    let (year, month) = parse_month(month)?;
    let conn = open_ledger(&get_data_dir())?;
    let report = reports::monthly(&conn, year, month)?;

    println!("{}", format!("Report for {:02}/{}", report.month, report.year).bold());
    if report.transactions.is_empty() {
        let years = reports::available_years(&conn)?;
        if years.is_empty() {
            println!("No transactions found.");
        } else {
            let years: Vec<String> = years.iter().map(|y| y.to_string()).collect();
            println!("No transactions in this month. Years with data: {}", years.join(", "));
        }
        return Ok(());
    }

    println!("{}", transactions_table(&report.transactions));

    let mut totals = Table::new();
    totals.set_header(vec!["", "Amount"]);
    totals.add_row(vec![Cell::new("Income".green().bold()), Cell::new(money(report.total_income))]);
    totals.add_row(vec![Cell::new("Expenses".red().bold()), Cell::new(money(report.total_expenses))]);
    totals.add_row(vec![Cell::new("Net".bold()), Cell::new(money(report.net))]);
    println!("{totals}");

    if !report.expenses_by_category.is_empty() {
        let mut breakdown = Table::new();
        breakdown.set_header(vec!["Category", "Spent", "Share"]);
        for item in &report.expenses_by_category {
            breakdown.add_row(vec![
                Cell::new(&item.name),
                Cell::new(money(item.total)),
                Cell::new(percent(item.share)),
            ]);
        }
        println!("Expenses by category\n{breakdown}");
    }
    Ok(())
}
