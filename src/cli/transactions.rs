use comfy_table::{Cell, Table};

use crate::cli::parse_month;
use crate::db::open_ledger;
use crate::error::Result;
use crate::fmt::money;
use crate::models::TransactionRow;
use crate::settings::get_data_dir;
use crate::store::list_transactions;

pub fn list(month: Option<String>) -> Result<()> {
    let month = month.as_deref().map(parse_month).transpose()?;
    let conn = open_ledger(&get_data_dir())?;
    let rows = list_transactions(&conn, month)?;
    if rows.is_empty() {
        println!("No transactions found.");
        return Ok(());
    }
    println!("{}", transactions_table(&rows));
    Ok(())
}

pub(crate) fn transactions_table(rows: &[TransactionRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Type", "Amount", "Category", "Description", "Owner"]);
    for row in rows {
        table.add_row(vec![
            Cell::new(row.id),
            Cell::new(row.date.as_deref().unwrap_or("-")),
            Cell::new(row.kind),
            Cell::new(money(row.amount)),
            Cell::new(row.category.as_deref().unwrap_or("")),
            Cell::new(&row.description),
            Cell::new(row.owner.as_deref().unwrap_or("")),
        ]);
    }
    table
}
