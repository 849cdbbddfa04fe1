use rusqlite::Connection;

use crate::error::Result;
use crate::models::{TransactionRow, TransactionType};
use crate::store::list_transactions;

pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    /// Fraction of the month's expenses, 0.0..=1.0.
    pub share: f64,
}

pub struct MonthlyReport {
    pub year: i32,
    pub month: u32,
    pub transactions: Vec<TransactionRow>,
    pub total_income: f64,
    pub total_expenses: f64,
    pub net: f64,
    pub expenses_by_category: Vec<CategoryTotal>,
}

pub fn monthly(conn: &Connection, year: i32, month: u32) -> Result<MonthlyReport> {
    let transactions = list_transactions(conn, Some((year, month)))?;

    let total_of = |kind: TransactionType| -> f64 {
        transactions
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.amount)
            .sum()
    };
    let total_income = total_of(TransactionType::Income);
    let total_expenses = total_of(TransactionType::Expense);

    let prefix = format!("{year:04}-{month:02}%");
    let mut stmt = conn.prepare(
        "SELECT COALESCE(c.name, 'Uncategorized'), SUM(t.amount) AS total \
         FROM transactions t LEFT JOIN categories c ON t.category_id = c.id \
         WHERE t.kind = 'expense' AND t.date LIKE ?1 \
         GROUP BY 1 ORDER BY total DESC",
    )?;
    let expenses_by_category = stmt
        .query_map([&prefix], |row| {
            let total: f64 = row.get(1)?;
            Ok(CategoryTotal {
                name: row.get(0)?,
                total,
                share: if total_expenses > 0.0 { total / total_expenses } else { 0.0 },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(MonthlyReport {
        year,
        month,
        transactions,
        total_income,
        total_expenses,
        net: total_income - total_expenses,
        expenses_by_category,
    })
}

/// Years that have at least one dated transaction, ascending.
pub fn available_years(conn: &Connection) -> Result<Vec<i32>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT CAST(substr(date, 1, 4) AS INTEGER) FROM transactions \
         WHERE date IS NOT NULL ORDER BY 1",
    )?;
    let years = stmt.query_map([], |row| row.get(0))?;
    Ok(years.collect::<std::result::Result<Vec<_>, _>>()?)
}
