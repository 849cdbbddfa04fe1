use rusqlite::Connection;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    Category, CategoryId, NormalizedTransaction, TransactionId, TransactionRow, TransactionType,
};
use crate::session::Session;

/// Where normalized statement rows end up. Every call carries the session
/// so the store can attribute what it writes.
pub trait LedgerStore {
    /// Id of the category called `name`, creating it on first use.
    fn find_or_create_category(&mut self, session: &Session, name: &str) -> Result<CategoryId>;

    fn insert_transaction(
        &mut self,
        session: &Session,
        txn: &NormalizedTransaction,
        category: CategoryId,
    ) -> Result<TransactionId>;
}

// ---------------------------------------------------------------------------
// SQLite
// ---------------------------------------------------------------------------

pub struct SqliteStore<'c> {
    conn: &'c Connection,
    import_id: Option<i64>,
}

impl<'c> SqliteStore<'c> {
    #[allow(dead_code)]
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            conn,
            import_id: None,
        }
    }

    /// Link every transaction written through this store to an import batch.
    pub fn for_import(conn: &'c Connection, import_id: i64) -> Self {
        Self {
            conn,
            import_id: Some(import_id),
        }
    }
}

impl LedgerStore for SqliteStore<'_> {
    fn find_or_create_category(&mut self, session: &Session, name: &str) -> Result<CategoryId> {
        let user = session.user()?;
        // UNIQUE(name) makes this safe against a concurrent importer.
        let created = self.conn.execute(
            "INSERT INTO categories (name, category_type, created_by) VALUES (?1, 'expense', ?2) \
             ON CONFLICT(name) DO NOTHING",
            rusqlite::params![name, user],
        )?;
        let id: i64 = self.conn.query_row(
            "SELECT id FROM categories WHERE name = ?1",
            [name],
            |row| row.get(0),
        )?;
        if created > 0 {
            debug!(name, id, "category created");
        }
        Ok(CategoryId(id))
    }

    fn insert_transaction(
        &mut self,
        session: &Session,
        txn: &NormalizedTransaction,
        category: CategoryId,
    ) -> Result<TransactionId> {
        let user = session.user()?;
        self.conn.execute(
            "INSERT INTO transactions (kind, amount, description, date, category_id, owner, import_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                txn.kind.as_str(),
                txn.amount,
                txn.description,
                txn.iso_date(),
                category.0,
                user,
                self.import_id,
            ],
        )?;
        Ok(TransactionId(self.conn.last_insert_rowid()))
    }
}

// ---------------------------------------------------------------------------
// Read-back
// ---------------------------------------------------------------------------

pub fn list_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, category_type FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            category_type: row.get(2)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}

/// Transactions newest first, optionally limited to one `(year, month)`.
/// Undated rows sort last and are excluded by a month filter.
pub fn list_transactions(
    conn: &Connection,
    month: Option<(i32, u32)>,
) -> Result<Vec<TransactionRow>> {
    let (clause, params) = match month {
        Some((y, m)) => ("WHERE t.date LIKE ?1", vec![format!("{y:04}-{m:02}%")]),
        None => ("", vec![]),
    };
    let sql = format!(
        "SELECT t.id, t.kind, t.amount, t.description, t.date, c.name, t.owner \
         FROM transactions t LEFT JOIN categories c ON t.category_id = c.id \
         {clause} ORDER BY t.date IS NULL, t.date DESC, t.id"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params.iter()), |row| {
        let kind: String = row.get(1)?;
        Ok(TransactionRow {
            id: row.get(0)?,
            kind: TransactionType::parse(&kind).unwrap_or(TransactionType::Expense),
            amount: row.get(2)?,
            description: row.get(3)?,
            date: row.get(4)?,
            category: row.get(5)?,
            owner: row.get(6)?,
        })
    })?;
    Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
}
