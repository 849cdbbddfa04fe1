use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDate;
use rusqlite::Connection;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::decrypt::decrypt_workbook;
use crate::error::Result;
use crate::models::{CategoryId, NormalizedTransaction, TransactionType};
use crate::normalizer::{normalize_statement, read_first_sheet};
use crate::session::Session;
use crate::store::{LedgerStore, SqliteStore};

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportSummary {
    pub imported: usize,
    pub income: usize,
    pub expense: usize,
    /// Rows stored without a date because the source cell was unparseable.
    pub undated: usize,
    pub expense_total: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub duplicate_file: bool,
}

impl ImportSummary {
    fn record(&mut self, txn: &NormalizedTransaction) {
        self.imported += 1;
        match txn.kind {
            TransactionType::Income => self.income += 1,
            TransactionType::Expense => {
                self.expense += 1;
                self.expense_total += txn.amount;
            }
        }
        match txn.date {
            Some(d) => {
                self.first_date = Some(self.first_date.map_or(d, |f| f.min(d)));
                self.last_date = Some(self.last_date.map_or(d, |l| l.max(d)));
            }
            None => self.undated += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

pub fn is_duplicate_file(conn: &Connection, checksum: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM imports WHERE checksum = ?1")?;
    Ok(stmt.exists([checksum])?)
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Resolve each row's category and hand it to the store. Category ids are
/// memoized for the run, so repeated names cost one lookup.
pub fn persist<S, I>(store: &mut S, session: &Session, rows: I) -> Result<ImportSummary>
where
    S: LedgerStore,
    I: IntoIterator<Item = NormalizedTransaction>,
{
    let mut categories: HashMap<String, CategoryId> = HashMap::new();
    let mut summary = ImportSummary::default();
    for txn in rows {
        let category = match categories.get(&txn.category_name) {
            Some(id) => *id,
            None => {
                let id = store.find_or_create_category(session, &txn.category_name)?;
                categories.insert(txn.category_name.clone(), id);
                id
            }
        };
        store.insert_transaction(session, &txn, category)?;
        summary.record(&txn);
    }
    Ok(summary)
}

/// Write one import batch atomically: either every row and the import
/// record are committed, or nothing is.
pub fn commit_batch<I>(
    conn: &mut Connection,
    session: &Session,
    filename: &str,
    checksum: &str,
    rows: I,
) -> Result<ImportSummary>
where
    I: IntoIterator<Item = NormalizedTransaction>,
{
    let user = session.user()?.to_string();
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO imports (filename, checksum, imported_by) VALUES (?1, ?2, ?3)",
        rusqlite::params![filename, checksum, user],
    )?;
    let import_id = tx.last_insert_rowid();

    let summary = {
        let mut store = SqliteStore::for_import(&tx, import_id);
        persist(&mut store, session, rows)?
    };

    tx.execute(
        "UPDATE imports SET record_count = ?1, date_range_start = ?2, date_range_end = ?3 WHERE id = ?4",
        rusqlite::params![
            summary.imported as i64,
            summary.first_date.map(|d| d.format("%Y-%m-%d").to_string()),
            summary.last_date.map(|d| d.format("%Y-%m-%d").to_string()),
            import_id,
        ],
    )?;
    tx.commit()?;
    Ok(summary)
}

/// Decrypt and normalize a statement without writing anything.
pub fn preview(file_path: &Path, password: &str) -> Result<Vec<NormalizedTransaction>> {
    let encrypted = std::fs::read(file_path)?;
    let plain = decrypt_workbook(&encrypted, password)?;
    let range = read_first_sheet(plain)?;
    Ok(normalize_statement(&range)?.collect())
}

/// Import an encrypted statement into the ledger.
pub fn import_statement(
    conn: &mut Connection,
    session: &Session,
    file_path: &Path,
    password: &str,
) -> Result<ImportSummary> {
    session.user()?;
    let encrypted = std::fs::read(file_path)?;
    let checksum = compute_checksum(&encrypted);
    if is_duplicate_file(conn, &checksum)? {
        info!(file = %file_path.display(), "statement already imported");
        return Ok(ImportSummary {
            duplicate_file: true,
            ..ImportSummary::default()
        });
    }

    let plain = decrypt_workbook(&encrypted, password)?;
    let range = read_first_sheet(plain)?;
    let rows = normalize_statement(&range)?;
    debug!(layout = ?rows.layout(), "normalizing statement rows");

    let filename = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let summary = commit_batch(conn, session, filename, &checksum, rows)?;
    info!(
        file = filename,
        imported = summary.imported,
        undated = summary.undated,
        "statement imported"
    );
    Ok(summary)
}
