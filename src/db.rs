use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const DB_FILE: &str = "casa.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    category_type TEXT NOT NULL DEFAULT 'expense',
    created_by TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS imports (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    checksum TEXT NOT NULL,
    record_count INTEGER,
    date_range_start TEXT,
    date_range_end TEXT,
    imported_by TEXT NOT NULL,
    import_date TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    kind TEXT NOT NULL CHECK (kind IN ('income', 'expense')),
    amount REAL NOT NULL CHECK (amount >= 0),
    description TEXT NOT NULL DEFAULT '',
    date TEXT,
    category_id INTEGER NOT NULL,
    owner TEXT NOT NULL,
    import_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (import_id) REFERENCES imports(id)
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
";

// (name, category_type)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Salário", "income"),
    ("Outras receitas", "income"),
    ("Mercado", "expense"),
    ("Moradia", "expense"),
    ("Transporte", "expense"),
    ("Saúde", "expense"),
    ("Lazer", "expense"),
    ("Uncategorized", "expense"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (name, category_type) in DEFAULT_CATEGORIES {
            conn.execute(
                "INSERT INTO categories (name, category_type) VALUES (?1, ?2)",
                rusqlite::params![name, category_type],
            )?;
        }
    }
    Ok(())
}

/// Open the ledger in `data_dir`, creating the schema if needed.
pub fn open_ledger(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILE))?;
    init_db(&conn)?;
    Ok(conn)
}
