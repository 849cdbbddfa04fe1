use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn casa(config_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("casa").unwrap();
    cmd.env("CASA_CONFIG_DIR", config_dir)
        .env_remove("CASA_STATEMENT_PASSWORD")
        .env_remove("CASA_LOG");
    cmd
}

const FIXTURE: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/tests/fixtures/fatura_protegida.xlsx"
);
const FIXTURE_PASSWORD: &str = "casa-2024";

fn init(config_dir: &Path, data_dir: &Path, user: Option<&str>) {
    let mut cmd = casa(config_dir);
    cmd.args(["init", "--data-dir", data_dir.to_str().unwrap()]);
    if let Some(user) = user {
        cmd.args(["--user", user]);
    }
    cmd.assert().success();
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    casa(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("report"));
}

#[test]
fn test_init_creates_ledger() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    casa(dir.path())
        .args(["init", "--data-dir", data.to_str().unwrap(), "--user", "ana"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized casa"))
        .stdout(predicate::str::contains("Importing as ana"));
    assert!(data.join("casa.db").exists());
    assert!(dir.path().join("settings.json").exists());
}

#[test]
fn test_categories_list_shows_seed() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["categories", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uncategorized"));
}

#[test]
fn test_transactions_list_empty() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions found."));
}

#[test]
fn test_import_rejects_unencrypted_file() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    let file = dir.path().join("fatura.xlsx");
    std::fs::write(&file, b"PK\x03\x04plain workbook").unwrap();
    casa(dir.path())
        .args(["import", file.to_str().unwrap(), "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));
}

#[test]
fn test_dry_run_rejects_garbage_without_user() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("fatura.xls");
    std::fs::write(&file, b"not a spreadsheet").unwrap();
    casa(dir.path())
        .args(["import", file.to_str().unwrap(), "--password", "secret", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Decryption failed"));
}

#[test]
fn test_import_requires_user() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), None);
    let file = dir.path().join("fatura.xlsx");
    std::fs::write(&file, b"whatever").unwrap();
    casa(dir.path())
        .args(["import", file.to_str().unwrap(), "--password", "secret"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_report_rejects_bad_month() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["report", "monthly", "--month", "2024-13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid month"));
}

#[test]
fn test_report_empty_month() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["report", "monthly", "--month", "2024-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions found."));
}

#[test]
fn test_import_encrypted_statement() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    init(dir.path(), &data, Some("ana"));
    casa(dir.path())
        .args(["import", FIXTURE, "--password", FIXTURE_PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("imported (1 expenses, 1 income)"))
        .stdout(predicate::str::contains("Period: 2024-01-10 to 2024-01-11"));

    let conn = rusqlite::Connection::open(data.join("casa.db")).unwrap();
    let mut stmt = conn
        .prepare(
            "SELECT t.kind, t.amount, t.date, c.name, t.owner \
             FROM transactions t JOIN categories c ON t.category_id = c.id ORDER BY t.date",
        )
        .unwrap();
    let rows: Vec<(String, f64, String, String, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(
        rows,
        vec![
            ("expense".into(), 50.0, "2024-01-10".into(), "Mercado".into(), "ana".into()),
            ("income".into(), 0.0, "2024-01-11".into(), "Salário".into(), "ana".into()),
        ]
    );

    casa(dir.path())
        .args(["import", FIXTURE, "--password", FIXTURE_PASSWORD])
        .assert()
        .success()
        .stdout(predicate::str::contains("already been imported"));
}

#[test]
fn test_import_wrong_password() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["import", FIXTURE])
        .env("CASA_STATEMENT_PASSWORD", "senha-errada")
        .assert()
        .failure()
        .stderr(predicate::str::contains("wrong password"));
    casa(dir.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions found."));
}

#[test]
fn test_dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    init(dir.path(), &dir.path().join("data"), Some("ana"));
    casa(dir.path())
        .args(["import", FIXTURE, "--password", FIXTURE_PASSWORD, "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mercado"))
        .stdout(predicate::str::contains("2 rows (dry run, nothing written)"));
    casa(dir.path())
        .args(["transactions", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No transactions found."));
}

#[test]
fn test_export_monthly_csv() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    init(dir.path(), &data, Some("ana"));
    casa(dir.path())
        .args(["import", FIXTURE, "--password", FIXTURE_PASSWORD])
        .assert()
        .success();

    casa(dir.path())
        .args(["export", "monthly", "--month", "2024-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    let path = data.join("exports").join("monthly-2024-01.csv");
    let mut rdr = csv::Reader::from_path(&path).unwrap();
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].iter().collect::<Vec<_>>(),
        ["2024-01-11", "income", "0.00", "Salário", "", "ana"]
    );
    assert_eq!(
        records[1].iter().collect::<Vec<_>>(),
        ["2024-01-10", "expense", "50.00", "Mercado", "", "ana"]
    );

    let custom = dir.path().join("janeiro.csv");
    casa(dir.path())
        .args(["export", "monthly", "--month", "2024-01", "--output", custom.to_str().unwrap()])
        .assert()
        .success();
    assert!(custom.exists());
}
