use thiserror::Error;

#[derive(Error, Debug)]
pub enum CasaError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Could not read spreadsheet: {0}")]
    TableParse(String),

    #[error("Unexpected statement layout: {0}")]
    Schema(String),

    #[error("Not signed in (set a user with `casa init --user NAME`)")]
    Unauthenticated,

    #[error("Session for {0} has expired")]
    SessionExpired(String),

    #[error("Invalid month (expected YYYY-MM): {0}")]
    InvalidMonth(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, CasaError>;
