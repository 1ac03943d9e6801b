use thiserror::Error;

/// PostgREST code for "a single row was requested but none (or several) matched"
pub const NO_ROWS_CODE: &str = "PGRST116";

/// Errors reported by a memo store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A single-row query matched no rows
    #[error("No rows returned for a single-row query")]
    NoRows,

    /// Error body returned by a PostgREST endpoint
    #[error("{message} (code {code}, HTTP {status})")]
    Api {
        code: String,
        message: String,
        details: Option<String>,
        hint: Option<String>,
        status: u16,
    },

    /// SQLite error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Transport error talking to a remote store
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A row could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The SQLite connection thread could not run the call
    #[error("Database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),
}

impl StoreError {
    /// Error code in PostgREST terms, if the error carries one
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::NoRows => Some(NO_ROWS_CODE),
            StoreError::Api { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether this is the distinguished "no row matched" signal
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(NO_ROWS_CODE)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
