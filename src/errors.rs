//! Unified error type for the ledger, its store boundary and the report export.

use thiserror::Error;

/// All errors produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or input validation problem
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// Amount was zero, negative or not finite where a positive amount is required
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Referenced building does not exist
    #[error("Building not found: {id}")]
    BuildingNotFound {
        /// Building id that was looked up
        id: String,
    },

    /// Referenced member does not exist
    #[error("Member not found: {id}")]
    MemberNotFound {
        /// Member id that was looked up
        id: String,
    },

    /// Referenced record (transaction, expense, due) does not exist
    #[error("{collection} record not found: {id}")]
    RecordNotFound {
        /// Collection name
        collection: &'static str,
        /// Record id that was looked up
        id: String,
    },

    /// A stored or imported record violates a data-integrity rule
    #[error("Invalid {collection} record {id}: {message}")]
    InvalidRecord {
        /// Collection the record belongs to
        collection: &'static str,
        /// Record id
        id: String,
        /// What is wrong with it
        message: String,
    },

    /// The acting user lacks the role required for the action
    #[error("Permission denied: {actor} may not {action}")]
    PermissionDenied {
        /// Actor id
        actor: String,
        /// Attempted action
        action: String,
    },

    /// Workbook construction or saving failed; nothing was written
    #[error("Export failed: {message}")]
    Export {
        /// Underlying cause
        message: String,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON document could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Spreadsheet writer error
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
