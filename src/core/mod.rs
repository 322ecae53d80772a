//! Core business logic, framework-agnostic.
//!
//! The store-facing modules (`building`, `member`, `transaction`, `expense`, `due`,
//! `audit`, `snapshot`, `ingest`) read and write through `SeaORM`. The reporting
//! pipeline (`filter`, `ledger`, `summary`, `export`, `report`) is pure and works
//! on an in-memory [`snapshot::DataSnapshot`].

/// Roles and the acting user
pub mod access;
/// Audit trail for mutating actions
pub mod audit;
/// Building management
pub mod building;
/// Dues raised against members
pub mod due;
/// Expense records
pub mod expense;
/// Spreadsheet export of a report
pub mod export;
/// Building and month filtering
pub mod filter;
/// Document-store import and timestamp normalization
pub mod ingest;
/// Combined income/expense ledger
pub mod ledger;
/// Member management
pub mod member;
/// Report orchestration
pub mod report;
/// In-memory snapshot of all collections
pub mod snapshot;
/// Income totals and currency formatting
pub mod summary;
/// Income (maintenance and extra collection) records
pub mod transaction;

/// Generates a new record id in the same shape the document store uses for its keys.
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
