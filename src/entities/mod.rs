//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables; the reporting pipeline works
//! directly on their `Model` structs.

pub mod audit_log;
pub mod building;
pub mod due;
pub mod expense;
pub mod member;
pub mod transaction;

// Re-export specific types to avoid conflicts
pub use audit_log::{Column as AuditLogColumn, Entity as AuditLog, Model as AuditLogModel};
pub use building::{Column as BuildingColumn, Entity as Building, Model as BuildingModel};
pub use due::{Column as DueColumn, Entity as Due, Model as DueModel};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use member::{Column as MemberColumn, Entity as Member, Model as MemberModel};
pub use transaction::{
    Column as TransactionColumn, Entity as Transaction, Model as TransactionModel,
};
