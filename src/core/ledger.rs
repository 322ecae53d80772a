//! Combined income/expense ledger.
//!
//! Transactions and expenses are merged into one list of [`LedgerItem`]s ordered
//! by date, newest first. Undated items sort as the oldest (epoch 0). The sort
//! is stable over `transactions ++ expenses`, so items with equal dates keep
//! their collection order and income comes before expense.

use crate::{
    core::transaction::TransactionKind,
    entities::{expense, transaction},
};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;

/// Side of the ledger an item belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Money received
    Income,
    /// Money spent
    Expense,
}

impl EntryKind {
    /// Lowercase name used in exports
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// One row of the combined ledger
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerItem {
    /// Id of the source transaction or expense
    pub id: String,
    /// Effective date, if known
    pub date: Option<DateTime<Utc>>,
    /// Building of the source record
    pub building_id: String,
    /// Paying member for income items
    pub member_id: Option<String>,
    /// "Maintenance", "Extra Collection" or the expense type
    pub category: String,
    /// Transaction title or expense description
    pub details: String,
    /// Unsigned amount; the sign is carried by `kind`
    pub amount: f64,
    /// Income or expense
    pub kind: EntryKind,
}

impl LedgerItem {
    /// Builds an income item. The date is the payment date, or the creation
    /// date when the payment date is missing.
    #[must_use]
    pub fn from_transaction(transaction: &transaction::Model) -> Self {
        let category = if transaction.transaction_type == TransactionKind::Maintenance.as_str() {
            TransactionKind::Maintenance.category()
        } else {
            TransactionKind::ExtraCollection.category()
        };

        Self {
            id: transaction.id.clone(),
            date: transaction.payment_date.or(transaction.created_at),
            building_id: transaction.building_id.clone(),
            member_id: transaction.member_id.clone(),
            category: category.to_string(),
            details: transaction.title.clone(),
            amount: transaction.amount,
            kind: EntryKind::Income,
        }
    }

    /// Builds an expense item.
    #[must_use]
    pub fn from_expense(expense: &expense::Model) -> Self {
        Self {
            id: expense.id.clone(),
            date: expense.expense_date,
            building_id: expense.building_id.clone(),
            member_id: None,
            category: expense.expense_type.clone(),
            details: expense.description.clone(),
            amount: expense.amount,
            kind: EntryKind::Expense,
        }
    }

    /// Amount with income positive and expense negative
    #[must_use]
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }

    fn sort_key(&self) -> i64 {
        self.date.map_or(0, |date| date.timestamp_millis())
    }
}

/// Merges transactions and expenses into a ledger sorted newest first.
pub fn combine<'a, T, E>(transactions: T, expenses: E) -> Vec<LedgerItem>
where
    T: IntoIterator<Item = &'a transaction::Model>,
    E: IntoIterator<Item = &'a expense::Model>,
{
    let mut ledger: Vec<LedgerItem> = transactions
        .into_iter()
        .map(LedgerItem::from_transaction)
        .chain(expenses.into_iter().map(LedgerItem::from_expense))
        .collect();

    ledger.sort_by_key(|item| Reverse(item.sort_key()));
    ledger
}
