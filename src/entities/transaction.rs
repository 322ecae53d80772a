//! Transaction entity - Income collected for a building.
//!
//! A transaction is either a monthly `maintenance` payment or an `extra_collection`
//! (e.g. a one-off repair levy). The `month` label is the billing month as the
//! collector entered it ("October 2025"), which may differ from `payment_date`.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    /// Unique identifier for the transaction
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Building that received the money
    pub building_id: String,
    /// Paying member, if the collection is tied to one
    pub member_id: Option<String>,
    /// `"maintenance"` or `"extra_collection"`
    pub transaction_type: String,
    /// Short title shown in the ledger
    pub title: String,
    /// Collected amount, always positive
    pub amount: f64,
    /// Billing month label in `"Month Year"` form
    pub month: Option<String>,
    /// When the money was received
    pub payment_date: Option<DateTimeUtc>,
    /// When the record was created
    pub created_at: Option<DateTimeUtc>,
    /// Receipt number printed on the payment receipt
    pub receipt_number: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
