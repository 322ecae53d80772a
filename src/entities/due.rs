//! Due entity - A point-in-time obligation raised against a member.
//!
//! `payment_date` is set only while `status` is `"paid"`. Dues are never part of
//! the income ledger; they are reported as their own view.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Due database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dues")]
pub struct Model {
    /// Unique identifier for the due
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Building the due belongs to
    pub building_id: String,
    /// Member who owes the amount
    pub member_id: String,
    /// Short title (e.g., "Lift repair share")
    pub title: String,
    /// Kind of due, free-form (e.g., "maintenance", "penalty")
    pub due_type: String,
    /// Amount owed
    pub amount: f64,
    /// Date the due falls due
    pub due_date: Option<DateTimeUtc>,
    /// When it was paid, only meaningful when `status` is `"paid"`
    pub payment_date: Option<DateTimeUtc>,
    /// `"unpaid"` or `"paid"`
    pub status: String,
    /// When the record was created
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
