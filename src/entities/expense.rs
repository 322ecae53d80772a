//! Expense entity - Money spent on behalf of a building.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Building that paid
    pub building_id: String,
    /// Free-form category such as "Electricity" or "Security"
    pub expense_type: String,
    /// When the expense was incurred
    pub expense_date: Option<DateTimeUtc>,
    /// What the money was spent on
    pub description: String,
    /// Amount spent, always positive
    pub amount: f64,
    /// When the record was created
    pub created_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
