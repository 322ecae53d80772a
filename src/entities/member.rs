//! Member entity - A resident (flat owner or tenant) of a building.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "members")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Building the member lives in
    pub building_id: String,
    /// Full name used on receipts and reports
    pub full_name: String,
    /// Flat number within the building (e.g., "A-402")
    pub flat_number: String,
    /// Optional contact number
    pub phone: Option<String>,
    /// When the member was added
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
