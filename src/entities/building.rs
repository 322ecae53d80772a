//! Building entity - A housing society building whose accounts are kept separately.
//!
//! Each building carries an `opening_balance`, the cash it held before records
//! started being kept. It only counts towards all-time totals.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Building database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "buildings")]
pub struct Model {
    /// Unique identifier for the building
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Display name of the building (e.g., "Shanti Apartments")
    pub building_name: String,
    /// Postal address
    pub address: String,
    /// Carry-in cash balance, never negative
    pub opening_balance: f64,
    /// When the building was created
    pub created_at: DateTimeUtc,
}

/// Buildings are referenced by id only; no foreign keys are declared so that
/// records pointing at a removed building can still be stored and reported.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
