//! Audit log entity - One row per mutating action, written in the same
//! database transaction as the change it describes.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Audit log database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_log")]
pub struct Model {
    /// Sequential identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Id of the user who performed the action
    pub actor_id: String,
    /// Action verb, e.g. `"create"`, `"delete"`, `"mark_paid"`
    pub action: String,
    /// Entity kind the action touched, e.g. `"building"`
    pub entity: String,
    /// Id of the touched record
    pub entity_id: String,
    /// Optional free-form details
    pub details: Option<String>,
    /// When the action happened
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
