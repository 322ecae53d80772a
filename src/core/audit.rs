//! Audit trail - records who changed what.
//!
//! Entries are written through the same connection (usually an open database
//! transaction) as the change itself, so a rolled-back change leaves no entry.

use crate::{
    core::access::Actor,
    entities::{AuditLog, audit_log},
    errors::Result,
};
use sea_orm::{QueryOrder, QuerySelect, Set, prelude::*};

/// Appends an audit entry.
///
/// # Arguments
/// * `db` - Database connection or transaction
/// * `actor` - User who performed the action
/// * `action` - Verb such as `"create"` or `"mark_paid"`
/// * `entity` - Entity kind such as `"building"`
/// * `entity_id` - Id of the affected record
/// * `details` - Optional free-form context
pub async fn record<C>(
    db: &C,
    actor: &Actor,
    action: &str,
    entity: &str,
    entity_id: &str,
    details: Option<String>,
) -> Result<audit_log::Model>
where
    C: ConnectionTrait,
{
    let entry = audit_log::ActiveModel {
        actor_id: Set(actor.id.clone()),
        action: Set(action.to_string()),
        entity: Set(entity.to_string()),
        entity_id: Set(entity_id.to_string()),
        details: Set(details),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let model = entry.insert(db).await?;
    tracing::debug!(
        "Audit: {} {action} {entity} {entity_id}",
        actor.id
    );
    Ok(model)
}

/// Returns the most recent audit entries, newest first.
pub async fn list_recent(db: &DatabaseConnection, limit: u64) -> Result<Vec<audit_log::Model>> {
    AuditLog::find()
        .order_by_desc(audit_log::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}
