//! Member business logic - residents attached to a building.

use crate::{
    core::{access::{Actor, ensure_admin}, audit},
    entities::{Building, Member, member},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Creates a member in an existing building.
pub async fn create_member(
    db: &DatabaseConnection,
    actor: &Actor,
    building_id: &str,
    full_name: &str,
    flat_number: &str,
    phone: Option<String>,
) -> Result<member::Model> {
    ensure_admin(actor, "create member")?;

    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(Error::Config {
            message: "Member name cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    Building::find_by_id(building_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::BuildingNotFound {
            id: building_id.to_string(),
        })?;

    let model = member::ActiveModel {
        id: Set(super::new_record_id()),
        building_id: Set(building_id.to_string()),
        full_name: Set(full_name.to_string()),
        flat_number: Set(flat_number.trim().to_string()),
        phone: Set(phone),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&txn)
    .await?;

    audit::record(&txn, actor, "create", "member", &model.id, Some(model.full_name.clone())).await?;
    txn.commit().await?;

    Ok(model)
}

/// Finds a member by id.
pub async fn get_member_by_id(
    db: &DatabaseConnection,
    member_id: &str,
) -> Result<Option<member::Model>> {
    Member::find_by_id(member_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists the members of a building ordered by flat number.
pub async fn list_members_for_building(
    db: &DatabaseConnection,
    building_id: &str,
) -> Result<Vec<member::Model>> {
    Member::find()
        .filter(member::Column::BuildingId.eq(building_id))
        .order_by_asc(member::Column::FlatNumber)
        .all(db)
        .await
        .map_err(Into::into)
}
