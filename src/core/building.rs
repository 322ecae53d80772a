//! Building business logic - Handles all building-related operations.
//!
//! Provides functions for creating, retrieving, updating and deleting buildings,
//! plus idempotent seeding from the config file. Mutations require an admin
//! [`Actor`] and are audited in the same database transaction.

use crate::{
    config::settings::BuildingSeed,
    core::{access::{Actor, ensure_admin}, audit},
    entities::{Building, Due, Expense, Member, Transaction, building, due, expense, member, transaction},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// Retrieves all buildings ordered alphabetically by name.
pub async fn list_buildings(db: &DatabaseConnection) -> Result<Vec<building::Model>> {
    Building::find()
        .order_by_asc(building::Column::BuildingName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a building by its unique id.
pub async fn get_building_by_id(
    db: &DatabaseConnection,
    building_id: &str,
) -> Result<Option<building::Model>> {
    Building::find_by_id(building_id.to_string())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a building by its exact name.
pub async fn get_building_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<building::Model>> {
    Building::find()
        .filter(building::Column::BuildingName.eq(name))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new building.
///
/// The name is trimmed and must not be empty. The opening balance must be a
/// finite, non-negative amount.
pub async fn create_building(
    db: &DatabaseConnection,
    actor: &Actor,
    name: &str,
    address: &str,
    opening_balance: f64,
) -> Result<building::Model> {
    ensure_admin(actor, "create building")?;

    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Building name cannot be empty".to_string(),
        });
    }
    validate_opening_balance(opening_balance)?;

    let txn = db.begin().await?;

    let model = building::ActiveModel {
        id: Set(super::new_record_id()),
        building_name: Set(name.to_string()),
        address: Set(address.trim().to_string()),
        opening_balance: Set(opening_balance),
        created_at: Set(chrono::Utc::now()),
    }
    .insert(&txn)
    .await?;

    audit::record(&txn, actor, "create", "building", &model.id, Some(model.building_name.clone()))
        .await?;
    txn.commit().await?;

    tracing::info!("Created building '{}' ({})", model.building_name, model.id);
    Ok(model)
}

/// Replaces the opening balance of a building.
pub async fn update_opening_balance(
    db: &DatabaseConnection,
    actor: &Actor,
    building_id: &str,
    opening_balance: f64,
) -> Result<building::Model> {
    ensure_admin(actor, "update building")?;
    validate_opening_balance(opening_balance)?;

    let txn = db.begin().await?;

    let existing = Building::find_by_id(building_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::BuildingNotFound {
            id: building_id.to_string(),
        })?;

    let previous = existing.opening_balance;
    let mut active_model: building::ActiveModel = existing.into();
    active_model.opening_balance = Set(opening_balance);
    let updated = active_model.update(&txn).await?;

    audit::record(
        &txn,
        actor,
        "update_opening_balance",
        "building",
        building_id,
        Some(format!("{previous} -> {opening_balance}")),
    )
    .await?;
    txn.commit().await?;

    Ok(updated)
}

/// Deletes a building that nothing references any more.
///
/// Buildings that still have members, transactions, expenses or dues are kept,
/// since their records would lose their building name in reports.
pub async fn delete_building(db: &DatabaseConnection, actor: &Actor, building_id: &str) -> Result<()> {
    ensure_admin(actor, "delete building")?;

    let txn = db.begin().await?;

    let existing = Building::find_by_id(building_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::BuildingNotFound {
            id: building_id.to_string(),
        })?;

    let references = Member::find()
        .filter(member::Column::BuildingId.eq(building_id))
        .count(&txn)
        .await?
        + Transaction::find()
            .filter(transaction::Column::BuildingId.eq(building_id))
            .count(&txn)
            .await?
        + Expense::find()
            .filter(expense::Column::BuildingId.eq(building_id))
            .count(&txn)
            .await?
        + Due::find()
            .filter(due::Column::BuildingId.eq(building_id))
            .count(&txn)
            .await?;

    if references > 0 {
        return Err(Error::Config {
            message: format!(
                "Building '{}' still has {references} linked records",
                existing.building_name
            ),
        });
    }

    let name = existing.building_name.clone();
    existing.delete(&txn).await?;
    audit::record(&txn, actor, "delete", "building", building_id, Some(name)).await?;
    txn.commit().await?;

    Ok(())
}

/// Creates the configured buildings in an empty store.
///
/// Seeding only runs while the buildings table is empty, so buildings that
/// were deleted or replaced by an import are never brought back. Seeds are
/// written by [`Actor::system`], whatever role the operator has.
///
/// # Returns
/// Number of buildings created
pub async fn seed_buildings(db: &DatabaseConnection, seeds: &[BuildingSeed]) -> Result<usize> {
    if seeds.is_empty() || Building::find().count(db).await? > 0 {
        return Ok(0);
    }

    let system = Actor::system();
    let mut created = 0;
    for seed in seeds {
        // Duplicate names in the config file are created once
        if get_building_by_name(db, seed.name.trim()).await?.is_some() {
            continue;
        }
        create_building(db, &system, &seed.name, &seed.address, seed.opening_balance).await?;
        created += 1;
    }

    if created > 0 {
        tracing::info!("Seeded {created} buildings from configuration");
    }
    Ok(created)
}

fn validate_opening_balance(amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{
        access::Role,
        filter::ReportFilters,
        ingest, report,
        snapshot::{DataSnapshot, load_snapshot},
    };
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_and_get_building() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_building(&db, &admin(), "  Shanti Apartments ", "MG Road", 1000.0).await?;

        assert_eq!(created.building_name, "Shanti Apartments");
        assert_eq!(created.opening_balance, 1000.0);

        let found = get_building_by_id(&db, &created.id).await?.unwrap();
        assert_eq!(found, created);
        assert!(get_building_by_name(&db, "Shanti Apartments").await?.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_building_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_building(&db, &admin(), "   ", "", 0.0).await;
        assert!(matches!(result, Err(Error::Config { .. })));

        let result = create_building(&db, &admin(), "Tower A", "", -1.0).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let result = create_building(&db, &admin(), "Tower A", "", f64::NAN).await;
        assert!(matches!(result, Err(Error::InvalidAmount { .. })));

        let resident = Actor::new("resident", Role::User);
        let result = create_building(&db, &resident, "Tower A", "", 0.0).await;
        assert!(matches!(result, Err(Error::PermissionDenied { .. })));

        assert!(list_buildings(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_buildings_sorted_by_name() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_building(&db, "Tower C").await?;
        create_test_building(&db, "Tower A").await?;
        create_test_building(&db, "Tower B").await?;

        let names: Vec<String> = list_buildings(&db)
            .await?
            .into_iter()
            .map(|b| b.building_name)
            .collect();
        assert_eq!(names, vec!["Tower A", "Tower B", "Tower C"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_opening_balance_is_audited() -> Result<()> {
        let db = setup_test_db().await?;
        let building = create_test_building(&db, "Tower A").await?;

        let updated = update_opening_balance(&db, &admin(), &building.id, 2500.0).await?;
        assert_eq!(updated.opening_balance, 2500.0);

        let entries = audit::list_recent(&db, 1).await?;
        assert_eq!(entries[0].action, "update_opening_balance");
        assert_eq!(entries[0].entity_id, building.id);

        let missing = update_opening_balance(&db, &admin(), "nope", 1.0).await;
        assert!(matches!(missing, Err(Error::BuildingNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_building_refuses_when_referenced() -> Result<()> {
        let db = setup_test_db().await?;
        let building = create_test_building(&db, "Tower A").await?;
        create_test_member(&db, &building.id, "Asha Rao").await?;

        let result = delete_building(&db, &admin(), &building.id).await;
        assert!(matches!(result, Err(Error::Config { .. })));
        assert!(get_building_by_id(&db, &building.id).await?.is_some());

        let empty = create_test_building(&db, "Tower B").await?;
        delete_building(&db, &admin(), &empty.id).await?;
        assert!(get_building_by_id(&db, &empty.id).await?.is_none());
        Ok(())
    }

    fn seeds() -> Vec<BuildingSeed> {
        vec![
            BuildingSeed {
                name: "Tower A".to_string(),
                address: "Plot 4".to_string(),
                opening_balance: 5000.0,
            },
            BuildingSeed {
                name: "Tower B".to_string(),
                address: String::new(),
                opening_balance: 0.0,
            },
            BuildingSeed {
                name: "Tower A".to_string(),
                address: "Plot 4".to_string(),
                opening_balance: 5000.0,
            },
        ]
    }

    #[tokio::test]
    async fn test_seed_buildings_only_fills_empty_store() -> Result<()> {
        let db = setup_test_db().await?;

        assert_eq!(seed_buildings(&db, &seeds()).await?, 2);
        assert_eq!(seed_buildings(&db, &seeds()).await?, 0);
        assert_eq!(list_buildings(&db).await?.len(), 2);

        let other = setup_test_db().await?;
        create_test_building(&other, "Existing").await?;
        assert_eq!(seed_buildings(&other, &seeds()).await?, 0);
        assert_eq!(list_buildings(&other).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_buildings_runs_as_system() -> Result<()> {
        let db = setup_test_db().await?;

        seed_buildings(&db, &seeds()).await?;

        let entries = audit::list_recent(&db, 10).await?;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.actor_id == "system"));
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_after_import_keeps_imported_buildings() -> Result<()> {
        let db = setup_test_db().await?;
        seed_buildings(&db, &seeds()).await?;

        let documents = ingest::parse_documents(
            r#"{"buildings": [{"id": "b1", "buildingName": "Shanti", "openingBalance": 1000}]}"#,
        )?;
        ingest::import_snapshot(&db, &admin(), &documents).await?;

        let net_balance = |snapshot: &DataSnapshot| {
            report::generate_report(snapshot, ReportFilters::default(), ist())
                .summary
                .net_balance
        };
        let imported = load_snapshot(&db).await;
        assert_eq!(net_balance(&imported), 1000.0);

        assert_eq!(seed_buildings(&db, &seeds()).await?, 0);

        let reloaded = load_snapshot(&db).await;
        assert_eq!(reloaded.buildings.len(), 1);
        assert_eq!(net_balance(&reloaded), 1000.0);
        Ok(())
    }
}
