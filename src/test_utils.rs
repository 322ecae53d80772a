//! Shared test utilities for `BuildingWise`.
//!
//! Store helpers create records through the regular CRUD operations with an
//! admin actor. Model helpers build detached `Model` values for the pure
//! reporting pipeline, so those tests never touch a database.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        access::{Actor, Role},
        building, due, expense,
        due::NewDue,
        member,
        transaction::{self, NewTransaction, TransactionKind},
    },
    entities,
    errors::Result,
};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Admin actor used for all test writes
pub fn admin() -> Actor {
    Actor::new("test-admin", Role::Admin)
}

/// Indian Standard Time, the default report offset
pub fn ist() -> FixedOffset {
    FixedOffset::east_opt(330 * 60).unwrap()
}

/// Midnight UTC on the given day
pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    utc_hms(year, month, day, 0, 0)
}

/// The given UTC wall-clock time
pub fn utc_hms(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap()
}

/// Creates a building with an opening balance of 1000.
pub async fn create_test_building(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::building::Model> {
    building::create_building(db, &admin(), name, "1 Test Street", 1000.0).await
}

/// Fresh database with a single building already in it.
pub async fn setup_with_building() -> Result<(DatabaseConnection, entities::building::Model)> {
    let db = setup_test_db().await?;
    let building = create_test_building(&db, "Test Building").await?;
    Ok((db, building))
}

/// Creates a member in flat "A-1" with no phone.
pub async fn create_test_member(
    db: &DatabaseConnection,
    building_id: &str,
    name: &str,
) -> Result<entities::member::Model> {
    member::create_member(db, &admin(), building_id, name, "A-1", None).await
}

/// Records a maintenance payment with no member; the month follows the payment date.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    building_id: &str,
    amount: f64,
    paid: DateTime<Utc>,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(
        db,
        &admin(),
        NewTransaction {
            building_id: building_id.to_string(),
            member_id: None,
            kind: TransactionKind::Maintenance,
            title: String::new(),
            amount,
            month: None,
            payment_date: paid,
        },
        ist(),
    )
    .await
}

/// Records an electricity expense.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    building_id: &str,
    amount: f64,
    date: DateTime<Utc>,
) -> Result<entities::expense::Model> {
    expense::create_expense(db, &admin(), building_id, "Electricity", "Meter bill", amount, date)
        .await
}

/// Creates an unpaid repair due, due on 1 November 2025.
pub async fn create_test_due(
    db: &DatabaseConnection,
    building_id: &str,
    member_id: &str,
    amount: f64,
) -> Result<entities::due::Model> {
    due::create_due(
        db,
        &admin(),
        NewDue {
            building_id: building_id.to_string(),
            member_id: member_id.to_string(),
            title: "Lift repair".to_string(),
            due_type: "repair".to_string(),
            amount,
            due_date: utc(2025, 11, 1),
        },
    )
    .await
}

/// Detached building named "Test Building {id}".
pub fn building_model(id: &str, opening_balance: f64) -> entities::building::Model {
    entities::building::Model {
        id: id.to_string(),
        building_name: format!("Test Building {id}"),
        address: "1 Test Street".to_string(),
        opening_balance,
        created_at: utc(2024, 1, 1),
    }
}

/// Detached member in flat "A-1".
pub fn member_model(id: &str, building_id: &str, full_name: &str) -> entities::member::Model {
    entities::member::Model {
        id: id.to_string(),
        building_id: building_id.to_string(),
        full_name: full_name.to_string(),
        flat_number: "A-1".to_string(),
        phone: None,
        created_at: utc(2024, 1, 1),
    }
}

/// Detached maintenance payment without a member.
pub fn transaction_model(
    id: &str,
    building_id: &str,
    amount: f64,
    month: Option<&str>,
    payment_date: Option<DateTime<Utc>>,
) -> entities::transaction::Model {
    entities::transaction::Model {
        id: id.to_string(),
        building_id: building_id.to_string(),
        member_id: None,
        transaction_type: TransactionKind::Maintenance.as_str().to_string(),
        title: format!("Maintenance {id}"),
        amount,
        month: month.map(str::to_string),
        payment_date,
        created_at: None,
        receipt_number: format!("RCPT-{id}"),
    }
}

/// Detached electricity expense.
pub fn expense_model(
    id: &str,
    building_id: &str,
    amount: f64,
    expense_date: Option<DateTime<Utc>>,
) -> entities::expense::Model {
    entities::expense::Model {
        id: id.to_string(),
        building_id: building_id.to_string(),
        expense_type: "Electricity".to_string(),
        expense_date,
        description: "Meter bill".to_string(),
        amount,
        created_at: None,
    }
}

/// Detached due of 750 with the given status and payment date.
pub fn due_model(
    id: &str,
    building_id: &str,
    member_id: &str,
    status: &str,
    payment_date: Option<DateTime<Utc>>,
) -> entities::due::Model {
    entities::due::Model {
        id: id.to_string(),
        building_id: building_id.to_string(),
        member_id: member_id.to_string(),
        title: "Lift repair".to_string(),
        due_type: "repair".to_string(),
        amount: 750.0,
        due_date: Some(utc(2025, 11, 1)),
        payment_date,
        status: status.to_string(),
        created_at: None,
    }
}
