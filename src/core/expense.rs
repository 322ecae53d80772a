//! Expense business logic - money spent by a building.

use crate::{
    core::{access::{Actor, ensure_admin}, audit},
    entities::{Building, Expense, expense},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Records an expense against an existing building.
///
/// The expense type is free-form ("Electricity", "Security", ...) and becomes the
/// ledger category; it must not be blank.
pub async fn create_expense(
    db: &DatabaseConnection,
    actor: &Actor,
    building_id: &str,
    expense_type: &str,
    description: &str,
    amount: f64,
    expense_date: DateTime<Utc>,
) -> Result<expense::Model> {
    ensure_admin(actor, "create expense")?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(Error::InvalidAmount { amount });
    }
    if expense_type.trim().is_empty() {
        return Err(Error::Config {
            message: "Expense type cannot be empty".to_string(),
        });
    }

    let txn = db.begin().await?;

    Building::find_by_id(building_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::BuildingNotFound {
            id: building_id.to_string(),
        })?;

    let model = expense::ActiveModel {
        id: Set(super::new_record_id()),
        building_id: Set(building_id.to_string()),
        expense_type: Set(expense_type.trim().to_string()),
        expense_date: Set(Some(expense_date)),
        description: Set(description.trim().to_string()),
        amount: Set(amount),
        created_at: Set(Some(Utc::now())),
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        actor,
        "create",
        "expense",
        &model.id,
        Some(format!("{} {}", model.expense_type, model.amount)),
    )
    .await?;
    txn.commit().await?;

    Ok(model)
}

/// Retrieves all expenses of a building, most recent first.
pub async fn list_expenses_for_building(
    db: &DatabaseConnection,
    building_id: &str,
) -> Result<Vec<expense::Model>> {
    Expense::find()
        .filter(expense::Column::BuildingId.eq(building_id))
        .order_by_desc(expense::Column::ExpenseDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes an expense.
pub async fn delete_expense(db: &DatabaseConnection, actor: &Actor, expense_id: &str) -> Result<()> {
    ensure_admin(actor, "delete expense")?;

    let txn = db.begin().await?;

    let existing = Expense::find_by_id(expense_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::RecordNotFound {
            collection: "expense",
            id: expense_id.to_string(),
        })?;

    existing.delete(&txn).await?;
    audit::record(&txn, actor, "delete", "expense", expense_id, None).await?;
    txn.commit().await?;

    Ok(())
}
