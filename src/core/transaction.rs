//! Transaction business logic - income collected for a building.
//!
//! Transactions are the income side of the ledger: monthly maintenance payments
//! and one-off extra collections. Each one gets a receipt number at creation and
//! carries the billing month it pays for, which reports filter on.

use crate::{
    core::{
        access::{Actor, ensure_admin},
        audit,
        filter::month_label,
    },
    entities::{Building, Member, Transaction, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Kind of income record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Regular monthly maintenance
    Maintenance,
    /// One-off collection (repairs, festivals, sinking fund)
    ExtraCollection,
}

impl TransactionKind {
    /// Parses the stored type string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "maintenance" => Some(Self::Maintenance),
            "extra_collection" => Some(Self::ExtraCollection),
            _ => None,
        }
    }

    /// Value stored in the `transaction_type` column
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Maintenance => "maintenance",
            Self::ExtraCollection => "extra_collection",
        }
    }

    /// Category shown in the ledger
    #[must_use]
    pub const fn category(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::ExtraCollection => "Extra Collection",
        }
    }
}

/// Input for [`create_transaction`]
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// Receiving building
    pub building_id: String,
    /// Paying member, optional for collections not tied to a flat
    pub member_id: Option<String>,
    /// Maintenance or extra collection
    pub kind: TransactionKind,
    /// Ledger title; the category name is used when blank
    pub title: String,
    /// Amount received
    pub amount: f64,
    /// Billing month label; derived from `payment_date` when `None`
    pub month: Option<String>,
    /// When the money was received
    pub payment_date: DateTime<Utc>,
}

/// Records an income transaction and issues its receipt number.
///
/// # Arguments
/// * `db` - Database connection
/// * `actor` - Acting admin
/// * `new` - Transaction details
/// * `offset` - Local offset used for the default month label and the receipt date
pub async fn create_transaction(
    db: &DatabaseConnection,
    actor: &Actor,
    new: NewTransaction,
    offset: FixedOffset,
) -> Result<transaction::Model> {
    ensure_admin(actor, "create transaction")?;

    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    let txn = db.begin().await?;

    Building::find_by_id(new.building_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::BuildingNotFound {
            id: new.building_id.clone(),
        })?;

    if let Some(member_id) = &new.member_id {
        let member = Member::find_by_id(member_id.clone())
            .one(&txn)
            .await?
            .ok_or_else(|| Error::MemberNotFound {
                id: member_id.clone(),
            })?;
        if member.building_id != new.building_id {
            return Err(Error::Config {
                message: format!(
                    "Member {} does not belong to building {}",
                    member.full_name, new.building_id
                ),
            });
        }
    }

    let title = if new.title.trim().is_empty() {
        new.kind.category().to_string()
    } else {
        new.title.trim().to_string()
    };
    let month = new
        .month
        .unwrap_or_else(|| month_label(&new.payment_date, &offset));

    let model = transaction::ActiveModel {
        id: Set(super::new_record_id()),
        building_id: Set(new.building_id),
        member_id: Set(new.member_id),
        transaction_type: Set(new.kind.as_str().to_string()),
        title: Set(title),
        amount: Set(new.amount),
        month: Set(Some(month)),
        payment_date: Set(Some(new.payment_date)),
        created_at: Set(Some(Utc::now())),
        receipt_number: Set(receipt_number(&new.payment_date, &offset)),
    }
    .insert(&txn)
    .await?;

    audit::record(
        &txn,
        actor,
        "create",
        "transaction",
        &model.id,
        Some(format!("{} {}", model.receipt_number, model.amount)),
    )
    .await?;
    txn.commit().await?;

    tracing::info!(
        "Recorded {} of {} for building {} ({})",
        model.transaction_type,
        model.amount,
        model.building_id,
        model.receipt_number
    );
    Ok(model)
}

/// Retrieves all transactions of a building, newest payment first.
pub async fn list_transactions_for_building(
    db: &DatabaseConnection,
    building_id: &str,
) -> Result<Vec<transaction::Model>> {
    Transaction::find()
        .filter(transaction::Column::BuildingId.eq(building_id))
        .order_by_desc(transaction::Column::PaymentDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a transaction.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    actor: &Actor,
    transaction_id: &str,
) -> Result<()> {
    ensure_admin(actor, "delete transaction")?;

    let txn = db.begin().await?;

    let existing = Transaction::find_by_id(transaction_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::RecordNotFound {
            collection: "transaction",
            id: transaction_id.to_string(),
        })?;

    let receipt = existing.receipt_number.clone();
    existing.delete(&txn).await?;
    audit::record(&txn, actor, "delete", "transaction", transaction_id, Some(receipt)).await?;
    txn.commit().await?;

    Ok(())
}

/// Builds a receipt number like `RCPT-20251014-3FA9C2`.
fn receipt_number(payment_date: &DateTime<Utc>, offset: &FixedOffset) -> String {
    let suffix: String = super::new_record_id()
        .chars()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!(
        "RCPT-{}-{suffix}",
        payment_date.with_timezone(offset).format("%Y%m%d")
    )
}
