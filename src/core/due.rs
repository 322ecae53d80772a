//! Due business logic - obligations raised against members.
//!
//! A due moves between `unpaid` and `paid`. The write path keeps `payment_date`
//! in step with the status: marking a due paid stamps the date, marking it
//! unpaid clears it.

use crate::{
    core::{access::{Actor, ensure_admin}, audit},
    entities::{Due, Member, due},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Payment state of a due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// Not yet paid
    Unpaid,
    /// Settled
    Paid,
}

impl DueStatus {
    /// Parses the stored status string.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "unpaid" => Some(Self::Unpaid),
            "paid" => Some(Self::Paid),
            _ => None,
        }
    }

    /// Value stored in the `status` column
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unpaid => "unpaid",
            Self::Paid => "paid",
        }
    }
}

/// Whether a stored due counts as paid
#[must_use]
pub fn is_paid(due: &due::Model) -> bool {
    DueStatus::parse(&due.status) == Some(DueStatus::Paid)
}

/// Input for [`create_due`]
#[derive(Debug, Clone)]
pub struct NewDue {
    /// Building raising the due
    pub building_id: String,
    /// Member who owes it
    pub member_id: String,
    /// Short title
    pub title: String,
    /// Free-form kind such as `"maintenance"` or `"penalty"`
    pub due_type: String,
    /// Amount owed
    pub amount: f64,
    /// When it falls due
    pub due_date: DateTime<Utc>,
}

/// Raises a new unpaid due against a member of the building.
pub async fn create_due(db: &DatabaseConnection, actor: &Actor, new: NewDue) -> Result<due::Model> {
    ensure_admin(actor, "create due")?;

    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    let txn = db.begin().await?;

    let member = Member::find_by_id(new.member_id.clone())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: new.member_id.clone(),
        })?;
    if member.building_id != new.building_id {
        return Err(Error::Config {
            message: format!(
                "Member {} does not belong to building {}",
                member.full_name, new.building_id
            ),
        });
    }

    let model = due::ActiveModel {
        id: Set(super::new_record_id()),
        building_id: Set(new.building_id),
        member_id: Set(new.member_id),
        title: Set(new.title.trim().to_string()),
        due_type: Set(new.due_type),
        amount: Set(new.amount),
        due_date: Set(Some(new.due_date)),
        payment_date: Set(None),
        status: Set(DueStatus::Unpaid.as_str().to_string()),
        created_at: Set(Some(Utc::now())),
    }
    .insert(&txn)
    .await?;

    audit::record(&txn, actor, "create", "due", &model.id, Some(model.title.clone())).await?;
    txn.commit().await?;

    Ok(model)
}

/// Marks a due as paid on `payment_date`.
pub async fn mark_paid(
    db: &DatabaseConnection,
    actor: &Actor,
    due_id: &str,
    payment_date: DateTime<Utc>,
) -> Result<due::Model> {
    set_status(db, actor, due_id, DueStatus::Paid, Some(payment_date)).await
}

/// Reverts a due to unpaid and clears its payment date.
pub async fn mark_unpaid(db: &DatabaseConnection, actor: &Actor, due_id: &str) -> Result<due::Model> {
    set_status(db, actor, due_id, DueStatus::Unpaid, None).await
}

async fn set_status(
    db: &DatabaseConnection,
    actor: &Actor,
    due_id: &str,
    status: DueStatus,
    payment_date: Option<DateTime<Utc>>,
) -> Result<due::Model> {
    let action = match status {
        DueStatus::Paid => "mark_paid",
        DueStatus::Unpaid => "mark_unpaid",
    };
    ensure_admin(actor, action)?;

    let txn = db.begin().await?;

    let existing = Due::find_by_id(due_id.to_string())
        .one(&txn)
        .await?
        .ok_or_else(|| Error::RecordNotFound {
            collection: "due",
            id: due_id.to_string(),
        })?;

    let mut active_model: due::ActiveModel = existing.into();
    active_model.status = Set(status.as_str().to_string());
    active_model.payment_date = Set(payment_date);
    let updated = active_model.update(&txn).await?;

    audit::record(&txn, actor, action, "due", due_id, None).await?;
    txn.commit().await?;

    Ok(updated)
}

/// Lists the dues of a building, earliest due date first.
pub async fn list_dues_for_building(
    db: &DatabaseConnection,
    building_id: &str,
) -> Result<Vec<due::Model>> {
    Due::find()
        .filter(due::Column::BuildingId.eq(building_id))
        .order_by_asc(due::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists the dues of one member, earliest due date first.
pub async fn list_dues_for_member(
    db: &DatabaseConnection,
    member_id: &str,
) -> Result<Vec<due::Model>> {
    Due::find()
        .filter(due::Column::MemberId.eq(member_id))
        .order_by_asc(due::Column::DueDate)
        .all(db)
        .await
        .map_err(Into::into)
}
