//! In-memory snapshot of every collection the reports read.
//!
//! The reporting pipeline never talks to the store. It receives a
//! [`DataSnapshot`], built either by [`load_snapshot`] or by the document
//! importer, and derives everything from it.
//!
//! Loading is tolerant: each collection is fetched on its own, and a
//! collection that fails to load is logged, listed in
//! [`DataSnapshot::unavailable`] and treated as empty, so the views that do
//! not depend on it still render.

use crate::entities::{
    Building, Due, Expense, Member, Transaction, building, due, expense, member, transaction,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use std::fmt;

/// The source collections of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    /// Buildings
    Buildings,
    /// Members
    Members,
    /// Income transactions
    Transactions,
    /// Expenses
    Expenses,
    /// Dues
    Dues,
}

impl Collection {
    /// Lowercase collection name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buildings => "buildings",
            Self::Members => "members",
            Self::Transactions => "transactions",
            Self::Expenses => "expenses",
            Self::Dues => "dues",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only copy of all source collections
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSnapshot {
    /// All buildings
    pub buildings: Vec<building::Model>,
    /// All members
    pub members: Vec<member::Model>,
    /// All income transactions
    pub transactions: Vec<transaction::Model>,
    /// All expenses
    pub expenses: Vec<expense::Model>,
    /// All dues
    pub dues: Vec<due::Model>,
    /// Collections that could not be loaded and are empty in this snapshot
    pub unavailable: Vec<Collection>,
}

impl DataSnapshot {
    /// Whether every collection loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.unavailable.is_empty()
    }

    /// Whether `collection` failed to load
    #[must_use]
    pub fn is_unavailable(&self, collection: Collection) -> bool {
        self.unavailable.contains(&collection)
    }
}

/// Loads every collection from the store.
///
/// Never fails as a whole; see the module docs for how load errors are handled.
pub async fn load_snapshot(db: &DatabaseConnection) -> DataSnapshot {
    let mut unavailable = Vec::new();

    let buildings = load_collection::<Building>(db, Collection::Buildings, &mut unavailable).await;
    let members = load_collection::<Member>(db, Collection::Members, &mut unavailable).await;
    let transactions =
        load_collection::<Transaction>(db, Collection::Transactions, &mut unavailable).await;
    let expenses = load_collection::<Expense>(db, Collection::Expenses, &mut unavailable).await;
    let dues = load_collection::<Due>(db, Collection::Dues, &mut unavailable).await;

    tracing::debug!(
        "Loaded snapshot: {} buildings, {} members, {} transactions, {} expenses, {} dues",
        buildings.len(),
        members.len(),
        transactions.len(),
        expenses.len(),
        dues.len()
    );

    DataSnapshot {
        buildings,
        members,
        transactions,
        expenses,
        dues,
        unavailable,
    }
}

async fn load_collection<E>(
    db: &DatabaseConnection,
    collection: Collection,
    unavailable: &mut Vec<Collection>,
) -> Vec<E::Model>
where
    E: EntityTrait,
{
    match E::find().all(db).await {
        Ok(models) => models,
        Err(e) => {
            tracing::warn!("Failed to load {collection}, treating as empty: {e}");
            unavailable.push(collection);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Result;
    use crate::test_utils::*;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_load_snapshot_reads_all_collections() -> Result<()> {
        let (db, building) = setup_with_building().await?;
        let member = create_test_member(&db, &building.id, "Asha").await?;
        create_test_transaction(&db, &building.id, 2000.0, utc(2025, 10, 5)).await?;
        create_test_expense(&db, &building.id, 500.0, utc(2025, 10, 6)).await?;
        create_test_due(&db, &building.id, &member.id, 750.0).await?;

        let snapshot = load_snapshot(&db).await;
        assert!(snapshot.is_complete());
        assert_eq!(snapshot.buildings.len(), 1);
        assert_eq!(snapshot.members.len(), 1);
        assert_eq!(snapshot.transactions.len(), 1);
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.dues.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_collection_is_empty_and_flagged() -> Result<()> {
        let (db, building) = setup_with_building().await?;
        create_test_transaction(&db, &building.id, 2000.0, utc(2025, 10, 5)).await?;
        db.execute_unprepared("DROP TABLE expenses").await?;

        let snapshot = load_snapshot(&db).await;
        assert!(!snapshot.is_complete());
        assert!(snapshot.is_unavailable(Collection::Expenses));
        assert!(!snapshot.is_unavailable(Collection::Transactions));
        assert!(snapshot.expenses.is_empty());
        assert_eq!(snapshot.transactions.len(), 1);
        Ok(())
    }
}
