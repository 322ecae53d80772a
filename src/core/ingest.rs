//! Document-store import.
//!
//! The hosted document store exports each collection as JSON, either as a list
//! of documents or as a map keyed by document id, with camelCase field names.
//! Timestamps appear in several shapes depending on how they were written:
//!
//! - a wrapper object `{"seconds": .., "nanoseconds": ..}` (or `_seconds` /
//!   `_nanoseconds`),
//! - an RFC 3339 string (or a bare `YYYY-MM-DD` date),
//! - epoch milliseconds.
//!
//! [`RawTimestamp`] accepts all of them and is converted to `DateTime<Utc>`
//! right here, so nothing past this module ever looks at the raw shape.
//!
//! Documents are validated while converting. Broken records (bad amounts,
//! unknown due status, a paid due without a payment date, duplicate ids) reject
//! the whole import. References to missing buildings or members are kept and
//! only logged; reports print them as "N/A".

use crate::{
    core::{
        access::{Actor, ensure_admin},
        audit,
        due::DueStatus,
        snapshot::{Collection, DataSnapshot},
        transaction::TransactionKind,
    },
    entities::{Building, Due, Expense, Member, Transaction, building, due, expense, member, transaction},
    errors::{Error, Result},
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};

/// A timestamp in any of the shapes the document store produces
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// `{"seconds": 1700000000, "nanoseconds": 0}`
    Wrapper {
        /// Whole seconds since the epoch
        #[serde(alias = "_seconds")]
        seconds: i64,
        /// Sub-second part
        #[serde(default, alias = "_nanoseconds")]
        nanoseconds: u32,
    },
    /// RFC 3339 string, or a plain `YYYY-MM-DD` date
    Text(String),
    /// Milliseconds since the epoch
    Millis(i64),
}

impl RawTimestamp {
    /// Converts to a UTC instant.
    ///
    /// # Errors
    /// Returns a description of the problem when the value is out of range or unparsable.
    pub fn into_utc(self) -> std::result::Result<DateTime<Utc>, String> {
        match self {
            Self::Wrapper {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds)
                .ok_or_else(|| format!("timestamp out of range: {seconds}s {nanoseconds}ns")),
            Self::Millis(millis) => DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| format!("timestamp out of range: {millis}ms")),
            Self::Text(text) => parse_text_timestamp(&text),
        }
    }
}

fn parse_text_timestamp(text: &str) -> std::result::Result<DateTime<Utc>, String> {
    let text = text.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(text) {
        return Ok(instant.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("unrecognized timestamp '{text}'"))
}

/// A collection exported either as a list or as a map keyed by id
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCollection<T> {
    List(Vec<T>),
    Map(BTreeMap<String, T>),
}

impl<T> Default for RawCollection<T> {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

trait Document {
    fn id_mut(&mut self) -> &mut String;
}

impl<T: Document> RawCollection<T> {
    fn into_documents(self) -> Vec<T> {
        match self {
            Self::List(documents) => documents,
            Self::Map(documents) => documents
                .into_iter()
                .map(|(key, mut document)| {
                    let id = document.id_mut();
                    if id.is_empty() {
                        *id = key;
                    }
                    document
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDocuments {
    #[serde(default)]
    buildings: RawCollection<RawBuilding>,
    #[serde(default)]
    members: RawCollection<RawMember>,
    #[serde(default)]
    transactions: RawCollection<RawTransaction>,
    #[serde(default)]
    expenses: RawCollection<RawExpense>,
    #[serde(default)]
    dues: RawCollection<RawDue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBuilding {
    #[serde(default)]
    id: String,
    building_name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    opening_balance: f64,
    created_at: Option<RawTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMember {
    #[serde(default)]
    id: String,
    building_id: String,
    full_name: String,
    #[serde(default)]
    flat_number: String,
    phone: Option<String>,
    created_at: Option<RawTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTransaction {
    #[serde(default)]
    id: String,
    building_id: String,
    member_id: Option<String>,
    #[serde(rename = "type")]
    transaction_type: String,
    #[serde(default)]
    title: String,
    amount: f64,
    month: Option<String>,
    payment_date: Option<RawTimestamp>,
    created_at: Option<RawTimestamp>,
    #[serde(default)]
    receipt_number: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExpense {
    #[serde(default)]
    id: String,
    building_id: String,
    expense_type: String,
    expense_date: Option<RawTimestamp>,
    #[serde(default)]
    description: String,
    amount: f64,
    created_at: Option<RawTimestamp>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDue {
    #[serde(default)]
    id: String,
    building_id: String,
    member_id: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "type", default)]
    due_type: String,
    amount: f64,
    due_date: Option<RawTimestamp>,
    payment_date: Option<RawTimestamp>,
    status: String,
    created_at: Option<RawTimestamp>,
}

macro_rules! impl_document {
    ($($raw:ty),*) => {
        $(impl Document for $raw {
            fn id_mut(&mut self) -> &mut String {
                &mut self.id
            }
        })*
    };
}

impl_document!(RawBuilding, RawMember, RawTransaction, RawExpense, RawDue);

/// Tracks the record being converted, for error messages
struct Context {
    collection: Collection,
    id: String,
}

impl Context {
    fn new(collection: Collection, id: &str) -> Result<Self> {
        if id.trim().is_empty() {
            return Err(Error::InvalidRecord {
                collection: collection.as_str(),
                id: String::new(),
                message: "document has no id".to_string(),
            });
        }
        Ok(Self {
            collection,
            id: id.to_string(),
        })
    }

    fn invalid(&self, message: impl Into<String>) -> Error {
        Error::InvalidRecord {
            collection: self.collection.as_str(),
            id: self.id.clone(),
            message: message.into(),
        }
    }

    fn timestamp(&self, field: &str, raw: Option<RawTimestamp>) -> Result<Option<DateTime<Utc>>> {
        raw.map(RawTimestamp::into_utc)
            .transpose()
            .map_err(|e| self.invalid(format!("{field}: {e}")))
    }

    fn amount(&self, amount: f64, allow_zero: bool) -> Result<f64> {
        let valid = amount.is_finite() && (amount > 0.0 || (allow_zero && amount == 0.0));
        if valid {
            Ok(amount)
        } else {
            Err(self.invalid(format!("invalid amount {amount}")))
        }
    }
}

/// Parses a JSON document export into a snapshot.
pub fn parse_documents(json: &str) -> Result<DataSnapshot> {
    let raw: RawDocuments = serde_json::from_str(json)?;

    let buildings = convert_all(Collection::Buildings, raw.buildings, convert_building)?;
    let members = convert_all(Collection::Members, raw.members, convert_member)?;
    let transactions =
        convert_all(Collection::Transactions, raw.transactions, convert_transaction)?;
    let expenses = convert_all(Collection::Expenses, raw.expenses, convert_expense)?;
    let dues = convert_all(Collection::Dues, raw.dues, convert_due)?;

    let snapshot = DataSnapshot {
        buildings,
        members,
        transactions,
        expenses,
        dues,
        unavailable: Vec::new(),
    };
    warn_on_dangling_references(&snapshot);
    Ok(snapshot)
}

/// Reads and parses a JSON document export from disk.
pub fn read_documents<P: AsRef<Path>>(path: P) -> Result<DataSnapshot> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read document export {}: {e}", path.display()),
    })?;
    parse_documents(&json)
}

fn convert_all<R, M>(
    name: Collection,
    collection: RawCollection<R>,
    convert: fn(R) -> Result<M>,
) -> Result<Vec<M>>
where
    R: Document,
{
    let mut seen = HashSet::new();
    collection
        .into_documents()
        .into_iter()
        .map(|mut raw| {
            let id = raw.id_mut().clone();
            let record = convert(raw)?;
            if seen.insert(id.clone()) {
                Ok(record)
            } else {
                Err(Error::InvalidRecord {
                    collection: name.as_str(),
                    id,
                    message: "duplicate id".to_string(),
                })
            }
        })
        .collect()
}

fn convert_building(raw: RawBuilding) -> Result<building::Model> {
    let ctx = Context::new(Collection::Buildings, &raw.id)?;
    Ok(building::Model {
        opening_balance: ctx.amount(raw.opening_balance, true)?,
        created_at: ctx.timestamp("createdAt", raw.created_at)?.unwrap_or_default(),
        id: ctx.id,
        building_name: raw.building_name,
        address: raw.address,
    })
}

fn convert_member(raw: RawMember) -> Result<member::Model> {
    let ctx = Context::new(Collection::Members, &raw.id)?;
    Ok(member::Model {
        created_at: ctx.timestamp("createdAt", raw.created_at)?.unwrap_or_default(),
        id: ctx.id,
        building_id: raw.building_id,
        full_name: raw.full_name,
        flat_number: raw.flat_number,
        phone: raw.phone,
    })
}

fn convert_transaction(raw: RawTransaction) -> Result<transaction::Model> {
    let ctx = Context::new(Collection::Transactions, &raw.id)?;
    if TransactionKind::parse(&raw.transaction_type).is_none() {
        tracing::warn!(
            "Transaction {} has unknown type '{}', reporting it as an extra collection",
            ctx.id,
            raw.transaction_type
        );
    }

    Ok(transaction::Model {
        amount: ctx.amount(raw.amount, false)?,
        payment_date: ctx.timestamp("paymentDate", raw.payment_date)?,
        created_at: ctx.timestamp("createdAt", raw.created_at)?,
        member_id: raw.member_id.filter(|id| !id.trim().is_empty()),
        month: raw.month.filter(|month| !month.trim().is_empty()),
        id: ctx.id,
        building_id: raw.building_id,
        transaction_type: raw.transaction_type,
        title: raw.title,
        receipt_number: raw.receipt_number,
    })
}

fn convert_expense(raw: RawExpense) -> Result<expense::Model> {
    let ctx = Context::new(Collection::Expenses, &raw.id)?;
    Ok(expense::Model {
        amount: ctx.amount(raw.amount, false)?,
        expense_date: ctx.timestamp("expenseDate", raw.expense_date)?,
        created_at: ctx.timestamp("createdAt", raw.created_at)?,
        id: ctx.id,
        building_id: raw.building_id,
        expense_type: raw.expense_type,
        description: raw.description,
    })
}

fn convert_due(raw: RawDue) -> Result<due::Model> {
    let ctx = Context::new(Collection::Dues, &raw.id)?;
    let status = DueStatus::parse(&raw.status)
        .ok_or_else(|| ctx.invalid(format!("unknown status '{}'", raw.status)))?;
    let payment_date = ctx.timestamp("paymentDate", raw.payment_date)?;

    if status == DueStatus::Paid && payment_date.is_none() {
        return Err(ctx.invalid("status is paid but paymentDate is missing"));
    }

    Ok(due::Model {
        amount: ctx.amount(raw.amount, false)?,
        due_date: ctx.timestamp("dueDate", raw.due_date)?,
        created_at: ctx.timestamp("createdAt", raw.created_at)?,
        payment_date,
        status: status.as_str().to_string(),
        id: ctx.id,
        building_id: raw.building_id,
        member_id: raw.member_id,
        title: raw.title,
        due_type: raw.due_type,
    })
}

fn warn_on_dangling_references(snapshot: &DataSnapshot) {
    let buildings: HashSet<&str> = snapshot.buildings.iter().map(|b| b.id.as_str()).collect();
    let members: HashSet<&str> = snapshot.members.iter().map(|m| m.id.as_str()).collect();

    let missing_buildings = snapshot
        .members
        .iter()
        .map(|m| m.building_id.as_str())
        .chain(snapshot.transactions.iter().map(|t| t.building_id.as_str()))
        .chain(snapshot.expenses.iter().map(|e| e.building_id.as_str()))
        .chain(snapshot.dues.iter().map(|d| d.building_id.as_str()))
        .filter(|id| !buildings.contains(id))
        .count();
    let missing_members = snapshot
        .transactions
        .iter()
        .filter_map(|t| t.member_id.as_deref())
        .chain(snapshot.dues.iter().map(|d| d.member_id.as_str()))
        .filter(|id| !members.contains(id))
        .count();

    if missing_buildings > 0 || missing_members > 0 {
        tracing::warn!(
            "Imported documents reference {missing_buildings} unknown buildings and {missing_members} unknown members"
        );
    }
}

/// Row counts written by [`import_snapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportCounts {
    /// Buildings written
    pub buildings: usize,
    /// Members written
    pub members: usize,
    /// Transactions written
    pub transactions: usize,
    /// Expenses written
    pub expenses: usize,
    /// Dues written
    pub dues: usize,
}

/// Replaces every stored collection with the contents of `snapshot`.
///
/// Runs in one database transaction: either the whole snapshot is stored or
/// nothing changes.
pub async fn import_snapshot(
    db: &DatabaseConnection,
    actor: &Actor,
    snapshot: &DataSnapshot,
) -> Result<ImportCounts> {
    ensure_admin(actor, "import documents")?;

    let txn = db.begin().await?;

    Due::delete_many().exec(&txn).await?;
    Expense::delete_many().exec(&txn).await?;
    Transaction::delete_many().exec(&txn).await?;
    Member::delete_many().exec(&txn).await?;
    Building::delete_many().exec(&txn).await?;

    for model in &snapshot.buildings {
        building::ActiveModel {
            id: Set(model.id.clone()),
            building_name: Set(model.building_name.clone()),
            address: Set(model.address.clone()),
            opening_balance: Set(model.opening_balance),
            created_at: Set(model.created_at),
        }
        .insert(&txn)
        .await?;
    }
    for model in &snapshot.members {
        member::ActiveModel {
            id: Set(model.id.clone()),
            building_id: Set(model.building_id.clone()),
            full_name: Set(model.full_name.clone()),
            flat_number: Set(model.flat_number.clone()),
            phone: Set(model.phone.clone()),
            created_at: Set(model.created_at),
        }
        .insert(&txn)
        .await?;
    }
    for model in &snapshot.transactions {
        transaction::ActiveModel {
            id: Set(model.id.clone()),
            building_id: Set(model.building_id.clone()),
            member_id: Set(model.member_id.clone()),
            transaction_type: Set(model.transaction_type.clone()),
            title: Set(model.title.clone()),
            amount: Set(model.amount),
            month: Set(model.month.clone()),
            payment_date: Set(model.payment_date),
            created_at: Set(model.created_at),
            receipt_number: Set(model.receipt_number.clone()),
        }
        .insert(&txn)
        .await?;
    }
    for model in &snapshot.expenses {
        expense::ActiveModel {
            id: Set(model.id.clone()),
            building_id: Set(model.building_id.clone()),
            expense_type: Set(model.expense_type.clone()),
            expense_date: Set(model.expense_date),
            description: Set(model.description.clone()),
            amount: Set(model.amount),
            created_at: Set(model.created_at),
        }
        .insert(&txn)
        .await?;
    }
    for model in &snapshot.dues {
        due::ActiveModel {
            id: Set(model.id.clone()),
            building_id: Set(model.building_id.clone()),
            member_id: Set(model.member_id.clone()),
            title: Set(model.title.clone()),
            due_type: Set(model.due_type.clone()),
            amount: Set(model.amount),
            due_date: Set(model.due_date),
            payment_date: Set(model.payment_date),
            status: Set(model.status.clone()),
            created_at: Set(model.created_at),
        }
        .insert(&txn)
        .await?;
    }

    let counts = ImportCounts {
        buildings: snapshot.buildings.len(),
        members: snapshot.members.len(),
        transactions: snapshot.transactions.len(),
        expenses: snapshot.expenses.len(),
        dues: snapshot.dues.len(),
    };
    audit::record(
        &txn,
        actor,
        "import",
        "documents",
        "all",
        Some(format!("{counts:?}")),
    )
    .await?;
    txn.commit().await?;

    tracing::info!("Imported documents: {counts:?}");
    Ok(counts)
}
