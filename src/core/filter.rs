//! Building and month filtering for reports.
//!
//! A [`Filter`] is either `All` or `Only(value)`. The `"all"` selector string is
//! only understood at the edge ([`Filter::from_selector`]), so a building or
//! month literally named "all" can still be selected through the typed API.
//!
//! Month matching rules:
//! - transactions match on their stored `month` label, by exact string equality;
//! - expenses match on the label derived from `expense_date` in the report's offset;
//! - dues are never filtered by month.

use crate::{
    core::snapshot::DataSnapshot,
    entities::{building, due, expense, transaction},
};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::{collections::BTreeSet, fmt};

/// Selector string meaning "no filter"
pub const ALL_SELECTOR: &str = "all";

/// An optional restriction to a single value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter<T> {
    /// No restriction
    All,
    /// Only records with this value
    Only(T),
}

impl<T> Default for Filter<T> {
    fn default() -> Self {
        Self::All
    }
}

impl<T> Filter<T> {
    /// Whether this filter lets everything through
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The selected value, if any
    #[must_use]
    pub const fn as_only(&self) -> Option<&T> {
        match self {
            Self::All => None,
            Self::Only(value) => Some(value),
        }
    }
}

impl<T: PartialEq> Filter<T> {
    /// Whether `value` passes the filter
    #[must_use]
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == value,
        }
    }
}

impl Filter<String> {
    /// Parses a user-facing selector where exactly `"all"` means no filter.
    ///
    /// Anything else, including `"ALL"` or values with surrounding spaces, is
    /// taken verbatim.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        if selector == ALL_SELECTOR {
            Self::All
        } else {
            Self::Only(selector.to_string())
        }
    }

    /// Whether an optional value passes; `None` only passes `All`.
    #[must_use]
    pub fn matches_opt(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => value == Some(selected.as_str()),
        }
    }

    /// The selector string: the value itself, or `"all"`
    #[must_use]
    pub fn selector(&self) -> &str {
        self.as_only().map_or(ALL_SELECTOR, String::as_str)
    }
}

impl fmt::Display for Filter<String> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.selector())
    }
}

/// Active report filters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilters {
    /// Restrict to one building id
    pub building: Filter<String>,
    /// Restrict to one `"Month Year"` label
    pub month: Filter<String>,
}

impl ReportFilters {
    /// Filters from raw selector strings, as typed by a user.
    #[must_use]
    pub fn from_selectors(building: &str, month: &str) -> Self {
        Self {
            building: Filter::from_selector(building),
            month: Filter::from_selector(month),
        }
    }
}

/// Records that passed the filters, borrowed from the snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredView<'a> {
    /// Selected buildings
    pub buildings: Vec<&'a building::Model>,
    /// Transactions of the selected buildings and month
    pub transactions: Vec<&'a transaction::Model>,
    /// Expenses of the selected buildings and month
    pub expenses: Vec<&'a expense::Model>,
    /// Dues of the selected buildings, whatever the month
    pub dues: Vec<&'a due::Model>,
}

/// Formats an instant as a `"Month Year"` label in the given time zone.
pub fn month_label<Tz>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.with_timezone(tz).format("%B %Y").to_string()
}

/// Month label of an expense, `None` when it has no date.
#[must_use]
pub fn expense_month(expense: &expense::Model, offset: &FixedOffset) -> Option<String> {
    expense
        .expense_date
        .as_ref()
        .map(|date| month_label(date, offset))
}

/// Applies building and month filters to a snapshot.
#[must_use]
pub fn apply_filters<'a>(
    snapshot: &'a DataSnapshot,
    filters: &ReportFilters,
    offset: &FixedOffset,
) -> FilteredView<'a> {
    let building = &filters.building;
    let month = &filters.month;

    let view = FilteredView {
        buildings: snapshot
            .buildings
            .iter()
            .filter(|b| building.matches(&b.id))
            .collect(),
        transactions: snapshot
            .transactions
            .iter()
            .filter(|t| building.matches(&t.building_id))
            .filter(|t| month.matches_opt(t.month.as_deref()))
            .collect(),
        expenses: snapshot
            .expenses
            .iter()
            .filter(|e| building.matches(&e.building_id))
            .filter(|e| month.is_all() || month.matches_opt(expense_month(e, offset).as_deref()))
            .collect(),
        dues: snapshot
            .dues
            .iter()
            .filter(|d| building.matches(&d.building_id))
            .collect(),
    };

    tracing::debug!(
        "Filters building={building} month={month}: {} buildings, {} transactions, {} expenses, {} dues",
        view.buildings.len(),
        view.transactions.len(),
        view.expenses.len(),
        view.dues.len()
    );
    view
}

/// Distinct month labels found on transactions, newest first.
///
/// Transactions without a month are skipped. Labels that do not parse as
/// `"Month Year"` are kept and listed last, alphabetically.
pub fn available_months<'a, I>(transactions: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a transaction::Model>,
{
    let labels: BTreeSet<&str> = transactions
        .into_iter()
        .filter_map(|t| t.month.as_deref())
        .collect();

    let mut months: Vec<(Option<NaiveDate>, &str)> = labels
        .into_iter()
        .map(|label| (parse_month_label(label), label))
        .collect();

    // Parsed labels newest first, then unparsed ones in alphabetical order
    months.sort_by(|(a_date, a_label), (b_date, b_label)| match (a_date, b_date) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a_label.cmp(b_label),
    });

    months.into_iter().map(|(_, label)| label.to_string()).collect()
}

/// Parses `"October 2025"` into the first day of that month.
#[must_use]
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("1 {}", label.trim()), "%d %B %Y").ok()
}
