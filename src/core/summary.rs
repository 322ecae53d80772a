//! Report totals and currency display.
//!
//! Totals are computed at full `f64` precision. Rounding only happens in
//! [`format_inr`], for display.

use crate::core::filter::{Filter, FilteredView};

/// Totals of a filtered report
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Summary {
    /// Sum of filtered transaction amounts
    pub total_income: f64,
    /// Sum of filtered expense amounts
    pub total_expenses: f64,
    /// Income minus expenses, plus opening balances for all-time reports
    pub net_balance: f64,
}

/// Computes the totals of a filtered view.
///
/// Opening balances of the selected buildings are added to the net balance
/// only when `month` is [`Filter::All`].
#[must_use]
pub fn summarize(view: &FilteredView<'_>, month: &Filter<String>) -> Summary {
    let total_income: f64 = view.transactions.iter().map(|t| t.amount).sum();
    let total_expenses: f64 = view.expenses.iter().map(|e| e.amount).sum();

    let opening_balance: f64 = if month.is_all() {
        view.buildings.iter().map(|b| b.opening_balance).sum()
    } else {
        0.0
    };

    Summary {
        total_income,
        total_expenses,
        net_balance: total_income - total_expenses + opening_balance,
    }
}

/// Formats an amount as Indian rupees with no fractional digits, e.g. `₹1,23,456`.
///
/// Digits are grouped the Indian way: the last three together, then pairs.
/// Negative amounts get a leading minus sign (`-₹2,500`).
#[must_use]
pub fn format_inr(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{sign}₹{}", group_indian(&digits))
}

fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}
