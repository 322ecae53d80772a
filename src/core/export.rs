//! Spreadsheet export of a report.
//!
//! Exporting is split in three steps:
//! 1. [`build_sheets`] turns the report into plain rows (pure, easy to test);
//! 2. [`render_workbook`] serializes those rows into `.xlsx` bytes in memory;
//! 3. [`save_workbook`] writes the bytes to a temporary file and renames it
//!    into place.
//!
//! Any failure aborts the whole export. Because the file only appears through
//! the final rename, a failed export never leaves a partial workbook behind.

use crate::{
    core::{
        due::is_paid,
        filter::ReportFilters,
        ledger::LedgerItem,
        snapshot::DataSnapshot,
        summary::Summary,
    },
    entities::{due, member},
    errors::{Error, Result},
};
use chrono::{DateTime, FixedOffset, Utc};
use rust_xlsxwriter::{Format, Workbook};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

/// Placeholder for missing dates and unresolved references
pub const NOT_AVAILABLE: &str = "N/A";

/// Name of the totals sheet
pub const SUMMARY_SHEET: &str = "Summary";
/// Name of the combined ledger sheet
pub const LEDGER_SHEET: &str = "Income and Expense";
/// Name of the dues sheet
pub const DUES_SHEET: &str = "Dues";

const SUMMARY_HEADERS: &[&str] = &["Category", "Amount"];
const LEDGER_HEADERS: &[&str] = &[
    "Date", "Building", "Type", "Category", "Details", "Member", "Amount",
];
const DUES_HEADERS: &[&str] = &[
    "Due Date",
    "Payment Date",
    "Member",
    "Building",
    "Type",
    "Title",
    "Status",
    "Amount",
];

/// A single spreadsheet cell
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Text cell
    Text(String),
    /// Numeric cell
    Number(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A worksheet as header plus rows
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    /// Worksheet name
    pub name: &'static str,
    /// Column headers
    pub headers: &'static [&'static str],
    /// Data rows, one cell per header
    pub rows: Vec<Vec<Cell>>,
}

/// Id-to-name lookups used to print names instead of ids.
///
/// Lookups are total: an unknown or missing id resolves to [`NOT_AVAILABLE`].
#[derive(Debug, Default)]
pub struct Lookups<'a> {
    buildings: HashMap<&'a str, &'a str>,
    members: HashMap<&'a str, &'a member::Model>,
}

impl<'a> Lookups<'a> {
    /// Indexes every building and member of the snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &'a DataSnapshot) -> Self {
        Self {
            buildings: snapshot
                .buildings
                .iter()
                .map(|b| (b.id.as_str(), b.building_name.as_str()))
                .collect(),
            members: snapshot
                .members
                .iter()
                .map(|m| (m.id.as_str(), m))
                .collect(),
        }
    }

    /// Building name, or `"N/A"`
    #[must_use]
    pub fn building_name(&self, building_id: &str) -> &'a str {
        self.buildings
            .get(building_id)
            .copied()
            .unwrap_or(NOT_AVAILABLE)
    }

    /// Member name, or `"N/A"` when there is no member or it is unknown
    #[must_use]
    pub fn member_name(&self, member_id: Option<&str>) -> &'a str {
        member_id
            .and_then(|id| self.members.get(id))
            .map_or(NOT_AVAILABLE, |m| m.full_name.as_str())
    }
}

/// Formats a date as `dd/mm/yyyy` in the report offset, or `"N/A"`.
#[must_use]
pub fn format_date(date: Option<&DateTime<Utc>>, offset: &FixedOffset) -> String {
    date.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |d| d.with_timezone(offset).format("%d/%m/%Y").to_string(),
    )
}

/// File name for an export: `BuildingWise_Report_<building>_<month>.xlsx`.
///
/// Path separators in the selectors are replaced so the name stays a single
/// path component.
#[must_use]
pub fn report_file_name(filters: &ReportFilters) -> String {
    let clean = |s: &str| s.replace(['/', '\\'], "_");
    format!(
        "BuildingWise_Report_{}_{}.xlsx",
        clean(filters.building.selector()),
        clean(filters.month.selector())
    )
}

/// Builds the Summary, Income and Expense, and Dues sheets, in that order.
#[must_use]
pub fn build_sheets(
    summary: &Summary,
    ledger: &[LedgerItem],
    dues: &[&due::Model],
    lookups: &Lookups<'_>,
    offset: &FixedOffset,
) -> [Sheet; 3] {
    [
        summary_sheet(summary),
        ledger_sheet(ledger, lookups, offset),
        dues_sheet(dues, lookups, offset),
    ]
}

fn summary_sheet(summary: &Summary) -> Sheet {
    Sheet {
        name: SUMMARY_SHEET,
        headers: SUMMARY_HEADERS,
        rows: vec![
            vec!["Total Income".into(), summary.total_income.into()],
            vec!["Total Expenses".into(), summary.total_expenses.into()],
            vec!["Net Balance".into(), summary.net_balance.into()],
        ],
    }
}

fn ledger_sheet(ledger: &[LedgerItem], lookups: &Lookups<'_>, offset: &FixedOffset) -> Sheet {
    let rows = ledger
        .iter()
        .map(|item| {
            vec![
                format_date(item.date.as_ref(), offset).into(),
                lookups.building_name(&item.building_id).into(),
                item.kind.as_str().into(),
                item.category.clone().into(),
                item.details.clone().into(),
                lookups.member_name(item.member_id.as_deref()).into(),
                item.amount.into(),
            ]
        })
        .collect();

    Sheet {
        name: LEDGER_SHEET,
        headers: LEDGER_HEADERS,
        rows,
    }
}

fn dues_sheet(dues: &[&due::Model], lookups: &Lookups<'_>, offset: &FixedOffset) -> Sheet {
    let rows = dues
        .iter()
        .map(|due| {
            // A stray payment date on an unpaid due is not printed
            let payment_date = if is_paid(due) {
                format_date(due.payment_date.as_ref(), offset)
            } else {
                NOT_AVAILABLE.to_string()
            };

            vec![
                format_date(due.due_date.as_ref(), offset).into(),
                payment_date.into(),
                lookups.member_name(Some(&due.member_id)).into(),
                lookups.building_name(&due.building_id).into(),
                due.due_type.clone().into(),
                due.title.clone().into(),
                due.status.clone().into(),
                due.amount.into(),
            ]
        })
        .collect();

    Sheet {
        name: DUES_SHEET,
        headers: DUES_HEADERS,
        rows,
    }
}

/// Serializes sheets into an in-memory `.xlsx` workbook.
pub fn render_workbook(sheets: &[Sheet]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name)?;

        for (col, header) in sheet.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, column(col)?, *header, &header_format)?;
        }

        for (index, cells) in sheet.rows.iter().enumerate() {
            let row = u32::try_from(index + 1).map_err(|_| Error::Export {
                message: format!("Sheet '{}' has too many rows", sheet.name),
            })?;
            for (col, cell) in cells.iter().enumerate() {
                match cell {
                    Cell::Text(text) => {
                        worksheet.write_string(row, column(col)?, text.as_str())?;
                    }
                    Cell::Number(value) => {
                        worksheet.write_number(row, column(col)?, *value)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index).map_err(|_| Error::Export {
        message: format!("Column index {index} out of range"),
    })
}

/// Writes workbook bytes to `dir/file_name` without ever exposing a partial file.
///
/// # Returns
/// Path of the written file
pub fn save_workbook(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let target = dir.join(file_name);
    let partial = dir.join(format!(".{file_name}.partial"));

    if let Err(e) = fs::write(&partial, bytes).and_then(|()| fs::rename(&partial, &target)) {
        // Best effort; the partial file may not exist
        let _ = fs::remove_file(&partial);
        return Err(e.into());
    }

    Ok(target)
}

/// Builds, renders and saves a workbook; every failure becomes [`Error::Export`].
pub fn export_workbook(
    sheets: &[Sheet],
    dir: &Path,
    file_name: &str,
) -> Result<PathBuf> {
    let result = render_workbook(sheets).and_then(|bytes| save_workbook(dir, file_name, &bytes));

    match result {
        Ok(path) => {
            tracing::info!("Exported report to {}", path.display());
            Ok(path)
        }
        Err(e) => {
            tracing::error!("Report export failed: {e}");
            Err(match e {
                Error::Export { .. } => e,
                other => Error::Export {
                    message: other.to_string(),
                },
            })
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    #![allow(clippy::panic)]
    use super::*;
    use crate::entities::{expense, transaction};
    use crate::core::{
        filter::Filter,
        ledger::{EntryKind, combine},
    };
    use crate::test_utils::*;

    fn snapshot() -> DataSnapshot {
        DataSnapshot {
            buildings: vec![building_model("b1", 0.0)],
            members: vec![member_model("m1", "b1", "Asha Rao")],
            ..DataSnapshot::default()
        }
    }

    fn text(cell: &Cell) -> &str {
        match cell {
            Cell::Text(t) => t,
            Cell::Number(_) => panic!("expected text cell, got {cell:?}"),
        }
    }

    #[test]
    fn test_summary_sheet_rows() {
        let summary = Summary {
            total_income: 2000.0,
            total_expenses: 500.0,
            net_balance: 2500.0,
        };
        let snapshot = snapshot();
        let sheets = build_sheets(&summary, &[], &[], &Lookups::from_snapshot(&snapshot), &ist());

        let names: Vec<&str> = sheets.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Summary", "Income and Expense", "Dues"]);

        let summary_sheet = &sheets[0];
        assert_eq!(summary_sheet.headers, &["Category", "Amount"]);
        assert_eq!(
            summary_sheet.rows,
            vec![
                vec![Cell::from("Total Income"), Cell::Number(2000.0)],
                vec![Cell::from("Total Expenses"), Cell::Number(500.0)],
                vec![Cell::from("Net Balance"), Cell::Number(2500.0)],
            ]
        );
    }

    #[test]
    fn test_ledger_rows_resolve_names() {
        let snapshot = snapshot();
        let mut paid = transaction_model("t1", "b1", 2000.0, None, Some(utc(2025, 10, 5)));
        paid.member_id = Some("m1".to_string());
        let mut orphan = transaction_model("t2", "b-gone", 100.0, None, None);
        orphan.member_id = Some("m-gone".to_string());
        let no_expenses: Vec<expense::Model> = Vec::new();
        let ledger = combine([&paid, &orphan], &no_expenses);

        let sheets = build_sheets(
            &Summary::default(),
            &ledger,
            &[],
            &Lookups::from_snapshot(&snapshot),
            &ist(),
        );
        let rows = &sheets[1].rows;

        assert_eq!(sheets[1].headers.len(), 7);
        assert_eq!(text(&rows[0][0]), "05/10/2025");
        assert_eq!(text(&rows[0][1]), "Test Building b1");
        assert_eq!(text(&rows[0][2]), EntryKind::Income.as_str());
        assert_eq!(text(&rows[0][3]), "Maintenance");
        assert_eq!(text(&rows[0][5]), "Asha Rao");
        assert_eq!(rows[0][6], Cell::Number(2000.0));

        // Unknown building and member fall back to N/A, no date prints N/A
        assert_eq!(text(&rows[1][0]), "N/A");
        assert_eq!(text(&rows[1][1]), "N/A");
        assert_eq!(text(&rows[1][5]), "N/A");
    }

    #[test]
    fn test_expense_rows_have_no_member() {
        let snapshot = snapshot();
        let expense = expense_model("e1", "b1", 500.0, Some(utc(2025, 10, 12)));
        let no_transactions: Vec<transaction::Model> = Vec::new();
        let ledger = combine(&no_transactions, [&expense]);
        let sheets = build_sheets(
            &Summary::default(),
            &ledger,
            &[],
            &Lookups::from_snapshot(&snapshot),
            &ist(),
        );

        assert_eq!(text(&sheets[1].rows[0][2]), "expense");
        assert_eq!(text(&sheets[1].rows[0][5]), "N/A");
    }

    #[test]
    fn test_unpaid_due_hides_stray_payment_date() {
        let snapshot = snapshot();
        let unpaid = due_model("d1", "b1", "m1", "unpaid", Some(utc(2025, 9, 1)));
        let paid = due_model("d2", "b1", "m1", "paid", Some(utc(2025, 9, 1)));
        let sheets = build_sheets(
            &Summary::default(),
            &[],
            &[&unpaid, &paid],
            &Lookups::from_snapshot(&snapshot),
            &ist(),
        );
        let rows = &sheets[2].rows;

        assert_eq!(sheets[2].headers[1], "Payment Date");
        assert_eq!(text(&rows[0][1]), "N/A");
        assert_eq!(text(&rows[1][1]), "01/09/2025");
        assert_eq!(text(&rows[0][2]), "Asha Rao");
        assert_eq!(text(&rows[0][6]), "unpaid");
        assert_eq!(rows[0][7], Cell::Number(unpaid.amount));
    }

    #[test]
    fn test_report_file_name() {
        let filters = ReportFilters {
            building: Filter::Only("b1".to_string()),
            month: Filter::Only("October 2025".to_string()),
        };
        assert_eq!(
            report_file_name(&filters),
            "BuildingWise_Report_b1_October 2025.xlsx"
        );
        assert_eq!(
            report_file_name(&ReportFilters::default()),
            "BuildingWise_Report_all_all.xlsx"
        );
        let odd = ReportFilters {
            building: Filter::Only("a/b".to_string()),
            month: Filter::All,
        };
        assert_eq!(report_file_name(&odd), "BuildingWise_Report_a_b_all.xlsx");
    }

    #[test]
    fn test_export_workbook_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = snapshot();
        let sheets = build_sheets(
            &Summary::default(),
            &[],
            &[],
            &Lookups::from_snapshot(&snapshot),
            &ist(),
        );

        let path = export_workbook(&sheets, dir.path(), "report.xlsx").unwrap();
        assert_eq!(path, dir.path().join("report.xlsx"));

        let bytes = fs::read(&path).unwrap();
        // xlsx files are zip archives
        assert_eq!(&bytes[..2], b"PK");

        let leftovers: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(leftovers.len(), 1);
    }

    #[test]
    fn test_export_failure_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let snapshot = snapshot();
        let sheets = build_sheets(
            &Summary::default(),
            &[],
            &[],
            &Lookups::from_snapshot(&snapshot),
            &ist(),
        );

        let result = export_workbook(&sheets, &missing, "report.xlsx");
        assert!(matches!(result, Err(Error::Export { .. })));
        assert!(!missing.join("report.xlsx").exists());
    }

    #[test]
    fn test_invalid_sheet_name_aborts_export() {
        let dir = tempfile::tempdir().unwrap();
        let sheets = [Sheet {
            name: "Bad/Name",
            headers: &["A"],
            rows: Vec::new(),
        }];

        let result = export_workbook(&sheets, dir.path(), "report.xlsx");
        assert!(matches!(result, Err(Error::Export { .. })));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
