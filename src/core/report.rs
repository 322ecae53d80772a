//! Report generation - runs the filter, combine and aggregate stages.
//!
//! A [`Report`] borrows from the [`DataSnapshot`] it was generated from and is
//! recomputed from scratch whenever the filters change. Nothing is cached.

use crate::{
    core::{
        export::{self, Lookups},
        filter::{self, Filter, FilteredView, ReportFilters},
        ledger::{self, LedgerItem},
        snapshot::{Collection, DataSnapshot},
        summary::{self, Summary},
    },
    errors::Result,
};
use chrono::FixedOffset;
use std::path::{Path, PathBuf};

/// A fully derived report for one set of filters
#[derive(Debug, Clone)]
pub struct Report<'a> {
    /// Snapshot the report was derived from
    pub snapshot: &'a DataSnapshot,
    /// Filters applied
    pub filters: ReportFilters,
    /// Offset used for month labels and printed dates
    pub offset: FixedOffset,
    /// Records that passed the filters
    pub view: FilteredView<'a>,
    /// Combined income/expense ledger, newest first
    pub ledger: Vec<LedgerItem>,
    /// Totals
    pub summary: Summary,
    /// Month labels selectable for the current building filter, newest first
    pub available_months: Vec<String>,
}

impl Report<'_> {
    /// Collections missing from the underlying snapshot
    #[must_use]
    pub fn unavailable(&self) -> &[Collection] {
        &self.snapshot.unavailable
    }
}

/// Derives a report from a snapshot.
#[must_use]
pub fn generate_report<'a>(
    snapshot: &'a DataSnapshot,
    filters: ReportFilters,
    offset: FixedOffset,
) -> Report<'a> {
    let view = filter::apply_filters(snapshot, &filters, &offset);
    let ledger = ledger::combine(view.transactions.iter().copied(), view.expenses.iter().copied());
    let summary = summary::summarize(&view, &filters.month);

    // Months offered to the user ignore the month filter itself
    let month_source = ReportFilters {
        building: filters.building.clone(),
        month: Filter::All,
    };
    let available_months = filter::available_months(
        filter::apply_filters(snapshot, &month_source, &offset).transactions,
    );

    for collection in &snapshot.unavailable {
        tracing::warn!("Report generated without {collection}");
    }

    Report {
        snapshot,
        filters,
        offset,
        view,
        ledger,
        summary,
        available_months,
    }
}

/// Exports a report as `BuildingWise_Report_<building>_<month>.xlsx` in `dir`.
pub fn export_report(report: &Report<'_>, dir: &Path) -> Result<PathBuf> {
    let lookups = Lookups::from_snapshot(report.snapshot);
    let sheets = export::build_sheets(
        &report.summary,
        &report.ledger,
        &report.view.dues,
        &lookups,
        &report.offset,
    );
    export::export_workbook(&sheets, dir, &export::report_file_name(&report.filters))
}
