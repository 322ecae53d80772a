use buildingwise::{
    config::{actor::operator_from_env, database, settings},
    core::{
        audit, building, export, ingest,
        filter::ReportFilters,
        report::{self, Report},
        snapshot::load_snapshot,
        summary::format_inr,
    },
    errors::Result,
};
use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Building maintenance ledger and reports
#[derive(Debug, Parser)]
#[command(name = "buildingwise", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace stored records with a JSON document export
    Import {
        /// Path to the JSON export
        path: PathBuf,
    },
    /// Print income, expense and net balance totals
    Summary(FilterArgs),
    /// Print the combined income and expense ledger, newest first
    Ledger(FilterArgs),
    /// List month labels that have transactions
    Months {
        /// Building id, or "all"
        #[arg(long, default_value = "all")]
        building: String,
    },
    /// Write the three-sheet spreadsheet report
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output directory; defaults to the configured export directory
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List buildings with their opening balances
    Buildings,
    /// Show the most recent audit entries
    Audit {
        /// Number of entries to show
        #[arg(long, default_value_t = 20)]
        limit: u64,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// Building id, or "all"
    #[arg(long, default_value = "all")]
    building: String,
    /// Month label such as "October 2025", matched exactly, or "all"
    #[arg(long, default_value = "all")]
    month: String,
}

impl FilterArgs {
    fn filters(&self) -> ReportFilters {
        ReportFilters::from_selectors(&self.building, &self.month)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();
    let cli = Cli::parse();

    let settings = settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    let offset = settings.report.utc_offset()?;

    let db = database::create_connection(&settings.database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    database::create_tables(&db).await?;

    if let Err(e) = building::seed_buildings(&db, &settings.buildings).await {
        warn!("Skipping building seeds: {e}");
    }

    let actor = operator_from_env();
    info!("Acting as {} ({})", actor.id, actor.role);

    match cli.command {
        Command::Import { path } => {
            let snapshot = ingest::read_documents(&path)?;
            let counts = ingest::import_snapshot(&db, &actor, &snapshot).await?;
            println!(
                "Imported {} buildings, {} members, {} transactions, {} expenses, {} dues",
                counts.buildings, counts.members, counts.transactions, counts.expenses, counts.dues
            );
        }
        Command::Summary(args) => {
            let snapshot = load_snapshot(&db).await;
            let report = report::generate_report(&snapshot, args.filters(), offset);
            print_unavailable(&report);
            println!("Building: {}", report.filters.building);
            println!("Month:    {}", report.filters.month);
            println!("Total Income:   {}", format_inr(report.summary.total_income));
            println!("Total Expenses: {}", format_inr(report.summary.total_expenses));
            println!("Net Balance:    {}", format_inr(report.summary.net_balance));
        }
        Command::Ledger(args) => {
            let snapshot = load_snapshot(&db).await;
            let report = report::generate_report(&snapshot, args.filters(), offset);
            print_unavailable(&report);
            print_ledger(&report);
        }
        Command::Months { building } => {
            let snapshot = load_snapshot(&db).await;
            let filters = ReportFilters::from_selectors(&building, "all");
            let report = report::generate_report(&snapshot, filters, offset);
            print_unavailable(&report);
            for month in &report.available_months {
                println!("{month}");
            }
        }
        Command::Export { filters, out } => {
            let snapshot = load_snapshot(&db).await;
            let report = report::generate_report(&snapshot, filters.filters(), offset);
            print_unavailable(&report);
            let dir = out.unwrap_or_else(|| settings.report.export_dir.clone());
            let path = report::export_report(&report, &dir)?;
            println!("Report written to {}", path.display());
        }
        Command::Buildings => {
            for b in building::list_buildings(&db).await? {
                println!(
                    "{}  {}  opening balance {}",
                    b.id,
                    b.building_name,
                    format_inr(b.opening_balance)
                );
            }
        }
        Command::Audit { limit } => {
            for entry in audit::list_recent(&db, limit).await? {
                println!(
                    "{}  {:<12}  {:<22}  {:<12}  {}  {}",
                    entry.created_at.with_timezone(&offset).format("%d/%m/%Y %H:%M"),
                    entry.actor_id,
                    entry.action,
                    entry.entity,
                    entry.entity_id,
                    entry.details.as_deref().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}

fn print_unavailable(report: &Report<'_>) {
    for collection in report.unavailable() {
        eprintln!("warning: {collection} could not be loaded and were treated as empty");
    }
}

fn print_ledger(report: &Report<'_>) {
    let lookups = export::Lookups::from_snapshot(report.snapshot);
    for item in &report.ledger {
        println!(
            "{:<10}  {:<20}  {:<7}  {:<16}  {:<24}  {:<16}  {:>12}",
            export::format_date(item.date.as_ref(), &report.offset),
            lookups.building_name(&item.building_id),
            item.kind.as_str(),
            item.category,
            item.details,
            lookups.member_name(item.member_id.as_deref()),
            format_inr(item.signed_amount()),
        );
    }
}
