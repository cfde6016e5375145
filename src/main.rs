// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

// Use library instead of local modules
use erp_finance::{format_brl, render, ReportKind, ReportOutput, Settings, Tabular};

#[derive(Parser)]
#[command(name = "erp-finance", version, about = "Financial reports over the ERP finance database.")]
struct Cli {
    /// SQLite database to read (overrides ERP_FINANCE_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List the available reports.
    Menu,
    /// Print one report.
    Report {
        /// Report slug or menu label, e.g. top-clients
        report: ReportKind,
        /// Reference date for the monthly comparison (default: today)
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Browse the reports interactively (default).
    Ui,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

fn main() -> Result<()> {
    init_tracing();
    let settings = Settings::from_env();

    let cli = Cli::parse();
    let db_path = cli.db.unwrap_or(settings.database_path);

    match cli.command.unwrap_or(Command::Ui) {
        Command::Menu => print_menu(),
        Command::Report { report, today, format } => {
            let today = today.unwrap_or_else(|| Local::now().date_naive());
            run_report(&db_path, report, today, format)?;
        }
        Command::Ui => run_ui_mode(&db_path)?,
    }

    Ok(())
}

const DEFAULT_LOG_FILTER: &str = "info";

fn init_tracing() {
    // stderr keeps stdout clean for report output
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

fn print_menu() {
    for (i, kind) in ReportKind::ALL.iter().enumerate() {
        println!("{:>2}. {:<20} {}", i + 1, kind.slug(), kind.title());
    }
}

fn run_report(db_path: &Path, kind: ReportKind, today: NaiveDate, format: OutputFormat) -> Result<()> {
    let output = render(db_path, kind, today)
        .with_context(|| format!("failed to render report `{kind}` from {}", db_path.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Csv => {
            Tabular::from(&output).write_csv(io::stdout().lock())?;
        }
        OutputFormat::Table => {
            println!("{}", kind.heading());
            println!("{}\n", "━".repeat(kind.heading().chars().count()));

            if let ReportOutput::RevenueVsExpense(comparison) = &output {
                println!("Período: {} a {}", comparison.window.start, comparison.window.end);
                println!("Total de Receitas no Mês: {}", format_brl(comparison.revenue));
                println!("Total de Despesas no Mês: {}", format_brl(comparison.expense));
                return Ok(());
            }

            let table = Tabular::from(&output);
            if table.is_empty() {
                println!("(sem registros)");
            } else {
                print!("{}", table.to_text());
            }
        }
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(db_path: &Path) -> Result<()> {
    if !db_path.exists() {
        anyhow::bail!(
            "database not found at {} (set ERP_FINANCE_DB or pass --db)",
            db_path.display()
        );
    }

    let mut app = ui::App::new(db_path.to_path_buf(), Local::now().date_naive());
    ui::run_ui(&mut app)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_db_path: &Path) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or print a report: erp-finance report top-clients");
    std::process::exit(1);
}
