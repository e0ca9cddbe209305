mod config;
mod db;
mod error;
mod format;
mod models;
mod operations;
mod store;
mod tui;

use clap::{Parser, Subcommand};
use config::Config;
use db::repository::SqliteRepository;
use error::AppError;
use models::category::Category;
use operations::form::DraftInput;
use operations::list::{ListView, SortDirection, SortField, TypeFilter};
use operations::summary::ChartMode;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use store::TransactionStore;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

/// Track income and expenses from the terminal.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the interactive dashboard (default).
    Dashboard,
    /// Record a new transaction.
    Add(DraftInput),
    /// Change fields of an existing transaction.
    Edit {
        id: String,
        #[command(flatten)]
        input: DraftInput,
    },
    /// Delete a transaction by id.
    Delete { id: String },
    /// Print transactions.
    List {
        #[arg(long = "type", value_enum, default_value_t = TypeFilter::All)]
        type_filter: TypeFilter,
        #[arg(long, value_enum, default_value_t = SortField::Date)]
        sort: SortField,
        /// Sort ascending instead of descending.
        #[arg(long)]
        asc: bool,
        #[arg(long)]
        category: Option<String>,
    },
    /// Print totals and the expense breakdown by category.
    Summary {
        #[arg(long, value_enum, default_value_t = ChartArg::Pie)]
        chart: ChartArg,
    },
    /// Import transactions from a CSV file: date,description,amount,type,category.
    Import { path: PathBuf },
    /// Print the known categories.
    Categories,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum ChartArg {
    Pie,
    Bar,
}

impl From<ChartArg> for ChartMode {
    fn from(value: ChartArg) -> Self {
        match value {
            ChartArg::Pie => ChartMode::Pie,
            ChartArg::Bar => ChartMode::Bar,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Command::Dashboard));

    if let Err(e) = setup_logging(&cli.config, interactive) {
        eprintln!("Could not open log file {}: {}", cli.config.log_file.display(), e);
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Logs go to a file since the dashboard owns the terminal. One-shot commands
/// also print warnings and errors to stderr.
fn setup_logging(config: &Config, interactive: bool) -> std::io::Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)?;

    let file_log = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Arc::new(log_file))
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    let stderr_log = (!interactive).then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter::LevelFilter::WARN)
    });

    tracing_subscriber::registry()
        .with(file_log)
        .with(stderr_log)
        .init();
    Ok(())
}

fn run(cli: Cli) -> Result<(), AppError> {
    let conn = db::connection::establish_connection(&cli.config.db_path)?;
    let mut store = TransactionStore::open(SqliteRepository::new(conn))?;

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Dashboard => tui::run_dashboard(&mut store)?,
        Command::Add(input) => {
            let id = operations::add::add_transaction(&mut store, input)?;
            println!("Transaction added: {}", id);
        }
        Command::Edit { id, input } => {
            operations::edit::edit_transaction(&mut store, &id, input)?;
            println!("Transaction updated.");
        }
        Command::Delete { id } => {
            if operations::remove::remove_transaction(&mut store, &id)? {
                println!("Transaction removed.");
            } else {
                println!("No transaction with id {}; nothing removed.", id.trim());
            }
        }
        Command::List {
            type_filter,
            sort,
            asc,
            category,
        } => {
            let view = ListView {
                type_filter,
                category,
                sort_field: sort,
                direction: if asc { SortDirection::Asc } else { SortDirection::Desc },
            };
            let rows = view.apply(store.transactions());
            print!("{}", operations::list::render_list(&rows));
        }
        Command::Summary { chart } => {
            print!(
                "{}",
                operations::summary::render_summary(store.transactions(), chart.into())
            );
        }
        Command::Import { path } => {
            let count = operations::import::import_csv_file(&mut store, &path)?;
            println!("Successfully imported {} transactions.", count);
        }
        Command::Categories => {
            for category in Category::ALL {
                println!("{:<16} {}  {}", category.key(), category.icon(), category.label());
            }
        }
    }

    Ok(())
}
