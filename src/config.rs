use clap::Args;
use std::path::PathBuf;

/// Where data and logs live. Flags override the environment.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// File path to the SQLite database holding the transactions.
    #[arg(long, env = "XTRACK_DB_PATH", default_value = "expense_tracker.db", global = true)]
    pub db_path: PathBuf,

    /// File the application log is appended to.
    #[arg(long, env = "XTRACK_LOG_FILE", default_value = "xtrack.log", global = true)]
    pub log_file: PathBuf,
}
