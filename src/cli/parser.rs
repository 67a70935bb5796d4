use crate::export::{ExportFormat, ExportWhat};
use clap::{Parser, Subcommand};

/// Command-line interface definition for rattend
/// Geofenced attendance tracking backed by SQLite
#[derive(Parser)]
#[command(
    name = "rattend",
    version = env!("CARGO_PKG_VERSION"),
    about = "A geofenced attendance tracker: check in and out of assigned worksites, manage sites, rosters and logs",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Inspect the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Validate the configuration values")]
        check: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Company registration
    Company {
        #[command(subcommand)]
        action: CompanyAction,
    },

    /// Sign up as an employee of an existing company
    Signup {
        #[arg(long, help = "Company id, e.g. ACME1234")]
        company: String,

        #[arg(long)]
        username: String,

        #[arg(long, default_value = "")]
        contact: String,

        #[arg(long)]
        passcode: Option<String>,
    },

    /// Confirm the pending account with its verification code
    Verify { code: String },

    /// Sign in (employees need a fresh position inside their site)
    Login {
        username: String,

        #[arg(long)]
        passcode: Option<String>,
    },

    /// Sign out, checking out first when checked in
    Logout,

    /// Check in at the assigned site
    Checkin,

    /// Check out
    Checkout {
        #[arg(long, help = "Reason recorded in the company log")]
        reason: Option<String>,
    },

    /// Current position handling
    Position {
        #[command(subcommand)]
        action: PositionAction,
    },

    /// Worksites of the managed company
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },

    /// Employee roster of the managed company
    Employee {
        #[command(subcommand)]
        action: EmployeeAction,
    },

    /// Show the dashboard
    Status,

    /// Show the location history of yourself or one of your employees
    History { user: Option<String> },

    /// Show the company activity log
    Logs,

    /// Replay a position feed through the tracker
    Track {
        #[arg(
            long,
            value_name = "FILE",
            help = "Feed file, '-' for stdin. Lines: [<rfc3339>] <lat> <lng> | [<rfc3339>] error <code>"
        )]
        feed: String,
    },

    /// Create a backup copy of the database
    Backup {
        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long)]
        compress: bool,

        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Export company logs or location history
    Export {
        #[arg(long, value_enum)]
        what: ExportWhat,

        #[arg(long, help = "Employee whose history to export (managers only)")]
        user: Option<String>,

        #[arg(long, value_enum, default_value = "csv")]
        format: ExportFormat,

        #[arg(long, value_name = "FILE")]
        file: String,

        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum CompanyAction {
    /// Register a new company and its manager account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        manager: String,

        #[arg(long, default_value = "")]
        contact: String,

        #[arg(long)]
        passcode: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum PositionAction {
    /// Use a manual position
    Set {
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        #[arg(allow_negative_numbers = true)]
        lng: f64,
    },

    /// Forget the last known position
    Clear,

    /// Print the last known position
    Show,

    /// One-shot lookup through a position feed
    Locate {
        #[arg(long, value_name = "FILE")]
        feed: String,
    },
}

#[derive(Subcommand)]
pub enum SiteAction {
    /// Create a site at the current position
    Create { name: String },

    /// Move a site to the current position
    Relocate { site_id: String },

    /// List sites
    List,
}

#[derive(Subcommand)]
pub enum EmployeeAction {
    /// Register or re-assign an employee
    Add {
        username: String,

        #[arg(long, default_value = "")]
        contact: String,

        #[arg(long, help = "Assigned site id")]
        site: Option<String>,

        #[arg(long)]
        passcode: Option<String>,
    },

    /// Remove an employee and delete the account
    Remove { username: String },

    /// List the roster
    List,
}
