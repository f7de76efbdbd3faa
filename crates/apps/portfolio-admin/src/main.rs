//! portfolio-admin - command-line admin for portfolio contact messages
//!
//! Submits messages the way the contact form does, and gives the site owner
//! the admin view: review, reply, delete, export.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use std::path::PathBuf;

mod app;

use app::AdminApp;
use contacts::{ContactStatus, ExportFormat};

#[derive(Parser)]
#[command(name = "portfolio-admin", about = "Manage portfolio contact messages")]
struct Cli {
    /// Directory holding contact data (defaults to the platform data dir)
    #[arg(long, env = "PORTFOLIO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose debug output (can also set RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a contact message
    Submit {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Open a notification email to this address afterwards
        #[arg(long, env = "PORTFOLIO_NOTIFY_EMAIL")]
        notify_to: Option<String>,
    },

    /// Start an admin session
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "PORTFOLIO_ADMIN_LOGIN_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// End the admin session
    Logout,

    /// Show whether an admin session is active
    Status,

    /// List messages, newest first
    List {
        /// Case-insensitive match on name, email or subject
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one message in full
    Show { id: String },

    /// Mark a message as replied
    Reply { id: String },

    /// Delete a message
    Delete { id: String },

    /// Delete every message
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },

    /// Export messages to a dated CSV file
    Export {
        #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
        format: FormatArg,
        /// Destination directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Show message counts
    Stats,

    /// Open a notification email for a message
    Notify {
        id: String,
        #[arg(long, env = "PORTFOLIO_NOTIFY_EMAIL")]
        to: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Replied,
}

impl From<StatusArg> for ContactStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => ContactStatus::Pending,
            StatusArg::Replied => ContactStatus::Replied,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Excel,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => ExportFormat::Csv,
            FormatArg::Excel => ExportFormat::Excel,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let app = AdminApp::open(cli.data_dir)?;

    match cli.command {
        Commands::Submit {
            name,
            email,
            subject,
            message,
            notify_to,
        } => app.submit(name, email, subject, message, notify_to.as_deref()),
        Commands::Login { username, password } => app.login(&username, &password),
        Commands::Logout => {
            app.logout();
            Ok(())
        }
        Commands::Status => {
            app.status();
            Ok(())
        }
        Commands::List {
            search,
            status,
            json,
        } => app.list(search.as_deref(), status.map(Into::into), json),
        Commands::Show { id } => app.show(&id),
        Commands::Reply { id } => app.reply(&id),
        Commands::Delete { id } => app.delete(&id),
        Commands::Clear { yes } => app.clear(yes),
        Commands::Export { format, out } => app.export(format.into(), &out),
        Commands::Stats => app.stats(),
        Commands::Notify { id, to } => app.notify(&id, &to),
    }
}
