//! ScamGuard CLI - scam protection from your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{demo, login, logout, otp, report, verify, whoami};

/// ScamGuard - check suspicious messages and report scam numbers
#[derive(Parser)]
#[command(name = "sg", version, about, long_about = None)]
struct Cli {
    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-time code operations
    Otp {
        #[command(subcommand)]
        command: otp::OtpCommands,
    },

    /// Sign in with a one-time code
    Login {
        /// Phone number to sign in with
        phone: String,
        /// Code received by SMS (prompted for if omitted)
        #[arg(long)]
        code: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and forget the saved session
    Logout,

    /// Check a screenshot or photo for scam patterns
    VerifyImage {
        /// Path to the image (JPEG, PNG, GIF or WebP)
        image: PathBuf,
        /// What the image is about, e.g. who sent it
        #[arg(short, long)]
        description: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report a phone number as suspicious
    Report {
        /// The suspicious phone number
        phone: String,
        /// Why the number is suspicious
        reason: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage demo mode
    Demo {
        #[command(subcommand)]
        command: Option<demo::DemoCommands>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so `--json` output stays clean
///
/// `SCAMGUARD_LOG` takes an env-filter directive; `-v` forces debug.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("scamguard_core=debug")
    } else {
        EnvFilter::try_from_env("SCAMGUARD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Otp { command } => otp::run(command).await,
        Commands::Login { phone, code, json } => login::run(&phone, code, json).await,
        Commands::Whoami { json } => whoami::run(json),
        Commands::Logout => logout::run(),
        Commands::VerifyImage { image, description, json } => {
            verify::run(image, description.as_deref(), json).await
        }
        Commands::Report { phone, reason, json } => report::run(&phone, &reason, json).await,
        Commands::Demo { command } => demo::run(command),
    }
}
