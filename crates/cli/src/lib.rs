pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::resolve::ResolveArgs;

#[derive(Debug, Parser)]
#[command(
    name = "jarvis",
    about = "Jarvis operator CLI",
    long_about = "Inspect configuration, apply migrations and dry-run the Spanish date/intent pipeline.",
    after_help = "Examples:\n  jarvis config\n  jarvis migrate\n  jarvis resolve \"reunión mañana a las 15:00\" --now 2026-03-04T09:15"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate {
        #[arg(long, help = "Database URL overriding configuration")]
        database_url: Option<String>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Resolve date, time and intent for a message and print JSON")]
    Resolve {
        #[arg(help = "Message text as a user would send it")]
        text: String,
        #[arg(long, help = "Local reference time, YYYY-MM-DDTHH:MM (defaults to now)")]
        now: Option<String>,
        #[arg(long, help = "IANA timezone (defaults to assistant.timezone)")]
        timezone: Option<String>,
        #[arg(long, help = "Simulate a pending meeting awaiting `date` or `time`")]
        awaiting: Option<String>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate { database_url } => commands::migrate::run(database_url),
        Command::Config => commands::config::run(),
        Command::Resolve { text, now, timezone, awaiting } => {
            commands::resolve::run(ResolveArgs { text, now, timezone, awaiting })
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
