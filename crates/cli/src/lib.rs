pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "shoplens",
    about = "Shoplens operator CLI",
    long_about = "Operate the Shoplens analytics database and run reports over it.",
    after_help = "Examples:\n  shoplens migrate\n  shoplens seed\n  shoplens report --pretty"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct DatabaseArgs {
    #[arg(
        long,
        env = "SHOPLENS_DATABASE_URL",
        default_value = "sqlite://shoplens.db?mode=rwc",
        help = "SQLite database URL"
    )]
    database_url: String,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate {
        #[command(flatten)]
        database: DatabaseArgs,
    },
    #[command(about = "Load the demo dataset, replacing rows that share its keys")]
    Seed {
        #[command(flatten)]
        database: DatabaseArgs,
    },
    #[command(about = "Run every analyzer over the current data and print the report as JSON")]
    Report {
        #[command(flatten)]
        database: DatabaseArgs,
        #[arg(long, help = "Analytics config TOML path; defaults to $SHOPLENS_CONFIG, then ./Shoplens.toml")]
        config: Option<PathBuf>,
        #[arg(long, help = "Analyze as of this RFC 3339 instant instead of now")]
        as_of: Option<String>,
        #[arg(long, help = "Pretty-print the report JSON")]
        pretty: bool,
    },
    #[command(about = "Print the effective analytics configuration as JSON")]
    Config {
        #[arg(long, help = "Analytics config TOML path; defaults to $SHOPLENS_CONFIG, then ./Shoplens.toml")]
        config: Option<PathBuf>,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate { database } => commands::migrate::run(&database.database_url),
        Command::Seed { database } => commands::seed::run(&database.database_url),
        Command::Report { database, config, as_of, pretty } => {
            commands::report::run(&database.database_url, config.as_deref(), as_of.as_deref(), pretty)
        }
        Command::Config { config } => commands::config::run(config.as_deref()),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
