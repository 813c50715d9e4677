mod client;
mod commands;
mod output;

use clap::{Parser, Subcommand};
use client::RecallClient;
use output::{OutputConfig, OutputFormat};
use recall::config;
use std::process;

/// CLI for the Recall review scheduler
#[derive(Parser, Debug)]
#[clap(name = "recall-cli", about = "CLI for the Recall review scheduler")]
struct Cli {
    /// Server URL to connect to
    #[clap(long, env = "RECALL_URL", global = true)]
    server_url: Option<String>,

    /// The learner to act as
    #[clap(long, env = "RECALL_OWNER", global = true)]
    owner: Option<String>,

    /// Output format
    #[clap(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    format: OutputFormat,

    /// Quiet mode: minimal output (just IDs or counts)
    #[clap(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage review items
    #[command(subcommand)]
    Item(commands::item::ItemCommands),
    /// Show the due queue
    Queue(commands::queue::QueueArgs),
    /// Show overdue, today and upcoming counts
    Counts(commands::queue::CountsArgs),
    /// Rate a single item
    Rate(commands::rate::RateArgs),
    /// Run review sessions
    #[command(subcommand)]
    Session(commands::session::SessionCommands),
}

/// Resolves the server URL from CLI args, config file, or defaults
///
/// Precedence: CLI flag / env var > config file > default
fn resolve_server_url(cli_url: Option<String>) -> String {
    if let Some(url) = cli_url {
        return url;
    }

    if let Some(dir) = config::get_config_dir_path() {
        let config_path = dir.join("config.toml");
        if let Ok(update) = config::config_from_file(Some(config_path)) {
            if let Some(url) = update.server_url {
                return url;
            }
        }
    }

    "http://localhost:3000".to_string()
}

/// Formats an error for human-readable stderr output
fn format_error(err: &dyn std::error::Error) -> String {
    let err_string = err.to_string();

    if err_string.contains("error sending request")
        || err_string.contains("connection refused")
        || err_string.contains("Connection refused")
        || err_string.contains("tcp connect error")
    {
        return format!(
            "Could not connect to server. Is recall running?\n  {}",
            err_string
        );
    }

    err_string
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(owner) = cli.owner else {
        eprintln!("Error: no learner given; pass --owner or set RECALL_OWNER");
        process::exit(2);
    };

    let client = RecallClient::new(resolve_server_url(cli.server_url), owner);
    let output_config = OutputConfig {
        format: cli.format,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Commands::Item(cmd) => commands::item::execute(&client, cmd, &output_config).await,
        Commands::Queue(args) => commands::queue::execute_queue(&client, args, &output_config).await,
        Commands::Counts(args) => commands::queue::execute_counts(&client, args, &output_config).await,
        Commands::Rate(args) => commands::rate::execute(&client, args, &output_config).await,
        Commands::Session(cmd) => commands::session::execute(&client, cmd, &output_config).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", format_error(e.as_ref()));
        process::exit(1);
    }
}
