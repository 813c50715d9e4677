use clap::Subcommand;
use recall::models::{Rating, ReviewItem};
use recall::session::SessionView;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::RecallClient;
use crate::commands::queue::QueueArgs;
use crate::output::{self, OutputConfig, OutputFormat};

/// Review session commands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Walk through the due queue, rating one item at a time
    Run {
        #[clap(flatten)]
        queue: QueueArgs,
    },
}

fn show_item(item: &ReviewItem, position: usize, total: usize) {
    println!();
    println!("[{}/{}] {} {} (box {})", position, total, item.get_source_type(), item.get_source_id(), item.get_box());
    print!("Rating [know/confused/forgot/again, q to quit]: ");
    // a failed flush only delays the prompt
    let _ = std::io::stdout().flush();
}

/// Executes a session command
pub async fn execute(
    client: &RecallClient,
    cmd: SessionCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        SessionCommands::Run { queue } => run(client, queue, config).await,
    }
}

async fn run(
    client: &RecallClient,
    queue: QueueArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut view: SessionView = client.start_session(&queue.into()).await?;
    if view.total == 0 {
        output::print_success("Nothing is due.", config);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(item) = view.current_item.clone() {
        show_item(&item, view.total - view.remaining + 1, view.total);

        let Some(line) = lines.next_line().await? else {
            client.abandon_session(&view.id).await?;
            println!();
            output::print_success("Session abandoned.", config);
            return Ok(());
        };

        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            client.abandon_session(&view.id).await?;
            output::print_success("Session abandoned; ratings so far are kept.", config);
            return Ok(());
        }

        let rating = match answer.parse::<Rating>() {
            Ok(rating) => rating,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };

        match client.rate_session_item(&view.id, rating.to_string()).await {
            Ok(response) => {
                if matches!(config.format, OutputFormat::Human) && !config.quiet {
                    println!(
                        "-> box {}, next review {}",
                        response.item.get_box(),
                        response.item.get_next_review_at()
                    );
                }
                view = response.session;
            }
            // the session stays on this item, so the learner can try again
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    if let Some(summary) = view.summary {
        output::print_session_summary(&summary, config);
    }
    Ok(())
}
