use chrono::NaiveDate;
use clap::Subcommand;
use recall::models::{ItemStatus, SourceType};

use crate::client::RecallClient;
use crate::output::{self, OutputConfig};

/// Review item management commands
#[derive(Subcommand, Debug)]
pub enum ItemCommands {
    /// Register a wrong answer or flashcard for review
    Register {
        /// "wrong_note" or "flashcard"
        #[clap(long)]
        source_type: SourceType,
        /// The ID of the wrong-answer note or flashcard
        #[clap(long)]
        source_id: String,
        /// The course to file the item under
        #[clap(long)]
        course: Option<String>,
    },
    /// Get a specific review item by ID
    Get {
        /// The review item ID
        id: String,
    },
    /// List review items
    List {
        /// Only list items with this status ("active" or "suspended")
        #[clap(long)]
        status: Option<ItemStatus>,
    },
    /// Stop an item from appearing in queues
    Suspend {
        /// The review item ID
        id: String,
    },
    /// Put a suspended item back into rotation
    Resume {
        /// The review item ID
        id: String,
    },
    /// Show where each rating would send an item
    Preview {
        /// The review item ID
        id: String,
        /// Preview as of this date (YYYY-MM-DD); today if omitted
        #[clap(long)]
        as_of: Option<NaiveDate>,
    },
}

/// Executes a review item command
pub async fn execute(
    client: &RecallClient,
    cmd: ItemCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        ItemCommands::Register { source_type, source_id, course } => {
            let item = client.register_item(source_type, source_id, course).await?;
            output::print_review_item(&item, config);
        }
        ItemCommands::Get { id } => {
            let item = client.get_item(&id).await?;
            output::print_review_item(&item, config);
        }
        ItemCommands::List { status } => {
            let items = client.list_items(status).await?;
            output::print_review_items(&items, config);
        }
        ItemCommands::Suspend { id } => {
            let item = client.set_item_status(&id, ItemStatus::Suspended).await?;
            output::print_review_item(&item, config);
        }
        ItemCommands::Resume { id } => {
            let item = client.set_item_status(&id, ItemStatus::Active).await?;
            output::print_review_item(&item, config);
        }
        ItemCommands::Preview { id, as_of } => {
            let previews = client.preview_item(&id, as_of).await?;
            output::print_previews(&previews, config);
        }
    }
    Ok(())
}
