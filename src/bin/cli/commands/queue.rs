use chrono::NaiveDate;
use clap::Args;
use recall::dto::QueueQueryDto;

use crate::client::RecallClient;
use crate::output::{self, OutputConfig};

/// Options shared by anything that builds a queue
#[derive(Args, Debug, Clone)]
pub struct QueueArgs {
    /// "all", "overdue", "today", or a course ID
    #[clap(long)]
    pub filter: Option<String>,
    /// Measure "due" against this date (YYYY-MM-DD); today if omitted
    #[clap(long)]
    pub as_of: Option<NaiveDate>,
    /// Maximum number of items
    #[clap(long)]
    pub limit: Option<usize>,
}

impl From<QueueArgs> for QueueQueryDto {
    fn from(args: QueueArgs) -> Self {
        QueueQueryDto {
            filter: args.filter,
            as_of: args.as_of,
            limit: args.limit,
        }
    }
}

/// Options for the dashboard counts
#[derive(Args, Debug, Clone)]
pub struct CountsArgs {
    /// Measure "due" against this date (YYYY-MM-DD); today if omitted
    #[clap(long)]
    pub as_of: Option<NaiveDate>,
}

/// Prints the learner's due queue
pub async fn execute_queue(
    client: &RecallClient,
    args: QueueArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let items = client.get_queue(&args.into()).await?;
    output::print_review_items(&items, config);
    Ok(())
}

/// Prints the overdue, today and upcoming counts
pub async fn execute_counts(
    client: &RecallClient,
    args: CountsArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let counts = client.get_counts(args.as_of).await?;
    output::print_counts(&counts, config);
    Ok(())
}
