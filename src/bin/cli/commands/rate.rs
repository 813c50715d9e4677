use clap::Args;
use recall::models::{LegacyRating, Rating};

use crate::client::RecallClient;
use crate::output::{self, OutputConfig};

/// Options for rating a single item
#[derive(Args, Debug, Clone)]
pub struct RateArgs {
    /// The review item ID
    pub id: String,
    /// know, confused, forgot or again (with --legacy: know, unsure or forgot)
    pub rating: String,
    /// Use the three-outcome dashboard vocabulary
    #[clap(long)]
    pub legacy: bool,
}

/// Rates one item outside of a session
///
/// The rating is checked locally first so a typo never reaches the server.
pub async fn execute(
    client: &RecallClient,
    args: RateArgs,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let item = if args.legacy {
        let rating = args.rating.parse::<LegacyRating>()?;
        client.rate_item_legacy(&args.id, rating.to_string()).await?
    } else {
        let rating = args.rating.parse::<Rating>()?;
        client.rate_item(&args.id, rating.to_string()).await?
    };

    output::print_review_item(&item, config);
    Ok(())
}
