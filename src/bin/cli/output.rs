use clap::ValueEnum;
use recall::models::{ReviewItem, ReviewSummaryCounts};
use recall::scheduler::RatingPreview;
use recall::summary::SessionSummary;
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

/// Prints a value as pretty JSON
fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to encode output: {}", e),
    }
}

/// Prints a list of review items in the specified format
pub fn print_review_items(items: &[ReviewItem], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("No review items found.");
                }
                return;
            }
            if config.quiet {
                for item in items {
                    println!("{}", item.get_id());
                }
                return;
            }
            let max_id = items.iter().map(|i| i.get_id().len()).max().unwrap_or(2);
            let max_source = items
                .iter()
                .map(|i| i.get_source_type().as_str().len() + 1 + i.get_source_id().len())
                .max()
                .unwrap_or(6)
                .max(6);
            println!(
                "{:<id_w$}  {:<src_w$}  BOX  DUE         STATUS",
                "ID",
                "SOURCE",
                id_w = max_id,
                src_w = max_source,
            );
            for item in items {
                println!(
                    "{:<id_w$}  {:<src_w$}  {:<3}  {}  {}",
                    item.get_id(),
                    format!("{}:{}", item.get_source_type(), item.get_source_id()),
                    item.get_box(),
                    item.get_next_review_at(),
                    item.get_status(),
                    id_w = max_id,
                    src_w = max_source,
                );
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Prints a single review item in the specified format
pub fn print_review_item(item: &ReviewItem, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", item.get_id());
                return;
            }
            println!("ID:            {}", item.get_id());
            println!("Source:        {} {}", item.get_source_type(), item.get_source_id());
            if let Some(course_id) = item.get_course_id() {
                println!("Course:        {}", course_id);
            }
            println!("Box:           {}", item.get_box());
            println!("Next review:   {}", item.get_next_review_at());
            match item.get_last_reviewed_at() {
                Some(reviewed) => println!("Last reviewed: {}", reviewed),
                None => println!("Last reviewed: never"),
            }
            println!("Status:        {}", item.get_status());
        }
        OutputFormat::Json => print_json(item),
    }
}

/// Prints the dashboard counts in the specified format
pub fn print_counts(counts: &ReviewSummaryCounts, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", counts.overdue_count + counts.today_count);
                return;
            }
            println!("Overdue:  {}", counts.overdue_count);
            println!("Today:    {}", counts.today_count);
            println!("Upcoming: {}", counts.upcoming_count);
            println!("Active:   {}", counts.total_active);
        }
        OutputFormat::Json => print_json(counts),
    }
}

/// Prints rating previews in the specified format
pub fn print_previews(previews: &[RatingPreview], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for preview in previews {
                println!(
                    "{:<9} -> box {}, due {}",
                    preview.rating.as_str(),
                    preview.outcome.new_box,
                    preview.outcome.next_review_at,
                );
            }
        }
        OutputFormat::Json => print_json(previews),
    }
}

/// Prints an end-of-session summary in the specified format
pub fn print_session_summary(summary: &SessionSummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", summary.rollover_count);
                return;
            }
            println!("Session complete: {} reviewed", summary.total);
            println!("  know:     {}", summary.know);
            println!("  confused: {}", summary.confused);
            println!("  forgot:   {}", summary.forgot);
            println!("  again:    {}", summary.again);
            println!("Coming back soon: {}", summary.rollover_count);
        }
        OutputFormat::Json => print_json(summary),
    }
}

/// Prints a success message
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({"message": message})),
    }
}
