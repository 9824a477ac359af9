//! Command-line arguments.

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use menfess_core::{Config, FilterUpdate, SearchField, SortOrder};

#[derive(Debug, Parser)]
#[command(name = "menfess")]
#[command(version)]
#[command(about = "Search anonymous menfess messages and the songs attached to them", long_about = None)]
pub struct Cli {
    /// Search service endpoint, overriding config and environment.
    #[arg(long, global = true)]
    pub search_url: Option<String>,

    /// Records per page.
    #[arg(long, global = true)]
    pub page_size: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Applies command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.search_url {
            config.search_url.clone_from(url);
        }
        if let Some(size) = self.page_size {
            config.page_size = size;
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one search and print the page
    Search(SearchArgs),
    /// Browse interactively, searching as you type
    Browse,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Name to look for
    pub term: Option<String>,

    /// Match against the sender ("from") or recipient ("to")
    #[arg(long, short, default_value_t = SearchField::Recipient)]
    pub field: SearchField,

    /// Only messages from this day (YYYY-MM-DD)
    #[arg(long, short)]
    pub date: Option<NaiveDate>,

    /// "newest" or "oldest"
    #[arg(long, short, default_value_t = SortOrder::Newest)]
    pub sort: SortOrder,

    /// Page to fetch
    #[arg(long, short, default_value_t = 1)]
    pub page: u32,

    /// Print the page as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// Filter criteria selected by these arguments.
    pub fn to_update(&self) -> FilterUpdate {
        FilterUpdate::term(self.term.clone().unwrap_or_default())
            .with_search_field(self.field)
            .with_date(self.date)
            .with_sort_order(self.sort)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "menfess", "search", "Dinda", "--field", "to", "--date", "2024-05-01", "--sort",
            "oldest", "--page", "2",
        ])
        .unwrap();
        let Command::Search(args) = &cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.term.as_deref(), Some("Dinda"));
        assert_eq!(args.field, SearchField::Recipient);
        assert_eq!(args.sort, SortOrder::Oldest);
        assert_eq!(args.page, 2);
        assert_eq!(args.date, NaiveDate::from_ymd_opt(2024, 5, 1));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["menfess", "search"]).unwrap();
        let Command::Search(args) = &cli.command else {
            panic!("expected search");
        };
        assert_eq!(args.field, SearchField::Recipient);
        assert_eq!(args.sort, SortOrder::Newest);
        assert_eq!(args.page, 1);
        assert!(!args.json);
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from(["menfess", "browse", "--page-size", "25"]).unwrap();
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.page_size, 25);
        assert!(matches!(cli.command, Command::Browse));
    }

    #[test]
    fn test_bad_field_rejected() {
        assert!(Cli::try_parse_from(["menfess", "search", "--field", "cc"]).is_err());
    }
}
