//! Interactive browsing.
//!
//! Each input line either sets the search term or is a `:command`. State
//! updates from the controller are printed as they arrive.

use std::str::FromStr;

use anyhow::Result;
use chrono::NaiveDate;
use menfess_core::{
    FilterUpdate, HttpSearchController, PageError, SearchField, SearchState, SearchStatus,
    SortOrder,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::render;

const HELP: &str = "\
Type a name to search for it. Commands:
  :from | :to          match sender or recipient
  :newest | :oldest    sort order
  :date YYYY-MM-DD     only that day (:date alone clears it)
  :page N | :next | :prev
  :refresh             send the current search again
  :reload              clear results and search again
  :clear               clear term and date
  :help | :quit";

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Term(String),
    Field(SearchField),
    Sort(SortOrder),
    Date(Option<NaiveDate>),
    Page(u32),
    Next,
    Previous,
    Refresh,
    Reload,
    Clear,
    Help,
    Quit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(Self::Term(line.to_string()));
        };

        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, arg)| (name, arg.trim()));

        match name {
            "from" | "to" => name.parse().map(Self::Field),
            "newest" | "oldest" => name.parse().map(Self::Sort),
            "date" if arg.is_empty() => Ok(Self::Date(None)),
            "date" => NaiveDate::parse_from_str(arg, "%Y-%m-%d")
                .map(|date| Self::Date(Some(date)))
                .map_err(|e| format!("bad date {arg:?}: {e}")),
            "page" => arg
                .parse()
                .map(Self::Page)
                .map_err(|_| format!("bad page number {arg:?}")),
            "next" => Ok(Self::Next),
            "prev" => Ok(Self::Previous),
            "refresh" => Ok(Self::Refresh),
            "reload" => Ok(Self::Reload),
            "clear" => Ok(Self::Clear),
            "help" => Ok(Self::Help),
            "quit" | "q" => Ok(Self::Quit),
            other => Err(format!("unknown command :{other} (try :help)")),
        }
    }
}

/// Runs the browse loop until `:quit` or end of input.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(controller: &HttpSearchController) -> Result<()> {
    println!("{HELP}");

    let mut updates = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    controller.refresh();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Input>() {
                    Ok(Input::Quit) => break,
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(input) => {
                        if let Err(e) = apply(controller, input) {
                            println!("{e}");
                        }
                    }
                    Err(e) => println!("{e}"),
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                show(&state);
            }
        }
    }

    debug!("leaving browse loop");
    controller.shutdown();
    Ok(())
}

fn apply(controller: &HttpSearchController, input: Input) -> Result<(), PageError> {
    match input {
        Input::Term(term) => controller.on_filter_change(FilterUpdate::term(term)),
        Input::Field(field) => {
            controller.on_filter_change(FilterUpdate::default().with_search_field(field))
        }
        Input::Sort(order) => {
            controller.on_filter_change(FilterUpdate::default().with_sort_order(order))
        }
        Input::Date(date) => controller.on_filter_change(FilterUpdate::default().with_date(date)),
        Input::Page(page) => controller.go_to_page(page),
        Input::Next => controller.next_page(),
        Input::Previous => controller.previous_page(),
        Input::Refresh => {
            controller.refresh();
            Ok(())
        }
        Input::Reload => {
            controller.fresh_search();
            Ok(())
        }
        Input::Clear => {
            controller.on_filter_change(FilterUpdate::term("").with_date(None))
        }
        Input::Help | Input::Quit => Ok(()),
    }
}

fn show(state: &SearchState) {
    println!("{}", render::status(state));
    if state.status == SearchStatus::Success {
        if let Some(page) = state.page() {
            println!("{}\n", render::page(page));
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Input {
        line.parse().unwrap()
    }

    #[test]
    fn test_plain_text_is_term() {
        assert_eq!(parse("  Dinda "), Input::Term("Dinda".to_string()));
    }

    #[test]
    fn test_field_and_sort() {
        assert_eq!(parse(":from"), Input::Field(SearchField::Sender));
        assert_eq!(parse(":to"), Input::Field(SearchField::Recipient));
        assert_eq!(parse(":oldest"), Input::Sort(SortOrder::Oldest));
    }

    #[test]
    fn test_date() {
        assert_eq!(
            parse(":date 2024-05-01"),
            Input::Date(NaiveDate::from_ymd_opt(2024, 5, 1))
        );
        assert_eq!(parse(":date"), Input::Date(None));
        assert!(":date 01/05/2024".parse::<Input>().is_err());
    }

    #[test]
    fn test_paging() {
        assert_eq!(parse(":page 3"), Input::Page(3));
        assert_eq!(parse(":next"), Input::Next);
        assert_eq!(parse(":prev"), Input::Previous);
        assert!(":page x".parse::<Input>().is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = ":bogus".parse::<Input>().unwrap_err();
        assert!(err.contains(":bogus"));
    }
}
