//! Plain-text rendering of search state.

use std::fmt::Write;

use menfess_core::{EnrichedRecord, Page, SearchState, SearchStatus};

/// Longest message excerpt shown per record.
const EXCERPT_CHARS: usize = 120;

/// Renders one record as a short block.
pub fn record(item: &EnrichedRecord) -> String {
    let record = &item.record;
    let mut out = format!(
        "#{} {} -> {}  ({})\n  {}",
        record.id,
        record.sender,
        record.recipient,
        record.created_at.format("%Y-%m-%d %H:%M"),
        excerpt(&record.message),
    );
    if let Some(track) = &item.track {
        let _ = write!(out, "\n  ♪ {} - {}", track.title, track.artist);
    }
    out
}

/// Renders a page with a footer line.
pub fn page(page: &Page) -> String {
    if page.items.is_empty() {
        return "No messages found.".to_string();
    }

    let mut out = String::new();
    for item in &page.items {
        out.push_str(&record(item));
        out.push_str("\n\n");
    }
    let _ = write!(
        out,
        "Page {} of {} ({} messages){}{}",
        page.current_page,
        page.total_pages.max(1),
        page.total_items,
        if page.has_previous() { "  :prev" } else { "" },
        if page.has_next() { "  :next" } else { "" },
    );
    out
}

/// One-line status summary.
pub fn status(state: &SearchState) -> String {
    let filter = &state.filter;
    let mut out = format!("[{}] {}", label(state.status), filter.search_field);
    if !filter.term.trim().is_empty() {
        let _ = write!(out, "={}", filter.term.trim());
    }
    if let Some(date) = filter.date {
        let _ = write!(out, " on {date}");
    }
    let _ = write!(out, ", {} first", filter.sort_order);
    if let Some(error) = &state.error {
        let _ = write!(out, "\n  error: {error}");
    }
    out
}

const fn label(status: SearchStatus) -> &'static str {
    match status {
        SearchStatus::Idle => "idle",
        SearchStatus::Debouncing => "typing",
        SearchStatus::Loading => "loading",
        SearchStatus::Success => "ok",
        SearchStatus::Error => "error",
    }
}

fn excerpt(message: &str) -> String {
    let flat = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(EXCERPT_CHARS).collect();
    cut.push('…');
    cut
}
