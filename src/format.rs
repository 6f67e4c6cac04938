//! Plain-text rendering of provider results.
//!
//! Output is fully determined by the input records and the full-text flag,
//! so the same response always renders to the same bytes.

use crate::exa::ResultRecord;

/// Rendered when there is nothing to show.
pub const NO_RESULTS: &str = "No results found.";

/// Placed between two rendered records.
pub const SECTION_SEPARATOR: &str = "\n\n---------------------------------\n\n";

/// Number of characters of page text shown in a preview.
pub const PREVIEW_CHARS: usize = 500;

/// Appended to every full-text preview.
pub const TRUNCATION_MARKER: &str = "... [text truncated]";

const NO_TITLE: &str = "No title";

/// Render `records` as one numbered section each.
///
/// Page text is only included when `include_full_text` is set, and then
/// only as a [`PREVIEW_CHARS`]-character preview.
pub fn format_results(records: &[ResultRecord], include_full_text: bool) -> String {
    if records.is_empty() {
        return NO_RESULTS.to_string();
    }

    records
        .iter()
        .enumerate()
        .map(|(i, record)| format_record(i + 1, record, include_full_text))
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

fn format_record(index: usize, record: &ResultRecord, include_full_text: bool) -> String {
    let mut lines = vec![
        format!("[{index}] {}", present(&record.title).unwrap_or(NO_TITLE)),
        format!("URL: {}", record.url),
    ];

    if let Some(date) = present(&record.published_date) {
        lines.push(format!("Published: {date}"));
    }
    if let Some(author) = present(&record.author) {
        lines.push(format!("Author: {author}"));
    }

    let highlights = record.highlights.as_deref().unwrap_or_default();
    if !highlights.is_empty() {
        lines.push("\nHighlights:".to_string());
        lines.extend(highlights.iter().map(|h| format!("  - {}", h.trim())));
    }

    if let Some(summary) = present(&record.summary) {
        lines.push("\nSummary:".to_string());
        lines.push(format!("  {summary}"));
    }

    if include_full_text {
        if let Some(text) = present(&record.text) {
            lines.push("\nFull Text (Preview):".to_string());
            lines.push(format!("  {}{TRUNCATION_MARKER}", preview(text)));
        }
    }

    lines.join("\n")
}

/// Empty strings count as missing.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
