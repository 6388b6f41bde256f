//! Suggestion-list building: remote order preserved, exact duplicates
//! dropped, bounded by the display width available in the input panel.

use unicode_width::UnicodeWidthStr;

use crate::catalog::ResultRow;
use crate::entity::EntityKind;

/// One (display name, catalog key) suggestion pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    pub key: String,
}

/// Build the suggestion list from remote result rows.
///
/// Rows are taken in the order the remote ranked them; only artist, album,
/// and track rows with non-empty names qualify; exact `(name, key)`
/// duplicates are dropped. Accepting stops once the comma-joined display
/// would exceed `budget` columns; the overflowing entry is dropped whole,
/// never clipped.
pub fn build_suggestions(rows: &[ResultRow], budget: usize) -> Vec<Suggestion> {
    let mut suggestions: Vec<Suggestion> = Vec::new();
    for row in rows {
        if EntityKind::from_type_tag(&row.kind).is_none() || row.name.is_empty() {
            continue;
        }
        let candidate = Suggestion {
            name: row.name.clone(),
            key: row.key.clone(),
        };
        if suggestions.contains(&candidate) {
            continue;
        }
        suggestions.push(candidate);
        if joined_names(&suggestions).width() > budget {
            suggestions.pop();
            break;
        }
    }
    suggestions
}

/// The comma-joined display text for a suggestion list.
pub fn joined_names(suggestions: &[Suggestion]) -> String {
    suggestions
        .iter()
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
