//! Incremental search buffer.
//!
//! The host's input panel only reports whole-content change events, so every
//! keystroke has to be reconstructed from the difference between the last
//! panel text and the new one: a shrink of exactly one is a backspace, a
//! collapse to a single character is a select-all-and-type, a trailing tab is
//! a suggestion cycle, anything else appends. The buffer owns the typed
//! text, the suggestion list, and the highlighted index; the session loop
//! owns everything else.
//!
//! Redraws initiated by us come back as one echo change event each; callers
//! mark every redraw with [`SearchBuffer::expect_echo`] and the matching
//! number of following change events is swallowed.

use baton_core::suggest::Suggestion;

/// Prefixed to the highlighted suggestion's name in the panel.
pub const SUGGESTION_MARKER: &str = "→";

const DECORATION_PREFIX: &str = " (Suggestions[TAB to select]: ";
const DECORATION_SUFFIX: &str = ")";

pub struct SearchBuffer {
    typed: String,
    last_content: String,
    /// Change events still owed to redraws we issued ourselves.
    pending_echoes: usize,
    selected: Option<usize>,
    suggestions: Vec<Suggestion>,
    min_query_len: usize,
}

/// What one content-change event produced.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChangeOutcome {
    /// Query to hand to the fetcher, present only when the typed text is
    /// long enough.
    pub query: Option<String>,
    /// New panel content, when the panel needs a redraw.
    pub redraw: Option<String>,
}

impl SearchBuffer {
    pub fn new(min_query_len: usize) -> Self {
        Self {
            typed: String::new(),
            last_content: String::new(),
            // The session opens the panel with one initial redraw.
            pending_echoes: 1,
            selected: None,
            suggestions: Vec::new(),
            min_query_len,
        }
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn suggestions(&self) -> &[Suggestion] {
        &self.suggestions
    }

    /// A redraw we issued will come back as one more echo change event.
    pub fn expect_echo(&mut self) {
        self.pending_echoes += 1;
    }

    /// Replace the typed text verbatim. Used when suggestions are disabled
    /// and the panel is a plain input field.
    pub fn set_typed(&mut self, content: &str) {
        self.typed = content.to_string();
    }

    /// Apply one content-change event from the host.
    pub fn on_change(&mut self, content: &str) -> ChangeOutcome {
        if self.pending_echoes > 0 {
            self.pending_echoes -= 1;
            return ChangeOutcome::default();
        }

        // Select-all plus delete: start over.
        if content.is_empty() {
            self.typed.clear();
            self.suggestions.clear();
            self.selected = None;
            return self.finish(None);
        }

        let last_len = self.last_content.chars().count();
        let content_len = content.chars().count();
        let new_c = newly_typed(content);

        let mut tabbed = false;
        if last_len == content_len + 1 {
            self.typed.pop();
        } else if last_len > 0 && content_len == 1 {
            // Select-all plus a typed character.
            self.typed = content.to_string();
        } else if new_c == Some('\t') {
            tabbed = true;
        } else if let Some(c) = new_c {
            self.typed.push(c);
        }

        let typed_len = self.typed.chars().count();
        let query = (typed_len > self.min_query_len).then(|| self.typed.clone());

        // Too short to have produced the suggestions on display.
        if typed_len < self.min_query_len {
            self.suggestions.clear();
        }

        if tabbed && !self.suggestions.is_empty() {
            self.selected = Some(match self.selected {
                None => 0,
                Some(i) => (i + 1) % self.suggestions.len(),
            });
        }
        if !tabbed {
            self.selected = None;
        }

        self.finish(query)
    }

    /// Take a freshly fetched suggestion list. Returns the new panel text,
    /// unless the typed text has meanwhile shrunk below the threshold or the
    /// list is the one already on display (refetches of a coalesced query
    /// must not disturb the highlight).
    pub fn absorb_suggestions(&mut self, suggestions: Vec<Suggestion>) -> Option<String> {
        if self.typed.chars().count() < self.min_query_len {
            self.suggestions.clear();
            return None;
        }
        if suggestions == self.suggestions {
            return None;
        }
        self.suggestions = suggestions;
        self.selected = None;
        let text = self.panel_text();
        self.last_content = text.clone();
        Some(text)
    }

    /// Resolve the committed text to `(query, key)`: the highlighted
    /// suggestion when the marker is present, the raw typed text otherwise.
    pub fn resolve_commit(&self, final_text: &str) -> (String, Option<String>) {
        if final_text.contains(SUGGESTION_MARKER) {
            if let Some(s) = self.selected.and_then(|i| self.suggestions.get(i)) {
                return (s.name.clone(), Some(s.key.clone()));
            }
        }
        (self.typed.clone(), None)
    }

    /// Display columns left for suggestion names in a panel of the given
    /// width.
    pub fn suggestion_budget(&self, panel_width: usize) -> usize {
        panel_width
            .saturating_sub(self.typed.chars().count())
            .saturating_sub(DECORATION_PREFIX.len() + DECORATION_SUFFIX.len())
            .saturating_sub(2)
    }

    pub fn panel_text(&self) -> String {
        if self.suggestions.is_empty() {
            return self.typed.clone();
        }
        let mut names: Vec<String> = self.suggestions.iter().map(|s| s.name.clone()).collect();
        if let Some(i) = self.selected {
            names[i] = format!("{SUGGESTION_MARKER}{}", names[i]);
        }
        format!(
            "{}{}{}{}",
            self.typed,
            DECORATION_PREFIX,
            names.join(", "),
            DECORATION_SUFFIX
        )
    }

    fn finish(&mut self, query: Option<String>) -> ChangeOutcome {
        let text = self.panel_text();
        self.last_content = text.clone();
        ChangeOutcome {
            query,
            redraw: Some(text),
        }
    }
}

/// The newly typed character sits at the end of the portion before the
/// suggestion decoration.
fn newly_typed(content: &str) -> Option<char> {
    content
        .split(" (Suggestions")
        .next()
        .unwrap_or(content)
        .chars()
        .last()
}
