//! The narrow contract this plugin needs from the hosting editor.
//!
//! All methods are called from the session event loop, one at a time; the
//! host adapter is expected to marshal them onto whatever thread its widgets
//! live on, and to feed user callbacks back through a `SearchHandle`.

/// One row in the host's quick-choice menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuRow {
    pub title: String,
    pub detail: String,
}

impl MenuRow {
    pub fn new(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: detail.into(),
        }
    }
}

pub trait EditorHost: Send + 'static {
    /// Redraw the search input panel with the given content. The host will
    /// echo this back as a content-change callback.
    fn redraw_input(&mut self, content: &str);

    /// Usable width of the input panel, in character cells.
    fn input_width(&self) -> usize;

    /// Show a quick-choice menu; the host reports the picked row (or a
    /// dismissal) through the session handle.
    fn show_menu(&mut self, rows: &[MenuRow]);

    /// Blocking error dialog.
    fn show_error(&mut self, message: &str);

    /// The editor's tab-completion preference, if it exposes one. The
    /// session turns it off while open so TAB reaches the suggestion cycle,
    /// and restores it on commit/cancel.
    fn tab_completion(&self) -> Option<bool>;
    fn set_tab_completion(&mut self, enabled: bool);
}
