use thiserror::Error;

/// Workspace-wide error type.
///
/// Control-surface failures deliberately do not appear here: an unresponsive
/// or empty surface reply is an unknown state, not an error, and callers fall
/// back to safe defaults instead of propagating.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised once, at surface construction, never mid-flow.
    #[error("unsupported platform \"{0}\": the control surface requires AppleScript")]
    UnsupportedPlatform(&'static str),

    #[error("catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The catalog replied, but its envelope `status` was not `"ok"`.
    #[error("catalog returned status \"{0}\"")]
    ApiStatus(String),

    #[error("malformed catalog response: {0}")]
    Malformed(String),
}
