//! Platform abstraction traits for editor side effects.
//!
//! These traits define the interface between the editor logic and the host
//! (browser, native UI, tests): clipboard writes and user notifications.

/// Error type for platform operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// Completion callback for a clipboard write.
pub type ClipboardDone = Box<dyn FnOnce(Result<(), PlatformError>)>;

/// Platform clipboard.
///
/// Writes are fire-and-forget: they may settle after `write_text` returns,
/// are not cancellable, and never block further editing. `done` must be
/// called exactly once.
pub trait ClipboardPlatform {
    fn write_text(&self, text: &str, done: ClipboardDone);
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// `count` entries were copied to the clipboard.
    Copied { count: usize },
    /// An operation was refused or failed.
    Rejected(crate::EditorError),
}

/// Sink for user-visible notices (toasts, status bar, ...).
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        match notice {
            Notice::Copied { count } => tracing::info!(count, "copied to clipboard"),
            Notice::Rejected(e) => tracing::warn!(error = %e, "operation rejected"),
        }
    }
}
