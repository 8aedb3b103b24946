//! User-facing failure notices raised by the client core.

use std::fmt;

use tracing::{debug, warn};

/// Closed set of notices the client raises for terminal failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// 403 responses
    Forbidden,
    /// 404 responses
    NotFound,
    /// 5xx responses
    ServerError,
    /// No response at all
    Network,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::Forbidden => "Access denied",
            Notice::NotFound => "Resource not found",
            Notice::ServerError => "Server error. Please try again later.",
            Notice::Network => "Network error. Please check your connection.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Receives notices from the client. The application shell decides how to
/// present them.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Logs notices. Used when no shell-specific notifier is installed.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        warn!(?notice, "{}", notice.message());
    }
}

/// Drops notices, logging them at debug. For calls whose failure the shell
/// handles on its own.
#[derive(Debug, Default, Clone, Copy)]
pub struct QuietNotifier;

impl Notifier for QuietNotifier {
    fn notify(&self, notice: Notice) {
        debug!(?notice, "Notice suppressed");
    }
}
