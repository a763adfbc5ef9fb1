use std::io;
use std::path::PathBuf;

use lettre::address::AddressError;
use thiserror::Error;

use crate::email::RelayFailure;
use crate::notifier::SessionState;

/// Every condition that stops a notification run.
///
/// The `Display` text is meant for log records. Console diagnostics are
/// rendered separately by `notifier::report`.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("configuration file {} not found", .path.display())]
    ConfigMissing { path: PathBuf },

    #[error("configuration file {} could not be read: {source}", .path.display())]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    // Position only; the parser message can quote configuration values
    #[error(
        "configuration file {} is not valid JSON (line {}, column {})",
        .path.display(),
        .source.line(),
        .source.column()
    )]
    ConfigMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration is missing required field(s): {}", .missing.join(", "))]
    ConfigIncomplete { missing: Vec<&'static str> },

    #[error("invalid {field} address {value:?}: {source}")]
    InvalidAddress {
        field: &'static str,
        value: String,
        #[source]
        source: AddressError,
    },

    #[error("failed to build the notification message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("relay rejected the credentials: {0}")]
    Authentication(RelayFailure),

    #[error("session failed while entering {stage}: {failure}")]
    Unclassified {
        stage: SessionState,
        failure: RelayFailure,
    },
}

impl NotifyError {
    /// True when the run stopped before any network connection was opened
    pub fn is_pre_network(&self) -> bool {
        !matches!(
            self,
            NotifyError::Authentication(_) | NotifyError::Unclassified { .. }
        )
    }
}
