use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use crate::utils::errors::NotifyError;
use crate::utils::logging::format_sensitive;

/// Configuration document as written on disk.
///
/// Keys other than these three are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RawConfig {
    // Sender address, also used as the SMTP login
    pub email: Option<String>,
    // SMTP password
    pub password: Option<String>,
    // Optional recipient; the sender receives the test when absent
    pub receiver_email: Option<String>,
}

/// Validated credentials for one notification run
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub sender_address: String,
    pub password: String,
    pub receiver_address: String,
    // True when receiver_address was filled in from sender_address
    pub receiver_defaulted: bool,
}

impl Credentials {
    /// Load and validate credentials from a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, NotifyError> {
        debug!("Reading configuration from {}", path.display());

        let bytes = fs::read(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => NotifyError::ConfigMissing {
                path: path.to_path_buf(),
            },
            _ => NotifyError::ConfigUnreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let raw: RawConfig =
            serde_json::from_slice(&bytes).map_err(|e| NotifyError::ConfigMalformed {
                path: path.to_path_buf(),
                source: e,
            })?;

        Self::from_raw(raw)
    }

    /// Check required fields and resolve the receiver
    pub fn from_raw(raw: RawConfig) -> Result<Self, NotifyError> {
        let sender_address = non_empty(raw.email);
        let password = non_empty(raw.password);

        let (sender_address, password) = match (sender_address, password) {
            (Some(sender), Some(password)) => (sender, password),
            (sender, password) => {
                let mut missing = Vec::new();
                if sender.is_none() {
                    missing.push("email");
                }
                if password.is_none() {
                    missing.push("password");
                }
                return Err(NotifyError::ConfigIncomplete { missing });
            }
        };

        let (receiver_address, receiver_defaulted) = match non_empty(raw.receiver_email) {
            Some(receiver) => (receiver, false),
            None => {
                info!(
                    "No receiver configured, defaulting to sender {}",
                    format_sensitive(&sender_address)
                );
                (sender_address.clone(), true)
            }
        };

        Ok(Self {
            sender_address,
            password,
            receiver_address,
            receiver_defaulted,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("sender_address", &self.sender_address)
            .field("password", &"<redacted>")
            .field("receiver_address", &self.receiver_address)
            .field("receiver_defaulted", &self.receiver_defaulted)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
