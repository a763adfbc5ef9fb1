// First, declare the modules folder itself
mod modules;

// Re-export everything from modules for easier access
pub use modules::{config, email, notifier, utils};

// Re-export commonly used types
pub use modules::config::credentials::Credentials;
pub use modules::notifier::{Notifier, Outcome};
pub use modules::utils::errors::NotifyError;

// Constants
pub const CONFIG_FILE: &str = "config.json";
pub const SMTP_HOST: &str = "smtp.office365.com";
pub const SMTP_PORT: u16 = 587;
pub const SMTP_TIMEOUT_SECS: u64 = 60;
