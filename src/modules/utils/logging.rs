use env_logger::{Builder, Env, Target, WriteStyle};
use log::{debug, info, warn};
use std::fs::OpenOptions;
use std::path::Path;

/// Initialize the logging system.
///
/// Records go to stderr unless `log_file` is given, in which case they are
/// appended to that file. `RUST_LOG` takes precedence over `verbose`.
pub fn initialize_logging(
    verbose: bool,
    log_file: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let default_level = if verbose { "debug" } else { "warn" };

    let target = match log_file {
        Some(path) => {
            // Create or append to log file
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Target::Pipe(Box::new(file))
        }
        None => Target::Stderr,
    };

    Builder::from_env(Env::default().default_filter_or(default_level))
        // Enable timestamps
        .format_timestamp_secs()
        // Enable module path in logs
        .format_module_path(true)
        // Set colored output for console
        .write_style(WriteStyle::Auto)
        .target(target)
        .try_init()?;

    debug!("Logging system initialized");
    Ok(())
}

/// Helper function to format sensitive data for logging
pub fn format_sensitive(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Structured logging for each SMTP session step
pub fn log_session_event(step: &str, sender: &str, success: bool, details: Option<&str>) {
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    if success {
        info!(
            "Session event: step={}, sender={}, success=true, timestamp={}, details={:?}",
            step,
            format_sensitive(sender),
            timestamp,
            details
        );
    } else {
        warn!(
            "Session event: step={}, sender={}, success=false, timestamp={}, details={:?}",
            step,
            format_sensitive(sender),
            timestamp,
            details
        );
    }
}
