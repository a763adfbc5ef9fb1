use std::io::Write;

use log::warn;

/// Replacement printed wherever the secret would have appeared
pub const SECRET_MASK: &str = "********";

/// Operator-facing console writer.
///
/// Fixed text is printed as is. Values that come from outside (addresses,
/// relay replies, library errors) go through [`Console::redact`] first,
/// which replaces the registered secret with [`SECRET_MASK`].
pub struct Console<'a, W: Write> {
    out: &'a mut W,
    secret: Option<String>,
}

impl<'a, W: Write> Console<'a, W> {
    pub fn new(out: &'a mut W) -> Self {
        Self { out, secret: None }
    }

    /// Register a value that must never be printed
    pub fn mask(&mut self, secret: &str) {
        if !secret.is_empty() {
            self.secret = Some(secret.to_string());
        }
    }

    /// Mask the registered secret in a value before it is interpolated
    pub fn redact(&self, text: &str) -> String {
        redact(text, self.secret.as_deref())
    }

    /// Print one line
    pub fn line(&mut self, text: impl AsRef<str>) {
        if let Err(e) = writeln!(self.out, "{}", text.as_ref()) {
            // Output is best effort; the run itself must still complete
            warn!("Failed to write console output: {}", e);
        }
    }

    /// Print an empty separator line
    pub fn blank(&mut self) {
        self.line("");
    }
}

/// Replace every occurrence of `secret` in `text`
pub fn redact(text: &str, secret: Option<&str>) -> String {
    match secret {
        Some(s) if !s.is_empty() => text.replace(s, SECRET_MASK),
        _ => text.to_string(),
    }
}
