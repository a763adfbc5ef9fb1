use lettre::Message;
use thiserror::Error;

/// Broad category of a session fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    // Connection refused, reset or dropped
    Network,
    // TLS negotiation or certificate failure
    Tls,
    Timeout,
    // The relay answered with a 4xx or 5xx reply
    Rejected { code: String, permanent: bool },
    // The relay's reply could not be understood
    Protocol,
    // Refused locally before reaching the relay (no STARTTLS, no shared AUTH mechanism)
    Client,
}

impl FailureKind {
    /// Category name shown to the operator for unclassified failures
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::Network => "NetworkError",
            FailureKind::Tls => "TlsError",
            FailureKind::Timeout => "TimeoutError",
            FailureKind::Rejected { permanent: true, .. } => "SmtpPermanentError",
            FailureKind::Rejected { permanent: false, .. } => "SmtpTransientError",
            FailureKind::Protocol => "SmtpProtocolError",
            FailureKind::Client => "SmtpClientError",
        }
    }
}

/// A fault raised by one step of a relay session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{detail}")]
pub struct RelayFailure {
    pub kind: FailureKind,
    // Text reported by the client library or the relay
    pub detail: String,
}

impl RelayFailure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// True when the relay itself refused the command
    pub fn is_rejection(&self) -> bool {
        matches!(self.kind, FailureKind::Rejected { .. })
    }
}

/// One open SMTP session.
///
/// Methods are called in declaration order, each exactly once. After any
/// failure the caller invokes [`RelaySession::abort`] and drops the session.
pub trait RelaySession {
    /// EHLO on the plaintext channel
    fn greet(&mut self) -> Result<(), RelayFailure>;
    /// STARTTLS and the TLS handshake
    fn start_tls(&mut self) -> Result<(), RelayFailure>;
    /// EHLO again over the encrypted channel
    fn regreet(&mut self) -> Result<(), RelayFailure>;
    fn authenticate(&mut self, username: &str, password: &str) -> Result<(), RelayFailure>;
    /// MAIL FROM, RCPT TO and DATA for the message's envelope and content
    fn submit(&mut self, message: &Message) -> Result<(), RelayFailure>;
    /// QUIT
    fn quit(&mut self) -> Result<(), RelayFailure>;
    /// Best-effort teardown after a failure
    fn abort(&mut self);
}

/// Opens relay sessions
pub trait Connector {
    type Session: RelaySession;

    fn connect(&self, host: &str, port: u16) -> Result<Self::Session, RelayFailure>;
}
