use std::time::Duration;

use lettre::transport::smtp::authentication::{Credentials as AuthCredentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::commands::Ehlo;
use lettre::transport::smtp::extension::{ClientId, ServerInfo};
use lettre::transport::smtp::Error as SmtpError;
use lettre::Message;
use log::debug;

use super::relay::{Connector, FailureKind, RelayFailure, RelaySession};
use crate::SMTP_TIMEOUT_SECS;

// PLAIN first, LOGIN for relays that only advertise LOGIN
const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

impl From<SmtpError> for RelayFailure {
    fn from(e: SmtpError) -> Self {
        let kind = if e.is_tls() {
            FailureKind::Tls
        } else if e.is_timeout() {
            FailureKind::Timeout
        } else if e.is_permanent() || e.is_transient() {
            FailureKind::Rejected {
                code: e.status().map(|c| c.to_string()).unwrap_or_default(),
                permanent: e.is_permanent(),
            }
        } else if e.is_response() {
            FailureKind::Protocol
        } else if e.is_client() {
            FailureKind::Client
        } else {
            FailureKind::Network
        };
        RelayFailure::new(kind, e.to_string())
    }
}

/// Opens real SMTP connections through lettre's low-level client
pub struct LettreConnector {
    timeout: Option<Duration>,
    hello_name: ClientId,
}

impl LettreConnector {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self {
            timeout,
            hello_name: ClientId::default(),
        }
    }
}

impl Default for LettreConnector {
    fn default() -> Self {
        Self::new(Some(Duration::from_secs(SMTP_TIMEOUT_SECS)))
    }
}

impl Connector for LettreConnector {
    type Session = LettreSession;

    fn connect(&self, host: &str, port: u16) -> Result<LettreSession, RelayFailure> {
        // TLS parameters are bound to the relay name for certificate checks
        let tls_parameters = TlsParameters::builder(host.to_string()).build()?;

        debug!("Opening TCP connection to {}:{}", host, port);
        let connection =
            SmtpConnection::connect((host, port), self.timeout, &self.hello_name, None, None)?;

        Ok(LettreSession {
            connection,
            tls_parameters,
            hello_name: self.hello_name.clone(),
        })
    }
}

/// An SMTP session driven one command at a time.
///
/// `SmtpConnection::connect` already reads the banner and sends a first
/// EHLO, and `starttls` follows the upgrade with its own EHLO. The explicit
/// greetings below send EHLO again as a raw command so every step is
/// observable on its own, which SMTP allows outside a mail transaction.
pub struct LettreSession {
    connection: SmtpConnection,
    tls_parameters: TlsParameters,
    hello_name: ClientId,
}

impl LettreSession {
    fn send_ehlo(&mut self) -> Result<ServerInfo, RelayFailure> {
        let response = self.connection.command(Ehlo::new(self.hello_name.clone()))?;
        Ok(ServerInfo::from_response(&response)?)
    }
}

impl RelaySession for LettreSession {
    fn greet(&mut self) -> Result<(), RelayFailure> {
        let capabilities = self.send_ehlo()?;
        debug!("Relay capabilities: {}", capabilities);
        Ok(())
    }

    fn start_tls(&mut self) -> Result<(), RelayFailure> {
        self.connection
            .starttls(&self.tls_parameters, &self.hello_name)?;
        Ok(())
    }

    fn regreet(&mut self) -> Result<(), RelayFailure> {
        if !self.connection.is_encrypted() {
            return Err(RelayFailure::new(
                FailureKind::Client,
                "connection is not encrypted after STARTTLS",
            ));
        }
        let capabilities = self.send_ehlo()?;
        debug!("Relay capabilities after STARTTLS: {}", capabilities);
        Ok(())
    }

    fn authenticate(&mut self, username: &str, password: &str) -> Result<(), RelayFailure> {
        let credentials = AuthCredentials::new(username.to_string(), password.to_string());
        let response = self.connection.auth(AUTH_MECHANISMS, &credentials)?;
        debug!("Authentication accepted with code {}", response.code());
        Ok(())
    }

    fn submit(&mut self, message: &Message) -> Result<(), RelayFailure> {
        let response = self
            .connection
            .send(message.envelope(), &message.formatted())?;
        debug!("Message accepted with code {}", response.code());
        Ok(())
    }

    fn quit(&mut self) -> Result<(), RelayFailure> {
        self.connection.quit()?;
        Ok(())
    }

    fn abort(&mut self) {
        self.connection.abort();
    }
}
