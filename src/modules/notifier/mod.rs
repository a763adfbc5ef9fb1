pub mod report;
pub mod session;

use std::io::Write;
use std::path::PathBuf;

use log::{error, info};

use crate::config::Credentials;
use crate::email::{build_notification, Connector, LettreConnector};
use crate::utils::errors::NotifyError;
use crate::utils::io::Console;
use crate::{CONFIG_FILE, SMTP_HOST, SMTP_PORT};

pub use report::{START_BANNER, SUCCESS_BANNER};
pub use session::SessionState;

/// How a notification run ended
#[derive(Debug)]
pub enum Outcome {
    Delivered,
    // The run stopped; the diagnostic has already been printed
    Halted(NotifyError),
}

impl Outcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Outcome::Delivered)
    }
}

/// Sends the ReguTrack test notification through the relay
pub struct Notifier<C: Connector> {
    config_path: PathBuf,
    connector: C,
    host: String,
    port: u16,
}

impl Notifier<LettreConnector> {
    /// Notifier reading `config.json` and talking to the Office 365 relay
    pub fn with_defaults() -> Self {
        Self::new(CONFIG_FILE, LettreConnector::default())
    }
}

impl<C: Connector> Notifier<C> {
    pub fn new(config_path: impl Into<PathBuf>, connector: C) -> Self {
        Self {
            config_path: config_path.into(),
            connector,
            host: SMTP_HOST.to_string(),
            port: SMTP_PORT,
        }
    }

    /// Run the whole procedure once.
    ///
    /// Never fails: every error is reported on `out` and returned inside the
    /// [`Outcome`] for callers that want to act on it.
    pub fn run<W: Write>(&self, out: &mut W) -> Outcome {
        let mut console = Console::new(out);
        console.line(START_BANNER);

        match self.try_run(&mut console) {
            Ok(()) => {
                info!("Notification delivered via {}:{}", self.host, self.port);
                console.blank();
                console.line(SUCCESS_BANNER);
                Outcome::Delivered
            }
            Err(e) => {
                error!("{}", halt_record(&e, &console));
                report::render(&e, &self.config_path, &mut console);
                Outcome::Halted(e)
            }
        }
    }

    fn try_run<W: Write>(&self, console: &mut Console<'_, W>) -> Result<(), NotifyError> {
        // 1. Configuration
        let credentials = Credentials::load(&self.config_path)?;
        console.mask(&credentials.password);

        if credentials.receiver_defaulted {
            let sender = console.redact(&credentials.sender_address);
            console.line(format!(
                "INFO : Pas de destinataire spécifié, envoi à l'expéditeur ({})",
                sender
            ));
        }

        // 2. Message
        let message = build_notification(&credentials)?;

        // 3. Session
        session::deliver(
            &self.connector,
            &self.host,
            self.port,
            &credentials,
            &message,
            console,
        )
    }
}

/// Log line for a halted run, with the password masked
fn halt_record<W: Write>(error: &NotifyError, console: &Console<'_, W>) -> String {
    let phase = if error.is_pre_network() {
        "before connecting"
    } else {
        "during the relay session"
    };
    format!(
        "Notification run halted {}: {}",
        phase,
        console.redact(&error.to_string())
    )
}
