use std::fmt;
use std::io::Write;

use lettre::Message;
use log::debug;

use crate::config::Credentials;
use crate::email::{Connector, RelayFailure, RelaySession};
use crate::utils::errors::NotifyError;
use crate::utils::io::{redact, Console};
use crate::utils::logging::log_session_event;

/// Position of a session in the handshake and delivery sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Greeted,
    Encrypting,
    ReGreeted,
    Authenticated,
    Sent,
    Closed,
    Failed,
}

impl SessionState {
    /// Step name used in log records for the transition into this state
    fn step_name(self) -> &'static str {
        match self {
            SessionState::Disconnected => "disconnect",
            SessionState::Greeted => "ehlo",
            SessionState::Encrypting => "starttls",
            SessionState::ReGreeted => "ehlo-tls",
            SessionState::Authenticated => "auth",
            SessionState::Sent => "send",
            SessionState::Closed => "quit",
            SessionState::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Greeted => "greeted",
            SessionState::Encrypting => "encrypting",
            SessionState::ReGreeted => "re-greeted",
            SessionState::Authenticated => "authenticated",
            SessionState::Sent => "sent",
            SessionState::Closed => "closed",
            SessionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Map a session fault to the error taxonomy.
///
/// Only a refusal from the relay during authentication counts as an
/// authentication failure; a missing AUTH mechanism or a dropped
/// connection at that step stays unclassified.
pub fn classify(entering: SessionState, failure: RelayFailure) -> NotifyError {
    match entering {
        SessionState::Authenticated if failure.is_rejection() => {
            NotifyError::Authentication(failure)
        }
        _ => NotifyError::Unclassified {
            stage: entering,
            failure,
        },
    }
}

/// Exclusive owner of one open session while it walks the state machine
struct Handshake<'a, S: RelaySession> {
    session: S,
    state: SessionState,
    credentials: &'a Credentials,
}

impl<'a, S: RelaySession> Handshake<'a, S> {
    fn advance<F>(&mut self, next: SessionState, op: F) -> Result<(), NotifyError>
    where
        F: FnOnce(&mut S) -> Result<(), RelayFailure>,
    {
        match op(&mut self.session) {
            Ok(()) => {
                log_session_event(
                    next.step_name(),
                    &self.credentials.sender_address,
                    true,
                    None,
                );
                debug!("Session state {} -> {}", self.state, next);
                self.state = next;
                Ok(())
            }
            Err(failure) => {
                let detail = redact(&failure.detail, Some(&self.credentials.password));
                log_session_event(
                    next.step_name(),
                    &self.credentials.sender_address,
                    false,
                    Some(&detail),
                );
                debug!("Session state {} -> {}", self.state, SessionState::Failed);
                self.state = SessionState::Failed;
                self.session.abort();
                Err(classify(next, failure))
            }
        }
    }
}

/// Run the full relay dialogue for one message.
///
/// The session is dropped before this returns on every path.
pub fn deliver<C, W>(
    connector: &C,
    host: &str,
    port: u16,
    credentials: &Credentials,
    message: &Message,
    console: &mut Console<'_, W>,
) -> Result<(), NotifyError>
where
    C: Connector,
    W: Write,
{
    console.line(format!(
        "Connexion au serveur {} sur le port {}...",
        host, port
    ));

    let session = connector.connect(host, port).map_err(|failure| {
        let detail = redact(&failure.detail, Some(&credentials.password));
        log_session_event("connect", &credentials.sender_address, false, Some(&detail));
        classify(SessionState::Greeted, failure)
    })?;

    let mut handshake = Handshake {
        session,
        state: SessionState::Disconnected,
        credentials,
    };

    console.line("1. Envoi de la commande EHLO...");
    handshake.advance(SessionState::Greeted, |s| s.greet())?;

    console.line("2. Activation du chiffrement TLS (STARTTLS)...");
    handshake.advance(SessionState::Encrypting, |s| s.start_tls())?;

    console.line("3. Renvoi de la commande EHLO (post-TLS)...");
    handshake.advance(SessionState::ReGreeted, |s| s.regreet())?;

    let sender = console.redact(&credentials.sender_address);
    console.line(format!("4. Authentification du compte : {}...", sender));
    handshake.advance(SessionState::Authenticated, |s| {
        s.authenticate(&credentials.sender_address, &credentials.password)
    })?;

    let receiver = console.redact(&credentials.receiver_address);
    console.line(format!("5. Envoi de l'email à {}...", receiver));
    handshake.advance(SessionState::Sent, |s| s.submit(message))?;

    console.line("6. Fermeture de la connexion...");
    handshake.advance(SessionState::Closed, |s| s.quit())?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::mock::{ScriptedConnector, Step};
    use crate::email::templates::build_notification;
    use crate::email::FailureKind;

    fn credentials() -> Credentials {
        Credentials {
            sender_address: "alerte@entreprise.com".to_string(),
            password: "pw".to_string(),
            receiver_address: "qualite@entreprise.com".to_string(),
            receiver_defaulted: false,
        }
    }

    fn run_against(connector: &ScriptedConnector) -> (Result<(), NotifyError>, String) {
        let creds = credentials();
        let message = build_notification(&creds).unwrap();
        let mut buffer = Vec::new();
        let result = {
            let mut console = Console::new(&mut buffer);
            deliver(
                connector,
                "relay.test",
                2525,
                &creds,
                &message,
                &mut console,
            )
        };
        (result, String::from_utf8(buffer).unwrap())
    }

    #[test]
    fn test_full_sequence_in_order() {
        let connector = ScriptedConnector::accepting();
        let (result, printed) = run_against(&connector);
        assert!(result.is_ok());

        let journal = connector.journal();
        let journal = journal.borrow();
        assert_eq!(
            journal.steps,
            vec![
                Step::Connect,
                Step::Greet,
                Step::StartTls,
                Step::Regreet,
                Step::Authenticate,
                Step::Submit,
                Step::Quit
            ]
        );
        assert_eq!(journal.host, Some(("relay.test".to_string(), 2525)));
        assert!(!journal.aborted);
        assert!(journal.dropped);

        let lines: Vec<&str> = printed.lines().collect();
        assert_eq!(lines[0], "Connexion au serveur relay.test sur le port 2525...");
        assert_eq!(lines[1], "1. Envoi de la commande EHLO...");
        assert_eq!(lines[3], "3. Renvoi de la commande EHLO (post-TLS)...");
        assert_eq!(lines[6], "6. Fermeture de la connexion...");
    }

    #[test]
    fn test_failure_stops_sequence_and_aborts() {
        let connector = ScriptedConnector::failing_at(
            Step::StartTls,
            RelayFailure::new(FailureKind::Tls, "handshake failure"),
        );
        let (result, printed) = run_against(&connector);

        match result {
            Err(NotifyError::Unclassified { stage, failure }) => {
                assert_eq!(stage, SessionState::Encrypting);
                assert_eq!(failure.kind, FailureKind::Tls);
            }
            other => panic!("expected Unclassified, got {:?}", other),
        }

        let journal = connector.journal();
        let journal = journal.borrow();
        assert_eq!(
            journal.steps,
            vec![Step::Connect, Step::Greet, Step::StartTls]
        );
        assert!(journal.aborted);
        assert!(journal.dropped);
        assert!(!printed.contains("3. Renvoi"));
    }

    #[test]
    fn test_connect_failure_has_no_session() {
        let connector = ScriptedConnector::failing_at(
            Step::Connect,
            RelayFailure::new(FailureKind::Network, "Connection refused (os error 111)"),
        );
        let (result, printed) = run_against(&connector);
        assert!(matches!(
            result,
            Err(NotifyError::Unclassified {
                stage: SessionState::Greeted,
                ..
            })
        ));
        assert!(!connector.journal().borrow().aborted);
        assert!(!printed.contains("1. Envoi"));
    }

    #[test]
    fn test_classify() {
        let rejected = RelayFailure::new(
            FailureKind::Rejected {
                code: "535".to_string(),
                permanent: true,
            },
            "5.7.3 Authentication unsuccessful",
        );
        assert!(matches!(
            classify(SessionState::Authenticated, rejected.clone()),
            NotifyError::Authentication(_)
        ));

        // A rejection elsewhere is not an authentication problem
        assert!(matches!(
            classify(SessionState::Sent, rejected),
            NotifyError::Unclassified { .. }
        ));

        // No shared mechanism is a client-side fault
        let no_mechanism = RelayFailure::new(
            FailureKind::Client,
            "No compatible authentication mechanism was found",
        );
        assert!(matches!(
            classify(SessionState::Authenticated, no_mechanism),
            NotifyError::Unclassified { .. }
        ));
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::ReGreeted.to_string(), "re-greeted");
        assert_eq!(SessionState::Authenticated.step_name(), "auth");
    }
}
