//! Scripted relay for testing the notifier without a network.
//!
//! Every call is journaled so tests can assert on the exact command order,
//! on what was submitted and on whether the session was torn down.

use std::cell::RefCell;
use std::rc::Rc;

use lettre::Message;

use super::relay::{Connector, FailureKind, RelayFailure, RelaySession};

/// Steps a scripted relay can be told to fail at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Connect,
    Greet,
    StartTls,
    Regreet,
    Authenticate,
    Submit,
    Quit,
}

/// Everything the notifier did against the mock
#[derive(Debug, Default)]
pub struct Journal {
    pub steps: Vec<Step>,
    pub host: Option<(String, u16)>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub envelope_from: Option<String>,
    pub envelope_to: Vec<String>,
    pub submitted: Option<Vec<u8>>,
    pub aborted: bool,
    pub dropped: bool,
}

/// Connector whose sessions succeed until the scripted failure step
pub struct ScriptedConnector {
    failure: Option<(Step, RelayFailure)>,
    journal: Rc<RefCell<Journal>>,
}

impl ScriptedConnector {
    /// A relay that accepts the whole dialogue
    pub fn accepting() -> Self {
        Self {
            failure: None,
            journal: Rc::default(),
        }
    }

    /// A relay that fails at `step` with `failure`
    pub fn failing_at(step: Step, failure: RelayFailure) -> Self {
        Self {
            failure: Some((step, failure)),
            journal: Rc::default(),
        }
    }

    /// A relay that answers AUTH with 535 and the given detail text
    pub fn rejecting_credentials(detail: &str) -> Self {
        Self::failing_at(
            Step::Authenticate,
            RelayFailure::new(
                FailureKind::Rejected {
                    code: "535".to_string(),
                    permanent: true,
                },
                detail,
            ),
        )
    }

    pub fn journal(&self) -> Rc<RefCell<Journal>> {
        Rc::clone(&self.journal)
    }

    fn check(&self, step: Step) -> Result<(), RelayFailure> {
        self.journal.borrow_mut().steps.push(step);
        match &self.failure {
            Some((failing, failure)) if *failing == step => Err(failure.clone()),
            _ => Ok(()),
        }
    }
}

impl Connector for ScriptedConnector {
    type Session = ScriptedSession;

    fn connect(&self, host: &str, port: u16) -> Result<ScriptedSession, RelayFailure> {
        self.journal.borrow_mut().host = Some((host.to_string(), port));
        self.check(Step::Connect)?;
        Ok(ScriptedSession {
            failure: self.failure.clone(),
            journal: Rc::clone(&self.journal),
        })
    }
}

pub struct ScriptedSession {
    failure: Option<(Step, RelayFailure)>,
    journal: Rc<RefCell<Journal>>,
}

impl ScriptedSession {
    fn check(&self, step: Step) -> Result<(), RelayFailure> {
        self.journal.borrow_mut().steps.push(step);
        match &self.failure {
            Some((failing, failure)) if *failing == step => Err(failure.clone()),
            _ => Ok(()),
        }
    }
}

impl RelaySession for ScriptedSession {
    fn greet(&mut self) -> Result<(), RelayFailure> {
        self.check(Step::Greet)
    }

    fn start_tls(&mut self) -> Result<(), RelayFailure> {
        self.check(Step::StartTls)
    }

    fn regreet(&mut self) -> Result<(), RelayFailure> {
        self.check(Step::Regreet)
    }

    fn authenticate(&mut self, username: &str, password: &str) -> Result<(), RelayFailure> {
        {
            let mut journal = self.journal.borrow_mut();
            journal.username = Some(username.to_string());
            journal.password = Some(password.to_string());
        }
        self.check(Step::Authenticate)
    }

    fn submit(&mut self, message: &Message) -> Result<(), RelayFailure> {
        self.check(Step::Submit)?;
        let mut journal = self.journal.borrow_mut();
        let envelope = message.envelope();
        journal.envelope_from = envelope.from().map(|a| a.to_string());
        journal.envelope_to = envelope.to().iter().map(|a| a.to_string()).collect();
        journal.submitted = Some(message.formatted());
        Ok(())
    }

    fn quit(&mut self) -> Result<(), RelayFailure> {
        self.check(Step::Quit)
    }

    fn abort(&mut self) {
        self.journal.borrow_mut().aborted = true;
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.journal.borrow_mut().dropped = true;
    }
}
