#[cfg(test)]
pub(crate) mod mock;
pub mod relay;
pub mod smtp;
pub mod templates;

pub use relay::{Connector, FailureKind, RelayFailure, RelaySession};
pub use smtp::{LettreConnector, LettreSession};
pub use templates::{build_notification, NOTIFICATION_BODY, NOTIFICATION_SUBJECT};
