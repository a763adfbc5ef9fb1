use lettre::message::header::{ContentTransferEncoding, ContentType};
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::Message;

use crate::config::Credentials;
use crate::utils::errors::NotifyError;

/// Subject of the test notification
pub const NOTIFICATION_SUBJECT: &str = "ReguTrack : Test de Notification";

/// Body of the test notification.
///
/// The accented characters double as a check that UTF-8 survives the relay.
pub const NOTIFICATION_BODY: &str = "Bonjour,

Ceci est un message de test envoyé par l'application ReguTrack.
Si vous lisez ce message, la connexion SMTP Office 365 est correctement configurée.
L'encodage des accents (é, à, ç, ê) fonctionne correctement.

Cordialement,
Votre Assistant ReguTrack Local
";

/// Build the fixed test notification for the given credentials.
///
/// The body is a single `text/plain; charset=utf-8` part inside a
/// `multipart/mixed` container, base64-encoded so the accented characters
/// reach the relay unchanged.
pub fn build_notification(credentials: &Credentials) -> Result<Message, NotifyError> {
    let from = parse_mailbox("email", &credentials.sender_address)?;
    let to = parse_mailbox("receiver_email", &credentials.receiver_address)?;

    let body = SinglePart::builder()
        .header(ContentType::TEXT_PLAIN)
        .header(ContentTransferEncoding::Base64)
        .body(NOTIFICATION_BODY.to_string());

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(NOTIFICATION_SUBJECT)
        .multipart(MultiPart::mixed().singlepart(body))?;

    Ok(message)
}

fn parse_mailbox(field: &'static str, value: &str) -> Result<Mailbox, NotifyError> {
    value
        .parse::<Mailbox>()
        .map_err(|e| NotifyError::InvalidAddress {
            field,
            value: value.to_string(),
            source: e,
        })
}
