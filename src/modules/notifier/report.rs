use std::io::Write;
use std::path::Path;

use crate::utils::errors::NotifyError;
use crate::utils::io::Console;

pub const START_BANNER: &str = "--- Démarrage du script d'envoi d'email ReguTrack ---";
pub const SUCCESS_BANNER: &str = ">>> SUCCÈS : Email envoyé correctement ! <<<";
const ALERT_RULE: &str = "!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!";

/// Print the operator-facing diagnostic for a halted run
pub fn render<W: Write>(error: &NotifyError, config_path: &Path, console: &mut Console<'_, W>) {
    let file = config_path.display();

    match error {
        NotifyError::ConfigMissing { .. } => {
            console.line(format!(
                "ERREUR FATALE : Le fichier {} est introuvable.",
                file
            ));
            console.line("Veuillez créer ce fichier avec vos identifiants (voir exemple).");
        }
        NotifyError::ConfigUnreadable { source, .. } => {
            let reason = console.redact(&source.to_string());
            console.line(format!(
                "ERREUR FATALE : Le fichier {} ne peut pas être lu ({}).",
                file, reason
            ));
        }
        NotifyError::ConfigMalformed { source, .. } => {
            console.line(format!(
                "ERREUR FATALE : Le fichier {} n'est pas un JSON valide.",
                file
            ));
            // Position only; the parser message may quote configuration values
            console.line(format!(
                "Position : ligne {}, colonne {}",
                source.line(),
                source.column()
            ));
        }
        NotifyError::ConfigIncomplete { missing } => {
            let fields: Vec<String> = missing.iter().map(|f| format!("'{}'", f)).collect();
            console.line(format!(
                "ERREUR DE CONFIG : {} manquant dans {}",
                fields.join(" et "),
                file
            ));
        }
        NotifyError::InvalidAddress { field, value, .. } => {
            let value = console.redact(value);
            console.line(format!(
                "ERREUR DE CONFIG : l'adresse '{}' ({}) n'est pas une adresse email valide dans {}",
                field, value, file
            ));
        }
        NotifyError::MessageBuild(e) => {
            let reason = console.redact(&e.to_string());
            console.line(format!(
                "ERREUR : Impossible de construire le message ({}).",
                reason
            ));
        }
        NotifyError::Authentication(failure) => {
            let detail = console.redact(&failure.detail);
            console.blank();
            console.line(ALERT_RULE);
            console.line("ERREUR D'AUTHENTIFICATION SMTP");
            console.line(ALERT_RULE);
            console.line(
                "ERREUR : Mot de passe incorrect ou l'option SMTP est bloquée par l'informatique.",
            );
            console.blank();
            console.line("Causes probables :");
            console.line(format!(
                "  - Mot de passe Windows/Outlook erroné dans {}.",
                file
            ));
            console.line(
                "  - L'authentification SMTP (SMTP AUTH) est désactivée sur votre tenant Office 365.",
            );
            console.blank();
            console.line(format!("Détails techniques serveur : {}", detail));
        }
        NotifyError::Unclassified { failure, .. } => {
            let detail = console.redact(&failure.detail);
            console.blank();
            console.line("!!! ERREUR INATTENDUE !!!");
            console.line(format!("Type d'erreur : {}", failure.kind.name()));
            console.line(format!("Message : {}", detail));
        }
    }
}
