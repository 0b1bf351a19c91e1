//! Fehlertypen fuer das Chat-Crate
//!
//! Die `Display`-Texte gehen unveraendert als Server-Antwort an den Client.

use fluesterpost_core::SessionId;
use thiserror::Error;

/// Chat-Fehlertypen
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Raum '{0}' existiert bereits")]
    RaumExistiert(String),

    #[error("Raum '{0}' existiert nicht")]
    RaumNichtGefunden(String),

    #[error("Du bist in keinem Raum")]
    KeinRaum,

    #[error("Session nicht gefunden: {0}")]
    SessionNichtGefunden(SessionId),

    #[error("Benutzer '{0}' ist nicht verbunden")]
    BenutzerNichtGefunden(String),

    #[error("Keine Berechtigung: {0}")]
    KeineBerechtigung(String),

    #[error("'{0}' ist Moderator und kann nicht gekickt werden")]
    ZielIstModerator(String),

    #[error("'{name}' ist nicht im Raum '{raum}'")]
    NichtImRaum { name: String, raum: String },
}

pub type ChatResult<T> = Result<T, ChatError>;
