//! Fehlertypen fuer den Signaling-Service

use fluesterpost_crypto::CryptoError;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Fehlertyp fuer den Signaling-Service
///
/// Alle Varianten betreffen genau eine Verbindung; keine davon beendet den
/// Prozess.
#[derive(Debug, Error)]
pub enum SignalingError {
    /// Zeile konnte nicht gelesen werden (zu lang oder IO)
    #[error("Zeilenfehler: {0}")]
    Zeile(#[from] LinesCodecError),

    /// Schluessel- oder Umschlagfehler
    #[error("Kryptofehler: {0}")]
    Krypto(#[from] CryptoError),

    /// Handshake abgebrochen
    #[error("Handshake fehlgeschlagen: {0}")]
    Handshake(String),

    /// Verbindung wurde getrennt
    #[error("Verbindung getrennt")]
    VerbindungGetrennt,

    /// Handshake hat zu lange gedauert
    #[error("Timeout")]
    Timeout,
}

impl SignalingError {
    /// Erstellt einen Handshake-Fehler
    pub fn handshake(msg: impl Into<String>) -> Self {
        Self::Handshake(msg.into())
    }
}

/// Result-Typ fuer den Signaling-Service
pub type SignalingResult<T> = Result<T, SignalingError>;
