//! Fehlertypen fuer das Kryptografie-Subsystem

use thiserror::Error;

/// Fehler im Kryptografie-Subsystem
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Schluessel-Generierung fehlgeschlagen: {0}")]
    SchluesselGenerierung(String),

    #[error("Ungueltiges Schluesselformat: {0}")]
    SchluesselFormat(String),

    #[error("Schluessel zu klein: {bits} Bit, mindestens {minimum} Bit erforderlich")]
    SchluesselZuKlein { bits: usize, minimum: usize },

    #[error("Nachricht zu lang: {laenge} Bytes, maximal {maximum} Bytes")]
    NachrichtZuLang { laenge: usize, maximum: usize },

    #[error("Verschluesselung fehlgeschlagen: {0}")]
    Verschluesselung(String),

    #[error("Entschluesselung fehlgeschlagen: {0}")]
    Entschluesselung(String),

    #[error("Base64-Dekodierung fehlgeschlagen: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Klartext ist kein gueltiges UTF-8")]
    KeinUtf8(#[from] std::string::FromUtf8Error),
}

pub type CryptoResult<T> = Result<T, CryptoError>;
