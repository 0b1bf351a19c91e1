//! # fluesterpost-crypto
//!
//! Asymmetrische Ende-zu-Ende-Verpackung fuer Fluesterpost.
//!
//! ## Module
//! - `schluessel` - RSA-Schluesselpaare und das Zeilenformat `<modulus> <exponent>`
//! - `umschlag` - OAEP/SHA-256 Verschluesselung + Base64 (ein Umschlag pro Zeile)
//! - `error` - Fehlertypen

pub mod error;
pub mod schluessel;
pub mod umschlag;

// Bequeme Re-Exports
pub use error::{CryptoError, CryptoResult};
pub use schluessel::{OeffentlicherSchluessel, SchluesselPaar};
pub use umschlag::{max_klartext_laenge, OAEP_LABEL};
