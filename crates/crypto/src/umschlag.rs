//! Umschlag-Format fuer jede Zeile nach dem Handshake
//!
//! ```text
//! klartext -> RSA-OAEP(SHA-256, Label "OAEP Encrypted") -> Base64 (Standard) -> Zeile
//! ```
//!
//! OAEP begrenzt die Klartextlaenge auf `k - 2 * hLen - 2` Bytes
//! (k = Modulus-Laenge in Bytes, hLen = 32 fuer SHA-256). Laengere
//! Klartexte werden mit `CryptoError::NachrichtZuLang` abgelehnt.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::{CryptoError, CryptoResult};

/// Festes OAEP-Label, das Client und Server teilen
pub const OAEP_LABEL: &str = "OAEP Encrypted";

/// Ausgabelaenge von SHA-256 in Bytes
const HASH_LAENGE: usize = 32;

/// Maximale Klartextlaenge fuer einen Modulus von `modulus_bytes` Bytes
pub fn max_klartext_laenge(modulus_bytes: usize) -> usize {
    modulus_bytes.saturating_sub(2 * HASH_LAENGE + 2)
}

fn oaep() -> Oaep {
    Oaep::new_with_label::<Sha256, _>(OAEP_LABEL)
}

/// Verschluesselt `klartext` fuer `empfaenger` und kodiert als Base64
pub(crate) fn versiegeln(empfaenger: &RsaPublicKey, klartext: &str) -> CryptoResult<String> {
    use rsa::traits::PublicKeyParts;

    let maximum = max_klartext_laenge(empfaenger.size());
    if klartext.len() > maximum {
        return Err(CryptoError::NachrichtZuLang {
            laenge: klartext.len(),
            maximum,
        });
    }

    let chiffre = empfaenger
        .encrypt(&mut OsRng, oaep(), klartext.as_bytes())
        .map_err(|e| CryptoError::Verschluesselung(e.to_string()))?;

    Ok(STANDARD.encode(chiffre))
}

/// Dekodiert und entschluesselt einen Umschlag
pub(crate) fn oeffnen(privat: &RsaPrivateKey, umschlag: &str) -> CryptoResult<String> {
    let chiffre = STANDARD.decode(umschlag.trim())?;
    let klartext = privat
        .decrypt(oaep(), &chiffre)
        .map_err(|e| CryptoError::Entschluesselung(e.to_string()))?;
    Ok(String::from_utf8(klartext)?)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
