//! RSA-Schluesselmaterial und das Handshake-Zeilenformat
//!
//! Oeffentliche Schluessel werden im Handshake als Klartextzeile
//! `<modulus> <exponent>` ausgetauscht (beide dezimal).

use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{BigUint, RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::str::FromStr;

use crate::error::{CryptoError, CryptoResult};
use crate::umschlag;

// ---------------------------------------------------------------------------
// OeffentlicherSchluessel
// ---------------------------------------------------------------------------

/// Oeffentlicher RSA-Schluessel einer Gegenstelle
///
/// Wird einmal im Handshake gesetzt und danach nie mehr veraendert.
#[derive(Clone, PartialEq, Eq)]
pub struct OeffentlicherSchluessel(RsaPublicKey);

impl OeffentlicherSchluessel {
    /// Parst die Handshake-Zeile `<modulus> <exponent>`
    ///
    /// Zeilenenden und umgebende Leerzeichen werden ignoriert. Modulus und
    /// Exponent muessen reine Dezimalzahlen sein.
    pub fn aus_zeile(zeile: &str) -> CryptoResult<Self> {
        let mut teile = zeile.trim().split_whitespace();
        let (modulus, exponent) = match (teile.next(), teile.next(), teile.next()) {
            (Some(m), Some(e), None) => (m, e),
            _ => {
                return Err(CryptoError::SchluesselFormat(
                    "erwartet '<modulus> <exponent>'".into(),
                ))
            }
        };

        if !ist_dezimal(modulus) {
            return Err(CryptoError::SchluesselFormat(format!(
                "Modulus ist keine Dezimalzahl: {modulus}"
            )));
        }
        let n = BigUint::from_str(modulus)
            .map_err(|e| CryptoError::SchluesselFormat(format!("Modulus: {e}")))?;

        if !ist_dezimal(exponent) {
            return Err(CryptoError::SchluesselFormat(format!(
                "Exponent ist keine Dezimalzahl: {exponent}"
            )));
        }
        let e: u64 = exponent
            .parse()
            .map_err(|e| CryptoError::SchluesselFormat(format!("Exponent: {e}")))?;

        RsaPublicKey::new(n, BigUint::from(e))
            .map(Self)
            .map_err(|e| CryptoError::SchluesselFormat(e.to_string()))
    }

    /// Formatiert den Schluessel als Handshake-Zeile (ohne Zeilenende)
    pub fn als_zeile(&self) -> String {
        format!("{} {}", self.0.n(), self.0.e())
    }

    /// Modulus-Laenge in Bit
    pub fn bits(&self) -> usize {
        self.0.size() * 8
    }

    /// Laengster Klartext in Bytes, der in einen Umschlag passt
    pub fn max_klartext_laenge(&self) -> usize {
        umschlag::max_klartext_laenge(self.0.size())
    }

    /// Prueft die Mindestgroesse des Schluessels
    pub fn mindestens(self, minimum_bits: usize) -> CryptoResult<Self> {
        let bits = self.bits();
        if bits < minimum_bits {
            return Err(CryptoError::SchluesselZuKlein {
                bits,
                minimum: minimum_bits,
            });
        }
        Ok(self)
    }

    /// Verschluesselt einen Klartext fuer diesen Empfaenger (Base64-Umschlag)
    pub fn versiegeln(&self, klartext: &str) -> CryptoResult<String> {
        umschlag::versiegeln(&self.0, klartext)
    }
}

impl fmt::Debug for OeffentlicherSchluessel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OeffentlicherSchluessel")
            .field("bits", &self.bits())
            .finish()
    }
}

fn ist_dezimal(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// SchluesselPaar
// ---------------------------------------------------------------------------

/// RSA-Schluesselpaar (Server-Schluessel oder Test-Client)
pub struct SchluesselPaar {
    privat: RsaPrivateKey,
    oeffentlich: OeffentlicherSchluessel,
}

impl SchluesselPaar {
    /// Erzeugt ein frisches Schluesselpaar mit `bits` Modulus-Laenge
    pub fn generieren(bits: usize) -> CryptoResult<Self> {
        let privat = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::SchluesselGenerierung(e.to_string()))?;
        let oeffentlich = OeffentlicherSchluessel(RsaPublicKey::from(&privat));
        tracing::debug!(bits, "RSA-Schluesselpaar erzeugt");
        Ok(Self { privat, oeffentlich })
    }

    /// Oeffentlicher Teil des Paars
    pub fn oeffentlich(&self) -> &OeffentlicherSchluessel {
        &self.oeffentlich
    }

    /// Oeffnet einen Base64-Umschlag mit dem privaten Schluessel
    pub fn oeffnen(&self, umschlag: &str) -> CryptoResult<String> {
        umschlag::oeffnen(&self.privat, umschlag)
    }
}

impl fmt::Debug for SchluesselPaar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchluesselPaar")
            .field("oeffentlich", &self.oeffentlich)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
