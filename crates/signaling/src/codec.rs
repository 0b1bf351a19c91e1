//! Zeilen-Codec fuer eingehende Daten
//!
//! Wrapper um `LinesCodec` mit Laengenbegrenzung. Eine zu lange Zeile wird
//! nicht als Fehler gemeldet (das wuerde den `FramedRead` anhalten), sondern
//! als `EingangsZeile::ZuLang`; der Rest der Zeile bis zum naechsten `\n`
//! wird verworfen und die Verbindung bleibt offen.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// Eine dekodierte Eingangszeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EingangsZeile {
    /// Vollstaendige Zeile ohne `\n` bzw. `\r\n`
    Zeile(String),
    /// Zeile ueberschritt die maximale Laenge und wurde verworfen
    ZuLang,
}

/// Decoder fuer `EingangsZeile`
#[derive(Debug, Clone)]
pub struct ZeilenCodec {
    inner: LinesCodec,
}

impl ZeilenCodec {
    /// Erstellt einen Codec, der Zeilen laenger als `max_laenge` Bytes verwirft
    pub fn neu(max_laenge: usize) -> Self {
        Self {
            inner: LinesCodec::new_with_max_length(max_laenge),
        }
    }
}

fn umwandeln(
    ergebnis: Result<Option<String>, LinesCodecError>,
) -> Result<Option<EingangsZeile>, LinesCodecError> {
    match ergebnis {
        Ok(zeile) => Ok(zeile.map(EingangsZeile::Zeile)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(EingangsZeile::ZuLang)),
        Err(e) => Err(e),
    }
}

impl Decoder for ZeilenCodec {
    type Item = EingangsZeile;
    type Error = LinesCodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        umwandeln(self.inner.decode(src))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        umwandeln(self.inner.decode_eof(src))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
