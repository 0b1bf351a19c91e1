//! Schluesselaustausch beim Verbindungsaufbau
//!
//! ```text
//! Server -> Client   <server_modulus> <server_exponent>\n
//! Client -> Server   <anzeigename>\n
//! Client -> Server   <client_modulus> <client_exponent>\n
//! ```
//!
//! Alle drei Zeilen sind Klartext. Name wird nicht validiert (leer und
//! doppelt sind erlaubt). Ein fehlerhafter Schluessel bricht nur diese
//! Verbindung ab, es gibt keinen zweiten Versuch.

use fluesterpost_crypto::OeffentlicherSchluessel;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio_util::codec::LinesCodecError;

use crate::codec::EingangsZeile;
use crate::error::{SignalingError, SignalingResult};
use crate::server_state::ServerState;

/// Ergebnis eines erfolgreichen Handshakes
#[derive(Debug, Clone)]
pub struct HandshakeErgebnis {
    pub name: String,
    pub schluessel: OeffentlicherSchluessel,
}

/// Fuehrt den Handshake auf einer frischen Verbindung durch
pub async fn durchfuehren<R, W>(
    leser: &mut R,
    schreiber: &mut W,
    state: &ServerState,
) -> SignalingResult<HandshakeErgebnis>
where
    R: Stream<Item = Result<EingangsZeile, LinesCodecError>> + Unpin,
    W: Sink<String, Error = LinesCodecError> + Unpin,
{
    schreiber
        .send(state.schluessel.oeffentlich().als_zeile())
        .await?;

    let name = naechste_zeile(leser, "Anzeigename").await?;
    let zeile = naechste_zeile(leser, "Schluessel").await?;

    let schluessel = OeffentlicherSchluessel::aus_zeile(&zeile)?
        .mindestens(state.config.min_client_schluessel_bits)?;

    tracing::debug!(name = %name, bits = schluessel.bits(), "Handshake abgeschlossen");
    Ok(HandshakeErgebnis { name, schluessel })
}

async fn naechste_zeile<R>(leser: &mut R, was: &str) -> SignalingResult<String>
where
    R: Stream<Item = Result<EingangsZeile, LinesCodecError>> + Unpin,
{
    match leser.next().await {
        Some(Ok(EingangsZeile::Zeile(zeile))) => Ok(zeile),
        Some(Ok(EingangsZeile::ZuLang)) => {
            Err(SignalingError::handshake(format!("{was}: Zeile zu lang")))
        }
        Some(Err(e)) => Err(e.into()),
        None => Err(SignalingError::VerbindungGetrennt),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ZeilenCodec;
    use crate::test_util::{client_paar, test_state};
    use fluesterpost_crypto::CryptoError;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
    use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

    /// Startet den Handshake auf einer In-Memory-Verbindung und schreibt die
    /// Client-Zeilen
    async fn mit_client(
        client_zeilen: &str,
    ) -> (SignalingResult<HandshakeErgebnis>, String) {
        let state = test_state();
        let (server_io, client_io) = tokio::io::duplex(64 * 1024);
        let (server_lesen, server_schreiben) = tokio::io::split(server_io);
        let (client_lesen, mut client_schreiben) = tokio::io::split(client_io);

        client_schreiben
            .write_all(client_zeilen.as_bytes())
            .await
            .unwrap();
        client_schreiben.shutdown().await.unwrap();

        let mut leser = FramedRead::new(server_lesen, ZeilenCodec::neu(4096));
        let mut schreiber = FramedWrite::new(server_schreiben, LinesCodec::new());
        let ergebnis = durchfuehren(&mut leser, &mut schreiber, &state).await;

        let mut server_zeile = String::new();
        BufReader::new(client_lesen)
            .read_line(&mut server_zeile)
            .await
            .unwrap();
        (ergebnis, server_zeile)
    }

    #[tokio::test]
    async fn erfolgreicher_handshake() {
        let client = client_paar().oeffentlich().als_zeile();
        let (ergebnis, server_zeile) = mit_client(&format!("alice\r\n{client}\n")).await;

        let ergebnis = ergebnis.unwrap();
        assert_eq!(ergebnis.name, "alice");
        assert_eq!(&ergebnis.schluessel, client_paar().oeffentlich());

        // Server-Schluessel muss parsebar sein
        assert!(OeffentlicherSchluessel::aus_zeile(&server_zeile).is_ok());
    }

    #[tokio::test]
    async fn leerer_name_ist_erlaubt() {
        let client = client_paar().oeffentlich().als_zeile();
        let (ergebnis, _) = mit_client(&format!("\n{client}\n")).await;
        assert_eq!(ergebnis.unwrap().name, "");
    }

    #[tokio::test]
    async fn kaputter_schluessel_bricht_ab() {
        let (ergebnis, _) = mit_client("alice\nkein schluessel\n").await;
        assert!(matches!(
            ergebnis,
            Err(SignalingError::Krypto(CryptoError::SchluesselFormat(_)))
        ));
    }

    #[tokio::test]
    async fn zu_kleiner_schluessel_wird_abgelehnt() {
        // 3233 = 61 * 53, klassisches Lehrbuch-RSA
        let (ergebnis, _) = mit_client("alice\n3233 17\n").await;
        assert!(matches!(
            ergebnis,
            Err(SignalingError::Krypto(
                CryptoError::SchluesselZuKlein { .. } | CryptoError::SchluesselFormat(_)
            ))
        ));
    }

    #[tokio::test]
    async fn verbindungsende_vor_schluessel() {
        let (ergebnis, _) = mit_client("alice\n").await;
        assert!(matches!(ergebnis, Err(SignalingError::VerbindungGetrennt)));
    }
}
