//! Client-Connection – Verwaltet eine einzelne TCP-Verbindung
//!
//! Jede TCP-Verbindung bekommt eine `ClientConnection` in einem eigenen
//! tokio-Task. Die Schreibhaelfte gehoert einem separaten Schreib-Task, der
//! die Ausgangs-Queue der Session abarbeitet.
//!
//! ## State Machine
//! ```text
//! WartetAufHandshake -> Aktiv -> Geschlossen
//!         |                          ^
//!         +------ Fehler/Timeout ----+
//! ```

use fluesterpost_core::{AuditEreignis, SessionId};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};

use crate::codec::{EingangsZeile, ZeilenCodec};
use crate::dispatcher::{Dispatcher, Fortsetzung};
use crate::error::SignalingError;
use crate::handshake;
use crate::server_state::ServerState;

/// Wie lange nach Verbindungsende noch ausstehende Umschlaege geschrieben werden
const NACHLAUF: Duration = Duration::from_secs(1);

/// Zustand der TCP-Verbindung
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbindungsZustand {
    /// Verbunden, Schluesselaustausch laeuft
    WartetAufHandshake,
    /// Session registriert, Befehle werden verarbeitet
    Aktiv,
    /// Verbindung beendet, Session entfernt
    Geschlossen,
}

/// Verarbeitet eine einzelne TCP-Verbindung
pub struct ClientConnection {
    state: Arc<ServerState>,
    peer_addr: SocketAddr,
    zustand: VerbindungsZustand,
}

impl ClientConnection {
    /// Erstellt eine neue ClientConnection
    pub fn neu(state: Arc<ServerState>, peer_addr: SocketAddr) -> Self {
        Self {
            state,
            peer_addr,
            zustand: VerbindungsZustand::WartetAufHandshake,
        }
    }

    fn zustand_setzen(&mut self, neu: VerbindungsZustand) {
        tracing::trace!(peer = %self.peer_addr, von = ?self.zustand, nach = ?neu, "Zustandswechsel");
        self.zustand = neu;
    }

    /// Startet die Verbindungs-Verarbeitungsschleife
    ///
    /// Laeuft bis der Client trennt, `/exit` sendet, ein Lesefehler auftritt
    /// oder ein Shutdown-Signal eingeht.
    pub async fn verarbeiten(mut self, stream: TcpStream, mut shutdown_rx: watch::Receiver<bool>) {
        let peer_addr = self.peer_addr;
        let config = Arc::clone(&self.state.config);
        tracing::info!(peer = %peer_addr, "Neue Verbindung");

        let (lesen, schreiben) = stream.into_split();
        let mut leser = FramedRead::new(lesen, ZeilenCodec::neu(config.max_zeilen_laenge));
        let mut schreiber = FramedWrite::new(schreiben, LinesCodec::new());

        // Handshake
        let ergebnis = match tokio::time::timeout(
            config.handshake_timeout,
            handshake::durchfuehren(&mut leser, &mut schreiber, &self.state),
        )
        .await
        {
            Ok(Ok(ergebnis)) => ergebnis,
            Ok(Err(e)) => {
                tracing::warn!(peer = %peer_addr, fehler = %e, "Handshake abgebrochen");
                self.zustand_setzen(VerbindungsZustand::Geschlossen);
                return;
            }
            Err(_) => {
                tracing::warn!(
                    peer = %peer_addr,
                    fehler = %SignalingError::Timeout,
                    "Handshake abgebrochen"
                );
                self.zustand_setzen(VerbindungsZustand::Geschlossen);
                return;
            }
        };

        // Registrierung
        let (ausgang_tx, ausgang_rx) = mpsc::channel(config.ausgangs_queue);
        let id = self.state.chat.sessions().registrieren(
            ergebnis.name.clone(),
            ergebnis.schluessel,
            ausgang_tx,
        );
        self.zustand_setzen(VerbindungsZustand::Aktiv);
        tracing::info!(peer = %peer_addr, session = %id, name = %ergebnis.name, "Client verbunden");
        self.state.audit(AuditEreignis::Verbunden {
            name: ergebnis.name,
            adresse: peer_addr.to_string(),
        });

        let mut schreib_task = tokio::spawn(schreib_schleife(schreiber, ausgang_rx, peer_addr));
        let mut schreib_task_fertig = false;
        let dispatcher = Dispatcher::neu(Arc::clone(&self.state));

        loop {
            tokio::select! {
                // Eingehende Zeile vom Client
                zeile = leser.next() => {
                    match zeile {
                        Some(Ok(EingangsZeile::Zeile(umschlag))) => {
                            if dispatcher.zeile_verarbeiten(id, &umschlag).await == Fortsetzung::Beenden {
                                break;
                            }
                        }
                        Some(Ok(EingangsZeile::ZuLang)) => {
                            tracing::warn!(peer = %peer_addr, session = %id, "Zeile zu lang – verworfen");
                            self.state.router.hinweis(
                                &id,
                                &format!("Zeile zu lang (maximal {} Bytes), verworfen", config.max_zeilen_laenge),
                            );
                        }
                        Some(Err(e)) => {
                            tracing::warn!(peer = %peer_addr, fehler = %e, "Lesefehler");
                            break;
                        }
                        None => {
                            tracing::info!(peer = %peer_addr, "Verbindung vom Client getrennt");
                            break;
                        }
                    }
                }

                // Schreib-Task beendet (Socket kaputt)
                _ = &mut schreib_task => {
                    schreib_task_fertig = true;
                    tracing::debug!(peer = %peer_addr, "Schreib-Task beendet");
                    break;
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!(peer = %peer_addr, "Shutdown-Signal – Verbindung wird getrennt");
                        self.state.router.hinweis(&id, "Server wird heruntergefahren");
                        break;
                    }
                }
            }
        }

        self.aufraeumen(id);

        // Nach dem Entfernen gibt es keinen Sender mehr; der Schreib-Task leert
        // die Queue und endet
        if !schreib_task_fertig && tokio::time::timeout(NACHLAUF, &mut schreib_task).await.is_err() {
            schreib_task.abort();
        }

        tracing::info!(peer = %peer_addr, "Verbindungs-Task beendet");
    }

    fn aufraeumen(&mut self, id: SessionId) {
        self.zustand_setzen(VerbindungsZustand::Geschlossen);
        if let Some(eintrag) = self.state.chat.trennen(id) {
            tracing::info!(session = %id, name = %eintrag.name, "Session entfernt");
            self.state.audit(AuditEreignis::Getrennt { name: eintrag.name });
        }
    }
}

/// Schreibt Umschlaege aus der Ausgangs-Queue auf den Socket
async fn schreib_schleife(
    mut schreiber: FramedWrite<OwnedWriteHalf, LinesCodec>,
    mut ausgang: mpsc::Receiver<String>,
    peer_addr: SocketAddr,
) {
    while let Some(umschlag) = ausgang.recv().await {
        if let Err(e) = schreiber.send(umschlag).await {
            tracing::warn!(peer = %peer_addr, fehler = %e, "Senden fehlgeschlagen");
            break;
        }
    }
    tracing::trace!(peer = %peer_addr, "Ausgangs-Queue geschlossen");
}
