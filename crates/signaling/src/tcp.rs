//! TCP-Listener – Bindet Socket, akzeptiert Verbindungen
//!
//! Der `SignalingServer` bindet einen TCP-Socket und startet fuer jede
//! eingehende Verbindung einen eigenen tokio-Task mit einer `ClientConnection`.
//! Verbindungen ueber `max_clients` hinaus werden sofort geschlossen.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::connection::ClientConnection;
use crate::server_state::ServerState;

/// TCP-Server fuer Chat-Verbindungen
pub struct SignalingServer {
    state: Arc<ServerState>,
    listener: TcpListener,
    aktive: Arc<AtomicUsize>,
}

/// Zaehlt eine offene Verbindung, solange er lebt
struct VerbindungsPlatz(Arc<AtomicUsize>);

impl Drop for VerbindungsPlatz {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl SignalingServer {
    /// Bindet den Listener an `bind_addr`
    ///
    /// Ein Bind-Fehler ist der einzige Fehler, der den Start verhindert.
    pub async fn binden(state: Arc<ServerState>, bind_addr: SocketAddr) -> std::io::Result<Self> {
        let listener = TcpListener::bind(bind_addr).await?;
        Ok(Self {
            state,
            listener,
            aktive: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Tatsaechlich gebundene Adresse (bei Port 0 der zugewiesene Port)
    pub fn lokale_adresse(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Akzeptiert Verbindungen bis `shutdown_rx` ein `true`-Signal empfaengt
    pub async fn starten(self, mut shutdown_rx: watch::Receiver<bool>) -> std::io::Result<()> {
        let lokale_addr = self.listener.local_addr()?;
        tracing::info!(adresse = %lokale_addr, "TCP-Server gestartet");

        loop {
            tokio::select! {
                // Neue eingehende Verbindung
                result = self.listener.accept() => {
                    match result {
                        Ok((stream, peer_addr)) => {
                            let max = self.state.config.max_clients;
                            if self.aktive.fetch_add(1, Ordering::SeqCst) >= max {
                                self.aktive.fetch_sub(1, Ordering::SeqCst);
                                tracing::warn!(
                                    peer = %peer_addr,
                                    max,
                                    "Server voll – Verbindung abgelehnt"
                                );
                                drop(stream);
                                continue;
                            }
                            let platz = VerbindungsPlatz(Arc::clone(&self.aktive));

                            tracing::debug!(peer = %peer_addr, "Verbindung akzeptiert");
                            let verbindung = ClientConnection::neu(Arc::clone(&self.state), peer_addr);
                            let shutdown_rx_clone = shutdown_rx.clone();

                            tokio::spawn(async move {
                                let _platz = platz;
                                verbindung.verarbeiten(stream, shutdown_rx_clone).await;
                            });
                        }
                        Err(e) => {
                            tracing::error!(fehler = %e, "TCP-Accept-Fehler");
                            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                        }
                    }
                }

                // Shutdown-Signal
                Ok(()) = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        tracing::info!("TCP-Server: Shutdown-Signal empfangen");
                        break;
                    }
                }
            }
        }

        tracing::info!(
            uptime_sek = self.state.uptime_sek(),
            sessions = self.state.online_anzahl(),
            "TCP-Server gestoppt"
        );
        Ok(())
    }
}
