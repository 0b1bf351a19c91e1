//! fluesterpost-server – Bibliotheks-Root
//!
//! Deklariert alle Server-Module und stellt den oeffentlichen Einstiegspunkt
//! fuer Integrationstests bereit.

pub mod audit;
pub mod config;
pub mod logging;

use anyhow::{Context, Result};
use audit::DateiAudit;
use config::ServerConfig;
use fluesterpost_core::{AuditEreignis, AuditSink, KeinAudit};
use fluesterpost_crypto::SchluesselPaar;
use fluesterpost_signaling::{ServerState, SignalingServer};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};

/// Wie lange nach dem Shutdown auf ausstehende Audit-Zeilen gewartet wird
const AUDIT_NACHLAUF: Duration = Duration::from_secs(3);

/// Haelt den laufenden Server-Zustand zusammen
pub struct Server {
    pub config: ServerConfig,
}

impl Server {
    /// Erstellt einen neuen Server aus der gegebenen Konfiguration
    pub fn neu(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Startet alle Server-Subsysteme und laeuft bis Ctrl-C
    pub async fn starten(self) -> Result<()> {
        self.laufen_bis(
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(fehler = %e, "Ctrl-C-Handler konnte nicht installiert werden");
                }
            },
            None,
        )
        .await
    }

    /// Startet den Server und faehrt ihn herunter, sobald `shutdown` fertig ist
    ///
    /// Reihenfolge:
    /// 1. Server-Schluesselpaar erzeugen
    /// 2. Audit-Log oeffnen
    /// 3. TCP-Listener binden (Fehler hier sind fatal)
    /// 4. Auf `shutdown` warten, Clients benachrichtigen, Audit-Log leeren
    ///
    /// Ist `bereit` gesetzt, erhaelt es die tatsaechlich gebundene Adresse.
    pub async fn laufen_bis(
        self,
        shutdown: impl Future<Output = ()>,
        bereit: Option<oneshot::Sender<SocketAddr>>,
    ) -> Result<()> {
        self.config.validieren()?;

        let bind_text = self.config.tcp_bind_adresse();
        let bind_addr: SocketAddr = bind_text
            .parse()
            .with_context(|| format!("Ungueltige Bind-Adresse '{bind_text}'"))?;

        tracing::info!(
            server_name = %self.config.server.name,
            tcp = %bind_addr,
            max_clients = self.config.server.max_clients,
            "Server startet"
        );

        let bits = self.config.krypto.schluessel_bits;
        tracing::info!(bits, "Erzeuge Server-Schluesselpaar");
        let schluessel = tokio::task::spawn_blocking(move || SchluesselPaar::generieren(bits))
            .await
            .context("Schluesselerzeugung abgebrochen")?
            .context("Schluesselerzeugung fehlgeschlagen")?;

        let (audit, audit_task): (Arc<dyn AuditSink>, _) = if self.config.audit.aktiviert {
            let (audit, task) = DateiAudit::starten(&self.config.audit.datei)
                .await
                .with_context(|| {
                    format!("Audit-Datei '{}' nicht beschreibbar", self.config.audit.datei)
                })?;
            (Arc::new(audit), Some(task))
        } else {
            tracing::info!("Audit-Log deaktiviert");
            (Arc::new(KeinAudit), None)
        };

        let state = ServerState::neu(
            self.config.signaling_config(),
            Arc::new(schluessel),
            audit,
        );

        let server = SignalingServer::binden(Arc::clone(&state), bind_addr)
            .await
            .with_context(|| format!("TCP-Listener konnte nicht an {bind_addr} binden"))?;
        let adresse = server.lokale_adresse()?;
        state.audit(AuditEreignis::ServerGestartet {
            adresse: adresse.to_string(),
        });
        if let Some(bereit) = bereit {
            let _ = bereit.send(adresse);
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let server_task = tokio::spawn(server.starten(shutdown_rx));

        tracing::info!("Server laeuft. Warte auf Shutdown-Signal (Ctrl-C)...");
        shutdown.await;
        tracing::info!("Shutdown-Signal empfangen, Server wird beendet");

        // Listener und alle Verbindungen stoppen
        let _ = shutdown_tx.send(true);
        server_task.await.context("TCP-Server-Task abgebrochen")??;

        // Der Audit-Task endet erst, wenn auch die Verbindungs-Tasks ihren
        // Zustand freigegeben haben
        drop(state);
        if let Some(task) = audit_task {
            if tokio::time::timeout(AUDIT_NACHLAUF, task).await.is_err() {
                tracing::warn!("Audit-Log wurde nicht vollstaendig geschrieben");
            }
        }

        tracing::info!("Server beendet");
        Ok(())
    }
}
