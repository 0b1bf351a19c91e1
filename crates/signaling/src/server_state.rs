//! Gemeinsamer Server-Zustand fuer den Signaling-Service
//!
//! Haelt alle geteilten Services und Zustands-Manager als Arc-Referenzen,
//! die sicher zwischen tokio-Tasks geteilt werden koennen.

use fluesterpost_chat::{ChatService, RaumRegistry, SessionRegistry};
use fluesterpost_core::{AuditEreignis, AuditSink};
use fluesterpost_crypto::SchluesselPaar;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::broadcast::NachrichtenRouter;

/// Konfiguration fuer den Signaling-Service
#[derive(Debug, Clone)]
pub struct SignalingConfig {
    /// Maximale gleichzeitige Verbindungen
    pub max_clients: usize,
    /// Abstand zwischen zwei `/spam`-Wiederholungen
    pub spam_intervall: Duration,
    /// Maximale Anzahl Wiederholungen pro `/spam`
    pub spam_max: u32,
    /// Maximale Laenge einer eingehenden Zeile in Bytes
    pub max_zeilen_laenge: usize,
    /// Zeit fuer den kompletten Handshake
    pub handshake_timeout: Duration,
    /// Mindestgroesse des Client-Schluessels in Bit
    pub min_client_schluessel_bits: usize,
    /// Groesse der Ausgangs-Queue pro Session
    pub ausgangs_queue: usize,
}

impl Default for SignalingConfig {
    fn default() -> Self {
        Self {
            max_clients: 512,
            spam_intervall: Duration::from_millis(250),
            spam_max: 50,
            max_zeilen_laenge: 4096,
            handshake_timeout: Duration::from_secs(30),
            min_client_schluessel_bits: 1024,
            ausgangs_queue: 128,
        }
    }
}

/// Gemeinsamer Server-Zustand (thread-safe, Arc-geteilt)
pub struct ServerState {
    /// Server-Konfiguration
    pub config: Arc<SignalingConfig>,
    /// Schluesselpaar des Servers, einmal beim Start erzeugt
    pub schluessel: Arc<SchluesselPaar>,
    /// Sessions, Raeume und Berechtigungen
    pub chat: ChatService,
    /// Zustellung verschluesselter Nachrichten
    pub router: NachrichtenRouter,
    /// Ziel fuer Audit-Ereignisse
    pub audit: Arc<dyn AuditSink>,
    /// Startzeitpunkt des Servers (fuer Uptime-Berechnung)
    pub start_time: Instant,
}

impl ServerState {
    /// Erstellt einen neuen ServerState mit leeren Registries
    pub fn neu(
        config: SignalingConfig,
        schluessel: Arc<SchluesselPaar>,
        audit: Arc<dyn AuditSink>,
    ) -> Arc<Self> {
        let sessions = SessionRegistry::neu();
        let router = NachrichtenRouter::neu(sessions.clone());
        Arc::new(Self {
            config: Arc::new(config),
            schluessel,
            chat: ChatService::neu(sessions, RaumRegistry::neu()),
            router,
            audit,
            start_time: Instant::now(),
        })
    }

    /// Reicht ein Ereignis an die Audit-Sink weiter
    pub fn audit(&self, ereignis: AuditEreignis) {
        tracing::debug!(ereignis = %ereignis, "Audit");
        self.audit.ereignis_schreiben(&ereignis);
    }

    /// Anzahl der registrierten Sessions
    pub fn online_anzahl(&self) -> usize {
        self.chat.sessions().anzahl()
    }

    /// Gibt die Uptime in Sekunden zurueck
    pub fn uptime_sek(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
