//! Server-Konfiguration
//!
//! Wird beim Start aus einer TOML-Datei geladen. Alle Felder haben
//! sinnvolle Standardwerte, sodass der Server ohne Konfigurationsdatei
//! lauffaehig ist.

use fluesterpost_signaling::SignalingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Vollstaendige Server-Konfiguration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Allgemeine Server-Einstellungen
    pub server: ServerEinstellungen,
    /// Netzwerk-Einstellungen
    pub netzwerk: NetzwerkEinstellungen,
    /// RSA-Einstellungen
    pub krypto: KryptoEinstellungen,
    /// Chat-Verhalten und Grenzen
    pub chat: ChatEinstellungen,
    /// Audit-Log
    pub audit: AuditEinstellungen,
    /// Logging-Einstellungen
    pub logging: LoggingEinstellungen,
}

/// Allgemeine Server-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEinstellungen {
    /// Anzeigename des Servers
    pub name: String,
    /// Maximale Anzahl gleichzeitiger Clients
    pub max_clients: usize,
}

impl Default for ServerEinstellungen {
    fn default() -> Self {
        Self {
            name: "Fluesterpost".into(),
            max_clients: 512,
        }
    }
}

/// Netzwerk-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetzwerkEinstellungen {
    /// Bind-Adresse fuer den TCP-Listener
    pub bind_adresse: String,
    /// Port fuer den TCP-Listener
    pub tcp_port: u16,
}

impl Default for NetzwerkEinstellungen {
    fn default() -> Self {
        Self {
            bind_adresse: "0.0.0.0".into(),
            tcp_port: 8080,
        }
    }
}

/// RSA-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KryptoEinstellungen {
    /// Modulus-Laenge des Server-Schluessels
    pub schluessel_bits: usize,
    /// Kleinster akzeptierter Client-Schluessel
    pub min_client_schluessel_bits: usize,
}

impl Default for KryptoEinstellungen {
    fn default() -> Self {
        Self {
            schluessel_bits: 2048,
            min_client_schluessel_bits: 1024,
        }
    }
}

/// Chat-Verhalten und Grenzen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEinstellungen {
    /// Abstand zwischen zwei `/spam`-Nachrichten in Millisekunden
    pub spam_intervall_ms: u64,
    /// Maximale Wiederholungen pro `/spam`
    pub spam_max: u32,
    /// Maximale Laenge einer eingehenden Zeile in Bytes
    pub max_zeilen_laenge: usize,
    /// Zeit fuer den Schluesselaustausch in Sekunden
    pub handshake_timeout_sek: u64,
}

impl Default for ChatEinstellungen {
    fn default() -> Self {
        Self {
            spam_intervall_ms: 250,
            spam_max: 50,
            max_zeilen_laenge: 4096,
            handshake_timeout_sek: 30,
        }
    }
}

/// Audit-Log-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditEinstellungen {
    /// Schreibt Ereignisse in `datei`
    pub aktiviert: bool,
    /// Pfad der Audit-Datei (wird angehaengt)
    pub datei: String,
}

impl Default for AuditEinstellungen {
    fn default() -> Self {
        Self {
            aktiviert: true,
            datei: "sessionHistory.txt".into(),
        }
    }
}

/// Logging-Einstellungen
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingEinstellungen {
    /// Log-Level: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Format: "json" oder "text"
    pub format: String,
}

impl Default for LoggingEinstellungen {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

impl ServerConfig {
    /// Laedt die Konfiguration aus einer TOML-Datei.
    /// Gibt die Standardkonfiguration zurueck wenn die Datei nicht existiert.
    pub fn laden(pfad: &str) -> anyhow::Result<Self> {
        match std::fs::read_to_string(pfad) {
            Ok(inhalt) => {
                let config: Self = toml::from_str(&inhalt)
                    .map_err(|e| anyhow::anyhow!("Konfigurationsfehler in '{pfad}': {e}"))?;
                config.validieren()?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    pfad = pfad,
                    "Konfigurationsdatei nicht gefunden, verwende Standardwerte"
                );
                Ok(Self::default())
            }
            Err(e) => Err(anyhow::anyhow!(
                "Konfigurationsdatei '{pfad}' nicht lesbar: {e}"
            )),
        }
    }

    /// Prueft Werte, die der Server nicht sinnvoll verwenden kann
    pub fn validieren(&self) -> anyhow::Result<()> {
        if self.krypto.schluessel_bits < 1024 {
            anyhow::bail!(
                "krypto.schluessel_bits muss mindestens 1024 sein (ist {})",
                self.krypto.schluessel_bits
            );
        }
        if self.server.max_clients == 0 {
            anyhow::bail!("server.max_clients muss groesser als 0 sein");
        }
        if self.chat.spam_max == 0 {
            anyhow::bail!("chat.spam_max muss groesser als 0 sein");
        }
        if self.chat.max_zeilen_laenge == 0 {
            anyhow::bail!("chat.max_zeilen_laenge muss groesser als 0 sein");
        }
        Ok(())
    }

    /// Gibt die vollstaendige Bind-Adresse fuer TCP zurueck
    pub fn tcp_bind_adresse(&self) -> String {
        format!("{}:{}", self.netzwerk.bind_adresse, self.netzwerk.tcp_port)
    }

    /// Einstellungen fuer den Signaling-Layer
    pub fn signaling_config(&self) -> SignalingConfig {
        SignalingConfig {
            max_clients: self.server.max_clients,
            spam_intervall: Duration::from_millis(self.chat.spam_intervall_ms),
            spam_max: self.chat.spam_max,
            max_zeilen_laenge: self.chat.max_zeilen_laenge,
            handshake_timeout: Duration::from_secs(self.chat.handshake_timeout_sek),
            min_client_schluessel_bits: self.krypto.min_client_schluessel_bits,
            ..SignalingConfig::default()
        }
    }
}
