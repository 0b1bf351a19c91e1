//! Audit-Log in eine Textdatei
//!
//! `DateiAudit` nimmt Ereignisse synchron entgegen, versieht sie mit einem
//! Zeitstempel und reicht sie an einen einzelnen Schreib-Task weiter. Damit
//! blockiert kein Verbindungs-Task auf Datei-I/O und die Zeilen landen in
//! Aufrufreihenfolge in der Datei.

use fluesterpost_core::{AuditEreignis, AuditSink};
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Zeitstempel-Format am Zeilenanfang
const ZEIT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Audit-Sink, die an eine Datei anhaengt
#[derive(Debug, Clone)]
pub struct DateiAudit {
    tx: mpsc::UnboundedSender<String>,
}

impl DateiAudit {
    /// Oeffnet (bzw. erstellt) die Datei und startet den Schreib-Task
    ///
    /// Der Task endet, sobald alle Klone von `DateiAudit` gedroppt sind
    /// und die Queue leer ist.
    pub async fn starten(pfad: impl AsRef<Path>) -> std::io::Result<(Self, JoinHandle<()>)> {
        let pfad = pfad.as_ref();
        let datei = OpenOptions::new()
            .create(true)
            .append(true)
            .open(pfad)
            .await?;
        tracing::info!(pfad = %pfad.display(), "Audit-Log geoeffnet");

        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(schreib_schleife(datei, rx));
        Ok((Self { tx }, task))
    }
}

impl AuditSink for DateiAudit {
    fn ereignis_schreiben(&self, ereignis: &AuditEreignis) {
        if self.tx.send(zeile_formatieren(ereignis)).is_err() {
            tracing::warn!(ereignis = %ereignis, "Audit-Task beendet – Ereignis verloren");
        }
    }
}

/// `[YYYY-MM-DD HH:MM:SS]          <text>`
fn zeile_formatieren(ereignis: &AuditEreignis) -> String {
    format!(
        "[{}]          {ereignis}\n",
        chrono::Local::now().format(ZEIT_FORMAT)
    )
}

async fn schreib_schleife(mut datei: File, mut rx: mpsc::UnboundedReceiver<String>) {
    while let Some(zeile) = rx.recv().await {
        if let Err(e) = datei.write_all(zeile.as_bytes()).await {
            tracing::error!(fehler = %e, "Audit-Zeile konnte nicht geschrieben werden");
            continue;
        }
        if let Err(e) = datei.flush().await {
            tracing::error!(fehler = %e, "Audit-Log flush fehlgeschlagen");
        }
    }
    tracing::debug!("Audit-Task beendet");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kick() -> AuditEreignis {
        AuditEreignis::Gekickt {
            ziel: "bob".into(),
            von: "alice".into(),
            raum: "lobby".into(),
        }
    }

    #[test]
    fn zeilenformat() {
        let zeile = zeile_formatieren(&kick());
        assert!(zeile.starts_with('['));
        // "[2024-01-01 12:00:00]" hat 21 Zeichen, danach zehn Leerzeichen
        assert_eq!(&zeile[20..31], "]          ");
        assert!(zeile.ends_with("'alice' KICKED 'bob' FROM ROOM -> 'lobby'\n"));
        assert!(chrono::NaiveDateTime::parse_from_str(&zeile[1..20], ZEIT_FORMAT).is_ok());
    }

    #[tokio::test]
    async fn ereignisse_landen_in_reihenfolge_in_der_datei() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("sessionHistory.txt");

        let (audit, task) = DateiAudit::starten(&pfad).await.unwrap();
        audit.ereignis_schreiben(&AuditEreignis::ServerGestartet {
            adresse: "127.0.0.1:8080".into(),
        });
        audit.ereignis_schreiben(&AuditEreignis::Verbunden {
            name: "alice".into(),
            adresse: "127.0.0.1:50000".into(),
        });
        audit.ereignis_schreiben(&kick());
        drop(audit);
        task.await.unwrap();

        let inhalt = tokio::fs::read_to_string(&pfad).await.unwrap();
        let zeilen: Vec<&str> = inhalt.lines().collect();
        assert_eq!(zeilen.len(), 3);
        assert!(zeilen[0].ends_with("Server started on 127.0.0.1:8080 successfully"));
        assert!(zeilen[1].contains("Client connected: 'alice'"));
        assert!(zeilen[2].contains("KICKED 'bob'"));
    }

    #[tokio::test]
    async fn bestehende_datei_wird_angehaengt() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("audit.txt");
        tokio::fs::write(&pfad, "alte zeile\n").await.unwrap();

        let (audit, task) = DateiAudit::starten(&pfad).await.unwrap();
        audit.ereignis_schreiben(&AuditEreignis::Getrennt { name: "bob".into() });
        drop(audit);
        task.await.unwrap();

        let inhalt = tokio::fs::read_to_string(&pfad).await.unwrap();
        assert!(inhalt.starts_with("alte zeile\n"));
        assert!(inhalt.trim_end().ends_with("'bob' DISCONNECTED"));
    }

    #[tokio::test]
    async fn nicht_oeffenbarer_pfad_ist_fehler() {
        let dir = tempfile::tempdir().unwrap();
        let pfad = dir.path().join("gibt/es/nicht/audit.txt");
        assert!(DateiAudit::starten(&pfad).await.is_err());
    }
}
