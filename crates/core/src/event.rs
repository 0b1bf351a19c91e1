//! Audit-Ereignisse und die Sink-Schnittstelle
//!
//! Der Chat-Kern erzeugt nur Ereignisse. Wie und wohin sie geschrieben
//! werden (Datei, stdout, ...) entscheidet die `AuditSink`-Implementierung
//! im Server-Crate. Nachrichteninhalte werden nicht protokolliert.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Alle zustandsaendernden Aktionen, die im Audit-Log landen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditEreignis {
    /// Server lauscht auf einer Adresse
    ServerGestartet { adresse: String },
    /// Client hat den Handshake abgeschlossen
    Verbunden { name: String, adresse: String },
    /// Client hat die Verbindung getrennt
    Getrennt { name: String },
    /// Anzeigename geaendert
    Umbenannt { alt: String, neu: String },
    /// Direktnachricht (ohne Inhalt)
    Direktnachricht { von: String, an: String },
    /// Nachricht an alle im Raum (`/all` oder `/shout`)
    Rundruf { von: String, raum: String, laut: bool },
    /// Raum wurde erstellt
    RaumErstellt { von: String, raum: String },
    /// Raum betreten
    RaumBetreten { von: String, raum: String },
    /// Raum verlassen
    RaumVerlassen { von: String, raum: String },
    /// Session zum Moderator befoerdert
    Befoerdert { ziel: String, von: String, raum: String },
    /// Session aus einem Raum gekickt
    Gekickt { ziel: String, von: String, raum: String },
    /// `/spam` ausgefuehrt
    Spam { von: String, raum: String, anzahl: u32 },
}

impl fmt::Display for AuditEreignis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerGestartet { adresse } => {
                write!(f, "Server started on {adresse} successfully")
            }
            Self::Verbunden { name, adresse } => {
                write!(f, "Client connected: '{name}', Connection: {adresse}")
            }
            Self::Getrennt { name } => write!(f, "'{name}' DISCONNECTED"),
            Self::Umbenannt { alt, neu } => write!(f, "'{alt}' changed username to '{neu}'"),
            Self::Direktnachricht { von, an } => write!(f, "'{von}' WHISPER -> '{an}'"),
            Self::Rundruf { von, raum, laut } => {
                let art = if *laut { "SHOUT" } else { "BROADCAST" };
                write!(f, "'{von}' {art} -> '{raum}'")
            }
            Self::RaumErstellt { von, raum } => write!(f, "'{von}' CREATED A ROOM -> '{raum}'"),
            Self::RaumBetreten { von, raum } => write!(f, "'{von}' JOINED A ROOM -> '{raum}'"),
            Self::RaumVerlassen { von, raum } => write!(f, "'{von}' QUIT A ROOM -> '{raum}'"),
            Self::Befoerdert { ziel, von, raum } => {
                write!(f, "'{ziel}' PROMOTED TO A MOD BY -> '{von}' FOR ROOM -> '{raum}'")
            }
            Self::Gekickt { ziel, von, raum } => {
                write!(f, "'{von}' KICKED '{ziel}' FROM ROOM -> '{raum}'")
            }
            Self::Spam { von, raum, anzahl } => {
                write!(f, "'{von}' SPAMMED '{raum}' {anzahl} Times")
            }
        }
    }
}

/// Empfaenger fuer Audit-Ereignisse
///
/// Implementierungen muessen schnell zurueckkehren; der Aufruf erfolgt
/// direkt aus den Verbindungs-Tasks heraus.
pub trait AuditSink: Send + Sync + 'static {
    /// Nimmt ein Ereignis entgegen (Reihenfolge = Aufrufreihenfolge)
    fn ereignis_schreiben(&self, ereignis: &AuditEreignis);
}

/// Sink, die alle Ereignisse verwirft
#[derive(Debug, Default, Clone, Copy)]
pub struct KeinAudit;

impl AuditSink for KeinAudit {
    fn ereignis_schreiben(&self, _ereignis: &AuditEreignis) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ereignis_text_fuer_kick() {
        let e = AuditEreignis::Gekickt {
            ziel: "bob".into(),
            von: "alice".into(),
            raum: "lobby".into(),
        };
        assert_eq!(e.to_string(), "'alice' KICKED 'bob' FROM ROOM -> 'lobby'");
    }

    #[test]
    fn rundruf_unterscheidet_shout() {
        let leise = AuditEreignis::Rundruf {
            von: "a".into(),
            raum: "r".into(),
            laut: false,
        };
        let laut = AuditEreignis::Rundruf {
            von: "a".into(),
            raum: "r".into(),
            laut: true,
        };
        assert!(leise.to_string().contains("BROADCAST"));
        assert!(laut.to_string().contains("SHOUT"));
    }

    #[test]
    fn ereignis_ist_serde_kompatibel() {
        let event = AuditEreignis::Spam {
            von: "alice".into(),
            raum: "lobby".into(),
            anzahl: 3,
        };
        let json = serde_json::to_string(&event).unwrap();
        let zurueck: AuditEreignis = serde_json::from_str(&json).unwrap();
        assert_eq!(zurueck, event);
    }
}
