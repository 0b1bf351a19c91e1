//! Nachrichten-Router – Zustellung von Direkt- und Raumnachrichten
//!
//! Jede Zeile wird pro Empfaenger mit dessen oeffentlichem Schluessel
//! versiegelt und in seine Ausgangs-Queue gelegt. Das Format ist immer
//! `<absender>: <nachricht>`.
//!
//! ## Selektive Zustellung
//! - An einen Namen: `direkt_senden` (erster Treffer, sonst still verworfen)
//! - Server-Hinweis: `hinweis` (Absender `SERVER`, lange Texte aufgeteilt)
//! - An einen Raum: `an_raum_senden` (optional ohne den Absender selbst)
//!
//! Die Empfaengerliste ist eine Momentaufnahme aus der `SessionRegistry`;
//! verschluesselt wird ausserhalb jedes Locks. Ein Fehler bei einem Empfaenger
//! bricht die Zustellung an die anderen nie ab.

use fluesterpost_chat::{Empfaenger, SessionRegistry};
use fluesterpost_core::SessionId;
use fluesterpost_crypto::CryptoError;
use tokio::sync::mpsc;

/// Absender-Kennung fuer Server-Antworten und Hinweise
pub const SERVER_ABSENDER: &str = "SERVER";

/// Ergebnis einer Zustellung an einen Empfaenger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zustellung {
    /// Umschlag liegt in der Ausgangs-Queue
    Zugestellt,
    /// Kein Empfaenger mit diesem Namen
    Unbekannt,
    /// Zeile passt nicht in einen Umschlag fuer den Schluessel des Empfaengers
    ZuLang,
    /// Queue voll oder geschlossen, oder sonstiger Kryptofehler
    Verworfen,
}

/// Ergebnis einer Raumnachricht
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RaumZustellung {
    pub zugestellt: usize,
    /// Empfaenger, deren Schluessel fuer die Zeile zu klein ist
    pub zu_lang: usize,
}

/// Router fuer ausgehende Nachrichten
///
/// Clone teilt die zugrundeliegende Registry.
#[derive(Clone)]
pub struct NachrichtenRouter {
    sessions: SessionRegistry,
}

impl NachrichtenRouter {
    /// Erstellt einen Router ueber der gegebenen Registry
    pub fn neu(sessions: SessionRegistry) -> Self {
        Self { sessions }
    }

    /// Sendet an die erste Session mit diesem Anzeigenamen
    ///
    /// Ohne passenden Empfaenger wird nichts geschrieben.
    pub fn direkt_senden(&self, nachricht: &str, ziel_name: &str, absender: &str) -> Zustellung {
        match self.sessions.empfaenger_nach_name(ziel_name) {
            Some(empfaenger) => zustellen(&empfaenger, &zeile(absender, nachricht)),
            None => {
                tracing::debug!(ziel = %ziel_name, "Direktnachricht an unbekannten Namen verworfen");
                Zustellung::Unbekannt
            }
        }
    }

    /// Server-Hinweis an eine Session (Absender `SERVER`)
    ///
    /// Passt der Text nicht in einen Umschlag fuer den Schluessel des
    /// Empfaengers, wird er auf mehrere Zeilen verteilt.
    pub fn hinweis(&self, id: &SessionId, text: &str) -> bool {
        let Some(empfaenger) = self.sessions.empfaenger(id) else {
            tracing::debug!(session = %id, "Hinweis an unbekannte Session");
            return false;
        };
        let platz = empfaenger
            .schluessel
            .max_klartext_laenge()
            .saturating_sub(SERVER_ABSENDER.len() + 2);
        if platz == 0 {
            return false;
        }
        stuecke(text, platz)
            .into_iter()
            .all(|teil| zustellen(&empfaenger, &zeile(SERVER_ABSENDER, teil)) == Zustellung::Zugestellt)
    }

    /// Sendet an alle Sessions in `raum` ausser `ausser`
    pub fn an_raum_senden(
        &self,
        nachricht: &str,
        ausser: Option<&SessionId>,
        absender: &str,
        raum: &str,
    ) -> RaumZustellung {
        let empfaenger = self.sessions.empfaenger_in_raum(raum, ausser);
        let text = zeile(absender, nachricht);
        let mut ergebnis = RaumZustellung::default();
        for e in &empfaenger {
            match zustellen(e, &text) {
                Zustellung::Zugestellt => ergebnis.zugestellt += 1,
                Zustellung::ZuLang => ergebnis.zu_lang += 1,
                Zustellung::Unbekannt | Zustellung::Verworfen => {}
            }
        }
        ergebnis
    }
}

/// Zerlegt `text` in Teile von hoechstens `max` Bytes
///
/// Getrennt wird bevorzugt am letzten Leerzeichen, nie innerhalb eines
/// UTF-8-Zeichens.
fn stuecke(text: &str, max: usize) -> Vec<&str> {
    let mut teile = Vec::new();
    let mut rest = text;
    while rest.len() > max {
        let mut ende = max;
        while ende > 0 && !rest.is_char_boundary(ende) {
            ende -= 1;
        }
        if !rest[ende..].starts_with(' ') {
            if let Some(leer) = rest[..ende].rfind(' ').filter(|&p| p > 0) {
                ende = leer;
            }
        }
        if ende == 0 {
            ende = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        teile.push(&rest[..ende]);
        rest = rest[ende..].trim_start_matches(' ');
    }
    if !rest.is_empty() {
        teile.push(rest);
    }
    teile
}

fn zeile(absender: &str, nachricht: &str) -> String {
    format!("{absender}: {nachricht}")
}

/// Versiegelt `text` fuer einen Empfaenger und reiht den Umschlag ein
fn zustellen(empfaenger: &Empfaenger, text: &str) -> Zustellung {
    let umschlag = match empfaenger.schluessel.versiegeln(text) {
        Ok(u) => u,
        Err(e @ CryptoError::NachrichtZuLang { .. }) => {
            tracing::debug!(session = %empfaenger.id, fehler = %e, "Zeile passt nicht in einen Umschlag");
            return Zustellung::ZuLang;
        }
        Err(e) => {
            tracing::warn!(
                session = %empfaenger.id,
                fehler = %e,
                "Verschluesselung fehlgeschlagen – Nachricht verworfen"
            );
            return Zustellung::Verworfen;
        }
    };

    match empfaenger.ausgang.try_send(umschlag) {
        Ok(()) => Zustellung::Zugestellt,
        Err(mpsc::error::TrySendError::Full(_)) => {
            tracing::warn!(session = %empfaenger.id, "Ausgangs-Queue voll – Nachricht verworfen");
            Zustellung::Verworfen
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            tracing::debug!(session = %empfaenger.id, "Ausgangs-Queue geschlossen (Client getrennt)");
            Zustellung::Verworfen
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
