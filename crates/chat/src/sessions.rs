//! Session-Registry – Wer ist verbunden, unter welchem Namen, in welchem Raum
//!
//! Haelt alle Sessions in einer `BTreeMap`, sortiert nach `SessionId`. Da IDs
//! aufsteigend vergeben werden, ist "erster Treffer" bei Namenssuche immer die
//! am laengsten verbundene Session mit diesem Namen.

use fluesterpost_core::{SessionId, SessionIdGenerator};
use fluesterpost_crypto::OeffentlicherSchluessel;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{ChatError, ChatResult};
use crate::types::{Empfaenger, SessionEintrag};

/// Verzeichnis aller verbundenen Sessions
///
/// Thread-safe via Arc + RwLock. Clone teilt den inneren Zustand.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<SessionRegistryInner>,
}

struct SessionRegistryInner {
    sessions: RwLock<BTreeMap<SessionId, SessionEintrag>>,
    ids: SessionIdGenerator,
}

impl SessionRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self {
            inner: Arc::new(SessionRegistryInner {
                sessions: RwLock::new(BTreeMap::new()),
                ids: SessionIdGenerator::neu(),
            }),
        }
    }

    /// Registriert eine Session nach erfolgreichem Handshake
    pub fn registrieren(
        &self,
        name: String,
        schluessel: OeffentlicherSchluessel,
        ausgang: mpsc::Sender<String>,
    ) -> SessionId {
        let id = self.inner.ids.naechste();
        let eintrag = SessionEintrag {
            id,
            name,
            aktueller_raum: None,
            schluessel,
            ausgang,
        };
        tracing::debug!(session = %id, name = %eintrag.name, "Session registriert");
        self.inner.sessions.write().insert(id, eintrag);
        id
    }

    /// Entfernt eine Session und gibt ihren letzten Zustand zurueck
    pub fn entfernen(&self, id: &SessionId) -> Option<SessionEintrag> {
        self.inner.sessions.write().remove(id)
    }

    /// Prueft ob eine Session registriert ist
    pub fn ist_registriert(&self, id: &SessionId) -> bool {
        self.inner.sessions.read().contains_key(id)
    }

    /// Anzahl der verbundenen Sessions
    pub fn anzahl(&self) -> usize {
        self.inner.sessions.read().len()
    }

    pub fn name_von(&self, id: &SessionId) -> Option<String> {
        self.inner.sessions.read().get(id).map(|s| s.name.clone())
    }

    pub fn aktueller_raum(&self, id: &SessionId) -> Option<String> {
        self.inner
            .sessions
            .read()
            .get(id)
            .and_then(|s| s.aktueller_raum.clone())
    }

    /// Setzt einen neuen Anzeigenamen und gibt den alten zurueck
    pub fn umbenennen(&self, id: &SessionId, neuer_name: String) -> ChatResult<String> {
        let mut sessions = self.inner.sessions.write();
        let eintrag = sessions
            .get_mut(id)
            .ok_or(ChatError::SessionNichtGefunden(*id))?;
        Ok(std::mem::replace(&mut eintrag.name, neuer_name))
    }

    /// Setzt den aktuellen Raum und gibt den vorherigen zurueck
    pub fn raum_setzen(&self, id: &SessionId, raum: Option<String>) -> ChatResult<Option<String>> {
        let mut sessions = self.inner.sessions.write();
        let eintrag = sessions
            .get_mut(id)
            .ok_or(ChatError::SessionNichtGefunden(*id))?;
        Ok(std::mem::replace(&mut eintrag.aktueller_raum, raum))
    }

    /// Leert den Raum einer Session, aber nur wenn sie noch in `raum` ist
    ///
    /// Gibt `true` zurueck wenn der Raum geleert wurde.
    pub fn raum_leeren_falls(&self, id: &SessionId, raum: &str) -> bool {
        let mut sessions = self.inner.sessions.write();
        match sessions.get_mut(id) {
            Some(eintrag) if eintrag.aktueller_raum.as_deref() == Some(raum) => {
                eintrag.aktueller_raum = None;
                true
            }
            _ => false,
        }
    }

    /// Erste Session (Verbindungsreihenfolge) mit diesem Anzeigenamen
    pub fn erste_nach_name(&self, name: &str) -> Option<SessionId> {
        self.inner
            .sessions
            .read()
            .values()
            .find(|s| s.name == name)
            .map(|s| s.id)
    }

    /// Zustell-Ziel fuer eine Session
    pub fn empfaenger(&self, id: &SessionId) -> Option<Empfaenger> {
        self.inner.sessions.read().get(id).map(SessionEintrag::als_empfaenger)
    }

    /// Zustell-Ziel fuer den ersten Treffer nach Anzeigename
    pub fn empfaenger_nach_name(&self, name: &str) -> Option<Empfaenger> {
        self.inner
            .sessions
            .read()
            .values()
            .find(|s| s.name == name)
            .map(SessionEintrag::als_empfaenger)
    }

    /// Alle Sessions in `raum` ausser `ausser`
    ///
    /// Die Liste wird unter einem einzigen Read-Lock erstellt.
    pub fn empfaenger_in_raum(&self, raum: &str, ausser: Option<&SessionId>) -> Vec<Empfaenger> {
        self.inner
            .sessions
            .read()
            .values()
            .filter(|s| s.aktueller_raum.as_deref() == Some(raum))
            .filter(|s| Some(&s.id) != ausser)
            .map(SessionEintrag::als_empfaenger)
            .collect()
    }

    /// Namen aller Sessions in Verbindungsreihenfolge
    pub fn alle_namen(&self) -> Vec<String> {
        self.inner
            .sessions
            .read()
            .values()
            .map(|s| s.name.clone())
            .collect()
    }

    /// Namen aller Sessions, deren aktueller Raum `raum` ist
    pub fn namen_in_raum(&self, raum: &str) -> Vec<String> {
        self.inner
            .sessions
            .read()
            .values()
            .filter(|s| s.aktueller_raum.as_deref() == Some(raum))
            .map(|s| s.name.clone())
            .collect()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::neu()
    }
}
