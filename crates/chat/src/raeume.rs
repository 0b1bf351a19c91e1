//! Raum-Registry – Raeume mit Admin, Moderatoren und Mitgliedern
//!
//! Raeume werden nie geloescht. Trennt sich der Admin, wird der Raum
//! herrenlos (`admin = None`); bestehende Moderatoren behalten ihre Rechte.

use fluesterpost_core::SessionId;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ChatError, ChatResult};
use crate::types::Raum;

/// Verzeichnis aller Raeume, indiziert nach Name
///
/// Thread-safe via Arc + RwLock. Clone teilt den inneren Zustand.
#[derive(Clone, Default)]
pub struct RaumRegistry {
    inner: Arc<RwLock<BTreeMap<String, Raum>>>,
}

impl RaumRegistry {
    /// Erstellt eine leere Registry
    pub fn neu() -> Self {
        Self::default()
    }

    /// Legt einen Raum an; `admin` wird Admin und Moderator
    ///
    /// Existiert der Name bereits, bleibt der vorhandene Raum unveraendert.
    pub fn erstellen(&self, name: &str, admin: SessionId) -> ChatResult<()> {
        let mut raeume = self.inner.write();
        if raeume.contains_key(name) {
            return Err(ChatError::RaumExistiert(name.to_string()));
        }
        raeume.insert(name.to_string(), Raum::neu(name.to_string(), admin));
        tracing::debug!(raum = %name, admin = %admin, "Raum erstellt");
        Ok(())
    }

    pub fn existiert(&self, name: &str) -> bool {
        self.inner.read().contains_key(name)
    }

    /// Kopie eines Raums
    pub fn raum(&self, name: &str) -> Option<Raum> {
        self.inner.read().get(name).cloned()
    }

    /// Alle Raumnamen (alphabetisch)
    pub fn raum_namen(&self) -> Vec<String> {
        self.inner.read().keys().cloned().collect()
    }

    pub fn anzahl(&self) -> usize {
        self.inner.read().len()
    }

    /// Fuegt ein Mitglied hinzu (ohne Duplikate)
    ///
    /// Gibt `true` zurueck wenn die Session neu hinzugekommen ist.
    pub fn mitglied_hinzufuegen(&self, name: &str, id: SessionId) -> ChatResult<bool> {
        let mut raeume = self.inner.write();
        let raum = raeume
            .get_mut(name)
            .ok_or_else(|| ChatError::RaumNichtGefunden(name.to_string()))?;
        if raum.ist_mitglied(&id) {
            return Ok(false);
        }
        raum.mitglieder.push(id);
        Ok(true)
    }

    /// Entfernt ein Mitglied; `false` wenn es keines war
    pub fn mitglied_entfernen(&self, name: &str, id: &SessionId) -> bool {
        let mut raeume = self.inner.write();
        match raeume.get_mut(name) {
            Some(raum) => {
                let vorher = raum.mitglieder.len();
                raum.mitglieder.retain(|m| m != id);
                raum.mitglieder.len() != vorher
            }
            None => false,
        }
    }

    /// Gibt `id` Moderatorrechte in `name`
    ///
    /// Gibt `true` zurueck wenn die Session vorher kein Moderator war.
    pub fn moderator_hinzufuegen(&self, name: &str, id: SessionId) -> ChatResult<bool> {
        let mut raeume = self.inner.write();
        let raum = raeume
            .get_mut(name)
            .ok_or_else(|| ChatError::RaumNichtGefunden(name.to_string()))?;
        Ok(raum.moderatoren.insert(id))
    }

    pub fn ist_admin(&self, name: &str, id: &SessionId) -> bool {
        self.inner
            .read()
            .get(name)
            .is_some_and(|r| r.ist_admin(id))
    }

    pub fn ist_moderator(&self, name: &str, id: &SessionId) -> bool {
        self.inner
            .read()
            .get(name)
            .is_some_and(|r| r.ist_moderator(id))
    }

    /// Entfernt jede Referenz auf eine getrennte Session
    ///
    /// Gibt die Raeume zurueck, die dadurch herrenlos geworden sind.
    pub fn session_entfernen(&self, id: &SessionId) -> Vec<String> {
        let mut raeume = self.inner.write();
        let mut herrenlos = Vec::new();
        for raum in raeume.values_mut() {
            raum.mitglieder.retain(|m| m != id);
            raum.moderatoren.remove(id);
            if raum.ist_admin(id) {
                raum.admin = None;
                herrenlos.push(raum.name.clone());
            }
        }
        herrenlos
    }
}
