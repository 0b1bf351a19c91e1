//! ChatService – Raum-Operationen ueber beide Registries
//!
//! Aenderungen ueber beide Registries laufen unter einer gemeinsamen
//! Sperre nacheinander ab; innerhalb davon wird immer nur einer der beiden
//! Registry-Locks gehalten. Lesezugriffe (Listen, Zustellung) brauchen die
//! Sperre nicht. Berechtigungen gelten pro Raum:
//! - Befoerdern: nur der Admin des eigenen aktuellen Raums
//! - Kicken: Admin oder Moderator des eigenen aktuellen Raums, Ziel darf
//!   kein Moderator sein und muss sich im selben Raum befinden

use fluesterpost_core::SessionId;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::{ChatError, ChatResult};
use crate::raeume::RaumRegistry;
use crate::sessions::SessionRegistry;
use crate::types::SessionEintrag;

/// Ergebnis eines erfolgreichen `/promote`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Befoerderung {
    pub ziel: SessionId,
    pub ziel_name: String,
    pub raum: String,
    /// false wenn das Ziel bereits Moderator war
    pub neu: bool,
}

/// Ergebnis eines erfolgreichen `/kick`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rauswurf {
    pub ziel: SessionId,
    pub ziel_name: String,
    pub raum: String,
}

/// Zusammengesetzte Chat-Operationen
#[derive(Clone, Default)]
pub struct ChatService {
    sessions: SessionRegistry,
    raeume: RaumRegistry,
    aenderung: Arc<Mutex<()>>,
}

impl ChatService {
    /// Erstellt einen ChatService ueber den gegebenen Registries
    pub fn neu(sessions: SessionRegistry, raeume: RaumRegistry) -> Self {
        Self {
            sessions,
            raeume,
            aenderung: Arc::new(Mutex::new(())),
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn raeume(&self) -> &RaumRegistry {
        &self.raeume
    }

    /// `/create` – legt einen Raum an, der Ersteller wird Admin
    pub fn raum_erstellen(&self, id: SessionId, name: &str) -> ChatResult<()> {
        let _sperre = self.aenderung.lock();
        if !self.sessions.ist_registriert(&id) {
            return Err(ChatError::SessionNichtGefunden(id));
        }
        self.raeume.erstellen(name, id)
    }

    /// `/join` – wechselt in einen bestehenden Raum
    ///
    /// Gibt den vorher betretenen Raum zurueck. Aus dessen Mitgliederliste
    /// wird die Session entfernt.
    pub fn raum_beitreten(&self, id: SessionId, name: &str) -> ChatResult<Option<String>> {
        let _sperre = self.aenderung.lock();
        if !self.raeume.existiert(name) {
            return Err(ChatError::RaumNichtGefunden(name.to_string()));
        }

        let vorher = self.sessions.raum_setzen(&id, Some(name.to_string()))?;
        if let Some(alt) = vorher.as_deref() {
            if alt != name {
                self.raeume.mitglied_entfernen(alt, &id);
            }
        }
        self.raeume.mitglied_hinzufuegen(name, id)?;
        Ok(vorher)
    }

    /// `/quit` – verlaesst den aktuellen Raum
    pub fn raum_verlassen(&self, id: SessionId) -> ChatResult<String> {
        let _sperre = self.aenderung.lock();
        let raum = self.sessions.raum_setzen(&id, None)?.ok_or(ChatError::KeinRaum)?;
        self.raeume.mitglied_entfernen(&raum, &id);
        Ok(raum)
    }

    /// `/promote` – macht `ziel_name` zum Moderator im aktuellen Raum des Admins
    pub fn befoerdern(&self, admin: SessionId, ziel_name: &str) -> ChatResult<Befoerderung> {
        let _sperre = self.aenderung.lock();
        let raum = self.sessions.aktueller_raum(&admin).ok_or(ChatError::KeinRaum)?;

        if !self.raeume.ist_admin(&raum, &admin) {
            return Err(ChatError::KeineBerechtigung(format!(
                "nur der Admin von '{raum}' darf befoerdern"
            )));
        }

        let ziel = self
            .sessions
            .erste_nach_name(ziel_name)
            .ok_or_else(|| ChatError::BenutzerNichtGefunden(ziel_name.to_string()))?;

        let neu = self.raeume.moderator_hinzufuegen(&raum, ziel)?;
        Ok(Befoerderung {
            ziel,
            ziel_name: ziel_name.to_string(),
            raum,
            neu,
        })
    }

    /// `/kick` – wirft `ziel_name` aus dem aktuellen Raum des Kickenden
    pub fn kicken(&self, kicker: SessionId, ziel_name: &str) -> ChatResult<Rauswurf> {
        let _sperre = self.aenderung.lock();
        let raum = self.sessions.aktueller_raum(&kicker).ok_or(ChatError::KeinRaum)?;

        let darf_kicken = self.raeume.ist_admin(&raum, &kicker)
            || self.raeume.ist_moderator(&raum, &kicker);
        if !darf_kicken {
            return Err(ChatError::KeineBerechtigung(format!(
                "nur Admin oder Moderatoren von '{raum}' duerfen kicken"
            )));
        }

        let ziel = self
            .sessions
            .erste_nach_name(ziel_name)
            .ok_or_else(|| ChatError::BenutzerNichtGefunden(ziel_name.to_string()))?;

        if self.raeume.ist_moderator(&raum, &ziel) || self.raeume.ist_admin(&raum, &ziel) {
            return Err(ChatError::ZielIstModerator(ziel_name.to_string()));
        }

        if !self.sessions.raum_leeren_falls(&ziel, &raum) {
            return Err(ChatError::NichtImRaum {
                name: ziel_name.to_string(),
                raum,
            });
        }
        self.raeume.mitglied_entfernen(&raum, &ziel);

        Ok(Rauswurf {
            ziel,
            ziel_name: ziel_name.to_string(),
            raum,
        })
    }

    /// Entfernt eine Session vollstaendig (Verbindungsende oder `/exit`)
    ///
    /// Raeume, deren Admin die Session war, werden herrenlos.
    pub fn trennen(&self, id: SessionId) -> Option<SessionEintrag> {
        let _sperre = self.aenderung.lock();
        let eintrag = self.sessions.entfernen(&id)?;
        let herrenlos = self.raeume.session_entfernen(&id);
        for raum in &herrenlos {
            tracing::info!(raum = %raum, admin = %id, "Raum ist jetzt herrenlos");
        }
        Some(eintrag)
    }
}
