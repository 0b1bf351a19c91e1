//! Datentypen fuer Sessions und Raeume

use fluesterpost_core::SessionId;
use fluesterpost_crypto::OeffentlicherSchluessel;
use std::collections::BTreeSet;
use tokio::sync::mpsc;

/// Eine verbundene Identitaet
///
/// `ausgang` ist die Queue zum Schreib-Task der Verbindung. Nur dieser Task
/// besitzt die Schreibhaelfte des Sockets; alle anderen reihen fertige
/// Umschlag-Zeilen ein.
#[derive(Debug, Clone)]
pub struct SessionEintrag {
    pub id: SessionId,
    /// Anzeigename (nicht eindeutig)
    pub name: String,
    /// Aktueller Raum (None = in keinem Raum)
    pub aktueller_raum: Option<String>,
    /// Oeffentlicher Schluessel aus dem Handshake, unveraenderlich
    pub schluessel: OeffentlicherSchluessel,
    pub ausgang: mpsc::Sender<String>,
}

impl SessionEintrag {
    pub(crate) fn als_empfaenger(&self) -> Empfaenger {
        Empfaenger {
            id: self.id,
            name: self.name.clone(),
            schluessel: self.schluessel.clone(),
            ausgang: self.ausgang.clone(),
        }
    }
}

/// Momentaufnahme eines Zustell-Ziels
#[derive(Debug, Clone)]
pub struct Empfaenger {
    pub id: SessionId,
    pub name: String,
    pub schluessel: OeffentlicherSchluessel,
    pub ausgang: mpsc::Sender<String>,
}

/// Ein Chat-Raum
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raum {
    pub name: String,
    /// Ersteller; None wenn der Admin die Verbindung getrennt hat
    pub admin: Option<SessionId>,
    pub moderatoren: BTreeSet<SessionId>,
    /// Mitglieder in Beitrittsreihenfolge, ohne Duplikate
    pub mitglieder: Vec<SessionId>,
}

impl Raum {
    pub(crate) fn neu(name: String, admin: SessionId) -> Self {
        Self {
            name,
            admin: Some(admin),
            moderatoren: BTreeSet::from([admin]),
            mitglieder: Vec::new(),
        }
    }

    /// Prueft ob `id` der Admin dieses Raums ist
    pub fn ist_admin(&self, id: &SessionId) -> bool {
        self.admin.as_ref() == Some(id)
    }

    /// Prueft ob `id` Moderatorrechte hat
    pub fn ist_moderator(&self, id: &SessionId) -> bool {
        self.moderatoren.contains(id)
    }

    /// Prueft ob `id` Mitglied ist
    pub fn ist_mitglied(&self, id: &SessionId) -> bool {
        self.mitglieder.contains(id)
    }
}
