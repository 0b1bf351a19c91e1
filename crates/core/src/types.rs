//! Identifikationstypen fuer Fluesterpost
//!
//! Anzeigenamen sind nicht eindeutig. Jede Session bekommt deshalb intern
//! eine eigene `SessionId`, die aufsteigend vergeben wird. Die Reihenfolge
//! der IDs entspricht der Verbindungsreihenfolge.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Eindeutige Session-ID (pro Prozess, aufsteigend)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub u64);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Vergibt fortlaufende Session-IDs
#[derive(Debug, Default)]
pub struct SessionIdGenerator {
    naechste: AtomicU64,
}

impl SessionIdGenerator {
    /// Erstellt einen Generator, der bei 1 beginnt
    pub fn neu() -> Self {
        Self {
            naechste: AtomicU64::new(1),
        }
    }

    /// Gibt die naechste freie ID zurueck
    pub fn naechste(&self) -> SessionId {
        SessionId(self.naechste.fetch_add(1, Ordering::Relaxed))
    }
}
