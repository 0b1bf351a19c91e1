//! fluesterpost-chat – Session- und Raumverwaltung
//!
//! Dieses Crate implementiert:
//! - SessionRegistry: alle verbundenen Identitaeten mit Name, Raum und Schluessel
//! - RaumRegistry: alle Raeume mit Admin, Moderatoren und Mitgliedern
//! - ChatService: zusammengesetzte Operationen (Beitreten, Kicken, ...) inkl.
//!   Berechtigungspruefung
//!
//! ## Sperren
//! Jede Registry hat genau einen `RwLock`. Keine Operation haelt beide Locks
//! gleichzeitig; Leseoperationen liefern Kopien (konsistente Momentaufnahmen).
//! Zusammengesetzte Aenderungen im `ChatService` laufen zusaetzlich unter
//! einer gemeinsamen Sperre, damit `trennen` nie zwischen zwei Schritte faellt.

pub mod error;
pub mod raeume;
pub mod service;
pub mod sessions;
pub mod types;

#[cfg(test)]
mod tests;

// Bequeme Re-Exporte
pub use error::{ChatError, ChatResult};
pub use raeume::RaumRegistry;
pub use service::{Befoerderung, ChatService, Rauswurf};
pub use sessions::SessionRegistry;
pub use types::{Empfaenger, Raum, SessionEintrag};
