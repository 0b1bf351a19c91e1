//! fluesterpost-signaling – TCP-Verbindungen und Befehlsverarbeitung
//!
//! Dieser Crate implementiert den Verbindungs- und Befehls-Layer fuer
//! Fluesterpost: Schluesselaustausch, Entschluesselung eingehender Zeilen,
//! Befehlsauswertung und verschluesselte Zustellung.
//!
//! ## Architektur
//!
//! ```text
//! TCP Listener (SignalingServer)
//!     |
//!     v
//! ClientConnection (pro Verbindung ein Task + ein Schreib-Task)
//!     |  State Machine: WartetAufHandshake -> Aktiv -> Geschlossen
//!     |
//!     v
//! Dispatcher
//!     |
//!     +-- parser           (Zeile -> Befehl)
//!     +-- ChatService      (Raeume, Rollen, Berechtigungen)
//!     +-- NachrichtenRouter (Direkt, Raum, Server-Hinweise)
//!     +-- AuditSink        (Ereignisse)
//! ```

pub mod broadcast;
pub mod codec;
pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod handshake;
pub mod parser;
pub mod server_state;
pub mod tcp;

#[cfg(test)]
mod test_util;

// Bequeme Re-Exporte
pub use broadcast::{NachrichtenRouter, RaumZustellung, Zustellung, SERVER_ABSENDER};
pub use connection::{ClientConnection, VerbindungsZustand};
pub use dispatcher::{Dispatcher, Fortsetzung};
pub use error::{SignalingError, SignalingResult};
pub use parser::{Befehl, ParseFehler};
pub use server_state::{ServerState, SignalingConfig};
pub use tcp::SignalingServer;
