//! fluesterpost-core – Gemeinsame Typen und die Audit-Schnittstelle
//!
//! Dieses Crate stellt die Bausteine bereit, die von allen anderen
//! Fluesterpost-Crates gemeinsam genutzt werden.

pub mod event;
pub mod types;

// Re-Exporte fuer bequemen Zugriff
pub use event::{AuditEreignis, AuditSink, KeinAudit};
pub use types::{SessionId, SessionIdGenerator};
