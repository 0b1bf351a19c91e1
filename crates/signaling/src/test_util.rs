//! Gemeinsame Helfer fuer die Unit-Tests

use fluesterpost_chat::SessionRegistry;
use fluesterpost_core::{AuditEreignis, AuditSink, KeinAudit, SessionId};
use fluesterpost_crypto::SchluesselPaar;
use std::sync::{Arc, Mutex, OnceLock};
use tokio::sync::mpsc;

use crate::server_state::{ServerState, SignalingConfig};

/// Schluesselpaar, das alle Test-Clients teilen
pub(crate) fn client_paar() -> &'static SchluesselPaar {
    static PAAR: OnceLock<SchluesselPaar> = OnceLock::new();
    PAAR.get_or_init(|| SchluesselPaar::generieren(1024).expect("Client-Schluessel"))
}

fn server_paar() -> Arc<SchluesselPaar> {
    static PAAR: OnceLock<Arc<SchluesselPaar>> = OnceLock::new();
    Arc::clone(PAAR.get_or_init(|| {
        Arc::new(SchluesselPaar::generieren(1024).expect("Server-Schluessel"))
    }))
}

/// Sammelt Audit-Ereignisse fuer Assertions
#[derive(Default)]
pub(crate) struct TestAudit {
    ereignisse: Mutex<Vec<AuditEreignis>>,
}

impl TestAudit {
    pub(crate) fn ereignisse(&self) -> Vec<AuditEreignis> {
        self.ereignisse.lock().unwrap().clone()
    }

    pub(crate) fn enthaelt(&self, ereignis: &AuditEreignis) -> bool {
        self.ereignisse.lock().unwrap().contains(ereignis)
    }
}

impl AuditSink for TestAudit {
    fn ereignis_schreiben(&self, ereignis: &AuditEreignis) {
        self.ereignisse.lock().unwrap().push(ereignis.clone());
    }
}

pub(crate) fn test_state() -> Arc<ServerState> {
    ServerState::neu(SignalingConfig::default(), server_paar(), Arc::new(KeinAudit))
}

pub(crate) fn test_state_mit_audit() -> (Arc<ServerState>, Arc<TestAudit>) {
    let audit = Arc::new(TestAudit::default());
    let state = ServerState::neu(SignalingConfig::default(), server_paar(), audit.clone());
    (state, audit)
}

/// Registry mit je einer Session pro Name (alle mit `client_paar()`)
pub(crate) fn test_sessions_mit(
    namen: &[&str],
) -> (SessionRegistry, Vec<(SessionId, mpsc::Receiver<String>)>) {
    let sessions = SessionRegistry::neu();
    let clients = namen
        .iter()
        .map(|name| {
            let (tx, rx) = mpsc::channel(64);
            let id = sessions.registrieren(
                name.to_string(),
                client_paar().oeffentlich().clone(),
                tx,
            );
            (id, rx)
        })
        .collect();
    (sessions, clients)
}

/// Versiegelt eine Client-Zeile fuer den Server
pub(crate) fn server_umschlag(state: &ServerState, klartext: &str) -> String {
    state
        .schluessel
        .oeffentlich()
        .versiegeln(klartext)
        .expect("Klartext passt in einen Umschlag")
}
