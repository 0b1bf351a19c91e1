
use fluesterpost_core::SessionId;
use fluesterpost_crypto::{OeffentlicherSchluessel, SchluesselPaar};
use std::sync::OnceLock;
use tokio::sync::mpsc;

use crate::sessions::SessionRegistry;

/// Ein Schluessel reicht fuer alle Registry-Tests; verschluesselt wird hier nicht
pub(crate) fn test_schluessel() -> OeffentlicherSchluessel {
    static PAAR: OnceLock<SchluesselPaar> = OnceLock::new();
    PAAR.get_or_init(|| SchluesselPaar::generieren(1024).expect("Schluessel erzeugen"))
        .oeffentlich()
        .clone()
}

/// Registriert eine Session und gibt ID und Empfangs-Queue zurueck
pub(crate) fn verbinden(
    sessions: &SessionRegistry,
    name: &str,
) -> (SessionId, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(16);
    let id = sessions.registrieren(name.to_string(), test_schluessel(), tx);
    (id, rx)
}
