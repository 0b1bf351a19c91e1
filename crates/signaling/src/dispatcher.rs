//! Befehls-Dispatcher – fuehrt eine Client-Zeile aus
//!
//! Ablauf pro Zeile: Umschlag oeffnen, parsen, Handler ausfuehren,
//! Antworten ueber den `NachrichtenRouter` verschicken, Audit-Ereignis
//! schreiben. Jede Antwort ist mit dem Schluessel des Empfaengers
//! versiegelt.
//!
//! Fehler (Entschluesselung, Verwendung, Berechtigung) fuehren nie zum
//! Verbindungsabbruch, sondern zu einem `SERVER`-Hinweis an den Absender.

use fluesterpost_chat::{ChatError, ChatResult};
use fluesterpost_core::{AuditEreignis, SessionId};
use std::sync::Arc;

use crate::broadcast::Zustellung;
use crate::parser::{parsen, Befehl, ParseFehler};
use crate::server_state::ServerState;

/// Wie es nach einer Zeile mit der Verbindung weitergeht
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fortsetzung {
    Weiter,
    Beenden,
}

/// Zentraler Befehls-Dispatcher
#[derive(Clone)]
pub struct Dispatcher {
    state: Arc<ServerState>,
}

impl Dispatcher {
    /// Erstellt einen neuen Dispatcher
    pub fn neu(state: Arc<ServerState>) -> Self {
        Self { state }
    }

    /// Verarbeitet einen Umschlag von Session `id`
    pub async fn zeile_verarbeiten(&self, id: SessionId, umschlag: &str) -> Fortsetzung {
        let klartext = match self.state.schluessel.oeffnen(umschlag) {
            Ok(k) => k,
            Err(e) => {
                tracing::warn!(session = %id, fehler = %e, "Umschlag nicht lesbar – verworfen");
                self.state.router.hinweis(
                    &id,
                    "Nachricht nicht entschluesselbar, verworfen",
                );
                return Fortsetzung::Weiter;
            }
        };

        let befehl = match parsen(&klartext, self.state.config.spam_max) {
            Ok(b) => b,
            Err(ParseFehler::Leer) => return Fortsetzung::Weiter,
            Err(e) => {
                self.state.router.hinweis(&id, &e.to_string());
                return Fortsetzung::Weiter;
            }
        };

        self.befehl_ausfuehren(id, befehl).await
    }

    /// Fuehrt einen bereits geparsten Befehl aus
    pub async fn befehl_ausfuehren(&self, id: SessionId, befehl: Befehl) -> Fortsetzung {
        let Some(name) = self.state.chat.sessions().name_von(&id) else {
            tracing::debug!(session = %id, "Befehl fuer entfernte Session ignoriert");
            return Fortsetzung::Beenden;
        };
        tracing::debug!(session = %id, verb = befehl.verb(), "Befehl");

        let ergebnis = match befehl {
            Befehl::Name(neu) => self.umbenennen(id, neu),
            Befehl::Msg { ziel, nachricht } => {
                self.direkt(id, &name, &ziel, &nachricht);
                Ok(())
            }
            Befehl::Alle(nachricht) => self.rundruf(id, &name, &nachricht, false),
            Befehl::Shout(nachricht) => self.rundruf(id, &name, &nachricht, true),
            Befehl::Erstellen(raum) => self.erstellen(id, &name, raum),
            Befehl::Beitreten(raum) => self.beitreten(id, &name, raum),
            Befehl::Verlassen => self.verlassen(id, &name),
            Befehl::Befoerdern(ziel) => self.befoerdern(id, &name, &ziel),
            Befehl::Kicken(ziel) => self.kicken(id, &name, &ziel),
            Befehl::Spam { anzahl, nachricht } => self.spam(id, &name, anzahl, &nachricht).await,
            Befehl::Liste(raum) => {
                self.liste(id, raum.as_deref());
                Ok(())
            }
            Befehl::Raeume => {
                let raeume = self.state.chat.raeume().raum_namen();
                self.state
                    .router
                    .hinweis(&id, &format!("Aktive Raeume: {}", aufzaehlen(&raeume)));
                Ok(())
            }
            Befehl::Hilfe => Ok(()),
            Befehl::Beenden => {
                tracing::info!(session = %id, name = %name, "Client beendet die Verbindung");
                return Fortsetzung::Beenden;
            }
            Befehl::Unbekannt(verb) => {
                tracing::debug!(session = %id, verb = %verb, "Unbekannter Befehl ignoriert");
                Ok(())
            }
        };

        if let Err(e) = ergebnis {
            tracing::debug!(session = %id, fehler = %e, "Befehl abgelehnt");
            self.state.router.hinweis(&id, &e.to_string());
        }
        Fortsetzung::Weiter
    }

    // -----------------------------------------------------------------------
    // Handler
    // -----------------------------------------------------------------------

    fn umbenennen(&self, id: SessionId, neu: String) -> ChatResult<()> {
        let alt = self.state.chat.sessions().umbenennen(&id, neu.clone())?;
        self.state
            .router
            .hinweis(&id, &format!("Du heisst jetzt: {neu}"));
        self.state.audit(AuditEreignis::Umbenannt { alt, neu });
        Ok(())
    }

    fn direkt(&self, id: SessionId, name: &str, ziel: &str, nachricht: &str) {
        match self.state.router.direkt_senden(nachricht, ziel, name) {
            Zustellung::Zugestellt => self.state.audit(AuditEreignis::Direktnachricht {
                von: name.to_string(),
                an: ziel.to_string(),
            }),
            Zustellung::ZuLang => {
                self.state.router.hinweis(
                    &id,
                    &format!("Nachricht an '{ziel}' zu lang, nicht zugestellt"),
                );
            }
            Zustellung::Unbekannt | Zustellung::Verworfen => {}
        }
    }

    fn aktueller_raum(&self, id: &SessionId) -> ChatResult<String> {
        self.state
            .chat
            .sessions()
            .aktueller_raum(id)
            .ok_or(ChatError::KeinRaum)
    }

    fn rundruf(&self, id: SessionId, name: &str, nachricht: &str, laut: bool) -> ChatResult<()> {
        let raum = self.aktueller_raum(&id)?;
        let ergebnis = self
            .state
            .router
            .an_raum_senden(nachricht, Some(&id), name, &raum);
        tracing::trace!(session = %id, raum = %raum, gesendet = ergebnis.zugestellt, "Rundruf");
        if ergebnis.zu_lang > 0 {
            self.state.router.hinweis(
                &id,
                &format!("Nachricht zu lang fuer {} Empfaenger", ergebnis.zu_lang),
            );
        }
        self.state.audit(AuditEreignis::Rundruf {
            von: name.to_string(),
            raum,
            laut,
        });
        Ok(())
    }

    fn erstellen(&self, id: SessionId, name: &str, raum: String) -> ChatResult<()> {
        self.state.chat.raum_erstellen(id, &raum)?;
        self.state
            .router
            .hinweis(&id, &format!("Raum '{raum}' erstellt"));
        self.state.audit(AuditEreignis::RaumErstellt {
            von: name.to_string(),
            raum,
        });
        Ok(())
    }

    fn beitreten(&self, id: SessionId, name: &str, raum: String) -> ChatResult<()> {
        let vorher = self.state.chat.raum_beitreten(id, &raum)?;
        if let Some(alt) = vorher.filter(|alt| *alt != raum) {
            self.state.audit(AuditEreignis::RaumVerlassen {
                von: name.to_string(),
                raum: alt,
            });
        }
        self.state
            .router
            .hinweis(&id, &format!("Du bist jetzt im Raum '{raum}'"));
        self.state.audit(AuditEreignis::RaumBetreten {
            von: name.to_string(),
            raum,
        });
        Ok(())
    }

    fn verlassen(&self, id: SessionId, name: &str) -> ChatResult<()> {
        let raum = self.state.chat.raum_verlassen(id)?;
        self.state
            .router
            .hinweis(&id, &format!("Du hast den Raum '{raum}' verlassen"));
        self.state.audit(AuditEreignis::RaumVerlassen {
            von: name.to_string(),
            raum,
        });
        Ok(())
    }

    fn befoerdern(&self, id: SessionId, name: &str, ziel: &str) -> ChatResult<()> {
        let b = self.state.chat.befoerdern(id, ziel)?;
        if !b.neu {
            self.state.router.hinweis(
                &id,
                &format!("'{}' ist bereits Moderator in '{}'", b.ziel_name, b.raum),
            );
            return Ok(());
        }

        self.state.router.hinweis(
            &b.ziel,
            &format!("Du bist jetzt Moderator in '{}' (von {name})", b.raum),
        );
        self.state.router.hinweis(
            &id,
            &format!("'{}' ist jetzt Moderator in '{}'", b.ziel_name, b.raum),
        );
        self.state.audit(AuditEreignis::Befoerdert {
            ziel: b.ziel_name,
            von: name.to_string(),
            raum: b.raum,
        });
        Ok(())
    }

    fn kicken(&self, id: SessionId, name: &str, ziel: &str) -> ChatResult<()> {
        let r = self.state.chat.kicken(id, ziel)?;
        self.state.router.hinweis(
            &r.ziel,
            &format!("Du wurdest von {name} aus '{}' geworfen", r.raum),
        );
        self.state.router.hinweis(
            &id,
            &format!("'{}' wurde aus '{}' geworfen", r.ziel_name, r.raum),
        );
        self.state.audit(AuditEreignis::Gekickt {
            ziel: r.ziel_name,
            von: name.to_string(),
            raum: r.raum,
        });
        Ok(())
    }

    /// `/spam` – sendet `anzahl` Mal mit festem Abstand
    ///
    /// Bricht ab, sobald der Absender den Raum nicht mehr hat (z.B. gekickt).
    async fn spam(&self, id: SessionId, name: &str, anzahl: u32, nachricht: &str) -> ChatResult<()> {
        let raum = self.aktueller_raum(&id)?;
        self.state.audit(AuditEreignis::Spam {
            von: name.to_string(),
            raum: raum.clone(),
            anzahl,
        });

        for i in 0..anzahl {
            if i > 0 {
                tokio::time::sleep(self.state.config.spam_intervall).await;
                if self.state.chat.sessions().aktueller_raum(&id).as_deref() != Some(raum.as_str()) {
                    tracing::debug!(session = %id, gesendet = i, "Spam abgebrochen, Raum verlassen");
                    break;
                }
            }
            self.state
                .router
                .an_raum_senden(nachricht, Some(&id), name, &raum);
        }
        Ok(())
    }

    fn liste(&self, id: SessionId, raum: Option<&str>) {
        let sessions = self.state.chat.sessions();
        let text = match raum {
            Some(raum) => format!(
                "Aktive Benutzer in '{raum}': {}",
                aufzaehlen(&sessions.namen_in_raum(raum))
            ),
            None => format!("Aktive Benutzer: {}", aufzaehlen(&sessions.alle_namen())),
        };
        self.state.router.hinweis(&id, &text);
    }
}

/// `'a' 'b' 'c'` bzw. `(keine)`
fn aufzaehlen(namen: &[String]) -> String {
    if namen.is_empty() {
        return "(keine)".to_string();
    }
    namen
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{client_paar, server_umschlag, test_state_mit_audit, TestAudit};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    struct Client {
        id: SessionId,
        rx: mpsc::Receiver<String>,
    }

    impl Client {
        fn verbinden(state: &ServerState, name: &str) -> Self {
            let (tx, rx) = mpsc::channel(64);
            let id = state.chat.sessions().registrieren(
                name.to_string(),
                client_paar().oeffentlich().clone(),
                tx,
            );
            Self { id, rx }
        }

        fn naechste(&mut self) -> Option<String> {
            self.rx
                .try_recv()
                .ok()
                .map(|u| client_paar().oeffnen(&u).expect("entschluesselbar"))
        }

        fn leeren(&mut self) {
            while self.rx.try_recv().is_ok() {}
        }
    }

    async fn senden(d: &Dispatcher, state: &ServerState, c: &Client, zeile: &str) -> Fortsetzung {
        d.zeile_verarbeiten(c.id, &server_umschlag(state, zeile)).await
    }

    /// Pausierte Uhr: Timer laufen auf Millisekunden-Raster ab
    fn assert_ungefaehr(ist: Duration, soll: Duration) {
        assert!(
            ist >= soll && ist < soll + Duration::from_millis(5),
            "erwartet ~{soll:?}, war {ist:?}"
        );
    }

    fn aufbau() -> (Arc<ServerState>, Arc<TestAudit>, Dispatcher) {
        let (state, audit) = test_state_mit_audit();
        let d = Dispatcher::neu(Arc::clone(&state));
        (state, audit, d)
    }

    #[tokio::test]
    async fn name_aendern_mit_verschluesselter_bestaetigung() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        senden(&d, &state, &alice, "/name alicia").await;
        assert_eq!(alice.naechste().unwrap(), "SERVER: Du heisst jetzt: alicia");
        assert_eq!(state.chat.sessions().name_von(&alice.id).as_deref(), Some("alicia"));
        assert!(audit.enthaelt(&AuditEreignis::Umbenannt {
            alt: "alice".into(),
            neu: "alicia".into()
        }));
    }

    #[tokio::test]
    async fn msg_an_unbekannten_schreibt_nichts() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        let weiter = senden(&d, &state, &alice, "/msg bob hello").await;
        assert_eq!(weiter, Fortsetzung::Weiter);
        assert!(alice.naechste().is_none());
        assert!(state.chat.sessions().ist_registriert(&alice.id));
        assert!(audit.ereignisse().is_empty());
    }

    #[tokio::test]
    async fn msg_erreicht_empfaenger() {
        let (state, _audit, d) = aufbau();
        let alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/msg bob hallo bob").await;
        assert_eq!(bob.naechste().unwrap(), "alice: hallo bob");
    }

    #[tokio::test]
    async fn rundruf_nur_im_raum() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");
        let mut carol = Client::verbinden(&state, "carol");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        alice.leeren();
        bob.leeren();

        senden(&d, &state, &alice, "/all hallo zusammen").await;
        assert_eq!(bob.naechste().unwrap(), "alice: hallo zusammen");
        assert!(alice.naechste().is_none(), "Absender bekommt nichts");
        assert!(carol.naechste().is_none(), "ausserhalb des Raums");

        senden(&d, &state, &alice, "/shout ruhe").await;
        assert_eq!(bob.naechste().unwrap(), "alice: RUHE");
    }

    #[tokio::test]
    async fn zu_lange_msg_wird_dem_absender_gemeldet() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        let befehl = Befehl::Msg {
            ziel: "bob".into(),
            nachricht: "x".repeat(200),
        };
        d.befehl_ausfuehren(alice.id, befehl).await;

        assert!(bob.naechste().is_none());
        assert_eq!(
            alice.naechste().unwrap(),
            "SERVER: Nachricht an 'bob' zu lang, nicht zugestellt"
        );
        assert!(audit.ereignisse().is_empty(), "nicht zugestellt, kein Audit");
    }

    #[tokio::test]
    async fn zu_langer_rundruf_wird_dem_absender_gemeldet() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        alice.leeren();
        bob.leeren();

        d.befehl_ausfuehren(alice.id, Befehl::Alle("y".repeat(200))).await;
        assert!(bob.naechste().is_none());
        assert_eq!(
            alice.naechste().unwrap(),
            "SERVER: Nachricht zu lang fuer 1 Empfaenger"
        );

        // Kurze Nachrichten kommen weiter an, ohne Hinweis
        senden(&d, &state, &alice, "/all kurz").await;
        assert_eq!(bob.naechste().unwrap(), "alice: kurz");
        assert!(alice.naechste().is_none());
    }

    #[tokio::test]
    async fn rundruf_ohne_raum_wird_abgelehnt() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        senden(&d, &state, &alice, "/all hallo").await;
        assert_eq!(alice.naechste().unwrap(), "SERVER: Du bist in keinem Raum");
    }

    #[tokio::test]
    async fn kick_gegen_admin_wird_verweigert() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        senden(&d, &state, &alice, "/promote bob").await;
        alice.leeren();
        assert!(bob.naechste().unwrap().contains("Moderator in 'lobby'"));
        bob.leeren();

        senden(&d, &state, &bob, "/kick alice").await;
        assert_eq!(
            bob.naechste().unwrap(),
            "SERVER: 'alice' ist Moderator und kann nicht gekickt werden"
        );
        assert_eq!(
            state.chat.sessions().aktueller_raum(&alice.id).as_deref(),
            Some("lobby")
        );
        assert!(alice.naechste().is_none());
        assert!(!audit
            .ereignisse()
            .iter()
            .any(|e| matches!(e, AuditEreignis::Gekickt { .. })));
    }

    #[tokio::test]
    async fn kick_benachrichtigt_ziel() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        alice.leeren();
        bob.leeren();

        senden(&d, &state, &alice, "/kick bob").await;
        assert_eq!(
            bob.naechste().unwrap(),
            "SERVER: Du wurdest von alice aus 'lobby' geworfen"
        );
        assert_eq!(alice.naechste().unwrap(), "SERVER: 'bob' wurde aus 'lobby' geworfen");
        assert_eq!(state.chat.sessions().aktueller_raum(&bob.id), None);
        assert!(audit.enthaelt(&AuditEreignis::Gekickt {
            ziel: "bob".into(),
            von: "alice".into(),
            raum: "lobby".into()
        }));
    }

    #[tokio::test]
    async fn promote_ohne_admin_aendert_nichts() {
        let (state, _audit, d) = aufbau();
        let alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        bob.leeren();
        let vorher = state.chat.raeume().raum("lobby").unwrap().moderatoren;

        senden(&d, &state, &bob, "/promote bob").await;
        assert!(bob.naechste().unwrap().starts_with("SERVER: Keine Berechtigung"));
        assert_eq!(state.chat.raeume().raum("lobby").unwrap().moderatoren, vorher);
    }

    #[tokio::test]
    async fn erstellen_und_doppelt_beitreten() {
        let (state, _audit, d) = aufbau();
        let mut s = Client::verbinden(&state, "s");

        senden(&d, &state, &s, "/create R").await;
        assert_eq!(s.naechste().unwrap(), "SERVER: Raum 'R' erstellt");
        senden(&d, &state, &s, "/join R").await;
        senden(&d, &state, &s, "/join R").await;

        assert_eq!(state.chat.sessions().aktueller_raum(&s.id).as_deref(), Some("R"));
        assert_eq!(state.chat.raeume().raum("R").unwrap().mitglieder, vec![s.id]);

        s.leeren();
        senden(&d, &state, &s, "/create R").await;
        assert_eq!(s.naechste().unwrap(), "SERVER: Raum 'R' existiert bereits");
    }

    #[tokio::test]
    async fn listen() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        alice.leeren();

        senden(&d, &state, &alice, "/list").await;
        assert_eq!(alice.naechste().unwrap(), "SERVER: Aktive Benutzer: 'alice' 'bob'");

        senden(&d, &state, &alice, "/list lobby").await;
        assert_eq!(
            alice.naechste().unwrap(),
            "SERVER: Aktive Benutzer in 'lobby': 'bob'"
        );

        senden(&d, &state, &alice, "/rooms").await;
        assert_eq!(alice.naechste().unwrap(), "SERVER: Aktive Raeume: 'lobby'");
    }

    #[tokio::test]
    async fn verwendung_bei_fehlenden_argumenten() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        senden(&d, &state, &alice, "/msg").await;
        assert_eq!(
            alice.naechste().unwrap(),
            "SERVER: Verwendung: /msg <benutzer> <nachricht>"
        );
    }

    #[tokio::test]
    async fn unlesbarer_umschlag_haelt_session_offen() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        let weiter = d.zeile_verarbeiten(alice.id, "kein base64 !!!").await;
        assert_eq!(weiter, Fortsetzung::Weiter);
        assert!(alice.naechste().unwrap().contains("nicht entschluesselbar"));
        assert!(state.chat.sessions().ist_registriert(&alice.id));
    }

    #[tokio::test]
    async fn help_und_unbekannt_sind_stumm() {
        let (state, _audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");

        senden(&d, &state, &alice, "/help").await;
        senden(&d, &state, &alice, "/tanzen").await;
        assert!(alice.naechste().is_none());
    }

    #[tokio::test]
    async fn exit_beendet() {
        let (state, _audit, d) = aufbau();
        let alice = Client::verbinden(&state, "alice");
        assert_eq!(senden(&d, &state, &alice, "/exit").await, Fortsetzung::Beenden);
    }

    #[tokio::test(start_paused = true)]
    async fn spam_mit_festem_abstand() {
        let (state, audit, d) = aufbau();
        let mut alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        alice.leeren();
        bob.leeren();

        let start = Instant::now();
        senden(&d, &state, &alice, "/spam 3 hi").await;
        assert_ungefaehr(start.elapsed(), Duration::from_millis(500));

        let mut umschlaege = Vec::new();
        while let Ok(u) = bob.rx.try_recv() {
            umschlaege.push(u);
        }
        assert_eq!(umschlaege.len(), 3);
        assert_ne!(umschlaege[0], umschlaege[1]);
        assert_ne!(umschlaege[1], umschlaege[2]);
        for u in &umschlaege {
            assert_eq!(client_paar().oeffnen(u).unwrap(), "alice: hi");
        }
        assert!(alice.naechste().is_none());
        assert!(audit.enthaelt(&AuditEreignis::Spam {
            von: "alice".into(),
            raum: "lobby".into(),
            anzahl: 3
        }));
    }

    #[tokio::test(start_paused = true)]
    async fn spam_abstand_zwischen_sendungen() {
        let (state, _audit, d) = aufbau();
        let alice = Client::verbinden(&state, "alice");
        let mut bob = Client::verbinden(&state, "bob");

        senden(&d, &state, &alice, "/create lobby").await;
        senden(&d, &state, &alice, "/join lobby").await;
        senden(&d, &state, &bob, "/join lobby").await;
        bob.leeren();

        let umschlag = server_umschlag(&state, "/spam 3 hi");
        let d2 = d.clone();
        let id = alice.id;
        let task = tokio::spawn(async move { d2.zeile_verarbeiten(id, &umschlag).await });

        let start = Instant::now();
        let mut zeitpunkte = Vec::new();
        for _ in 0..3 {
            bob.rx.recv().await.expect("Umschlag erwartet");
            zeitpunkte.push(start.elapsed());
        }
        task.await.unwrap();

        assert_ungefaehr(zeitpunkte[1] - zeitpunkte[0], Duration::from_millis(250));
        assert_ungefaehr(zeitpunkte[2] - zeitpunkte[1], Duration::from_millis(250));
    }
}
