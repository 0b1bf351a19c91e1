//! Befehls-Parser – zerlegt eine entschluesselte Zeile in einen `Befehl`
//!
//! Die Zeile wird an einzelnen Leerzeichen getrennt, Token 0 ist das Verb.
//! Die Anzahl der Tokens wird vor jedem Zugriff geprueft; fehlende Argumente
//! ergeben `ParseFehler::Verwendung` statt eines Absturzes.

use std::fmt;

/// Ein geparster Client-Befehl
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Befehl {
    /// `/name <neuer_name>`
    Name(String),
    /// `/msg <ziel> <nachricht...>`
    Msg { ziel: String, nachricht: String },
    /// `/all <nachricht...>`
    Alle(String),
    /// `/shout <nachricht...>` (bereits in Grossbuchstaben)
    Shout(String),
    /// `/create <raum>`
    Erstellen(String),
    /// `/join <raum>`
    Beitreten(String),
    /// `/quit`
    Verlassen,
    /// `/promote <benutzer>`
    Befoerdern(String),
    /// `/kick <benutzer>`
    Kicken(String),
    /// `/spam <anzahl> <nachricht...>`
    Spam { anzahl: u32, nachricht: String },
    /// `/list [raum]`
    Liste(Option<String>),
    /// `/rooms`
    Raeume,
    /// `/help`
    Hilfe,
    /// `/exit`
    Beenden,
    /// Unbekanntes Verb
    Unbekannt(String),
}

impl Befehl {
    /// Verb fuer Logs
    pub fn verb(&self) -> &str {
        match self {
            Self::Name(_) => "/name",
            Self::Msg { .. } => "/msg",
            Self::Alle(_) => "/all",
            Self::Shout(_) => "/shout",
            Self::Erstellen(_) => "/create",
            Self::Beitreten(_) => "/join",
            Self::Verlassen => "/quit",
            Self::Befoerdern(_) => "/promote",
            Self::Kicken(_) => "/kick",
            Self::Spam { .. } => "/spam",
            Self::Liste(_) => "/list",
            Self::Raeume => "/rooms",
            Self::Hilfe => "/help",
            Self::Beenden => "/exit",
            Self::Unbekannt(verb) => verb,
        }
    }
}

/// Fehler beim Parsen einer Zeile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFehler {
    /// Leere Zeile
    Leer,
    /// Zu wenige Argumente; enthaelt die Verwendungszeile
    Verwendung(&'static str),
    /// `/spam` mit ungueltiger Anzahl
    UngueltigeAnzahl { eingabe: String, maximum: u32 },
}

impl fmt::Display for ParseFehler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leer => write!(f, "Leere Eingabe"),
            Self::Verwendung(verwendung) => write!(f, "Verwendung: {verwendung}"),
            Self::UngueltigeAnzahl { eingabe, maximum } => write!(
                f,
                "Ungueltige Anzahl '{eingabe}': erlaubt sind 1 bis {maximum}"
            ),
        }
    }
}

const VERWENDUNG_NAME: &str = "/name <neuer_name>";
const VERWENDUNG_MSG: &str = "/msg <benutzer> <nachricht>";
const VERWENDUNG_ALLE: &str = "/all <nachricht>";
const VERWENDUNG_SHOUT: &str = "/shout <nachricht>";
const VERWENDUNG_CREATE: &str = "/create <raum>";
const VERWENDUNG_JOIN: &str = "/join <raum>";
const VERWENDUNG_PROMOTE: &str = "/promote <benutzer>";
const VERWENDUNG_KICK: &str = "/kick <benutzer>";
const VERWENDUNG_SPAM: &str = "/spam <anzahl> <nachricht>";

/// Parst eine Klartextzeile
///
/// `spam_max` begrenzt die Wiederholungen von `/spam`.
pub fn parsen(zeile: &str, spam_max: u32) -> Result<Befehl, ParseFehler> {
    let zeile = zeile.trim();
    if zeile.is_empty() {
        return Err(ParseFehler::Leer);
    }

    let tokens: Vec<&str> = zeile.split(' ').collect();
    let verb = tokens[0];

    let befehl = match verb {
        "/name" => Befehl::Name(argument(&tokens, 1, VERWENDUNG_NAME)?),
        "/msg" => Befehl::Msg {
            ziel: argument(&tokens, 1, VERWENDUNG_MSG)?,
            nachricht: rest(&tokens, 2, VERWENDUNG_MSG)?,
        },
        "/all" => Befehl::Alle(rest(&tokens, 1, VERWENDUNG_ALLE)?),
        "/shout" => Befehl::Shout(rest(&tokens, 1, VERWENDUNG_SHOUT)?.to_uppercase()),
        "/create" => Befehl::Erstellen(argument(&tokens, 1, VERWENDUNG_CREATE)?),
        "/join" => Befehl::Beitreten(argument(&tokens, 1, VERWENDUNG_JOIN)?),
        "/quit" => Befehl::Verlassen,
        "/promote" => Befehl::Befoerdern(argument(&tokens, 1, VERWENDUNG_PROMOTE)?),
        "/kick" => Befehl::Kicken(argument(&tokens, 1, VERWENDUNG_KICK)?),
        "/spam" => {
            let eingabe = argument(&tokens, 1, VERWENDUNG_SPAM)?;
            let nachricht = rest(&tokens, 2, VERWENDUNG_SPAM)?;
            let anzahl = match eingabe.parse::<u32>() {
                Ok(n) if (1..=spam_max).contains(&n) => n,
                _ => {
                    return Err(ParseFehler::UngueltigeAnzahl {
                        eingabe,
                        maximum: spam_max,
                    })
                }
            };
            Befehl::Spam { anzahl, nachricht }
        }
        "/list" => Befehl::Liste(
            tokens
                .get(1)
                .map(|raum| raum.trim())
                .filter(|raum| !raum.is_empty())
                .map(str::to_string),
        ),
        "/rooms" => Befehl::Raeume,
        "/help" => Befehl::Hilfe,
        "/exit" => Befehl::Beenden,
        anderes => Befehl::Unbekannt(anderes.to_string()),
    };

    Ok(befehl)
}

/// Einzelnes Argument an Position `index`, getrimmt und nicht leer
fn argument(tokens: &[&str], index: usize, verwendung: &'static str) -> Result<String, ParseFehler> {
    match tokens.get(index).map(|t| t.trim()) {
        Some(wert) if !wert.is_empty() => Ok(wert.to_string()),
        _ => Err(ParseFehler::Verwendung(verwendung)),
    }
}

/// Alle Tokens ab `index`, mit einzelnen Leerzeichen wieder verbunden
fn rest(tokens: &[&str], index: usize, verwendung: &'static str) -> Result<String, ParseFehler> {
    if tokens.len() <= index {
        return Err(ParseFehler::Verwendung(verwendung));
    }
    let text = tokens[index..].join(" ");
    if text.trim().is_empty() {
        return Err(ParseFehler::Verwendung(verwendung));
    }
    Ok(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
