//! Structured Logging Setup via tracing-subscriber
//!
//! Konfigurierbar per Umgebungsvariable (hat Vorrang vor der Config-Datei):
//! - `FP_LOG_LEVEL`: Log-Level oder EnvFilter-Direktive, Standard: info
//! - `FP_LOG_FORMAT`: Format (text/json), Standard: text

use tracing_subscriber::{fmt, EnvFilter};

pub const ENV_LEVEL: &str = "FP_LOG_LEVEL";
pub const ENV_FORMAT: &str = "FP_LOG_FORMAT";

/// Initialisiert das Logging-System.
///
/// Ungueltige Filter fallen auf `info` zurueck, unbekannte Formate auf `text`.
pub fn logging_initialisieren(level: &str, format: &str) {
    let (level, format) = effektive_werte(
        level,
        format,
        std::env::var(ENV_LEVEL).ok(),
        std::env::var(ENV_FORMAT).ok(),
    );

    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new("info"));

    match format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
                .init();
        }
        _ => {
            fmt().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Umgebungswerte ueberschreiben die Werte aus der Konfiguration
fn effektive_werte(
    level: &str,
    format: &str,
    env_level: Option<String>,
    env_format: Option<String>,
) -> (String, String) {
    let level = env_level
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| level.to_string());
    let format = env_format
        .filter(|f| log_format_gueltig(f))
        .unwrap_or_else(|| format.to_string());
    (level, format)
}

/// Validiert ob ein Log-Level-String gueltig ist.
pub fn log_level_gueltig(level: &str) -> bool {
    matches!(level, "trace" | "debug" | "info" | "warn" | "error")
}

/// Validiert ob ein Log-Format-String gueltig ist.
pub fn log_format_gueltig(format: &str) -> bool {
    matches!(format, "text" | "json")
}
