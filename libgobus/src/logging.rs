//! Logging setup shared by the gobus binaries
//!
//! All logs go to stderr so command output stays pipeable. The output
//! format comes from `GOBUS_LOG_FORMAT` (text or json) and the level from
//! `GOBUS_LOG_LEVEL`; a binary's `--verbose` flag lowers the level to
//! debug. `RUST_LOG`, when set, overrides the level entirely.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Line-oriented text without colors
    Text,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

fn env_format() -> LogFormat {
    std::env::var("GOBUS_LOG_FORMAT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(LogFormat::Text)
}

fn env_filter(verbose: bool) -> EnvFilter {
    let level = if verbose {
        "debug".to_string()
    } else {
        std::env::var("GOBUS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global subscriber. Call once, before any store or service
/// is constructed; a second call panics.
pub fn init(verbose: bool) {
    let filter = env_filter(verbose);

    match env_format() {
        LogFormat::Json => {
            tracing_subscriber::fmt()
                .json()
                .flatten_event(true)
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }
}
