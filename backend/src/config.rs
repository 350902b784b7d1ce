//! Server settings, read once at startup from `IMPORTS_*` environment
//! variables. Unset variables use the defaults below; unparsable ones are
//! logged and also fall back to the default.

use log::warn;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

const MEGABYTE: usize = 1024 * 1024;
const DEFAULT_JSON_LIMIT_MB: usize = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file that receives imported rows.
    pub database_path: PathBuf,
    /// Uploads with at most this many data rows are imported before the
    /// response is sent; larger ones become background jobs.
    pub sync_row_limit: usize,
    pub open_browser: bool,
    pub json_limit_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database_path: PathBuf::from("imports.sqlite"),
            sync_row_limit: 200,
            open_browser: true,
            json_limit_bytes: DEFAULT_JSON_LIMIT_MB * MEGABYTE,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            host: lookup("IMPORTS_HOST")
                .filter(|host| !host.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or(&lookup, "IMPORTS_PORT", defaults.port),
            database_path: lookup("IMPORTS_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            sync_row_limit: parse_or(&lookup, "IMPORTS_SYNC_ROW_LIMIT", defaults.sync_row_limit),
            open_browser: lookup("IMPORTS_OPEN_BROWSER")
                .and_then(|raw| parse_flag("IMPORTS_OPEN_BROWSER", &raw))
                .unwrap_or(defaults.open_browser),
            json_limit_bytes: json_limit(&lookup, defaults.json_limit_bytes),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        None => default,
    }
}

fn json_limit<F>(lookup: &F, default_bytes: usize) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let megabytes = parse_or(lookup, "IMPORTS_JSON_LIMIT_MB", default_bytes / MEGABYTE);
    megabytes.checked_mul(MEGABYTE).unwrap_or_else(|| {
        warn!(
            "Ignoring IMPORTS_JSON_LIMIT_MB={}, too large; using {}",
            megabytes,
            default_bytes / MEGABYTE
        );
        default_bytes
    })
}

fn parse_flag(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring invalid {}={:?}", key, raw);
            None
        }
    }
}
