//! Configuration loading from environment variables.

use crate::constants::{DEFAULT_AUTH_HEADER, DEFAULT_MAX_PASTE_SIZE, DEFAULT_PORT};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for Pastebox.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub db_path: String,
    /// Root directory of the attachment blob store. Must be absolute.
    pub attachments_path: String,
    pub port: u16,
    pub max_paste_size: usize,
    /// Request header carrying the username set by an authenticating proxy.
    pub auth_header: String,
    /// Usernames holding the elevated capability (may view and modify any paste).
    pub admin_users: Vec<String>,
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: String) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = resolve_home_dir() {
            return home.join(rest).to_string_lossy().to_string();
        }
    }
    path
}

fn resolve_home_dir() -> Option<PathBuf> {
    // Prefer explicit HOME if set (Unix, some Windows shells)
    if let Ok(home) = env::var("HOME") {
        if !home.trim().is_empty() {
            return Some(PathBuf::from(home));
        }
    }

    // Windows USERPROFILE (standard)
    if let Ok(profile) = env::var("USERPROFILE") {
        if !profile.trim().is_empty() {
            return Some(PathBuf::from(profile));
        }
    }

    std::env::current_dir().ok()
}

fn default_data_dir() -> PathBuf {
    let home = resolve_home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.join(".cache").join("pastebox")
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

/// Split a comma-separated username list, dropping blanks and duplicates.
pub fn parse_user_list(value: &str) -> Vec<String> {
    let mut users: Vec<String> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !users.iter().any(|existing| existing == name) {
            users.push(name.to_string());
        }
    }
    users
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Returns
    /// A populated [`Config`] with defaults applied when env vars are missing.
    /// Path validity is not checked here; the blob store rejects a relative
    /// `attachments_path` when it is opened.
    pub fn from_env() -> Self {
        Self {
            db_path: env::var("DB_PATH").map(expand_tilde).unwrap_or_else(|_| {
                default_data_dir().join("db").to_string_lossy().to_string()
            }),
            attachments_path: env::var("ATTACHMENTS_PATH")
                .map(expand_tilde)
                .unwrap_or_else(|_| {
                    default_data_dir()
                        .join("attachments")
                        .to_string_lossy()
                        .to_string()
                }),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            max_paste_size: env::var("MAX_PASTE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_PASTE_SIZE),
            auth_header: env::var("AUTH_HEADER")
                .ok()
                .map(|h| h.trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| DEFAULT_AUTH_HEADER.to_string()),
            admin_users: env::var("ADMIN_USERS")
                .map(|v| parse_user_list(&v))
                .unwrap_or_default(),
        }
    }

    /// Whether `username` holds the elevated capability.
    pub fn is_admin(&self, username: &str) -> bool {
        self.admin_users.iter().any(|admin| admin == username)
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_env_flag, parse_user_list, Config};
    use crate::env::ScopedEnv;

    #[test]
    fn parse_env_flag_accepts_truthy_values() {
        for value in ["1", "true", "TRUE", " yes ", "on"] {
            assert_eq!(parse_env_flag(value), Some(true), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_accepts_falsy_values() {
        for value in ["", "0", "false", "FALSE", " no ", "off"] {
            assert_eq!(parse_env_flag(value), Some(false), "value: {}", value);
        }
    }

    #[test]
    fn parse_env_flag_rejects_unknown_values() {
        assert_eq!(parse_env_flag("maybe"), None);
        assert_eq!(parse_env_flag("enabled"), None);
    }

    #[test]
    fn parse_user_list_trims_and_deduplicates() {
        assert_eq!(
            parse_user_list(" alice, bob,,alice ,  "),
            vec!["alice".to_string(), "bob".to_string()]
        );
        assert!(parse_user_list("").is_empty());
    }

    #[test]
    fn from_env_reads_overrides() {
        let _env = ScopedEnv::lock()
            .set("DB_PATH", "/srv/pastebox/db")
            .set("ATTACHMENTS_PATH", "/srv/pastebox/blobs")
            .set("PORT", "4100")
            .set("AUTH_HEADER", " X-Forwarded-User ")
            .set("ADMIN_USERS", "root,ops");

        let config = Config::from_env();
        assert_eq!(config.db_path, "/srv/pastebox/db");
        assert_eq!(config.attachments_path, "/srv/pastebox/blobs");
        assert_eq!(config.port, 4100);
        assert_eq!(config.auth_header, "x-forwarded-user");
        assert!(config.is_admin("ops"));
        assert!(!config.is_admin("guest"));
    }

    #[test]
    fn from_env_defaults_to_absolute_attachment_root() {
        let _env = ScopedEnv::lock()
            .unset("ATTACHMENTS_PATH")
            .unset("AUTH_HEADER")
            .set("PORT", "not-a-port");

        let config = Config::from_env();
        assert!(config.attachments_path.ends_with("attachments"));
        assert_eq!(config.auth_header, crate::constants::DEFAULT_AUTH_HEADER);
        assert_eq!(config.port, crate::constants::DEFAULT_PORT);
    }
}
