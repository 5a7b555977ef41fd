//! Shared configuration for lxgate tools.
//!
//! TOML profiles, credential resolution (keyring + env + plaintext),
//! and translation to `lxgate_core::GatewayConfig`. The CLI adds
//! `GlobalOpts`-aware wrappers on top.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lxgate_core::{AuthToken, GatewayConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named gateway profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named gateway profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Gateway base URL (e.g., "https://gateway.example.com").
    pub gateway: String,

    /// Bearer token (plaintext -- prefer keyring or env var).
    pub token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub token_env: Option<String>,

    /// Username for credential auth.
    pub username: Option<String>,

    /// Password for credential auth (plaintext -- prefer keyring).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override the audit log poll interval (seconds). 0 disables.
    pub poll_interval: Option<u64>,

    /// Override the in-memory audit log retention limit.
    pub log_capacity: Option<usize>,

    /// Disable the live WebSocket stream for this profile.
    pub websocket: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("tech", "lx-gateway", "lxgate").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("lxgate");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("LXGATE_").split("_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve a bearer token from the credential chain (no CLI flag step).
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("lxgate", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Ok(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve username + password credentials without CLI flags.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("LXGATE_USERNAME").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    // 1. Env var
    if let Ok(pw) = std::env::var("LXGATE_PASSWORD") {
        return Ok((username, SecretString::from(pw)));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new("lxgate", &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok((username, SecretString::from(pw)));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok((username, SecretString::from(pw.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthToken` from a profile.
///
/// A configured username selects credential auth; otherwise a token is
/// looked up along the chain. Profiles with neither are treated as
/// anonymous (open lab gateways).
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthToken, ConfigError> {
    if profile.username.is_some() {
        let (username, password) = resolve_credentials(profile, profile_name)?;
        return Ok(AuthToken::Credentials { username, password });
    }

    match resolve_token(profile, profile_name) {
        Ok(token) => Ok(AuthToken::Bearer(token)),
        Err(ConfigError::NoCredentials { .. }) => Ok(AuthToken::None),
        Err(e) => Err(e),
    }
}

/// Build a `GatewayConfig` from a profile -- no CLI flag overrides.
pub fn profile_to_gateway_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<GatewayConfig, ConfigError> {
    let url: url::Url = profile
        .gateway
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {}", profile.gateway),
        })?;

    let auth = resolve_auth(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let defaults = GatewayConfig::default();

    Ok(GatewayConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
        poll_interval_secs: profile.poll_interval.unwrap_or(defaults.poll_interval_secs),
        websocket_enabled: profile.websocket.unwrap_or(true),
        ws_auto_reconnect: defaults.ws_auto_reconnect,
        log_capacity: profile.log_capacity.unwrap_or(defaults.log_capacity),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(gateway: &str) -> Profile {
        Profile {
            gateway: gateway.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn plaintext_token_resolves_last() {
        let p = Profile {
            token: Some("plain-token".into()),
            ..profile("http://gw.local")
        };

        let auth = resolve_auth(&p, "test").unwrap();
        assert!(matches!(auth, AuthToken::Bearer(_)));
    }

    #[test]
    fn missing_credentials_mean_anonymous() {
        let p = profile("http://gw.local");
        let auth = resolve_auth(&p, "test").unwrap();
        assert!(matches!(auth, AuthToken::None));
    }

    #[test]
    fn username_without_password_is_an_error() {
        let p = Profile {
            username: Some("admin".into()),
            ..profile("http://gw.local")
        };

        // No LXGATE_PASSWORD in the environment, no keyring entry, no
        // plaintext password.
        let result = resolve_credentials(&p, "empty-test-profile");
        assert!(matches!(result, Err(ConfigError::NoCredentials { .. })));
    }

    #[test]
    fn invalid_gateway_url_is_rejected() {
        let p = profile("not a url");
        let result = profile_to_gateway_config(&p, "test");
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn profile_overrides_apply() {
        let p = Profile {
            insecure: Some(true),
            timeout: Some(5),
            poll_interval: Some(0),
            log_capacity: Some(50),
            websocket: Some(false),
            ..profile("https://gw.example.com")
        };

        let config = profile_to_gateway_config(&p, "test").unwrap();
        assert_eq!(config.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.poll_interval_secs, 0);
        assert_eq!(config.log_capacity, 50);
        assert!(!config.websocket_enabled);
    }
}
