//! Profile resolution: TOML config + CLI flag overrides -> `GatewayConfig`.
//!
//! The TOML schema and credential chain live in `lxgate-config`; this module
//! only layers global CLI flags on top and maps errors into `CliError`.

use std::time::Duration;

use secrecy::SecretString;

use lxgate_config::{Config, Profile};
use lxgate_core::{AuthToken, GatewayConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use lxgate_config::{config_path, load_config, load_config_or_default, save_config};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Translate a profile + global flags into a `GatewayConfig`.
///
/// Flag and env overrides win over profile values: `--gateway` replaces the
/// URL, `--token` replaces the whole credential chain, `--insecure` and
/// `--timeout` override TLS and timing.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
) -> Result<GatewayConfig, CliError> {
    let mut config = lxgate_config::profile_to_gateway_config(profile, profile_name)?;

    if let Some(ref url_str) = global.gateway {
        config.url = url_str.parse().map_err(|_| CliError::Validation {
            field: "gateway".into(),
            reason: format!("invalid URL: {url_str}"),
        })?;
    }

    if let Some(ref token) = global.token {
        config.auth = AuthToken::Bearer(SecretString::from(token.clone()));
    }

    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }

    config.timeout = Duration::from_secs(global.timeout);

    Ok(config)
}

/// Build a `GatewayConfig` from CLI flags and env vars alone, with no
/// profile on disk. Used when the config file doesn't exist yet.
pub fn config_from_flags(global: &GlobalOpts) -> Result<GatewayConfig, CliError> {
    let url_str = global.gateway.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;

    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "gateway".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    // Bearer token if given, anonymous otherwise (open lab gateways).
    let auth = match global.token {
        Some(ref token) => AuthToken::Bearer(SecretString::from(token.clone())),
        None => AuthToken::None,
    };

    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(GatewayConfig {
        url,
        auth,
        tls,
        timeout: Duration::from_secs(global.timeout),
        ..GatewayConfig::default()
    })
}
