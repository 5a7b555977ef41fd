//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Password, Select};

use lxgate_config::{Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn keyring_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "keyring".into(),
        reason: format!("keyring access failed: {e}"),
    }
}

fn store_in_keyring(profile_name: &str, slot: &str, secret: &str) -> Result<(), CliError> {
    let entry = keyring::Entry::new("lxgate", &format!("{profile_name}/{slot}"))
        .map_err(keyring_err)?;
    entry.set_password(secret).map_err(keyring_err)?;
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("lxgate -- configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let gateway: String = Input::new()
                .with_prompt("Gateway URL")
                .default("http://127.0.0.1:8000".into())
                .interact_text()
                .map_err(prompt_err)?;

            let auth_choices = &[
                "Bearer token",
                "Username/Password",
                "Anonymous (open lab gateway)",
            ];
            let auth_selection = Select::new()
                .with_prompt("Authentication method")
                .items(auth_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                gateway,
                ..Profile::default()
            };

            match auth_selection {
                // --- Bearer token flow ---
                0 => {
                    let token = Password::new()
                        .with_prompt("Token")
                        .interact()
                        .map_err(prompt_err)?;

                    if token.is_empty() {
                        return Err(CliError::Validation {
                            field: "token".into(),
                            reason: "token cannot be empty".into(),
                        });
                    }

                    let store_choices = &[
                        "Store in system keyring (recommended)",
                        "Save to config file (plaintext)",
                    ];
                    let store_selection = Select::new()
                        .with_prompt("Where to store the token?")
                        .items(store_choices)
                        .default(0)
                        .interact()
                        .map_err(prompt_err)?;

                    if store_selection == 0 {
                        store_in_keyring(&profile_name, "token", &token)?;
                        eprintln!("   Token stored in system keyring");
                    } else {
                        profile.token = Some(token);
                    }
                }

                // --- Username/Password flow ---
                1 => {
                    let username: String = Input::new()
                        .with_prompt("Username")
                        .interact_text()
                        .map_err(prompt_err)?;

                    let password = Password::new()
                        .with_prompt("Password")
                        .interact()
                        .map_err(prompt_err)?;

                    if username.is_empty() || password.is_empty() {
                        return Err(CliError::Validation {
                            field: "credentials".into(),
                            reason: "username and password cannot be empty".into(),
                        });
                    }

                    let store_choices = &[
                        "Store password in system keyring (recommended)",
                        "Save to config file (plaintext)",
                    ];
                    let store_selection = Select::new()
                        .with_prompt("Where to store the password?")
                        .items(store_choices)
                        .default(0)
                        .interact()
                        .map_err(prompt_err)?;

                    profile.username = Some(username);
                    if store_selection == 0 {
                        store_in_keyring(&profile_name, "password", &password)?;
                        eprintln!("   Password stored in system keyring");
                    } else {
                        profile.password = Some(password);
                    }
                }

                // --- Anonymous ---
                _ => {}
            }

            let mut profiles = HashMap::new();
            profiles.insert(profile_name.clone(), profile);

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Default::default(),
                profiles,
            };

            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: lxgate status");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "gateway" => profile.gateway = value,
                "token" => profile.token = Some(value),
                "token_env" | "token-env" => profile.token_env = Some(value),
                "username" => profile.username = Some(value),
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                "poll_interval" | "poll-interval" => {
                    profile.poll_interval =
                        Some(value.parse().map_err(|_| CliError::Validation {
                            field: "poll_interval".into(),
                            reason: "must be a number (seconds, 0 disables polling)".into(),
                        })?);
                }
                "log_capacity" | "log-capacity" => {
                    profile.log_capacity =
                        Some(value.parse().map_err(|_| CliError::Validation {
                            field: "log_capacity".into(),
                            reason: "must be a positive number".into(),
                        })?);
                }
                "websocket" => {
                    profile.websocket = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "websocket".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: gateway, token, \
                             token_env, username, insecure, timeout, poll_interval, \
                             log_capacity, websocket, ca_cert"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            eprintln!("Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: lxgate config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name =
                profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name: profile_name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            let token = Password::new()
                .with_prompt("Token")
                .interact()
                .map_err(prompt_err)?;

            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }

            store_in_keyring(&profile_name, "token", &token)?;
            eprintln!("Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
