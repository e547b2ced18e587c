//! CLI-owned configuration: TOML defaults and named backends, resolved
//! into `ipam_core::BackendSpec` and transport settings.
//!
//! Core never sees these types. It receives a validated `BackendSpec`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use ipam_api::{RetryPolicy, TransportConfig};
use ipam_core::BackendSpec;

use crate::cli::{Cli, LogLevel, OutputFormat};
use crate::error::CliError;

/// Environment variables with this prefix override the file;
/// `__` separates nesting levels (`IPAM_MIGRATOR_DEFAULTS__TIMEOUT=60`).
const ENV_PREFIX: &str = "IPAM_MIGRATOR_";

// ── TOML config structs ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backends, selected on the command line as `@name`.
    #[serde(default)]
    pub backends: BTreeMap<String, BackendProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Defaults {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Retries after a failed request.
    pub retries: u32,
    pub log_level: LogLevel,
    pub output: Option<OutputFormat>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: 30,
            retries: 2,
            log_level: LogLevel::Info,
            output: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BackendProfile {
    pub endpoint: String,
    pub kind: String,
    pub auth_method: String,
    pub key: Option<SecretString>,
    pub token: Option<SecretString>,
    pub user: Option<String>,
    pub password: Option<SecretString>,
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,
}

fn default_ssl_verify() -> bool {
    true
}

// ── Config file path ─────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "ipam-migrator", "ipam-migrator").map_or_else(
        || PathBuf::from(".ipam-migrator.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ───────────────────────────────────────────────────

/// Load the config from `explicit` (which must exist) or the default path
/// (which may not), merged with the environment.
pub fn load(explicit: Option<&Path>) -> Result<(Config, PathBuf), CliError> {
    let path = match explicit {
        Some(path) if !path.is_file() => {
            return Err(CliError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Some(path) => path.to_path_buf(),
        None => config_path(),
    };

    let config = Figment::new()
        .merge(Toml::file(&path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;
    Ok((config, path))
}

// ── Settings resolution ──────────────────────────────────────────────

/// Flag > environment > file > built-in default.
#[derive(Debug)]
pub struct Settings {
    pub transport: TransportConfig,
    pub log_level: LogLevel,
    /// Format chosen with `--output` (or the config default).
    pub format: Option<OutputFormat>,
}

pub fn settings(cli: &Cli, config: &Config) -> Settings {
    let defaults = &config.defaults;
    let timeout = Duration::from_secs(cli.timeout.unwrap_or(defaults.timeout));
    let retries = cli.retries.unwrap_or(defaults.retries);

    Settings {
        transport: TransportConfig {
            timeout,
            retry: RetryPolicy {
                max_attempts: retries.saturating_add(1),
                ..RetryPolicy::default()
            },
            ..TransportConfig::default()
        },
        log_level: cli
            .log_level
            .unwrap_or(defaults.log_level)
            .raised(cli.verbose),
        format: cli.format.or(defaults.output),
    }
}

// ── Backend resolution ───────────────────────────────────────────────

/// A backend argument resolved to a label and a validated spec.
#[derive(Debug)]
pub struct ResolvedBackend {
    pub name: String,
    pub spec: BackendSpec,
}

/// Resolve a positional backend argument.
///
/// `@name` looks the backend up in the config; anything else is parsed as
/// a tuple and labelled `fallback_name`. `no_ssl_verify` overrides the
/// profile's `ssl_verify`.
pub fn resolve_backend(
    raw: &str,
    fallback_name: &str,
    config: &Config,
    config_path: &Path,
    no_ssl_verify: bool,
) -> Result<ResolvedBackend, CliError> {
    let (name, spec) = match raw.strip_prefix('@') {
        Some(name) => {
            let profile = config
                .backends
                .get(name)
                .ok_or_else(|| CliError::BackendNotFound {
                    name: name.to_owned(),
                    available: available(config),
                    path: config_path.display().to_string(),
                })?;
            (name.to_owned(), profile_spec(name, profile)?)
        }
        None => (fallback_name.to_owned(), raw.parse::<BackendSpec>()?),
    };

    let ssl_verify = spec.ssl_verify && !no_ssl_verify;
    Ok(ResolvedBackend {
        name,
        spec: spec.with_ssl_verify(ssl_verify),
    })
}

fn profile_spec(name: &str, profile: &BackendProfile) -> Result<BackendSpec, CliError> {
    let incomplete = |reason: &str| CliError::BackendIncomplete {
        name: name.to_owned(),
        reason: reason.to_owned(),
    };
    let reveal = |secret: &SecretString| secret.expose_secret().to_owned();

    let method = profile.auth_method.trim().to_ascii_lowercase();
    let data = match method.as_str() {
        "key" | "token" => {
            let secret = match method.as_str() {
                "key" => profile.key.as_ref().or(profile.token.as_ref()),
                _ => profile.token.as_ref().or(profile.key.as_ref()),
            };
            vec![reveal(secret.ok_or_else(|| incomplete("missing 'token' (or 'key')"))?)]
        }
        "login" => {
            let user = profile.user.clone().ok_or_else(|| incomplete("missing 'user'"))?;
            let password = profile
                .password
                .as_ref()
                .ok_or_else(|| incomplete("missing 'password'"))?;
            vec![user, reveal(password)]
        }
        // Let the tuple validation produce the usual message.
        _ => Vec::new(),
    };

    let spec = BackendSpec::new(&profile.endpoint, &profile.kind, &method, &data)?;
    Ok(spec.with_ssl_verify(profile.ssl_verify))
}

fn available(config: &Config) -> String {
    if config.backends.is_empty() {
        "(none)".into()
    } else {
        config
            .backends
            .keys()
            .map(|k| format!("@{k}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
