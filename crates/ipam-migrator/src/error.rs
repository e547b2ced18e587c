//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with help text and a
//! distinct exit code per failure class.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use ipam_core::CoreError;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const CONFIG: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const READ: i32 = 4;
    pub const WRITE: i32 = 5;
    pub const SKIPPED: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const INTERRUPTED: i32 = 130;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Configuration ────────────────────────────────────────────────
    #[error("Invalid backend: {message}")]
    #[diagnostic(
        code(ipam_migrator::invalid_backend),
        help(
            "Expected ENDPOINT,TYPE,AUTH-METHOD,AUTH-DATA... or @NAME, e.g.\n  \
             https://netbox.example.com/api,netbox,token,<token>\n  \
             https://ipam.example.com/api/<app>,phpipam,login,<user>,<password>"
        )
    )]
    InvalidBackend { message: String },

    #[error("Backend '{name}' is not defined in the configuration")]
    #[diagnostic(
        code(ipam_migrator::backend_not_found),
        help("Defined backends: {available}\nAdd a [backends.{name}] table to {path}")
    )]
    BackendNotFound {
        name: String,
        available: String,
        path: String,
    },

    #[error("Backend '{name}' is incomplete: {reason}")]
    #[diagnostic(code(ipam_migrator::backend_incomplete))]
    BackendIncomplete { name: String, reason: String },

    #[error("Configuration file {} does not exist", path.display())]
    #[diagnostic(code(ipam_migrator::no_config))]
    ConfigNotFound { path: PathBuf },

    #[error(transparent)]
    #[diagnostic(code(ipam_migrator::config))]
    Config(Box<figment::Error>),

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(ipam_migrator::connection_failed),
        help(
            "{reason}\n\
             Check the endpoint URL. For self-signed certificates use \
             --no-input-ssl-verify / --no-output-ssl-verify."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(ipam_migrator::timeout),
        help("{reason}\nIncrease the limit with --timeout.")
    )]
    Timeout { reason: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ipam_migrator::auth_failed),
        help(
            "NetBox needs an API token with write permission on the output side.\n\
             phpIPAM needs an API application id in the endpoint path and a user \
             allowed to use it."
        )
    )]
    AuthFailed { message: String },

    // ── Migration ────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(ipam_migrator::read_failed))]
    ReadFailed { message: String },

    #[error("{message}")]
    #[diagnostic(code(ipam_migrator::write_failed))]
    WriteFailed { message: String },

    #[error("{count} item(s) could not be migrated")]
    #[diagnostic(
        code(ipam_migrator::items_skipped),
        help("The log lists each skipped item with its reason. Re-running is safe.")
    )]
    ItemsSkipped { count: usize },

    #[error("Interrupted")]
    #[diagnostic(
        code(ipam_migrator::interrupted),
        help("Objects written before the interrupt remain; re-running resumes safely.")
    )]
    Interrupted,

    #[error("{0}")]
    #[diagnostic(code(ipam_migrator::internal))]
    Internal(String),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error("Cannot open log file {}", path.display())]
    #[diagnostic(code(ipam_migrator::log_file))]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to render {format} output: {message}")]
    #[diagnostic(code(ipam_migrator::render))]
    Render { format: &'static str, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidBackend { .. }
            | Self::BackendNotFound { .. }
            | Self::BackendIncomplete { .. }
            | Self::ConfigNotFound { .. }
            | Self::Config(_) => exit_code::CONFIG,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ReadFailed { .. } => exit_code::READ,
            Self::WriteFailed { .. } => exit_code::WRITE,
            Self::ItemsSkipped { .. } => exit_code::SKIPPED,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => exit_code::CONNECTION,
            Self::Interrupted => exit_code::INTERRUPTED,
            Self::Internal(_) | Self::LogFile { .. } | Self::Render { .. } | Self::Io(_) => {
                exit_code::GENERAL
            }
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration { message } => Self::InvalidBackend { message },
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::Timeout { reason } => Self::Timeout { reason },
            CoreError::Authentication { message } => Self::AuthFailed { message },
            CoreError::Interrupted => Self::Interrupted,
            e @ CoreError::Read { .. } => Self::ReadFailed {
                message: e.to_string(),
            },
            e @ (CoreError::Write { .. } | CoreError::Api { .. }) => Self::WriteFailed {
                message: e.to_string(),
            },
            e @ (CoreError::UnsupportedEntity { .. }
            | CoreError::UnresolvedReference { .. }
            | CoreError::InvalidRecord { .. }
            | CoreError::Internal(_)) => Self::Internal(e.to_string()),
        }
    }
}
