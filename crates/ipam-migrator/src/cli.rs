//! Clap derive structures for the `ipam-migrator` CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use strum::IntoEnumIterator;

use ipam_core::EntityKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ipam-migrator -- copy IPAM data between phpIPAM and NetBox
#[derive(Debug, Parser)]
#[command(
    name = "ipam-migrator",
    version,
    about = "Migrate IPAM data between phpIPAM and NetBox",
    long_about = "Reads roles, VLAN groups, VLANs, VRFs, prefixes, IP addresses and \
        aggregates from one IPAM system and writes them into another, rewriting \
        references to the ids the destination assigns.\n\n\
        Without OUTPUT the source is only read and dumped.\n\n\
        A backend is either a tuple ENDPOINT,TYPE,AUTH-METHOD,AUTH-DATA... or \
        @NAME for a backend defined in the configuration file:\n  \
        https://netbox.example.com/api,netbox,token,0123abcd\n  \
        https://ipam.example.com/api/migrator,phpipam,login,admin,secret",
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Source backend (tuple or @name)
    #[arg(value_name = "INPUT", required = true)]
    pub input: Option<String>,

    /// Destination backend (tuple or @name); omit to dump the source
    #[arg(value_name = "OUTPUT")]
    pub output_backend: Option<String>,

    /// Also write the log to FILE
    #[arg(long, short = 'l', value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Raise the log level (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Plan the migration without writing anything
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Accept invalid TLS certificates from the input backend
    #[arg(long)]
    pub no_input_ssl_verify: bool,

    /// Accept invalid TLS certificates from the output backend
    #[arg(long)]
    pub no_output_ssl_verify: bool,

    /// Do not read KIND (repeatable)
    #[arg(
        long,
        value_name = "KIND",
        value_parser = parse_skip_kind,
        long_help = "Do not read KIND (repeatable): roles, vlan-groups, vlans, vrfs, \
            prefixes, ip-addresses, aggregates"
    )]
    pub skip: Vec<EntityKind>,

    /// Format of the dump or the migration report
    #[arg(long = "output", short = 'o', value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Retries after a failed request (connect errors, timeouts, 5xx, 429)
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Configuration file (default: platform config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print a shell completion script
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ── Value enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Per-kind summary table
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// `steps` levels more verbose, saturating at `trace`.
    pub fn raised(self, steps: u8) -> Self {
        const LADDER: [LogLevel; 5] = [
            LogLevel::Error,
            LogLevel::Warn,
            LogLevel::Info,
            LogLevel::Debug,
            LogLevel::Trace,
        ];
        let current = LADDER.iter().position(|l| *l == self).unwrap_or(2);
        let target = (current + usize::from(steps)).min(LADDER.len() - 1);
        LADDER.get(target).copied().unwrap_or(LogLevel::Trace)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

fn parse_skip_kind(raw: &str) -> Result<EntityKind, String> {
    EntityKind::iter()
        .find(|kind| kind.cli_name() == raw)
        .ok_or_else(|| {
            let names: Vec<&str> = EntityKind::iter().map(EntityKind::cli_name).collect();
            format!("expected one of: {}", names.join(", "))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(LogLevel::Info.raised(0), LogLevel::Info);
        assert_eq!(LogLevel::Info.raised(1), LogLevel::Debug);
        assert_eq!(LogLevel::Warn.raised(9), LogLevel::Trace);
    }

    #[test]
    fn skip_accepts_plural_names() {
        assert_eq!(parse_skip_kind("ip-addresses"), Ok(EntityKind::IpAddress));
        assert_eq!(parse_skip_kind("vlan-groups"), Ok(EntityKind::VlanGroup));
        assert!(parse_skip_kind("vlan").is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
