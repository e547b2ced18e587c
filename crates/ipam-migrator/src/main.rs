mod cli;
mod config;
mod error;
mod logging;
mod output;

use clap::{CommandFactory, Parser};
use tracing::{debug, info};

use ipam_core::{AnyBackend, Mode, ReadOptions, dump, migrate};

use crate::cli::{Cli, Command, OutputFormat};
use crate::config::{Config, Settings};
use crate::error::{CliError, exit_code};

/// Dumps default to JSON: a table only shows counts.
const DEFAULT_DUMP_FORMAT: OutputFormat = OutputFormat::Json;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "ipam-migrator", &mut std::io::stdout());
        return;
    }

    let code = match start(&cli).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            code
        }
    };
    std::process::exit(code);
}

/// Load configuration, install logging, then run until done or Ctrl-C.
async fn start(cli: &Cli) -> Result<(), CliError> {
    let (config, config_path) = config::load(cli.config.as_deref())?;
    let settings = config::settings(cli, &config);
    let _guard = logging::init(settings.log_level, cli.log.as_deref())?;
    debug!(config = %config_path.display(), "configuration loaded");

    tokio::select! {
        result = run(cli, &config, &config_path, &settings) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, stopping");
            Err(CliError::Interrupted)
        }
    }
}

async fn run(
    cli: &Cli,
    config: &Config,
    config_path: &std::path::Path,
    settings: &Settings,
) -> Result<(), CliError> {
    let Some(input) = cli.input.as_deref() else {
        return Err(CliError::InvalidBackend {
            message: "no INPUT backend given".into(),
        });
    };

    // Validate both tuples before any request is made.
    let input = config::resolve_backend(input, "input", config, config_path, cli.no_input_ssl_verify)?;
    let output = cli
        .output_backend
        .as_deref()
        .map(|raw| {
            config::resolve_backend(raw, "output", config, config_path, cli.no_output_ssl_verify)
        })
        .transpose()?;

    let options = ReadOptions::default().skipping(cli.skip.iter().copied());
    let source = AnyBackend::connect(input.name, &input.spec, &settings.transport)?;

    let Some(output) = output else {
        let snapshot = dump(&source, options).await?;
        let format = settings.format.unwrap_or(DEFAULT_DUMP_FORMAT);
        return output::print_output(&output::render_snapshot(format, &snapshot)?);
    };

    let destination = AnyBackend::connect(output.name, &output.spec, &settings.transport)?;
    let mode = if cli.dry_run { Mode::Plan } else { Mode::Apply };
    let report = migrate(&source, &destination, options, mode).await?;

    output::print_output(&report.summary_lines().join("\n"))?;
    if let Some(format) = cli.format {
        output::print_output(&output::render_report(format, &report)?)?;
    }

    match report.skipped().count() {
        0 => Ok(()),
        count => Err(CliError::ItemsSkipped { count }),
    }
}
