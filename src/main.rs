mod cli;
mod error;
mod model;
mod output;
mod plugin;
mod prompt;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use model::config::InstallerConfig;
use plugin::host_cli::HostCli;
use plugin::installer::{PluginInstaller, print_next_steps};
use prompt::Prompter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to file only; stdout belongs to the install transcript.
    let _guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            output::warning(format!("file logging disabled: {err:#}"));
            None
        }
    };

    tracing::info!("clawchat-install starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("install failed: {err:#}");
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Result<WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "clawchat-installer")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("cannot create {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "installer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clawchat_installer=info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow::anyhow!("{err}"))?;

    Ok(guard)
}

fn run(cli: &Cli) -> Result<()> {
    let config = InstallerConfig::load(&cli.overrides())?;
    tracing::info!(
        config = %config.config_path().display(),
        plugin_dir = %config.plugin_dir().display(),
        "installer config loaded"
    );

    output::banner("OpenClawWeChat plugin installer");

    let (program, leading_args) = config
        .gateway
        .command
        .split_first()
        .context("gateway.command is empty")?;
    let tool = HostCli::new(program.as_str(), leading_args);

    let mut installer = PluginInstaller::new(&config, tool, Prompter::stdio());
    let report = installer.run(&cli.install_options()).map_err(|err| {
        tracing::error!(stage = installer.stage().label(), "install stopped: {err}");
        err
    })?;
    tracing::info!(
        installed = report.installed,
        persisted = ?report.persisted.keys().collect::<Vec<_>>(),
        warnings = report.warnings.len(),
        "install finished"
    );

    if !report.warnings.is_empty() {
        output::warning(format!(
            "finished with {} warning(s), see above",
            report.warnings.len()
        ));
    }
    print_next_steps(&config);
    Ok(())
}
