use serde_json::{Map, Value};
use std::io::{BufRead, Write};

use crate::cli::InstallMethod;
use crate::error::{InstallerError, Warning};
use crate::model::config::InstallerConfig;
use crate::model::credential::{self, CREDENTIAL_EXAMPLE, CREDENTIAL_FORMAT};
use crate::model::settings::{self, CREDENTIAL_KEY, PluginSettings};
use crate::model::stage::Stage;
use crate::output;
use crate::plugin::host_cli::{GatewayTool, InstallSource};
use crate::plugin::host_config;
use crate::plugin::manifest::{self, PluginId};
use crate::prompt::Prompter;

/// Per-run choices from the command line.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub api_key: Option<String>,
    pub method: InstallMethod,
    pub poll_interval_ms: u64,
    pub session_key_prefix: String,
    pub debug: bool,
    pub skip_install: bool,
}

/// What a successful run did.
#[derive(Debug, Default)]
pub struct InstallReport {
    pub installed: bool,
    /// The `config` object written for the plugin.
    pub persisted: Map<String, Value>,
    pub warnings: Vec<Warning>,
}

/// Drives one install run, strictly in `Stage` order.
pub struct PluginInstaller<'a, T, R, W> {
    config: &'a InstallerConfig,
    tool: T,
    prompter: Prompter<R, W>,
    stage: Stage,
    report: InstallReport,
}

impl<'a, T, R, W> PluginInstaller<'a, T, R, W>
where
    T: GatewayTool,
    R: BufRead,
    W: Write,
{
    pub fn new(config: &'a InstallerConfig, tool: T, prompter: Prompter<R, W>) -> Self {
        Self {
            config,
            tool,
            prompter,
            stage: Stage::default(),
            report: InstallReport::default(),
        }
    }

    /// Stage the run is in, or stopped in after an error.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(&mut self, options: &InstallOptions) -> Result<InstallReport, InstallerError> {
        let config = self.config;

        self.enter(Stage::CheckTool);
        let version = self.tool.version()?;
        output::success(format!("OpenClaw found: {version}"));

        self.enter(Stage::EnsureConfigFile);
        let config_path = config.config_path();
        if host_config::ensure_exists(config_path)? {
            output::warning(format!("config file did not exist: {}", config_path.display()));
            output::success("created default config file");
        }

        self.enter(Stage::CollectCredential);
        let api_key = self.collect_credential(options.api_key.as_deref())?;

        if options.skip_install {
            self.enter(Stage::SkipInstall);
            output::info("skipping plugin install (--skip-install)");
        } else {
            self.enter(Stage::Install);
            self.install(options.method)?;
        }

        self.enter(Stage::UpdateConfig);
        self.update_config(api_key, options)?;

        self.enter(Stage::ValidateConfig);
        self.validate_config();

        self.enter(Stage::Done);
        Ok(std::mem::take(&mut self.report))
    }

    fn enter(&mut self, stage: Stage) {
        tracing::info!(stage = stage.label(), "entering stage");
        self.stage = stage;
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!("{warning}");
        output::warning(&warning);
        self.report.warnings.push(warning);
    }

    /// Takes the command-line key if given and accepted, otherwise prompts until a key is accepted.
    fn collect_credential(&mut self, given: Option<&str>) -> Result<String, InstallerError> {
        if let Some(key) = given.filter(|key| !key.is_empty()) {
            if self.accept_credential(key)? {
                return Ok(key.to_string());
            }
        }

        output::info(format!("Enter the API key ({CREDENTIAL_FORMAT})"));
        output::info("The API key is shown in the ClawChat WeChat mini program");
        output::info(format!("Example: {CREDENTIAL_EXAMPLE}"));

        loop {
            let key = self.prompter.ask("API Key: ")?;
            if key.is_empty() {
                output::error("API key cannot be empty");
                continue;
            }
            if self.accept_credential(&key)? {
                return Ok(key);
            }
        }
    }

    fn accept_credential(&mut self, key: &str) -> Result<bool, InstallerError> {
        if credential::validate(key) {
            return Ok(true);
        }
        self.warn(Warning::CredentialShape);
        self.prompter.confirm("Continue anyway?")
    }

    fn install(&mut self, method: InstallMethod) -> Result<(), InstallerError> {
        let config = self.config;
        let source = match method {
            InstallMethod::Local => {
                if !config.manifest_path().is_file() {
                    return Err(InstallerError::NotAPluginDir {
                        dir: config.plugin_dir().to_path_buf(),
                        manifest: config.plugin.manifest_file.clone(),
                    });
                }
                InstallSource::Local(config.plugin_dir().to_path_buf())
            }
            InstallMethod::Npm => InstallSource::Registry(config.plugin.package.clone()),
        };
        output::info(format!("installing plugin from {source}"));

        let stdout = self.tool.install(&source)?;
        output::detail(&stdout);

        let plugin_id = &config.plugin.id;
        let listing = self
            .tool
            .list_plugins()
            .map_err(|detail| verification_error(plugin_id, detail))?;
        if !listing.contains(plugin_id.as_str()) {
            return Err(verification_error(
                plugin_id,
                "missing from `plugins list` output".to_string(),
            ));
        }

        self.report.installed = true;
        output::success("plugin installed");
        Ok(())
    }

    fn update_config(
        &mut self,
        api_key: String,
        options: &InstallOptions,
    ) -> Result<(), InstallerError> {
        let config = self.config;
        output::info("updating config file...");

        let defaults = manifest::load_defaults(&config.manifest_path(), &config.defaults);
        if let Some(warning) = defaults.warning {
            self.warn(warning);
        }

        if !credential::is_session_prefix(&options.session_key_prefix) {
            self.warn(Warning::SessionPrefixShape(options.session_key_prefix.clone()));
        }

        let settings = PluginSettings {
            api_key,
            poll_interval_ms: options.poll_interval_ms,
            session_key_prefix: options.session_key_prefix.clone(),
            debug: options.debug,
        };
        let minimal = settings::minimize(&settings.to_map(), &defaults.values);

        host_config::update(config.config_path(), &config.plugin.id, minimal.clone())?;
        report_persisted(&minimal);
        self.report.persisted = minimal;
        Ok(())
    }

    fn validate_config(&mut self) {
        output::info("validating config...");
        match self.tool.validate_config() {
            Ok(()) => output::success("config validated"),
            Err(warning) => self.warn(warning),
        }
    }
}

fn verification_error(plugin_id: &PluginId, detail: String) -> InstallerError {
    InstallerError::InstallVerification {
        plugin_id: plugin_id.to_string(),
        detail,
    }
}

fn report_persisted(minimal: &Map<String, Value>) {
    if minimal.is_empty() {
        output::warning("every setting equals its default, no plugin config was saved");
        output::info("OpenClaw will read the defaults from the plugin manifest");
    } else if minimal.len() == 1 && minimal.contains_key(CREDENTIAL_KEY) {
        output::success("config updated (minimal)");
        output::info("other settings use their defaults, only the API key was saved");
    } else {
        let keys: Vec<&str> = minimal.keys().map(String::as_str).collect();
        output::success(format!("config updated (minimal): {}", keys.join(", ")));
    }
}

/// Follow-up commands for the user once everything is in place.
pub fn print_next_steps(config: &InstallerConfig) {
    let gateway = config.gateway.command.join(" ");
    let plugin_id = &config.plugin.id;

    println!();
    output::success("plugin installed and configured");
    println!();
    output::info("next steps:");
    println!("  1. restart the OpenClaw gateway:");
    output::command(&format!("{gateway} gateway restart"));
    println!();
    println!("  2. check the logs to confirm the plugin loaded:");
    output::command(&format!("{gateway} logs --follow | grep \"{plugin_id}\""));
    println!();
    println!("  3. check the plugin status:");
    output::command(&format!("{gateway} plugins list"));
    println!();
}
