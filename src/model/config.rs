use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::plugin::manifest::PluginId;

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Process-wide installer settings. Built once in `main`, read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallerConfig {
    pub gateway: GatewayConfig,
    pub plugin: PluginConfig,
    /// Fallback plugin defaults, used when the manifest cannot be read.
    pub defaults: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Program followed by any leading arguments, e.g. `["npx", "openclaw"]`.
    pub command: Vec<String>,
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PluginConfig {
    pub id: PluginId,
    /// Registry package name used by `--method npm`.
    pub package: String,
    pub manifest_file: String,
    /// Plugin checkout; defaults to the working directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

/// Settings taken from the command line or environment, applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gateway_bin: Option<String>,
    pub config_path: Option<PathBuf>,
    pub plugin_dir: Option<PathBuf>,
}

impl InstallerConfig {
    /// Load configuration with layering: defaults → user config → overrides.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let user_path = directories::ProjectDirs::from("", "", "clawchat-installer")
            .map(|d| d.config_dir().join("config.toml"));
        Self::load_from(user_path.as_deref(), overrides)
    }

    pub fn load_from(user_path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut table: toml::Table =
            toml::from_str(DEFAULT_CONFIG).context("built-in default.toml is invalid")?;

        if let Some(path) = user_path.filter(|p| p.exists()) {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let user: toml::Table = toml::from_str(&raw)
                .with_context(|| format!("cannot parse {}", path.display()))?;
            merge_tables(&mut table, user);
            tracing::info!("merged user config from {}", path.display());
        }

        let mut config: InstallerConfig = toml::Value::Table(table)
            .try_into()
            .context("invalid installer config")?;
        config.apply(overrides)?;

        if config.gateway.command.is_empty() {
            bail!("gateway.command must name a program");
        }

        Ok(config)
    }

    fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(bin) = &overrides.gateway_bin {
            self.gateway.command = vec![bin.clone()];
        }
        if let Some(path) = &overrides.config_path {
            self.gateway.config_path = path.clone();
        }
        if let Some(dir) = &overrides.plugin_dir {
            self.plugin.dir = Some(dir.clone());
        }

        self.gateway.config_path = expand_home(&self.gateway.config_path)?;

        if self.plugin.dir.is_none() {
            let cwd = std::env::current_dir().context("cannot determine working directory")?;
            self.plugin.dir = Some(cwd);
        }

        Ok(())
    }

    pub fn config_path(&self) -> &Path {
        &self.gateway.config_path
    }

    pub fn plugin_dir(&self) -> &Path {
        self.plugin.dir.as_deref().unwrap_or(Path::new("."))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.plugin_dir().join(&self.plugin.manifest_file)
    }
}

/// Recursively overlays `overlay` onto `base`; nested tables merge, anything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match value {
            toml::Value::Table(incoming) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => merge_tables(existing, incoming),
                _ => {
                    base.insert(key, toml::Value::Table(incoming));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    let Ok(rest) = path.strip_prefix("~") else {
        return Ok(path.to_path_buf());
    };
    let home = dirs_home().ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(home.join(rest))
}

fn dirs_home() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
