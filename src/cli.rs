use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::model::config::Overrides;
use crate::plugin::installer::InstallOptions;

const EXAMPLES: &str = "\
Examples:
  # Install from this checkout and configure
  clawchat-install \"20231227:EXAMPLE_SECRET_KEY_35_CHARS_LONG_12\"

  # Install the published npm package
  clawchat-install \"20231227:...\" --method npm

  # Only update the config, do not install
  clawchat-install \"20231227:...\" --skip-install

  # Custom poll interval
  clawchat-install \"20231227:...\" --poll-interval 3000";

/// Install the openclawwechat plugin into an OpenClaw gateway and write its config
#[derive(Parser, Debug)]
#[command(name = "clawchat-install")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// API key in bot_id:secret form (prompted for when omitted)
    #[arg(value_name = "API_KEY")]
    pub api_key: Option<String>,

    /// Where to install the plugin from
    #[arg(long, value_enum, default_value_t = InstallMethod::Local)]
    pub method: InstallMethod,

    /// Poll interval in milliseconds
    #[arg(long = "poll-interval", value_name = "MS", default_value_t = 2000)]
    pub poll_interval: u64,

    /// Session key prefix
    #[arg(
        long = "session-prefix",
        value_name = "PREFIX",
        default_value = "agent:main:wechat:miniprogram:"
    )]
    pub session_prefix: String,

    /// Enable plugin debug logging
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Skip `plugins install` and only update the config
    #[arg(long, default_value = "false")]
    pub skip_install: bool,

    /// Plugin checkout to install from and read openclaw.plugin.json of (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub plugin_dir: Option<PathBuf>,

    /// Gateway config file (default: ~/.openclaw/openclaw.json)
    #[arg(long = "config", value_name = "FILE", env = "OPENCLAW_CONFIG_PATH")]
    pub config_path: Option<PathBuf>,

    /// Gateway CLI executable (default: openclaw)
    #[arg(long = "openclaw-bin", value_name = "PROGRAM", env = "OPENCLAW_BIN")]
    pub openclaw_bin: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InstallMethod {
    /// Install from the plugin directory
    Local,
    /// Install the published package from the npm registry
    #[value(alias = "registry")]
    Npm,
}

impl Cli {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            gateway_bin: self.openclaw_bin.clone(),
            config_path: self.config_path.clone(),
            plugin_dir: self.plugin_dir.clone(),
        }
    }

    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            api_key: self.api_key.clone(),
            method: self.method,
            poll_interval_ms: self.poll_interval,
            session_key_prefix: self.session_prefix.clone(),
            debug: self.debug,
            skip_install: self.skip_install,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["clawchat-install"]).unwrap();
        let options = cli.install_options();

        assert_eq!(options.api_key, None);
        assert_eq!(options.method, InstallMethod::Local);
        assert_eq!(options.poll_interval_ms, 2000);
        assert_eq!(options.session_key_prefix, "agent:main:wechat:miniprogram:");
        assert!(!options.debug);
        assert!(!options.skip_install);
    }

    #[test]
    fn all_flags() {
        let cli = Cli::try_parse_from([
            "clawchat-install",
            "123:secret",
            "--method",
            "npm",
            "--poll-interval",
            "3000",
            "--session-prefix",
            "agent:ops:wx:",
            "--debug",
            "--skip-install",
            "--plugin-dir",
            "/src/plugin",
            "--config",
            "/tmp/openclaw.json",
            "--openclaw-bin",
            "/opt/openclaw",
        ])
        .unwrap();
        let options = cli.install_options();
        let overrides = cli.overrides();

        assert_eq!(options.api_key.as_deref(), Some("123:secret"));
        assert_eq!(options.method, InstallMethod::Npm);
        assert_eq!(options.poll_interval_ms, 3000);
        assert_eq!(options.session_key_prefix, "agent:ops:wx:");
        assert!(options.debug);
        assert!(options.skip_install);
        assert_eq!(overrides.plugin_dir, Some(PathBuf::from("/src/plugin")));
        assert_eq!(overrides.config_path, Some(PathBuf::from("/tmp/openclaw.json")));
        assert_eq!(overrides.gateway_bin.as_deref(), Some("/opt/openclaw"));
    }

    #[test]
    fn registry_is_an_alias_for_npm() {
        let cli = Cli::try_parse_from(["clawchat-install", "--method", "registry"]).unwrap();

        assert_eq!(cli.method, InstallMethod::Npm);
    }

    #[test]
    fn rejects_unknown_method_and_bad_interval() {
        assert!(Cli::try_parse_from(["clawchat-install", "--method", "git"]).is_err());
        assert!(Cli::try_parse_from(["clawchat-install", "--poll-interval", "soon"]).is_err());
        assert!(Cli::try_parse_from(["clawchat-install", "--poll-interval", "-5"]).is_err());
    }
}
