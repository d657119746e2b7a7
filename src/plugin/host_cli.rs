use std::ffi::OsStr;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::{InstallerError, Warning};

/// Where `plugins install` takes the plugin from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallSource {
    /// A plugin checkout on disk.
    Local(PathBuf),
    /// A package name resolved by the gateway's registry (npm).
    Registry(String),
}

impl InstallSource {
    fn as_arg(&self) -> &OsStr {
        match self {
            InstallSource::Local(path) => path.as_os_str(),
            InstallSource::Registry(name) => OsStr::new(name),
        }
    }
}

impl fmt::Display for InstallSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstallSource::Local(path) => write!(f, "local path {}", path.display()),
            InstallSource::Registry(name) => write!(f, "npm package {name}"),
        }
    }
}

/// The gateway commands the installer relies on.
pub trait GatewayTool {
    /// `--version`; the first stdout line, trimmed, on success.
    fn version(&self) -> Result<String, InstallerError>;

    /// `plugins install <path-or-name>`; stdout on success.
    fn install(&self, source: &InstallSource) -> Result<String, InstallerError>;

    /// `plugins list`; raw stdout, or why it could not be obtained.
    fn list_plugins(&self) -> Result<String, String>;

    /// `config validate`. Problems are never fatal.
    fn validate_config(&self) -> Result<(), Warning>;
}

impl<T: GatewayTool + ?Sized> GatewayTool for &T {
    fn version(&self) -> Result<String, InstallerError> {
        (**self).version()
    }

    fn install(&self, source: &InstallSource) -> Result<String, InstallerError> {
        (**self).install(source)
    }

    fn list_plugins(&self) -> Result<String, String> {
        (**self).list_plugins()
    }

    fn validate_config(&self) -> Result<(), Warning> {
        (**self).validate_config()
    }
}

/// Runs the real gateway CLI as a blocking child process. No timeouts, no retries.
#[derive(Debug, Clone)]
pub struct HostCli {
    program: String,
    leading_args: Vec<String>,
}

impl HostCli {
    pub fn new(program: impl Into<String>, leading_args: &[String]) -> Self {
        Self {
            program: program.into(),
            leading_args: leading_args.to_vec(),
        }
    }

    fn run<I, S>(&self, args: I) -> io::Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(&self.leading_args).args(args);
        tracing::debug!("running {command:?}");

        let output = command.output()?;
        tracing::info!(
            program = %self.program,
            status = %output.status,
            "gateway command finished"
        );
        Ok(output)
    }
}

impl GatewayTool for HostCli {
    fn version(&self) -> Result<String, InstallerError> {
        let not_found = |reason: String| InstallerError::ToolNotFound {
            program: self.program.clone(),
            reason,
        };

        let output = self.run(["--version"]).map_err(|err| {
            not_found(match err.kind() {
                io::ErrorKind::NotFound => "not found in PATH".to_string(),
                _ => err.to_string(),
            })
        })?;

        if !output.status.success() {
            return Err(not_found(failure_text(&output)));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    fn install(&self, source: &InstallSource) -> Result<String, InstallerError> {
        let failed = |stderr: String| InstallerError::Install {
            target: source.to_string(),
            stderr,
        };

        let output = self
            .run([OsStr::new("plugins"), OsStr::new("install"), source.as_arg()])
            .map_err(|err| failed(err.to_string()))?;

        if !output.status.success() {
            return Err(failed(failure_text(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn list_plugins(&self) -> Result<String, String> {
        let output = self
            .run(["plugins", "list"])
            .map_err(|err| format!("cannot run `plugins list`: {err}"))?;

        if !output.status.success() {
            return Err(format!("`plugins list` failed: {}", failure_text(&output)));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn validate_config(&self) -> Result<(), Warning> {
        let output = self
            .run(["config", "validate"])
            .map_err(|err| Warning::ConfigValidation(format!("cannot run validator: {err}")))?;

        if !output.status.success() {
            return Err(Warning::ConfigValidation(failure_text(&output)));
        }
        Ok(())
    }
}

/// stderr if there is any, else stdout, else the exit status.
fn failure_text(output: &Output) -> String {
    [&output.stderr, &output.stdout]
        .into_iter()
        .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| format!("exited with {}", output.status))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    /// A fake gateway CLI: `sh <script>` with the script body given per test.
    fn fake_cli(dir: &Path, body: &str) -> HostCli {
        let script = dir.join("openclaw.sh");
        let log = dir.join("calls.log");
        let text = format!("echo \"$@\" >> '{}'\n{body}\n", log.display());
        fs::write(&script, text).unwrap();
        HostCli::new("sh", &[script.display().to_string()])
    }

    fn calls(dir: &Path) -> String {
        fs::read_to_string(dir.join("calls.log")).unwrap_or_default()
    }

    const HEALTHY: &str = r#"
case "$1" in
  --version) echo "openclaw 2026.1.0" ;;
  plugins)
    case "$2" in
      install) echo "installed $3" ;;
      list) printf 'memory-core\nopenclawwechat  1.0.11\n' ;;
    esac ;;
  config) exit 0 ;;
esac
"#;

    #[test]
    fn version_reports_first_line() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), HEALTHY);

        assert_eq!(cli.version().unwrap(), "openclaw 2026.1.0");
        assert_eq!(calls(dir.path()).trim(), "--version");
    }

    #[test]
    fn version_ignores_trailing_lines() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(
            dir.path(),
            "printf '  openclaw 2026.1.0\nupdate available: 2026.2.0\n'",
        );

        assert_eq!(cli.version().unwrap(), "openclaw 2026.1.0");
    }

    #[test]
    fn missing_program_is_tool_not_found() {
        let cli = HostCli::new("openclaw-definitely-not-installed-here", &[]);

        match cli.version() {
            Err(InstallerError::ToolNotFound { program, reason }) => {
                assert_eq!(program, "openclaw-definitely-not-installed-here");
                assert_eq!(reason, "not found in PATH");
            }
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }

    #[test]
    fn failing_version_is_tool_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo 'broken install' >&2\nexit 3");

        match cli.version() {
            Err(InstallerError::ToolNotFound { reason, .. }) => assert_eq!(reason, "broken install"),
            other => panic!("expected ToolNotFound, got {other:?}"),
        }
    }

    #[test]
    fn install_passes_local_path() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), HEALTHY);
        let source = InstallSource::Local(PathBuf::from("/opt/plugins/openclawwechat"));

        let stdout = cli.install(&source).unwrap();

        assert_eq!(stdout.trim(), "installed /opt/plugins/openclawwechat");
        assert_eq!(
            calls(dir.path()).trim(),
            "plugins install /opt/plugins/openclawwechat"
        );
    }

    #[test]
    fn install_passes_registry_name() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), HEALTHY);

        cli.install(&InstallSource::Registry("openclawwechat".into()))
            .unwrap();

        assert_eq!(calls(dir.path()).trim(), "plugins install openclawwechat");
    }

    #[test]
    fn install_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo 'npm ERR! 404' >&2\nexit 1");

        match cli.install(&InstallSource::Registry("openclawwechat".into())) {
            Err(InstallerError::Install { target, stderr }) => {
                assert_eq!(target, "npm package openclawwechat");
                assert_eq!(stderr, "npm ERR! 404");
            }
            other => panic!("expected Install error, got {other:?}"),
        }
    }

    #[test]
    fn list_returns_raw_output() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), HEALTHY);

        let listing = cli.list_plugins().unwrap();

        assert!(listing.contains("openclawwechat  1.0.11"));
    }

    #[test]
    fn list_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "exit 2");

        let err = cli.list_plugins().unwrap_err();

        assert!(err.contains("exited with"), "{err}");
    }

    #[test]
    fn validate_failure_is_a_warning() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), "echo 'unknown key plugins.foo'\nexit 1");

        assert_eq!(
            cli.validate_config(),
            Err(Warning::ConfigValidation("unknown key plugins.foo".into()))
        );
    }

    #[test]
    fn validate_success() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(dir.path(), HEALTHY);

        assert_eq!(cli.validate_config(), Ok(()));
        assert_eq!(calls(dir.path()).trim(), "config validate");
    }
}
