/// Steps of an install run, in the only order they happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Gateway CLI answers `--version`.
    #[default]
    CheckTool,
    /// Host config file exists, skeleton written if needed.
    EnsureConfigFile,
    /// Credential taken from the command line or prompted for.
    CollectCredential,
    /// `plugins install` followed by a `plugins list` check.
    Install,
    /// Install skipped with `--skip-install`.
    SkipInstall,
    /// Minimal config merged into the host config.
    UpdateConfig,
    /// `config validate`, warnings only.
    ValidateConfig,
    Done,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::CheckTool => "check gateway CLI",
            Stage::EnsureConfigFile => "ensure config file",
            Stage::CollectCredential => "collect API key",
            Stage::Install => "install plugin",
            Stage::SkipInstall => "skip install",
            Stage::UpdateConfig => "update config",
            Stage::ValidateConfig => "validate config",
            Stage::Done => "done",
        }
    }
}
