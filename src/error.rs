use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort an install run with a non-zero exit status.
#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("gateway CLI `{program}` is not available: {reason}")]
    ToolNotFound { program: String, reason: String },

    #[error("{} is not a plugin checkout (no {manifest}); pass --plugin-dir", dir.display())]
    NotAPluginDir { dir: PathBuf, manifest: String },

    #[error("plugin install from {target} failed: {stderr}")]
    Install { target: String, stderr: String },

    #[error("plugin `{plugin_id}` is not installed after `plugins install`: {detail}")]
    InstallVerification { plugin_id: String, detail: String },

    #[error("cannot read config {}: {reason}", path.display())]
    ConfigRead { path: PathBuf, reason: String },

    #[error("cannot write config {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("standard input closed while waiting for {0}")]
    InputClosed(String),

    #[error("terminal I/O failed: {0}")]
    Prompt(#[from] io::Error),
}

/// Problems that are reported and then worked around.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("gateway config validation reported problems: {0}")]
    ConfigValidation(String),

    #[error("cannot read plugin manifest {}: {reason}; using built-in defaults", path.display())]
    ManifestRead { path: PathBuf, reason: String },

    #[error("API key does not look like bot_id:secret with a 35-character secret")]
    CredentialShape,

    #[error("session key prefix `{0}` does not look like agent:<agentId>:<rest>")]
    SessionPrefixShape(String),
}
