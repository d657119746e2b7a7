//! Read-modify-write of the gateway's JSON config file.
//!
//! Only `plugins.entries.<plugin-id>` is touched; every other key keeps its value
//! and position. Writes replace the file by rename. There is no locking:
//! concurrent writers race and the last one wins.

use serde_json::{Map, Value, json};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::error::InstallerError;
use crate::plugin::manifest::PluginId;

/// Creates the file with an empty plugin section when missing. Returns whether it was created.
pub fn ensure_exists(path: &Path) -> Result<bool, InstallerError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| write_error(path, source))?;
    }

    if path.exists() {
        return Ok(false);
    }

    let skeleton = json!({
        "plugins": {
            "enabled": true,
            "entries": {}
        }
    });
    write_document(path, &skeleton)?;
    tracing::info!("created config skeleton at {}", path.display());
    Ok(true)
}

/// Enables `plugin_id` and replaces its `config` with `config`.
pub fn update(
    path: &Path,
    plugin_id: &PluginId,
    config: Map<String, Value>,
) -> Result<(), InstallerError> {
    let raw = fs::read_to_string(path).map_err(|err| read_error(path, err.to_string()))?;
    let mut document: Value =
        serde_json::from_str(&raw).map_err(|err| read_error(path, format!("invalid JSON: {err}")))?;

    let entry = plugin_entry(&mut document, plugin_id).map_err(|reason| read_error(path, reason))?;
    entry.insert("enabled".to_string(), Value::Bool(true));
    entry.insert("config".to_string(), Value::Object(config));

    write_document(path, &document)?;
    tracing::info!("updated plugins.entries.{plugin_id} in {}", path.display());
    Ok(())
}

/// `plugins.entries.<plugin_id>`, creating any missing level.
fn plugin_entry<'a>(
    document: &'a mut Value,
    plugin_id: &PluginId,
) -> Result<&'a mut Map<String, Value>, String> {
    let root = document
        .as_object_mut()
        .ok_or_else(|| "top level is not a JSON object".to_string())?;
    let plugins = child_object(root, "plugins", "plugins")?;
    let entries = child_object(plugins, "entries", "plugins.entries")?;
    let label = format!("plugins.entries.{plugin_id}");
    child_object(entries, plugin_id.as_str(), &label)
}

fn child_object<'a>(
    parent: &'a mut Map<String, Value>,
    key: &str,
    label: &str,
) -> Result<&'a mut Map<String, Value>, String> {
    parent
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| format!("`{label}` is not a JSON object"))
}

/// Writes a sibling `.json.tmp` file and renames it over `path`, so `path` is
/// either the old document or the new one.
fn write_document(path: &Path, document: &Value) -> Result<(), InstallerError> {
    let mut text = serde_json::to_string_pretty(document)
        .map_err(|err| write_error(path, io::Error::from(err)))?;
    text.push('\n');

    let tmp = path.with_extension("json.tmp");
    let result = (|| -> io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|source| {
        let _ = fs::remove_file(&tmp);
        write_error(path, source)
    })
}

fn read_error(path: &Path, reason: String) -> InstallerError {
    InstallerError::ConfigRead {
        path: path.to_path_buf(),
        reason,
    }
}

fn write_error(path: &Path, source: io::Error) -> InstallerError {
    InstallerError::ConfigWrite {
        path: path.to_path_buf(),
        source,
    }
}
