use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::Warning;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(transparent)]
pub struct PluginId(pub String);

impl PluginId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The parts of `openclaw.plugin.json` the installer looks at.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginManifest {
    #[serde(default)]
    pub id: Option<PluginId>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub config_schema: Option<ConfigSchema>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSchema {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Defaults for the plugin config plus how they were obtained.
#[derive(Debug, Clone)]
pub struct ManifestDefaults {
    pub values: Map<String, Value>,
    /// Set when the manifest could not be used and `values` is the fallback.
    pub warning: Option<Warning>,
}

impl PluginManifest {
    pub fn read(path: &Path) -> Result<Self, String> {
        let raw = fs::read_to_string(path).map_err(|err| err.to_string())?;
        serde_json::from_str::<PluginManifest>(&raw).map_err(|err| err.to_string())
    }

    /// `configSchema.properties.<key>.default` for every property that declares one.
    pub fn declared_defaults(&self) -> Map<String, Value> {
        let Some(schema) = &self.config_schema else {
            return Map::new();
        };

        schema
            .properties
            .iter()
            .filter_map(|(key, property)| {
                property
                    .get("default")
                    .map(|default| (key.clone(), default.clone()))
            })
            .collect()
    }
}

/// Reads the manifest defaults, falling back to `fallback` on any failure. Never fails.
pub fn load_defaults(path: &Path, fallback: &Map<String, Value>) -> ManifestDefaults {
    let result = if path.is_file() {
        PluginManifest::read(path)
    } else {
        Err("file not found".to_string())
    };

    match result {
        Ok(manifest) => {
            tracing::info!(
                "read defaults from {} (plugin {}, version {})",
                path.display(),
                manifest.id.as_ref().map_or("?", PluginId::as_str),
                manifest.version.as_deref().unwrap_or("?"),
            );
            ManifestDefaults {
                values: manifest.declared_defaults(),
                warning: None,
            }
        }
        Err(reason) => {
            let warning = Warning::ManifestRead {
                path: path.to_path_buf(),
                reason,
            };
            tracing::warn!("{warning}");
            ManifestDefaults {
                values: fallback.clone(),
                warning: Some(warning),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fallback() -> Map<String, Value> {
        match json!({
            "apiKey": "YOUR_API_KEY_HERE",
            "pollIntervalMs": 2000,
            "sessionKeyPrefix": "agent:main:wechat:miniprogram:",
            "debug": false
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn missing_manifest_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openclaw.plugin.json");

        let defaults = load_defaults(&path, &fallback());

        assert_eq!(defaults.values, fallback());
        assert!(matches!(
            defaults.warning,
            Some(Warning::ManifestRead { ref reason, .. }) if reason == "file not found"
        ));
    }

    #[test]
    fn malformed_manifest_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openclaw.plugin.json");
        fs::write(&path, "{ \"configSchema\": ").unwrap();

        let defaults = load_defaults(&path, &fallback());

        assert_eq!(defaults.values, fallback());
        assert!(defaults.warning.is_some());
    }

    #[test]
    fn declared_defaults_are_collected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openclaw.plugin.json");
        fs::write(
            &path,
            r#"{
              "id": "openclawwechat",
              "version": "1.0.11",
              "configSchema": {
                "type": "object",
                "properties": {
                  "apiKey": { "type": "string" },
                  "pollIntervalMs": { "type": "number", "default": 2000 },
                  "sessionKeyPrefix": { "type": "string", "default": "agent:main:wechat:miniprogram:" },
                  "debug": { "type": "boolean", "default": false }
                }
              }
            }"#,
        )
        .unwrap();

        let defaults = load_defaults(&path, &fallback());

        assert!(defaults.warning.is_none());
        assert_eq!(
            Value::Object(defaults.values),
            json!({
                "pollIntervalMs": 2000,
                "sessionKeyPrefix": "agent:main:wechat:miniprogram:",
                "debug": false
            })
        );
    }

    #[test]
    fn manifest_without_schema_has_no_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("openclaw.plugin.json");
        fs::write(&path, r#"{ "id": "openclawwechat" }"#).unwrap();

        let defaults = load_defaults(&path, &fallback());

        assert!(defaults.warning.is_none());
        assert!(defaults.values.is_empty());
    }

    #[test]
    fn directory_in_place_of_manifest_uses_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let defaults = load_defaults(dir.path(), &fallback());

        assert_eq!(defaults.values, fallback());
        assert!(defaults.warning.is_some());
    }
}
