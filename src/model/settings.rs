use serde_json::{Map, Number, Value};

pub const CREDENTIAL_KEY: &str = "apiKey";
pub const CREDENTIAL_PLACEHOLDER: &str = "YOUR_API_KEY_HERE";

/// The plugin settings collected for this run, before minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSettings {
    pub api_key: String,
    pub poll_interval_ms: u64,
    pub session_key_prefix: String,
    pub debug: bool,
}

impl PluginSettings {
    /// Settings keyed the way the plugin's config schema names them.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(CREDENTIAL_KEY.into(), Value::from(self.api_key.as_str()));
        map.insert("pollIntervalMs".into(), Value::from(self.poll_interval_ms));
        map.insert(
            "sessionKeyPrefix".into(),
            Value::from(self.session_key_prefix.as_str()),
        );
        map.insert("debug".into(), Value::from(self.debug));
        map
    }
}

/// Drops every entry whose value equals its declared default.
///
/// The credential is compared against the declared credential default, or the
/// literal placeholder when none is declared, so a placeholder is never persisted.
/// Keys without a declared default are always kept. Output keeps `effective` order.
pub fn minimize(effective: &Map<String, Value>, defaults: &Map<String, Value>) -> Map<String, Value> {
    let placeholder = Value::from(CREDENTIAL_PLACEHOLDER);

    effective
        .iter()
        .filter(|(key, value)| {
            let default = declared_default(defaults, key);
            if key.as_str() == CREDENTIAL_KEY {
                return !values_equal(value, default.unwrap_or(&placeholder));
            }
            default.is_none_or(|default| !values_equal(value, default))
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// A `null` default counts as no default.
fn declared_default<'a>(defaults: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    defaults.get(key).filter(|value| !value.is_null())
}

/// JSON equality, except numbers compare by value (`2000 == 2000.0`).
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        _ => a == b,
    }
}

/// Integers compare exactly; a float equals an integer only if it converts back to it.
fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (integer(x), integer(y)) {
        (Some(m), Some(n)) => m == n,
        (Some(n), None) => y.as_f64().is_some_and(|f| float_is_integer(f, n)),
        (None, Some(n)) => x.as_f64().is_some_and(|f| float_is_integer(f, n)),
        (None, None) => matches!((x.as_f64(), y.as_f64()), (Some(p), Some(q)) if p == q),
    }
}

fn integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float_is_integer(f: f64, n: i128) -> bool {
    f.is_finite() && f.fract() == 0.0 && f as i128 == n && n as f64 == f
}
