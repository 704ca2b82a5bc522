/// Session snapshot: the most recent record of the cached VDI session history.
///
/// The client appends one record per session to an array under a top-level
/// key; only the last one is reported. Field names match what the client
/// writes. Every field is optional and absent values come back empty, so the
/// report never fails on a partial record.

use crate::error::SessionError;

use serde::{Deserialize, Deserializer};
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Milliseconds since the Unix epoch.
    #[serde(deserialize_with = "lenient_millis")]
    pub timestamp: Option<i64>,
    #[serde(deserialize_with = "lenient_string")]
    pub connected_stack: String,
    #[serde(deserialize_with = "lenient_string")]
    pub vdi_mode: String,
    #[serde(deserialize_with = "null_as_default")]
    pub version: Versions,
    #[serde(deserialize_with = "null_as_default")]
    pub device: DeviceMap,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Versions {
    #[serde(deserialize_with = "lenient_string")]
    pub plugin: String,
    #[serde(deserialize_with = "lenient_string")]
    pub bridge: String,
    #[serde(deserialize_with = "lenient_string")]
    pub client: String,
    #[serde(deserialize_with = "lenient_string")]
    pub slimcore: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceMap {
    #[serde(deserialize_with = "null_as_default")]
    pub speaker: DeviceGroup,
    #[serde(deserialize_with = "null_as_default")]
    pub camera: DeviceGroup,
    #[serde(deserialize_with = "null_as_default")]
    pub microphone: DeviceGroup,
    #[serde(deserialize_with = "lenient_string")]
    pub secondary_ringer: String,
}

/// Devices of one kind: what is attached, and which one is in use.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeviceGroup {
    #[serde(deserialize_with = "null_as_default")]
    pub available: Vec<DeviceEntry>,
    #[serde(deserialize_with = "lenient_string")]
    pub selected: String,
}

/// One attached device. Written as `{"label": …}`, or as a bare label.
#[derive(Debug, Default, Deserialize)]
#[serde(from = "serde_json::Value")]
pub struct DeviceEntry {
    pub label: String,
}

impl From<serde_json::Value> for DeviceEntry {
    fn from(value: serde_json::Value) -> Self {
        let label = match value {
            serde_json::Value::Object(mut fields) => {
                fields.remove("label").map(value_text).unwrap_or_default()
            }
            other => value_text(other),
        };
        Self { label }
    }
}

impl DeviceGroup {
    /// Available labels in source order, joined with ", ".
    pub fn joined_labels(&self) -> String {
        self.available
            .iter()
            .map(|d| d.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Accept strings, numbers and booleans as text; anything else is empty.
/// Older clients write `vdiMode` as a bare number.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(value_text(serde_json::Value::deserialize(deserializer)?))
}

fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Accept integer, integral float or numeric string milliseconds.
/// Anything else is treated as absent.
fn lenient_millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let from_float = |f: f64| {
        (f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64)
            .then_some(f as i64)
    };
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(from_float)),
        serde_json::Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(from_float))
        }
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Loading ──────────────────────────────────────────────────────────

/// Read the session history at `path` and return its last record.
pub fn load_latest(path: &Path, history_key: &str) -> Result<SessionSnapshot, SessionError> {
    if !path.exists() {
        return Err(SessionError::MissingInputFile(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Read {} bytes from {}", contents.len(), path.display());

    parse_latest(&contents, history_key)
}

/// Parse history JSON and return its last record.
pub fn parse_latest(json: &str, history_key: &str) -> Result<SessionSnapshot, SessionError> {
    // Some writers prefix the file with a UTF-8 BOM.
    let json = json.trim_start_matches('\u{feff}');
    let mut value: serde_json::Value = serde_json::from_str(json)?;

    let latest = value
        .get_mut(history_key)
        .and_then(|v| v.as_array_mut())
        .and_then(|records| records.pop())
        .ok_or_else(|| SessionError::NoSessions(history_key.to_string()))?;

    Ok(serde_json::from_value(latest)?)
}
