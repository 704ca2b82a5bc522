/// TOML configuration with sensible defaults.
/// No config file is required to run — defaults point at the Teams cache.

use serde::Deserialize;

use crate::vdi_mode::ModeScheme;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the cached VDI session history JSON.
    pub session_file: String,
    /// Top-level key holding the array of session records.
    pub history_key: String,
    /// Which `vdiMode` code scheme to decode with.
    pub mode_scheme: ModeScheme,
    /// Width of the label column in the report.
    pub label_width: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_file: default_session_file(),
            history_key: "vdiSessionHistory".into(),
            mode_scheme: ModeScheme::Auto,
            label_width: 20,
        }
    }
}

fn default_session_file() -> String {
    let base = std::env::var("LOCALAPPDATA").unwrap_or_else(|_| ".".into());
    format!(
        r"{base}\Packages\MSTeams_8wekyb3d8bbwe\LocalCache\Microsoft\MSTeams\vdi_session_history.json"
    )
}

impl Config {
    /// Load config from the default config file path, or return defaults if not found.
    pub fn load() -> Self {
        let config_path = config_file_path();
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    log::debug!("Loaded config from {config_path}");
                    config
                }
                Err(e) => {
                    log::warn!("Failed to parse config file {config_path}: {e}. Using defaults.");
                    Self::default()
                }
            },
            Err(_) => {
                log::debug!("No config file found at {config_path}. Using defaults.");
                Self::default()
            }
        }
    }
}

fn config_file_path() -> String {
    if let Ok(appdata) = std::env::var("APPDATA") {
        format!("{appdata}\\vdireport\\config.toml")
    } else {
        "vdireport.toml".into()
    }
}
