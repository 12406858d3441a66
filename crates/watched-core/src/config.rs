use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an overrides file, used when `--overrides` is absent.
pub const OVERRIDES_ENV: &str = "WATCHED_OVERRIDES";

/// Global configuration loaded from `~/.config/watched/config.toml`.
///
/// The request endpoint is `script_host + script_location + script_name`; the
/// marker directory passed to it is `file_root + location`. Only the endpoint
/// is ever fetched; the marker directory is a path on the server's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchedConfig {
    /// Suffix appended to the identifier to name the marker file.
    pub extension: String,
    /// Scheme, host and port of the web server running the CGI, with trailing `/`.
    pub script_host: String,
    /// Path fragment between the host and the script name.
    pub script_location: String,
    /// File name of the CGI script.
    pub script_name: String,
    /// Server-side root under which marker directories live.
    pub file_root: String,
    /// Path fragment appended to `file_root`.
    pub location: String,
    /// Name of the callback the CGI is asked to print.
    pub callback_name: String,
    /// Source the loader is reset to once a reply has been handled.
    pub neutral_source: String,
    /// libcurl connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// libcurl total request timeout in seconds.
    pub request_timeout_secs: u64,
    /// How long the CLI waits for a reply before giving up on it.
    pub reply_wait_secs: u64,
}

impl Default for WatchedConfig {
    fn default() -> Self {
        Self {
            extension: ".watched".to_string(),
            script_host: "http://localhost.drives:8883/".to_string(),
            script_location: String::new(),
            script_name: "watched.cgi".to_string(),
            file_root: "/opt/sybhttpd/localhost.drives/".to_string(),
            location: String::new(),
            callback_name: "watchedCallback".to_string(),
            neutral_source: "empty.js".to_string(),
            connect_timeout_secs: 15,
            request_timeout_secs: 30,
            reply_wait_secs: 35,
        }
    }
}

impl WatchedConfig {
    /// Network-reachable endpoint of the CGI script.
    pub fn script_base_url(&self) -> String {
        format!(
            "{}{}{}",
            self.script_host, self.script_location, self.script_name
        )
    }

    /// Directory prefix passed to the script as part of the marker path.
    pub fn file_base_dir(&self) -> String {
        format!("{}{}", self.file_root, self.location)
    }

    /// Replaces every value the overrides layer sets; leaves the rest alone.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        let pairs = [
            (&mut self.extension, &overrides.extension),
            (&mut self.script_host, &overrides.script_host),
            (&mut self.script_location, &overrides.script_location),
            (&mut self.script_name, &overrides.script_name),
            (&mut self.file_root, &overrides.file_root),
            (&mut self.location, &overrides.location),
        ];
        for (slot, value) in pairs {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
    }
}

/// Site-specific override layer, loaded after the base config.
///
/// Typically only `script_location` and `location` are set, pointing at the
/// share that holds the markers (e.g. `NETWORK_SHARE/PC1%3AUSBDRIVES/Disk_2/watched/`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_root: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("watched")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<WatchedConfig> {
    load_or_init_at(&config_path()?)
}

/// Like `load_or_init` but for an explicit path.
pub fn load_or_init_at(path: &Path) -> Result<WatchedConfig> {
    if !path.exists() {
        let default_cfg = WatchedConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: WatchedConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Read an overrides file. A missing file is an error; callers decide whether to look.
pub fn load_overrides(path: &Path) -> Result<ConfigOverrides> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read overrides {}", path.display()))?;
    let overrides: ConfigOverrides =
        toml::from_str(&data).with_context(|| format!("parse overrides {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config overrides");
    Ok(overrides)
}
