//! `watched config` – show where the config lives and what is in effect.

use anyhow::Result;
use std::path::Path;
use watched_core::config::{self, WatchedConfig};
use watched_core::logging;

pub fn run_config(explicit_path: Option<&Path>, cfg: &WatchedConfig) -> Result<()> {
    let path = match explicit_path {
        Some(p) => p.to_path_buf(),
        None => config::config_path()?,
    };
    println!("# {}", path.display());
    println!("# endpoint:   {}", cfg.script_base_url());
    println!("# marker dir: {}", cfg.file_base_dir());
    if let Ok(log) = logging::log_file_path() {
        println!("# log:        {}", log.display());
    }
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
