//! `watched url` – print the request a given action would send.

use anyhow::Result;
use watched_core::config::WatchedConfig;
use watched_core::request::{build_request_url, Action};
use watched_core::target::resolve_identifier;

use crate::cli::TargetArgs;

pub fn run_url(cfg: &WatchedConfig, target: &TargetArgs, action: Action, json: bool) -> Result<()> {
    let focus = target.focus();
    let identifier = resolve_identifier(&focus, target.base_filename());
    let url = build_request_url(cfg, identifier, action);
    if json {
        let line = serde_json::json!({
            "action": action,
            "code": action.code(),
            "identifier": identifier,
            "url": url,
        });
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!("{}", url);
    }
    Ok(())
}
