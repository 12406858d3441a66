//! `watched check|toggle|mark|session` – send actions and wait for each reply.

use anyhow::Result;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use watched_core::config::WatchedConfig;
use watched_core::http_loader::HttpLoader;
use watched_core::reply::CallbackReply;
use watched_core::request::Action;
use watched_core::status::WatchedStatus;
use watched_core::surface::{Loader, TextLabel};
use watched_core::toggler::{Dispatch, WatchedToggler};

use crate::cli::TargetArgs;

pub async fn run_actions(
    cfg: WatchedConfig,
    target: &TargetArgs,
    actions: &[Action],
    json: bool,
) -> Result<()> {
    let wait = Duration::from_secs(cfg.reply_wait_secs);
    let focus = target.focus();
    let (loader, mut replies) = HttpLoader::new(&cfg);
    let mut toggler = WatchedToggler::new(cfg, target.base_filename(), loader, TextLabel::default());

    for &action in actions {
        let identifier = toggler.identifier(&focus).to_string();
        match toggler.request_toggle(action, &focus) {
            Dispatch::Suppressed => {
                tracing::info!(%action, identifier = %identifier, "already watched; nothing sent");
                print_suppressed(action, &identifier, json)?;
            }
            Dispatch::Dispatched { seq, .. } => {
                let Some(reply) = wait_for_reply(&mut toggler, &mut replies, seq, wait).await
                else {
                    anyhow::bail!(
                        "no reply to {} for {:?} within {}s",
                        action,
                        identifier,
                        wait.as_secs()
                    );
                };
                print_reply(action, &identifier, &reply, &toggler, json)?;
            }
        }
    }
    Ok(())
}

/// Feeds replies into the toggler until the one for `seq` is applied or `wait` elapses.
async fn wait_for_reply<L: Loader>(
    toggler: &mut WatchedToggler<L, TextLabel>,
    replies: &mut UnboundedReceiver<CallbackReply>,
    seq: u64,
    wait: Duration,
) -> Option<CallbackReply> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let reply = tokio::time::timeout_at(deadline, replies.recv())
            .await
            .ok()
            .flatten()?;
        if toggler.on_reply(reply) && reply.seq == seq {
            return Some(reply);
        }
    }
}

fn suppressed_line(action: Action, identifier: &str) -> serde_json::Value {
    serde_json::json!({
        "action": action,
        "code": action.code(),
        "identifier": identifier,
        "outcome": "suppressed",
    })
}

fn reply_line(
    action: Action,
    identifier: &str,
    reply: &CallbackReply,
    label: &str,
) -> serde_json::Value {
    serde_json::json!({
        "action": action,
        "code": action.code(),
        "identifier": identifier,
        "reply": reply,
        "status": WatchedStatus::from_code(reply.status),
        "label": label,
    })
}

fn print_suppressed(action: Action, identifier: &str, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(&suppressed_line(action, identifier))?);
    } else {
        println!("{:<7} {:<5} {}", action, "Yes", identifier);
    }
    Ok(())
}

fn print_reply<L: Loader>(
    action: Action,
    identifier: &str,
    reply: &CallbackReply,
    toggler: &WatchedToggler<L, TextLabel>,
    json: bool,
) -> Result<()> {
    let label = toggler.label().text().unwrap_or("");
    if json {
        let line = reply_line(action, identifier, reply, label);
        println!("{}", serde_json::to_string(&line)?);
    } else {
        println!("{:<7} {:<5} {}", action, label, identifier);
    }
    Ok(())
}
