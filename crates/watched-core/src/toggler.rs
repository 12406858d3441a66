//! The watched toggler: owns the session status and drives both surfaces.
//!
//! `request_toggle` composes a request and hands it to the loader; the
//! result comes back later through `on_reply` (sequence-checked) or
//! `on_toggle_result` (applied as-is). Surface failures are logged and
//! dropped; neither operation returns an error.

use crate::config::WatchedConfig;
use crate::reply::CallbackReply;
use crate::request::{build_request_url, Action};
use crate::status::{status_label, StatusCode, WatchedStatus, INITIAL_STATUS};
use crate::surface::{Loader, StatusLabel};
use crate::target::{resolve_identifier, Focus};

/// What `request_toggle` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Create-only request for a marker already known to exist; nothing sent.
    Suppressed,
    /// Source handed to the loader; a reply tagged `seq` may follow.
    Dispatched { seq: u64, source: String },
}

pub struct WatchedToggler<L, S> {
    config: WatchedConfig,
    base_filename: String,
    last_known_status: StatusCode,
    last_seq: u64,
    loader: L,
    label: S,
}

impl<L: Loader, S: StatusLabel> WatchedToggler<L, S> {
    /// `base_filename` is used whenever no link has focus.
    pub fn new(
        config: WatchedConfig,
        base_filename: impl Into<String>,
        loader: L,
        label: S,
    ) -> Self {
        Self {
            config,
            base_filename: base_filename.into(),
            last_known_status: INITIAL_STATUS,
            last_seq: 0,
            loader,
            label,
        }
    }

    pub fn last_known_status(&self) -> StatusCode {
        self.last_known_status
    }

    /// Sequence number of the most recent dispatched request (0 before any).
    pub fn last_seq(&self) -> u64 {
        self.last_seq
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn label(&self) -> &S {
        &self.label
    }

    /// Identifier the next request for `focus` would target.
    pub fn identifier<'a>(&'a self, focus: &'a Focus) -> &'a str {
        resolve_identifier(focus, &self.base_filename)
    }

    /// Composes the request for `action` and hands it to the loader, unless a
    /// create-only request targets a marker already reported as existing.
    pub fn request_toggle(&mut self, action: Action, focus: &Focus) -> Dispatch {
        if action == Action::CreateOnly
            && WatchedStatus::from_code(self.last_known_status).is_watched()
        {
            tracing::debug!("create-only request suppressed: marker already exists");
            return Dispatch::Suppressed;
        }

        let identifier = resolve_identifier(focus, &self.base_filename);
        let source = build_request_url(&self.config, identifier, action);

        self.last_seq += 1;
        let seq = self.last_seq;
        tracing::debug!(seq, %action, identifier, source = %source, "dispatching watched request");
        if let Err(e) = self.loader.set_source(seq, &source) {
            tracing::debug!(seq, "loader rejected request: {}", e);
        }
        Dispatch::Dispatched { seq, source }
    }

    /// Applies a reply only if it answers the most recent request.
    /// Returns whether it was applied.
    pub fn on_reply(&mut self, reply: CallbackReply) -> bool {
        if reply.seq != self.last_seq {
            tracing::debug!(
                seq = reply.seq,
                latest = self.last_seq,
                "ignoring stale watched reply"
            );
            return false;
        }
        self.on_toggle_result(reply.action, reply.status);
        true
    }

    /// Records `status`, updates the label, and resets the loader.
    pub fn on_toggle_result(&mut self, action: i64, status: StatusCode) {
        self.last_known_status = status;
        let text = status_label(action, status);
        tracing::info!(action, status, label = %text, "watched status updated");

        if let Err(e) = self.label.set_text(&text) {
            tracing::debug!("status label not updated: {}", e);
        }
        if let Err(e) = self.loader.reset(&self.config.neutral_source) {
            tracing::debug!("loader not reset: {}", e);
        }
    }
}
