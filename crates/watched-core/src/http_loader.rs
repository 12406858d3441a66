//! Loader backed by an HTTP GET to the watched script.
//!
//! Uses the curl crate (libcurl). Each source assignment runs its request on
//! a dedicated thread; the reply body is parsed and delivered on a tokio
//! channel tagged with the request's sequence number. Transport failures and
//! malformed bodies are logged and produce no reply.

use anyhow::{Context, Result};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::config::WatchedConfig;
use crate::reply::{parse_reply, CallbackReply};
use crate::surface::{Loader, SurfaceError};

/// Replies larger than this are not a callback invocation.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Transport settings for each request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl HttpOptions {
    pub fn from_config(cfg: &WatchedConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
            timeout: Duration::from_secs(cfg.request_timeout_secs),
        }
    }
}

pub struct HttpLoader {
    replies: UnboundedSender<CallbackReply>,
    callback_name: String,
    opts: HttpOptions,
    source: Option<String>,
}

impl HttpLoader {
    /// Creates the loader and the receiving end of its reply channel.
    pub fn new(cfg: &WatchedConfig) -> (Self, UnboundedReceiver<CallbackReply>) {
        let (tx, rx) = unbounded_channel();
        let loader = Self {
            replies: tx,
            callback_name: cfg.callback_name.clone(),
            opts: HttpOptions::from_config(cfg),
            source: None,
        };
        (loader, rx)
    }

    /// Current source, as last assigned.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl Loader for HttpLoader {
    fn set_source(&mut self, seq: u64, source: &str) -> Result<(), SurfaceError> {
        let url = normalize_source(source).map_err(|e| SurfaceError::Rejected {
            surface: "loader",
            value: source.to_string(),
            reason: e.to_string(),
        })?;
        self.source = Some(source.to_string());

        let tx = self.replies.clone();
        let callback_name = self.callback_name.clone();
        let opts = self.opts;
        thread::Builder::new()
            .name(format!("watched-request-{seq}"))
            .spawn(move || {
                let body = match fetch_body(&url, opts) {
                    Ok(body) => body,
                    Err(e) => {
                        tracing::warn!(seq, url = %url, "watched request failed: {:#}", e);
                        return;
                    }
                };
                match parse_reply(&body, &callback_name) {
                    Ok((action, status)) => {
                        tracing::debug!(seq, action, status, "watched reply received");
                        // Receiver gone means the host stopped listening.
                        let _ = tx.send(CallbackReply {
                            seq,
                            action,
                            status,
                        });
                    }
                    Err(e) => tracing::warn!(seq, url = %url, "ignoring reply: {}", e),
                }
            })
            .map_err(|e| SurfaceError::Rejected {
                surface: "loader",
                value: source.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    fn reset(&mut self, neutral: &str) -> Result<(), SurfaceError> {
        self.source = Some(neutral.to_string());
        Ok(())
    }
}

/// Re-encodes a decoded source for the wire (spaces become `%20`, as a
/// browser does when assigning a URL).
pub fn normalize_source(source: &str) -> Result<url::Url> {
    url::Url::parse(source).with_context(|| format!("invalid request URL {:?}", source))
}

/// Performs a GET and returns the response body as text.
///
/// Follows redirects. Runs in the current thread.
pub fn fetch_body(url: &url::Url, opts: HttpOptions) -> Result<String> {
    let mut body: Vec<u8> = Vec::new();

    let mut easy = curl::easy::Easy::new();
    easy.url(url.as_str()).context("invalid URL")?;
    easy.get(true)?;
    easy.follow_location(true)?;
    easy.max_redirections(5)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.timeout(opts.timeout)?;

    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            if body.len() + data.len() > MAX_BODY_BYTES {
                return Ok(0); // abort transfer
            }
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform().context("GET request failed")?;
    }

    let code = easy.response_code().context("no response code")?;
    if !(200..300).contains(&code) {
        anyhow::bail!("GET {} returned HTTP {}", url, code);
    }

    Ok(String::from_utf8_lossy(&body).into_owned())
}
