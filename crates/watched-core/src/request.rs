//! Action codes and request URL composition.
//!
//! The CGI takes positional `&`-delimited arguments, not key/value pairs:
//! `<script>?<marker path>&<0|1>&<callback name>`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::config::WatchedConfig;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Only report whether the marker exists.
    Check,
    /// Create the marker if absent, delete it if present.
    Toggle,
    /// Create the marker unless it is already known to exist.
    #[serde(rename = "mark")]
    CreateOnly,
}

impl Action {
    /// Numeric code as used by page scripts (0, 1, 2).
    pub fn code(self) -> u8 {
        match self {
            Action::Check => 0,
            Action::Toggle => 1,
            Action::CreateOnly => 2,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Action::Check),
            1 => Some(Action::Toggle),
            2 => Some(Action::CreateOnly),
            _ => None,
        }
    }

    /// Code sent to the script. The script only knows check (0) and toggle (1);
    /// create-only is resolved on this side.
    pub fn wire_code(self) -> u8 {
        match self {
            Action::Check => 0,
            Action::Toggle | Action::CreateOnly => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Check => "check",
            Action::Toggle => "toggle",
            Action::CreateOnly => "mark",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown action {0:?} (expected check, toggle, mark or 0, 1, 2)")]
pub struct ParseActionError(String);

impl FromStr for Action {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let word = s.trim().to_ascii_lowercase();
        if let Ok(code) = word.parse::<u8>() {
            return Action::from_code(code).ok_or_else(|| ParseActionError(s.to_string()));
        }
        match word.as_str() {
            "check" => Ok(Action::Check),
            "toggle" => Ok(Action::Toggle),
            "mark" | "create" | "create-only" => Ok(Action::CreateOnly),
            _ => Err(ParseActionError(s.to_string())),
        }
    }
}

/// Composes the raw request URL, before unescaping.
pub fn compose_request(cfg: &WatchedConfig, identifier: &str, action: Action) -> String {
    format!(
        "{}?{}{}{}&{}&{}",
        cfg.script_base_url(),
        cfg.file_base_dir(),
        identifier,
        cfg.extension,
        action.wire_code(),
        cfg.callback_name
    )
}

/// Decodes escapes in the composed string the way page scripts' `unescape`
/// does, so configuration can carry characters such as `:` in share names.
///
/// - `%XX` becomes the single character U+00XX (Latin-1, not UTF-8 bytes)
/// - `%uXXXX` becomes U+XXXX
/// - anything else after `%`, including a lone surrogate, is kept literally
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escape = &rest[pos + 1..];
        if let Some((c, used)) = decode_escape(escape) {
            out.push(c);
            rest = &escape[used..];
        } else {
            out.push('%');
            rest = escape;
        }
    }
    out.push_str(rest);
    out
}

/// Decodes the escape following a `%`; returns the character and the bytes consumed.
fn decode_escape(escape: &str) -> Option<(char, usize)> {
    if let Some(hex) = escape.strip_prefix('u').and_then(|e| e.get(..4)) {
        if hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            if let Some(c) = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32) {
                return Some((c, 5));
            }
        }
    }
    let hex = escape.get(..2)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = u8::from_str_radix(hex, 16).ok()?;
    Some((char::from(byte), 2))
}

/// The source assigned to the loader: composed, then unescaped as a whole.
pub fn build_request_url(cfg: &WatchedConfig, identifier: &str, action: Action) -> String {
    unescape(&compose_request(cfg, identifier, action))
}
