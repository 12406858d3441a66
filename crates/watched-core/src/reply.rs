//! Parse the body printed by the watched script into a callback reply.
//!
//! The script answers with a call expression naming the callback it was
//! given, e.g. `watchedCallback(1, 1)`. Anything before the last occurrence
//! of the callback name is ignored; a trailing `;` is accepted.

use serde::Serialize;

use crate::status::StatusCode;

/// One delivered callback invocation, tagged with the request it answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CallbackReply {
    /// Sequence number of the request this reply belongs to.
    pub seq: u64,
    /// Action code echoed by the script (0 or 1).
    pub action: i64,
    /// Marker status reported by the script.
    pub status: StatusCode,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ReplyError {
    #[error("reply does not invoke {expected}: {body:?}")]
    MissingCallback { expected: String, body: String },
    #[error("malformed callback arguments: {0:?}")]
    BadArguments(String),
}

/// Extracts `(action, status)` from a script reply body.
pub fn parse_reply(body: &str, callback_name: &str) -> Result<(i64, StatusCode), ReplyError> {
    let missing = || ReplyError::MissingCallback {
        expected: callback_name.to_string(),
        body: body.trim().to_string(),
    };

    let start = body.rfind(callback_name).ok_or_else(missing)?;
    let call = body[start + callback_name.len()..].trim();
    let call = call.strip_suffix(';').unwrap_or(call).trim_end();
    let args = call
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(missing)?;

    let mut parts = args.split(',').map(str::trim);
    let (Some(action), Some(status), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(ReplyError::BadArguments(args.to_string()));
    };
    let action = action
        .parse::<i64>()
        .map_err(|_| ReplyError::BadArguments(args.to_string()))?;
    let status = status
        .parse::<StatusCode>()
        .map_err(|_| ReplyError::BadArguments(args.to_string()))?;
    Ok((action, status))
}
