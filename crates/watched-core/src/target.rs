//! Marker identifier derivation.
//!
//! The identifier is the media file name without directory or extension,
//! taken from the link the user is interacting with, or the page's base
//! filename when no link has focus.

/// The media link the user last interacted with, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Focus {
    /// No link has focus; the page's base filename is used.
    #[default]
    Unset,
    /// Href of the focused link.
    Link(String),
}

impl Focus {
    pub fn link(href: impl Into<String>) -> Self {
        Focus::Link(href.into())
    }
}

impl From<Option<String>> for Focus {
    fn from(href: Option<String>) -> Self {
        match href {
            Some(h) if !h.is_empty() => Focus::Link(h),
            _ => Focus::Unset,
        }
    }
}

/// Extracts the text between the last `/` and the last `.` of `href`.
///
/// When no `.` follows the last `/`, the whole remainder after the slash is
/// returned. An href without any `/` is treated as a bare file name.
///
/// # Examples
///
/// - `"http://nmt/Video/Blood Diamond.mkv"` → `"Blood Diamond"`
/// - `"http://nmt/Video/README"` → `"README"`
pub fn identifier_from_href(href: &str) -> &str {
    let start = href.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &href[start..];
    match name.rfind('.') {
        Some(dot) => &name[..dot],
        None => name,
    }
}

/// Resolves the identifier for the current request.
pub fn resolve_identifier<'a>(focus: &'a Focus, base_filename: &'a str) -> &'a str {
    match focus {
        Focus::Unset => base_filename,
        Focus::Link(href) => identifier_from_href(href),
    }
}
