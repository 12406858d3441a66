//! Surfaces the toggler drives: the request loader and the status label.
//!
//! The host owns concrete implementations. Failures are reported as
//! `SurfaceError` so the toggler can log and drop them.

/// Failure to mutate a surface.
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    /// The surface is not available (e.g. the element was never created).
    #[error("{0} is not available")]
    Missing(&'static str),
    /// The surface refused the new value.
    #[error("{surface} rejected {value:?}: {reason}")]
    Rejected {
        surface: &'static str,
        value: String,
        reason: String,
    },
}

/// Something whose source assignment triggers a request.
pub trait Loader {
    /// Assign `source`; the reply (if any) is delivered later, tagged with `seq`.
    fn set_source(&mut self, seq: u64, source: &str) -> Result<(), SurfaceError>;

    /// Point the loader back at a neutral resource that triggers nothing.
    fn reset(&mut self, neutral: &str) -> Result<(), SurfaceError>;
}

/// Text display for the current status label.
pub trait StatusLabel {
    fn set_text(&mut self, text: &str) -> Result<(), SurfaceError>;
}

/// Loader that only records what it was given. Useful for hosts that deliver
/// replies themselves, and for tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingLoader {
    /// Every dispatched `(seq, source)`, oldest first.
    pub dispatched: Vec<(u64, String)>,
    /// Current source, including neutral resets.
    pub current: Option<String>,
}

impl Loader for RecordingLoader {
    fn set_source(&mut self, seq: u64, source: &str) -> Result<(), SurfaceError> {
        self.dispatched.push((seq, source.to_string()));
        self.current = Some(source.to_string());
        Ok(())
    }

    fn reset(&mut self, neutral: &str) -> Result<(), SurfaceError> {
        self.current = Some(neutral.to_string());
        Ok(())
    }
}

/// Label that keeps its text in memory.
#[derive(Debug, Default, Clone)]
pub struct TextLabel {
    text: Option<String>,
}

impl TextLabel {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

impl StatusLabel for TextLabel {
    fn set_text(&mut self, text: &str) -> Result<(), SurfaceError> {
        self.text = Some(text.to_string());
        Ok(())
    }
}

/// Label for hosts without a display.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLabel;

impl StatusLabel for NoLabel {
    fn set_text(&mut self, _text: &str) -> Result<(), SurfaceError> {
        Err(SurfaceError::Missing("status label"))
    }
}
