//! Throwables raised by invoked code
//!
//! Host methods fail by returning a [`Throwable`]. The gateway renders it as
//! a stack-trace style text for ERROR envelopes and the Exception command.

use std::fmt;

/// Class name used for panics caught inside method bodies
pub const RUNTIME_EXCEPTION: &str = "gate.lang.RuntimeException";

/// Class name used for bad arguments
pub const ILLEGAL_ARGUMENT: &str = "gate.lang.IllegalArgumentException";

/// Class name used for out-of-range indices
pub const INDEX_OUT_OF_BOUNDS: &str = "gate.lang.IndexOutOfBoundsException";

/// Class name used when an iterator is exhausted
pub const NO_SUCH_ELEMENT: &str = "gate.util.NoSuchElementException";

/// An error raised by invoked code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Throwable {
    class_name: String,
    message: Option<String>,
    frames: Vec<String>,
    cause: Option<Box<Throwable>>,
}

impl Throwable {
    /// Create a throwable of the given class
    pub fn new(class_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: Some(message.into()),
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Create a throwable without a message
    pub fn bare(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
            frames: Vec::new(),
            cause: None,
        }
    }

    /// Shorthand for an `IllegalArgumentException`
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ILLEGAL_ARGUMENT, message)
    }

    /// Shorthand for an `IndexOutOfBoundsException`
    pub fn index_out_of_bounds(index: i64, len: usize) -> Self {
        Self::new(
            INDEX_OUT_OF_BOUNDS,
            format!("index {} out of bounds for length {}", index, len),
        )
    }

    /// Attach a cause
    pub fn caused_by(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Push a frame (innermost first)
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.frames.push(frame.into());
        self
    }

    /// Class name
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Message, if any
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Recorded frames
    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Cause, if any
    pub fn cause(&self) -> Option<&Throwable> {
        self.cause.as_deref()
    }

    /// Render the full trace including the cause chain
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut current = Some(self);
        let mut first = true;
        while let Some(t) = current {
            if !first {
                out.push_str("Caused by: ");
            }
            out.push_str(&t.to_string());
            out.push('\n');
            for frame in &t.frames {
                out.push_str("\tat ");
                out.push_str(frame);
                out.push('\n');
            }
            first = false;
            current = t.cause.as_deref();
        }
        out
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.class_name, message),
            None => write!(f, "{}", self.class_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_with_cause() {
        let t = Throwable::new("demo.Boom", "outer")
            .with_frame("demo.Counter.increment")
            .caused_by(Throwable::bare("demo.Root"));
        let rendered = t.render();
        assert_eq!(
            rendered,
            "demo.Boom: outer\n\tat demo.Counter.increment\nCaused by: demo.Root\n"
        );
    }
}
