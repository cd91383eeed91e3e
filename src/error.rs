use std::fmt;

/// Failure reasons surfaced by every drawing call.
///
/// A failed call never leaves the surface partially modified: validation
/// happens before the surface is locked, and lock failures write nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer has no surface bound to it
    InvalidSurface,
    /// The platform refused to lock the surface memory
    LockFailed(String),
    /// The surface encoding cannot be drawn into
    UnsupportedFormat(String),
    /// A drawing parameter was rejected before rasterization started
    InvalidArgument(String),
    /// Settings could not be read, written or parsed
    Config(String),
}

impl RenderError {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        log::debug!("rejecting draw call: {}", reason);
        Self::InvalidArgument(reason)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSurface => write!(f, "invalid surface: no pixel buffer is bound"),
            Self::LockFailed(reason) => write!(f, "failed to lock surface: {}", reason),
            Self::UnsupportedFormat(reason) => write!(f, "unsupported pixel format: {}", reason),
            Self::InvalidArgument(reason) => f.write_str(reason),
            Self::Config(reason) => write!(f, "settings error: {}", reason),
        }
    }
}

impl std::error::Error for RenderError {}
