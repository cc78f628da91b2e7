use std::cell::RefCell;

/// Convenience result type used across softblit.
pub type SoftblitResult<T> = Result<T, SoftblitError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every error built through the constructor helpers (and every wrapped IO or lower-level
/// error) also records its message in the calling thread's most-recent-error slot, see
/// [`last_error`].
#[derive(thiserror::Error, Debug)]
pub enum SoftblitError {
    /// Null-equivalent inputs, bad dimensions or rectangles.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Unrecognized identifier, inconsistent masks, or a depth the operation refuses.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// No kernel resolves for a source/destination/flag combination.
    #[error("unsupported blit combination: {0}")]
    UnsupportedCombination(String),

    /// Allocation failure for pixel buffers, palettes or lookup tables.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// Operation not allowed in the surface's current state (locked, must-lock, ...).
    #[error("state violation: {0}")]
    State(String),

    /// Codec stream failure.
    #[error("io error: {0}")]
    Io(#[source] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(anyhow::Error),
}

impl SoftblitError {
    /// Build a [`SoftblitError::InvalidArgument`] value.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into()).recorded()
    }

    /// Build a [`SoftblitError::UnsupportedFormat`] value.
    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into()).recorded()
    }

    /// Build a [`SoftblitError::UnsupportedCombination`] value.
    pub fn unsupported_combination(msg: impl Into<String>) -> Self {
        Self::UnsupportedCombination(msg.into()).recorded()
    }

    /// Build a [`SoftblitError::OutOfMemory`] value.
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into()).recorded()
    }

    /// Build a [`SoftblitError::State`] value.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into()).recorded()
    }

    fn recorded(self) -> Self {
        let msg = self.to_string();
        tracing::debug!(error = %msg, "softblit error");
        LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(msg));
        self
    }
}

impl From<std::io::Error> for SoftblitError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err).recorded()
    }
}

impl From<anyhow::Error> for SoftblitError {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err).recorded()
    }
}

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Message of the most recent error raised on this thread, if any.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| slot.borrow().clone())
}

/// Reset the most-recent-error slot.
pub fn clear_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Allocate a zero-filled byte buffer, reporting allocation failure as an error.
pub(crate) fn try_alloc_zeroed(len: usize, what: &str) -> SoftblitResult<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| SoftblitError::out_of_memory(format!("{what}: {len} bytes")))?;
    buf.resize(len, 0);
    Ok(buf)
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
