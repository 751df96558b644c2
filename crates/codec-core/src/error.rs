// crates/codec-core/src/error.rs
//
// Structured error kinds for the codec engine boundary. Internal plumbing
// (queue/channel/worker bookkeeping) is free to use whatever error shape is
// convenient; anything crossing a facade call or delivered through an
// error callback must arrive as one of these variants so a host can match on
// `kind()` without parsing message text.

use std::fmt;

/// One error kind per §7 of the spec. Every variant carries a sanitized,
/// human-readable message — never a raw pointer, handle id, or internal
/// address — and `EncodingError`/`AllocationError` additionally carry an
/// optional backend-reported numeric code as a separate structured field.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("invalid state: {message}")]
    InvalidState { message: String },

    #[error("unsupported configuration: {message}")]
    Unsupported { message: String },

    #[error("data error: {message}")]
    DataError { message: String },

    #[error("encoding error: {message}")]
    EncodingError {
        message: String,
        native_code: Option<i32>,
    },

    #[error("media resource is detached")]
    Detached,

    #[error("invalid buffer layout: {message}")]
    InvalidLayout { message: String },

    #[error("destination buffer too small: need {needed} bytes, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    #[error("operation aborted")]
    Aborted,

    #[error("allocation failed: {message}")]
    AllocationError { message: String },

    #[error("codec instance reclaimed by resource manager")]
    ReclamationError,

    #[error("frame orientation does not match the active stream orientation")]
    OrientationError,
}

/// Discriminant-only view of [`CodecError`], useful for callers that want to
/// `match` on the kind without destructuring every variant's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfig,
    InvalidState,
    Unsupported,
    DataError,
    EncodingError,
    Detached,
    InvalidLayout,
    BufferTooSmall,
    Aborted,
    AllocationError,
    ReclamationError,
    OrientationError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InvalidConfig => "invalid-config",
            ErrorKind::InvalidState => "invalid-state",
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::DataError => "data-error",
            ErrorKind::EncodingError => "encoding-error",
            ErrorKind::Detached => "detached",
            ErrorKind::InvalidLayout => "invalid-layout",
            ErrorKind::BufferTooSmall => "buffer-too-small",
            ErrorKind::Aborted => "aborted",
            ErrorKind::AllocationError => "allocation-error",
            ErrorKind::ReclamationError => "reclamation-error",
            ErrorKind::OrientationError => "orientation-error",
        };
        f.write_str(s)
    }
}

impl CodecError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            CodecError::InvalidState { .. } => ErrorKind::InvalidState,
            CodecError::Unsupported { .. } => ErrorKind::Unsupported,
            CodecError::DataError { .. } => ErrorKind::DataError,
            CodecError::EncodingError { .. } => ErrorKind::EncodingError,
            CodecError::Detached => ErrorKind::Detached,
            CodecError::InvalidLayout { .. } => ErrorKind::InvalidLayout,
            CodecError::BufferTooSmall { .. } => ErrorKind::BufferTooSmall,
            CodecError::Aborted => ErrorKind::Aborted,
            CodecError::AllocationError { .. } => ErrorKind::AllocationError,
            CodecError::ReclamationError => ErrorKind::ReclamationError,
            CodecError::OrientationError => ErrorKind::OrientationError,
        }
    }

    /// Whether this error, once delivered via an error callback, transitions
    /// the owning facade to `Closed` (§7 propagation policy). `Aborted` only
    /// resolves pending flush completions and never closes anything on its
    /// own, so it is the one asynchronous-looking kind excluded here.
    pub fn closes_facade(&self) -> bool {
        matches!(
            self,
            CodecError::Unsupported { .. }
                | CodecError::EncodingError { .. }
                | CodecError::DataError { .. }
                | CodecError::AllocationError { .. }
                | CodecError::ReclamationError
        )
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CodecError::InvalidState { message: message.into() }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        CodecError::InvalidConfig { message: message.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_display() {
        let e = CodecError::BufferTooSmall { needed: 16, got: 4 };
        assert_eq!(e.kind().to_string(), "buffer-too-small");
    }

    #[test]
    fn aborted_does_not_close_facade() {
        assert!(!CodecError::Aborted.closes_facade());
    }

    #[test]
    fn encoding_error_closes_facade() {
        let e = CodecError::EncodingError { message: "boom".into(), native_code: Some(-5) };
        assert!(e.closes_facade());
    }
}
