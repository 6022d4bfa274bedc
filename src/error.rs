// src/error.rs
//! Error types for the data-port core, with advanced conversion support.

use std::fmt;

/// Errors that can occur during port and connection operations.
///
/// Reference-counter corruption and other invariant violations are programmer
/// errors and are reported via `panic!` rather than a variant here (see
/// [`crate::buffer::manager::BufferManager`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortError {
    /// Publish attempted on a port that is not ready (not yet initialized).
    PortNotReady,
    /// Value rejected by a bounded port configured with `OutOfBoundsAction::Discard`.
    OutOfBounds,
    /// `SetBounds` called on a port that has already been initialized.
    BoundsChangeAfterInit,
    /// Attempted to dequeue from a port that has no input queue.
    NoInputQueue,
    /// Called `DequeueAll` on a FIFO queue, or `DequeueSingle` on a dequeue-all queue.
    WrongQueueMode,
    /// Pull attempted on a port with no incoming connections and no current value.
    PullWithNoSource,
    /// Attempted to connect a port to itself, or create a connection cycle
    /// that `Connection` does not support.
    InvalidConnection,
    /// A `Connection` flagged `CONVERSION` had no conversion function installed.
    MissingConversion(String),
    /// Generic invalid-state condition with context.
    InvalidState(String),
    /// Wire-format encode/decode attempted to read or write past buffer bounds.
    BufferOverflow,
    /// Requested buffer position exceeds its current length.
    PositionOutOfBounds,
    /// Requested buffer size exceeds the maximum allowed.
    SizeTooBig,
    /// Requested position/length increment is too large or would overflow.
    IncrementTooLarge,
    /// I/O error (wire-format encode/decode), kept for `std::io::Error` compatibility.
    Io(String),
}

impl fmt::Display for PortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PortNotReady => write!(f, "port is not ready; ignoring publishing request"),
            Self::OutOfBounds => write!(f, "value out of bounds"),
            Self::BoundsChangeAfterInit => {
                write!(f, "port has already been initialized, cannot change bounds")
            }
            Self::NoInputQueue => write!(f, "port has no input queue"),
            Self::WrongQueueMode => write!(f, "input queue dequeue mode mismatch"),
            Self::PullWithNoSource => write!(f, "pull requested but port has no source"),
            Self::InvalidConnection => write!(f, "invalid connection"),
            Self::MissingConversion(msg) => write!(f, "missing conversion: {}", msg),
            Self::InvalidState(msg) => write!(f, "invalid state: {}", msg),
            Self::BufferOverflow => write!(f, "buffer overflow"),
            Self::PositionOutOfBounds => write!(f, "position out of bounds"),
            Self::SizeTooBig => write!(f, "buffer size too big"),
            Self::IncrementTooLarge => write!(f, "increment too large"),
            Self::Io(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PortError {}

// ============================================================================
// ERROR CONVERSION
// ============================================================================

impl From<PortError> for std::io::Error {
    fn from(err: PortError) -> Self {
        use std::io::ErrorKind;
        match err {
            PortError::Io(msg) => std::io::Error::new(ErrorKind::Other, msg),
            PortError::PullWithNoSource => std::io::Error::new(ErrorKind::NotFound, err),
            _ => std::io::Error::new(ErrorKind::Other, err),
        }
    }
}

impl From<std::io::Error> for PortError {
    fn from(err: std::io::Error) -> Self {
        PortError::Io(err.to_string())
    }
}

#[cfg(feature = "anyhow")]
impl From<PortError> for anyhow::Error {
    fn from(err: PortError) -> Self {
        anyhow::anyhow!("{}", err)
    }
}

#[cfg(feature = "anyhow")]
impl From<anyhow::Error> for PortError {
    fn from(err: anyhow::Error) -> Self {
        PortError::InvalidState(err.to_string())
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for port operations.
pub type Result<T> = std::result::Result<T, PortError>;

/// Extension trait for converting `Result<T, PortError>` to other error types.
pub trait ResultExt<T> {
    /// Convert to `anyhow::Result`.
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T>;

    /// Convert to `std::io::Result`.
    fn into_io(self) -> std::io::Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    #[cfg(feature = "anyhow")]
    fn into_anyhow(self) -> anyhow::Result<T> {
        self.map_err(|e| e.into())
    }

    fn into_io(self) -> std::io::Result<T> {
        self.map_err(|e| e.into())
    }
}

/// Convenience macro for converting port operations to any Result type.
///
/// Requires an explicit target error type as the second argument so the
/// conversion is unambiguous.
#[macro_export]
macro_rules! port_op {
    ($expr:expr, $target:ty) => {
        $expr.map_err(|e: $crate::PortError| -> $target { e.into() })
    };
    ($expr:expr) => {
        $expr.map_err(|e: $crate::PortError| -> std::io::Error { e.into() })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_io() {
        let err = PortError::PullWithNoSource;
        let io_err: std::io::Error = err.into();
        assert_eq!(io_err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_result_ext() {
        let result: Result<u32> = Ok(42);
        assert_eq!(result.into_io().unwrap(), 42);
    }
}
