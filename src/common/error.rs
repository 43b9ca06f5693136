// src/common/error.rs

/// Validation error for an inbound SM70 frame.
///
/// Checks are applied in a fixed order (header, type, name length for info
/// reports, checksum) and the first violated condition is reported.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum WireError {
    /// Byte 0 is not the sensor-origin header marker.
    #[error("bad header byte")]
    BadHeader,

    /// Byte 1 is not a message type legal for this frame class.
    #[error("bad message type byte")]
    BadType,

    /// The byte sum of the whole frame is non-zero.
    #[error("bad checksum")]
    BadChecksum,

    /// A sensor-info report's name length exceeds the name field capacity.
    #[error("bad sensor name length")]
    BadNameLength,
}

/// Engine-level error, generic over the transport's I/O error type.
#[derive(Debug, thiserror::Error)]
pub enum Sm70Error<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")] // Format string requires Debug on E
    Io(E),

    /// An inbound frame failed validation.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// No free request slot; retry once an in-flight request completes.
    #[error("request pool exhausted")]
    PoolExhausted,

    /// The engine has not been started, or stopped before completion.
    #[error("engine is not running")]
    NotRunning,
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_error_wraps_into_engine_error() {
        let e: Sm70Error<()> = WireError::BadChecksum.into();
        assert!(matches!(e, Sm70Error::Wire(WireError::BadChecksum)));
    }
}
