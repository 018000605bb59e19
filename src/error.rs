use thiserror::Error;

/// Errors that can occur while decoding advertisements or talking to a Bluetooth adapter
#[derive(Error, Debug)]
pub enum BleDumpError {
    /// A decoder received fewer (or more) bytes than its format requires
    #[error("Invalid {field} length: expected {expected}, got {actual} byte(s)")]
    InvalidLength {
        /// Name of the field being decoded
        field: &'static str,
        /// Human readable description of the required length
        expected: &'static str,
        /// Number of bytes actually supplied
        actual: usize,
    },

    /// Bluetooth Low Energy related errors
    #[error("BLE error: {0}")]
    Ble(#[from] btleplug::Error),

    /// No Bluetooth adapter is available
    #[error("No Bluetooth adapter found")]
    AdapterNotFound,

    /// Device not seen during scanning
    #[error("Device not found")]
    DeviceNotFound,

    /// Device connection failed
    #[error("Failed to connect to device: {0}")]
    ConnectionFailed(String),

    /// Operation timeout
    #[error("Operation timed out after {timeout_ms}ms")]
    Timeout {
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Malformed Bluetooth device address
    #[error("Invalid Bluetooth address: {0}")]
    InvalidAddress(String),
}

/// Result type for bledump operations
pub type Result<T> = std::result::Result<T, BleDumpError>;

impl BleDumpError {
    /// Check if this error was raised by one of the payload decoders
    #[must_use]
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::InvalidLength { .. })
    }

    /// Check if this error indicates a connection issue
    #[must_use]
    pub const fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Ble(_)
                | Self::ConnectionFailed(_)
                | Self::DeviceNotFound
                | Self::AdapterNotFound
                | Self::Timeout { .. }
        )
    }

    pub(crate) const fn invalid_length(
        field: &'static str,
        expected: &'static str,
        actual: usize,
    ) -> Self {
        Self::InvalidLength {
            field,
            expected,
            actual,
        }
    }
}
