// Error types for Circuit Cube control

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CubeError {
    #[error("Bluetooth error: {0}")]
    Ble(#[from] btleplug::Error),

    #[error("No Bluetooth adapter found")]
    NoAdapter,

    #[error("No Circuit Cube found advertising a name containing {marker:?}")]
    NoDevice { marker: String },

    #[error("No device with address {address} found")]
    DeviceNotFound { address: String },

    #[error("Failed to connect to {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Not connected to a Circuit Cube")]
    NotConnected,

    #[error("Unknown motor {0:?}, expected A, B or C")]
    InvalidMotor(String),

    #[error("Velocity {0} out of range, must be between -100 and 100")]
    VelocityOutOfRange(i32),

    #[error("Characteristic {0} not found on device")]
    CharacteristicNotFound(Uuid),

    #[error("Failed to decode {field}: {reason}")]
    Decode { field: &'static str, reason: String },

    #[error("Constant index {0} out of range (0..=28)")]
    IndexOutOfRange(usize),

    #[error("Cannot block inside a current-thread runtime, use the async Cube instead")]
    BlockingUnsupported,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CubeError {
    /// True when the error means the peer is gone and the session is unusable
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CubeError::NotConnected
                | CubeError::Ble(btleplug::Error::NotConnected)
                | CubeError::Ble(btleplug::Error::DeviceNotFound)
        )
    }
}

pub type Result<T> = std::result::Result<T, CubeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(CubeError::NotConnected.is_fatal());
        assert!(CubeError::Ble(btleplug::Error::NotConnected).is_fatal());
        assert!(!CubeError::VelocityOutOfRange(150).is_fatal());
        assert!(!CubeError::Ble(btleplug::Error::TimedOut(std::time::Duration::from_secs(1))).is_fatal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            CubeError::InvalidMotor("D".into()).to_string(),
            "Unknown motor \"D\", expected A, B or C"
        );
        assert_eq!(
            CubeError::NoDevice { marker: "Tenka".into() }.to_string(),
            "No Circuit Cube found advertising a name containing \"Tenka\""
        );
    }
}
