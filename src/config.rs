// src/config.rs
//! Runtime configuration for the uplink

use serde::{Deserialize, Serialize};

/// Credentials for the remote feature store.
///
/// Read once at startup and passed by reference for the lifetime of the
/// process; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub space_id: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, space_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            space_id: space_id.into(),
        }
    }
}

/// Settings for the serial receiver and the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UplinkConfig {
    pub serial_port: String,
    pub baudrate: u32,
    pub verbose: bool,
}

impl Default for UplinkConfig {
    fn default() -> Self {
        Self {
            serial_port: "/dev/ttyS0".to_string(),
            baudrate: 9600,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = UplinkConfig::default();
        assert_eq!(config.serial_port, "/dev/ttyS0");
        assert_eq!(config.baudrate, 9600);
        assert!(!config.verbose);
    }
}
