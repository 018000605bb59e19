use btleplug::api::BDAddr;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{BleDumpError, Result};

/// Scan session configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// How long a scan runs, in milliseconds
    pub scan_timeout_ms: u64,
    /// Connection timeout used when dumping a device's services, in milliseconds
    pub connect_timeout_ms: u64,
    /// Stop reporting after this many distinct devices
    pub max_devices: usize,
    /// RSSI strictly above this value is reported as good signal
    pub good_rssi_threshold: i16,
    /// Address of the device to connect to, as `AA:BB:CC:DD:EE:FF`
    pub target_address: Option<String>,
    /// Ignore advertisements whose local name starts with "Bluetooth"
    pub skip_placeholder_names: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_timeout_ms: 20_000,
            connect_timeout_ms: 10_000,
            max_devices: 50,
            good_rssi_threshold: -70,
            target_address: None,
            skip_placeholder_names: true,
        }
    }
}

impl ScanConfig {
    /// Set the scan duration
    #[must_use]
    pub const fn with_scan_timeout_ms(mut self, scan_timeout_ms: u64) -> Self {
        self.scan_timeout_ms = scan_timeout_ms;
        self
    }

    /// Set the connection timeout
    #[must_use]
    pub const fn with_connect_timeout_ms(mut self, connect_timeout_ms: u64) -> Self {
        self.connect_timeout_ms = connect_timeout_ms;
        self
    }

    /// Set the device cap
    #[must_use]
    pub const fn with_max_devices(mut self, max_devices: usize) -> Self {
        self.max_devices = max_devices;
        self
    }

    /// Set the target device address
    #[must_use]
    pub fn with_target_address(mut self, address: impl Into<String>) -> Self {
        self.target_address = Some(address.into());
        self
    }

    /// Parsed target address, if one is configured
    ///
    /// # Errors
    ///
    /// Returns [`BleDumpError::InvalidAddress`] if the configured address is malformed.
    pub fn target(&self) -> Result<Option<BDAddr>> {
        self.target_address
            .as_deref()
            .map(|address| {
                BDAddr::from_str(address.trim())
                    .map_err(|e| BleDumpError::InvalidAddress(format!("{address}: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_config_defaults() {
        let config = ScanConfig::default();

        assert_eq!(config.scan_timeout_ms, 20_000);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.max_devices, 50);
        assert_eq!(config.good_rssi_threshold, -70);
        assert!(config.target_address.is_none());
        assert!(config.skip_placeholder_names);
    }

    #[test]
    fn test_builder_methods() {
        let config = ScanConfig::default()
            .with_scan_timeout_ms(5_000)
            .with_connect_timeout_ms(2_000)
            .with_max_devices(3)
            .with_target_address("18:7E:B9:6A:B8:5D");

        assert_eq!(config.scan_timeout_ms, 5_000);
        assert_eq!(config.connect_timeout_ms, 2_000);
        assert_eq!(config.max_devices, 3);
        assert_eq!(
            config.target().unwrap(),
            Some(BDAddr::from([0x18, 0x7E, 0xB9, 0x6A, 0xB8, 0x5D]))
        );
    }

    #[test]
    fn test_target_address_parsing() {
        assert_eq!(ScanConfig::default().target().unwrap(), None);

        let lowercase = ScanConfig::default().with_target_address("18:7e:b9:6a:b8:5d");
        assert!(lowercase.target().unwrap().is_some());

        let invalid = ScanConfig::default().with_target_address("not-an-address");
        assert!(matches!(
            invalid.target(),
            Err(BleDumpError::InvalidAddress(_))
        ));
    }
}
