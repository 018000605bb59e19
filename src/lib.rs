#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

//! # bledump
//!
//! A Bluetooth Low Energy advertisement inspector.
//!
//! The library turns raw BLE advertisements into human-readable text: AD structure
//! types, the Flags bitfield, manufacturer specific data (with Apple continuity
//! device categories), service UUID lists and GATT inventories. Names come from
//! small built-in tables of services, characteristics and company identifiers.
//!
//! A [`ScanSession`] holds the per-scan state: the [`DisplayNameResolver`] that
//! remembers the real names a device has advertised, the devices seen so far and the
//! configured target device. The platform side ([`BleScanner`], backed by `btleplug`)
//! pushes [`Advertisement`]s into the session over a channel.
//!
//! ## Decoding without hardware
//!
//! ```
//! use bledump::{decode_flags, decode_manufacturer_data};
//!
//! let flags = decode_flags(&[0x06]).unwrap();
//! assert_eq!(flags.set_bits.len(), 2);
//!
//! let report = decode_manufacturer_data(&[0x4C, 0x00, 0x0D, 0x02, 0xDE, 0xAD]).unwrap();
//! assert_eq!(report.to_string(), "Apple Inc. - unpaired AirTag - lost mode, data: DE-AD");
//! ```
//!
//! ## Scanning
//!
//! ```no_run
//! use bledump::{BleScanner, ScanConfig, ScanSession};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ScanConfig::default().with_scan_timeout_ms(10_000);
//!     let scanner = BleScanner::new().await?;
//!     let mut session = ScanSession::new(config.clone())?;
//!
//!     let (sender, receiver) = mpsc::unbounded_channel();
//!     let (scanned, events) = tokio::join!(scanner.scan(&config, sender), session.run(receiver));
//!     println!("{} advertisements, {} events", scanned?, events.len());
//!
//!     Ok(())
//! }
//! ```

/// Service, characteristic and company name tables
pub mod catalog;
/// Scan configuration
pub mod config;
/// Error types and handling
pub mod error;
/// Flags AD field decoding
pub mod flags;
/// Manufacturer specific data decoding
pub mod manufacturer;
/// AD structure parsing and record rendering
pub mod record;
/// Device display names
pub mod resolver;
/// Platform scanning and GATT discovery
pub mod scanner;
/// GATT inventory formatting
pub mod services;
/// Per-scan state machine
pub mod session;
/// Type definitions and data structures
pub mod types;

// Re-export the main types for convenient usage
pub use config::ScanConfig;
pub use error::{BleDumpError, Result};
pub use flags::{decode_flags, FLAG_BITS};
pub use manufacturer::{decode_manufacturer_data, hex_dump};
pub use record::{describe_record, parse_ad_structures};
pub use resolver::DisplayNameResolver;
pub use scanner::{advertisement_from_properties, BleScanner};
pub use services::{CharacteristicDump, ServiceDump};
pub use session::{
    Advertisement, DeviceReport, DeviceSummary, ScanSession, SessionEvent, SessionSummary,
    SignalQuality,
};
pub use types::{
    AdType, AdvertisementRecord, AppleDeviceType, AppleSubType, FlagsReport,
    ManufacturerDataReport,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
