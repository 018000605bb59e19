//! Scan session: the synchronous handler behind the observation layer.
//!
//! The observation layer pushes [`Advertisement`] values, one per received advertisement,
//! either directly through [`ScanSession::handle`] or over a channel drained by
//! [`ScanSession::run`]. The session turns them into [`SessionEvent`]s for a log or
//! display layer.

use btleplug::api::BDAddr;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    config::ScanConfig,
    error::Result,
    manufacturer::hex_dump,
    record::describe_record,
    resolver::{DisplayNameResolver, PLACEHOLDER_NAME_PREFIX},
    types::{AdType, AdvertisementRecord},
};

/// One advertisement as delivered by the observation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advertisement {
    /// Advertiser address
    pub address: BDAddr,
    /// Local name reported by the platform, if any
    pub local_name: Option<String>,
    /// Received signal strength in dBm
    pub rssi: Option<i16>,
    /// Whether the platform reports an open connection to the device
    pub connected: bool,
    /// Advertisement records, in received order
    pub records: Vec<AdvertisementRecord>,
}

impl Advertisement {
    /// Create an advertisement with no name, RSSI or records
    #[must_use]
    pub const fn new(address: BDAddr) -> Self {
        Self {
            address,
            local_name: None,
            rssi: None,
            connected: false,
            records: Vec::new(),
        }
    }

    /// Set the local name
    #[must_use]
    pub fn with_local_name(mut self, name: impl Into<String>) -> Self {
        self.local_name = Some(name.into());
        self
    }

    /// Set the RSSI
    #[must_use]
    pub const fn with_rssi(mut self, rssi: i16) -> Self {
        self.rssi = Some(rssi);
        self
    }

    /// Append a record
    #[must_use]
    pub fn with_record(mut self, record: AdvertisementRecord) -> Self {
        self.records.push(record);
        self
    }

    /// Payload of the first manufacturer specific data record
    #[must_use]
    pub fn manufacturer_data(&self) -> Option<&[u8]> {
        self.records
            .iter()
            .find(|record| record.ad_type == AdType::ManufacturerSpecificData)
            .map(|record| record.data.as_slice())
    }
}

/// Coarse signal quality derived from RSSI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignalQuality {
    /// RSSI above the configured threshold
    Good,
    /// RSSI at or below the configured threshold
    Poor,
    /// No RSSI reported
    Unknown,
}

impl SignalQuality {
    /// Classify `rssi` against `threshold`
    #[must_use]
    pub const fn classify(rssi: Option<i16>, threshold: i16) -> Self {
        match rssi {
            Some(rssi) if rssi > threshold => Self::Good,
            Some(_) => Self::Poor,
            None => Self::Unknown,
        }
    }
}

impl fmt::Display for SignalQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Poor => write!(f, "poor"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Everything reported about a device on first sighting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceReport {
    /// Advertiser address
    pub address: BDAddr,
    /// Resolved display name
    pub display_name: String,
    /// RSSI in dBm
    pub rssi: Option<i16>,
    /// Signal quality
    pub signal: SignalQuality,
    /// Connection state
    pub connected: bool,
    /// One rendered line per advertisement record
    pub records: Vec<String>,
}

impl fmt::Display for DeviceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "New device (BLE):")?;
        writeln!(f, "   Name: {}", self.display_name)?;
        writeln!(f, "   Address: {}", self.address)?;
        match self.rssi {
            Some(rssi) => writeln!(f, "   RSSI: {rssi} dBm ({})", self.signal)?,
            None => writeln!(f, "   RSSI: n/a")?,
        }
        write!(
            f,
            "   Connection: {}",
            if self.connected {
                "connected"
            } else {
                "not connected"
            }
        )?;
        for record in &self.records {
            write!(f, "\n     {record}")?;
        }
        Ok(())
    }
}

/// Something worth logging that happened during a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A device was seen for the first time
    DeviceDiscovered(DeviceReport),
    /// The configured target device was seen
    TargetFound {
        /// Target address
        address: BDAddr,
        /// Display name at the time it was found
        name: String,
    },
    /// A known device advertised different manufacturer data
    ManufacturerDataUpdated {
        /// Device address
        address: BDAddr,
        /// Display name
        name: String,
        /// Previous payload as hex
        old: String,
        /// New payload as hex
        new: String,
    },
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceDiscovered(report) => write!(f, "{report}"),
            Self::TargetFound { address, name } => {
                write!(f, "Target device found: {name} ({address})")
            }
            Self::ManufacturerDataUpdated {
                address,
                name,
                old,
                new,
            } => write!(
                f,
                "Manufacturer data updated:\n   Device: {name} ({address})\n   Old: {old}\n   New: {new}"
            ),
        }
    }
}

/// Latest state of a device seen in this session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    /// Advertiser address
    pub address: BDAddr,
    /// Display name
    pub name: String,
    /// Latest RSSI in dBm
    pub rssi: Option<i16>,
    /// Latest signal quality
    pub signal: SignalQuality,
    last_manufacturer_data: Option<String>,
}

/// What a finished session leaves behind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Devices in the order they were first seen
    pub devices: Vec<DeviceSummary>,
    /// Target devices that were seen
    pub targets: Vec<BDAddr>,
}

/// Per-scan state: display names, seen devices and targets
///
/// A session owns its [`DisplayNameResolver`]; run concurrent scans with one session each.
#[derive(Debug)]
pub struct ScanSession {
    config: ScanConfig,
    target: Option<BDAddr>,
    resolver: DisplayNameResolver,
    devices: Vec<DeviceSummary>,
    index: HashMap<BDAddr, usize>,
    targets: Vec<BDAddr>,
}

fn is_placeholder_name(name: &str) -> bool {
    name.get(..PLACEHOLDER_NAME_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(PLACEHOLDER_NAME_PREFIX))
}

impl ScanSession {
    /// Start a session
    ///
    /// # Errors
    ///
    /// Returns [`crate::BleDumpError::InvalidAddress`] if the configured target address is malformed.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let target = config.target()?;
        Ok(Self {
            config,
            target,
            resolver: DisplayNameResolver::new(),
            devices: Vec::new(),
            index: HashMap::new(),
            targets: Vec::new(),
        })
    }

    /// Session configuration
    #[must_use]
    pub const fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Devices seen so far, in order of first sighting
    #[must_use]
    pub fn devices(&self) -> &[DeviceSummary] {
        &self.devices
    }

    /// Target devices seen so far
    #[must_use]
    pub fn targets(&self) -> &[BDAddr] {
        &self.targets
    }

    /// The session's display name resolver
    #[must_use]
    pub const fn resolver(&self) -> &DisplayNameResolver {
        &self.resolver
    }

    /// Whether the device cap has been reached
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.devices.len() >= self.config.max_devices
    }

    /// Process one advertisement
    pub fn handle(&mut self, advertisement: &Advertisement) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        if self.config.skip_placeholder_names
            && advertisement
                .local_name
                .as_deref()
                .is_some_and(is_placeholder_name)
        {
            debug!("Skipping placeholder-named device {}", advertisement.address);
            return events;
        }

        let known = self.index.get(&advertisement.address).copied();
        if known.is_none() && self.is_full() {
            return events;
        }

        let address = advertisement.address;
        let manufacturer_data = advertisement.manufacturer_data();
        let display_name = self.resolver.resolve_display_name(
            &address.to_string(),
            advertisement.local_name.as_deref(),
            manufacturer_data,
        );
        let signal = SignalQuality::classify(advertisement.rssi, self.config.good_rssi_threshold);
        let manufacturer_hex = manufacturer_data.map(hex_dump);

        if let Some(position) = known {
            let device = &mut self.devices[position];
            device.name.clone_from(&display_name);
            device.rssi = advertisement.rssi.or(device.rssi);
            device.signal = SignalQuality::classify(device.rssi, self.config.good_rssi_threshold);

            if let Some(new) = manufacturer_hex {
                match device.last_manufacturer_data.replace(new.clone()) {
                    Some(old) if old != new => {
                        events.push(SessionEvent::ManufacturerDataUpdated {
                            address,
                            name: display_name.clone(),
                            old,
                            new,
                        });
                    }
                    _ => {}
                }
            }
        } else {
            let records = advertisement
                .records
                .iter()
                .map(|record| {
                    describe_record(record).unwrap_or_else(|e| {
                        warn!("Malformed {} record from {}: {}", record.ad_type, address, e);
                        format!("{}: invalid ({e})", record.ad_type)
                    })
                })
                .collect();

            self.index.insert(address, self.devices.len());
            self.devices.push(DeviceSummary {
                address,
                name: display_name.clone(),
                rssi: advertisement.rssi,
                signal,
                last_manufacturer_data: manufacturer_hex,
            });

            events.push(SessionEvent::DeviceDiscovered(DeviceReport {
                address,
                display_name: display_name.clone(),
                rssi: advertisement.rssi,
                signal,
                connected: advertisement.connected,
                records,
            }));
        }

        if self.target == Some(address) && !self.targets.contains(&address) {
            self.targets.push(address);
            events.push(SessionEvent::TargetFound {
                address,
                name: display_name,
            });
        }

        for event in &events {
            info!("{}", event);
        }

        events
    }

    /// Drain advertisements from `receiver` until the channel closes or the device cap is hit
    pub async fn run(
        &mut self,
        mut receiver: mpsc::UnboundedReceiver<Advertisement>,
    ) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        while let Some(advertisement) = receiver.recv().await {
            events.extend(self.handle(&advertisement));
            if self.is_full() {
                info!(
                    "Reached {} devices, ending session",
                    self.config.max_devices
                );
                break;
            }
        }

        events
    }

    /// End the session, forgetting all learned aliases
    #[must_use]
    pub fn finish(mut self) -> SessionSummary {
        self.resolver.clear();
        info!(
            "Session finished: {} device(s), {} target(s)",
            self.devices.len(),
            self.targets.len()
        );
        SessionSummary {
            devices: self.devices,
            targets: self.targets,
        }
    }
}
