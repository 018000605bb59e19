use btleplug::{
    api::{BDAddr, Central, CentralEvent, Manager as _, Peripheral as _, PeripheralProperties, ScanFilter},
    platform::{Adapter, Manager, Peripheral, PeripheralId},
};
use futures::stream::StreamExt;
use std::time::Duration;
use tokio::{sync::mpsc, time::timeout};
use tracing::{debug, info, warn};

use crate::{
    catalog::short_uuid,
    config::ScanConfig,
    error::{BleDumpError, Result},
    services::ServiceDump,
    session::Advertisement,
    types::{AdType, AdvertisementRecord},
};

/// AD type for service data keyed by a 16-bit UUID
const SERVICE_DATA_16_BIT: u8 = 0x16;
/// AD type for service data keyed by a 128-bit UUID
const SERVICE_DATA_128_BIT: u8 = 0x21;

/// BLE observation layer backed by the platform Bluetooth stack
pub struct BleScanner {
    manager: Manager,
}

impl BleScanner {
    /// Create a new scanner
    ///
    /// # Errors
    ///
    /// Returns [`BleDumpError::Ble`] if the Bluetooth stack cannot be initialized.
    pub async fn new() -> Result<Self> {
        let manager = Manager::new().await?;
        Ok(Self { manager })
    }

    async fn adapter(&self) -> Result<Adapter> {
        let adapter = self
            .manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(BleDumpError::AdapterNotFound)?;

        match adapter.adapter_info().await {
            Ok(description) => info!("Using adapter {}", description),
            Err(e) => debug!("Adapter info unavailable: {}", e),
        }
        Ok(adapter)
    }

    /// Scan without a filter and forward every advertisement to `sender`
    ///
    /// The scan runs for `scan_timeout_ms` or until the receiving side is dropped.
    /// Returns the number of advertisements forwarded.
    ///
    /// # Errors
    ///
    /// Returns [`BleDumpError::AdapterNotFound`] if no adapter is present,
    /// or [`BleDumpError::Ble`] if the scan cannot be started or stopped.
    pub async fn scan(
        &self,
        config: &ScanConfig,
        sender: mpsc::UnboundedSender<Advertisement>,
    ) -> Result<usize> {
        let central = self.adapter().await?;
        let mut events = central.events().await?;

        info!("Starting scan for {} ms...", config.scan_timeout_ms);
        central.start_scan(ScanFilter::default()).await?;

        let deadline = tokio::time::sleep(Duration::from_millis(config.scan_timeout_ms));
        tokio::pin!(deadline);

        let mut forwarded = 0;
        loop {
            tokio::select! {
                () = &mut deadline => {
                    debug!("Scan window elapsed");
                    break;
                }
                event = events.next() => {
                    let Some(event) = event else {
                        debug!("Central event stream ended");
                        break;
                    };
                    let id = match event {
                        CentralEvent::DeviceDiscovered(id)
                        | CentralEvent::DeviceUpdated(id)
                        | CentralEvent::ManufacturerDataAdvertisement { id, .. } => id,
                        _ => continue,
                    };

                    match read_advertisement(&central, &id).await {
                        Ok(Some(advertisement)) => {
                            if sender.send(advertisement).is_err() {
                                debug!("Receiver dropped, ending scan");
                                break;
                            }
                            forwarded += 1;
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Failed to read advertisement from {:?}: {}", id, e),
                    }
                }
            }
        }

        central.stop_scan().await?;
        info!("Scan completed. Forwarded {} advertisement(s)", forwarded);
        Ok(forwarded)
    }

    /// Connect to `address` and list its GATT services
    ///
    /// The device is looked up among known peripherals first, then scanned for during
    /// `scan_timeout_ms`. The connection is closed before returning.
    ///
    /// # Errors
    ///
    /// Returns [`BleDumpError::DeviceNotFound`] if the device is not seen,
    /// [`BleDumpError::Timeout`] if the connection times out,
    /// [`BleDumpError::ConnectionFailed`] if the connection is refused,
    /// or [`BleDumpError::Ble`] for other Bluetooth-related errors.
    pub async fn dump_services(
        &self,
        config: &ScanConfig,
        address: BDAddr,
    ) -> Result<Vec<ServiceDump>> {
        let central = self.adapter().await?;
        let peripheral = find_peripheral(&central, address, config.scan_timeout_ms).await?;

        info!("Connecting to device: {}", address);
        timeout(
            Duration::from_millis(config.connect_timeout_ms),
            peripheral.connect(),
        )
        .await
        .map_err(|_| BleDumpError::Timeout {
            timeout_ms: config.connect_timeout_ms,
        })?
        .map_err(|e| BleDumpError::ConnectionFailed(e.to_string()))?;

        let discovered = peripheral.discover_services().await;
        let dumps: Vec<ServiceDump> = peripheral
            .services()
            .iter()
            .map(ServiceDump::from_service)
            .collect();

        if let Err(e) = peripheral.disconnect().await {
            warn!("Failed to disconnect from {}: {}", address, e);
        }
        discovered?;

        info!("Found {} service(s) on {}", dumps.len(), address);
        for dump in &dumps {
            info!("\n{}", dump);
        }
        Ok(dumps)
    }
}

async fn read_advertisement(central: &Adapter, id: &PeripheralId) -> Result<Option<Advertisement>> {
    let peripheral = central.peripheral(id).await?;
    let Some(properties) = peripheral.properties().await? else {
        return Ok(None);
    };
    let connected = peripheral.is_connected().await.unwrap_or(false);
    Ok(Some(advertisement_from_properties(&properties, connected)))
}

async fn find_peripheral(central: &Adapter, address: BDAddr, scan_timeout_ms: u64) -> Result<Peripheral> {
    if let Some(peripheral) = central
        .peripherals()
        .await?
        .into_iter()
        .find(|p| p.address() == address)
    {
        return Ok(peripheral);
    }

    debug!("{} not known yet, scanning", address);
    let mut events = central.events().await?;
    central.start_scan(ScanFilter::default()).await?;

    let search = async {
        while let Some(event) = events.next().await {
            if let CentralEvent::DeviceDiscovered(id) = event {
                if let Ok(peripheral) = central.peripheral(&id).await {
                    if peripheral.address() == address {
                        return Some(peripheral);
                    }
                }
            }
        }
        None
    };
    let found = timeout(Duration::from_millis(scan_timeout_ms), search)
        .await
        .ok()
        .flatten();

    central.stop_scan().await?;
    found.ok_or(BleDumpError::DeviceNotFound)
}

/// Rebuild advertisement records from the properties reported by the platform
///
/// The platform hands out parsed fields, so records are re-assembled in wire form:
/// manufacturer data gets its company id prepended little-endian, service UUIDs are split
/// into 16-bit and 128-bit lists. The flags field is not exposed by the platform and is
/// therefore absent.
#[must_use]
pub fn advertisement_from_properties(
    properties: &PeripheralProperties,
    connected: bool,
) -> Advertisement {
    let mut records = Vec::new();

    if let Some(name) = properties.local_name.as_deref().filter(|n| !n.is_empty()) {
        records.push(AdvertisementRecord::new(
            AdType::CompleteLocalName,
            name.as_bytes(),
        ));
    }

    if let Some(power) = properties.tx_power_level.and_then(|p| i8::try_from(p).ok()) {
        records.push(AdvertisementRecord::new(
            AdType::TxPowerLevel,
            power.to_le_bytes(),
        ));
    }

    let mut uuids16 = Vec::new();
    let mut uuids128 = Vec::new();
    for uuid in &properties.services {
        match short_uuid(uuid) {
            Some(short) => uuids16.extend_from_slice(&short.to_le_bytes()),
            None => uuids128.extend_from_slice(&uuid.as_u128().to_le_bytes()),
        }
    }
    if !uuids16.is_empty() {
        records.push(AdvertisementRecord::new(AdType::UuidsComplete16Bit, uuids16));
    }
    if !uuids128.is_empty() {
        records.push(AdvertisementRecord::new(
            AdType::UuidsComplete128Bit,
            uuids128,
        ));
    }

    let mut service_data: Vec<_> = properties.service_data.iter().collect();
    service_data.sort_by_key(|(uuid, _)| **uuid);
    for (uuid, payload) in service_data {
        let (code, mut data) = match short_uuid(uuid) {
            Some(short) => (SERVICE_DATA_16_BIT, short.to_le_bytes().to_vec()),
            None => (SERVICE_DATA_128_BIT, uuid.as_u128().to_le_bytes().to_vec()),
        };
        data.extend_from_slice(payload);
        records.push(AdvertisementRecord::new(AdType::Other(code), data));
    }

    let mut manufacturer_data: Vec<_> = properties.manufacturer_data.iter().collect();
    manufacturer_data.sort_by_key(|(company_id, _)| **company_id);
    for (company_id, payload) in manufacturer_data {
        let mut data = company_id.to_le_bytes().to_vec();
        data.extend_from_slice(payload);
        records.push(AdvertisementRecord::new(
            AdType::ManufacturerSpecificData,
            data,
        ));
    }

    Advertisement {
        address: properties.address,
        local_name: properties.local_name.clone(),
        rssi: properties.rssi,
        connected,
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{catalog::uuid_from_u16, record::describe_record};
    use uuid::Uuid;

    fn properties() -> PeripheralProperties {
        PeripheralProperties {
            address: BDAddr::from([0x18, 0x7E, 0xB9, 0x6A, 0xB8, 0x5D]),
            local_name: Some("iPad".to_string()),
            tx_power_level: Some(-12),
            rssi: Some(-58),
            manufacturer_data: [(0x004C, vec![0x05, 0x12, 0x34])].into_iter().collect(),
            services: vec![
                uuid_from_u16(0x180F),
                Uuid::parse_str("d0611e78-bbb4-4591-a5f8-487910ae4366").unwrap(),
            ],
            ..PeripheralProperties::default()
        }
    }

    #[test]
    fn test_advertisement_from_properties() {
        let advertisement = advertisement_from_properties(&properties(), true);

        assert_eq!(advertisement.local_name.as_deref(), Some("iPad"));
        assert_eq!(advertisement.rssi, Some(-58));
        assert!(advertisement.connected);

        let types: Vec<AdType> = advertisement.records.iter().map(|r| r.ad_type).collect();
        assert_eq!(
            types,
            [
                AdType::CompleteLocalName,
                AdType::TxPowerLevel,
                AdType::UuidsComplete16Bit,
                AdType::UuidsComplete128Bit,
                AdType::ManufacturerSpecificData,
            ]
        );
    }

    #[test]
    fn test_manufacturer_data_gets_company_id() {
        let advertisement = advertisement_from_properties(&properties(), false);

        assert_eq!(
            advertisement.manufacturer_data(),
            Some([0x4C, 0x00, 0x05, 0x12, 0x34].as_slice())
        );
        let record = advertisement.records.last().unwrap();
        assert_eq!(
            describe_record(record).unwrap(),
            "Manufacturer data: Apple Inc. - AirDrop, data: 12-34"
        );
    }

    #[test]
    fn test_rebuilt_records_decode() {
        let advertisement = advertisement_from_properties(&properties(), false);
        let lines: Vec<String> = advertisement
            .records
            .iter()
            .map(|r| describe_record(r).unwrap())
            .collect();

        assert_eq!(lines[1], "TX power level: -12 dBm");
        assert_eq!(
            lines[2],
            "Complete 16-bit service UUIDs: 0000180f-0000-1000-8000-00805f9b34fb (Battery Service)"
        );
        assert_eq!(
            lines[3],
            "Complete 128-bit service UUIDs: d0611e78-bbb4-4591-a5f8-487910ae4366 (Apple Continuity Service)"
        );
    }

    #[test]
    fn test_service_data_records() {
        let props = PeripheralProperties {
            service_data: [(uuid_from_u16(0xFE2C), vec![0x00, 0x01])].into_iter().collect(),
            ..PeripheralProperties::default()
        };
        let advertisement = advertisement_from_properties(&props, false);

        assert_eq!(
            advertisement.records,
            [AdvertisementRecord::new(
                AdType::Other(SERVICE_DATA_16_BIT),
                [0x2C, 0xFE, 0x00, 0x01]
            )]
        );
    }

    #[test]
    fn test_empty_properties() {
        let advertisement = advertisement_from_properties(&PeripheralProperties::default(), false);
        assert!(advertisement.records.is_empty());
        assert_eq!(advertisement.manufacturer_data(), None);
    }

    #[test]
    fn test_out_of_range_tx_power_is_dropped() {
        let props = PeripheralProperties {
            tx_power_level: Some(300),
            ..PeripheralProperties::default()
        };
        assert!(advertisement_from_properties(&props, false).records.is_empty());
    }
}
