use bytes::Buf;
use uuid::Uuid;

use crate::{
    catalog::{describe_service_uuid, uuid_from_u16},
    error::{BleDumpError, Result},
    flags::decode_flags,
    manufacturer::{decode_manufacturer_data, hex_dump},
    types::{AdType, AdvertisementRecord},
};

/// Split a raw advertising payload into its AD structures
///
/// Each structure is a length octet, a type octet and `length - 1` data octets.
/// A zero length octet ends the payload (the rest is padding).
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if a structure runs past the end of `payload`.
pub fn parse_ad_structures(payload: &[u8]) -> Result<Vec<AdvertisementRecord>> {
    let mut records = Vec::new();
    let mut buf = payload;

    while buf.has_remaining() {
        let len = usize::from(buf.get_u8());
        if len == 0 {
            break;
        }
        if buf.remaining() < len {
            return Err(BleDumpError::invalid_length(
                "AD structure",
                "as many bytes as its length octet",
                buf.remaining(),
            ));
        }

        let ad_type = AdType::from(buf.get_u8());
        let data = buf[..len - 1].to_vec();
        buf.advance(len - 1);
        records.push(AdvertisementRecord::new(ad_type, data));
    }

    Ok(records)
}

/// Decode a TX power level record (signed dBm)
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if `data` is empty.
pub fn decode_tx_power(data: &[u8]) -> Result<i8> {
    let mut buf = data;
    if !buf.has_remaining() {
        return Err(BleDumpError::invalid_length("tx power level", "1", 0));
    }
    Ok(buf.get_i8())
}

/// Decode a list of 16-bit service UUIDs (little-endian on the wire) to full UUIDs
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if the length is not a multiple of 2.
pub fn decode_uuid16_list(data: &[u8]) -> Result<Vec<Uuid>> {
    if data.len() % 2 != 0 {
        return Err(BleDumpError::invalid_length(
            "16-bit service UUIDs",
            "a multiple of 2",
            data.len(),
        ));
    }

    let mut buf = data;
    let mut uuids = Vec::with_capacity(data.len() / 2);
    while buf.has_remaining() {
        uuids.push(uuid_from_u16(buf.get_u16_le()));
    }
    Ok(uuids)
}

/// Decode a list of 128-bit service UUIDs (little-endian on the wire)
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if the length is not a multiple of 16.
pub fn decode_uuid128_list(data: &[u8]) -> Result<Vec<Uuid>> {
    if data.len() % 16 != 0 {
        return Err(BleDumpError::invalid_length(
            "128-bit service UUIDs",
            "a multiple of 16",
            data.len(),
        ));
    }

    let mut buf = data;
    let mut uuids = Vec::with_capacity(data.len() / 16);
    while buf.has_remaining() {
        uuids.push(Uuid::from_u128(buf.get_u128_le()));
    }
    Ok(uuids)
}

fn describe_uuids(uuids: &[Uuid]) -> String {
    if uuids.is_empty() {
        return "none".to_string();
    }
    uuids
        .iter()
        .map(describe_service_uuid)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render one advertisement record as a log line
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if the record payload does not fit its AD type.
pub fn describe_record(record: &AdvertisementRecord) -> Result<String> {
    let data = record.data.as_slice();
    let detail = match record.ad_type {
        AdType::Flags => decode_flags(data)?.to_string(),
        AdType::TxPowerLevel => format!("{} dBm", decode_tx_power(data)?),
        AdType::ManufacturerSpecificData => decode_manufacturer_data(data)?.to_string(),
        AdType::CompleteLocalName => {
            format!("{} ({})", String::from_utf8_lossy(data), hex_dump(data))
        }
        AdType::UuidsComplete16Bit => describe_uuids(&decode_uuid16_list(data)?),
        AdType::UuidsComplete128Bit | AdType::UuidsIncomplete128Bit => {
            describe_uuids(&decode_uuid128_list(data)?)
        }
        AdType::Other(_) => format!("data: {}", hex_dump(data)),
    };

    Ok(format!("{}: {detail}", record.ad_type))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ad_structures() {
        let payload = [
            0x02, 0x01, 0x06, // flags
            0x03, 0x03, 0x0F, 0x18, // 16-bit UUIDs: battery
            0x05, 0xFF, 0x4C, 0x00, 0x0C, 0x00, // manufacturer data
            0x00, 0x00, // padding
        ];
        let records = parse_ad_structures(&payload).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], AdvertisementRecord::new(AdType::Flags, [0x06]));
        assert_eq!(records[1].ad_type, AdType::UuidsComplete16Bit);
        assert_eq!(records[2].data, vec![0x4C, 0x00, 0x0C, 0x00]);
    }

    #[test]
    fn test_parse_truncated_structure() {
        let error = parse_ad_structures(&[0x05, 0xFF, 0x4C]).unwrap_err();
        assert!(matches!(
            error,
            BleDumpError::InvalidLength {
                field: "AD structure",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_empty_payload() {
        assert!(parse_ad_structures(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_describe_flags_record() {
        let record = AdvertisementRecord::new(AdType::Flags, [0x06]);
        assert_eq!(
            describe_record(&record).unwrap(),
            "Flags: 0x06 (binary: 00000110) [set flags]: LE General Discoverable Mode, BR/EDR Not Supported"
        );
    }

    #[test]
    fn test_describe_tx_power_is_signed() {
        let record = AdvertisementRecord::new(AdType::TxPowerLevel, [0xF4]);
        assert_eq!(describe_record(&record).unwrap(), "TX power level: -12 dBm");

        let empty = AdvertisementRecord::new(AdType::TxPowerLevel, Vec::new());
        assert!(describe_record(&empty).unwrap_err().is_decode_error());
    }

    #[test]
    fn test_describe_manufacturer_record() {
        let record =
            AdvertisementRecord::new(AdType::ManufacturerSpecificData, [0x4C, 0x00, 0x07, 0x03]);
        assert_eq!(
            describe_record(&record).unwrap(),
            "Manufacturer data: Apple Inc. - unpaired AirPods - active pairing, data: "
        );

        let short = AdvertisementRecord::new(AdType::ManufacturerSpecificData, [0x4C]);
        assert!(describe_record(&short).is_err());
    }

    #[test]
    fn test_describe_local_name() {
        let record = AdvertisementRecord::new(AdType::CompleteLocalName, b"Pad".to_vec());
        assert_eq!(
            describe_record(&record).unwrap(),
            "Complete local name: Pad (50-61-64)"
        );
    }

    #[test]
    fn test_describe_uuid_lists() {
        let record = AdvertisementRecord::new(AdType::UuidsComplete16Bit, [0x0F, 0x18]);
        assert_eq!(
            describe_record(&record).unwrap(),
            "Complete 16-bit service UUIDs: 0000180f-0000-1000-8000-00805f9b34fb (Battery Service)"
        );

        let continuity = Uuid::parse_str("d0611e78-bbb4-4591-a5f8-487910ae4366").unwrap();
        let record = AdvertisementRecord::new(
            AdType::UuidsIncomplete128Bit,
            continuity.as_u128().to_le_bytes(),
        );
        assert_eq!(
            describe_record(&record).unwrap(),
            "Incomplete 128-bit service UUIDs: d0611e78-bbb4-4591-a5f8-487910ae4366 (Apple Continuity Service)"
        );

        let odd = AdvertisementRecord::new(AdType::UuidsComplete16Bit, [0x0F]);
        assert!(describe_record(&odd).is_err());
    }

    #[test]
    fn test_describe_other_record() {
        let record = AdvertisementRecord::new(AdType::Other(0x16), [0x0F, 0x18, 0x64]);
        assert_eq!(
            describe_record(&record).unwrap(),
            "Type 0x16: data: 0F-18-64"
        );
    }
}
