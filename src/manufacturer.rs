use bytes::Buf;

use crate::{
    catalog::{self, APPLE_COMPANY_ID},
    error::{BleDumpError, Result},
    types::{AppleDeviceType, AppleSubType, ManufacturerDataReport},
};

/// Render bytes in wire order as uppercase, dash-separated hex (`"AA-BB"`)
#[must_use]
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|byte| format!("{byte:02X}"))
        .collect::<Vec<_>>()
        .join("-")
}

/// Decode a manufacturer specific data buffer
///
/// Layout:
/// - Bytes 0-1: company identifier (u16 little-endian)
/// - Byte 2: Apple continuity type, for company `0x004C` only
/// - Byte 3: Apple continuity subtype, for the AirPods and AirTag pairing types only
/// - Remaining bytes: opaque payload, dumped as hex in wire order
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if `data` is shorter than the 2-byte company id.
pub fn decode_manufacturer_data(data: &[u8]) -> Result<ManufacturerDataReport> {
    if data.len() < 2 {
        return Err(BleDumpError::invalid_length(
            "manufacturer data",
            "at least 2",
            data.len(),
        ));
    }

    let mut buf = data;
    let company_id = buf.get_u16_le();

    let mut apple_device_type = None;
    let mut apple_sub_type = None;
    if company_id == APPLE_COMPANY_ID && buf.has_remaining() {
        let device_type = AppleDeviceType::from(buf.get_u8());
        if device_type.has_sub_types() && buf.has_remaining() {
            apple_sub_type = AppleSubType::decode(device_type, buf.get_u8());
        }
        apple_device_type = Some(device_type);
    }

    Ok(ManufacturerDataReport {
        company_id,
        company_name: catalog::company_name(company_id),
        apple_device_type,
        apple_sub_type,
        remainder_hex: hex_dump(buf),
    })
}

/// The Apple continuity type of a manufacturer data buffer, if it carries one
#[must_use]
pub fn apple_device_type(data: &[u8]) -> Option<AppleDeviceType> {
    match data {
        [low, high, device_type, ..] if u16::from_le_bytes([*low, *high]) == APPLE_COMPANY_ID => {
            Some(AppleDeviceType::from(*device_type))
        }
        _ => None,
    }
}
