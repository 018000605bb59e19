//! Static name tables for GATT services, GATT characteristics and company identifiers.
//!
//! Lookups are total: an identifier missing from a table renders through a fixed
//! `unknown` fallback instead of failing. UUID keys are full 128-bit, lowercase,
//! hyphenated strings; inputs are matched case-insensitively.

use uuid::Uuid;

/// Bluetooth SIG company identifier assigned to Apple Inc.
pub const APPLE_COMPANY_ID: u16 = 0x004C;

/// The Bluetooth base UUID `00000000-0000-1000-8000-00805f9b34fb`
pub const BLUETOOTH_BASE_UUID: Uuid = Uuid::from_u128(0x0000_0000_0000_1000_8000_0080_5F9B_34FB);

const UUID16_MASK: u128 = 0xFFFF_FFFF << 96;

/// Known GATT services
pub static SERVICES: &[(&str, &str)] = &[
    // SIG-assigned
    ("00001800-0000-1000-8000-00805f9b34fb", "Generic Access"),
    ("00001801-0000-1000-8000-00805f9b34fb", "Generic Attribute"),
    ("00001805-0000-1000-8000-00805f9b34fb", "Current Time Service"),
    ("0000180a-0000-1000-8000-00805f9b34fb", "Device Information"),
    ("0000180f-0000-1000-8000-00805f9b34fb", "Battery Service"),
    // Apple
    ("d0611e78-bbb4-4591-a5f8-487910ae4366", "Apple Continuity Service"),
    ("9fa480e0-4967-4542-9390-d343dc5d04ae", "Apple Nearby Interaction"),
    ("7905f431-b5ce-4e99-a40f-4b1e122d00d0", "Apple Notification Center Service"),
    ("89d3502b-0f36-433a-8ef4-c502ad55f8dc", "Apple Media Service"),
];

/// Known GATT characteristics
pub static CHARACTERISTICS: &[(&str, &str)] = &[
    // SIG-assigned
    ("00002a00-0000-1000-8000-00805f9b34fb", "Device Name"),
    ("00002a01-0000-1000-8000-00805f9b34fb", "Appearance"),
    ("00002a05-0000-1000-8000-00805f9b34fb", "Service Changed"),
    ("00002a0f-0000-1000-8000-00805f9b34fb", "Local Time Information"),
    ("00002a19-0000-1000-8000-00805f9b34fb", "Battery Level"),
    ("00002a24-0000-1000-8000-00805f9b34fb", "Model Number String"),
    ("00002a29-0000-1000-8000-00805f9b34fb", "Manufacturer Name String"),
    ("00002a2b-0000-1000-8000-00805f9b34fb", "Current Time"),
    // Apple Continuity
    ("8667556c-9a37-4c91-84ed-54ee27d90049", "Apple Continuity Characteristic"),
    // Apple Nearby Interaction
    ("af0badb1-5b99-43cd-917a-a77bc549e3cc", "Apple Nearby Interaction Characteristic"),
    // Apple Notification Center Service
    ("69d1d8f3-45e1-49a8-9821-9bbdfdaad9d9", "Control Point"),
    ("9fbf120d-6301-42d9-8c58-25e699a21dbd", "Notification Source"),
    ("22eac6e9-24d6-4bb5-be44-b36ace7c7bfb", "Data Source"),
    // Apple Media Service
    ("9b3c81d8-57b1-4a8a-b8df-0e56f7ca51c2", "Remote Command"),
    ("2f7cabce-808d-411f-9a0c-bb92ba96c102", "Entity Update"),
    ("c6b2f38c-23ab-46d8-a6ab-a3a870bbd5d7", "Entity Attribute"),
];

/// Known company identifiers
pub static COMPANIES: &[(u16, &str)] = &[
    (APPLE_COMPANY_ID, "Apple Inc."),
    (0x0059, "Nordic Semiconductor"),
    (0x0075, "Samsung Electronics"),
    (0x0087, "Garmin"),
    (0x0157, "Xiaomi"),
    (0x0499, "Ruuvi Innovations Ltd"),
    (0x06D6, "Bosch Sensortec GmbH"),
    (0x0822, "Telink Semiconductor"),
];

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(uuid, _)| uuid.eq_ignore_ascii_case(key))
        .map(|(_, name)| *name)
}

/// Name of a known service
#[must_use]
pub fn service_name(uuid: &str) -> Option<&'static str> {
    lookup(SERVICES, uuid)
}

/// Name of a known characteristic
#[must_use]
pub fn characteristic_name(uuid: &str) -> Option<&'static str> {
    lookup(CHARACTERISTICS, uuid)
}

/// Describe a service UUID as `"<uuid> (<name>)"`
///
/// The UUID is echoed in lowercase. Unknown services render as
/// `"<uuid> (unknown service)"`.
#[must_use]
pub fn describe_service(uuid: &str) -> String {
    let uuid = uuid.to_ascii_lowercase();
    let name = service_name(&uuid).unwrap_or("unknown service");
    format!("{uuid} ({name})")
}

/// Describe a characteristic UUID as `"<uuid> (<name>)"`
///
/// Unknown characteristics render as `"<uuid> (unknown characteristic)"`.
#[must_use]
pub fn describe_characteristic(uuid: &str) -> String {
    let uuid = uuid.to_ascii_lowercase();
    let name = characteristic_name(&uuid).unwrap_or("unknown characteristic");
    format!("{uuid} ({name})")
}

/// [`describe_service`] for a parsed UUID
#[must_use]
pub fn describe_service_uuid(uuid: &Uuid) -> String {
    describe_service(&uuid.to_string())
}

/// [`describe_characteristic`] for a parsed UUID
#[must_use]
pub fn describe_characteristic_uuid(uuid: &Uuid) -> String {
    describe_characteristic(&uuid.to_string())
}

/// Name of a known company
#[must_use]
pub fn lookup_company(company_id: u16) -> Option<&'static str> {
    COMPANIES
        .iter()
        .find(|(id, _)| *id == company_id)
        .map(|(_, name)| *name)
}

/// Company name, or `"unknown (0xXXXX)"`
#[must_use]
pub fn company_name(company_id: u16) -> String {
    lookup_company(company_id).map_or_else(|| unknown_company(company_id), str::to_string)
}

/// Describe a company identifier as `"0xXXXX (<name>)"`, or `"unknown (0xXXXX)"`
#[must_use]
pub fn describe_company(company_id: u16) -> String {
    lookup_company(company_id).map_or_else(
        || unknown_company(company_id),
        |name| format!("0x{company_id:04X} ({name})"),
    )
}

fn unknown_company(company_id: u16) -> String {
    format!("unknown (0x{company_id:04X})")
}

/// Expand a 16-bit SIG UUID into its full 128-bit form using the Bluetooth base UUID
#[must_use]
pub const fn uuid_from_u16(short: u16) -> Uuid {
    Uuid::from_u128(BLUETOOTH_BASE_UUID.as_u128() | ((short as u128) << 96))
}

/// The 16-bit short form of `uuid`, if it derives from the Bluetooth base UUID
#[must_use]
pub fn short_uuid(uuid: &Uuid) -> Option<u16> {
    let value = uuid.as_u128();
    if value & !UUID16_MASK != BLUETOOTH_BASE_UUID.as_u128() {
        return None;
    }
    u16::try_from(value >> 96).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_service_is_case_insensitive() {
        assert_eq!(
            describe_service("0000180F-0000-1000-8000-00805F9B34FB"),
            "0000180f-0000-1000-8000-00805f9b34fb (Battery Service)"
        );
    }

    #[test]
    fn test_unknown_service_and_characteristic() {
        let uuid = "12345678-0000-1000-8000-00805f9b34fb";
        assert_eq!(describe_service(uuid), format!("{uuid} (unknown service)"));
        assert_eq!(
            describe_characteristic(uuid),
            format!("{uuid} (unknown characteristic)")
        );
    }

    #[test]
    fn test_every_catalog_entry_round_trips() {
        for (uuid, name) in SERVICES {
            let described = describe_service(&uuid.to_ascii_uppercase());
            assert!(described.to_lowercase().contains(uuid), "{described}");
            assert!(described.contains(name), "{described}");
        }
        for (uuid, name) in CHARACTERISTICS {
            let described = describe_characteristic(&uuid.to_ascii_uppercase());
            assert!(described.to_lowercase().contains(uuid), "{described}");
            assert!(described.contains(name), "{described}");
        }
    }

    #[test]
    fn test_catalog_keys_parse_as_uuids() {
        for (uuid, _) in SERVICES.iter().chain(CHARACTERISTICS) {
            let parsed = Uuid::parse_str(uuid);
            assert!(parsed.is_ok(), "{uuid}");
            assert_eq!(parsed.map(|u| u.to_string()).ok().as_deref(), Some(*uuid));
        }
    }

    #[test]
    fn test_company_lookups() {
        assert_eq!(company_name(APPLE_COMPANY_ID), "Apple Inc.");
        assert_eq!(describe_company(0x0059), "0x0059 (Nordic Semiconductor)");
        assert_eq!(company_name(0xBEEF), "unknown (0xBEEF)");
    }

    #[test]
    fn test_unknown_company_contains_uppercase_hex_id() {
        let known: Vec<u16> = COMPANIES.iter().map(|(id, _)| *id).collect();
        for company_id in (0..=u16::MAX).step_by(97).filter(|id| !known.contains(id)) {
            let described = describe_company(company_id);
            assert!(described.contains(&format!("{company_id:04X}")), "{described}");
            assert!(described.starts_with("unknown"));
        }
    }

    #[test]
    fn test_uuid16_expansion() {
        let battery = uuid_from_u16(0x180F);
        assert_eq!(battery.to_string(), "0000180f-0000-1000-8000-00805f9b34fb");
        assert_eq!(
            describe_service_uuid(&battery),
            "0000180f-0000-1000-8000-00805f9b34fb (Battery Service)"
        );
        assert_eq!(short_uuid(&battery), Some(0x180F));
    }

    #[test]
    fn test_short_uuid_rejects_vendor_uuids() {
        let apple = Uuid::parse_str("d0611e78-bbb4-4591-a5f8-487910ae4366").ok();
        assert_eq!(apple.as_ref().and_then(short_uuid), None);

        let uuid32 = Uuid::from_u128(BLUETOOTH_BASE_UUID.as_u128() | (0x0001_0000_u128 << 96));
        assert_eq!(short_uuid(&uuid32), None);
    }
}
