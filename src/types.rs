use serde::{Deserialize, Serialize};
use std::fmt;

/// AD type of a single advertisement record
///
/// Codes follow the Bluetooth SIG "Assigned Numbers" list of common data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdType {
    /// Flags (0x01)
    Flags,
    /// Complete list of 16-bit service class UUIDs (0x03)
    UuidsComplete16Bit,
    /// Incomplete list of 128-bit service class UUIDs (0x06)
    UuidsIncomplete128Bit,
    /// Complete list of 128-bit service class UUIDs (0x07)
    UuidsComplete128Bit,
    /// Complete local name (0x09)
    CompleteLocalName,
    /// TX power level (0x0A)
    TxPowerLevel,
    /// Manufacturer specific data (0xFF)
    ManufacturerSpecificData,
    /// Any other AD type, carrying its raw code
    Other(u8),
}

impl AdType {
    /// Raw AD type code
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::Flags => 0x01,
            Self::UuidsComplete16Bit => 0x03,
            Self::UuidsIncomplete128Bit => 0x06,
            Self::UuidsComplete128Bit => 0x07,
            Self::CompleteLocalName => 0x09,
            Self::TxPowerLevel => 0x0A,
            Self::ManufacturerSpecificData => 0xFF,
            Self::Other(code) => code,
        }
    }
}

impl From<u8> for AdType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::Flags,
            0x03 => Self::UuidsComplete16Bit,
            0x06 => Self::UuidsIncomplete128Bit,
            0x07 => Self::UuidsComplete128Bit,
            0x09 => Self::CompleteLocalName,
            0x0A => Self::TxPowerLevel,
            0xFF => Self::ManufacturerSpecificData,
            other => Self::Other(other),
        }
    }
}

impl fmt::Display for AdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flags => write!(f, "Flags"),
            Self::UuidsComplete16Bit => write!(f, "Complete 16-bit service UUIDs"),
            Self::UuidsIncomplete128Bit => write!(f, "Incomplete 128-bit service UUIDs"),
            Self::UuidsComplete128Bit => write!(f, "Complete 128-bit service UUIDs"),
            Self::CompleteLocalName => write!(f, "Complete local name"),
            Self::TxPowerLevel => write!(f, "TX power level"),
            Self::ManufacturerSpecificData => write!(f, "Manufacturer data"),
            Self::Other(code) => write!(f, "Type 0x{code:02X}"),
        }
    }
}

/// One typed field of a received advertisement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementRecord {
    /// AD type of the record
    pub ad_type: AdType,
    /// Record payload, without the length and type octets
    pub data: Vec<u8>,
}

impl AdvertisementRecord {
    /// Create a new advertisement record
    #[must_use]
    pub fn new(ad_type: AdType, data: impl Into<Vec<u8>>) -> Self {
        Self {
            ad_type,
            data: data.into(),
        }
    }
}

/// Decoded "Flags" AD field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagsReport {
    /// The raw flags octet
    pub raw: u8,
    /// Names of the asserted bits, lowest bit first
    pub set_bits: Vec<String>,
}

impl FlagsReport {
    /// Raw octet as `0xHH`
    #[must_use]
    pub fn hex(&self) -> String {
        format!("0x{:02X}", self.raw)
    }

    /// Raw octet as eight binary digits
    #[must_use]
    pub fn binary(&self) -> String {
        format!("{:08b}", self.raw)
    }
}

impl fmt::Display for FlagsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (binary: {})", self.hex(), self.binary())?;
        if self.set_bits.is_empty() {
            write!(f, " [no flags set]")
        } else {
            write!(f, " [set flags]: {}", self.set_bits.join(", "))
        }
    }
}

/// Apple continuity message type carried in byte 2 of Apple manufacturer data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppleDeviceType {
    /// iBeacon (0x01)
    IBeacon,
    /// AirPrint (0x02)
    AirPrint,
    /// AirPlay (0x03)
    AirPlay,
    /// Apple TV (0x04)
    AppleTv,
    /// AirDrop (0x05)
    AirDrop,
    /// HomeKit (0x06)
    HomeKit,
    /// Unpaired AirPods (0x07)
    UnpairedAirPods,
    /// Siri device (0x08)
    SiriDevice,
    /// Unpaired AirPods, second advertisement form (0x09)
    UnpairedAirPodsVariant,
    /// Unpaired AirPods Pro (0x0A)
    UnpairedAirPodsPro,
    /// Unpaired AirPods Max (0x0B)
    UnpairedAirPodsMax,
    /// Find My (0x0C)
    FindMy,
    /// Unpaired AirTag (0x0D)
    UnpairedAirTag,
    /// MagSafe (0x0E)
    MagSafe,
    /// Unpaired accessory (0x0F)
    UnpairedAccessory,
    /// Accessory awaiting pairing (0x10)
    AccessoryAwaitingPairing,
    /// Any other type byte
    Unknown(u8),
}

impl AppleDeviceType {
    /// Raw type byte
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::IBeacon => 0x01,
            Self::AirPrint => 0x02,
            Self::AirPlay => 0x03,
            Self::AppleTv => 0x04,
            Self::AirDrop => 0x05,
            Self::HomeKit => 0x06,
            Self::UnpairedAirPods => 0x07,
            Self::SiriDevice => 0x08,
            Self::UnpairedAirPodsVariant => 0x09,
            Self::UnpairedAirPodsPro => 0x0A,
            Self::UnpairedAirPodsMax => 0x0B,
            Self::FindMy => 0x0C,
            Self::UnpairedAirTag => 0x0D,
            Self::MagSafe => 0x0E,
            Self::UnpairedAccessory => 0x0F,
            Self::AccessoryAwaitingPairing => 0x10,
            Self::Unknown(code) => code,
        }
    }

    /// Whether the byte following the type byte is a subtype for this type
    #[must_use]
    pub const fn has_sub_types(self) -> bool {
        matches!(self, Self::UnpairedAirPods | Self::UnpairedAirTag)
    }
}

impl From<u8> for AppleDeviceType {
    fn from(value: u8) -> Self {
        match value {
            0x01 => Self::IBeacon,
            0x02 => Self::AirPrint,
            0x03 => Self::AirPlay,
            0x04 => Self::AppleTv,
            0x05 => Self::AirDrop,
            0x06 => Self::HomeKit,
            0x07 => Self::UnpairedAirPods,
            0x08 => Self::SiriDevice,
            0x09 => Self::UnpairedAirPodsVariant,
            0x0A => Self::UnpairedAirPodsPro,
            0x0B => Self::UnpairedAirPodsMax,
            0x0C => Self::FindMy,
            0x0D => Self::UnpairedAirTag,
            0x0E => Self::MagSafe,
            0x0F => Self::UnpairedAccessory,
            0x10 => Self::AccessoryAwaitingPairing,
            other => Self::Unknown(other),
        }
    }
}

impl fmt::Display for AppleDeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IBeacon => write!(f, "iBeacon"),
            Self::AirPrint => write!(f, "AirPrint"),
            Self::AirPlay => write!(f, "AirPlay"),
            Self::AppleTv => write!(f, "Apple TV"),
            Self::AirDrop => write!(f, "AirDrop"),
            Self::HomeKit => write!(f, "HomeKit"),
            Self::UnpairedAirPods | Self::UnpairedAirPodsVariant => write!(f, "unpaired AirPods"),
            Self::SiriDevice => write!(f, "Siri device"),
            Self::UnpairedAirPodsPro => write!(f, "unpaired AirPods Pro"),
            Self::UnpairedAirPodsMax => write!(f, "unpaired AirPods Max"),
            Self::FindMy => write!(f, "Find My"),
            Self::UnpairedAirTag => write!(f, "unpaired AirTag"),
            Self::MagSafe => write!(f, "MagSafe"),
            Self::UnpairedAccessory => write!(f, "unpaired accessory"),
            Self::AccessoryAwaitingPairing => write!(f, "accessory awaiting pairing"),
            Self::Unknown(code) => write!(f, "unknown Apple type (0x{code:02X})"),
        }
    }
}

/// Refinement of an [`AppleDeviceType`] carried in byte 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppleSubType {
    /// AirPods: initial pairing
    InitialPairing,
    /// AirPods: reconnect pairing
    ReconnectPairing,
    /// AirPods: active pairing
    ActivePairing,
    /// AirTag: setup mode
    SetupMode,
    /// AirTag: lost mode
    LostMode,
    /// AirTag: nearby mode
    NearbyMode,
    /// Subtype byte not in the table of a subtype-carrying type
    Unknown(u8),
}

impl AppleSubType {
    /// Decode the subtype byte for `device_type`
    ///
    /// Returns `None` when `device_type` defines no subtype table.
    #[must_use]
    pub const fn decode(device_type: AppleDeviceType, value: u8) -> Option<Self> {
        let sub_type = match (device_type, value) {
            (AppleDeviceType::UnpairedAirPods, 0x01) => Self::InitialPairing,
            (AppleDeviceType::UnpairedAirPods, 0x02) => Self::ReconnectPairing,
            (AppleDeviceType::UnpairedAirPods, 0x03) => Self::ActivePairing,
            (AppleDeviceType::UnpairedAirTag, 0x01) => Self::SetupMode,
            (AppleDeviceType::UnpairedAirTag, 0x02) => Self::LostMode,
            (AppleDeviceType::UnpairedAirTag, 0x03) => Self::NearbyMode,
            (AppleDeviceType::UnpairedAirPods | AppleDeviceType::UnpairedAirTag, other) => {
                Self::Unknown(other)
            }
            _ => return None,
        };
        Some(sub_type)
    }
}

impl fmt::Display for AppleSubType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InitialPairing => write!(f, "initial pairing"),
            Self::ReconnectPairing => write!(f, "reconnect pairing"),
            Self::ActivePairing => write!(f, "active pairing"),
            Self::SetupMode => write!(f, "setup mode"),
            Self::LostMode => write!(f, "lost mode"),
            Self::NearbyMode => write!(f, "nearby mode"),
            Self::Unknown(code) => write!(f, "unknown subtype (0x{code:02X})"),
        }
    }
}

/// Decoded manufacturer specific data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturerDataReport {
    /// Bluetooth SIG company identifier
    pub company_id: u16,
    /// Company name, or `unknown (0xXXXX)`
    pub company_name: String,
    /// Apple continuity type, for Apple payloads of at least 3 bytes
    pub apple_device_type: Option<AppleDeviceType>,
    /// Apple continuity subtype, for types that define one
    pub apple_sub_type: Option<AppleSubType>,
    /// Undecoded trailing bytes as an uppercase dash-separated hex dump
    pub remainder_hex: String,
}

impl fmt::Display for ManufacturerDataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.company_name)?;
        if let Some(device_type) = self.apple_device_type {
            write!(f, " - {device_type}")?;
        }
        if let Some(sub_type) = self.apple_sub_type {
            write!(f, " - {sub_type}")?;
        }
        write!(f, ", data: {}", self.remainder_hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ad_type_from_u8() {
        assert_eq!(AdType::from(0x01), AdType::Flags);
        assert_eq!(AdType::from(0xFF), AdType::ManufacturerSpecificData);
        assert_eq!(AdType::from(0x16), AdType::Other(0x16));
        assert_eq!(AdType::from(0x16).code(), 0x16);
        assert_eq!(AdType::TxPowerLevel.code(), 0x0A);
    }

    #[test]
    fn test_apple_device_type_from_u8() {
        assert_eq!(AppleDeviceType::from(0x0C), AppleDeviceType::FindMy);
        assert_eq!(AppleDeviceType::from(0x0D).code(), 0x0D);
        assert_eq!(AppleDeviceType::from(0x42), AppleDeviceType::Unknown(0x42));
        assert_eq!(
            AppleDeviceType::from(0x42).to_string(),
            "unknown Apple type (0x42)"
        );
    }

    #[test]
    fn test_sub_types_only_for_airpods_and_airtag() {
        for code in 0x00..=0xFF_u8 {
            let device_type = AppleDeviceType::from(code);
            assert_eq!(
                AppleSubType::decode(device_type, 0x01).is_some(),
                code == 0x07 || code == 0x0D,
                "type 0x{code:02X}"
            );
        }
    }

    #[test]
    fn test_sub_type_tables() {
        assert_eq!(
            AppleSubType::decode(AppleDeviceType::UnpairedAirPods, 0x02),
            Some(AppleSubType::ReconnectPairing)
        );
        assert_eq!(
            AppleSubType::decode(AppleDeviceType::UnpairedAirTag, 0x02),
            Some(AppleSubType::LostMode)
        );
        assert_eq!(
            AppleSubType::decode(AppleDeviceType::UnpairedAirTag, 0x09),
            Some(AppleSubType::Unknown(0x09))
        );
    }

    #[test]
    fn test_flags_report_display() {
        let report = FlagsReport {
            raw: 0x06,
            set_bits: vec![
                "LE General Discoverable Mode".to_string(),
                "BR/EDR Not Supported".to_string(),
            ],
        };
        assert_eq!(
            report.to_string(),
            "0x06 (binary: 00000110) [set flags]: LE General Discoverable Mode, BR/EDR Not Supported"
        );

        let empty = FlagsReport {
            raw: 0,
            set_bits: Vec::new(),
        };
        assert_eq!(empty.to_string(), "0x00 (binary: 00000000) [no flags set]");
    }
}
