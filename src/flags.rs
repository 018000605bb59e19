use crate::{
    error::{BleDumpError, Result},
    types::FlagsReport,
};

/// Meaning of one bit of the "Flags" AD field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagBit {
    /// Bit position, 0 = least significant
    pub bit: u8,
    /// Name used in decoded reports
    pub name: &'static str,
    /// What an asserted bit says about the advertiser
    pub description: &'static str,
    /// Typical device advertising with this bit set
    pub example: &'static str,
}

impl FlagBit {
    /// Mask selecting this bit
    #[must_use]
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// The defined bits of the Flags AD field (Core Specification Supplement, Part A, 1.3)
///
/// Bits 5 to 7 are reserved and never reported.
pub static FLAG_BITS: [FlagBit; 5] = [
    FlagBit {
        bit: 0,
        name: "LE Limited Discoverable Mode",
        description: "Discoverable for a limited period only",
        example: "A fitness tracker right after power-up, waiting for first pairing",
    },
    FlagBit {
        bit: 1,
        name: "LE General Discoverable Mode",
        description: "Discoverable by any scanning device for as long as it advertises",
        example: "A smart bulb that is always reachable from its companion app",
    },
    FlagBit {
        bit: 2,
        name: "BR/EDR Not Supported",
        description: "LE only, no classic Bluetooth",
        example: "A heart-rate strap",
    },
    FlagBit {
        bit: 3,
        name: "Simultaneous LE and BR/EDR (Controller)",
        description: "The controller runs LE and classic Bluetooth at the same time",
        example: "A phone or laptop radio",
    },
    FlagBit {
        bit: 4,
        name: "Simultaneous LE and BR/EDR (Host)",
        description: "The host stack runs LE and classic Bluetooth at the same time",
        example: "A phone or laptop operating system",
    },
];

impl FlagsReport {
    /// Decode a flags octet
    #[must_use]
    pub fn from_byte(raw: u8) -> Self {
        let set_bits = FLAG_BITS
            .iter()
            .filter(|flag| raw & flag.mask() != 0)
            .map(|flag| flag.name.to_string())
            .collect();

        Self { raw, set_bits }
    }
}

/// Decode the payload of a Flags AD record
///
/// # Errors
///
/// Returns [`BleDumpError::InvalidLength`] if `data` is empty.
pub fn decode_flags(data: &[u8]) -> Result<FlagsReport> {
    let raw = *data
        .first()
        .ok_or_else(|| BleDumpError::invalid_length("flags", "at least 1", data.len()))?;
    Ok(FlagsReport::from_byte(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags() {
        let report = decode_flags(&[0x00]).unwrap();
        assert_eq!(report.raw, 0);
        assert!(report.set_bits.is_empty());
    }

    #[test]
    fn test_general_discoverable_le_only() {
        let report = decode_flags(&[0x06]).unwrap();
        assert_eq!(
            report.set_bits,
            vec!["LE General Discoverable Mode", "BR/EDR Not Supported"]
        );
        assert_eq!(report.hex(), "0x06");
        assert_eq!(report.binary(), "00000110");
    }

    #[test]
    fn test_all_defined_bits_in_ascending_order() {
        let report = FlagsReport::from_byte(0x1F);
        let expected: Vec<&str> = FLAG_BITS.iter().map(|flag| flag.name).collect();
        assert_eq!(report.set_bits, expected);
    }

    #[test]
    fn test_reserved_bits_are_ignored() {
        let report = FlagsReport::from_byte(0xE0);
        assert!(report.set_bits.is_empty());
        assert_eq!(report.raw, 0xE0);

        let mixed = FlagsReport::from_byte(0xE1);
        assert_eq!(mixed.set_bits, vec!["LE Limited Discoverable Mode"]);
    }

    #[test]
    fn test_empty_input_is_invalid_length() {
        let error = decode_flags(&[]).unwrap_err();
        assert!(matches!(
            error,
            BleDumpError::InvalidLength {
                field: "flags",
                actual: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_flag_bit_masks() {
        let masks: Vec<u8> = FLAG_BITS.iter().map(FlagBit::mask).collect();
        assert_eq!(masks, vec![0x01, 0x02, 0x04, 0x08, 0x10]);
    }
}
