//! GATT inventory of a connected device, rendered with catalog names.

use btleplug::api::{CharPropFlags, Characteristic, Service};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::{describe_characteristic_uuid, describe_service_uuid};

/// One characteristic of a discovered service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacteristicDump {
    /// Characteristic UUID
    pub uuid: Uuid,
    /// `"<uuid> (<name>)"`
    pub description: String,
    /// Supports reads
    pub readable: bool,
    /// Supports writes, with or without response
    pub writable: bool,
    /// Supports notifications or indications
    pub notifiable: bool,
}

impl CharacteristicDump {
    /// Build from a btleplug characteristic
    #[must_use]
    pub fn from_characteristic(characteristic: &Characteristic) -> Self {
        let properties = characteristic.properties;
        Self {
            uuid: characteristic.uuid,
            description: describe_characteristic_uuid(&characteristic.uuid),
            readable: properties.contains(CharPropFlags::READ),
            writable: properties
                .intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE),
            notifiable: properties.intersects(CharPropFlags::NOTIFY | CharPropFlags::INDICATE),
        }
    }
}

impl fmt::Display for CharacteristicDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "     Characteristic: {}", self.description)?;
        writeln!(f, "       readable: {}", self.readable)?;
        writeln!(f, "       writable: {}", self.writable)?;
        write!(f, "       notifiable: {}", self.notifiable)
    }
}

/// One discovered service and its characteristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDump {
    /// Service UUID
    pub uuid: Uuid,
    /// `"<uuid> (<name>)"`
    pub description: String,
    /// Characteristics in UUID order
    pub characteristics: Vec<CharacteristicDump>,
}

impl ServiceDump {
    /// Build from a btleplug service
    #[must_use]
    pub fn from_service(service: &Service) -> Self {
        Self {
            uuid: service.uuid,
            description: describe_service_uuid(&service.uuid),
            characteristics: service
                .characteristics
                .iter()
                .map(CharacteristicDump::from_characteristic)
                .collect(),
        }
    }
}

impl fmt::Display for ServiceDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   Service: {}", self.description)?;
        for characteristic in &self.characteristics {
            write!(f, "\n{characteristic}")?;
        }
        Ok(())
    }
}
