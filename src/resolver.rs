use std::collections::HashMap;
use tracing::debug;

use crate::manufacturer::apple_device_type;

/// Display name returned when nothing better is known
pub const UNKNOWN_DEVICE: &str = "unknown device";

/// Prefix of the generic names some stacks report for devices whose name is not resolved yet
pub const PLACEHOLDER_NAME_PREFIX: &str = "Bluetooth";

/// Whether `name` is a usable device name
///
/// Empty names and names starting with the literal, case-sensitive prefix
/// `"Bluetooth"` are placeholders.
#[must_use]
pub fn is_real_name(name: &str) -> bool {
    !name.is_empty() && !name.starts_with(PLACEHOLDER_NAME_PREFIX)
}

/// Derives display names for discovered devices and remembers the real names seen per device
///
/// One resolver belongs to one scan session. It is not shared between threads; concurrent
/// sessions each own their own resolver.
#[derive(Debug, Default)]
pub struct DisplayNameResolver {
    aliases: HashMap<String, Vec<String>>,
}

impl DisplayNameResolver {
    /// Create a resolver with empty alias memory
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the display name of `device_id`
    ///
    /// In order:
    /// 1. a real `local_name` is remembered as an alias and returned;
    /// 2. for Apple manufacturer data with a continuity type byte, the first alias
    ///    remembered for the device, or else the continuity category label;
    /// 3. [`UNKNOWN_DEVICE`].
    pub fn resolve_display_name(
        &mut self,
        device_id: &str,
        local_name: Option<&str>,
        manufacturer_data: Option<&[u8]>,
    ) -> String {
        if let Some(name) = local_name.filter(|name| is_real_name(name)) {
            self.remember(device_id, name);
            return name.to_string();
        }

        if let Some(device_type) = manufacturer_data.and_then(apple_device_type) {
            return self
                .first_alias(device_id)
                .map_or_else(|| device_type.to_string(), str::to_string);
        }

        UNKNOWN_DEVICE.to_string()
    }

    /// Real names seen for `device_id`, in the order they were first observed
    #[must_use]
    pub fn aliases(&self, device_id: &str) -> &[String] {
        self.aliases
            .get(device_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The first real name seen for `device_id`
    #[must_use]
    pub fn first_alias(&self, device_id: &str) -> Option<&str> {
        self.aliases(device_id).first().map(String::as_str)
    }

    /// Number of devices with at least one remembered alias
    #[must_use]
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no alias has been remembered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Forget all aliases (end of session)
    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    fn remember(&mut self, device_id: &str, name: &str) {
        let names = self.aliases.entry(device_id.to_string()).or_default();
        if !names.iter().any(|known| known == name) {
            debug!("Learned alias {:?} for device {}", name, device_id);
            names.push(name.to_string());
        }
    }
}
