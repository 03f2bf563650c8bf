// BLE identifiers exposed by a Circuit Cube
//
// The UUIDs are grouped by the service they belong to. `Constants` keeps the
// numbered table (address slot at 0, UUIDs at 1..=28) for callers that still
// address entries by index.

use uuid::{Uuid, uuid};

use crate::error::{CubeError, Result};

/// Nordic UART-style service carrying motor and battery commands
pub mod uart {
    use super::*;

    pub const SERVICE: Uuid = uuid!("6e400001-b5a3-f393-e0a9-e50e24dcca9e");
    /// Write-without-response
    pub const TX: Uuid = uuid!("6e400002-b5a3-f393-e0a9-e50e24dcca9e");
    /// Notify
    pub const RX: Uuid = uuid!("6e400003-b5a3-f393-e0a9-e50e24dcca9e");
    pub const RX_CLIENT_CONFIG: Uuid = CLIENT_CHARACTERISTIC_CONFIG;
}

/// Generic Access Profile
pub mod gap {
    use super::*;

    pub const SERVICE: Uuid = uuid!("00001800-0000-1000-8000-00805f9b34fb");
    pub const DEVICE_NAME: Uuid = uuid!("00002a00-0000-1000-8000-00805f9b34fb");
    pub const APPEARANCE: Uuid = uuid!("00002a01-0000-1000-8000-00805f9b34fb");
    pub const PERIPHERAL_PRIVACY: Uuid = uuid!("00002a02-0000-1000-8000-00805f9b34fb");
}

/// Generic Attribute Profile
pub mod gatt {
    use super::*;

    pub const SERVICE: Uuid = uuid!("00001801-0000-1000-8000-00805f9b34fb");
    /// Indicate
    pub const SERVICE_CHANGED: Uuid = uuid!("00002a05-0000-1000-8000-00805f9b34fb");
    pub const CLIENT_CONFIG: Uuid = CLIENT_CHARACTERISTIC_CONFIG;
}

/// Standard device information service, all characteristics read-only
pub mod device_information {
    use super::*;

    pub const SERVICE: Uuid = uuid!("0000180a-0000-1000-8000-00805f9b34fb");
    pub const SYSTEM_ID: Uuid = uuid!("00002a23-0000-1000-8000-00805f9b34fb");
    pub const MODEL_NUMBER: Uuid = uuid!("00002a24-0000-1000-8000-00805f9b34fb");
    pub const SERIAL_NUMBER: Uuid = uuid!("00002a25-0000-1000-8000-00805f9b34fb");
    pub const FIRMWARE_REVISION: Uuid = uuid!("00002a26-0000-1000-8000-00805f9b34fb");
    pub const HARDWARE_REVISION: Uuid = uuid!("00002a27-0000-1000-8000-00805f9b34fb");
    pub const SOFTWARE_REVISION: Uuid = uuid!("00002a28-0000-1000-8000-00805f9b34fb");
    pub const MANUFACTURER_NAME: Uuid = uuid!("00002a29-0000-1000-8000-00805f9b34fb");
    pub const IEEE_REGULATORY_LIST: Uuid = uuid!("00002a2a-0000-1000-8000-00805f9b34fb");
    pub const PNP_ID: Uuid = uuid!("00002a50-0000-1000-8000-00805f9b34fb");
}

/// Undocumented vendor service; both characteristics support
/// write, write-without-response and notify
pub mod vendor {
    use super::*;

    pub const SERVICE: Uuid = uuid!("f000ffc0-0451-4000-b000-000000000000");
    pub const CHAR_1: Uuid = uuid!("f000ffc1-0451-4000-b000-000000000000");
    pub const CHAR_1_CLIENT_CONFIG: Uuid = CLIENT_CHARACTERISTIC_CONFIG;
    pub const CHAR_1_USER_DESCRIPTION: Uuid = CHARACTERISTIC_USER_DESCRIPTION;
    pub const CHAR_2: Uuid = uuid!("f000ffc2-0451-4000-b000-000000000000");
    pub const CHAR_2_CLIENT_CONFIG: Uuid = CLIENT_CHARACTERISTIC_CONFIG;
    pub const CHAR_2_USER_DESCRIPTION: Uuid = CHARACTERISTIC_USER_DESCRIPTION;
}

pub const CLIENT_CHARACTERISTIC_CONFIG: Uuid = uuid!("00002902-0000-1000-8000-00805f9b34fb");
pub const CHARACTERISTIC_USER_DESCRIPTION: Uuid = uuid!("00002901-0000-1000-8000-00805f9b34fb");

/// Number of entries in the table, address slot included
pub const TABLE_LEN: usize = 29;

/// Table entries 1..=28, in index order. Positions are fixed.
const UUID_TABLE: [(&str, Uuid); TABLE_LEN - 1] = [
    ("circuit cube service", uart::SERVICE),
    ("tx characteristic", uart::TX),
    ("rx characteristic", uart::RX),
    ("rx client characteristic config", uart::RX_CLIENT_CONFIG),
    ("gap service", gap::SERVICE),
    ("device name", gap::DEVICE_NAME),
    ("appearance", gap::APPEARANCE),
    ("peripheral privacy flag", gap::PERIPHERAL_PRIVACY),
    ("gatt service", gatt::SERVICE),
    ("service changed", gatt::SERVICE_CHANGED),
    ("gatt client characteristic config", gatt::CLIENT_CONFIG),
    ("device information service", device_information::SERVICE),
    ("system id", device_information::SYSTEM_ID),
    ("model number", device_information::MODEL_NUMBER),
    ("serial number", device_information::SERIAL_NUMBER),
    ("firmware revision", device_information::FIRMWARE_REVISION),
    ("hardware revision", device_information::HARDWARE_REVISION),
    ("software revision", device_information::SOFTWARE_REVISION),
    ("manufacturer name", device_information::MANUFACTURER_NAME),
    ("ieee regulatory list", device_information::IEEE_REGULATORY_LIST),
    ("pnp id", device_information::PNP_ID),
    ("vendor service", vendor::SERVICE),
    ("vendor characteristic 1", vendor::CHAR_1),
    ("vendor characteristic 1 client config", vendor::CHAR_1_CLIENT_CONFIG),
    ("vendor characteristic 1 user description", vendor::CHAR_1_USER_DESCRIPTION),
    ("vendor characteristic 2", vendor::CHAR_2),
    ("vendor characteristic 2 client config", vendor::CHAR_2_CLIENT_CONFIG),
    ("vendor characteristic 2 user description", vendor::CHAR_2_USER_DESCRIPTION),
];

/// Indexed view of the cube's identifiers plus the address of the connected cube
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constants {
    address: String,
}

impl Constants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry at `index`; 0 is the bluetooth address (empty until connected)
    pub fn get(&self, index: usize) -> Result<String> {
        match index {
            0 => Ok(self.address.clone()),
            i => UUID_TABLE
                .get(i - 1)
                .map(|(_, uuid)| uuid.to_string())
                .ok_or(CubeError::IndexOutOfRange(i)),
        }
    }

    pub fn set_address(&mut self, address: impl Into<String>) {
        self.address = address.into();
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn len(&self) -> usize {
        TABLE_LEN
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// All entries as (index, name, value)
    pub fn entries(&self) -> impl Iterator<Item = (usize, &'static str, String)> + '_ {
        std::iter::once((0, "bluetooth address", self.address.clone())).chain(
            UUID_TABLE
                .iter()
                .enumerate()
                .map(|(i, (name, uuid))| (i + 1, *name, uuid.to_string())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_positions() {
        let constants = Constants::new();
        assert_eq!(constants.get(0).unwrap(), "");
        assert_eq!(constants.get(1).unwrap(), "6e400001-b5a3-f393-e0a9-e50e24dcca9e");
        assert_eq!(constants.get(2).unwrap(), "6e400002-b5a3-f393-e0a9-e50e24dcca9e");
        assert_eq!(constants.get(3).unwrap(), "6e400003-b5a3-f393-e0a9-e50e24dcca9e");
        assert_eq!(constants.get(6).unwrap(), "00002a00-0000-1000-8000-00805f9b34fb");
        assert_eq!(constants.get(7).unwrap(), "00002a01-0000-1000-8000-00805f9b34fb");
        assert_eq!(constants.get(15).unwrap(), "00002a25-0000-1000-8000-00805f9b34fb");
        assert_eq!(constants.get(18).unwrap(), "00002a28-0000-1000-8000-00805f9b34fb");
        assert_eq!(constants.get(22).unwrap(), "f000ffc0-0451-4000-b000-000000000000");
        assert_eq!(constants.get(28).unwrap(), "00002901-0000-1000-8000-00805f9b34fb");
    }

    #[test]
    fn test_uuid_slots_filled() {
        let constants = Constants::new();
        for i in 1..TABLE_LEN {
            assert!(constants.get(i).unwrap().parse::<Uuid>().is_ok(), "slot {}", i);
        }
    }

    #[test]
    fn test_out_of_range() {
        let constants = Constants::new();
        assert!(matches!(constants.get(29), Err(CubeError::IndexOutOfRange(29))));
        assert!(constants.get(usize::MAX).is_err());
    }

    #[test]
    fn test_set_address() {
        let mut constants = Constants::new();
        constants.set_address("AA:BB:CC:DD:EE:FF");
        assert_eq!(constants.get(0).unwrap(), "AA:BB:CC:DD:EE:FF");
        assert_eq!(constants.address(), "AA:BB:CC:DD:EE:FF");
        // UUID entries are untouched
        assert_eq!(constants.get(1).unwrap(), uart::SERVICE.to_string());
    }

    #[test]
    fn test_entries_cover_table() {
        let constants = Constants::new();
        let entries: Vec<_> = constants.entries().collect();
        assert_eq!(entries.len(), constants.len());
        for (index, _, value) in entries {
            assert_eq!(constants.get(index).unwrap(), value);
        }
    }
}
