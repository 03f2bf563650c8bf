// Decoding of characteristic payloads read from a cube

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};

/// Everything `Cube::information` reads from the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    pub appearance: u64,
    pub serial_number: String,
    pub firmware: String,
    pub hardware: String,
    pub software: String,
    pub battery_voltage: String,
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Device information:")?;
        writeln!(f, "    Name: {}", self.name)?;
        writeln!(f, "    Appearance code: {}", self.appearance)?;
        writeln!(f, "    Serial number: {}", self.serial_number)?;
        writeln!(f, "    Firmware: {}", self.firmware)?;
        writeln!(f, "    Hardware: {}", self.hardware)?;
        writeln!(f, "    Software: {}", self.software)?;
        write!(f, "    Battery voltage: {}", self.battery_voltage)
    }
}

/// UTF-8 text with trailing NUL padding removed
pub fn decode_text(field: &'static str, bytes: &[u8]) -> Result<String> {
    let text = std::str::from_utf8(bytes).map_err(|e| CubeError::Decode {
        field,
        reason: e.to_string(),
    })?;
    Ok(text.trim_end_matches('\0').to_string())
}

/// Big-endian unsigned integer of up to 8 bytes; empty payload decodes to 0
pub fn decode_be_uint(field: &'static str, bytes: &[u8]) -> Result<u64> {
    if bytes.len() > 8 {
        return Err(CubeError::Decode {
            field,
            reason: format!("expected at most 8 bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64))
}
