// src/common/types.rs

/// Sensor health as reported in the low two bits of a data report's first
/// status byte.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SensorStatus {
    /// Sensor is operating normally.
    Ok,
    /// Sensor has failed.
    Failure,
    /// Sensor element is aging.
    Aging,
    /// Bit pattern not defined by the protocol.
    Invalid,
}

impl SensorStatus {
    /// Decodes a status byte. Only the low two bits are significant:
    /// `00` → Ok, `01` → Failure, `11` → Aging, anything else → Invalid.
    pub fn from_byte(status: u8) -> Self {
        match status & 0b11 {
            0b00 => SensorStatus::Ok,
            0b01 => SensorStatus::Failure,
            0b11 => SensorStatus::Aging,
            _ => SensorStatus::Invalid,
        }
    }
}

/// Display format advertised in a sensor-info report, naming the digit
/// layout of the sensor's local readout.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum DisplayFormat {
    /// Value not on the protocol's whitelist.
    Invalid = 0,
    /// `#.###`
    F1_3 = 1,
    /// `##.##`
    F2_2 = 2,
    /// `###.#`
    F3_1 = 3,
    /// `####.`
    F4_0 = 4,
}

impl DisplayFormat {
    /// Decodes the display-format byte, mapping anything outside the
    /// enumerated whitelist to `Invalid`.
    pub fn from_byte(value: u8) -> Self {
        match value {
            1 => DisplayFormat::F1_3,
            2 => DisplayFormat::F2_2,
            3 => DisplayFormat::F3_1,
            4 => DisplayFormat::F4_0,
            _ => DisplayFormat::Invalid,
        }
    }

    /// Digits after the decimal point, or `None` for `Invalid`.
    pub fn decimals(&self) -> Option<u8> {
        match self {
            DisplayFormat::Invalid => None,
            DisplayFormat::F1_3 => Some(3),
            DisplayFormat::F2_2 => Some(2),
            DisplayFormat::F3_1 => Some(1),
            DisplayFormat::F4_0 => Some(0),
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_decoding_exhaustive() {
        // Exhaustive over the 2-bit field.
        assert_eq!(SensorStatus::from_byte(0b00), SensorStatus::Ok);
        assert_eq!(SensorStatus::from_byte(0b01), SensorStatus::Failure);
        assert_eq!(SensorStatus::from_byte(0b11), SensorStatus::Aging);
        assert_eq!(SensorStatus::from_byte(0b10), SensorStatus::Invalid);
    }

    #[test]
    fn test_status_ignores_high_bits() {
        assert_eq!(SensorStatus::from_byte(0b1111_1100), SensorStatus::Ok);
        assert_eq!(SensorStatus::from_byte(0b1010_1001), SensorStatus::Failure);
    }

    #[test]
    fn test_display_format_whitelist() {
        assert_eq!(DisplayFormat::from_byte(1), DisplayFormat::F1_3);
        assert_eq!(DisplayFormat::from_byte(2), DisplayFormat::F2_2);
        assert_eq!(DisplayFormat::from_byte(3), DisplayFormat::F3_1);
        assert_eq!(DisplayFormat::from_byte(4), DisplayFormat::F4_0);
        assert_eq!(DisplayFormat::from_byte(0), DisplayFormat::Invalid);
        assert_eq!(DisplayFormat::from_byte(5), DisplayFormat::Invalid);
        assert_eq!(DisplayFormat::from_byte(255), DisplayFormat::Invalid);
    }

    #[test]
    fn test_display_format_decimals() {
        assert_eq!(DisplayFormat::F1_3.decimals(), Some(3));
        assert_eq!(DisplayFormat::F4_0.decimals(), Some(0));
        assert_eq!(DisplayFormat::Invalid.decimals(), None);
    }
}
