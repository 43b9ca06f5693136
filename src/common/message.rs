// src/common/message.rs

//! The four fixed-layout SM70 wire messages.
//!
//! All frames are byte-exact records with an additive checksum in the last
//! byte (the whole frame sums to zero, see [`super::checksum`]). The two
//! outbound requests are 4-byte constants with checksums sealed at compile
//! time; the two inbound reports are validated and decoded here.

use super::checksum;
use super::error::WireError;
use super::types::{DisplayFormat, SensorStatus};

/// Header marker for host-origin frames.
pub const HDR_HOST: u8 = 0x55;
/// Header marker for sensor-origin frames.
pub const HDR_SENSOR: u8 = 0xAA;

/// Data report whose secondary data field is not valid.
pub const TYPE_DATA_REPORT2: u8 = 0x0F;
/// Primary data report (ozone field valid).
pub const TYPE_DATA_REPORT: u8 = 0x10;
/// Data request, host to sensor.
pub const TYPE_DATA_REQUEST: u8 = 0x1A;
/// Sensor-info request or report.
pub const TYPE_SENSOR_INFO: u8 = 0xFB;

const fn request_frame(msg_type: u8) -> [u8; 4] {
    [
        HDR_HOST,
        msg_type,
        0x00,
        checksum::seal(HDR_HOST.wrapping_add(msg_type)),
    ]
}

/// The constant data-request frame sent for every data poll.
///
/// The checksum byte is sealed at compile time and never recomputed at
/// send time; callers must not mutate this record.
pub const DATA_REQUEST_FRAME: [u8; 4] = request_frame(TYPE_DATA_REQUEST);

/// The constant sensor-info request frame.
pub const SENSOR_INFO_REQUEST_FRAME: [u8; 4] = request_frame(TYPE_SENSOR_INFO);

/// A 15-byte data report from the sensor.
///
/// Layout: header, type, 4-byte little-endian IEEE-754 ozone
/// concentration, 4-byte secondary data field (unused here), 2 reserved
/// bytes, 2 status bytes, checksum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DataReport {
    raw: [u8; Self::LEN],
}

impl DataReport {
    /// Wire size of a data report.
    pub const LEN: usize = 15;

    /// Wraps a raw 15-byte record. No validation is performed; call
    /// [`DataReport::validate`] before trusting the contents.
    pub fn from_bytes(raw: [u8; Self::LEN]) -> Self {
        Self { raw }
    }

    /// Checks the record: header, then type, then checksum, reporting the
    /// first violated condition.
    pub fn validate(&self) -> Result<(), WireError> {
        if self.raw[0] != HDR_SENSOR {
            return Err(WireError::BadHeader);
        }
        match self.raw[1] {
            TYPE_DATA_REPORT | TYPE_DATA_REQUEST | TYPE_DATA_REPORT2 => {}
            _ => return Err(WireError::BadType),
        }
        if !checksum::verify(&self.raw) {
            return Err(WireError::BadChecksum);
        }
        Ok(())
    }

    /// Whether the ozone field carries a real measurement. Only the
    /// primary data-report type does.
    pub fn is_ozone_valid(&self) -> bool {
        self.raw[1] == TYPE_DATA_REPORT
    }

    /// Ozone concentration in ppm, or 0.0 when the report type does not
    /// carry ozone data or the stored bit pattern is a NaN/infinity.
    /// "No measurement" is never surfaced as a NaN.
    pub fn ozone_ppm(&self) -> f32 {
        if !self.is_ozone_valid() {
            return 0.0;
        }
        let bits = u32::from_le_bytes([self.raw[2], self.raw[3], self.raw[4], self.raw[5]]);
        // Exponent all ones means NaN or infinity.
        if bits & 0x7F80_0000 == 0x7F80_0000 {
            return 0.0;
        }
        f32::from_bits(bits)
    }

    /// Decoded sensor health from the first status byte.
    pub fn sensor_status(&self) -> SensorStatus {
        SensorStatus::from_byte(self.raw[12])
    }

    /// The second status byte, reported raw.
    pub fn status2(&self) -> u8 {
        self.raw[13]
    }

    /// The raw record.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.raw
    }
}

/// A 14-byte sensor-info report.
///
/// Layout: header, type, firmware version, display format, name length,
/// 7 bytes of name text, 1 reserved byte, checksum.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SensorInfoReport {
    raw: [u8; Self::LEN],
}

impl SensorInfoReport {
    /// Wire size of a sensor-info report.
    pub const LEN: usize = 14;

    /// Capacity of the name field.
    pub const NAME_CAPACITY: usize = 7;

    const NAME_OFFSET: usize = 5;

    /// Wraps a raw 14-byte record. No validation is performed; call
    /// [`SensorInfoReport::validate`] before trusting the contents.
    pub fn from_bytes(raw: [u8; Self::LEN]) -> Self {
        Self { raw }
    }

    /// Checks the record: header, then type, then name length, then
    /// checksum, reporting the first violated condition.
    pub fn validate(&self) -> Result<(), WireError> {
        if self.raw[0] != HDR_SENSOR {
            return Err(WireError::BadHeader);
        }
        if self.raw[1] != TYPE_SENSOR_INFO {
            return Err(WireError::BadType);
        }
        if usize::from(self.raw[4]) > Self::NAME_CAPACITY {
            return Err(WireError::BadNameLength);
        }
        if !checksum::verify(&self.raw) {
            return Err(WireError::BadChecksum);
        }
        Ok(())
    }

    /// Firmware version byte.
    pub fn version(&self) -> u8 {
        self.raw[2]
    }

    /// Decoded display format.
    pub fn display_format(&self) -> DisplayFormat {
        DisplayFormat::from_byte(self.raw[3])
    }

    /// The sensor name bytes, bounded by the advertised length. A length
    /// beyond the field capacity yields an empty slice.
    pub fn name(&self) -> &[u8] {
        let len = usize::from(self.raw[4]);
        if len > Self::NAME_CAPACITY {
            return &[];
        }
        &self.raw[Self::NAME_OFFSET..Self::NAME_OFFSET + len]
    }

    /// The sensor name as a string slice, if it is valid UTF-8.
    pub fn name_str(&self) -> Option<&str> {
        core::str::from_utf8(self.name()).ok()
    }

    /// The raw record.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.raw
    }
}
