// src/common/timing.rs

//! Timing constants for the SM70 serial link.
//!
//! The sensor runs at a fixed 4800 baud, 8N1, so every interval the engine
//! waits on is derived from the bit time at that rate. All values use a
//! single microsecond time base.

/// Fixed baud rate of the SM70.
pub const SM70_BAUD: u32 = 4800;

/// Bits on the wire per character: 1 start + 8 data + 1 stop.
pub const BITS_PER_CHAR: u32 = 10;

/// Duration of one bit at the given baud rate, in microseconds.
pub const fn bit_time_us(baud: u32) -> u32 {
    1_000_000 / baud
}

/// Duration of one bit at the SM70's fixed baud rate (≈208 µs).
pub const BIT_TIME_US: u32 = bit_time_us(SM70_BAUD);

/// Guard interval between disabling transmit and expecting the reply,
/// expressed in bit periods. Covers line settling and the sensor's
/// turnaround latency.
pub const TURNAROUND_GUARD_BITS: u32 = 20;

/// Guard interval in microseconds (≈4.2 ms at 4800 baud).
pub const TURNAROUND_GUARD_US: u32 = TURNAROUND_GUARD_BITS * BIT_TIME_US;

/// Receive deadline for a reply of `reply_len` bytes: the time to clock in
/// that many characters plus one guard interval of slack.
pub const fn reply_timeout_us(reply_len: usize) -> u32 {
    (reply_len as u32 * BITS_PER_CHAR + TURNAROUND_GUARD_BITS) * BIT_TIME_US
}
