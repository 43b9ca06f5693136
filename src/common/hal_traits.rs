// src/common/hal_traits.rs

use core::fmt::Debug;

/// Abstraction over the byte-oriented serial channel the SM70 hangs off.
///
/// Mirrors the usual buffered-UART surface: counters for both buffer
/// directions, non-blocking byte reads, and buffered writes. The two
/// enable-line hooks cover RS-485 style transceivers with separate
/// transmit/receive enables; transports without control lines keep the
/// default no-op bodies.
pub trait Sm70Serial {
    /// Associated error type for transport errors.
    type Error: Debug;

    /// Initializes the port at the given baud rate (8N1).
    fn open(&mut self, baud: u32) -> Result<(), Self::Error>;

    /// Shuts the port down (e.g. for system sleep).
    fn close(&mut self);

    /// Count of bytes waiting in the receive buffer.
    fn available(&self) -> usize;

    /// Attempts to read a single byte.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` when no byte is buffered.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Queues bytes for transmission and returns how many were accepted.
    fn write(&mut self, buf: &[u8]) -> usize;

    /// Count of bytes free in the transmit buffer.
    ///
    /// The engine snapshots this before a send and watches it return to
    /// the snapshot value to learn that all queued bytes have left the
    /// local buffer.
    fn free_to_write(&self) -> usize;

    /// Attempts to flush the transmit buffer.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` while transmission is still
    /// in progress.
    fn flush(&mut self) -> nb::Result<(), Self::Error>;

    /// Drives the transmit-enable line, if the transport has one.
    fn set_tx_enable(&mut self, _enabled: bool) {}

    /// Drives the receive-enable line, if the transport has one.
    fn set_rx_enable(&mut self, _enabled: bool) {}
}

/// Monotonic microsecond clock used for turnaround and receive deadlines.
///
/// The counter may wrap; elapsed time is always computed with wrapping
/// subtraction, so intervals up to `u32::MAX` microseconds are safe.
pub trait Sm70Clock {
    /// Current time in microseconds.
    fn now_us(&self) -> u32;
}

impl<T: Sm70Clock + ?Sized> Sm70Clock for &T {
    fn now_us(&self) -> u32 {
        (**self).now_us()
    }
}
