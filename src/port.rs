//! Byte-level access to the serial peripheral.
//!
//! `SerialPort` is the seam between the transport logic and the ESP-IDF
//! driver. The hardware implementation lives in [`crate::hal::uart`];
//! host tests substitute scripted ports.

use core::time::Duration;

use crate::error::ConsoleIoError;

/// Bounded wait for a single chunk read. One scheduler tick on the
/// reference configuration (100 Hz tick).
pub const READ_CHUNK_WAIT: Duration = Duration::from_millis(10);

/// Byte I/O over the serial line, driver buffering included.
pub trait SerialPort {
    /// Count of received bytes buffered by the driver and not yet read.
    fn bytes_available(&self) -> usize;

    /// Copy up to `dest.len()` already-buffered bytes into `dest`.
    ///
    /// Waits at most `timeout` for the driver to complete the copy; never
    /// waits for data that has not arrived. Returns the count copied.
    /// A failed read is indistinguishable from an empty buffer (both
    /// return 0).
    fn read(&self, dest: &mut [u8], timeout: Duration) -> usize;

    /// Submit `src` for transmission.
    ///
    /// Returns the count the driver accepted, which may be less than
    /// `src.len()` under backpressure. `Err` only when the driver rejects
    /// the write outright.
    fn write(&self, src: &[u8]) -> Result<usize, ConsoleIoError>;
}
