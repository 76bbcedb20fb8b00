//! Driver notification events.
//!
//! The UART driver posts an event into a FreeRTOS queue for every
//! condition it detects on the line. The bridge task acts on exactly one
//! of them (`DataReady`); everything else is logged and dropped.

use core::time::Duration;

use crate::error::ConsoleIoError;

/// Notification emitted by the driver into the bridge task's queue.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortEvent {
    /// Received data is buffered and ready to read.
    DataReady {
        /// Bytes the driver reported for this event.
        len: usize,
    },
    /// Break condition detected on the line.
    Break,
    /// Driver ring buffer full; oldest data may have been discarded.
    BufferFull,
    /// Hardware FIFO overflowed before the ISR drained it.
    FifoOverflow,
    /// Stop bit mismatch.
    FrameError,
    /// Parity mismatch.
    ParityError,
    /// Event type this layer does not recognize (raw driver value).
    Other(u32),
}

/// One side of the notification channel, consumed by the bridge task.
pub trait EventSource {
    /// Block for the next event, at most `timeout`.
    ///
    /// - `Ok(Some(event))`: an event arrived
    /// - `Ok(None)`: the wait timed out
    /// - `Err(ChannelDown)`: the channel is permanently unavailable
    fn wait(&self, timeout: Duration) -> Result<Option<PortEvent>, ConsoleIoError>;
}
