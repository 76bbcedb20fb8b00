//! Bridge task: translates driver arrival events into command-processor
//! notifications.
//!
//! # Contract
//!
//! - Exactly one bridge task exists; it is the sole consumer of the
//!   driver's event queue.
//! - The handler runs synchronously on the bridge task's own thread, and
//!   the task does not wait for the next event until the handler
//!   returns. Handler invocations therefore never overlap.
//! - The wait is bounded ([`EVENT_WAIT`]) purely so the task yields
//!   periodically to the scheduler; a timeout triggers no action.

use core::time::Duration;

use crate::event::{EventSource, PortEvent};
use crate::logging::LogStream;
use crate::{io_error, io_warn};

/// Bound on one wait for a driver event.
pub const EVENT_WAIT: Duration = Duration::from_millis(200);

/// Called on the bridge task's thread when received data is ready.
///
/// The implementation is expected to drain as much input as it wants via
/// [`ConsoleIo::receive`](crate::console_io::ConsoleIo::receive) before
/// returning, and must not block indefinitely.
pub trait InputHandler {
    fn on_data_ready(&mut self);
}

/// The background worker bridging hardware events to the processor.
///
/// # Example
///
/// ```ignore
/// let (port, events) = hal::uart::install(&UartConsoleConfig::default())?;
/// let mut bridge = BridgeTask::new(events, processor, &LOG_STREAM);
/// bridge.run(); // does not return in normal operation
/// ```
pub struct BridgeTask<'a, E: EventSource, H: InputHandler> {
    events: E,
    handler: H,
    log: &'a LogStream,
}

impl<'a, E: EventSource, H: InputHandler> BridgeTask<'a, E, H> {
    /// Create the bridge over an installed event queue.
    pub fn new(events: E, handler: H, log: &'a LogStream) -> Self {
        Self {
            events,
            handler,
            log,
        }
    }

    /// Run the wait loop.
    ///
    /// Loops for the life of the process in normal operation. Returns
    /// only if the notification channel becomes permanently unavailable,
    /// after logging the condition once.
    pub fn run(&mut self) {
        loop {
            match self.events.wait(EVENT_WAIT) {
                Ok(Some(PortEvent::DataReady { .. })) => {
                    self.handler.on_data_ready();
                }
                Ok(Some(event)) => {
                    io_warn!(self.log, "Unhandled UART event: {:?}", event);
                }
                Ok(None) => {
                    // Timeout; loop so the scheduler gets its chance.
                }
                Err(err) => {
                    io_error!(self.log, "Event channel lost ({}), console input stops", err);
                    return;
                }
            }
        }
    }
}
