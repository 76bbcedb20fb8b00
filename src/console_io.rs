//! Console I/O context: the byte-moving surface the command processor
//! calls into.
//!
//! One `ConsoleIo` wraps the serial port handle and the echo flag. It is
//! constructed once at startup by whoever installs the UART and handed by
//! reference to everything that needs it; there is no ambient global
//! state and no teardown.
//!
//! ```text
//! driver event ──▶ BridgeTask ──▶ handler ──▶ ConsoleIo::receive
//!                                         └─▶ ConsoleIo::send
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::ConsoleIoError;
use crate::port::{SerialPort, READ_CHUNK_WAIT};

/// Shared console transport state.
///
/// All methods take `&self`; the echo flag is atomic and the port
/// implementation is expected to tolerate calls from the bridge thread
/// (the default wiring keeps every call there).
pub struct ConsoleIo<P: SerialPort> {
    port: P,
    /// Echo received bytes back out the same port.
    echo: AtomicBool,
}

impl<P: SerialPort> ConsoleIo<P> {
    /// Create a new context with echo disabled.
    pub const fn new(port: P) -> Self {
        Self {
            port,
            echo: AtomicBool::new(false),
        }
    }

    /// True iff at least one received byte is buffered.
    ///
    /// Pure query; may race with concurrent arrivals, which is acceptable
    /// staleness for its callers.
    pub fn ready(&self) -> bool {
        self.port.bytes_available() > 0
    }

    /// Drain buffered bytes into `dest`.
    ///
    /// Reads in chunks until `dest` is full or the driver reports nothing
    /// buffered. Never waits for data that has not arrived; an empty
    /// buffer yields `Ok(0)`. A chunk read that returns no bytes also
    /// ends the drain; a read failure is not distinguishable from an
    /// empty buffer at this surface.
    ///
    /// With echo enabled, each chunk is written back out before the next
    /// chunk is read. Echo is best-effort; its failure does not fail the
    /// receive.
    pub fn receive(&self, dest: &mut [u8]) -> Result<usize, ConsoleIoError> {
        let mut filled = 0;

        loop {
            let buffered = self.port.bytes_available();
            if buffered == 0 || filled == dest.len() {
                break;
            }

            let want = buffered.min(dest.len() - filled);
            let got = self.port.read(&mut dest[filled..filled + want], READ_CHUNK_WAIT);
            if got == 0 {
                break;
            }

            if self.echo.load(Ordering::Relaxed) {
                let _ = self.port.write(&dest[filled..filled + got]);
            }
            filled += got;
        }

        Ok(filled)
    }

    /// Transmit `src` in one driver call.
    ///
    /// Returns the count the driver accepted (may be less than
    /// `src.len()`, still reported as success). A rejected write reports
    /// zero bytes via `Err`. Zero-length input succeeds without touching
    /// the driver.
    pub fn send(&self, src: &[u8]) -> Result<usize, ConsoleIoError> {
        if src.is_empty() {
            return Ok(0);
        }
        self.port.write(src)
    }

    /// Transmit a string, delegating to [`send`](Self::send).
    pub fn send_str(&self, text: &str) -> Result<usize, ConsoleIoError> {
        self.send(text.as_bytes())
    }

    /// Update the echo flag. Takes effect on the next `receive`.
    pub fn set_echo(&self, enabled: bool) {
        self.echo.store(enabled, Ordering::Relaxed);
    }

    /// Current echo flag.
    pub fn echo_enabled(&self) -> bool {
        self.echo.load(Ordering::Relaxed)
    }

    /// Underlying port handle.
    pub fn port(&self) -> &P {
        &self.port
    }
}
