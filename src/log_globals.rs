//! Global log stream instance.
//!
//! Single stream for the whole transport: one producer (the bridge
//! task), one consumer (the drain loop in `main`).

use crate::logging::LogStream;

/// Console transport log stream.
///
/// Pushed to by the bridge task, drained out the console UART by the
/// main thread.
pub static LOG_STREAM: LogStream = LogStream::new();
