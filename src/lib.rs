//! # RustUartConsole
//!
//! Buffered UART transport for an interactive serial console.
//!
//! ## Architecture
//!
//! The crate bridges the ESP-IDF UART driver to an external command
//! processor:
//!
//! ```text
//! RX interrupt ──▶ driver queue ──▶ BridgeTask ──▶ InputHandler
//!                                                     │
//!                       ConsoleIo::receive / send ◀───┘
//! ```
//!
//! - [`hal::uart`] installs the driver and exposes the port and its
//!   event queue
//! - [`bridge::BridgeTask`] waits on driver events and notifies the
//!   processor, exactly once per arrival, on its own task
//! - [`console_io::ConsoleIo`] is the context object the processor calls
//!   back into to drain input (optionally echoed) and push output
//!
//! Everything except the `hal` internals builds and tests on the host.

#![cfg_attr(not(test), no_std)]

pub mod bridge;
pub mod console_io;
pub mod error;
pub mod event;
pub mod hal;
pub mod log_globals;
pub mod logging;
pub mod port;

pub use bridge::{BridgeTask, InputHandler, EVENT_WAIT};
pub use console_io::ConsoleIo;
pub use error::ConsoleIoError;
pub use event::{EventSource, PortEvent};
pub use log_globals::LOG_STREAM;
pub use port::SerialPort;
