//! Hardware Abstraction Layer for the console transport.
//!
//! Thin wrappers around the ESP-IDF UART driver. Transport logic stays
//! in the core modules, HAL is just I/O.

pub mod uart;

pub use uart::UartConsoleConfig;
