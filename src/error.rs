//! Console transport error types

/// Transport error with code and message.
///
/// The public surface stays a binary success/failure signal; the kind is
/// extra diagnostic detail, not part of the contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleIoError {
    /// E01: UART peripheral could not be configured or installed
    Config,
    /// E02: driver rejected a transmit request
    WriteRejected,
    /// E03: notification channel is gone
    ChannelDown,
}

impl ConsoleIoError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config => "E01",
            Self::WriteRejected => "E02",
            Self::ChannelDown => "E03",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Config => "UART init failed",
            Self::WriteRejected => "write rejected",
            Self::ChannelDown => "event channel down",
        }
    }
}

impl core::fmt::Display for ConsoleIoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
