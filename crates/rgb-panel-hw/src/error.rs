//! Error types for the RGB panel hardware library.

use embedded_hal::i2c::ErrorKind;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when encoding or transmitting panel commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The encoder was configured incorrectly (missing bus, bad address).
    #[error("Configuration error: {0}")]
    Config(String),

    /// An argument was outside the set of values the panel understands.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Text is longer than the panel's string payload.
    #[error("Text too long: {len} characters (max {max})")]
    ArgumentTooLong { len: usize, max: usize },

    /// The bus rejected a write.
    #[error("I2C write to 0x{address:02X} failed: {kind}")]
    Bus { address: u8, kind: ErrorKind },
}

impl Error {
    /// Wraps a bus error raised while writing to `address`.
    pub(crate) fn bus<E: embedded_hal::i2c::Error>(address: u8, err: E) -> Self {
        Error::Bus {
            address,
            kind: err.kind(),
        }
    }
}
