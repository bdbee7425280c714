//! RGB Panel Hardware Library
//!
//! Encodes drawing commands for 16x8 RGB LED matrix panels driven over I2C
//! (DFRobot-style panels at address 0x10) and writes them through any
//! `embedded-hal` I2C bus.

pub mod color;
pub mod error;
pub mod panel;
pub mod protocol;

pub use color::Color;
pub use error::{Error, Result};
pub use panel::{PanelEncoder, PanelEncoderBuilder};
pub use protocol::{DisplayMode, ScrollDirection, DEFAULT_ADDRESS};

/// Panel dimensions in LEDs.
pub const PANEL_WIDTH: u8 = 16;
pub const PANEL_HEIGHT: u8 = 8;
