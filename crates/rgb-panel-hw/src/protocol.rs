//! Panel command protocol definitions and encoding.
//!
//! Frame structure (one per panel):
//! - Byte 0: write register selector (0x02)
//! - Byte 1: control byte (clear, scroll direction, scroll enable, mode field)
//! - Byte 2: palette color code
//! - Byte 3: X coordinate
//! - Byte 4: Y coordinate or built-in bitmap index
//! - Byte 5: reserved
//! - Bytes 6..: ASCII payload in string mode
//!
//! A frame is 17 bytes on the wire. Text longer than the 11 payload bytes
//! that fit in a 17-byte frame extends the frame up to 56 bytes.

use crate::{Color, Error, Result};
use std::str::FromStr;

/// Default 7-bit bus address of a panel.
pub const DEFAULT_ADDRESS: u8 = 0x10;

/// Register selector for display commands.
pub const WRITE_REGISTER: u8 = 0x02;

/// Length of a standard frame on the wire.
pub const FRAME_LEN: usize = 17;

/// Offset of the first string payload byte.
pub const PAYLOAD_OFFSET: usize = 6;

/// Longest text the panel accepts.
pub const MAX_TEXT_LEN: usize = 50;

/// Bytes reserved per panel: header plus the longest text.
pub const SEGMENT_CAPACITY: usize = PAYLOAD_OFFSET + MAX_TEXT_LEN;

/// Byte offsets within a frame.
pub const REG_OFFSET: usize = 0;
pub const CONTROL_OFFSET: usize = 1;
pub const COLOR_OFFSET: usize = 2;
pub const X_OFFSET: usize = 3;
pub const Y_OFFSET: usize = 4;

/// Control byte bit 0: display cleared.
pub const CLEAR_BIT: u8 = 0x01;

/// Control byte bit 1: scroll to the right (cleared means left).
pub const SCROLL_RIGHT_BIT: u8 = 0x01 << 1;

/// Control byte bit 2: scrolling enabled.
pub const SCROLL_ENABLE_BIT: u8 = 0x01 << 2;

/// Shift of the 2-bit display mode field.
pub const MODE_SHIFT: u8 = 3;

/// Control byte bits 3-4: display mode field.
pub const MODE_MASK: u8 = 0x03 << MODE_SHIFT;

/// Mask applied before selecting pixel, bitmap or string mode.
/// Drops the clear bit and the mode field, keeps the scroll bits.
const DRAW_KEEP_MASK: u8 = !(MODE_MASK | CLEAR_BIT);

/// Mask applied before selecting fill mode. Keeps the clear bit.
const FILL_KEEP_MASK: u8 = !MODE_MASK;

/// Payload bytes for the system power prefix: `[register, 0x00, power, 0x00]`.
const POWER_ON: u8 = 0x01;
const POWER_OFF: u8 = 0x00;

/// Display mode selected by the control byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Whole panel in one color. Shares mode value 1 with pixel mode and is
    /// told apart by the clear bit.
    Fill,
    /// Single pixel.
    Pixel,
    /// Built-in bitmap by index.
    Bitmap,
    /// ASCII text.
    String,
}

impl DisplayMode {
    /// Returns the value of the 2-bit mode field for this mode.
    pub fn field_value(self) -> u8 {
        match self {
            DisplayMode::Fill | DisplayMode::Pixel => 1,
            DisplayMode::Bitmap => 2,
            DisplayMode::String => 3,
        }
    }

    /// Returns the mode field shifted into place in the control byte.
    pub fn field_bits(self) -> u8 {
        self.field_value() << MODE_SHIFT
    }

    /// Decodes the display mode from a control byte.
    ///
    /// Returns `None` when the mode field is zero, which is the state after
    /// construction, `clear` and the power commands.
    pub fn decode(control: u8) -> Option<Self> {
        match (control & MODE_MASK) >> MODE_SHIFT {
            1 if control & CLEAR_BIT != 0 => Some(DisplayMode::Fill),
            1 => Some(DisplayMode::Pixel),
            2 => Some(DisplayMode::Bitmap),
            3 => Some(DisplayMode::String),
            _ => None,
        }
    }
}

impl std::fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayMode::Fill => write!(f, "fill"),
            DisplayMode::Pixel => write!(f, "pixel"),
            DisplayMode::Bitmap => write!(f, "bitmap"),
            DisplayMode::String => write!(f, "string"),
        }
    }
}

/// Scroll direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Left,
    Right,
}

impl ScrollDirection {
    /// Converts the control byte's direction bit value to a direction.
    pub fn from_bits(value: u8) -> Result<Self> {
        match value {
            0x00 => Ok(ScrollDirection::Left),
            SCROLL_RIGHT_BIT => Ok(ScrollDirection::Right),
            _ => Err(Error::InvalidArgument(format!(
                "scroll direction 0x{:02X} (must be left or right)",
                value
            ))),
        }
    }
}

impl FromStr for ScrollDirection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "left" => Ok(ScrollDirection::Left),
            "right" => Ok(ScrollDirection::Right),
            _ => Err(Error::InvalidArgument(format!(
                "scroll direction '{}' (must be left or right)",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScrollDirection::Left => write!(f, "left"),
            ScrollDirection::Right => write!(f, "right"),
        }
    }
}

/// Command buffer for one panel.
///
/// Every drawing rule rewrites only the bytes it owns; bytes written by an
/// earlier call stay in place until something overwrites them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    bytes: [u8; SEGMENT_CAPACITY],
    text_len: usize,
}

impl Default for Segment {
    fn default() -> Self {
        Self::new()
    }
}

impl Segment {
    /// Creates a zero-filled segment.
    pub fn new() -> Self {
        Self {
            bytes: [0u8; SEGMENT_CAPACITY],
            text_len: 0,
        }
    }

    /// Returns the control byte.
    pub fn control(&self) -> u8 {
        self.bytes[CONTROL_OFFSET]
    }

    /// Returns the active display mode, if any.
    pub fn mode(&self) -> Option<DisplayMode> {
        DisplayMode::decode(self.control())
    }

    /// Returns the bytes transmitted on flush.
    pub fn frame(&self) -> &[u8] {
        let len = match self.mode() {
            Some(DisplayMode::String) => FRAME_LEN.max(PAYLOAD_OFFSET + self.text_len),
            _ => FRAME_LEN,
        };
        &self.bytes[..len]
    }

    /// Writes the system power prefix.
    pub fn set_power(&mut self, on: bool) {
        self.bytes[REG_OFFSET] = WRITE_REGISTER;
        self.bytes[CONTROL_OFFSET] = 0x00;
        self.bytes[COLOR_OFFSET] = if on { POWER_ON } else { POWER_OFF };
        self.bytes[X_OFFSET] = 0x00;
    }

    /// Updates the scroll bits. `None` clears only the enable bit.
    pub fn set_scroll(&mut self, direction: Option<ScrollDirection>) {
        let control = &mut self.bytes[CONTROL_OFFSET];
        match direction {
            None => *control &= !SCROLL_ENABLE_BIT,
            Some(ScrollDirection::Right) => *control |= SCROLL_ENABLE_BIT | SCROLL_RIGHT_BIT,
            Some(ScrollDirection::Left) => {
                *control = (*control | SCROLL_ENABLE_BIT) & !SCROLL_RIGHT_BIT
            }
        }
    }

    /// Selects a built-in bitmap.
    pub fn set_bitmap(&mut self, index: u8, color: Color) {
        self.select_mode(DisplayMode::Bitmap);
        self.bytes[COLOR_OFFSET] = color.code();
        self.bytes[Y_OFFSET] = index;
    }

    /// Writes a text payload. The segment is untouched on error.
    pub fn set_text(&mut self, text: &str, color: Color) -> Result<()> {
        if !text.is_ascii() {
            return Err(Error::InvalidArgument(format!(
                "text '{}' contains non-ASCII characters",
                text
            )));
        }
        // ASCII only, so the byte length is the character count.
        let len = text.len();
        if len > MAX_TEXT_LEN {
            return Err(Error::ArgumentTooLong {
                len,
                max: MAX_TEXT_LEN,
            });
        }

        self.select_mode(DisplayMode::String);
        self.bytes[COLOR_OFFSET] = color.code();
        self.bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + len].copy_from_slice(text.as_bytes());
        self.text_len = len;
        Ok(())
    }

    /// Selects a single pixel.
    pub fn set_pixel(&mut self, x: u8, y: u8, color: Color) {
        self.select_mode(DisplayMode::Pixel);
        self.bytes[COLOR_OFFSET] = color.code();
        self.bytes[X_OFFSET] = x;
        self.bytes[Y_OFFSET] = y;
    }

    /// Fills the whole panel.
    pub fn set_fill(&mut self, color: Color) {
        self.select_mode(DisplayMode::Fill);
        self.bytes[COLOR_OFFSET] = color.code();
        self.bytes[X_OFFSET] = 0x00;
        self.bytes[Y_OFFSET] = 0x00;
    }

    /// Marks the panel cleared. Coordinates and payload are left as they are.
    pub fn set_clear(&mut self) {
        self.bytes[REG_OFFSET] = WRITE_REGISTER;
        self.bytes[CONTROL_OFFSET] = CLEAR_BIT;
        self.bytes[COLOR_OFFSET] = Color::Quench.code();
    }

    fn select_mode(&mut self, mode: DisplayMode) {
        self.bytes[REG_OFFSET] = WRITE_REGISTER;
        let control = self.bytes[CONTROL_OFFSET];
        self.bytes[CONTROL_OFFSET] = match mode {
            // Fill resets the control byte to the clear marker first, which
            // also drops any scroll bits.
            DisplayMode::Fill => (CLEAR_BIT & FILL_KEEP_MASK) | mode.field_bits(),
            _ => (control & DRAW_KEEP_MASK) | mode.field_bits(),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks() {
        assert_eq!(DRAW_KEEP_MASK, 0xE6);
        assert_eq!(FILL_KEEP_MASK, 0xE7);
        assert_eq!(MODE_MASK, 0x18);
        assert_eq!(SEGMENT_CAPACITY, 56);
    }

    #[test]
    fn test_mode_field_bits() {
        assert_eq!(DisplayMode::Pixel.field_bits(), 0x08);
        assert_eq!(DisplayMode::Fill.field_bits(), 0x08);
        assert_eq!(DisplayMode::Bitmap.field_bits(), 0x10);
        assert_eq!(DisplayMode::String.field_bits(), 0x18);
    }

    #[test]
    fn test_decode_mode() {
        assert_eq!(DisplayMode::decode(0x00), None);
        assert_eq!(DisplayMode::decode(0x01), None);
        assert_eq!(DisplayMode::decode(0x08), Some(DisplayMode::Pixel));
        assert_eq!(DisplayMode::decode(0x09), Some(DisplayMode::Fill));
        assert_eq!(DisplayMode::decode(0x16), Some(DisplayMode::Bitmap));
        assert_eq!(DisplayMode::decode(0x1C), Some(DisplayMode::String));
    }

    #[test]
    fn test_fill_control_byte() {
        let mut segment = Segment::new();
        segment.set_scroll(Some(ScrollDirection::Right));
        segment.set_fill(Color::Blue);
        assert_eq!(segment.control(), 0x09);
        assert_eq!(segment.frame()[COLOR_OFFSET], 4);
    }

    #[test]
    fn test_draw_modes_keep_scroll_bits() {
        let mut segment = Segment::new();
        segment.set_scroll(Some(ScrollDirection::Right));
        segment.set_pixel(1, 2, Color::Red);
        assert_eq!(segment.control(), 0x0E);

        segment.set_bitmap(3, Color::Green);
        assert_eq!(segment.control(), 0x16);

        segment.set_text("hi", Color::White).unwrap();
        assert_eq!(segment.control(), 0x1E);
    }

    #[test]
    fn test_mode_switch_leaves_no_stale_mode_bits() {
        let mut segment = Segment::new();
        segment.set_text("abc", Color::Red).unwrap();
        segment.set_pixel(0, 0, Color::Red);
        assert_eq!(segment.control() & MODE_MASK, 0x08);
        assert_eq!(segment.mode(), Some(DisplayMode::Pixel));
    }

    #[test]
    fn test_pixel_drops_clear_bit() {
        let mut segment = Segment::new();
        segment.set_clear();
        segment.set_pixel(4, 4, Color::Cyan);
        assert_eq!(segment.control(), 0x08);
    }

    #[test]
    fn test_power_prefix() {
        let mut segment = Segment::new();
        segment.set_pixel(9, 9, Color::Yellow);
        segment.set_power(true);
        assert_eq!(&segment.frame()[..5], &[0x02, 0x00, 0x01, 0x00, 9]);

        segment.set_power(false);
        assert_eq!(&segment.frame()[..4], &[0x02, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_scroll_left_clears_direction() {
        let mut segment = Segment::new();
        segment.set_scroll(Some(ScrollDirection::Right));
        // Behavior change: OR-ing `SCROLL_ENABLE & !SCROLL_RIGHT` alone would
        // leave the direction bit from the right scroll set. Left clears it.
        segment.set_scroll(Some(ScrollDirection::Left));
        assert_eq!(segment.control(), SCROLL_ENABLE_BIT);
    }

    #[test]
    fn test_scroll_off_only_touches_enable_bit() {
        let mut segment = Segment::new();
        segment.set_text("x", Color::Red).unwrap();
        segment.set_scroll(Some(ScrollDirection::Right));
        let before = segment.control();
        segment.set_scroll(None);
        assert_eq!(segment.control(), before & !SCROLL_ENABLE_BIT);
        assert_eq!(segment.control() & SCROLL_RIGHT_BIT, SCROLL_RIGHT_BIT);
    }

    #[test]
    fn test_text_frame_length() {
        let mut segment = Segment::new();
        segment.set_text("short", Color::Red).unwrap();
        assert_eq!(segment.frame().len(), FRAME_LEN);
        assert_eq!(&segment.frame()[6..11], b"short");

        let long = "x".repeat(MAX_TEXT_LEN);
        segment.set_text(&long, Color::Red).unwrap();
        assert_eq!(segment.frame().len(), SEGMENT_CAPACITY);

        segment.set_pixel(0, 0, Color::Red);
        assert_eq!(segment.frame().len(), FRAME_LEN);
    }

    #[test]
    fn test_text_rejects_non_ascii() {
        let mut segment = Segment::new();
        let before = segment.clone();
        assert!(matches!(
            segment.set_text("héllo", Color::Red),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(segment, before);
    }

    #[test]
    fn test_non_ascii_reported_before_length() {
        let mut segment = Segment::new();
        // 26 characters, 52 bytes.
        let text = "é".repeat(26);
        assert!(matches!(
            segment.set_text(&text, Color::Red),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(segment, Segment::new());
    }

    #[test]
    fn test_scroll_direction_parsing() {
        assert_eq!(
            ScrollDirection::from_bits(0x00).unwrap(),
            ScrollDirection::Left
        );
        assert_eq!(
            ScrollDirection::from_bits(0x02).unwrap(),
            ScrollDirection::Right
        );
        assert!(matches!(
            ScrollDirection::from_bits(0x04),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(
            "Right".parse::<ScrollDirection>().unwrap(),
            ScrollDirection::Right
        );
        assert!("up".parse::<ScrollDirection>().is_err());
    }
}
