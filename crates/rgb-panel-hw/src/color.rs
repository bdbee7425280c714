//! Fixed eight-entry panel palette.

use crate::{Error, Result};
use std::str::FromStr;

/// Palette colors understood by the panel firmware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Color {
    /// All LEDs off.
    #[default]
    Quench = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Purple = 5,
    Cyan = 6,
    White = 7,
}

impl Color {
    /// Every palette entry, ordered by code.
    pub const ALL: [Color; 8] = [
        Color::Quench,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Purple,
        Color::Cyan,
        Color::White,
    ];

    /// Returns the palette code written to the color byte.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Converts a palette code to a Color.
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| Error::InvalidArgument(format!("color code {} (must be 0-7)", code)))
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "quench" | "black" | "off" => Ok(Color::Quench),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "blue" => Ok(Color::Blue),
            "purple" => Ok(Color::Purple),
            "cyan" => Ok(Color::Cyan),
            "white" => Ok(Color::White),
            other => match other.parse::<u8>() {
                Ok(code) => Color::from_code(code),
                Err(_) => Err(Error::InvalidArgument(format!("color '{}'", s))),
            },
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Color::Quench => write!(f, "quench"),
            Color::Red => write!(f, "red"),
            Color::Green => write!(f, "green"),
            Color::Yellow => write!(f, "yellow"),
            Color::Blue => write!(f, "blue"),
            Color::Purple => write!(f, "purple"),
            Color::Cyan => write!(f, "cyan"),
            Color::White => write!(f, "white"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_palette_order() {
        for (code, color) in Color::ALL.iter().enumerate() {
            assert_eq!(color.code() as usize, code);
            assert_eq!(Color::from_code(code as u8).unwrap(), *color);
        }
    }

    #[test]
    fn test_from_code_out_of_range() {
        assert!(matches!(
            Color::from_code(8),
            Err(Error::InvalidArgument(_))
        ));
        assert!(Color::from_code(255).is_err());
    }

    #[test]
    fn test_from_str() {
        assert_eq!("red".parse::<Color>().unwrap(), Color::Red);
        assert_eq!("WHITE".parse::<Color>().unwrap(), Color::White);
        assert_eq!("off".parse::<Color>().unwrap(), Color::Quench);
        assert_eq!("5".parse::<Color>().unwrap(), Color::Purple);
        assert!("magenta".parse::<Color>().is_err());
        assert!("9".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        for color in Color::ALL {
            assert_eq!(color.to_string().parse::<Color>().unwrap(), color);
        }
    }
}
