//! Panel command encoder over an I2C bus.

use crate::protocol::{DisplayMode, ScrollDirection, Segment, DEFAULT_ADDRESS};
use crate::{Color, Error, Result};
use embedded_hal::i2c::I2c;
use tracing::{debug, info};

/// Highest valid 7-bit bus address.
const MAX_ADDRESS: u8 = 0x7F;

/// A panel on the bus and its command buffer.
#[derive(Debug, Clone)]
struct Panel {
    address: u8,
    segment: Segment,
}

/// Encodes drawing calls into panel command frames and writes them to the bus.
///
/// Every drawing call updates the selected panel's buffer. With auto-flush
/// enabled the call then writes every panel's frame; otherwise frames are
/// sent by [`PanelEncoder::flush`].
pub struct PanelEncoder<I2C> {
    i2c: I2C,
    panels: Vec<Panel>,
    selected: usize,
    auto_flush: bool,
}

/// Builder for [`PanelEncoder`].
pub struct PanelEncoderBuilder<I2C> {
    i2c: Option<I2C>,
    addresses: Vec<u8>,
    auto_flush: bool,
}

impl<I2C> Default for PanelEncoderBuilder<I2C> {
    fn default() -> Self {
        Self {
            i2c: None,
            addresses: vec![DEFAULT_ADDRESS],
            auto_flush: true,
        }
    }
}

impl<I2C: I2c> PanelEncoderBuilder<I2C> {
    /// Sets the bus handle.
    pub fn bus(mut self, i2c: I2C) -> Self {
        self.i2c = Some(i2c);
        self
    }

    /// Drives a single panel at `address`.
    pub fn address(mut self, address: u8) -> Self {
        self.addresses = vec![address];
        self
    }

    /// Drives one panel per address, flushed in the given order.
    pub fn addresses<A: IntoIterator<Item = u8>>(mut self, addresses: A) -> Self {
        self.addresses = addresses.into_iter().collect();
        self
    }

    /// Sets whether drawing calls flush immediately (default: true).
    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    /// Builds the encoder.
    pub fn build(self) -> Result<PanelEncoder<I2C>> {
        let i2c = self
            .i2c
            .ok_or_else(|| Error::Config("no I2C bus supplied".to_string()))?;

        if self.addresses.is_empty() {
            return Err(Error::Config("no panel addresses configured".to_string()));
        }

        for (i, &address) in self.addresses.iter().enumerate() {
            if address > MAX_ADDRESS {
                return Err(Error::Config(format!(
                    "address 0x{:02X} is not a 7-bit I2C address",
                    address
                )));
            }
            if self.addresses[..i].contains(&address) {
                return Err(Error::Config(format!(
                    "address 0x{:02X} configured more than once",
                    address
                )));
            }
        }

        let panels: Vec<Panel> = self
            .addresses
            .iter()
            .map(|&address| Panel {
                address,
                segment: Segment::new(),
            })
            .collect();

        info!(
            "Panel encoder ready ({} panel(s) at {:02X?}, auto-flush: {})",
            panels.len(),
            self.addresses,
            self.auto_flush
        );

        Ok(PanelEncoder {
            i2c,
            panels,
            selected: 0,
            auto_flush: self.auto_flush,
        })
    }
}

impl<I2C: I2c> PanelEncoder<I2C> {
    /// Returns a builder with the default address and auto-flush enabled.
    pub fn builder() -> PanelEncoderBuilder<I2C> {
        PanelEncoderBuilder::default()
    }

    /// Creates an encoder for a single panel.
    pub fn new(i2c: I2C, address: u8, auto_flush: bool) -> Result<Self> {
        Self::builder()
            .bus(i2c)
            .address(address)
            .auto_flush(auto_flush)
            .build()
    }

    /// Sets whether drawing calls flush immediately.
    pub fn set_auto_flush(&mut self, enabled: bool) {
        self.auto_flush = enabled;
    }

    /// Returns whether drawing calls flush immediately.
    pub fn auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// Returns the number of panels driven by this encoder.
    pub fn panel_count(&self) -> usize {
        self.panels.len()
    }

    /// Returns the panel addresses in flush order.
    pub fn addresses(&self) -> Vec<u8> {
        self.panels.iter().map(|p| p.address).collect()
    }

    /// Selects the panel that subsequent drawing calls update.
    pub fn select_panel(&mut self, index: usize) -> Result<()> {
        if index >= self.panels.len() {
            return Err(Error::InvalidArgument(format!(
                "panel index {} (have {} panel(s))",
                index,
                self.panels.len()
            )));
        }
        self.selected = index;
        Ok(())
    }

    /// Returns the index of the selected panel.
    pub fn selected_panel(&self) -> usize {
        self.selected
    }

    /// Returns the frame that would be sent to a panel on the next flush.
    pub fn frame(&self, index: usize) -> Option<&[u8]> {
        self.panels.get(index).map(|p| p.segment.frame())
    }

    /// Returns the display mode of the selected panel.
    pub fn mode(&self) -> Option<DisplayMode> {
        self.segment().mode()
    }

    /// Powers the panel on.
    pub fn enable_system(&mut self) -> Result<()> {
        self.segment_mut().set_power(true);
        self.after_update()
    }

    /// Powers the panel off.
    pub fn disable_system(&mut self) -> Result<()> {
        self.segment_mut().set_power(false);
        self.after_update()
    }

    /// Starts scrolling in `direction`, or stops scrolling when `None`.
    pub fn scroll(&mut self, direction: Option<ScrollDirection>) -> Result<()> {
        self.segment_mut().set_scroll(direction);
        self.after_update()
    }

    /// Shows a built-in bitmap.
    pub fn display_builtin(&mut self, index: u8, color: Color) -> Result<()> {
        self.segment_mut().set_bitmap(index, color);
        self.after_update()
    }

    /// Shows an ASCII string of at most 50 characters.
    pub fn print(&mut self, text: &str, color: Color) -> Result<()> {
        self.segment_mut().set_text(text, color)?;
        self.after_update()
    }

    /// Lights a single pixel.
    pub fn pixel(&mut self, x: u8, y: u8, color: Color) -> Result<()> {
        self.segment_mut().set_pixel(x, y, color);
        self.after_update()
    }

    /// Fills the whole panel with one color.
    pub fn fill_screen(&mut self, color: Color) -> Result<()> {
        self.segment_mut().set_fill(color);
        self.after_update()
    }

    /// Clears the panel.
    pub fn clear(&mut self) -> Result<()> {
        self.segment_mut().set_clear();
        self.after_update()
    }

    /// Writes every panel's frame to the bus, one transaction per panel.
    pub fn flush(&mut self) -> Result<()> {
        for panel in &self.panels {
            let frame = panel.segment.frame();
            debug!(
                "Sending panel frame to 0x{:02X}: {:02X?}",
                panel.address, frame
            );
            self.i2c
                .write(panel.address, frame)
                .map_err(|e| Error::bus(panel.address, e))?;
        }
        debug!("Flushed {} panel(s)", self.panels.len());
        Ok(())
    }

    /// Alias for [`PanelEncoder::flush`].
    pub fn show(&mut self) -> Result<()> {
        self.flush()
    }

    /// Consumes the encoder and returns the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }

    fn segment(&self) -> &Segment {
        &self.panels[self.selected].segment
    }

    fn segment_mut(&mut self) -> &mut Segment {
        &mut self.panels[self.selected].segment
    }

    fn after_update(&mut self) -> Result<()> {
        if self.auto_flush {
            self.flush()?;
        }
        Ok(())
    }
}
