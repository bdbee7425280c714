//! RGB Panel Control Tool
//!
//! CLI for drawing on I2C RGB LED matrix panels.

mod bus;
mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embedded_hal::i2c::I2c;
use rgb_panel_hw::{Color, PanelEncoder, ScrollDirection, PANEL_HEIGHT, PANEL_WIDTH};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use bus::{DryRunBus, I2cDev};
use config::Config;

#[derive(Parser)]
#[command(name = "rgbpanelctl")]
#[command(about = "Control tool for I2C RGB LED matrix panels")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// I2C bus device, overrides the configuration file
    #[arg(long)]
    device: Option<String>,

    /// Panel address (e.g., 0x10); repeat for several panels
    #[arg(long = "address", value_parser = parse_address)]
    addresses: Vec<u8>,

    /// Index of the panel to draw on
    #[arg(long, default_value = "0")]
    panel: usize,

    /// Print frames instead of writing them to the bus
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Power the panel on
    Enable,
    /// Power the panel off
    Disable,
    /// Clear the panel
    Clear,
    /// Fill the panel with one color
    Fill {
        /// Color name or palette code (0-7)
        color: Color,
    },
    /// Light a single pixel
    Pixel {
        /// Column (0-15)
        x: u8,
        /// Row (0-7)
        y: u8,
        /// Color name or palette code (0-7)
        color: Color,
    },
    /// Show a built-in bitmap
    Bitmap {
        /// Bitmap index
        index: u8,
        /// Color name or palette code (0-7)
        color: Color,
    },
    /// Show a short ASCII string (max 50 characters)
    Print {
        /// Text to show
        text: String,
        /// Color name or palette code (0-7)
        #[arg(default_value = "white")]
        color: Color,
    },
    /// Scroll the panel contents
    Scroll {
        /// Direction: left, right, or off
        direction: String,
    },
    /// List palette colors
    Colors,
    /// Configuration file commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the effective configuration to a file
    Init {
        /// Output file path
        #[arg(default_value = "rgbpanel.toml")]
        output: PathBuf,
    },
}

fn parse_address(s: &str) -> std::result::Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse::<u8>(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", s, e))
}

fn parse_scroll(direction: &str) -> Result<Option<ScrollDirection>> {
    if direction.eq_ignore_ascii_case("off") || direction.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Ok(Some(direction.parse::<ScrollDirection>()?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(device) = &cli.device {
        config.device = device.clone();
    }
    if !cli.addresses.is_empty() {
        config.addresses = cli.addresses.clone();
    }
    debug!("Effective configuration: {:?}", config);

    match &cli.command {
        Commands::Colors => {
            println!("Palette colors:");
            for color in Color::ALL {
                println!("  {} {}", color.code(), color);
            }
            Ok(())
        }
        Commands::Config { action } => handle_config(action, &config),
        command => {
            if cli.dry_run {
                let bus = draw(DryRunBus::default(), &config, cli.panel, command)?;
                println!("{} frame(s) not sent (dry run)", bus.writes);
                Ok(())
            } else {
                let bus = I2cDev::open(&config.device)
                    .with_context(|| format!("Failed to open I2C bus {}", config.device))?;
                draw(bus, &config, cli.panel, command)?;
                Ok(())
            }
        }
    }
}

fn handle_config(action: &ConfigCommands, config: &Config) -> Result<()> {
    match action {
        ConfigCommands::Show => {
            println!("Configuration:");
            println!("  Device: {}", config.device);
            let addresses: Vec<String> = config
                .addresses
                .iter()
                .map(|a| format!("0x{:02X}", a))
                .collect();
            println!("  Addresses: {}", addresses.join(", "));
        }
        ConfigCommands::Init { output } => {
            config.save(output)?;
            println!("Configuration written to: {}", output.display());
        }
    }

    Ok(())
}

/// Applies one drawing command and flushes every panel once.
fn draw<I: I2c>(bus: I, config: &Config, panel: usize, command: &Commands) -> Result<I> {
    let mut encoder = PanelEncoder::builder()
        .bus(bus)
        .addresses(config.addresses.iter().copied())
        .auto_flush(false)
        .build()?;
    encoder.select_panel(panel)?;

    match command {
        Commands::Enable => encoder.enable_system()?,
        Commands::Disable => encoder.disable_system()?,
        Commands::Clear => encoder.clear()?,
        Commands::Fill { color } => encoder.fill_screen(*color)?,
        Commands::Pixel { x, y, color } => {
            if *x >= PANEL_WIDTH || *y >= PANEL_HEIGHT {
                warn!(
                    "Pixel ({}, {}) is outside the {}x{} panel",
                    x, y, PANEL_WIDTH, PANEL_HEIGHT
                );
            }
            encoder.pixel(*x, *y, *color)?
        }
        Commands::Bitmap { index, color } => encoder.display_builtin(*index, *color)?,
        Commands::Print { text, color } => encoder.print(text, *color)?,
        Commands::Scroll { direction } => encoder.scroll(parse_scroll(direction)?)?,
        Commands::Colors | Commands::Config { .. } => {
            unreachable!("main handles non-drawing commands without a bus")
        }
    }

    encoder.flush().context("Failed to write to panel")?;
    Ok(encoder.release())
}
