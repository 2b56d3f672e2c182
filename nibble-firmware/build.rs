//! Build script for nibble-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates display.toml and emits it as Rust constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use nibble_core::config::{DisplayConfig, Font, Geometry, PollConfig};
use nibble_core::{ConfigError, ControlRegister, EncodingStrategy, DEFAULT_QUEUE_DEPTH};
use serde::Deserialize;

fn main() {
    setup_linker();
    generate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplayToml {
    display: DisplaySection,
    i2c: I2cSection,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DisplaySection {
    columns: u8,
    rows: u8,
    #[serde(default)]
    font: Font,
    #[serde(default)]
    strategy: EncodingStrategy,
    row_offsets: Option<[u8; 4]>,
    queue_capacity: Option<u8>,
    max_chunk: Option<u8>,
    #[serde(default)]
    control: ControlSection,
    poll: Option<PollSection>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ControlSection {
    #[serde(default = "enabled")]
    display: bool,
    #[serde(default = "enabled")]
    cursor: bool,
    #[serde(default)]
    blink: bool,
    #[serde(default = "enabled")]
    backlight: bool,
}

impl Default for ControlSection {
    fn default() -> Self {
        Self {
            display: true,
            cursor: true,
            blink: false,
            backlight: true,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PollSection {
    max_attempts: u8,
    interval_us: u32,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct I2cSection {
    address: u8,
    frequency: u32,
}

fn enabled() -> bool {
    true
}

/// Parse display.toml, validate it and write `display_config.rs`
fn generate_config() {
    println!("cargo:rerun-if-changed=display.toml");

    let config_path = Path::new("display.toml");
    if !config_path.exists() {
        fail("display.toml not found", "Create one in the nibble-firmware directory.");
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read display.toml", &e.to_string()),
    };

    let parsed: DisplayToml = match toml::from_str(&content) {
        Ok(parsed) => parsed,
        Err(e) => fail("Invalid display.toml", &e.to_string()),
    };

    let config = build_config(&parsed.display);
    if let Err(e) = config.validate() {
        fail("Rejected display configuration", describe(e));
    }
    // The firmware queue uses the default storage depth
    if config.queue_capacity as usize > DEFAULT_QUEUE_DEPTH {
        fail("Rejected display configuration", describe(ConfigError::QueueCapacity));
    }

    if !(0x08..=0x77).contains(&parsed.i2c.address) {
        fail("Invalid [i2c] section", "address must be a 7-bit address (0x08-0x77)");
    }
    if !(10_000..=1_000_000).contains(&parsed.i2c.frequency) {
        fail("Invalid [i2c] section", "frequency must be 10 kHz - 1 MHz");
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("display_config.rs")).unwrap();
    f.write_all(render(&config, &parsed.i2c).as_bytes()).unwrap();

    println!("cargo:warning=display.toml validated successfully");
}

fn build_config(section: &DisplaySection) -> DisplayConfig {
    let mut config = DisplayConfig::with_geometry(Geometry::new(section.columns, section.rows));
    config.font = section.font;
    config.strategy = section.strategy;
    if let Some(offsets) = section.row_offsets {
        config.row_offsets = offsets;
    }
    if let Some(capacity) = section.queue_capacity {
        config.queue_capacity = capacity;
    }
    config.max_chunk = section
        .max_chunk
        .unwrap_or(config.max_chunk_limit() as u8);
    config.control = ControlRegister {
        display_on: section.control.display,
        cursor_on: section.control.cursor,
        blink_on: section.control.blink,
        backlight: section.control.backlight,
    };
    if let Some(poll) = &section.poll {
        config.poll = PollConfig {
            max_attempts: poll.max_attempts,
            interval_us: poll.interval_us,
        };
    }
    config
}

fn describe(error: ConfigError) -> &'static str {
    match error {
        ConfigError::Geometry => "columns/rows must be 1-40 x 1-4 with at most 80 cells",
        ConfigError::FontUnsupported => "dots5x10 is only available on single-line displays",
        ConfigError::ChunkSize => "max_chunk must be 1-5 (full_pulse) or 1-16 (transport_pulsed)",
        ConfigError::QueueCapacity => "queue_capacity must be 1-16",
        ConfigError::PollBound => "poll.max_attempts must be at least 1",
        ConfigError::RowOffsets => "row_offsets[0] must be 0 and every row must fit below 0x80",
    }
}

/// Emit the configuration as constants for `include!`
fn render(config: &DisplayConfig, i2c: &I2cSection) -> String {
    let offsets = config.row_offsets;
    format!(
        "// Generated from display.toml by build.rs\n\
         \n\
         pub const DISPLAY_CONFIG: DisplayConfig = DisplayConfig {{\n    \
             geometry: Geometry::new({columns}, {rows}),\n    \
             font: Font::{font:?},\n    \
             strategy: EncodingStrategy::{strategy:?},\n    \
             row_offsets: [{o0:#04x}, {o1:#04x}, {o2:#04x}, {o3:#04x}],\n    \
             queue_capacity: {capacity},\n    \
             max_chunk: {chunk},\n    \
             control: ControlRegister {{\n        \
                 display_on: {display_on},\n        \
                 cursor_on: {cursor_on},\n        \
                 blink_on: {blink_on},\n        \
                 backlight: {backlight},\n    \
             }},\n    \
             poll: PollConfig {{\n        \
                 max_attempts: {attempts},\n        \
                 interval_us: {interval},\n    \
             }},\n\
         }};\n\
         \n\
         pub const I2C_ADDRESS: u8 = {address:#04x};\n\
         pub const I2C_FREQUENCY: u32 = {frequency};\n",
        columns = config.geometry.columns,
        rows = config.geometry.rows,
        font = config.font,
        strategy = config.strategy,
        o0 = offsets[0],
        o1 = offsets[1],
        o2 = offsets[2],
        o3 = offsets[3],
        capacity = config.queue_capacity,
        chunk = config.max_chunk,
        display_on = config.control.display_on,
        cursor_on = config.control.cursor_on,
        blink_on = config.control.blink_on,
        backlight = config.control.backlight,
        attempts = config.poll.max_attempts,
        interval = config.poll.interval_us,
        address = i2c.address,
        frequency = i2c.frequency,
    )
}

/// Abort the build with a boxed error message
fn fail(title: &str, detail: &str) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<57}║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(detail)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.chars().count() > 64 {
                format!("{}...", line.chars().take(61).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
