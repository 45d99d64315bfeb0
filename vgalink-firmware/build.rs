//! Build script for vgalink-firmware
//!
//! - Passes the linker scripts (memory.x comes from embassy-stm32)
//! - Validates stream.toml at compile time
//! - Generates the buffer geometry and stream configuration constants

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use vgalink_core::{StreamConfig, VgaTiming};
use vgalink_protocol::ProtocolVersion;

/// Whole lines held by the ring when `[buffer]` is absent
const DEFAULT_RING_LINES: usize = 30;

/// Ring bytes the Blue Pill's 20 KiB of RAM can spare
const MAX_RING_BYTES: usize = 8 * 1024;

/// Line length the line timer (31.47 kHz) and 6 MHz pixel clock produce
const TIMER_WHOLE_LINE: u16 = 800;

/// Pixel clocks per output byte at 6 MHz
const TIMER_UPSCALE: u16 = 4;

#[derive(Deserialize)]
struct FileConfig {
    #[serde(flatten)]
    stream: StreamConfig,
    #[serde(default)]
    buffer: BufferConfig,
}

#[derive(Deserialize)]
#[serde(default)]
struct BufferConfig {
    ring_lines: usize,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            ring_lines: DEFAULT_RING_LINES,
        }
    }
}

fn main() {
    setup_linker();
    let config = load_config();
    validate_config(&config);
    generate_constants(&config);
}

/// Link scripts for cortex-m-rt and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    if env::var_os("CARGO_FEATURE_DEFMT").is_some() {
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse stream.toml
fn load_config() -> FileConfig {
    println!("cargo:rerun-if-changed=stream.toml");

    let config_path = Path::new("stream.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: stream.toml not found!                                   ║\n\
            ║                                                                  ║\n\
            ║  The firmware requires a stream.toml configuration file.         ║\n\
            ║  Please create one in the vgalink-firmware directory.            ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read stream.toml                               ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid stream.toml                                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    }
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check the configuration against the buffer geometry and the board
fn validate_config(config: &FileConfig) {
    let stream = &config.stream;
    let mut errors = Vec::new();

    let line_width = stream.timing.source_width();
    let ring_lines = config.buffer.ring_lines;

    if ring_lines == 0 {
        errors.push("[buffer] ring_lines must be at least 1".to_string());
    } else if let Err(e) = stream.validate(line_width, line_width * ring_lines) {
        errors.push(format!("stream configuration rejected: {:?}", e));
    }

    if line_width * ring_lines > MAX_RING_BYTES {
        errors.push(format!(
            "[buffer] ring of {} bytes exceeds {} bytes",
            line_width * ring_lines,
            MAX_RING_BYTES
        ));
    }

    if stream.timing.full_line_bytes() > u16::MAX as usize {
        errors.push("[timing] line too long for one DMA transfer".to_string());
    }

    if stream.timing.whole_line() != TIMER_WHOLE_LINE {
        errors.push(format!(
            "[timing] line must total {} clocks, the timers are fixed",
            TIMER_WHOLE_LINE
        ));
    }

    if stream.timing.upscale != TIMER_UPSCALE {
        errors.push(format!(
            "[timing] upscale must be {} for the 6 MHz pixel clock",
            TIMER_UPSCALE
        ));
    }

    if env::var_os("CARGO_FEATURE_LOOPBACK").is_some() {
        if stream.protocol != ProtocolVersion::Chunked {
            errors.push("loopback builds require protocol = \"chunked\"".to_string());
        }
        if !stream.acknowledge_frames {
            errors.push("loopback builds require acknowledge_frames = true".to_string());
        }
    }

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid stream configuration                             ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=stream.toml validated successfully");
}

/// Write the constants included by `src/config.rs`
fn generate_constants(config: &FileConfig) {
    let stream = &config.stream;
    let t: &VgaTiming = &stream.timing;
    let line_width = t.source_width();

    let code = format!(
        "/// Source line width in bytes\n\
         pub const LINE_WIDTH: usize = {line_width};\n\
         /// Whole lines held by the ring\n\
         pub const RING_LINES: usize = {ring_lines};\n\
         /// Ring capacity in bytes\n\
         pub const RING_CAPACITY: usize = LINE_WIDTH * RING_LINES;\n\
         /// Bytes clocked out per scanline, blanking included\n\
         pub const FULL_LINE_BYTES: usize = {full_line};\n\
         /// Bytes in one frame\n\
         pub const FRAME_BYTES: usize = {frame_bytes};\n\
         \n\
         pub const STREAM_CONFIG: StreamConfig = StreamConfig {{\n\
         \x20   protocol: ProtocolVersion::{protocol:?},\n\
         \x20   image_height: {image_height},\n\
         \x20   threshold_lines: {threshold_lines},\n\
         \x20   dedupe_requests: {dedupe},\n\
         \x20   acknowledge_frames: {acknowledge},\n\
         \x20   overflow: OverflowPolicy::{overflow:?},\n\
         \x20   starvation: StarvationPolicy::{starvation:?},\n\
         \x20   timing: VgaTiming {{\n\
         \x20       h_visible: {h_visible},\n\
         \x20       h_front_porch: {h_front_porch},\n\
         \x20       h_sync: {h_sync},\n\
         \x20       h_back_porch: {h_back_porch},\n\
         \x20       v_visible: {v_visible},\n\
         \x20       v_front_porch: {v_front_porch},\n\
         \x20       v_sync: {v_sync},\n\
         \x20       v_back_porch: {v_back_porch},\n\
         \x20       v_total: {v_total},\n\
         \x20       upscale: {upscale},\n\
         \x20       h_offset: {h_offset},\n\
         \x20   }},\n\
         }};\n",
        ring_lines = config.buffer.ring_lines,
        full_line = t.full_line_bytes(),
        frame_bytes = stream.frame_size(line_width),
        protocol = stream.protocol,
        image_height = stream.image_height,
        threshold_lines = stream.threshold_lines,
        dedupe = stream.dedupe_requests,
        acknowledge = stream.acknowledge_frames,
        overflow = stream.overflow,
        starvation = stream.starvation,
        h_visible = t.h_visible,
        h_front_porch = t.h_front_porch,
        h_sync = t.h_sync,
        h_back_porch = t.h_back_porch,
        v_visible = t.v_visible,
        v_front_porch = t.v_front_porch,
        v_sync = t.v_sync,
        v_back_porch = t.v_back_porch,
        v_total = t.v_total,
        upscale = t.upscale,
        h_offset = t.h_offset,
    );

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    if let Err(e) = fs::write(out_dir.join("stream_config.rs"), code) {
        panic!("failed to write stream_config.rs: {}", e);
    }
}
