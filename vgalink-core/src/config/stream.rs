//! Stream configuration
//!
//! The line width and ring capacity are const generics on the types that
//! hold buffers; everything else is runtime configuration checked once by
//! [`StreamConfig::validate`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use vgalink_protocol::ProtocolVersion;

use super::timing::VgaTiming;

/// Default flow-control low-water mark in lines
pub const DEFAULT_THRESHOLD_LINES: u16 = 15;

/// What a write does when the ring has no room left
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum OverflowPolicy {
    /// Stop writing when full; excess incoming bytes are lost
    #[default]
    Drop,
    /// Keep writing with wrap-around; the oldest unread bytes are lost
    Overwrite,
}

/// What the consumer sees when a line is not buffered in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StarvationPolicy {
    /// Leave the previous line contents in place
    #[default]
    RepeatStale,
    /// Zero the line
    Blank,
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Upscale factor is zero or does not divide the visible area
    InvalidUpscale,
    /// Timing source width disagrees with the buffer line width
    LineWidthMismatch,
    /// Ring capacity is not a whole number of lines
    CapacityNotLineMultiple,
    /// Image placement runs past the end of the full line buffer
    OffsetOutOfRange,
    /// Sync or back porch pushes the active window out of the frame
    InvalidVerticalTiming,
    /// Image has no rows or more rows than the timing can show
    InvalidImageHeight,
    /// Low-water mark is at or above the ring capacity
    ThresholdTooLarge,
}

/// Runtime stream configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StreamConfig {
    /// Link protocol spoken with the host
    pub protocol: ProtocolVersion,
    /// Rows per frame
    pub image_height: u16,
    /// Request more data at or below this many buffered lines
    pub threshold_lines: u16,
    /// Hold back repeated requests until the host sends data again
    pub dedupe_requests: bool,
    /// Send an idle command to the host when a frame ends
    pub acknowledge_frames: bool,
    pub overflow: OverflowPolicy,
    pub starvation: StarvationPolicy,
    pub timing: VgaTiming,
}

impl Default for StreamConfig {
    fn default() -> Self {
        let timing = VgaTiming::default();
        Self {
            protocol: ProtocolVersion::default(),
            image_height: timing.source_height() as u16,
            threshold_lines: DEFAULT_THRESHOLD_LINES,
            dedupe_requests: false,
            acknowledge_frames: false,
            overflow: OverflowPolicy::default(),
            starvation: StarvationPolicy::default(),
            timing,
        }
    }
}

impl StreamConfig {
    /// Create the default configuration for a protocol version
    pub fn for_protocol(protocol: ProtocolVersion) -> Self {
        Self {
            protocol,
            ..Self::default()
        }
    }

    /// Bytes in one complete frame
    pub fn frame_size(&self, line_width: usize) -> usize {
        line_width * self.image_height as usize
    }

    /// Low-water mark in bytes
    pub fn threshold_bytes(&self, line_width: usize) -> usize {
        line_width * self.threshold_lines as usize
    }

    /// Whether a frame end discards whatever is still buffered
    ///
    /// The marker protocol keeps showing buffered lines after the end marker
    /// and only resets on the next frame start.
    pub fn frame_end_discards(&self) -> bool {
        self.protocol != ProtocolVersion::Marker
    }

    /// Check this configuration against the buffer geometry
    pub fn validate(&self, line_width: usize, capacity: usize) -> Result<(), ConfigError> {
        let t = &self.timing;

        if t.upscale == 0 || t.h_visible % t.upscale != 0 || t.v_visible % t.upscale != 0 {
            return Err(ConfigError::InvalidUpscale);
        }
        if t.source_width() != line_width {
            return Err(ConfigError::LineWidthMismatch);
        }
        if line_width == 0 || capacity < line_width || capacity % line_width != 0 {
            return Err(ConfigError::CapacityNotLineMultiple);
        }
        if t.h_offset as usize + line_width > t.full_line_bytes() {
            return Err(ConfigError::OffsetOutOfRange);
        }
        if !t.vertical_fits() {
            return Err(ConfigError::InvalidVerticalTiming);
        }
        if self.image_height == 0 || self.image_height as usize > t.source_height() {
            return Err(ConfigError::InvalidImageHeight);
        }
        if self.threshold_bytes(line_width) >= capacity {
            return Err(ConfigError::ThresholdTooLarge);
        }

        Ok(())
    }
}
