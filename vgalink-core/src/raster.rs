//! Raster line source
//!
//! Driven once per physical scanline by the horizontal timing interrupt.
//! Each active line first latches the prepared buffer to the output stage,
//! then prepares the buffer for the next line. Only every `upscale`-th
//! active line fetches a new source row; the lines between repeat the
//! buffer, which gives nearest-neighbour vertical magnification.
//!
//! ```text
//!  line  0 ..= 34    back porch          blanking
//!  line 35 ..= 511   active window       latch, fetch every 4th
//!  line 512 ..= 524  sync + front porch  blanking
//! ```
//!
//! Work per tick is one latch and at most one line copy, so it fits the
//! interrupt budget regardless of how the source behaves.

use crate::config::{ConfigError, StreamConfig, VgaTiming};
use crate::traits::{LineSource, ScanlineOutput};

/// What a line tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineTick {
    /// Outside the active window; nothing latched
    Blanking,
    /// Latched; the buffer is kept for the next line
    Repeated,
    /// Latched; a new source row was fetched
    Fetched,
    /// Latched; the source row was not available
    Starved,
}

/// Scanline generator state
///
/// `FULL` is the full line buffer size in bytes, blanking included
/// ([`VgaTiming::full_line_bytes`]).
#[derive(Debug, Clone)]
pub struct RasterLineSource<const FULL: usize> {
    timing: VgaTiming,
    image_height: u16,
    line_width: usize,
    buffer: [u8; FULL],
    current_line: u16,
    frames: u32,
    fetched: u32,
    starved: u32,
}

impl<const FULL: usize> RasterLineSource<FULL> {
    pub fn new(config: &StreamConfig) -> Result<Self, ConfigError> {
        let timing = config.timing;
        if timing.upscale == 0 {
            return Err(ConfigError::InvalidUpscale);
        }
        if timing.full_line_bytes() != FULL {
            return Err(ConfigError::LineWidthMismatch);
        }
        let line_width = timing.source_width();
        if timing.h_offset as usize + line_width > FULL {
            return Err(ConfigError::OffsetOutOfRange);
        }
        if !timing.vertical_fits() {
            return Err(ConfigError::InvalidVerticalTiming);
        }
        if config.image_height == 0 || config.image_height as usize > timing.source_height() {
            return Err(ConfigError::InvalidImageHeight);
        }

        Ok(Self {
            timing,
            image_height: config.image_height,
            line_width,
            buffer: [0; FULL],
            current_line: 0,
            frames: 0,
            fetched: 0,
            starved: 0,
        })
    }

    /// Advance one scanline
    pub fn on_line_tick<S, O>(&mut self, source: &mut S, output: &mut O) -> LineTick
    where
        S: LineSource + ?Sized,
        O: ScanlineOutput + ?Sized,
    {
        self.current_line += 1;

        let tick = if self.timing.is_active(self.current_line) {
            output.latch(&self.buffer);
            self.prepare(source)
        } else {
            LineTick::Blanking
        };

        if self.current_line >= self.timing.whole_frame() {
            self.wrap();
        }
        tick
    }

    /// Vertical frame boundary; restarts the line counter
    pub fn on_frame_tick(&mut self) {
        self.wrap();
    }

    fn wrap(&mut self) {
        self.current_line = 0;
        self.frames = self.frames.wrapping_add(1);
    }

    fn prepare<S: LineSource + ?Sized>(&mut self, source: &mut S) -> LineTick {
        let row = match self.timing.source_row(self.current_line) {
            Some(row) if row < self.image_height => row,
            _ => return LineTick::Repeated,
        };

        let start = self.timing.h_offset as usize;
        let target = &mut self.buffer[start..start + self.line_width];
        if source.fetch_line(row, target) {
            self.fetched = self.fetched.wrapping_add(1);
            LineTick::Fetched
        } else {
            self.starved = self.starved.wrapping_add(1);
            LineTick::Starved
        }
    }

    /// Buffer that the next active line latches
    pub fn buffer(&self) -> &[u8; FULL] {
        &self.buffer
    }

    /// Physical scanline counter, `0..whole_frame`
    pub fn current_line(&self) -> u16 {
        self.current_line
    }

    pub fn timing(&self) -> &VgaTiming {
        &self.timing
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn fetched(&self) -> u32 {
        self.fetched
    }

    pub fn starved(&self) -> u32 {
        self.starved
    }
}
