//! Frame manager
//!
//! Tracks the reception state together with how many bytes of the current
//! frame have been received and consumed, and which source line the raster
//! asked for last.

use super::events::FrameEvent;
use super::machine::FrameState;

/// Per-frame accounting
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameManager {
    state: FrameState,
    /// Fixed frame length in bytes
    frame_size: usize,
    /// Bytes written to the ring for this frame
    received_bytes: usize,
    /// Bytes consumed by the raster for this frame
    processed_bytes: usize,
    /// Completed frames since start-up (diagnostic)
    frame_counter: u32,
    /// Source row the raster asked for last
    current_line: Option<u16>,
    /// Whether `current_line` was actually served from the ring
    line_was_read: bool,
}

impl FrameManager {
    pub fn new(frame_size: usize) -> Self {
        Self {
            state: FrameState::Idle,
            frame_size,
            received_bytes: 0,
            processed_bytes: 0,
            frame_counter: 0,
            current_line: None,
            line_was_read: false,
        }
    }

    /// Return to the start-up state, including the frame counter
    pub fn init(&mut self) {
        *self = Self::new(self.frame_size);
    }

    pub fn state(&self) -> FrameState {
        self.state
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn received_bytes(&self) -> usize {
        self.received_bytes
    }

    pub fn processed_bytes(&self) -> usize {
        self.processed_bytes
    }

    pub fn frame_counter(&self) -> u32 {
        self.frame_counter
    }

    pub fn current_line(&self) -> Option<u16> {
        self.current_line
    }

    /// Bytes still expected for the current frame
    pub fn remaining_bytes(&self) -> usize {
        self.frame_size - self.received_bytes
    }

    pub fn is_frame_received(&self) -> bool {
        self.received_bytes >= self.frame_size
    }

    /// Check if the raster has consumed the whole frame
    pub fn is_frame_consumed(&self) -> bool {
        self.processed_bytes >= self.frame_size
    }

    /// Apply an event and return the new state
    ///
    /// A frame start clears the byte accounting; a frame end bumps the frame
    /// counter. Whether a frame end also clears the accounting is the
    /// caller's decision (see [`reset_counts`](Self::reset_counts)).
    pub fn apply(&mut self, event: FrameEvent) -> FrameState {
        match event {
            FrameEvent::FrameStart => self.reset_counts(),
            FrameEvent::FrameEnd => self.frame_counter = self.frame_counter.wrapping_add(1),
            FrameEvent::DataChunk | FrameEvent::Payload => {}
        }
        self.state = self.state.transition(event);
        self.state
    }

    /// Clear the byte and line accounting for the frame in flight
    pub fn reset_counts(&mut self) {
        self.received_bytes = 0;
        self.processed_bytes = 0;
        self.current_line = None;
        self.line_was_read = false;
    }

    /// Clamp an incoming payload length to what the frame still needs
    pub fn admit(&self, len: usize) -> usize {
        len.min(self.remaining_bytes())
    }

    pub fn record_received(&mut self, bytes: usize) {
        self.received_bytes = (self.received_bytes + bytes).min(self.frame_size);
    }

    pub fn record_processed(&mut self, bytes: usize) {
        self.processed_bytes += bytes;
        // Holds because the ring and both counters reset together
        debug_assert!(self.processed_bytes <= self.received_bytes);
    }

    /// Note the raster is now on `line`
    ///
    /// Returns `true` when the raster moved on from a line that was read, so
    /// that line must now be consumed from the ring.
    pub fn select_line(&mut self, line: u16) -> bool {
        if self.current_line == Some(line) {
            return false;
        }
        let consume = self.line_was_read;
        self.current_line = Some(line);
        self.line_was_read = false;
        consume
    }

    /// Note the current line was served from the ring
    pub fn mark_line_read(&mut self) {
        self.line_was_read = true;
    }

    /// Forget that the current line was served
    ///
    /// For when an overwriting write has already moved the read cursor past
    /// it; the next line change must not consume a second line.
    pub fn clear_line_read(&mut self) {
        self.line_was_read = false;
    }
}
