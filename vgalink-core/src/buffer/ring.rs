//! Circular line buffer
//!
//! `C` bytes of storage read back `W` bytes (one scanline) at a time.
//!
//! Ownership of the fields follows the two contexts:
//! - producer: `write_cursor`, increments of `available`
//! - consumer: `read_cursor`, decrements of `available`
//!
//! A cursor move and the matching `available` update must happen inside the
//! same critical section. [`LineRing::reset`] and an overwriting write touch
//! both sides and need exclusive access to the whole ring.

use crate::config::OverflowPolicy;

/// Result of a [`LineRing::write`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriteOutcome {
    /// Bytes copied into storage
    pub stored: usize,
    /// Bytes lost to the overflow policy (incoming for `Drop`, unread for
    /// `Overwrite`)
    pub lost: usize,
}

/// Fixed-capacity ring of scanline bytes
#[derive(Debug, Clone)]
pub struct LineRing<const C: usize, const W: usize> {
    storage: [u8; C],
    write_cursor: usize,
    read_cursor: usize,
    available: usize,
}

impl<const C: usize, const W: usize> Default for LineRing<C, W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const C: usize, const W: usize> LineRing<C, W> {
    /// Total storage in bytes
    pub const CAPACITY: usize = C;
    /// Bytes per line
    pub const LINE_WIDTH: usize = W;
    /// Whole lines that fit
    pub const LINES: usize = C / W;

    const GEOMETRY: () = assert!(
        W > 0 && C >= W && C % W == 0,
        "ring capacity must be a whole number of lines"
    );

    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::GEOMETRY;
        Self {
            storage: [0; C],
            write_cursor: 0,
            read_cursor: 0,
            available: 0,
        }
    }

    /// Drop all buffered data and rewind both cursors
    pub fn reset(&mut self) {
        self.write_cursor = 0;
        self.read_cursor = 0;
        self.available = 0;
    }

    pub fn available_bytes(&self) -> usize {
        self.available
    }

    /// Complete lines ready for the consumer
    pub fn available_lines(&self) -> usize {
        self.available / W
    }

    pub fn free_bytes(&self) -> usize {
        C - self.available
    }

    pub fn is_empty(&self) -> bool {
        self.available == 0
    }

    pub fn is_full(&self) -> bool {
        self.available == C
    }

    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    /// Append bytes at the write cursor
    ///
    /// With [`OverflowPolicy::Drop`] only `free_bytes()` are taken. With
    /// [`OverflowPolicy::Overwrite`] everything is written with wrap-around;
    /// `available` saturates at `C` and the read cursor is pulled up to the
    /// write cursor so the next line read starts at the oldest surviving
    /// byte.
    pub fn write(&mut self, data: &[u8], policy: OverflowPolicy) -> WriteOutcome {
        match policy {
            OverflowPolicy::Drop => {
                let stored = data.len().min(self.free_bytes());
                self.copy_in(&data[..stored]);
                self.available += stored;
                WriteOutcome {
                    stored,
                    lost: data.len() - stored,
                }
            }
            OverflowPolicy::Overwrite => {
                // Only the last C bytes of an oversized write survive, but
                // the cursor still ends where a byte-by-byte copy would.
                let skip = data.len().saturating_sub(C);
                self.write_cursor = (self.write_cursor + skip) % C;
                self.copy_in(&data[skip..]);

                let total = self.available + data.len();
                let lost = total.saturating_sub(C);
                self.available = total.min(C);
                if lost > 0 {
                    self.read_cursor = self.write_cursor;
                }
                WriteOutcome {
                    stored: data.len(),
                    lost,
                }
            }
        }
    }

    /// Copy at most `C` bytes at the write cursor, splitting at the end
    fn copy_in(&mut self, data: &[u8]) {
        let start = self.write_cursor;
        let first = data.len().min(C - start);
        let (head, tail) = data.split_at(first);

        self.storage[start..start + first].copy_from_slice(head);
        self.storage[..tail.len()].copy_from_slice(tail);
        self.write_cursor = (start + data.len()) % C;
    }

    /// Copy the next line into `out` without consuming it
    ///
    /// Returns `false` and leaves `out` untouched when less than a full line
    /// is buffered.
    pub fn peek_line(&self, out: &mut [u8; W]) -> bool {
        if self.available < W {
            return false;
        }

        let start = self.read_cursor;
        let first = W.min(C - start);
        let (head, tail) = out.split_at_mut(first);
        head.copy_from_slice(&self.storage[start..start + first]);
        tail.copy_from_slice(&self.storage[..W - first]);
        true
    }

    /// Advance past the next line
    ///
    /// Returns `false` without changes when less than a full line is buffered.
    pub fn consume_line(&mut self) -> bool {
        if self.available < W {
            return false;
        }
        self.read_cursor = (self.read_cursor + W) % C;
        self.available -= W;
        true
    }

    /// Copy the next line into `out` and consume it
    pub fn read_one_line(&mut self, out: &mut [u8; W]) -> bool {
        self.peek_line(out) && self.consume_line()
    }
}
