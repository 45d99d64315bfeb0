//! VGA raster timing
//!
//! Horizontal values are in pixel clocks, vertical values in scanlines.
//! The source image is the visible area divided by the integer upscale
//! factor in both directions.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Video mode timing plus the image placement inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VgaTiming {
    pub h_visible: u16,
    pub h_front_porch: u16,
    pub h_sync: u16,
    pub h_back_porch: u16,
    pub v_visible: u16,
    pub v_front_porch: u16,
    pub v_sync: u16,
    /// Lines before the first active line. Nominally 33 for 640x480; 34
    /// gives a stable picture on real monitors.
    pub v_back_porch: u16,
    /// Scanlines per frame, blanking included
    ///
    /// Kept apart from the porches since the back porch above is really the
    /// active-window offset and does not add up to the mode's frame length.
    pub v_total: u16,
    /// Integer magnification applied in both directions
    pub upscale: u16,
    /// Horizontal offset of the image inside the full line buffer, in bytes
    pub h_offset: u16,
}

impl VgaTiming {
    /// 640x480 @ 60 Hz, 4x upscale (160x120 source)
    pub const VGA_640X480_60: Self = Self {
        h_visible: 640,
        h_front_porch: 16,
        h_sync: 96,
        h_back_porch: 48,
        v_visible: 480,
        v_front_porch: 10,
        v_sync: 2,
        v_back_porch: 34,
        v_total: 525,
        upscale: 4,
        h_offset: 9,
    };

    /// Pixel clocks per line including blanking
    pub const fn whole_line(&self) -> u16 {
        self.h_visible + self.h_front_porch + self.h_sync + self.h_back_porch
    }

    /// Scanlines per frame including blanking
    pub const fn whole_frame(&self) -> u16 {
        self.v_total
    }

    /// Check that the active window lies inside the frame
    ///
    /// [`is_active`](Self::is_active) relies on this to stay in range.
    pub const fn vertical_fits(&self) -> bool {
        self.v_sync <= self.v_visible
            && (self.v_back_porch as u32 + self.v_visible as u32) < self.v_total as u32
    }

    /// Source image width in bytes (one byte per pixel)
    pub const fn source_width(&self) -> usize {
        (self.h_visible / self.upscale) as usize
    }

    /// Source image height in rows
    pub const fn source_height(&self) -> usize {
        (self.v_visible / self.upscale) as usize
    }

    /// Bytes clocked out per scanline, blanking included
    pub const fn full_line_bytes(&self) -> usize {
        (self.whole_line() / self.upscale) as usize
    }

    /// Check if a physical scanline lies in the window that outputs pixels
    pub const fn is_active(&self, line: u16) -> bool {
        line > self.v_back_porch && line < self.v_back_porch + self.v_visible - self.v_sync
    }

    /// Source row to fetch on this physical line, if the line starts a new row
    ///
    /// Only every `upscale`-th active line fetches; the lines between repeat
    /// the previous buffer.
    pub const fn source_row(&self, line: u16) -> Option<u16> {
        if !self.is_active(line) {
            return None;
        }
        let display_line = line - self.v_back_porch - 1;
        if display_line % self.upscale == 0 {
            Some(display_line / self.upscale)
        } else {
            None
        }
    }
}

impl Default for VgaTiming {
    fn default() -> Self {
        Self::VGA_640X480_60
    }
}
