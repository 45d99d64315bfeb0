//! Scanline output stage

/// Latches one pre-rendered scanline to the pixel output
///
/// On hardware this re-arms the DMA transfer that clocks the buffer out to
/// the GPIO port.
pub trait ScanlineOutput {
    fn latch(&mut self, line: &[u8]);
}

/// Source of image rows for the raster
pub trait LineSource {
    /// Fill `out` with source row `row`
    ///
    /// `out` is exactly one line wide. Returns `false` when the row is not
    /// available; `out` then holds whatever the source's starvation policy
    /// leaves there.
    fn fetch_line(&mut self, row: u16, out: &mut [u8]) -> bool;
}
