//! Loopback host for self-test builds
//!
//! Plays the host side of the chunked protocol from inside the device so
//! the whole receive path, flow control and raster can run without a PC
//! attached. Pixel blocks are slices of a fixed test image; a frame is
//! closed once the raster has consumed all of it.

use vgalink_protocol::Command;

use crate::state::FrameState;
use crate::stream::{Stream, StreamContext};
use crate::traits::HostLink;

/// Bytes per pixel block
pub const DEFAULT_CHUNK: usize = 64;

/// Refill once the ring holds this many lines or fewer
pub const DEFAULT_REFILL_LINES: usize = 10;

/// What the loopback host wants to send next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopbackStep<'a> {
    /// Nothing received yet; open the first frame
    Start,
    /// One pixel block
    Pixels(&'a [u8]),
    /// Current frame consumed; close it and open the next
    Restart,
    /// Ring is full enough, or the frame is fully sent
    Wait,
}

impl LoopbackStep<'_> {
    /// Hand the transport blocks for this step to `deliver`, in order
    ///
    /// Commands go out as single-byte blocks.
    pub fn deliver<F: FnMut(&[u8])>(&self, mut deliver: F) {
        match self {
            LoopbackStep::Start => deliver(&[Command::DataChunk.to_byte()]),
            LoopbackStep::Pixels(pixels) => deliver(pixels),
            LoopbackStep::Restart => {
                deliver(&[Command::FrameEnd.to_byte()]);
                deliver(&[Command::DataChunk.to_byte()]);
            }
            LoopbackStep::Wait => {}
        }
    }
}

/// In-device host feeding a test image
#[derive(Debug, Clone)]
pub struct LoopbackHost<'a> {
    image: &'a [u8],
    chunk: usize,
    refill_lines: usize,
    frames: u32,
}

impl<'a> LoopbackHost<'a> {
    /// `image` is one whole frame, row-major, one byte per pixel
    pub fn new(image: &'a [u8]) -> Self {
        Self {
            image,
            chunk: DEFAULT_CHUNK,
            refill_lines: DEFAULT_REFILL_LINES,
            frames: 0,
        }
    }

    pub fn with_chunk(mut self, chunk: usize) -> Self {
        self.chunk = chunk.max(2);
        self
    }

    pub fn with_refill_lines(mut self, lines: usize) -> Self {
        self.refill_lines = lines;
        self
    }

    /// Frames closed so far
    pub fn frames(&self) -> u32 {
        self.frames
    }

    /// Decide the next step from the stream's current state
    ///
    /// The image offset is the frame's `received_bytes`, so bytes a full
    /// ring dropped are sent again. A block never runs past the end of the
    /// frame and is never a single byte, which the receiver would read as a
    /// command.
    pub fn poll<L: HostLink, const C: usize, const W: usize>(
        &mut self,
        stream: &Stream<L, C, W>,
    ) -> LoopbackStep<'a> {
        let frame = stream.frame();

        if frame.state() == FrameState::Idle {
            return LoopbackStep::Start;
        }
        if frame.is_frame_consumed() {
            self.frames = self.frames.wrapping_add(1);
            return LoopbackStep::Restart;
        }
        if frame.state() != FrameState::Receiving
            || stream.ring().available_bytes() > self.refill_lines * W
        {
            return LoopbackStep::Wait;
        }

        let offset = frame.received_bytes();
        let remaining = frame.remaining_bytes();
        let mut len = remaining.min(self.chunk);
        if remaining - len == 1 {
            len = remaining;
        }
        if len < 2 {
            return LoopbackStep::Wait;
        }

        match self.image.get(offset..offset + len) {
            Some(pixels) => LoopbackStep::Pixels(pixels),
            None => LoopbackStep::Wait,
        }
    }

    /// Poll and deliver the resulting blocks to `ctx` in one go
    pub fn run<L: HostLink, const C: usize, const W: usize>(
        &mut self,
        ctx: &mut StreamContext<L, C, W>,
    ) -> LoopbackStep<'a> {
        let step = self.poll(ctx.stream());
        step.deliver(|block| {
            ctx.on_bytes_received(block);
        });
        step
    }
}

/// Diagonal colour bars, one byte per pixel
///
/// Values stay in the low three bits (one per colour channel), well clear of
/// the protocol's command bytes.
pub const fn test_pattern<const N: usize>(width: usize) -> [u8; N] {
    let mut image = [0u8; N];
    let mut i = 0;
    while i < N {
        let x = i % width;
        let y = i / width;
        image[i] = (((x + y) / 16) % 8) as u8;
        i += 1;
    }
    image
}
