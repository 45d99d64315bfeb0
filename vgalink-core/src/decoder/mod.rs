//! Receive-path decoders
//!
//! A decoder turns transport blocks into host commands and pixel payload
//! and hands them to a [`FrameSink`]. Each protocol version has its own
//! decoder; [`Receiver`] selects one at run time.
//!
//! Decoders keep only parsing state, so the receive context can own its
//! decoder outright and lock the shared stream per delivered item.

pub mod chunked;
pub mod framed;
pub mod marker;

pub use chunked::ChunkedDecoder;
pub use framed::FramedDecoder;
pub use marker::MarkerDecoder;

use vgalink_protocol::{Command, ProtocolVersion};

/// Consumer of decoded host traffic
pub trait FrameSink {
    /// A host command arrived
    fn on_command(&mut self, command: Command);

    /// Pixel payload arrived
    fn on_pixels(&mut self, pixels: &[u8]);
}

/// Counters for one or more decoded blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DecodeStats {
    /// Commands delivered to the sink
    pub commands: u32,
    /// Pixel bytes delivered to the sink
    pub pixel_bytes: u32,
    /// Blocks, bytes or packets that could not be interpreted
    pub rejected: u32,
}

impl DecodeStats {
    pub fn merge(&mut self, other: DecodeStats) {
        self.commands = self.commands.saturating_add(other.commands);
        self.pixel_bytes = self.pixel_bytes.saturating_add(other.pixel_bytes);
        self.rejected = self.rejected.saturating_add(other.rejected);
    }

    fn command<S: FrameSink + ?Sized>(&mut self, sink: &mut S, command: Command) {
        sink.on_command(command);
        self.commands += 1;
    }

    fn pixels<S: FrameSink + ?Sized>(&mut self, sink: &mut S, pixels: &[u8]) {
        if pixels.is_empty() {
            return;
        }
        sink.on_pixels(pixels);
        self.pixel_bytes = self.pixel_bytes.saturating_add(pixels.len() as u32);
    }
}

/// Turns transport blocks into sink calls
pub trait Decoder {
    /// Decode one block exactly as the transport delivered it
    ///
    /// Block boundaries matter for [`ChunkedDecoder`]; the other decoders
    /// treat the input as a continuous stream.
    fn decode<S: FrameSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> DecodeStats;

    /// Forget any partially decoded input
    fn reset(&mut self) {}
}

/// Run-time choice of decoder
#[derive(Debug, Clone)]
pub enum Receiver {
    Marker(MarkerDecoder),
    Chunked(ChunkedDecoder),
    Framed(FramedDecoder),
}

impl Receiver {
    pub fn new(version: ProtocolVersion) -> Self {
        match version {
            ProtocolVersion::Marker => Receiver::Marker(MarkerDecoder::new()),
            ProtocolVersion::Chunked => Receiver::Chunked(ChunkedDecoder::new()),
            ProtocolVersion::Framed => Receiver::Framed(FramedDecoder::new()),
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match self {
            Receiver::Marker(_) => ProtocolVersion::Marker,
            Receiver::Chunked(_) => ProtocolVersion::Chunked,
            Receiver::Framed(_) => ProtocolVersion::Framed,
        }
    }
}

impl Decoder for Receiver {
    fn decode<S: FrameSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> DecodeStats {
        match self {
            Receiver::Marker(d) => d.decode(block, sink),
            Receiver::Chunked(d) => d.decode(block, sink),
            Receiver::Framed(d) => d.decode(block, sink),
        }
    }

    fn reset(&mut self) {
        match self {
            Receiver::Marker(d) => d.reset(),
            Receiver::Chunked(d) => d.reset(),
            Receiver::Framed(d) => d.reset(),
        }
    }
}
