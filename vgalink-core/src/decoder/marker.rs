//! Decoder for [`ProtocolVersion::Marker`](vgalink_protocol::ProtocolVersion)
//!
//! The stream is raw bytes; `0xF0`, `0xF1` and `0xF2` are commands wherever
//! they appear and every other byte is a pixel. A pixel with one of those
//! values cannot be sent and will desynchronise the frame.

use vgalink_protocol::Command;

use super::{DecodeStats, Decoder, FrameSink};

/// Stateless in-band marker decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerDecoder;

impl MarkerDecoder {
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for MarkerDecoder {
    fn decode<S: FrameSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> DecodeStats {
        let mut stats = DecodeStats::default();
        let mut rest = block;

        // Hand over runs of pixels between markers in one call each
        while let Some(pos) = rest.iter().position(|&b| Command::is_host_marker(b)) {
            stats.pixels(sink, &rest[..pos]);
            if let Some(command) = Command::from_byte(rest[pos]) {
                stats.command(sink, command);
            }
            rest = &rest[pos + 1..];
        }
        stats.pixels(sink, rest);

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Item, RecordingSink};
    use super::*;
    use std::vec;

    #[test]
    fn test_frame_in_one_block() {
        let block = [0xF0, 0xF1, 1, 2, 3, 0xF2];
        let mut sink = RecordingSink::default();
        let stats = MarkerDecoder::new().decode(&block, &mut sink);

        assert_eq!(
            sink.items,
            vec![
                Item::Command(Command::FrameStart),
                Item::Command(Command::DataChunk),
                Item::Pixels(vec![1, 2, 3]),
                Item::Command(Command::FrameEnd),
            ]
        );
        assert_eq!(stats.commands, 3);
        assert_eq!(stats.pixel_bytes, 3);
    }

    #[test]
    fn test_device_command_values_are_pixels() {
        let block = [0xA0, 0xA1, 0x00];
        let mut sink = RecordingSink::default();
        MarkerDecoder::new().decode(&block, &mut sink);

        assert_eq!(sink.items, vec![Item::Pixels(vec![0xA0, 0xA1, 0x00])]);
    }

    #[test]
    fn test_single_pixel_block() {
        // Unlike the chunked protocol, a lone byte is just a pixel
        let mut sink = RecordingSink::default();
        MarkerDecoder::new().decode(&[0x42], &mut sink);
        assert_eq!(sink.items, vec![Item::Pixels(vec![0x42])]);
    }

    #[test]
    fn test_empty_block() {
        let mut sink = RecordingSink::default();
        let stats = MarkerDecoder::new().decode(&[], &mut sink);
        assert!(sink.items.is_empty());
        assert_eq!(stats, DecodeStats::default());
    }
}
