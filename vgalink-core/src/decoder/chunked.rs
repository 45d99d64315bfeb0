//! Decoder for [`ProtocolVersion::Chunked`](vgalink_protocol::ProtocolVersion)
//!
//! The transport block length carries the framing: a block of exactly one
//! byte is a command and any longer block is pixel payload. The host must
//! never send a one-byte payload block.

use vgalink_protocol::{Command, Direction};

use super::{DecodeStats, Decoder, FrameSink};

/// Length-disambiguated block decoder
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkedDecoder;

impl ChunkedDecoder {
    pub const fn new() -> Self {
        Self
    }
}

impl Decoder for ChunkedDecoder {
    fn decode<S: FrameSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> DecodeStats {
        let mut stats = DecodeStats::default();

        match block {
            [] => {}
            [byte] => match Command::from_byte(*byte) {
                Some(command) if command.direction() == Direction::HostToDevice => {
                    stats.command(sink, command);
                }
                _ => stats.rejected += 1,
            },
            pixels => stats.pixels(sink, pixels),
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Item, RecordingSink};
    use super::*;
    use std::vec;

    #[test]
    fn test_single_byte_is_command() {
        let mut sink = RecordingSink::default();
        let stats = ChunkedDecoder::new().decode(&[0xF2], &mut sink);

        assert_eq!(sink.items, vec![Item::Command(Command::FrameEnd)]);
        assert_eq!(stats.commands, 1);
    }

    #[test]
    fn test_longer_block_is_verbatim_payload() {
        // Marker values inside a payload block are plain pixels
        let block = [0xF0, 0xF2, 0xF1, 0x00];
        let mut sink = RecordingSink::default();
        ChunkedDecoder::new().decode(&block, &mut sink);

        assert_eq!(sink.items, vec![Item::Pixels(vec![0xF0, 0xF2, 0xF1, 0x00])]);
    }

    #[test]
    fn test_unknown_single_byte_rejected() {
        let mut sink = RecordingSink::default();
        let stats = ChunkedDecoder::new().decode(&[0x37], &mut sink);

        assert!(sink.items.is_empty());
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_device_command_from_host_rejected() {
        let mut sink = RecordingSink::default();
        let stats = ChunkedDecoder::new().decode(&[0xA0], &mut sink);

        assert!(sink.items.is_empty());
        assert_eq!(stats.rejected, 1);
    }
}
