//! Decoder for [`ProtocolVersion::Framed`](vgalink_protocol::ProtocolVersion)
//!
//! Every host message is a checksummed packet, so command and pixel bytes
//! can never be confused and corrupted input is dropped rather than
//! written to the line buffer.

use vgalink_protocol::{Command, HostMessage, PacketParser};

use super::{DecodeStats, Decoder, FrameSink};

/// Packet decoder
#[derive(Debug, Clone, Default)]
pub struct FramedDecoder {
    parser: PacketParser,
}

impl FramedDecoder {
    pub fn new() -> Self {
        Self {
            parser: PacketParser::new(),
        }
    }

    /// Check if a packet is split across blocks
    pub fn in_progress(&self) -> bool {
        self.parser.in_progress()
    }
}

impl Decoder for FramedDecoder {
    fn decode<S: FrameSink + ?Sized>(&mut self, block: &[u8], sink: &mut S) -> DecodeStats {
        let mut stats = DecodeStats::default();

        for &byte in block {
            match self.parser.feed(byte) {
                Ok(Some(packet)) => match HostMessage::from_packet(packet) {
                    Ok(HostMessage::FrameStart) => stats.command(sink, Command::FrameStart),
                    Ok(HostMessage::Pixels(pixels)) => {
                        // Each pixel packet doubles as a chunk header
                        stats.command(sink, Command::DataChunk);
                        stats.pixels(sink, pixels);
                    }
                    Ok(HostMessage::FrameEnd) => stats.command(sink, Command::FrameEnd),
                    Err(_) => stats.rejected += 1,
                },
                Ok(None) => {}
                Err(_) => stats.rejected += 1,
            }
        }

        stats
    }

    fn reset(&mut self) {
        self.parser.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{Item, RecordingSink};
    use super::*;
    use std::vec;
    use vgalink_protocol::MAX_PACKET_SIZE;

    fn encode(msg: HostMessage<'_>) -> std::vec::Vec<u8> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = msg.encode(&mut buf).unwrap();
        buf[..len].to_vec()
    }

    #[test]
    fn test_pixel_packet() {
        let bytes = encode(HostMessage::Pixels(&[5, 6, 7]));
        let mut sink = RecordingSink::default();
        let stats = FramedDecoder::new().decode(&bytes, &mut sink);

        assert_eq!(
            sink.items,
            vec![
                Item::Command(Command::DataChunk),
                Item::Pixels(vec![5, 6, 7])
            ]
        );
        assert_eq!(stats.pixel_bytes, 3);
    }

    #[test]
    fn test_packet_split_across_blocks() {
        let bytes = encode(HostMessage::Pixels(&[1, 2, 3, 4]));
        let mut decoder = FramedDecoder::new();
        let mut sink = RecordingSink::default();

        decoder.decode(&bytes[..3], &mut sink);
        assert!(decoder.in_progress());
        assert!(sink.items.is_empty());

        decoder.decode(&bytes[3..], &mut sink);
        assert!(!decoder.in_progress());
        assert_eq!(sink.items.len(), 2);
    }

    #[test]
    fn test_corrupt_packet_dropped() {
        let mut bytes = encode(HostMessage::Pixels(&[1, 2, 3]));
        bytes[4] ^= 0x01;
        bytes.extend_from_slice(&encode(HostMessage::FrameEnd));

        let mut sink = RecordingSink::default();
        let stats = FramedDecoder::new().decode(&bytes, &mut sink);

        assert_eq!(sink.items, vec![Item::Command(Command::FrameEnd)]);
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_device_packet_rejected() {
        let mut buf = [0u8; 8];
        let len = vgalink_protocol::DeviceMessage::RequestData
            .to_packet()
            .encode(&mut buf)
            .unwrap();

        let mut sink = RecordingSink::default();
        let stats = FramedDecoder::new().decode(&buf[..len], &mut sink);
        assert!(sink.items.is_empty());
        assert_eq!(stats.rejected, 1);
    }

    #[test]
    fn test_reset_drops_partial_packet() {
        let bytes = encode(HostMessage::FrameStart);
        let mut decoder = FramedDecoder::new();
        let mut sink = RecordingSink::default();

        decoder.decode(&bytes[..2], &mut sink);
        decoder.reset();
        decoder.decode(&bytes[2..], &mut sink);
        assert!(sink.items.is_empty());
    }
}
