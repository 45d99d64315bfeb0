//! Message types carried by [`ProtocolVersion::Framed`] packets
//!
//! Message types are divided into two categories:
//! - Host → Device: frame start, pixel chunk, frame end
//! - Device → Host: request data, idle

use crate::command::{Command, ProtocolVersion, CMD_DATA_CHUNK, CMD_FRAME_END, CMD_FRAME_START};
use crate::packet::{encode_parts, Packet, PacketError};

/// Largest encoding of a single device→host command in any version
pub const MAX_COMMAND_LEN: usize = 4;

/// Messages from the host to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HostMessage<'a> {
    /// Begin a new frame
    FrameStart,
    /// Row-major pixel bytes for the current frame
    Pixels(&'a [u8]),
    /// Frame fully transferred
    FrameEnd,
}

impl<'a> HostMessage<'a> {
    /// Interpret a received packet
    ///
    /// An empty data chunk is a bare chunk header and maps to
    /// `Pixels(&[])`.
    pub fn from_packet(packet: &'a Packet) -> Result<Self, PacketError> {
        match packet.kind {
            CMD_FRAME_START => Ok(HostMessage::FrameStart),
            CMD_DATA_CHUNK => Ok(HostMessage::Pixels(&packet.payload)),
            CMD_FRAME_END => Ok(HostMessage::FrameEnd),
            _ => Err(PacketError::UnknownType),
        }
    }

    /// Encode into a byte buffer (host side, tests and loopback)
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PacketError> {
        match self {
            HostMessage::FrameStart => encode_parts(CMD_FRAME_START, &[], buffer),
            HostMessage::Pixels(pixels) => encode_parts(CMD_DATA_CHUNK, pixels, buffer),
            HostMessage::FrameEnd => encode_parts(CMD_FRAME_END, &[], buffer),
        }
    }
}

/// Messages from the device to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMessage {
    /// Line buffer is low
    RequestData,
    /// Frame consumed
    Idle,
}

impl DeviceMessage {
    pub fn from_packet(packet: &Packet) -> Result<Self, PacketError> {
        match Command::from_byte(packet.kind) {
            Some(Command::RequestData) => Ok(DeviceMessage::RequestData),
            Some(Command::Idle) => Ok(DeviceMessage::Idle),
            _ => Err(PacketError::UnknownType),
        }
    }

    pub const fn command(self) -> Command {
        match self {
            DeviceMessage::RequestData => Command::RequestData,
            DeviceMessage::Idle => Command::Idle,
        }
    }

    pub fn to_packet(self) -> Packet {
        Packet::empty(self.command().to_byte())
    }
}

/// Encode a single command as the given protocol version puts it on the wire
///
/// `Marker` and `Chunked` send the bare byte; `Framed` wraps it in an
/// empty-payload packet.
pub fn encode_command(
    version: ProtocolVersion,
    command: Command,
    buffer: &mut [u8],
) -> Result<usize, PacketError> {
    match version {
        ProtocolVersion::Marker | ProtocolVersion::Chunked => {
            let slot = buffer.first_mut().ok_or(PacketError::BufferTooSmall)?;
            *slot = command.to_byte();
            Ok(1)
        }
        ProtocolVersion::Framed => encode_parts(command.to_byte(), &[], buffer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::PacketParser;

    #[test]
    fn test_host_message_from_packet() {
        let packet = Packet::new(CMD_DATA_CHUNK, &[9, 8, 7]).unwrap();
        assert_eq!(
            HostMessage::from_packet(&packet),
            Ok(HostMessage::Pixels(&[9, 8, 7]))
        );

        let packet = Packet::empty(CMD_FRAME_END);
        assert_eq!(HostMessage::from_packet(&packet), Ok(HostMessage::FrameEnd));

        let packet = Packet::empty(0xA0);
        assert_eq!(
            HostMessage::from_packet(&packet),
            Err(PacketError::UnknownType)
        );
    }

    #[test]
    fn test_host_message_encode_parses() {
        let mut buffer = [0u8; 16];
        let len = HostMessage::Pixels(&[1, 2]).encode(&mut buffer).unwrap();

        let mut parser = PacketParser::new();
        let mut kind = None;
        for &b in &buffer[..len] {
            if let Some(packet) = parser.feed(b).unwrap() {
                kind = Some(packet.kind);
                assert_eq!(&packet.payload[..], &[1, 2]);
            }
        }
        assert_eq!(kind, Some(CMD_DATA_CHUNK));
    }

    #[test]
    fn test_device_message_roundtrip() {
        let packet = DeviceMessage::Idle.to_packet();
        assert_eq!(DeviceMessage::from_packet(&packet), Ok(DeviceMessage::Idle));
    }

    #[test]
    fn test_encode_command_raw() {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = encode_command(ProtocolVersion::Chunked, Command::RequestData, &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..len], &[0xA0]);

        let len =
            encode_command(ProtocolVersion::Marker, Command::Idle, &mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0xA1]);
    }

    #[test]
    fn test_encode_command_framed() {
        let mut buffer = [0u8; MAX_COMMAND_LEN];
        let len = encode_command(ProtocolVersion::Framed, Command::RequestData, &mut buffer)
            .unwrap();
        assert_eq!(&buffer[..len], &[0xAA, 0x00, 0xA0, 0xA0]);
    }

    #[test]
    fn test_encode_command_empty_buffer() {
        let mut buffer = [0u8; 0];
        assert_eq!(
            encode_command(ProtocolVersion::Chunked, Command::Idle, &mut buffer),
            Err(PacketError::BufferTooSmall)
        );
    }
}
