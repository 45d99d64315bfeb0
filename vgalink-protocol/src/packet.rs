//! Packet encoding and decoding for [`ProtocolVersion::Framed`](crate::ProtocolVersion)
//!
//! Packet format:
//! - START (1 byte): 0xAA synchronization byte
//! - LENGTH (1 byte): payload length (0-250)
//! - TYPE (1 byte): command byte (see [`crate::command`])
//! - PAYLOAD (0-250 bytes): pixels for data chunks, empty otherwise
//! - CHECKSUM (1 byte): XOR of LENGTH, TYPE, and all PAYLOAD bytes

use heapless::Vec;

/// Packet synchronization byte
pub const PACKET_START: u8 = 0xAA;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Maximum encoded packet size (START + LENGTH + TYPE + MAX_PAYLOAD + CHECKSUM)
pub const MAX_PACKET_SIZE: usize = 1 + 1 + 1 + MAX_PAYLOAD_SIZE + 1;

/// Bytes a packet adds around its payload
const OVERHEAD: usize = 4;

/// Errors that can occur during packet parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Declared length out of range
    InvalidLength,
    /// Type byte is not a known command
    UnknownType,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A parsed or constructed packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command byte
    pub kind: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Packet {
    /// Create a packet carrying a payload
    pub fn new(kind: u8, payload: &[u8]) -> Result<Self, PacketError> {
        let mut buf = Vec::new();
        buf.extend_from_slice(payload)
            .map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(Self { kind, payload: buf })
    }

    /// Create a packet with no payload
    pub fn empty(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    fn checksum(length: u8, kind: u8, payload: &[u8]) -> u8 {
        payload.iter().fold(length ^ kind, |acc, &b| acc ^ b)
    }

    /// Number of bytes [`encode`](Self::encode) will produce
    pub fn encoded_len(&self) -> usize {
        OVERHEAD + self.payload.len()
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PacketError> {
        encode_parts(self.kind, &self.payload, buffer)
    }
}

/// Encode a packet directly from its parts without building a [`Packet`]
///
/// Used on the hot path where the payload already lives in another buffer.
pub fn encode_parts(kind: u8, payload: &[u8], buffer: &mut [u8]) -> Result<usize, PacketError> {
    if payload.len() > MAX_PAYLOAD_SIZE {
        return Err(PacketError::PayloadTooLarge);
    }
    let total = OVERHEAD + payload.len();
    let out = buffer
        .get_mut(..total)
        .ok_or(PacketError::BufferTooSmall)?;

    let length = payload.len() as u8;
    let (head, rest) = out.split_at_mut(3);
    head.copy_from_slice(&[PACKET_START, length, kind]);
    let (body, tail) = rest.split_at_mut(payload.len());
    body.copy_from_slice(payload);
    tail[0] = Packet::checksum(length, kind, payload);

    Ok(total)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    /// Waiting for START byte
    Sync,
    /// Got START, waiting for LENGTH
    Length,
    /// Got LENGTH, waiting for TYPE
    Kind,
    /// Reading payload bytes
    Payload,
    /// Waiting for CHECKSUM
    Checksum,
    /// Last byte completed a packet; it is held until the next feed
    Done,
}

/// Incremental packet parser
///
/// Completed packets are lent out by reference so payloads are never copied
/// a second time.
#[derive(Debug, Clone)]
pub struct PacketParser {
    state: ParseState,
    expected_length: u8,
    packet: Packet,
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::Sync,
            expected_length: 0,
            packet: Packet::empty(0),
        }
    }

    /// Drop any partially received packet
    pub fn reset(&mut self) {
        self.state = ParseState::Sync;
        self.expected_length = 0;
        self.packet.kind = 0;
        self.packet.payload.clear();
    }

    /// Check whether a packet is partially received
    pub fn in_progress(&self) -> bool {
        !matches!(self.state, ParseState::Sync | ParseState::Done)
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(packet))` when the byte completes a valid packet,
    /// `Ok(None)` when more bytes are needed. On error the parser has already
    /// resynchronised and waits for the next START byte.
    pub fn feed(&mut self, byte: u8) -> Result<Option<&Packet>, PacketError> {
        if self.state == ParseState::Done {
            self.reset();
        }

        match self.state {
            ParseState::Sync => {
                // Anything before START is line noise
                if byte == PACKET_START {
                    self.state = ParseState::Length;
                }
                Ok(None)
            }
            ParseState::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(PacketError::InvalidLength);
                }
                self.expected_length = byte;
                self.state = ParseState::Kind;
                Ok(None)
            }
            ParseState::Kind => {
                self.packet.kind = byte;
                self.packet.payload.clear();
                self.state = if self.expected_length == 0 {
                    ParseState::Checksum
                } else {
                    ParseState::Payload
                };
                Ok(None)
            }
            ParseState::Payload => {
                // Bounded by expected_length <= MAX_PAYLOAD_SIZE
                let _ = self.packet.payload.push(byte);
                if self.packet.payload.len() == self.expected_length as usize {
                    self.state = ParseState::Checksum;
                }
                Ok(None)
            }
            ParseState::Checksum => {
                let expected =
                    Packet::checksum(self.expected_length, self.packet.kind, &self.packet.payload);
                if byte != expected {
                    self.reset();
                    return Err(PacketError::InvalidChecksum);
                }
                self.state = ParseState::Done;
                Ok(Some(&self.packet))
            }
            ParseState::Done => Ok(None),
        }
    }
}
