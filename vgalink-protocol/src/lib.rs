//! vgalink host link protocol
//!
//! This crate defines the byte protocol spoken between the streaming host and
//! the VGA device over a serial-over-USB link. The host pushes pixel data for
//! one fixed-size frame at a time; the device answers with single flow-control
//! commands when its line buffer runs low.
//!
//! # Protocol Versions
//!
//! Three mutually incompatible versions exist. A link speaks exactly one.
//!
//! - [`ProtocolVersion::Marker`]: in-band marker bytes on a raw stream
//! - [`ProtocolVersion::Chunked`]: a 1-byte transport block is a command,
//!   anything longer is pixel payload
//! - [`ProtocolVersion::Framed`]: checksummed packets (default)
//!
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod messages;
pub mod packet;

pub use command::{Command, Direction, ProtocolVersion};
pub use messages::{encode_command, DeviceMessage, HostMessage, MAX_COMMAND_LEN};
pub use packet::{Packet, PacketError, PacketParser, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE, PACKET_START};
