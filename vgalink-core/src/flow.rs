//! Flow control and the command transmitter
//!
//! The device never tells the host how much to send. It polls its own fill
//! level and asks for more whenever the buffered lines drop to the
//! low-water mark. Requests are level triggered; the host must tolerate
//! repeats.

use vgalink_protocol::{encode_command, Command, PacketError, ProtocolVersion, MAX_COMMAND_LEN};

use crate::state::FrameState;
use crate::traits::HostLink;

/// Low-water mark tracking
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlowControl {
    threshold_bytes: usize,
    dedupe: bool,
    request_pending: bool,
}

impl FlowControl {
    pub fn new(threshold_bytes: usize, dedupe: bool) -> Self {
        Self {
            threshold_bytes,
            dedupe,
            request_pending: false,
        }
    }

    pub fn threshold_bytes(&self) -> usize {
        self.threshold_bytes
    }

    /// Check if a request is outstanding (dedupe mode only)
    pub fn is_pending(&self) -> bool {
        self.request_pending
    }

    /// Decide whether a data request is due now
    ///
    /// Only a receiving frame asks for data. Without dedupe every call at or
    /// below the threshold says yes; with dedupe only the first does until
    /// [`rearm`](Self::rearm).
    pub fn check(&mut self, state: FrameState, available_bytes: usize) -> bool {
        if state != FrameState::Receiving || available_bytes > self.threshold_bytes {
            return false;
        }
        if self.dedupe {
            if self.request_pending {
                return false;
            }
            self.request_pending = true;
        }
        true
    }

    /// Host sent data; allow the next request
    pub fn rearm(&mut self) {
        self.request_pending = false;
    }
}

/// Errors from sending a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SendError<E> {
    /// Command could not be encoded
    Encode(PacketError),
    /// Transport refused the bytes
    Link(E),
}

/// Sends single commands back to the host in the link's protocol version
#[derive(Debug)]
pub struct CommandTransmitter<L> {
    link: L,
    version: ProtocolVersion,
    sent: u32,
    failed: u32,
}

impl<L: HostLink> CommandTransmitter<L> {
    pub fn new(link: L, version: ProtocolVersion) -> Self {
        Self {
            link,
            version,
            sent: 0,
            failed: 0,
        }
    }

    /// Encode and queue one command
    pub fn send(&mut self, command: Command) -> Result<(), SendError<L::Error>> {
        let mut buf = [0u8; MAX_COMMAND_LEN];
        let result = encode_command(self.version, command, &mut buf)
            .map_err(SendError::Encode)
            .and_then(|len| self.link.send(&buf[..len]).map_err(SendError::Link));

        match result {
            Ok(()) => self.sent = self.sent.wrapping_add(1),
            Err(_) => self.failed = self.failed.wrapping_add(1),
        }
        result
    }

    /// Ask the host for more payload
    pub fn request_more_data(&mut self) -> Result<(), SendError<L::Error>> {
        self.send(Command::RequestData)
    }

    /// Tell the host the frame was consumed and the device is ready
    pub fn acknowledge_frame_end(&mut self) -> Result<(), SendError<L::Error>> {
        self.send(Command::Idle)
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Commands accepted by the link
    pub fn sent(&self) -> u32 {
        self.sent
    }

    /// Commands the link refused
    pub fn failed(&self) -> u32 {
        self.failed
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::vec::Vec;

    /// Link that records every send, optionally refusing them
    #[derive(Debug, Default)]
    pub struct RecordingLink {
        pub sent: Vec<Vec<u8>>,
        pub refuse: bool,
    }

    impl RecordingLink {
        /// Count how many sends carried `command` as a raw byte
        pub fn raw_count(&self, command: Command) -> usize {
            self.sent
                .iter()
                .filter(|bytes| bytes.as_slice() == [command.to_byte()])
                .count()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Refused;

    impl HostLink for RecordingLink {
        type Error = Refused;

        fn send(&mut self, bytes: &[u8]) -> Result<(), Refused> {
            if self.refuse {
                return Err(Refused);
            }
            self.sent.push(bytes.to_vec());
            Ok(())
        }
    }
}
