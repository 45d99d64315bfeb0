//! Command byte space shared by all protocol versions
//!
//! Host → device: frame start, data chunk, frame end.
//! Device → host: request data, idle (frame acknowledgement).

/// Host signals a new frame; device resets its line buffer
pub const CMD_FRAME_START: u8 = 0xF0;
/// Host signals pixel payload follows
pub const CMD_DATA_CHUNK: u8 = 0xF1;
/// Host signals the frame is fully transferred
pub const CMD_FRAME_END: u8 = 0xF2;
/// Device asks the host for more payload
pub const CMD_REQUEST_DATA: u8 = 0xA0;
/// Device finished a frame and is ready for the next one
pub const CMD_IDLE: u8 = 0xA1;

/// Which way a command travels on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    HostToDevice,
    DeviceToHost,
}

/// Single-byte protocol command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Begin a new frame, discarding anything buffered
    FrameStart,
    /// Pixel payload follows
    DataChunk,
    /// Frame fully transferred
    FrameEnd,
    /// Line buffer is low, send more payload
    RequestData,
    /// Frame consumed, ready for the next
    Idle,
}

impl Command {
    /// Wire value of this command
    pub const fn to_byte(self) -> u8 {
        match self {
            Command::FrameStart => CMD_FRAME_START,
            Command::DataChunk => CMD_DATA_CHUNK,
            Command::FrameEnd => CMD_FRAME_END,
            Command::RequestData => CMD_REQUEST_DATA,
            Command::Idle => CMD_IDLE,
        }
    }

    /// Parse a wire value
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            CMD_FRAME_START => Some(Command::FrameStart),
            CMD_DATA_CHUNK => Some(Command::DataChunk),
            CMD_FRAME_END => Some(Command::FrameEnd),
            CMD_REQUEST_DATA => Some(Command::RequestData),
            CMD_IDLE => Some(Command::Idle),
            _ => None,
        }
    }

    pub const fn direction(self) -> Direction {
        match self {
            Command::FrameStart | Command::DataChunk | Command::FrameEnd => {
                Direction::HostToDevice
            }
            Command::RequestData | Command::Idle => Direction::DeviceToHost,
        }
    }

    /// Check if this byte is one of the in-band host markers
    ///
    /// In [`ProtocolVersion::Marker`] these values can never appear as pixels.
    pub const fn is_host_marker(byte: u8) -> bool {
        matches!(byte, CMD_FRAME_START | CMD_DATA_CHUNK | CMD_FRAME_END)
    }
}

/// Link protocol version
///
/// The versions reuse the same command byte values but frame them
/// differently; a host and device must agree on one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ProtocolVersion {
    /// Raw byte stream with in-band marker bytes
    Marker,
    /// Transport blocks of length 1 are commands, longer blocks are pixels
    Chunked,
    /// Checksummed packets
    #[default]
    Framed,
}

impl ProtocolVersion {
    /// Parse a version name as used in configuration files
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "marker" => Some(ProtocolVersion::Marker),
            "chunked" => Some(ProtocolVersion::Chunked),
            "framed" => Some(ProtocolVersion::Framed),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ProtocolVersion::Marker => "marker",
            ProtocolVersion::Chunked => "chunked",
            ProtocolVersion::Framed => "framed",
        }
    }
}
