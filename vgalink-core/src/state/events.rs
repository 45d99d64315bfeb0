//! Events that drive frame state transitions

use vgalink_protocol::Command;

/// Frame reception events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameEvent {
    /// Host started a new frame
    FrameStart,
    /// Host announced pixel payload
    DataChunk,
    /// Pixel payload arrived
    Payload,
    /// Host finished the frame
    FrameEnd,
}

impl FrameEvent {
    /// Map a host command to its event
    ///
    /// Device→host commands have no effect on reception and map to `None`.
    pub fn from_command(command: Command) -> Option<Self> {
        match command {
            Command::FrameStart => Some(FrameEvent::FrameStart),
            Command::DataChunk => Some(FrameEvent::DataChunk),
            Command::FrameEnd => Some(FrameEvent::FrameEnd),
            Command::RequestData | Command::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command() {
        assert_eq!(
            FrameEvent::from_command(Command::DataChunk),
            Some(FrameEvent::DataChunk)
        );
        assert_eq!(FrameEvent::from_command(Command::RequestData), None);
        assert_eq!(FrameEvent::from_command(Command::Idle), None);
    }
}
