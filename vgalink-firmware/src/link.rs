//! Host link over the command channel

use vgalink_core::HostLink;

use crate::channels::{CommandBytes, COMMAND_CHANNEL};

/// Errors queueing a command for the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// Encoded command larger than a channel slot
    TooLong,
    /// TX task has not drained earlier commands
    QueueFull,
}

/// Queues commands for the USB TX task; never blocks
#[derive(Debug, Default)]
pub struct ChannelLink;

impl HostLink for ChannelLink {
    type Error = LinkError;

    fn send(&mut self, bytes: &[u8]) -> Result<(), LinkError> {
        let command = CommandBytes::from_slice(bytes).map_err(|_| LinkError::TooLong)?;
        COMMAND_CHANNEL
            .try_send(command)
            .map_err(|_| LinkError::QueueFull)
    }
}
