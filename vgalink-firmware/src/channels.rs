//! Inter-task communication channels
//!
//! Device-to-host commands are produced from both the receive task and the
//! line interrupt. Neither may wait for USB, so commands are queued here and
//! drained by the USB TX task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

use vgalink_protocol::MAX_COMMAND_LEN;

/// Channel capacity for outbound commands
const COMMAND_CHANNEL_SIZE: usize = 8;

/// One encoded device-to-host command
pub type CommandBytes = Vec<u8, MAX_COMMAND_LEN>;

/// Encoded commands waiting for the USB IN endpoint
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, CommandBytes, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Host opened or closed the CDC port (`true` = connected)
pub static HOST_CONNECTED: Signal<CriticalSectionRawMutex, bool> = Signal::new();
