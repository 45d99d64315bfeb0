//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals and
//! the shared stream.

#[cfg(feature = "loopback")]
pub mod loopback;
pub mod stats;
pub mod usb_rx;
pub mod usb_tx;

#[cfg(feature = "loopback")]
pub use loopback::loopback_task;
pub use stats::stats_task;
pub use usb_rx::usb_rx_task;
pub use usb_tx::{usb_device_task, usb_tx_task, UsbDriver};
