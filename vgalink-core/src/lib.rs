//! Board-agnostic core logic for the vgalink VGA line streamer
//!
//! This crate contains everything between the USB receive callback and the
//! scanline output latch that does not depend on a specific chip:
//!
//! - Line ring buffer (single producer, single consumer)
//! - Frame state machine and byte accounting
//! - Receive-path decoders for each protocol version
//! - Flow control and the command transmitter
//! - Raster line source driven by the line-timing interrupt
//! - Collaborator traits (host link, scanline output)
//! - Loopback host for self-test builds
//!
//! # Execution contexts
//!
//! ```text
//!  receive context                 line interrupt
//!  ───────────────                 ──────────────
//!  Receiver::decode ──► Stream ◄── RasterLineSource::on_line_tick
//!                         │
//!                         └──► CommandTransmitter ──► HostLink
//! ```
//!
//! [`Stream`] holds all state shared by the two contexts. It is a plain
//! value with `&mut self` methods; the firmware decides how exclusive access
//! is obtained (a critical-section mutex on a single core).

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod config;
pub mod decoder;
pub mod flow;
pub mod loopback;
pub mod raster;
pub mod state;
pub mod stream;
pub mod traits;

pub use buffer::{LineRing, WriteOutcome};
pub use config::{ConfigError, OverflowPolicy, StarvationPolicy, StreamConfig, VgaTiming};
pub use decoder::{DecodeStats, Decoder, FrameSink, Receiver};
pub use flow::{CommandTransmitter, FlowControl, SendError};
pub use loopback::{LoopbackHost, LoopbackStep};
pub use raster::{LineTick, RasterLineSource};
pub use state::{FrameEvent, FrameManager, FrameState};
pub use stream::{Stream, StreamContext, StreamStats};
pub use traits::{HostLink, LineSource, ScanlineOutput};
