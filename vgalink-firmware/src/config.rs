//! Build-time configuration
//!
//! Generated by build.rs from stream.toml, which it has already validated
//! against the buffer geometry.

use vgalink_core::{OverflowPolicy, StarvationPolicy, StreamConfig, VgaTiming};
use vgalink_protocol::ProtocolVersion;

include!(concat!(env!("OUT_DIR"), "/stream_config.rs"));
