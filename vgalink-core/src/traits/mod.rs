//! Collaborator traits
//!
//! These traits are the seams to the parts of the system this crate does
//! not own: the USB transport and the scanline output stage. Chip-specific
//! firmware implements them.

pub mod link;
pub mod output;

pub use link::HostLink;
pub use output::{LineSource, ScanlineOutput};
