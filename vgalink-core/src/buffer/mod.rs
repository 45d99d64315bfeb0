//! Line buffering between the USB receive path and the raster
//!
//! Fixed capacity, no allocation. The buffer itself is not synchronised;
//! see the crate docs for how the two contexts share it.

pub mod ring;

pub use ring::{LineRing, WriteOutcome};
