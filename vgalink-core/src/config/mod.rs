//! Configuration types
//!
//! Board-agnostic stream and timing configuration. The firmware fills these
//! in at build time from its TOML file.

pub mod stream;
pub mod timing;

pub use stream::*;
pub use timing::*;
