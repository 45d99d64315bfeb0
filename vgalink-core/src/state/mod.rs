//! Frame reception state
//!
//! The state machine is explicit, finite, and deterministic. Byte and line
//! accounting for the frame in flight lives alongside it in
//! [`FrameManager`]; neither does any I/O.

pub mod events;
pub mod machine;
pub mod manager;

pub use events::FrameEvent;
pub use machine::FrameState;
pub use manager::FrameManager;
