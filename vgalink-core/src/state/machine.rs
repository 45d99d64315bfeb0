//! Frame state machine definition
//!
//! Whether payload is accepted, and whether the raster may pull lines, is a
//! function of the current state.

use super::events::FrameEvent;

/// Frame reception states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameState {
    /// Nothing received since start-up
    #[default]
    Idle,
    /// Accepting pixel payload for the current frame
    Receiving,
    /// Host ended the frame; the next data chunk starts another
    Complete,
}

impl FrameState {
    /// Check if pixel payload is written to the ring in this state
    pub fn accepts_payload(&self) -> bool {
        matches!(self, FrameState::Receiving)
    }

    /// Check if the raster may pull lines in this state
    pub fn has_frame(&self) -> bool {
        !matches!(self, FrameState::Idle)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: FrameEvent) -> Self {
        use FrameEvent::*;
        use FrameState::*;

        match (self, event) {
            // A frame start always begins a fresh reception
            (_, FrameStart) => Receiving,

            (Idle, DataChunk) => Receiving,
            (Complete, DataChunk) => Receiving,
            (Receiving, DataChunk) => Receiving,

            (Receiving, Payload) => Receiving,

            // Counted even without a matching start so the host can always
            // force a frame boundary
            (_, FrameEnd) => Complete,

            // Payload outside a frame is ignored
            (Idle, Payload) => Idle,
            (Complete, Payload) => Complete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_to_receiving_on_data_chunk() {
        assert_eq!(
            FrameState::Idle.transition(FrameEvent::DataChunk),
            FrameState::Receiving
        );
    }

    #[test]
    fn test_frame_end_completes() {
        assert_eq!(
            FrameState::Receiving.transition(FrameEvent::FrameEnd),
            FrameState::Complete
        );
    }

    #[test]
    fn test_complete_is_transient() {
        let next = FrameState::Complete.transition(FrameEvent::DataChunk);
        assert_eq!(next, FrameState::Receiving);
    }

    #[test]
    fn test_frame_start_from_any_state() {
        for state in [FrameState::Idle, FrameState::Receiving, FrameState::Complete] {
            assert_eq!(state.transition(FrameEvent::FrameStart), FrameState::Receiving);
        }
    }

    #[test]
    fn test_payload_outside_frame_keeps_state() {
        assert_eq!(FrameState::Idle.transition(FrameEvent::Payload), FrameState::Idle);
        assert_eq!(
            FrameState::Complete.transition(FrameEvent::Payload),
            FrameState::Complete
        );
    }

    #[test]
    fn test_payload_acceptance() {
        assert!(FrameState::Receiving.accepts_payload());
        assert!(!FrameState::Idle.accepts_payload());
        assert!(!FrameState::Complete.accepts_payload());
        assert!(FrameState::Complete.has_frame());
        assert!(!FrameState::Idle.has_frame());
    }
}
