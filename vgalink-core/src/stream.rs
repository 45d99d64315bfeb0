//! Stream context
//!
//! [`Stream`] owns everything the receive path and the line interrupt
//! share: the line ring, the frame accounting, flow control and the
//! command transmitter. [`StreamContext`] pairs it with a decoder to give
//! the complete collaborator surface (`init`, `on_bytes_received`,
//! `get_line`, `get_available_lines`) in one value.
//!
//! # Critical sections
//!
//! With the stream behind a mutex, each of these runs under one lock:
//! - receive side: one `on_command` or `on_pixels` call (ring write plus
//!   `received_bytes` update plus flow check)
//! - line side: one `get_line` call (consume of the previous line, peek of
//!   the current one, flow check)

use vgalink_protocol::Command;

use crate::buffer::LineRing;
use crate::config::{ConfigError, OverflowPolicy, StarvationPolicy, StreamConfig};
use crate::decoder::{DecodeStats, Decoder, FrameSink, Receiver};
use crate::flow::{CommandTransmitter, FlowControl};
use crate::state::{FrameEvent, FrameManager, FrameState};
use crate::traits::{HostLink, LineSource};

/// Diagnostic counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StreamStats {
    /// Pixel bytes stored in the ring
    pub pixel_bytes: u32,
    /// Incoming bytes lost to a full ring or past the end of the frame
    pub dropped_bytes: u32,
    /// Unread bytes replaced by an overwriting write
    pub overwritten_bytes: u32,
    /// Pixel bytes received outside a frame
    pub ignored_bytes: u32,
    /// Device-to-host commands received from the host
    pub rejected_commands: u32,
    /// Lines handed to the raster
    pub lines_served: u32,
    /// Line requests that found less than a line buffered
    pub underruns: u32,
    /// Data requests accepted by the link
    pub requests_sent: u32,
    /// Commands the link refused
    pub send_failures: u32,
}

fn bump(counter: &mut u32, n: usize) {
    *counter = counter.saturating_add(n as u32);
}

/// Shared producer/consumer state for one video stream
pub struct Stream<L: HostLink, const C: usize, const W: usize> {
    ring: LineRing<C, W>,
    frame: FrameManager,
    flow: FlowControl,
    tx: CommandTransmitter<L>,
    config: StreamConfig,
    stats: StreamStats,
}

impl<L: HostLink, const C: usize, const W: usize> Stream<L, C, W> {
    /// Create a stream after checking `config` against the buffer geometry
    pub fn new(config: StreamConfig, link: L) -> Result<Self, ConfigError> {
        config.validate(W, C)?;

        Ok(Self {
            ring: LineRing::new(),
            frame: FrameManager::new(config.frame_size(W)),
            flow: FlowControl::new(config.threshold_bytes(W), config.dedupe_requests),
            tx: CommandTransmitter::new(link, config.protocol),
            config,
            stats: StreamStats::default(),
        })
    }

    /// Return to the start-up state
    pub fn reset(&mut self) {
        self.ring.reset();
        self.frame.init();
        self.flow.rearm();
        self.stats = StreamStats::default();
    }

    /// Apply one host command
    pub fn on_command(&mut self, command: Command) {
        let Some(event) = FrameEvent::from_command(command) else {
            bump(&mut self.stats.rejected_commands, 1);
            return;
        };

        match event {
            FrameEvent::FrameStart => {
                self.ring.reset();
                self.flow.rearm();
            }
            FrameEvent::DataChunk => self.flow.rearm(),
            FrameEvent::Payload | FrameEvent::FrameEnd => {}
        }

        self.frame.apply(event);

        match event {
            FrameEvent::FrameEnd => {
                if self.config.frame_end_discards() {
                    self.ring.reset();
                    self.frame.reset_counts();
                }
                if self.config.acknowledge_frames {
                    self.acknowledge_frame_end();
                }
            }
            // The payload that follows a chunk header runs the check after
            // its write
            FrameEvent::DataChunk => return,
            FrameEvent::FrameStart | FrameEvent::Payload => {}
        }

        self.check_flow();
    }

    /// Store pixel payload for the frame in flight
    ///
    /// Returns the number of bytes that went into the ring. Payload outside
    /// a frame is ignored, payload past the end of the frame is dropped, and
    /// a full ring is handled per the configured [`OverflowPolicy`].
    pub fn on_pixels(&mut self, pixels: &[u8]) -> usize {
        if !self.frame.state().accepts_payload() {
            bump(&mut self.stats.ignored_bytes, pixels.len());
            return 0;
        }
        self.flow.rearm();

        let admitted = self.frame.admit(pixels.len());
        bump(&mut self.stats.dropped_bytes, pixels.len() - admitted);

        let outcome = self.ring.write(&pixels[..admitted], self.config.overflow);
        self.frame.apply(FrameEvent::Payload);
        self.frame.record_received(outcome.stored);
        bump(&mut self.stats.pixel_bytes, outcome.stored);

        match self.config.overflow {
            OverflowPolicy::Drop => bump(&mut self.stats.dropped_bytes, outcome.lost),
            OverflowPolicy::Overwrite => {
                bump(&mut self.stats.overwritten_bytes, outcome.lost);
                if outcome.lost > 0 {
                    // The read cursor already skipped the line on screen
                    self.frame.clear_line_read();
                }
            }
        }

        self.check_flow();
        outcome.stored
    }

    /// Fetch source row `line_number` for the raster
    ///
    /// The line is peeked, not consumed. It is consumed when the raster asks
    /// for a different line number, so repeated calls for the same row
    /// return the same bytes. Returns `false` with a blank line before the
    /// first frame, and on underrun per the configured [`StarvationPolicy`].
    pub fn get_line(&mut self, line_number: u16, out: &mut [u8; W]) -> bool {
        if !self.frame.state().has_frame() {
            out.fill(0);
            return false;
        }

        if self.frame.select_line(line_number) && self.ring.consume_line() {
            self.frame.record_processed(W);
            self.check_flow();
        }

        if self.ring.peek_line(out) {
            self.frame.mark_line_read();
            bump(&mut self.stats.lines_served, 1);
            return true;
        }

        bump(&mut self.stats.underruns, 1);
        if self.config.starvation == StarvationPolicy::Blank {
            out.fill(0);
        }
        false
    }

    /// Complete lines buffered
    pub fn get_available_lines(&self) -> usize {
        self.ring.available_lines()
    }

    /// Ask the host for more data; returns `true` if the link took it
    pub fn request_more_data(&mut self) -> bool {
        match self.tx.request_more_data() {
            Ok(()) => {
                bump(&mut self.stats.requests_sent, 1);
                true
            }
            Err(_) => {
                bump(&mut self.stats.send_failures, 1);
                false
            }
        }
    }

    /// Tell the host this frame is done; returns `true` if the link took it
    pub fn acknowledge_frame_end(&mut self) -> bool {
        let sent = self.tx.acknowledge_frame_end().is_ok();
        if !sent {
            bump(&mut self.stats.send_failures, 1);
        }
        sent
    }

    fn check_flow(&mut self) {
        if self.flow.check(self.frame.state(), self.ring.available_bytes()) {
            self.request_more_data();
        }
    }

    pub fn state(&self) -> FrameState {
        self.frame.state()
    }

    pub fn ring(&self) -> &LineRing<C, W> {
        &self.ring
    }

    pub fn frame(&self) -> &FrameManager {
        &self.frame
    }

    pub fn flow(&self) -> &FlowControl {
        &self.flow
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn link(&self) -> &L {
        self.tx.link()
    }

    pub fn link_mut(&mut self) -> &mut L {
        self.tx.link_mut()
    }
}

impl<L: HostLink, const C: usize, const W: usize> FrameSink for Stream<L, C, W> {
    fn on_command(&mut self, command: Command) {
        Stream::on_command(self, command);
    }

    fn on_pixels(&mut self, pixels: &[u8]) {
        Stream::on_pixels(self, pixels);
    }
}

impl<L: HostLink, const C: usize, const W: usize> LineSource for Stream<L, C, W> {
    fn fetch_line(&mut self, row: u16, out: &mut [u8]) -> bool {
        match <&mut [u8; W]>::try_from(out) {
            Ok(line) => self.get_line(row, line),
            Err(_) => false,
        }
    }
}

/// A stream together with the decoder for its protocol version
pub struct StreamContext<L: HostLink, const C: usize, const W: usize> {
    receiver: Receiver,
    stream: Stream<L, C, W>,
}

impl<L: HostLink, const C: usize, const W: usize> StreamContext<L, C, W> {
    pub fn init(config: StreamConfig, link: L) -> Result<Self, ConfigError> {
        Ok(Self {
            receiver: Receiver::new(config.protocol),
            stream: Stream::new(config, link)?,
        })
    }

    /// Drop all buffered data, decoder state and counters
    pub fn reset(&mut self) {
        self.receiver.reset();
        self.stream.reset();
    }

    /// Feed one block exactly as the transport delivered it
    pub fn on_bytes_received(&mut self, block: &[u8]) -> DecodeStats {
        self.receiver.decode(block, &mut self.stream)
    }

    pub fn get_line(&mut self, line_number: u16, out: &mut [u8; W]) -> bool {
        self.stream.get_line(line_number, out)
    }

    pub fn get_available_lines(&self) -> usize {
        self.stream.get_available_lines()
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    pub fn stream(&self) -> &Stream<L, C, W> {
        &self.stream
    }

    pub fn stream_mut(&mut self) -> &mut Stream<L, C, W> {
        &mut self.stream
    }
}

impl<L: HostLink, const C: usize, const W: usize> LineSource for StreamContext<L, C, W> {
    fn fetch_line(&mut self, row: u16, out: &mut [u8]) -> bool {
        self.stream.fetch_line(row, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::testing::RecordingLink;
    use std::vec::Vec;
    use vgalink_protocol::{HostMessage, ProtocolVersion, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE};

    const W: usize = 160;
    const C: usize = 4800;

    type Ctx = StreamContext<RecordingLink, C, W>;

    fn context(config: StreamConfig) -> Ctx {
        StreamContext::init(config, RecordingLink::default()).unwrap()
    }

    fn chunked() -> Ctx {
        context(StreamConfig::for_protocol(ProtocolVersion::Chunked))
    }

    fn pixels(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i % 251) as u8).collect()
    }

    fn requests(ctx: &Ctx) -> usize {
        ctx.stream().link().raw_count(Command::RequestData)
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let result = StreamContext::<RecordingLink, 4864, 128>::init(
            StreamConfig::default(),
            RecordingLink::default(),
        );
        assert!(matches!(result, Err(ConfigError::LineWidthMismatch)));
    }

    #[test]
    fn test_idle_serves_blank_line() {
        let mut ctx = chunked();
        let mut out = [0x55u8; W];

        assert!(!ctx.get_line(0, &mut out));
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_payload_outside_frame_ignored() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&pixels(320));

        assert_eq!(ctx.get_available_lines(), 0);
        assert_eq!(ctx.stream().stats().ignored_bytes, 320);
    }

    #[test]
    fn test_data_chunk_then_payload() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(320));

        assert_eq!(ctx.stream().state(), FrameState::Receiving);
        assert_eq!(ctx.get_available_lines(), 2);
        assert_eq!(ctx.stream().frame().received_bytes(), 320);
    }

    #[test]
    fn test_frame_end_resets_accounting() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(640));
        let mut out = [0u8; W];
        ctx.get_line(0, &mut out);
        ctx.get_line(1, &mut out);

        ctx.on_bytes_received(&[Command::FrameEnd.to_byte()]);

        let frame = ctx.stream().frame();
        assert_eq!(frame.state(), FrameState::Complete);
        assert_eq!(frame.received_bytes(), 0);
        assert_eq!(frame.processed_bytes(), 0);
        assert_eq!(frame.frame_counter(), 1);
        assert_eq!(ctx.stream().ring().available_bytes(), 0);
    }

    #[test]
    fn test_next_data_chunk_starts_next_frame() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&[Command::FrameEnd.to_byte()]);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(160));

        assert_eq!(ctx.stream().state(), FrameState::Receiving);
        assert_eq!(ctx.get_available_lines(), 1);
    }

    #[test]
    fn test_same_line_twice_does_not_advance() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        let data = pixels(3 * W);
        ctx.on_bytes_received(&data);

        let mut first = [0u8; W];
        let mut second = [0u8; W];
        assert!(ctx.get_line(0, &mut first));
        assert!(ctx.get_line(0, &mut second));
        assert_eq!(first, second);
        assert_eq!(ctx.stream().ring().read_cursor(), 0);
        assert_eq!(ctx.stream().frame().processed_bytes(), 0);

        assert!(ctx.get_line(1, &mut second));
        assert_eq!(&second[..], &data[W..2 * W]);
        assert_eq!(ctx.stream().ring().read_cursor(), W);
        assert_eq!(ctx.stream().frame().processed_bytes(), W);
    }

    #[test]
    fn test_request_at_threshold_crossing() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(3200));
        let baseline = requests(&ctx);

        let mut out = [0u8; W];
        for line in 0..5 {
            ctx.get_line(line, &mut out);
        }
        assert_eq!(ctx.stream().ring().available_bytes(), 2560);
        assert_eq!(requests(&ctx), baseline);

        ctx.get_line(5, &mut out);
        assert_eq!(ctx.stream().ring().available_bytes(), 2400);
        assert_eq!(requests(&ctx), baseline + 1);

        // Same line: nothing consumed, nothing checked
        ctx.get_line(5, &mut out);
        assert_eq!(requests(&ctx), baseline + 1);

        // Still below: level triggered
        ctx.get_line(6, &mut out);
        assert_eq!(requests(&ctx), baseline + 2);
    }

    #[test]
    fn test_deduped_requests() {
        let config = StreamConfig {
            dedupe_requests: true,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        // A chunk header only re-arms; its payload decides
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        assert_eq!(requests(&ctx), 0);

        ctx.on_bytes_received(&pixels(800));
        assert_eq!(requests(&ctx), 1);

        let mut out = [0u8; W];
        for line in 0..4 {
            ctx.get_line(line, &mut out);
        }
        assert_eq!(requests(&ctx), 1);
        assert!(ctx.stream().flow().is_pending());
    }

    fn framed_pixels(data: &[u8]) -> Vec<u8> {
        let mut wire = Vec::new();
        let mut buf = [0u8; MAX_PACKET_SIZE];
        for chunk in data.chunks(MAX_PAYLOAD_SIZE) {
            let len = HostMessage::Pixels(chunk).encode(&mut buf).unwrap();
            wire.extend_from_slice(&buf[..len]);
        }
        wire
    }

    fn framed_start() -> Vec<u8> {
        let mut buf = [0u8; MAX_PACKET_SIZE];
        let len = HostMessage::FrameStart.encode(&mut buf).unwrap();
        buf[..len].to_vec()
    }

    #[test]
    fn test_framed_deduped_one_request_per_packet() {
        let config = StreamConfig {
            dedupe_requests: true,
            ..StreamConfig::default()
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&framed_start());
        let baseline = requests(&ctx);

        ctx.on_bytes_received(&framed_pixels(&pixels(200)));
        assert_eq!(requests(&ctx), baseline + 1);
        assert!(ctx.stream().flow().is_pending());
    }

    #[test]
    fn test_framed_packet_lifting_buffer_sends_nothing() {
        let mut ctx = context(StreamConfig::default());
        ctx.on_bytes_received(&framed_start());
        ctx.on_bytes_received(&framed_pixels(&pixels(2400)));
        assert_eq!(ctx.stream().ring().available_bytes(), 2400);
        let baseline = requests(&ctx);

        ctx.on_bytes_received(&framed_pixels(&pixels(250)));
        assert_eq!(ctx.stream().ring().available_bytes(), 2650);
        assert_eq!(requests(&ctx), baseline);
    }

    #[test]
    fn test_marker_chunk_header_with_payload_checks_once() {
        let config = StreamConfig {
            dedupe_requests: false,
            ..StreamConfig::for_protocol(ProtocolVersion::Marker)
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&[Command::FrameStart.to_byte()]);
        let baseline = requests(&ctx);

        let mut block = Vec::new();
        block.push(Command::DataChunk.to_byte());
        block.extend((0..W).map(|i| (i % 0xE0) as u8));
        ctx.on_bytes_received(&block);

        assert_eq!(ctx.get_available_lines(), 1);
        assert_eq!(requests(&ctx), baseline + 1);
    }

    #[test]
    fn test_payload_past_frame_end_dropped() {
        let config = StreamConfig {
            image_height: 2,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(400));

        assert_eq!(ctx.stream().frame().received_bytes(), 320);
        assert!(ctx.stream().frame().is_frame_received());
        assert_eq!(ctx.stream().stats().dropped_bytes, 80);
    }

    #[test]
    fn test_full_ring_drops_excess() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(4900));

        assert_eq!(ctx.stream().ring().available_bytes(), C);
        assert_eq!(ctx.stream().frame().received_bytes(), C);
        assert_eq!(ctx.stream().stats().dropped_bytes, 100);
    }

    #[test]
    fn test_full_ring_overwrites() {
        let config = StreamConfig {
            overflow: OverflowPolicy::Overwrite,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(4900));

        assert_eq!(ctx.stream().ring().write_cursor(), 100);
        assert_eq!(ctx.stream().stats().overwritten_bytes, 100);
        assert_eq!(ctx.stream().frame().received_bytes(), 4900);
    }

    #[test]
    fn test_starvation_policies() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        let mut out = [0x77u8; W];
        assert!(!ctx.get_line(0, &mut out));
        assert!(out.iter().all(|&b| b == 0x77));
        assert_eq!(ctx.stream().stats().underruns, 1);

        let config = StreamConfig {
            starvation: StarvationPolicy::Blank,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        assert!(!ctx.get_line(0, &mut out));
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_acknowledge_on_frame_end() {
        let config = StreamConfig {
            acknowledge_frames: true,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&[Command::FrameEnd.to_byte()]);

        assert_eq!(ctx.stream().link().raw_count(Command::Idle), 1);
    }

    #[test]
    fn test_device_commands_from_host_rejected() {
        let mut ctx = chunked();
        let decoded = ctx.on_bytes_received(&[Command::RequestData.to_byte()]);

        assert_eq!(decoded.rejected, 1);
        assert_eq!(decoded.commands, 0);
        assert_eq!(ctx.stream().state(), FrameState::Idle);
    }

    #[test]
    fn test_device_command_applied_directly_is_counted() {
        let mut ctx = chunked();
        ctx.stream_mut().on_command(Command::Idle);

        assert_eq!(ctx.stream().state(), FrameState::Idle);
        assert_eq!(ctx.stream().stats().rejected_commands, 1);
        assert!(ctx.stream().link().sent.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_oldest_surviving_line() {
        let config = StreamConfig {
            overflow: OverflowPolicy::Overwrite,
            ..StreamConfig::for_protocol(ProtocolVersion::Chunked)
        };
        let mut ctx = context(config);
        let data = pixels(C + W);
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&data[..C]);

        let mut out = [0u8; W];
        assert!(ctx.get_line(0, &mut out));
        assert_eq!(&out[..], &data[..W]);

        // Replaces the line on screen and moves the read cursor past it
        ctx.on_bytes_received(&data[C..]);
        assert_eq!(ctx.stream().ring().read_cursor(), W);

        assert!(ctx.get_line(1, &mut out));
        assert_eq!(&out[..], &data[W..2 * W]);
        assert_eq!(ctx.stream().ring().read_cursor(), W);
        assert_eq!(ctx.stream().frame().processed_bytes(), 0);
    }

    #[test]
    fn test_marker_frame_end_keeps_buffer() {
        let mut ctx = context(StreamConfig::for_protocol(ProtocolVersion::Marker));
        let mut block = Vec::new();
        block.push(Command::FrameStart.to_byte());
        block.extend((0..2 * W).map(|i| (i % 0xE0) as u8));
        block.push(Command::FrameEnd.to_byte());
        ctx.on_bytes_received(&block);

        assert_eq!(ctx.stream().state(), FrameState::Complete);
        assert_eq!(ctx.get_available_lines(), 2);

        let mut out = [0u8; W];
        assert!(ctx.get_line(0, &mut out));
        assert_eq!(&out[..], &block[1..1 + W]);
    }

    #[test]
    fn test_marker_frame_start_resets() {
        let mut ctx = context(StreamConfig::for_protocol(ProtocolVersion::Marker));
        ctx.on_bytes_received(&[Command::FrameStart.to_byte()]);
        ctx.on_bytes_received(&[0x10; 200]);
        ctx.on_bytes_received(&[Command::FrameStart.to_byte()]);

        assert_eq!(ctx.stream().ring().available_bytes(), 0);
        assert_eq!(ctx.stream().frame().received_bytes(), 0);
    }

    #[test]
    fn test_framed_end_to_end() {
        let mut ctx = context(StreamConfig::default());
        let data = pixels(2 * W);
        let mut wire = Vec::new();
        let mut buf = [0u8; MAX_PACKET_SIZE];

        let len = HostMessage::FrameStart.encode(&mut buf).unwrap();
        wire.extend_from_slice(&buf[..len]);
        for chunk in data.chunks(200) {
            let len = HostMessage::Pixels(chunk).encode(&mut buf).unwrap();
            wire.extend_from_slice(&buf[..len]);
        }

        // Transport splits the byte stream arbitrarily
        for block in wire.chunks(7) {
            ctx.on_bytes_received(block);
        }

        assert_eq!(ctx.get_available_lines(), 2);
        let mut out = [0u8; W];
        assert!(ctx.get_line(0, &mut out));
        assert_eq!(&out[..], &data[..W]);

        // Requests go out as empty packets
        assert!(ctx
            .stream()
            .link()
            .sent
            .iter()
            .all(|bytes| bytes.as_slice() == [0xAA, 0x00, 0xA0, 0xA0]));
    }

    #[test]
    fn test_line_source_rejects_wrong_width() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(W));

        let mut short = [0u8; 100];
        assert!(!ctx.fetch_line(0, &mut short));
        let mut exact = [0u8; W];
        assert!(ctx.fetch_line(0, &mut exact));
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut ctx = chunked();
        ctx.on_bytes_received(&[Command::DataChunk.to_byte()]);
        ctx.on_bytes_received(&pixels(W));
        ctx.reset();

        assert_eq!(ctx.stream().state(), FrameState::Idle);
        assert_eq!(ctx.get_available_lines(), 0);
        assert_eq!(ctx.stream().stats(), StreamStats::default());
    }
}
