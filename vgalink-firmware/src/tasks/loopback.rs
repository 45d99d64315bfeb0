//! Loopback self-test task
//!
//! Stands in for the host: feeds a built-in test pattern through the
//! chunked decoder into the shared stream, paced by a ticker.

use defmt::*;
use embassy_time::{Duration, Ticker};

use vgalink_core::loopback::test_pattern;
use vgalink_core::{Decoder, LoopbackHost, LoopbackStep, Receiver};
use vgalink_protocol::ProtocolVersion;

use crate::config::{FRAME_BYTES, LINE_WIDTH};
use crate::vga::with_stream;

use super::usb_rx::SharedSink;

/// The raster drains about 1.2 kB per millisecond; one refill per
/// millisecond keeps it ahead
const FEED_INTERVAL_MS: u64 = 1;

static TEST_IMAGE: [u8; FRAME_BYTES] = test_pattern(LINE_WIDTH);

/// Loopback task - plays the host with a test pattern
#[embassy_executor::task]
pub async fn loopback_task() {
    info!("Loopback task started ({} byte frames)", FRAME_BYTES);

    let mut host = LoopbackHost::new(&TEST_IMAGE);
    let mut decoder = Receiver::new(ProtocolVersion::Chunked);
    let mut ticker = Ticker::every(Duration::from_millis(FEED_INTERVAL_MS));

    loop {
        // Refill until the host has nothing more to send this round
        loop {
            let step = with_stream(|stream| host.poll(stream)).unwrap_or(LoopbackStep::Wait);

            step.deliver(|block| {
                decoder.decode(block, &mut SharedSink);
            });

            match step {
                LoopbackStep::Pixels(_) => {}
                LoopbackStep::Restart => {
                    debug!("Loopback frame {} done", host.frames());
                    break;
                }
                LoopbackStep::Start | LoopbackStep::Wait => break,
            }
        }

        ticker.next().await;
    }
}
