//! Periodic diagnostics
//!
//! Logs the stream and raster counters once per interval and reports host
//! connection changes as they happen.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use crate::channels::HOST_CONNECTED;
use crate::vga::{raster_counters, with_stream};

/// Report interval in milliseconds
pub const STATS_INTERVAL_MS: u64 = 1000;

/// Stats task - logs counters so underruns and drops show up over RTT
#[embassy_executor::task]
pub async fn stats_task() {
    info!("Stats task started");

    let mut ticker = Ticker::every(Duration::from_millis(STATS_INTERVAL_MS));

    loop {
        match select(ticker.next(), HOST_CONNECTED.wait()).await {
            Either::First(()) => report(),
            Either::Second(connected) => {
                let state = with_stream(|stream| stream.state());
                info!("Host link {}, stream {:?}", connected, state);
            }
        }
    }
}

fn report() {
    let Some((stats, lines, frame_counter)) = with_stream(|stream| {
        (
            stream.stats(),
            stream.get_available_lines(),
            stream.frame().frame_counter(),
        )
    }) else {
        return;
    };

    if let Some((frames, fetched, starved)) = raster_counters() {
        debug!(
            "raster: {} frames, {} rows fetched, {} starved",
            frames, fetched, starved
        );
    }

    info!(
        "stream: {} frames, {} lines buffered, {} underruns, {} dropped, {} requests",
        frame_counter, lines, stats.underruns, stats.dropped_bytes, stats.requests_sent
    );

    if stats.send_failures > 0 {
        warn!("{} command(s) not queued for the host", stats.send_failures);
    }
}
