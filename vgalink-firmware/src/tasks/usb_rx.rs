//! USB receive task
//!
//! Reads CDC packets from the host and decodes them into the shared
//! stream. The decoder lives here; the stream is locked once per decoded
//! command or pixel run, never across an await.

use defmt::*;
use embassy_usb::class::cdc_acm;
use embassy_usb::driver::EndpointError;

use vgalink_core::{Decoder, FrameSink, Receiver};
use vgalink_protocol::Command;

use crate::channels::HOST_CONNECTED;
use crate::config::STREAM_CONFIG;
use crate::vga::with_stream;

use super::usb_tx::UsbDriver;

/// Full-speed bulk packet size
pub const USB_PACKET_SIZE: usize = 64;

/// Sink that forwards into the shared stream
pub struct SharedSink;

impl FrameSink for SharedSink {
    fn on_command(&mut self, command: Command) {
        with_stream(|stream| stream.on_command(command));
    }

    fn on_pixels(&mut self, pixels: &[u8]) {
        with_stream(|stream| stream.on_pixels(pixels));
    }
}

/// USB RX task - decodes host traffic into the stream
#[embassy_executor::task]
pub async fn usb_rx_task(mut rx: cdc_acm::Receiver<'static, UsbDriver>) {
    info!("USB RX task started ({})", STREAM_CONFIG.protocol.name());

    let mut decoder = Receiver::new(STREAM_CONFIG.protocol);
    let mut buf = [0u8; USB_PACKET_SIZE];

    loop {
        rx.wait_connection().await;
        info!("Host connected");
        HOST_CONNECTED.signal(true);
        decoder.reset();

        loop {
            match rx.read_packet(&mut buf).await {
                Ok(n) => {
                    let stats = decoder.decode(&buf[..n], &mut SharedSink);
                    if stats.rejected > 0 {
                        debug!("Rejected {} item(s) in {} byte block", stats.rejected, n);
                    }
                }
                Err(EndpointError::BufferOverflow) => {
                    warn!("USB packet larger than {} bytes", USB_PACKET_SIZE);
                }
                Err(EndpointError::Disabled) => {
                    info!("Host disconnected");
                    HOST_CONNECTED.signal(false);
                    break;
                }
            }
        }
    }
}
