//! USB transmit task
//!
//! Drains queued device-to-host commands into the CDC IN endpoint.

use defmt::*;
use embassy_stm32::peripherals::USB;
use embassy_stm32::usb::Driver;
use embassy_usb::class::cdc_acm;
use embassy_usb::UsbDevice;

use crate::channels::COMMAND_CHANNEL;

pub type UsbDriver = Driver<'static, USB>;

/// USB device task - runs the control pipe and bus state machine
#[embassy_executor::task]
pub async fn usb_device_task(mut usb: UsbDevice<'static, UsbDriver>) -> ! {
    usb.run().await
}

/// USB TX task - sends flow-control and frame commands to the host
#[embassy_executor::task]
pub async fn usb_tx_task(mut tx: cdc_acm::Sender<'static, UsbDriver>) {
    info!("USB TX task started");

    loop {
        tx.wait_connection().await;

        // Requests queued while nobody listened are stale
        COMMAND_CHANNEL.clear();

        loop {
            let command = COMMAND_CHANNEL.receive().await;
            if let Err(e) = tx.write_packet(&command).await {
                warn!("Failed to send command: {:?}", e);
                break;
            }
            trace!("TX: {=[u8]:x}", command.as_slice());
        }
    }
}
