//! vgalink - USB-fed VGA line streamer
//!
//! Firmware for STM32F103 "Blue Pill" boards. A host streams frames over
//! USB CDC; they are buffered line by line and clocked out as a 640x480
//! VGA raster (160x120 source, 4x upscale) from the line interrupt.
//!
//! Stream parameters come from stream.toml, validated at build time.

#![no_std]
#![no_main]

mod channels;
mod config;
mod link;
mod tasks;
mod vga;

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::time::Hertz;
use embassy_stm32::usb::{self, Driver};
use embassy_stm32::{bind_interrupts, peripherals};
use embassy_time::Timer;
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::Builder;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use vgalink_core::RasterLineSource;

use crate::config::{FULL_LINE_BYTES, LINE_WIDTH, RING_CAPACITY, STREAM_CONFIG};
use crate::link::ChannelLink;
use crate::tasks::usb_rx::USB_PACKET_SIZE;
use crate::vga::{PixelPins, SharedStream};

bind_interrupts!(struct Irqs {
    USB_LP_CAN1_RX0 => usb::InterruptHandler<peripherals::USB>;
});

// Static cells for USB descriptors and class state (must live forever)
static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static CDC_STATE: StaticCell<State> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("vgalink firmware starting...");

    let mut p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized (72 MHz)");

    // Shared state for the receive path and the line interrupt
    let stream = match SharedStream::new(STREAM_CONFIG, ChannelLink) {
        Ok(stream) => stream,
        Err(e) => defmt::panic!("Stream configuration rejected: {:?}", e),
    };
    let raster = match RasterLineSource::<FULL_LINE_BYTES>::new(&STREAM_CONFIG) {
        Ok(raster) => raster,
        Err(e) => defmt::panic!("Raster configuration rejected: {:?}", e),
    };
    info!(
        "Stream: {} x {} lines, ring {} bytes, threshold {} lines",
        LINE_WIDTH, STREAM_CONFIG.image_height, RING_CAPACITY, STREAM_CONFIG.threshold_lines
    );

    let pins = PixelPins {
        pb0: p.PB0,
        pb1: p.PB1,
        pb2: p.PB2,
        pb3: p.PB3,
        pb4: p.PB4,
        pb5: p.PB5,
        pb6: p.PB6,
        pb7: p.PB7,
    };
    vga::start(stream, raster, pins);

    // The Blue Pill has a fixed pull-up on D+; hold it low briefly so the
    // host sees a reset and enumerates again after a reflash
    {
        let _dp = Output::new(p.PA12.reborrow(), Level::Low, Speed::Low);
        Timer::after_millis(10).await;
    }

    let driver = Driver::new(p.USB, Irqs, p.PA12, p.PA11);

    let mut usb_config = embassy_usb::Config::new(0xc0de, 0xcafe);
    usb_config.manufacturer = Some("vgalink");
    usb_config.product = Some("vgalink VGA streamer");
    usb_config.serial_number = Some("00000001");
    usb_config.max_power = 100;
    usb_config.max_packet_size_0 = 64;

    let mut builder = Builder::new(
        driver,
        usb_config,
        CONFIG_DESCRIPTOR.init([0; 256]),
        BOS_DESCRIPTOR.init([0; 256]),
        &mut [], // no msos descriptors
        CONTROL_BUF.init([0; 64]),
    );

    let class = CdcAcmClass::new(
        &mut builder,
        CDC_STATE.init(State::new()),
        USB_PACKET_SIZE as u16,
    );
    let usb = builder.build();
    let (tx, rx) = class.split();

    info!("USB CDC initialized");

    // Spawn tasks
    spawner.spawn(tasks::usb_device_task(usb)).unwrap();
    spawner.spawn(tasks::usb_tx_task(tx)).unwrap();
    spawner.spawn(tasks::stats_task()).unwrap();

    #[cfg(not(feature = "loopback"))]
    spawner.spawn(tasks::usb_rx_task(rx)).unwrap();

    #[cfg(feature = "loopback")]
    {
        // The host side is simulated; host traffic is not decoded
        let _ = rx;
        spawner.spawn(tasks::loopback_task()).unwrap();
        info!("Loopback mode: feeding test pattern");
    }

    info!("All tasks spawned, firmware running");
}

/// 8 MHz HSE, PLL x9 to 72 MHz, USB at 48 MHz
fn clock_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL9,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}
