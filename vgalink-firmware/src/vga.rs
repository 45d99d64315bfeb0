//! VGA scanline generation
//!
//! Three timers produce the raster:
//! - TIM1 is the pixel clock; each update requests one DMA1 channel 5
//!   transfer from the line buffer to GPIOB (PB0..PB7 carry the pixel)
//! - TIM2 runs one period per scanline, drives HSYNC on PA0 and raises the
//!   line interrupt
//! - TIM3 counts TIM2 updates, one period per frame, and drives VSYNC on PA6
//!
//! The line interrupt re-arms the DMA for the line about to start and then
//! prepares the buffer for the next one. The stream shared with the USB
//! tasks is only touched through [`with_stream`].

use core::cell::RefCell;

use defmt::*;
use embassy_stm32::gpio::{Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::pac;
use embassy_stm32::pac::gpio::vals::{CnfOut, Mode};
use embassy_stm32::pac::timer::vals::{Mms, Ocm, Sms, Ts};
use embassy_stm32::Peri;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;

use vgalink_core::{LineSource, LineTick, RasterLineSource, ScanlineOutput, Stream, VgaTiming};

use crate::config::{FULL_LINE_BYTES, LINE_WIDTH, RING_CAPACITY, STREAM_CONFIG};
use crate::link::ChannelLink;

/// Stream shared between the USB tasks and the line interrupt
pub type SharedStream = Stream<ChannelLink, RING_CAPACITY, LINE_WIDTH>;

/// Raster state owned by the line interrupt
pub type Raster = RasterLineSource<FULL_LINE_BYTES>;

/// 72 MHz / 12 = 6 MHz, four pixel clocks of the 25.175 MHz mode
const PIXEL_TIMER_RELOAD: u16 = 11;

/// 72 MHz ticks per scanline (31.47 kHz); build.rs only admits timings
/// with the 800-clock line this rate belongs to
const LINE_TICKS: u32 = 2288;

const TIMING: VgaTiming = STREAM_CONFIG.timing;

const LINE_TIMER_RELOAD: u16 = (LINE_TICKS - 1) as u16;

/// HSYNC pulse in 72 MHz ticks
const HSYNC_TICKS: u16 =
    (LINE_TICKS * TIMING.h_sync as u32 / TIMING.whole_line() as u32) as u16;

/// TIM3 counts scanlines, one period per frame
const FRAME_TIMER_RELOAD: u16 = TIMING.whole_frame() - 1;

/// VSYNC pulse in scanlines
const VSYNC_LINES: u16 = TIMING.v_sync;

/// DMA1 channel 5 serves TIM1_UP (index 4)
const PIXEL_DMA_CHANNEL: usize = 4;

static STREAM: Mutex<CriticalSectionRawMutex, RefCell<Option<SharedStream>>> =
    Mutex::new(RefCell::new(None));

static RASTER: Mutex<CriticalSectionRawMutex, RefCell<Option<Raster>>> =
    Mutex::new(RefCell::new(None));

static PIXEL_PINS: StaticCell<[Output<'static>; 8]> = StaticCell::new();

/// Pixel port pins PB0..PB7
pub struct PixelPins {
    pub pb0: Peri<'static, embassy_stm32::peripherals::PB0>,
    pub pb1: Peri<'static, embassy_stm32::peripherals::PB1>,
    pub pb2: Peri<'static, embassy_stm32::peripherals::PB2>,
    pub pb3: Peri<'static, embassy_stm32::peripherals::PB3>,
    pub pb4: Peri<'static, embassy_stm32::peripherals::PB4>,
    pub pb5: Peri<'static, embassy_stm32::peripherals::PB5>,
    pub pb6: Peri<'static, embassy_stm32::peripherals::PB6>,
    pub pb7: Peri<'static, embassy_stm32::peripherals::PB7>,
}

/// Run `f` on the shared stream inside a critical section
///
/// Returns `None` before [`start`] has installed the stream.
pub fn with_stream<R>(f: impl FnOnce(&mut SharedStream) -> R) -> Option<R> {
    STREAM.lock(|cell| cell.borrow_mut().as_mut().map(f))
}

/// Raster counters: frames, fetched rows, starved rows
pub fn raster_counters() -> Option<(u32, u32, u32)> {
    RASTER.lock(|cell| {
        cell.borrow()
            .as_ref()
            .map(|r| (r.frames(), r.fetched(), r.starved()))
    })
}

/// Install the shared state and start the raster
pub fn start(stream: SharedStream, raster: Raster, pins: PixelPins) {
    STREAM.lock(|cell| cell.replace(Some(stream)));
    RASTER.lock(|cell| cell.replace(Some(raster)));

    PIXEL_PINS.init([
        Output::new(pins.pb0, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb1, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb2, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb3, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb4, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb5, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb6, Level::Low, Speed::VeryHigh),
        Output::new(pins.pb7, Level::Low, Speed::VeryHigh),
    ]);

    enable_clocks();
    configure_sync_pins();
    configure_pixel_dma();
    configure_timers();

    interrupt::TIM2.set_priority(Priority::P0);
    // SAFETY: the handler only reaches shared state through the mutexes above
    unsafe { interrupt::TIM2.enable() };

    info!(
        "VGA raster started ({} byte lines, {} byte ring)",
        FULL_LINE_BYTES, RING_CAPACITY
    );
}

fn enable_clocks() {
    pac::RCC.apb2enr().modify(|w| {
        w.set_tim1en(true);
        w.set_afioen(true);
    });
    pac::RCC.apb1enr().modify(|w| {
        w.set_tim2en(true);
        w.set_tim3en(true);
    });
    pac::RCC.ahbenr().modify(|w| w.set_dma1en(true));
}

/// PA0 (TIM2_CH1) and PA6 (TIM3_CH1) as alternate-function push-pull
fn configure_sync_pins() {
    pac::GPIOA.cr(0).modify(|w| {
        for pin in [0, 6] {
            w.set_mode(pin, Mode::OUTPUT50MHZ);
            w.set_cnf_out(pin, CnfOut::ALTPUSHPULL);
        }
    });
}

/// Memory-to-GPIOB, byte reads widened to half-word writes
fn configure_pixel_dma() {
    let ch = pac::DMA1.ch(PIXEL_DMA_CHANNEL);
    ch.cr().write(|w| {
        w.set_dir(pac::bdma::vals::Dir::FROM_MEMORY);
        w.set_minc(true);
        w.set_pinc(false);
        w.set_msize(pac::bdma::vals::Size::BITS8);
        w.set_psize(pac::bdma::vals::Size::BITS16);
        w.set_pl(pac::bdma::vals::Pl::VERY_HIGH);
    });
    ch.par().write_value(pac::GPIOB.odr().as_ptr() as u32);
}

fn configure_timers() {
    // Pixel clock, DMA request on every update
    let tim1 = pac::TIM1;
    tim1.psc().write_value(0);
    tim1.arr().write(|w| w.set_arr(PIXEL_TIMER_RELOAD));
    tim1.dier().modify(|w| w.set_ude(true));

    // Line timer: HSYNC active low for the first HSYNC_TICKS of each line
    let tim2 = pac::TIM2;
    tim2.psc().write_value(0);
    tim2.arr().write(|w| w.set_arr(LINE_TIMER_RELOAD.into()));
    tim2.ccr(0).write(|w| w.set_ccr(HSYNC_TICKS.into()));
    tim2.ccmr_output(0).modify(|w| w.set_ocm(0, Ocm::PWM_MODE2));
    tim2.ccer().modify(|w| w.set_cce(0, true));
    tim2.cr2().modify(|w| w.set_mms(Mms::UPDATE));
    tim2.dier().modify(|w| w.set_uie(true));

    // Frame timer clocked by TIM2 updates: VSYNC for the first lines. Its
    // period must equal the raster's frame length or the picture rolls.
    let tim3 = pac::TIM3;
    tim3.psc().write_value(0);
    tim3.arr().write(|w| w.set_arr(FRAME_TIMER_RELOAD.into()));
    tim3.ccr(0).write(|w| w.set_ccr(VSYNC_LINES.into()));
    tim3.ccmr_output(0).modify(|w| w.set_ocm(0, Ocm::PWM_MODE2));
    tim3.ccer().modify(|w| w.set_cce(0, true));
    tim3.smcr().modify(|w| {
        w.set_ts(Ts::ITR1);
        w.set_sms(Sms::EXT_CLOCK_MODE);
    });

    tim3.cr1().modify(|w| w.set_cen(true));
    tim1.cr1().modify(|w| w.set_cen(true));
    tim2.cr1().modify(|w| w.set_cen(true));
}

/// Re-arms the pixel DMA on a line buffer
struct DmaLatch;

impl ScanlineOutput for DmaLatch {
    fn latch(&mut self, line: &[u8]) {
        let ch = pac::DMA1.ch(PIXEL_DMA_CHANNEL);
        ch.cr().modify(|w| w.set_en(false));
        ch.mar().write_value(line.as_ptr() as u32);
        ch.ndtr().write(|w| w.set_ndt(line.len() as u16));
        ch.cr().modify(|w| w.set_en(true));
    }
}

/// Pulls rows from the shared stream
struct SharedSource;

impl LineSource for SharedSource {
    fn fetch_line(&mut self, row: u16, out: &mut [u8]) -> bool {
        with_stream(|stream| stream.fetch_line(row, out)).unwrap_or(false)
    }
}

#[interrupt]
fn TIM2() {
    pac::TIM2.sr().modify(|w| w.set_uif(false));

    RASTER.lock(|cell| {
        if let Some(raster) = cell.borrow_mut().as_mut() {
            if raster.on_line_tick(&mut SharedSource, &mut DmaLatch) == LineTick::Starved {
                trace!("line {} starved", raster.current_line());
            }
        }
    });
}
