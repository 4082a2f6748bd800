//! HUB75 matrix scan
//!
//! Refreshes a single-colour 64x32 panel with 1:16 multiplexing: rows `r`
//! and `r + 16` are shifted in together through R1/R2, latched, then lit
//! for a share of the row period set by the brightness duty.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Timer};

use pixclock_core::display::{Color, FrameBuffer, HEIGHT, WIDTH};

use crate::channels::{BRIGHTNESS, FRAME};

/// Row pairs per frame
const SCAN_ROWS: u8 = (HEIGHT / 2) as u8;

/// Time slot of one row pair
const ROW_PERIOD_US: u64 = 400;

/// Panel control and data lines
pub struct MatrixPins {
    pub r1: Output<'static>,
    pub r2: Output<'static>,
    /// Row address lines A..D
    pub address: [Output<'static>; 4],
    pub clk: Output<'static>,
    pub lat: Output<'static>,
    /// Output enable, active low
    pub oe: Output<'static>,
}

impl MatrixPins {
    fn shift_row(&mut self, frame: &FrameBuffer, row: u8) {
        for x in 0..WIDTH as u8 {
            self.r1
                .set_level((frame.pixel(x, row) == Color::On).into());
            self.r2
                .set_level((frame.pixel(x, row + SCAN_ROWS) == Color::On).into());
            self.clk.set_high();
            self.clk.set_low();
        }
    }

    fn select_row(&mut self, row: u8) {
        for (bit, pin) in self.address.iter_mut().enumerate() {
            pin.set_level((row & (1 << bit) != 0).into());
        }
    }
}

#[embassy_executor::task]
pub async fn scan_task(mut pins: MatrixPins) {
    info!("Scan task started");

    let mut frame = FrameBuffer::new();
    let mut on_us = ROW_PERIOD_US;
    loop {
        FRAME.lock(|shared| frame.copy_from(&shared.borrow()));
        if let Some(duty) = BRIGHTNESS.try_take() {
            on_us = ROW_PERIOD_US * duty as u64 / u8::MAX as u64;
        }

        for row in 0..SCAN_ROWS {
            pins.shift_row(&frame, row);

            pins.oe.set_high();
            pins.select_row(row);
            pins.lat.set_high();
            pins.lat.set_low();
            if on_us > 0 {
                pins.oe.set_low();
                Timer::after(Duration::from_micros(on_us)).await;
                pins.oe.set_high();
            }
            Timer::after(Duration::from_micros(ROW_PERIOD_US - on_us)).await;
        }
    }
}
