//! pixclock - Pixel-Matrix Clock Firmware
//!
//! Main firmware binary for RP2040 boards driving a 64x32 single-colour
//! HUB75 panel, three front-panel buttons, a buzzer and a UART link to a
//! network time co-processor.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel, InterruptHandler as AdcInterruptHandler};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::UART1;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixclock_core::display::FrameBuffer;
use pixclock_core::storage::ConfigStore;
use pixclock_core::Controller;
use pixclock_protocol::ButtonEvent;

use crate::flash::{FlashRecords, STORE_BASE};
use crate::tasks::MatrixPins;

mod channels;
mod flash;
mod tasks;

bind_interrupts!(struct Irqs {
    UART1_IRQ => BufferedInterruptHandler<UART1>;
    ADC_IRQ_FIFO => AdcInterruptHandler;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("pixclock firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Records live at the end of flash
    let store = ConfigStore::new(FlashRecords::new(p.FLASH), STORE_BASE);
    let mut fb = FrameBuffer::new();
    let controller = unwrap!(Controller::boot(store, &mut fb));
    let faults = controller.faults();
    if faults.config_corrupt || faults.reminders_corrupt {
        warn!(
            "Booted with defaults (config corrupt={}, reminders corrupt={})",
            faults.config_corrupt, faults.reminders_corrupt
        );
    }
    info!("Controller booted");

    // Time link: UART1 TX=GPIO4 RX=GPIO5, 115200 baud
    let tx_buf = TX_BUF.init([0u8; 64]);
    let rx_buf = RX_BUF.init([0u8; 64]);
    let uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (link_tx, link_rx) = uart.split();

    // Buttons: SET=GPIO2 UP=GPIO17 DOWN=GPIO15, active low
    let set = Input::new(p.PIN_2, Pull::Up);
    let up = Input::new(p.PIN_17, Pull::Up);
    let down = Input::new(p.PIN_15, Pull::Up);

    let buzzer = Output::new(p.PIN_14, Level::Low);

    let adc = Adc::new(p.ADC, Irqs, embassy_rp::adc::Config::default());
    let sensor = Channel::new_temp_sensor(p.ADC_TEMP_SENSOR);

    // Panel starts blanked (OE high)
    let matrix = MatrixPins {
        r1: Output::new(p.PIN_0, Level::Low),
        r2: Output::new(p.PIN_3, Level::Low),
        address: [
            Output::new(p.PIN_6, Level::Low),
            Output::new(p.PIN_7, Level::Low),
            Output::new(p.PIN_18, Level::Low),
            Output::new(p.PIN_19, Level::Low),
        ],
        clk: Output::new(p.PIN_11, Level::Low),
        lat: Output::new(p.PIN_12, Level::Low),
        oe: Output::new(p.PIN_13, Level::High),
    };

    info!("Hardware initialized");

    // embassy-executor 0.9: task constructors return Result<SpawnToken, SpawnError>
    spawner.spawn(unwrap!(tasks::tick_task(controller, fb)));
    spawner.spawn(unwrap!(tasks::scan_task(matrix)));
    spawner.spawn(unwrap!(tasks::time_link_task(link_tx, link_rx)));
    spawner.spawn(unwrap!(tasks::button_task(
        set,
        ButtonEvent::Set,
        ButtonEvent::SetLong
    )));
    spawner.spawn(unwrap!(tasks::button_task(up, ButtonEvent::Up, ButtonEvent::UpLong)));
    spawner.spawn(unwrap!(tasks::button_task(
        down,
        ButtonEvent::Down,
        ButtonEvent::DownLong
    )));
    spawner.spawn(unwrap!(tasks::buzzer_task(buzzer)));
    spawner.spawn(unwrap!(tasks::temperature_task(adc, sensor)));

    info!(
        "All tasks spawned, ticking every {}ms",
        tasks::TICK_INTERVAL_MS
    );

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
