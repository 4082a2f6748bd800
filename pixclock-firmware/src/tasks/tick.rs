//! Tick task
//!
//! Drives the controller at a fixed rate. Shared queues are only locked
//! for the copy in or out; the controller itself runs on task-local state.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use pixclock_core::display::FrameBuffer;
use pixclock_core::input::InputQueue;
use pixclock_core::sound::SoundQueue;
use pixclock_core::{Controller, TickIo};

use crate::channels::{
    BRIGHTNESS, FRAME, INPUT, SOUND, SOUND_READY, SYNC_RESULT, SYNC_START, TEMPERATURE,
};
use crate::flash::FlashRecords;

/// Tick interval in milliseconds
pub const TICK_INTERVAL_MS: u64 = 10;

#[embassy_executor::task]
pub async fn tick_task(mut controller: Controller<FlashRecords<'static>>, mut fb: FrameBuffer) {
    info!("Tick task started");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut input = InputQueue::new();
    let mut sound = SoundQueue::new();
    let mut last = Instant::now();
    let mut brightness = None;

    loop {
        ticker.next().await;

        // Wall time follows the real elapsed interval, not the nominal one
        let now = Instant::now();
        let elapsed_us = (now - last).as_micros();
        last = now;

        if let Some(result) = SYNC_RESULT.try_take() {
            controller.submit_sync_result(result);
        }
        if let Some(reading) = TEMPERATURE.try_take() {
            controller.set_temperature(reading);
        }
        INPUT.lock(|queue| queue.borrow_mut().drain_into(&mut input));

        let report = controller.tick(
            elapsed_us,
            TickIo {
                input: &mut input,
                sound: &mut sound,
                framebuffer: &mut fb,
            },
        );

        if report.sync_request {
            debug!("Requesting time sync");
            SYNC_START.signal(());
        }

        if !sound.is_empty() {
            let drained = SOUND.lock(|queue| sound.drain_into(&mut queue.borrow_mut()));
            if drained.is_err() {
                warn!("Sound queue full, {} requests held back", sound.len());
            }
            SOUND_READY.signal(());
        }

        FRAME.lock(|frame| frame.borrow_mut().copy_from(&fb));

        if brightness != Some(report.brightness) {
            brightness = Some(report.brightness);
            debug!("Brightness {}", report.brightness);
            BRIGHTNESS.signal(report.brightness);
        }

        if report.saved_config || report.saved_reminders {
            info!(
                "Persisted config={} reminders={}",
                report.saved_config, report.saved_reminders
            );
        }
    }
}
