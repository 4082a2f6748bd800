//! Buzzer driver
//!
//! Plays queued requests on an active buzzer: each tone keeps the pin high
//! for the request's duration, with a pause of the same length between
//! repeats and after the last tone.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Timer};

use crate::channels::{SOUND, SOUND_READY};

#[embassy_executor::task]
pub async fn buzzer_task(mut pin: Output<'static>) {
    info!("Buzzer task started");

    loop {
        let Some(request) = SOUND.lock(|queue| queue.borrow_mut().pop()) else {
            SOUND_READY.wait().await;
            continue;
        };
        trace!(
            "Tone {}ms x{}",
            request.duration_ms,
            request.repeat_count
        );

        let length = Duration::from_millis(request.duration_ms as u64);
        for _ in 0..request.repeat_count {
            pin.set_high();
            Timer::after(length).await;
            pin.set_low();
            Timer::after(length).await;
        }
    }
}
