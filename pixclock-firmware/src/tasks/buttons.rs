//! Front panel buttons
//!
//! One task instance per button. Buttons are active low with the internal
//! pull-up; holding past the long-press threshold emits the long variant
//! as soon as the threshold is reached.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use pixclock_protocol::ButtonEvent;

use crate::channels::INPUT;

/// Hold time that turns a press into a long press
const LONG_PRESS: Duration = Duration::from_millis(500);

/// Contact bounce settle time
const DEBOUNCE: Duration = Duration::from_millis(20);

#[embassy_executor::task(pool_size = 3)]
pub async fn button_task(mut pin: Input<'static>, short: ButtonEvent, long: ButtonEvent) {
    info!("Button task started for {:?}", short);

    loop {
        pin.wait_for_low().await;
        Timer::after(DEBOUNCE).await;
        if pin.is_high() {
            continue;
        }

        let event = match select(pin.wait_for_high(), Timer::after(LONG_PRESS)).await {
            Either::First(()) => short,
            Either::Second(()) => long,
        };
        debug!("Button event {:?}", event);
        INPUT.lock(|queue| queue.borrow_mut().push(event));

        pin.wait_for_high().await;
        Timer::after(DEBOUNCE).await;
    }
}
