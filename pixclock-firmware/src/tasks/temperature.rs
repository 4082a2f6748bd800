//! Die temperature sensor
//!
//! The RP2040's internal sensor is coarse (a few degrees) but good enough
//! for a room temperature readout.

use defmt::*;
use embassy_rp::adc::{Adc, Async, Channel};
use embassy_time::{Duration, Ticker};

use crate::channels::TEMPERATURE;

/// Sampling period
const SAMPLE_PERIOD: Duration = Duration::from_secs(5);

/// ADC reference in microvolts
const VREF_UV: i64 = 3_300_000;

/// Sensor output at 27°C in microvolts
const V27_UV: i64 = 706_000;

/// Sensor slope in microvolts per degree (negative)
const SLOPE_UV: i64 = 1_721;

/// Convert a 12-bit sample to 0.1°C units
fn to_tenths(raw: u16) -> i16 {
    let uv = raw as i64 * VREF_UV / 4096;
    (270 - (uv - V27_UV) * 10 / SLOPE_UV).clamp(i16::MIN as i64, i16::MAX as i64) as i16
}

#[embassy_executor::task]
pub async fn temperature_task(mut adc: Adc<'static, Async>, mut sensor: Channel<'static>) {
    info!("Temperature task started");

    let mut ticker = Ticker::every(SAMPLE_PERIOD);
    loop {
        match adc.read(&mut sensor).await {
            Ok(raw) => {
                let tenths = to_tenths(raw);
                trace!("Temperature {} (raw {})", tenths, raw);
                TEMPERATURE.signal(Some(tenths));
            }
            Err(e) => {
                warn!("Temperature read failed: {:?}", e);
                TEMPERATURE.signal(None);
            }
        }
        ticker.next().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_temperature_sample() {
        // 0.706 V is the 27°C calibration point
        let tenths = to_tenths(876);
        assert!((tenths - 270).abs() <= 2);
    }

    #[test]
    fn test_full_scale_samples() {
        assert!(to_tenths(0) > to_tenths(876));
        assert!(to_tenths(4095) < to_tenths(876));
    }
}
