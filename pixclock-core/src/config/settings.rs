//! Operator settings
//!
//! Global settings are stored at the head of the general configuration
//! record and are changed from the button menu.

use serde::{Deserialize, Serialize};

use crate::time::sync::DEFAULT_REFRESH_INTERVAL_S;

/// Local hours during which the panel runs at its upper brightness limit
pub const DAY_HOURS: core::ops::Range<u8> = 7..22;

/// Unit used when rendering temperatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Convert tenths of a degree Celsius into tenths of this unit
    pub fn from_celsius_tenths(self, tenths: i16) -> i16 {
        match self {
            TemperatureUnit::Celsius => tenths,
            TemperatureUnit::Fahrenheit => (tenths as i32 * 9 / 5 + 320) as i16,
        }
    }

    /// Unit suffix
    pub fn suffix(self) -> char {
        match self {
            TemperatureUnit::Celsius => 'C',
            TemperatureUnit::Fahrenheit => 'F',
        }
    }
}

/// Display language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Language {
    #[default]
    English,
    French,
}

/// Global settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GlobalSettings {
    /// Signed offset of local standard time from UTC, whole hours
    pub timezone_hours: i8,
    /// DST region selector (see `DstCountry`)
    pub dst_selector: u8,
    pub temperature_unit: TemperatureUnit,
    /// Lowest PWM duty used by the auto-brightness loop
    pub brightness_min: u8,
    /// Highest PWM duty used by the auto-brightness loop
    pub brightness_max: u8,
    pub language: Language,
    /// 24-hour display when true, 12-hour otherwise
    pub hour_24: bool,
    /// Short beep on every full hour
    pub chime: bool,
    /// Seconds between successful network synchronizations
    pub sync_refresh_s: u32,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            timezone_hours: 0,
            dst_selector: 0,
            temperature_unit: TemperatureUnit::Celsius,
            brightness_min: 8,
            brightness_max: 255,
            language: Language::English,
            hour_24: true,
            chime: false,
            sync_refresh_s: DEFAULT_REFRESH_INTERVAL_S,
        }
    }
}

impl GlobalSettings {
    /// Clamp a brightness request to the configured limits
    pub fn clamp_brightness(&self, level: u8) -> u8 {
        let (low, high) = if self.brightness_min <= self.brightness_max {
            (self.brightness_min, self.brightness_max)
        } else {
            (self.brightness_max, self.brightness_min)
        };
        level.clamp(low, high)
    }

    /// Panel brightness for a local hour: upper limit by day, lower at night
    pub fn brightness_at(&self, hour: u8) -> u8 {
        let requested = if DAY_HOURS.contains(&hour) { u8::MAX } else { 0 };
        self.clamp_brightness(requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fahrenheit_conversion() {
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius_tenths(0), 320);
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius_tenths(1000), 2120);
        assert_eq!(TemperatureUnit::Fahrenheit.from_celsius_tenths(-400), -400);
        assert_eq!(TemperatureUnit::Celsius.from_celsius_tenths(215), 215);
    }

    #[test]
    fn test_brightness_clamp() {
        let settings = GlobalSettings {
            brightness_min: 20,
            brightness_max: 200,
            ..Default::default()
        };
        assert_eq!(settings.clamp_brightness(0), 20);
        assert_eq!(settings.clamp_brightness(255), 200);

        let swapped = GlobalSettings {
            brightness_min: 200,
            brightness_max: 20,
            ..Default::default()
        };
        assert_eq!(swapped.clamp_brightness(100), 100);
    }

    #[test]
    fn test_night_uses_lower_limit() {
        let settings = GlobalSettings {
            brightness_min: 30,
            brightness_max: 180,
            ..Default::default()
        };
        assert_eq!(settings.brightness_at(12), 180);
        assert_eq!(settings.brightness_at(7), 180);
        assert_eq!(settings.brightness_at(22), 30);
        assert_eq!(settings.brightness_at(3), 30);
    }
}
