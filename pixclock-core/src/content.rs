//! Scroll content
//!
//! Auto-scroll cadences name what to show with a [`ContentId`]. The
//! [`ContentTable`] maps every identifier to a renderer that formats the
//! item into scroll text in the configured language and unit.

use core::fmt::{self, Write};

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::config::{CalendarEvent, GlobalSettings, Language};
use crate::display::scroll::MAX_SCROLL_TEXT;
use crate::error::CoreError;
use crate::time::WallTime;

/// Rendered scroll text
pub type ContentText = String<MAX_SCROLL_TEXT>;

/// Informational item an auto-scroll cadence can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ContentId {
    Time,
    Date,
    DayOfWeek,
    DayOfYear,
    Temperature,
    DstStatus,
    SyncStatus,
    TodayEvents,
}

impl ContentId {
    pub const COUNT: usize = 8;

    pub const ALL: [ContentId; Self::COUNT] = [
        ContentId::Time,
        ContentId::Date,
        ContentId::DayOfWeek,
        ContentId::DayOfYear,
        ContentId::Temperature,
        ContentId::DstStatus,
        ContentId::SyncStatus,
        ContentId::TodayEvents,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Everything a renderer may look at
#[derive(Debug, Clone, Copy)]
pub struct ContentContext<'a> {
    pub now: &'a WallTime,
    pub settings: &'a GlobalSettings,
    /// Last sensor reading, tenths of a degree Celsius
    pub temperature_tenths: Option<i16>,
    /// Seconds since the last successful network sync
    pub since_sync_s: Option<u64>,
    pub events: &'a [CalendarEvent],
    pub today_mask: u64,
}

/// Formats one content item
pub type Renderer = fn(&ContentContext<'_>, &mut ContentText) -> fmt::Result;

/// Dispatch table from [`ContentId`] to its renderer
pub struct ContentTable {
    renderers: [Renderer; ContentId::COUNT],
}

impl Default for ContentTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentTable {
    pub const fn new() -> Self {
        Self {
            renderers: [
                render_time,
                render_date,
                render_day_of_week,
                render_day_of_year,
                render_temperature,
                render_dst_status,
                render_sync_status,
                render_today_events,
            ],
        }
    }

    /// Replace the renderer for `id`
    pub fn register(&mut self, id: ContentId, renderer: Renderer) {
        self.renderers[id.index()] = renderer;
    }

    /// Render `id` into `out`, replacing its contents
    pub fn render(
        &self,
        id: ContentId,
        ctx: &ContentContext<'_>,
        out: &mut ContentText,
    ) -> Result<(), CoreError> {
        out.clear();
        (self.renderers[id.index()])(ctx, out).map_err(|_| CoreError::CapacityExceeded)
    }
}

const DAYS_EN: [&str; 7] = [
    "SUNDAY", "MONDAY", "TUESDAY", "WEDNESDAY", "THURSDAY", "FRIDAY", "SATURDAY",
];
const DAYS_FR: [&str; 7] = [
    "DIMANCHE", "LUNDI", "MARDI", "MERCREDI", "JEUDI", "VENDREDI", "SAMEDI",
];

const MONTHS_EN: [&str; 12] = [
    "JANUARY", "FEBRUARY", "MARCH", "APRIL", "MAY", "JUNE", "JULY", "AUGUST", "SEPTEMBER",
    "OCTOBER", "NOVEMBER", "DECEMBER",
];
const MONTHS_FR: [&str; 12] = [
    "JANVIER", "FEVRIER", "MARS", "AVRIL", "MAI", "JUIN", "JUILLET", "AOUT", "SEPTEMBRE",
    "OCTOBRE", "NOVEMBRE", "DECEMBRE",
];

fn day_name(ctx: &ContentContext<'_>) -> &'static str {
    let index = ctx.now.weekday.index() as usize;
    match ctx.settings.language {
        Language::English => DAYS_EN[index],
        Language::French => DAYS_FR[index],
    }
}

fn month_name(ctx: &ContentContext<'_>) -> &'static str {
    let index = (ctx.now.month.clamp(1, 12) - 1) as usize;
    match ctx.settings.language {
        Language::English => MONTHS_EN[index],
        Language::French => MONTHS_FR[index],
    }
}

/// Time in the configured dial format
fn render_time(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let t = ctx.now;
    if ctx.settings.hour_24 {
        write!(out, "{:02}:{:02}", t.hour, t.minute)
    } else {
        let suffix = if t.hour < 12 { "AM" } else { "PM" };
        write!(out, "{}:{:02} {}", t.hour12(), t.minute, suffix)
    }
}

fn render_date(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let t = ctx.now;
    match ctx.settings.language {
        Language::English => write!(out, "{} {} {}", month_name(ctx), t.day, t.year),
        Language::French => write!(out, "{} {} {}", t.day, month_name(ctx), t.year),
    }
}

fn render_day_of_week(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    out.write_str(day_name(ctx))
}

fn render_day_of_year(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let label = match ctx.settings.language {
        Language::English => "DAY",
        Language::French => "JOUR",
    };
    write!(out, "{} {}", label, ctx.now.day_of_year)
}

fn render_temperature(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let unit = ctx.settings.temperature_unit;
    let Some(celsius) = ctx.temperature_tenths else {
        return write!(out, "--{}", unit.suffix());
    };
    let tenths = unit.from_celsius_tenths(celsius);
    let sign = if tenths < 0 { "-" } else { "" };
    let magnitude = tenths.unsigned_abs();
    write!(
        out,
        "{}{}.{}{}",
        sign,
        magnitude / 10,
        magnitude % 10,
        unit.suffix()
    )
}

fn render_dst_status(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let text = match (ctx.settings.language, ctx.now.dst_active) {
        (Language::English, true) => "SUMMER TIME",
        (Language::English, false) => "STANDARD TIME",
        (Language::French, true) => "HEURE D'ETE",
        (Language::French, false) => "HEURE D'HIVER",
    };
    out.write_str(text)
}

fn render_sync_status(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    match (ctx.settings.language, ctx.since_sync_s) {
        (Language::English, None) => out.write_str("NOT SYNCED"),
        (Language::French, None) => out.write_str("NON SYNCHRONISE"),
        (Language::English, Some(s)) => write!(out, "SYNCED {} MIN AGO", s / 60),
        (Language::French, Some(s)) => write!(out, "SYNCHRO IL Y A {} MIN", s / 60),
    }
}

/// Messages of today's events; stops at the first one that does not fit
fn render_today_events(ctx: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
    let mut first = true;
    for (index, event) in ctx.events.iter().enumerate().take(64) {
        if ctx.today_mask & (1u64 << index) == 0 {
            continue;
        }
        let separator = if first { "" } else { " - " };
        if out.len() + separator.len() + event.message.len() > out.capacity() {
            break;
        }
        out.write_str(separator)?;
        out.write_str(&event.message)?;
        first = false;
    }

    if first {
        let text = match ctx.settings.language {
            Language::English => "NO EVENTS TODAY",
            Language::French => "AUCUN EVENEMENT",
        };
        out.write_str(text)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TemperatureUnit;

    fn ctx<'a>(now: &'a WallTime, settings: &'a GlobalSettings) -> ContentContext<'a> {
        ContentContext {
            now,
            settings,
            temperature_tenths: Some(215),
            since_sync_s: None,
            events: &[],
            today_mask: 0,
        }
    }

    fn render(id: ContentId, ctx: &ContentContext<'_>) -> ContentText {
        let mut out = ContentText::new();
        ContentTable::new().render(id, ctx, &mut out).unwrap();
        out
    }

    #[test]
    fn test_table_covers_every_id() {
        let now = WallTime::from_civil(2024, 3, 1, 9, 5, 0);
        let settings = GlobalSettings::default();
        let context = ctx(&now, &settings);
        for id in ContentId::ALL {
            assert!(!render(id, &context).is_empty());
        }
    }

    #[test]
    fn test_time_formats() {
        let now = WallTime::from_civil(2024, 3, 1, 15, 7, 0);
        let mut settings = GlobalSettings::default();
        assert_eq!(render(ContentId::Time, &ctx(&now, &settings)).as_str(), "15:07");
        settings.hour_24 = false;
        assert_eq!(render(ContentId::Time, &ctx(&now, &settings)).as_str(), "3:07 PM");
    }

    #[test]
    fn test_date_and_day_languages() {
        // 2024-03-01 is a Friday
        let now = WallTime::from_civil(2024, 3, 1, 0, 0, 0);
        let mut settings = GlobalSettings::default();
        assert_eq!(render(ContentId::Date, &ctx(&now, &settings)).as_str(), "MARCH 1 2024");
        assert_eq!(render(ContentId::DayOfWeek, &ctx(&now, &settings)).as_str(), "FRIDAY");
        assert_eq!(render(ContentId::DayOfYear, &ctx(&now, &settings)).as_str(), "DAY 61");

        settings.language = Language::French;
        assert_eq!(render(ContentId::Date, &ctx(&now, &settings)).as_str(), "1 MARS 2024");
        assert_eq!(render(ContentId::DayOfWeek, &ctx(&now, &settings)).as_str(), "VENDREDI");
    }

    #[test]
    fn test_temperature_units() {
        let now = WallTime::from_civil(2024, 3, 1, 0, 0, 0);
        let mut settings = GlobalSettings::default();
        let mut context = ctx(&now, &settings);
        assert_eq!(render(ContentId::Temperature, &context).as_str(), "21.5C");

        context.temperature_tenths = Some(-5);
        assert_eq!(render(ContentId::Temperature, &context).as_str(), "-0.5C");

        context.temperature_tenths = None;
        assert_eq!(render(ContentId::Temperature, &context).as_str(), "--C");

        settings.temperature_unit = TemperatureUnit::Fahrenheit;
        let context = ctx(&now, &settings);
        assert_eq!(render(ContentId::Temperature, &context).as_str(), "70.7F");
    }

    #[test]
    fn test_today_events_joined() {
        let now = WallTime::from_civil(2024, 12, 25, 0, 0, 0);
        let settings = GlobalSettings::default();
        let mut events = [CalendarEvent::default(), CalendarEvent::default(), CalendarEvent::default()];
        events[0].message.push_str("XMAS").unwrap();
        events[1].message.push_str("SKIPPED").unwrap();
        events[2].message.push_str("PARTY").unwrap();

        let mut context = ctx(&now, &settings);
        context.events = &events;
        context.today_mask = 0b101;
        assert_eq!(render(ContentId::TodayEvents, &context).as_str(), "XMAS - PARTY");

        context.today_mask = 0;
        assert_eq!(render(ContentId::TodayEvents, &context).as_str(), "NO EVENTS TODAY");
    }

    #[test]
    fn test_register_overrides() {
        fn fixed(_: &ContentContext<'_>, out: &mut ContentText) -> fmt::Result {
            out.write_str("HELLO")
        }
        let now = WallTime::from_civil(2024, 3, 1, 0, 0, 0);
        let settings = GlobalSettings::default();
        let mut table = ContentTable::new();
        table.register(ContentId::DstStatus, fixed);
        let mut out = ContentText::new();
        table.render(ContentId::DstStatus, &ctx(&now, &settings), &mut out).unwrap();
        assert_eq!(out.as_str(), "HELLO");
    }
}
