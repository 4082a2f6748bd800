//! Tick controller
//!
//! The controller owns every piece of clock state and runs one tick in a
//! fixed order:
//!
//! 1. apply a pending network correction
//! 2. advance the clock
//! 3. advance the network time exchange
//! 4. drain the button queue
//! 5. once per second, run the scheduler and refresh the layout
//! 6. run one compositor pass
//! 7. write back dirty records
//!
//! Collaborators only meet the controller through [`TickIo`] and the
//! values it returns; nothing here blocks.

use core::fmt::Write;

use pixclock_protocol::{ButtonEvent, SoundRequest, TimeSyncResult};

use crate::config::{ClockConfig, GlobalSettings, ReminderTable};
use crate::content::{ContentContext, ContentId, ContentTable, ContentText};
use crate::display::{
    back_link, Align, Color, Compositor, Font, FrameBuffer, PassReport, PostAction, Region,
    ScrollEngine, ScrollLane, WindowId, WindowSpec, WindowStatus,
};
use crate::error::{CoreError, FaultCounters};
use crate::fmt::{debug, info, warn};
use crate::input::InputQueue;
use crate::scheduler::{Activation, Activations, Scheduler};
use crate::sound::{jingle, SoundQueue, BEEP, CHIME};
use crate::storage::{ConfigStore, RecordStatus};
use crate::time::{Clock, SyncAction, TimeSync, WallTime};
use crate::traits::RecordStorage;

/// Ticks per column for alert and ticker scrolls
pub const SCROLL_SPEED: u8 = 2;

/// Separator between auto-scroll items
const ITEM_SEPARATOR: &str = "   ";

/// Names of the layout windows
pub const TIME_WINDOW: &str = "time";
pub const DATE_WINDOW: &str = "date";
pub const TICKER_WINDOW: &str = "ticker";
pub const ALERT_WINDOW: &str = "alert";

/// Shared buffers the tick reads and writes
pub struct TickIo<'a> {
    pub input: &'a mut InputQueue,
    pub sound: &'a mut SoundQueue,
    pub framebuffer: &'a mut FrameBuffer,
}

/// What one tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// The network collaborator should start an exchange
    pub sync_request: bool,
    /// A new monotonic second began; the scheduler ran
    pub second_elapsed: bool,
    /// Button events consumed
    pub buttons: u8,
    pub pass: PassReport,
    pub saved_config: bool,
    pub saved_reminders: bool,
    /// Panel brightness (PWM duty, 0-255)
    pub brightness: u8,
}

/// Windows opened at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    time: WindowId,
    date: WindowId,
    ticker: WindowId,
}

/// Clock controller over a flash primitive `S`
pub struct Controller<S> {
    store: ConfigStore<S>,
    config: ClockConfig,
    reminders: ReminderTable,
    clock: Clock,
    sync: TimeSync,
    pending_sync: Option<TimeSyncResult>,
    scheduler: Scheduler,
    compositor: Compositor,
    scrolls: ScrollEngine,
    content: ContentTable,
    faults: FaultCounters,
    temperature_tenths: Option<i16>,
    brightness: u8,
    layout: Layout,
    alert: Option<WindowId>,
    last_second: Option<u64>,
    config_dirty: bool,
    reminders_dirty: bool,
}

impl<S: RecordStorage> Controller<S> {
    /// Load both records, configure the clock and open the layout windows
    ///
    /// Rejected records are replaced by defaults and flagged in the fault
    /// counters; boot itself only fails if the layout cannot be opened.
    pub fn boot(mut store: ConfigStore<S>, fb: &mut FrameBuffer) -> Result<Self, CoreError> {
        let mut faults = FaultCounters::new();

        let config = store.load_config();
        if config.status == RecordStatus::Corrupt {
            warn!("Configuration record corrupt, using defaults");
            faults.config_corrupt = true;
        }
        let reminders = store.load_reminders();
        if reminders.status == RecordStatus::Corrupt {
            warn!("Reminder record corrupt, using defaults");
            faults.reminders_corrupt = true;
        }

        let config = config.value;
        let settings = config.settings;
        let clock = Clock::new(settings.timezone_hours, settings.dst_selector);
        if clock.dst_country().is_none() {
            faults.unknown_dst_rule = true;
        }

        fb.clear();
        let mut compositor = Compositor::new();
        let layout = Layout {
            time: compositor.activate(&WindowSpec::new(TIME_WINDOW, Region::rows(0, 15)?), 0, fb)?,
            date: compositor.activate(&WindowSpec::new(DATE_WINDOW, Region::rows(16, 23)?), 0, fb)?,
            ticker: compositor
                .activate(&WindowSpec::new(TICKER_WINDOW, Region::rows(24, 31)?), 0, fb)?,
        };
        info!(
            "Booted: {} alarms, {} reminders, {} events",
            config.alarms.len(),
            reminders.value.rules.len(),
            config.events.len()
        );

        let brightness = settings.brightness_at(clock.now().hour);
        Ok(Self {
            store,
            sync: TimeSync::new(settings.sync_refresh_s),
            config,
            reminders: reminders.value,
            clock,
            pending_sync: None,
            scheduler: Scheduler::new(),
            compositor,
            scrolls: ScrollEngine::new(),
            content: ContentTable::new(),
            faults,
            temperature_tenths: None,
            brightness,
            layout,
            alert: None,
            last_second: None,
            config_dirty: false,
            reminders_dirty: false,
        })
    }

    /// Hand over a network result; it is applied at the top of the next tick
    pub fn submit_sync_result(&mut self, result: TimeSyncResult) {
        self.pending_sync = Some(result);
    }

    /// Latest temperature reading in tenths of a degree Celsius
    pub fn set_temperature(&mut self, tenths: Option<i16>) {
        self.temperature_tenths = tenths;
    }

    /// Run one tick covering `elapsed_us` microseconds
    pub fn tick(&mut self, elapsed_us: u64, io: TickIo<'_>) -> TickReport {
        let TickIo {
            input,
            sound,
            framebuffer: fb,
        } = io;
        let mut report = TickReport::default();

        if let Some(result) = self.pending_sync.take() {
            match self.sync.on_result(result, self.clock.uptime_seconds()) {
                Ok(utc) => self.clock.apply_correction(utc),
                Err(e) => self.faults.record(e),
            }
        }

        let before_ms = self.clock.uptime_ms();
        self.clock.advance(elapsed_us);
        let uptime_s = self.clock.uptime_seconds();

        match self.sync.poll(uptime_s) {
            SyncAction::Idle => {}
            SyncAction::Start => report.sync_request = true,
            SyncAction::TimedOut => self.faults.record(CoreError::ProtocolFault),
        }

        self.faults.input_overflows = self
            .faults
            .input_overflows
            .saturating_add(input.take_overflows());
        while let Some(event) = input.pop() {
            report.buttons = report.buttons.saturating_add(1);
            self.handle_button(event, fb);
        }

        if self.last_second != Some(uptime_s) {
            self.last_second = Some(uptime_s);
            report.second_elapsed = true;
            self.on_second(uptime_s, sound, fb);
        }

        let now_ms = self.clock.uptime_ms();
        let elapsed_ms = now_ms.saturating_sub(before_ms).min(u32::MAX as u64) as u32;
        report.pass = self.compositor.tick(elapsed_ms, now_ms, fb, &mut self.scrolls);
        if self
            .alert
            .is_some_and(|id| self.compositor.status(id) == WindowStatus::Unused)
        {
            debug!("Alert window released");
            self.alert = None;
        }

        self.flush(&mut report);
        report.brightness = self.brightness;
        report
    }

    fn handle_button(&mut self, event: ButtonEvent, fb: &mut FrameBuffer) {
        if !event.is_press() {
            return;
        }

        // Any press while ringing only acknowledges
        if self.scheduler.is_ringing() {
            let mut ended = Activations::new();
            self.scheduler.acknowledge(&mut ended, &mut self.faults);
            self.dismiss_alert(fb);
            return;
        }

        match event {
            ButtonEvent::SetLong => {
                info!("Sync forced from panel");
                self.sync.force(self.clock.uptime_seconds());
            }
            ButtonEvent::DownLong => {
                self.config.settings.hour_24 = !self.config.settings.hour_24;
                self.config_dirty = true;
                let now = self.clock.now();
                self.refresh_layout(&now, fb);
            }
            ButtonEvent::UpLong => {
                self.config.settings.chime = !self.config.settings.chime;
                self.config_dirty = true;
            }
            ButtonEvent::Up => self.show_content(&[ContentId::SyncStatus, ContentId::DstStatus]),
            ButtonEvent::Down => self.show_content(&[ContentId::Temperature]),
            ButtonEvent::Set => self.show_content(&[ContentId::TodayEvents]),
            ButtonEvent::None => {}
        }
    }

    fn on_second(&mut self, uptime_s: u64, sound: &mut SoundQueue, fb: &mut FrameBuffer) {
        let now = self.clock.now();
        let mut activations = Activations::new();
        let reminders_moved = self.scheduler.run(
            &now,
            self.clock.local_epoch(),
            uptime_s,
            &self.config,
            &mut self.reminders,
            &mut self.faults,
            &mut activations,
        );
        if reminders_moved {
            self.reminders_dirty = true;
        }

        for activation in activations {
            self.dispatch(activation, sound, fb);
        }
        self.brightness = self.config.settings.brightness_at(now.hour);
        self.refresh_layout(&now, fb);
    }

    fn dispatch(&mut self, activation: Activation, sound: &mut SoundQueue, fb: &mut FrameBuffer) {
        let result = match activation {
            Activation::AlarmStarted(index) => match self.config.alarms.get(index as usize) {
                Some(alarm) => {
                    let repeat = alarm.scroll_repeat;
                    let message = alarm.message.clone();
                    let text = if message.is_empty() { "ALARM" } else { message.as_str() };
                    self.open_alert(text, repeat, fb)
                }
                None => Ok(()),
            },
            Activation::AlarmRing(index) => match self.config.alarms.get(index as usize) {
                Some(alarm) => sound.push(SoundRequest::new(alarm.beep_duration_ms, alarm.beep_count)),
                None => Ok(()),
            },
            Activation::ReminderStarted(index) => match self.reminders.rules.get(index as usize) {
                Some(rule) => {
                    let message = rule.message.clone();
                    let text = if message.is_empty() { "REMINDER" } else { message.as_str() };
                    self.open_alert(text, 1, fb)
                }
                None => Ok(()),
            },
            Activation::ReminderRing(_) => sound.push(BEEP),
            Activation::AlarmEnded(_) | Activation::ReminderEnded(_) => {
                if !self.scheduler.is_ringing() {
                    self.dismiss_alert(fb);
                }
                Ok(())
            }
            Activation::ReminderAdvanced(_) => Ok(()),
            Activation::CalendarDue(index) => match self.config.events.get(index as usize) {
                Some(event) => {
                    let tones = jingle(event.jingle);
                    let message = event.message.clone();
                    sound
                        .push_all(tones)
                        .and_then(|()| self.ticker_scroll(&message))
                }
                None => Ok(()),
            },
            Activation::AutoScrollDue(index) => match self.config.auto_scrolls.get(index as usize) {
                Some(cadence) => {
                    let items = cadence.items.clone();
                    self.show_content(&items);
                    Ok(())
                }
                None => Ok(()),
            },
            Activation::Chime => sound.push(CHIME),
        };

        if let Err(e) = result {
            debug!("Activation {} not shown: {}", activation, e);
            self.faults.record(e);
        }
    }

    /// Render `items` and scroll them once on the ticker
    fn show_content(&mut self, items: &[ContentId]) {
        let now = self.clock.now();
        let ctx = ContentContext {
            now: &now,
            settings: &self.config.settings,
            temperature_tenths: self.temperature_tenths,
            since_sync_s: self.clock.since_sync_seconds(),
            events: &self.config.events,
            today_mask: self.scheduler.today_mask(),
        };

        let mut text = ContentText::new();
        let mut item = ContentText::new();
        for &id in items {
            if let Err(e) = self.content.render(id, &ctx, &mut item) {
                self.faults.record(e);
                continue;
            }
            let separator = if text.is_empty() { "" } else { ITEM_SEPARATOR };
            if text.len() + separator.len() + item.len() > text.capacity() {
                break;
            }
            write!(text, "{}{}", separator, item).ok();
        }

        if let Err(e) = self.ticker_scroll(&text) {
            self.faults.record(e);
        }
    }

    /// Scroll `text` once across the ticker; skipped while the ticker is covered
    fn ticker_scroll(&mut self, text: &str) -> Result<(), CoreError> {
        if text.is_empty() || self.compositor.status(self.layout.ticker) != WindowStatus::Active {
            return Ok(());
        }
        self.compositor.scroll_text(
            &mut self.scrolls,
            self.layout.ticker,
            ScrollLane::Bottom,
            Font::Normal,
            text,
            1,
            SCROLL_SPEED,
        )
    }

    /// Open the alert window over the ticker, or restart its scroll
    fn open_alert(&mut self, text: &str, repeat: u8, fb: &mut FrameBuffer) -> Result<(), CoreError> {
        let live = self.alert.filter(|&id| {
            let window = self.compositor.window(id);
            window.is_some_and(|w| w.status == WindowStatus::Active && !w.is_closing())
        });

        let id = match live {
            Some(id) => id,
            None => {
                let ticker = self.compositor.window(self.layout.ticker).map(|w| w.region);
                let region = ticker.ok_or(CoreError::UnknownWindow)?;
                let spec = WindowSpec {
                    border: Color::On,
                    post_action: PostAction::Erase,
                    explode: true,
                    back_links: back_link(ScrollLane::Bottom, self.layout.ticker),
                    ..WindowSpec::new(ALERT_WINDOW, region)
                };
                let id = self.compositor.activate(&spec, self.clock.uptime_ms(), fb)?;
                self.alert = Some(id);
                id
            }
        };

        self.compositor.scroll_text(
            &mut self.scrolls,
            id,
            ScrollLane::Bottom,
            Font::Bold,
            text,
            repeat,
            SCROLL_SPEED,
        )
    }

    /// Stop the alert's repeats; the window closes once its text has left
    fn dismiss_alert(&mut self, fb: &mut FrameBuffer) {
        if let Some(id) = self.alert {
            self.scrolls.stop_repeats(id);
            if let Err(e) = self.compositor.begin_close(id, fb) {
                self.faults.record(e);
            }
        }
    }

    fn refresh_layout(&mut self, now: &WallTime, fb: &mut FrameBuffer) {
        let ctx = ContentContext {
            now,
            settings: &self.config.settings,
            temperature_tenths: self.temperature_tenths,
            since_sync_s: self.clock.since_sync_seconds(),
            events: &self.config.events,
            today_mask: self.scheduler.today_mask(),
        };

        let mut text = ContentText::new();
        if self.content.render(ContentId::Time, &ctx, &mut text).is_ok() {
            let drawn = self.compositor.draw_text(
                self.layout.time,
                ScrollLane::Middle,
                &text,
                Font::Bold,
                Align::Centre,
                fb,
            );
            if let Err(e) = drawn {
                self.faults.record(e);
            }
        }

        text.clear();
        if write!(text, "{:02}.{:02}.{}", now.day, now.month, now.year).is_ok() {
            let drawn = self.compositor.draw_text(
                self.layout.date,
                ScrollLane::Top,
                &text,
                Font::Normal,
                Align::Centre,
                fb,
            );
            if let Err(e) = drawn {
                self.faults.record(e);
            }
        }
    }

    fn flush(&mut self, report: &mut TickReport) {
        if self.config_dirty {
            self.config_dirty = false;
            match self.store.save_config(&self.config) {
                Ok(()) => report.saved_config = true,
                Err(e) => self.faults.record(e),
            }
        }
        if self.reminders_dirty {
            self.reminders_dirty = false;
            match self.store.save_reminders(&self.reminders) {
                Ok(()) => report.saved_reminders = true,
                Err(e) => self.faults.record(e),
            }
        }
    }

    /// Replace the general configuration; saved on the next tick
    pub fn set_config(&mut self, config: ClockConfig) {
        self.config = config;
        self.apply_settings();
        self.scheduler.reset();
        self.config_dirty = true;
    }

    /// Replace the operator settings; saved on the next tick
    pub fn set_settings(&mut self, settings: GlobalSettings) {
        self.config.settings = settings;
        self.apply_settings();
        self.config_dirty = true;
    }

    /// Replace the reminder rules; saved on the next tick
    pub fn set_reminders(&mut self, reminders: ReminderTable) {
        self.reminders = reminders;
        self.scheduler.reset();
        self.reminders_dirty = true;
    }

    fn apply_settings(&mut self) {
        let settings = self.config.settings;
        self.clock.set_timezone(settings.timezone_hours);
        self.faults.unknown_dst_rule = !self.clock.set_dst_selector(settings.dst_selector);
        self.sync.set_refresh_interval(settings.sync_refresh_s);
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn sync(&self) -> &TimeSync {
        &self.sync
    }

    pub fn faults(&self) -> &FaultCounters {
        &self.faults
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn reminders(&self) -> &ReminderTable {
        &self.reminders
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn scrolls(&self) -> &ScrollEngine {
        &self.scrolls
    }

    /// Current alert window, if one is open
    pub fn alert(&self) -> Option<WindowId> {
        self.alert
    }

    pub fn store(&self) -> &ConfigStore<S> {
        &self.store
    }

    /// Give back the record store, e.g. to reboot from the same flash
    pub fn into_store(self) -> ConfigStore<S> {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Alarm;
    use crate::storage::STORE_SIZE;
    use crate::time::Weekday;
    use crate::traits::MemoryStorage;

    type TestController = Controller<MemoryStorage<STORE_SIZE>>;

    struct Rig {
        input: InputQueue,
        sound: SoundQueue,
        fb: FrameBuffer,
    }

    impl Rig {
        fn new() -> Self {
            Self {
                input: InputQueue::new(),
                sound: SoundQueue::new(),
                fb: FrameBuffer::new(),
            }
        }

        fn boot(&mut self) -> TestController {
            let store = ConfigStore::new(MemoryStorage::new(), 0);
            Controller::boot(store, &mut self.fb).unwrap()
        }

        fn tick(&mut self, controller: &mut TestController, elapsed_us: u64) -> TickReport {
            controller.tick(
                elapsed_us,
                TickIo {
                    input: &mut self.input,
                    sound: &mut self.sound,
                    framebuffer: &mut self.fb,
                },
            )
        }

        /// Tick at 10 ms for `seconds`
        fn run(&mut self, controller: &mut TestController, seconds: u32) {
            for _ in 0..seconds * 100 {
                self.tick(controller, 10_000);
            }
        }
    }

    /// UTC seconds of 2024-07-01 (a Monday) at the given time
    fn monday(hour: u8, minute: u8, second: u8) -> u64 {
        WallTime::from_civil(2024, 7, 1, hour, minute, second).to_local_seconds() as u64
    }

    #[test]
    fn test_boot_defaults_and_layout() {
        let mut rig = Rig::new();
        let controller = rig.boot();
        assert_eq!(controller.config(), &ClockConfig::default());
        assert_eq!(controller.compositor().live_count(), 3);
        assert!(controller.compositor().find(TICKER_WINDOW).is_some());
        assert!(!controller.faults().any_corrupt());
    }

    #[test]
    fn test_first_tick_requests_sync() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        let report = rig.tick(&mut controller, 10_000);
        assert!(report.sync_request);
        assert!(report.second_elapsed);
    }

    #[test]
    fn test_sync_result_applied_next_tick() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        rig.tick(&mut controller, 10_000);

        controller.submit_sync_result(TimeSyncResult::Success {
            epoch_seconds: monday(12, 0, 0),
        });
        rig.tick(&mut controller, 10_000);
        assert!(controller.clock().is_synced());
        assert_eq!(controller.clock().now().hour, 12);
    }

    #[test]
    fn test_brightness_follows_local_hour() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        rig.tick(&mut controller, 10_000);

        controller.submit_sync_result(TimeSyncResult::Success {
            epoch_seconds: monday(12, 0, 0),
        });
        let report = rig.tick(&mut controller, 1_000_000);
        assert_eq!(report.brightness, controller.config().settings.brightness_max);

        controller.submit_sync_result(TimeSyncResult::Success {
            epoch_seconds: monday(23, 30, 0),
        });
        let report = rig.tick(&mut controller, 1_000_000);
        assert_eq!(report.brightness, controller.config().settings.brightness_min);
    }

    #[test]
    fn test_sync_failure_counted() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        rig.tick(&mut controller, 10_000);
        controller.submit_sync_result(TimeSyncResult::Failure(
            pixclock_protocol::SyncFailure::ProtocolFault,
        ));
        rig.tick(&mut controller, 10_000);
        assert_eq!(controller.faults().sync_errors, 1);
        assert!(!controller.clock().is_synced());
    }

    #[test]
    fn test_down_long_toggles_dial_and_saves() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        rig.input.push(ButtonEvent::DownLong);
        let report = rig.tick(&mut controller, 10_000);
        assert!(report.saved_config);
        assert!(!controller.config().settings.hour_24);
        assert_eq!(controller.store().storage().write_count(), 1);
    }

    #[test]
    fn test_alarm_rings_and_acknowledge() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        let mut config = ClockConfig::default();
        config.auto_scrolls.clear();
        config
            .alarms
            .push(Alarm {
                enabled: true,
                hour: 7,
                minute: 0,
                weekdays: Weekday::Monday.bit(),
                beep_count: 2,
                beep_duration_ms: 150,
                ..Default::default()
            })
            .unwrap();
        controller.set_config(config);

        controller.submit_sync_result(TimeSyncResult::Success {
            epoch_seconds: monday(6, 59, 58),
        });
        rig.run(&mut controller, 3);

        assert!(controller.scheduler().is_ringing());
        let alert = controller.alert().unwrap();
        assert_eq!(controller.compositor().status(alert), WindowStatus::Active);
        assert_eq!(rig.sound.pop(), Some(SoundRequest::new(150, 2)));

        // Ticker is covered by the alert
        let ticker = controller.compositor().find(TICKER_WINDOW).unwrap();
        assert_eq!(controller.compositor().status(ticker), WindowStatus::Inactive);

        rig.input.push(ButtonEvent::Set);
        rig.tick(&mut controller, 10_000);
        assert!(!controller.scheduler().is_ringing());

        // Alert drains its text, explodes and releases the ticker
        rig.run(&mut controller, 30);
        assert_eq!(controller.alert(), None);
        assert_eq!(controller.compositor().status(ticker), WindowStatus::Active);
    }

    #[test]
    fn test_corrupt_record_flagged_at_boot() {
        let mut store = ConfigStore::new(MemoryStorage::<STORE_SIZE>::new(), 0);
        store.save_config(&ClockConfig::default()).unwrap();
        let mut storage = store.into_inner();
        storage.bytes_mut()[6] ^= 0xFF;

        let mut fb = FrameBuffer::new();
        let controller = Controller::boot(ConfigStore::new(storage, 0), &mut fb).unwrap();
        assert!(controller.faults().config_corrupt);
        assert!(!controller.faults().reminders_corrupt);
        assert_eq!(controller.config(), &ClockConfig::default());
    }

    #[test]
    fn test_unknown_dst_selector_flagged() {
        let mut rig = Rig::new();
        let mut controller = rig.boot();
        let settings = GlobalSettings {
            dst_selector: 42,
            ..Default::default()
        };
        controller.set_settings(settings);
        assert!(controller.faults().unknown_dst_rule);
        assert!(!controller.clock().now().dst_active);
    }
}
