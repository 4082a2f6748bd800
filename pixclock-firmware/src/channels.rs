//! Inter-task communication
//!
//! The queues shared with the tick task are plain core types behind a
//! critical-section mutex; one-shot values travel through signals.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use pixclock_core::display::FrameBuffer;
use pixclock_core::input::InputQueue;
use pixclock_core::sound::SoundQueue;
use pixclock_protocol::TimeSyncResult;

/// Button events from the button tasks, drained every tick
pub static INPUT: Mutex<CriticalSectionRawMutex, RefCell<InputQueue>> =
    Mutex::new(RefCell::new(InputQueue::new()));

/// Buzzer requests produced by the controller
pub static SOUND: Mutex<CriticalSectionRawMutex, RefCell<SoundQueue>> =
    Mutex::new(RefCell::new(SoundQueue::new()));

/// Wakes the buzzer task after new requests were queued
pub static SOUND_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Last composed frame, read by the scan task
pub static FRAME: Mutex<CriticalSectionRawMutex, RefCell<FrameBuffer>> =
    Mutex::new(RefCell::new(FrameBuffer::new()));

/// Panel brightness (PWM duty, 0-255), sent when it changes
pub static BRIGHTNESS: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Controller asks the time link for one exchange
pub static SYNC_START: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Outcome of a time link exchange
pub static SYNC_RESULT: Signal<CriticalSectionRawMutex, TimeSyncResult> = Signal::new();

/// Die temperature in 0.1°C units, or None for a failed reading
pub static TEMPERATURE: Signal<CriticalSectionRawMutex, Option<i16>> = Signal::new();
