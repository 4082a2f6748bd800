//! Discrete button events from the input decoder
//!
//! The decoder samples the three front-panel buttons (and the IR remote,
//! which maps onto the same codes) and delivers one code per gesture.

/// Button event codes delivered by the input collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonEvent {
    /// No event pending
    #[default]
    None,
    /// Bottom button, short press
    Down,
    /// Middle button, short press
    Set,
    /// Top button, short press
    Up,
    /// Bottom button held
    DownLong,
    /// Middle button held
    SetLong,
    /// Top button held
    UpLong,
}

impl ButtonEvent {
    /// Returns true for any real press (everything except `None`)
    pub fn is_press(&self) -> bool {
        !matches!(self, ButtonEvent::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_not_a_press() {
        assert!(!ButtonEvent::None.is_press());
        assert!(ButtonEvent::Down.is_press());
        assert!(ButtonEvent::UpLong.is_press());
    }
}
