use super::event::{ButtonEvent, ChannelId, PressKind};

/// Lifecycle of a button channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Released,
    Pressed,
    /// Held past the long-press threshold; stays here until release.
    LongPressed,
}

/// Per-channel timing state.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Channel {
    state: Lifecycle,
    pressed_at_ms: u32,
    long_press_reported: bool,
}

impl Channel {
    pub(crate) const fn new() -> Self {
        Self {
            state: Lifecycle::Released,
            pressed_at_ms: 0,
            long_press_reported: false,
        }
    }

    pub(crate) fn state(&self) -> Lifecycle {
        self.state
    }

    /// Advance the channel with one sample.  At most one event results per sample.
    pub(crate) fn update(
        &mut self,
        id: ChannelId,
        was_pressed: bool,
        is_pressed: bool,
        now_ms: u32,
        long_press_ms: u32,
    ) -> Option<ButtonEvent> {
        match (was_pressed, is_pressed) {
            (false, true) => {
                self.state = Lifecycle::Pressed;
                self.pressed_at_ms = now_ms;
                self.long_press_reported = false;
                Some(ButtonEvent::Press {
                    channel: id,
                    at_ms: now_ms,
                })
            }
            (true, false) => {
                if self.state == Lifecycle::Released {
                    return None;
                }
                self.state = Lifecycle::Released;
                let duration_ms = now_ms.wrapping_sub(self.pressed_at_ms);
                let kind = if duration_ms < long_press_ms {
                    PressKind::Short
                } else {
                    PressKind::Long
                };
                Some(ButtonEvent::Release {
                    channel: id,
                    at_ms: now_ms,
                    duration_ms,
                    kind,
                })
            }
            _ => {
                if self.state != Lifecycle::Pressed || self.long_press_reported {
                    return None;
                }
                let duration_ms = now_ms.wrapping_sub(self.pressed_at_ms);
                if duration_ms < long_press_ms {
                    return None;
                }
                self.state = Lifecycle::LongPressed;
                self.long_press_reported = true;
                Some(ButtonEvent::LongPress {
                    channel: id,
                    at_ms: now_ms,
                    duration_ms,
                })
            }
        }
    }
}
