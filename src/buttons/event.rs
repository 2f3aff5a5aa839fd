/// Index of a channel in the set passed to [`ButtonMonitor::new()`][super::ButtonMonitor::new].
pub type ChannelId = u8;

/// Classification of a finished press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressKind {
    /// Released before the long-press threshold.
    Short,
    /// Held at least as long as the long-press threshold.
    Long,
}

/// Events produced by the button engine.
///
/// Timestamps are the `now_ms` value of the poll that detected the condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Press {
        channel: ChannelId,
        at_ms: u32,
    },
    Release {
        channel: ChannelId,
        at_ms: u32,
        duration_ms: u32,
        kind: PressKind,
    },
    /// Emitted once per press, when the hold time reaches the threshold.
    LongPress {
        channel: ChannelId,
        at_ms: u32,
        duration_ms: u32,
    },
    /// Two or more channels pressed in the same snapshot.
    Chord { at_ms: u32, channels: ChannelSet },
}

impl ButtonEvent {
    /// The channel this event belongs to, `None` for chords.
    pub fn channel(&self) -> Option<ChannelId> {
        match *self {
            ButtonEvent::Press { channel, .. }
            | ButtonEvent::Release { channel, .. }
            | ButtonEvent::LongPress { channel, .. } => Some(channel),
            ButtonEvent::Chord { .. } => None,
        }
    }

    pub fn timestamp_ms(&self) -> u32 {
        match *self {
            ButtonEvent::Press { at_ms, .. }
            | ButtonEvent::Release { at_ms, .. }
            | ButtonEvent::LongPress { at_ms, .. }
            | ButtonEvent::Chord { at_ms, .. } => at_ms,
        }
    }

    pub fn duration_ms(&self) -> Option<u32> {
        match *self {
            ButtonEvent::Release { duration_ms, .. } | ButtonEvent::LongPress { duration_ms, .. } => {
                Some(duration_ms)
            }
            _ => None,
        }
    }
}

/// Set of channel ids, one bit per channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelSet(u16);

impl ChannelSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, channel: ChannelId) {
        debug_assert!(channel < 16);
        self.0 |= 1u16 << channel;
    }

    pub fn contains(&self, channel: ChannelId) -> bool {
        channel < 16 && self.0 & (1u16 << channel) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn bits(&self) -> u16 {
        self.0
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = ChannelId> {
        let bits = self.0;
        (0..16u8).filter(move |&c| bits & (1u16 << c) != 0)
    }
}

impl FromIterator<ChannelId> for ChannelSet {
    fn from_iter<T: IntoIterator<Item = ChannelId>>(iter: T) -> Self {
        let mut set = ChannelSet::empty();
        for channel in iter {
            set.insert(channel);
        }
        set
    }
}
