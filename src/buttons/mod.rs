//! Polled button event engine.
//!
//! A [`ButtonMonitor`] samples a fixed set of active-low button channels on the expander once per
//! poll and turns the changes between consecutive samples into [`ButtonEvent`]s:
//!
//! | Condition                                          | Event                         |
//! |----------------------------------------------------|-------------------------------|
//! | channel goes from released to pressed              | `Press`                       |
//! | channel goes from pressed to released              | `Release` (short or long)     |
//! | channel held for `long_press_ms`                   | `LongPress`, once per press   |
//! | two or more channels pressed in the same sample    | `Chord`, every such sample    |
//!
//! Each poll reads the input registers once, so every channel in a sample is observed at the same
//! instant.  Sampling at a fixed period is the only debouncing applied.
//!
//! Events are kept in a FIFO queue in the order they were detected: per-channel events in channel
//! order, then the chord event.
use heapless::Deque;

use crate::pin::{self, Pin};
use crate::{Error, PortMutex, Xl9555};

mod channel;
mod event;

pub use channel::Lifecycle;
pub use event::{ButtonEvent, ChannelId, ChannelSet, PressKind};

use channel::Channel;

/// Capacity of the event queue.  When it is full the oldest event is dropped.
pub const EVENT_QUEUE_DEPTH: usize = 32;

/// Timing configuration of a [`ButtonMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Hold time after which a press counts as long.
    pub long_press_ms: u32,
    /// Period between polls when driven by [`ButtonMonitor::run()`].
    pub poll_interval_ms: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 1000,
            poll_interval_ms: 50,
        }
    }
}

/// Monotonic millisecond counter.
///
/// The counter may wrap; durations are computed with wrapping subtraction.
pub trait Clock {
    fn now_ms(&mut self) -> u32;
}

impl<F: FnMut() -> u32> Clock for F {
    fn now_ms(&mut self) -> u32 {
        self()
    }
}

/// Button event engine for `N` channels on one expander.
pub struct ButtonMonitor<'a, M, const N: usize> {
    expander: &'a M,
    pins: [Pin; N],
    channels: [Channel; N],
    previous: [bool; N],
    config: MonitorConfig,
    events: Deque<ButtonEvent, EVENT_QUEUE_DEPTH>,
}

impl<'a, I2C, M, const N: usize> ButtonMonitor<'a, M, N>
where
    I2C: crate::I2cBus,
    M: PortMutex<Port = Xl9555<I2C>>,
{
    /// Monitor the given pins; channel id `i` is `channels[i]`.
    ///
    /// Every pin must be known to be an input: the driver must have written or read its direction
    /// (see [`Xl9555::is_input()`]), otherwise [`Error::InvalidChannelConfig`] is returned.  No bus
    /// transfer happens here.  All channels start out released.
    pub fn new(
        expander: &'a M,
        channels: [u8; N],
        config: MonitorConfig,
    ) -> Result<Self, Error<I2C::BusError>> {
        let pins = pin::pins_from(channels).map_err(Error::InvalidPin)?;
        if N == 0 {
            return Err(Error::InvalidChannelConfig);
        }
        for (i, p) in pins.iter().enumerate() {
            if pins[..i].contains(p) {
                log::error!("button channel P{} listed twice", p.number());
                return Err(Error::InvalidChannelConfig);
            }
        }
        let (known, unusable) = expander.lock(|xl| {
            (
                xl.known_direction(),
                pins.iter().copied().find(|p| !xl.is_input(*p)),
            )
        });
        if let Some(p) = unusable {
            if known & p.mask16() == 0 {
                log::error!("button channel P{} has never been configured", p.number());
            } else {
                log::error!("button channel P{} is not configured as input", p.number());
            }
            return Err(Error::InvalidChannelConfig);
        }

        log::info!("monitoring {} button channel(s)", N);
        Ok(Self {
            expander,
            pins,
            channels: [Channel::new(); N],
            previous: [false; N],
            config,
            events: Deque::new(),
        })
    }

    /// Switch all channel pins to input, then start monitoring them.
    ///
    /// The initial key states are read once and logged.  They do not seed the monitor: a key held
    /// now still produces a `Press` on the first poll.
    pub fn configure(
        expander: &'a M,
        channels: [u8; N],
        config: MonitorConfig,
    ) -> Result<Self, Error<I2C::BusError>> {
        let pins = pin::pins_from(channels).map_err(Error::InvalidPin)?;
        let initial = expander.lock(|xl| {
            pins.iter()
                .try_for_each(|p| xl.set_pin_direction(p.number(), crate::Direction::Input))?;
            crate::snapshot::pressed_states(xl, &pins)
        })?;
        for (p, pressed) in pins.iter().zip(initial.iter()) {
            log::info!(
                "button P{} initially {}",
                p.number(),
                if *pressed { "pressed" } else { "released" }
            );
        }
        Self::new(expander, channels, config)
    }

    /// Sample all channels once and queue the resulting events.
    ///
    /// Returns the number of events queued.  If the bus read fails, nothing changes: no events are
    /// queued and every channel keeps its state, so the next successful poll compares against the
    /// last good sample.
    pub fn poll(&mut self, now_ms: u32) -> Result<usize, Error<I2C::BusError>> {
        let pins = &self.pins;
        let snapshot = self
            .expander
            .lock(|xl| crate::snapshot::pressed_states(xl, pins))?;

        let mut queued = 0;
        for (id, (channel, (&was, &is))) in self
            .channels
            .iter_mut()
            .zip(self.previous.iter().zip(snapshot.iter()))
            .enumerate()
        {
            if let Some(event) =
                channel.update(id as ChannelId, was, is, now_ms, self.config.long_press_ms)
            {
                Self::enqueue(&mut self.events, event);
                queued += 1;
            }
        }

        let pressed: ChannelSet = snapshot
            .iter()
            .enumerate()
            .filter(|(_, p)| **p)
            .map(|(id, _)| id as ChannelId)
            .collect();
        if pressed.len() >= 2 {
            Self::enqueue(
                &mut self.events,
                ButtonEvent::Chord {
                    at_ms: now_ms,
                    channels: pressed,
                },
            );
            queued += 1;
        }

        self.previous = snapshot;
        Ok(queued)
    }

    fn enqueue(events: &mut Deque<ButtonEvent, EVENT_QUEUE_DEPTH>, event: ButtonEvent) {
        log::debug!("{:?}", event);
        if events.is_full() {
            if let Some(dropped) = events.pop_front() {
                log::warn!("button event queue full, dropping {:?}", dropped);
            }
        }
        let _ = events.push_back(event);
    }

    /// Oldest queued event.
    pub fn next_event(&mut self) -> Option<ButtonEvent> {
        self.events.pop_front()
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    /// Lifecycle of a channel, `None` if `channel` is out of range.
    pub fn state(&self, channel: ChannelId) -> Option<Lifecycle> {
        self.channels.get(channel as usize).map(|c| c.state())
    }

    /// Pressed states from the last successful poll.
    pub fn previous_snapshot(&self) -> &[bool; N] {
        &self.previous
    }

    /// Expander pin of a channel.
    pub fn pin(&self, channel: ChannelId) -> Option<u8> {
        self.pins.get(channel as usize).map(|p| p.number())
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    fn poll_and_drain<C: Clock, F: FnMut(ButtonEvent)>(
        &mut self,
        clock: &mut C,
        sink: &mut F,
    ) -> Result<(), Error<I2C::BusError>> {
        let result = self.poll(clock.now_ms());
        if let Err(e) = &result {
            log::warn!("button poll failed: {:?}", e);
        }
        while let Some(event) = self.next_event() {
            sink(event);
        }
        result.map(|_| ())
    }

    /// One iteration of the polling loop: poll, hand every queued event to `sink`, then wait one
    /// poll interval.
    ///
    /// Bus errors are logged and returned after the wait; the caller decides whether to retry.
    pub fn step<D, C, F>(
        &mut self,
        delay: &mut D,
        clock: &mut C,
        sink: &mut F,
    ) -> Result<(), Error<I2C::BusError>>
    where
        D: embedded_hal::delay::DelayNs,
        C: Clock,
        F: FnMut(ButtonEvent),
    {
        let result = self.poll_and_drain(clock, sink);
        delay.delay_ms(self.config.poll_interval_ms);
        result
    }

    /// Poll forever at the configured interval.  Failed polls are skipped.
    pub fn run<D, C, F>(&mut self, delay: &mut D, clock: &mut C, mut sink: F) -> !
    where
        D: embedded_hal::delay::DelayNs,
        C: Clock,
        F: FnMut(ButtonEvent),
    {
        log::info!(
            "button polling every {} ms",
            self.config.poll_interval_ms
        );
        loop {
            let _ = self.step(delay, clock, &mut sink);
        }
    }

    /// [`step()`][Self::step] with an async delay.
    #[cfg(feature = "async")]
    pub async fn step_async<D, C, F>(
        &mut self,
        delay: &mut D,
        clock: &mut C,
        sink: &mut F,
    ) -> Result<(), Error<I2C::BusError>>
    where
        D: embedded_hal_async::delay::DelayNs,
        C: Clock,
        F: FnMut(ButtonEvent),
    {
        let result = self.poll_and_drain(clock, sink);
        delay.delay_ms(self.config.poll_interval_ms).await;
        result
    }

    /// [`run()`][Self::run] with an async delay.
    #[cfg(feature = "async")]
    pub async fn run_async<D, C, F>(
        &mut self,
        delay: &mut D,
        clock: &mut C,
        mut sink: F,
    ) -> core::convert::Infallible
    where
        D: embedded_hal_async::delay::DelayNs,
        C: Clock,
        F: FnMut(ButtonEvent),
    {
        loop {
            let _ = self.step_async(delay, clock, &mut sink).await;
        }
    }
}
