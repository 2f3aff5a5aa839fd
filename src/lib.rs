//! Driver for the `XL9555` 16-bit I2C port-expander and a polled button event engine on top of it.
//!
//! [`Xl9555`] caches the direction and output registers of the chip and keeps that cache in step
//! with the hardware; [`ButtonMonitor`] samples button channels on the expander and turns the
//! samples into press, release, long-press and chord events.
//!
//! ## Example
//! ```no_run
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! # struct Delay;
//! # impl embedded_hal::delay::DelayNs for Delay { fn delay_ns(&mut self, _: u32) {} }
//! # let mut delay = Delay;
//! use xl9555_buttons::{ButtonMonitor, MonitorConfig, PortMutex, Xl9555, KEYS};
//!
//! let mut xl = Xl9555::new(i2c);
//! xl.init().unwrap();
//! let xl: core::cell::RefCell<_> = PortMutex::create(xl);
//!
//! let mut monitor = ButtonMonitor::configure(&xl, KEYS, MonitorConfig::default()).unwrap();
//! let mut now = 0u32;
//! let mut clock = || {
//!     now += 50;
//!     now
//! };
//! monitor.run(&mut delay, &mut clock, |event| {
//!     log::info!("{:?}", event);
//! });
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

mod bus;
pub mod buttons;
pub mod dev;
mod error;
#[cfg(test)]
mod fake;
mod mutex;
mod pin;
mod snapshot;

pub use bus::{scan, I2cBus, MAX_SCAN_RESULTS};
pub use buttons::{
    ButtonEvent, ButtonMonitor, ChannelId, ChannelSet, Clock, Lifecycle, MonitorConfig, PressKind,
};
pub use dev::xl9555::Xl9555;
pub use embedded_hal::digital::PinState;
pub use error::Error;
pub use mutex::PortMutex;
pub use pin::{Direction, Pin, Port, PIN_COUNT};
pub use snapshot::{
    key_pressed, read_snapshot, wait_for_press, KEY0, KEY1, KEY2, KEY3, KEYS, KEY_POLL_MS,
};

pub(crate) use bus::I2cExt;
