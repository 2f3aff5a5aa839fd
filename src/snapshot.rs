//! Reading button states straight from the expander.
//!
//! Buttons pull their line to ground when closed, so a pin reading low is a pressed key.
use crate::pin::{self, Pin};
use crate::{Error, Xl9555};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

/// `KEY0` on the board, wired to `IO1_7`.
pub const KEY0: u8 = 15;
/// `KEY1` on the board, wired to `IO1_6`.
pub const KEY1: u8 = 14;
/// `KEY2` on the board, wired to `IO1_5`.
pub const KEY2: u8 = 13;
/// `KEY3` on the board, wired to `IO1_4`.
pub const KEY3: u8 = 12;

/// All board keys in `KEY0..=KEY3` order.
pub const KEYS: [u8; 4] = [KEY0, KEY1, KEY2, KEY3];

/// Poll period of [`wait_for_press()`].
pub const KEY_POLL_MS: u32 = 10;

pub(crate) fn pressed_states<I2C: crate::I2cBus, const N: usize>(
    xl: &mut Xl9555<I2C>,
    pins: &[Pin; N],
) -> Result<[bool; N], Error<I2C::BusError>> {
    let mask = pins.iter().fold(0, |m, p| m | p.mask16());
    let levels = xl.read_input_mask(mask)?;
    Ok(pins.map(|p| levels & p.mask16() == 0))
}

/// Read whether each of `pins` is pressed, all at the same instant.
///
/// Checking keys one by one with [`key_pressed()`] costs one bus transaction per key and can see
/// a chord half-pressed.  This fetches every involved input register in a single transaction, also
/// when the pins are spread over both ports.
///
/// ## Example
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// let mut xl = xl9555_buttons::Xl9555::new(i2c);
/// let pressed = xl9555_buttons::read_snapshot(&mut xl, xl9555_buttons::KEYS).unwrap();
/// if pressed[0] && pressed[1] {
///     // KEY0 + KEY1
/// }
/// ```
pub fn read_snapshot<I2C: crate::I2cBus, const N: usize>(
    xl: &mut Xl9555<I2C>,
    pins: [u8; N],
) -> Result<[bool; N], Error<I2C::BusError>> {
    let pins = pin::pins_from(pins).map_err(Error::InvalidPin)?;
    pressed_states(xl, &pins)
}

fn key<E>(pin: u8) -> Result<u8, Error<E>> {
    if KEYS.contains(&pin) {
        Ok(pin)
    } else {
        Err(Error::InvalidPin(pin))
    }
}

/// Whether a board key is pressed.
///
/// `pin` must be one of [`KEYS`], anything else is [`Error::InvalidPin`].
pub fn key_pressed<I2C: crate::I2cBus>(
    xl: &mut Xl9555<I2C>,
    pin: u8,
) -> Result<bool, Error<I2C::BusError>> {
    let pin = key::<I2C::BusError>(pin)?;
    Ok(xl.get_pin_level(pin)? == PinState::Low)
}

/// Block until the board key `pin` reads pressed.
///
/// The key is sampled every [`KEY_POLL_MS`].  A `timeout_ms` of 0 waits forever, otherwise
/// [`Error::Timeout`] is returned once the time spent waiting reaches `timeout_ms`.
pub fn wait_for_press<I2C: crate::I2cBus, D: DelayNs>(
    xl: &mut Xl9555<I2C>,
    pin: u8,
    delay: &mut D,
    timeout_ms: u32,
) -> Result<(), Error<I2C::BusError>> {
    let pin = key::<I2C::BusError>(pin)?;
    let mut waited_ms: u32 = 0;
    loop {
        if key_pressed(xl, pin)? {
            log::info!("key P{} pressed", pin);
            return Ok(());
        }
        if timeout_ms > 0 && waited_ms >= timeout_ms {
            log::warn!("timed out waiting for key P{}", pin);
            return Err(Error::Timeout);
        }
        delay.delay_ms(KEY_POLL_MS);
        waited_ms = waited_ms.saturating_add(KEY_POLL_MS);
    }
}
