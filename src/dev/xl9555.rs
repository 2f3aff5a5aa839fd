//! Support for the `XL9555` "16-bit I2C-bus I/O port expander"
use crate::pin::{join, Direction, Pin, Port};
use crate::{Error, I2cExt};
use embedded_hal::digital::PinState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regs {
    InputPort0 = 0x00,
    InputPort1 = 0x01,
    OutputPort0 = 0x02,
    OutputPort1 = 0x03,
    PolarityInversion0 = 0x04,
    PolarityInversion1 = 0x05,
    Configuration0 = 0x06,
    Configuration1 = 0x07,
}

impl Regs {
    fn input(port: Port) -> Self {
        match port {
            Port::Port0 => Regs::InputPort0,
            Port::Port1 => Regs::InputPort1,
        }
    }

    fn output(port: Port) -> Self {
        match port {
            Port::Port0 => Regs::OutputPort0,
            Port::Port1 => Regs::OutputPort1,
        }
    }

    fn polarity(port: Port) -> Self {
        match port {
            Port::Port0 => Regs::PolarityInversion0,
            Port::Port1 => Regs::PolarityInversion1,
        }
    }

    fn configuration(port: Port) -> Self {
        match port {
            Port::Port0 => Regs::Configuration0,
            Port::Port1 => Regs::Configuration1,
        }
    }
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

/// Address of the expander with all address straps tied low.
pub const DEFAULT_ADDRESS: u8 = 0x20;

/// Last known register contents of one 8-bit port.
///
/// Bit `i` belongs to pin `port * 8 + i`.  `direction` uses the chip's encoding: 1 is input, 0 is
/// output.  Only bits set in `direction_known` have been written to or read from the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PortRegisters {
    direction: u8,
    direction_known: u8,
    output: u8,
    input: u8,
}

impl PortRegisters {
    /// Register values after power-on reset.
    const RESET: Self = Self {
        direction: 0xff,
        direction_known: 0x00,
        output: 0xff,
        input: 0xff,
    };
}

/// `XL9555` "16-bit I2C-bus I/O port expander"
///
/// Direction and output registers are cached: the cache is updated only after the chip accepted a
/// write (or after a successful read of the register), so a failed transfer never leaves the
/// cache ahead of the hardware.  Input levels are always read fresh from the chip.
pub struct Xl9555<I2C> {
    i2c: I2C,
    addr: u8,
    ports: [PortRegisters; 2],
}

impl<I2C> Xl9555<I2C> {
    /// Expander at the default address `0x20`.
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, false, false, false)
    }

    /// Expander with the given address strap levels (`0x20 | a2 a1 a0`).
    pub fn with_address(i2c: I2C, a0: bool, a1: bool, a2: bool) -> Self {
        let addr = DEFAULT_ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8);
        Self {
            i2c,
            addr,
            ports: [PortRegisters::RESET; 2],
        }
    }

    pub fn address(&self) -> u8 {
        self.addr
    }

    /// Cached direction masks, port 0 in the low byte (1 = input).
    pub fn cached_direction(&self) -> u16 {
        join(self.ports[0].direction, self.ports[1].direction)
    }

    /// Cached output masks, port 0 in the low byte.
    pub fn cached_output(&self) -> u16 {
        join(self.ports[0].output, self.ports[1].output)
    }

    /// Input levels seen by the most recent successful input read, port 0 in the low byte.
    pub fn last_input(&self) -> u16 {
        join(self.ports[0].input, self.ports[1].input)
    }

    /// Pins whose direction was confirmed by a configuration write or read, port 0 in the low byte.
    pub fn known_direction(&self) -> u16 {
        join(self.ports[0].direction_known, self.ports[1].direction_known)
    }

    /// Whether `pin` is known to be an input.
    ///
    /// A freshly constructed driver knows nothing about the chip, which may have kept its
    /// configuration across a reset of the host, so this is `false` until [`init()`],
    /// [`set_pin_direction()`], [`set_port_direction()`] or [`get_config()`] succeeded.
    ///
    /// [`init()`]: Xl9555::init
    /// [`set_pin_direction()`]: Xl9555::set_pin_direction
    /// [`set_port_direction()`]: Xl9555::set_port_direction
    /// [`get_config()`]: Xl9555::get_config
    pub fn is_input(&self, pin: Pin) -> bool {
        let port = &self.ports[pin.port().index()];
        port.direction_known & port.direction & pin.mask() != 0
    }

    fn set_cached_direction(&mut self, port: usize, value: u8) {
        self.ports[port].direction = value;
        self.ports[port].direction_known = 0xff;
    }

    /// Give back the bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: crate::I2cBus> Xl9555<I2C> {
    fn read(&mut self, reg: Regs) -> Result<u8, Error<I2C::BusError>> {
        Ok(self.i2c.read_reg(self.addr, reg)?)
    }

    fn write(&mut self, reg: Regs, value: u8) -> Result<(), Error<I2C::BusError>> {
        self.i2c.write_reg(self.addr, reg, value)?;
        log::debug!("xl9555 {:?} <- {:#04x}", reg, value);
        Ok(())
    }

    fn pin(pin: u8) -> Result<Pin, Error<I2C::BusError>> {
        Pin::new(pin).ok_or(Error::InvalidPin(pin))
    }

    /// Check that the chip answers and bring it into a known state.
    ///
    /// All pins become inputs first, then all output latches are set low.
    pub fn init(&mut self) -> Result<(), Error<I2C::BusError>> {
        log::info!("initializing XL9555 at {:#04x}", self.addr);
        let (config0, config1) = match self.get_config() {
            Ok(config) => config,
            Err(Error::Bus(e)) => {
                log::error!("XL9555 not found at {:#04x}: {:?}", self.addr, e);
                return Err(Error::ChipNotFound(e));
            }
            Err(e) => return Err(e),
        };
        log::info!(
            "XL9555 present, config port0={:#04x} port1={:#04x}",
            config0,
            config1
        );

        self.set_port_direction(0xff, 0xff)?;
        self.set_port_level(0x00, 0x00)?;
        log::info!("XL9555 initialized");
        Ok(())
    }

    /// Read-modify-write the direction bit of a single pin.
    pub fn set_pin_direction(
        &mut self,
        pin: u8,
        direction: Direction,
    ) -> Result<(), Error<I2C::BusError>> {
        let pin = Self::pin(pin)?;
        let reg = Regs::configuration(pin.port());
        let current = self.read(reg)?;
        let value = match direction {
            Direction::Input => current | pin.mask(),
            Direction::Output => current & !pin.mask(),
        };
        self.write(reg, value)?;
        self.set_cached_direction(pin.port().index(), value);
        log::info!("XL9555 P{} direction {:?}", pin.number(), direction);
        Ok(())
    }

    /// Overwrite both direction registers (1 = input, 0 = output).
    pub fn set_port_direction(
        &mut self,
        port0_mask: u8,
        port1_mask: u8,
    ) -> Result<(), Error<I2C::BusError>> {
        self.write(Regs::Configuration0, port0_mask)?;
        self.set_cached_direction(0, port0_mask);
        self.write(Regs::Configuration1, port1_mask)?;
        self.set_cached_direction(1, port1_mask);
        log::info!(
            "XL9555 direction port0={:#04x} port1={:#04x}",
            port0_mask,
            port1_mask
        );
        Ok(())
    }

    /// Read-modify-write the output latch of a single pin.
    ///
    /// The latch is written even if the pin is currently an input; the level takes effect once the
    /// pin is switched to output.
    pub fn set_pin_level(&mut self, pin: u8, level: PinState) -> Result<(), Error<I2C::BusError>> {
        let pin = Self::pin(pin)?;
        let reg = Regs::output(pin.port());
        let current = self.read(reg)?;
        let value = match level {
            PinState::High => current | pin.mask(),
            PinState::Low => current & !pin.mask(),
        };
        self.write(reg, value)?;
        self.ports[pin.port().index()].output = value;
        Ok(())
    }

    /// Overwrite both output registers.
    pub fn set_port_level(
        &mut self,
        port0_level: u8,
        port1_level: u8,
    ) -> Result<(), Error<I2C::BusError>> {
        self.write(Regs::OutputPort0, port0_level)?;
        self.ports[0].output = port0_level;
        self.write(Regs::OutputPort1, port1_level)?;
        self.ports[1].output = port1_level;
        Ok(())
    }

    /// Flip the output latch of a single pin.
    pub fn toggle_pin(&mut self, pin: u8) -> Result<(), Error<I2C::BusError>> {
        let pin = Self::pin(pin)?;
        let reg = Regs::output(pin.port());
        let value = self.read(reg)? ^ pin.mask();
        self.write(reg, value)?;
        self.ports[pin.port().index()].output = value;
        Ok(())
    }

    /// Current level of a pin, read from the input register.
    ///
    /// This is never answered from the cache.  For output pins the input register reports the
    /// level actually present on the line.
    pub fn get_pin_level(&mut self, pin: u8) -> Result<PinState, Error<I2C::BusError>> {
        let pin = Self::pin(pin)?;
        let port = pin.port();
        let value = self.read(Regs::input(port))?;
        self.ports[port.index()].input = value;
        Ok(PinState::from(value & pin.mask() != 0))
    }

    /// Both input registers.
    pub fn get_port_level(&mut self) -> Result<(u8, u8), Error<I2C::BusError>> {
        let levels = self.read_input_mask(0xffff)?;
        Ok((levels as u8, (levels >> 8) as u8))
    }

    /// Both output registers, as stored on the chip.
    pub fn get_output_status(&mut self) -> Result<(u8, u8), Error<I2C::BusError>> {
        let port0 = self.read(Regs::OutputPort0)?;
        self.ports[0].output = port0;
        let port1 = self.read(Regs::OutputPort1)?;
        self.ports[1].output = port1;
        Ok((port0, port1))
    }

    /// Both configuration registers, as stored on the chip (1 = input).
    pub fn get_config(&mut self) -> Result<(u8, u8), Error<I2C::BusError>> {
        let port0 = self.read(Regs::Configuration0)?;
        self.set_cached_direction(0, port0);
        let port1 = self.read(Regs::Configuration1)?;
        self.set_cached_direction(1, port1);
        Ok((port0, port1))
    }

    /// Read-modify-write the input polarity inversion bit of a single pin.
    pub fn set_pin_polarity(&mut self, pin: u8, inverted: bool) -> Result<(), Error<I2C::BusError>> {
        let pin = Self::pin(pin)?;
        let reg = Regs::polarity(pin.port());
        let current = self.read(reg)?;
        let value = if inverted {
            current | pin.mask()
        } else {
            current & !pin.mask()
        };
        self.write(reg, value)
    }

    /// Read the input registers of all ports touched by `mask` (port 0 in the low byte).
    ///
    /// A port whose bits are all clear in `mask` is not read; its byte in the result comes from
    /// the last successful read.  When both ports are involved, both registers are fetched in a
    /// single transaction, so the result is one sample of all 16 lines.
    pub fn read_input_mask(&mut self, mask: u16) -> Result<u16, Error<I2C::BusError>> {
        let (port0, port1) = match (mask & 0x00ff != 0, mask & 0xff00 != 0) {
            (true, true) => {
                let mut buf = [0x00; 2];
                self.i2c.read_regs(self.addr, Regs::InputPort0, &mut buf)?;
                (buf[0], buf[1])
            }
            (true, false) => (self.read(Regs::InputPort0)?, self.ports[1].input),
            (false, true) => (self.ports[0].input, self.read(Regs::InputPort1)?),
            (false, false) => (self.ports[0].input, self.ports[1].input),
        };
        self.ports[0].input = port0;
        self.ports[1].input = port1;
        Ok(join(port0, port1))
    }
}
