/// Number of I/O lines on the expander.
pub const PIN_COUNT: u8 = 16;

/// One of the two 8-bit ports of the expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    /// Pins 0 to 7 (`IO0_x`).
    Port0,
    /// Pins 8 to 15 (`IO1_x`).
    Port1,
}

impl Port {
    pub(crate) fn index(self) -> usize {
        match self {
            Port::Port0 => 0,
            Port::Port1 => 1,
        }
    }
}

/// Direction of a pin.
///
/// The configuration register encodes `Input` as 1 and `Output` as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// A validated expander pin number.
///
/// The port a pin lives on and its bit position inside that port's registers are derived here and
/// nowhere else: pins `0..8` map to bits `0..8` of port 0, pins `8..16` to bits `0..8` of port 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pin(u8);

impl Pin {
    /// Returns `None` for pin numbers outside `0..16`.
    pub const fn new(pin: u8) -> Option<Self> {
        if pin < PIN_COUNT {
            Some(Self(pin))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    pub const fn port(self) -> Port {
        if self.0 < 8 {
            Port::Port0
        } else {
            Port::Port1
        }
    }

    /// Bit position inside the owning port's registers.
    pub const fn bit(self) -> u8 {
        self.0 % 8
    }

    /// Single-bit mask for the owning port's 8-bit registers.
    pub const fn mask(self) -> u8 {
        1 << self.bit()
    }

    /// Single-bit mask for the combined 16-bit view (port 0 in the low byte).
    pub const fn mask16(self) -> u16 {
        1 << self.0
    }
}

impl TryFrom<u8> for Pin {
    type Error = u8;

    fn try_from(pin: u8) -> Result<Self, Self::Error> {
        Pin::new(pin).ok_or(pin)
    }
}

impl From<Pin> for u8 {
    fn from(p: Pin) -> u8 {
        p.0
    }
}

/// Validate a whole set of pin numbers at once, reporting the first bad one.
pub(crate) fn pins_from<const N: usize>(numbers: [u8; N]) -> Result<[Pin; N], u8> {
    if let Some(&bad) = numbers.iter().find(|&&n| n >= PIN_COUNT) {
        return Err(bad);
    }
    Ok(numbers.map(Pin))
}

/// Combine the two port bytes into the 16-bit view used for cached state.
pub(crate) const fn join(port0: u8, port1: u8) -> u16 {
    ((port1 as u16) << 8) | port0 as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_and_bit() {
        let p3 = Pin::new(3).unwrap();
        assert_eq!(p3.port(), Port::Port0);
        assert_eq!(p3.bit(), 3);
        assert_eq!(p3.mask(), 0b0000_1000);

        let p15 = Pin::new(15).unwrap();
        assert_eq!(p15.port(), Port::Port1);
        assert_eq!(p15.bit(), 7);
        assert_eq!(p15.mask(), 0b1000_0000);
        assert_eq!(p15.mask16(), 0x8000);

        let p8 = Pin::new(8).unwrap();
        assert_eq!(p8.port(), Port::Port1);
        assert_eq!(p8.bit(), 0);
    }

    #[test]
    fn out_of_range() {
        assert_eq!(Pin::new(16), None);
        assert_eq!(Pin::try_from(200), Err(200));
    }

    #[test]
    fn validate_set() {
        let pins = pins_from([15, 0, 8]).unwrap();
        assert_eq!(pins.map(Pin::number), [15, 0, 8]);
        assert_eq!(pins_from([1, 17, 42]), Err(17));
    }

    #[test]
    fn join_ports() {
        assert_eq!(join(0x34, 0x12), 0x1234);
    }
}
