use core::fmt;

/// Errors returned by the expander driver and the button engine.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// A register transfer failed on the bus.
    Bus(E),
    /// The presence check during initialization got no answer from the chip.
    ChipNotFound(E),
    /// Pin number outside `0..16`.  Reported before any bus activity.
    InvalidPin(u8),
    /// A button channel set is empty, contains a pin twice, or names a pin that is not configured
    /// as an input.
    InvalidChannelConfig,
    /// Waiting for a key press timed out.
    Timeout,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::Bus(e)
    }
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus error: {:?}", e),
            Error::ChipNotFound(e) => write!(f, "XL9555 not found: {:?}", e),
            Error::InvalidPin(p) => write!(f, "invalid pin {}", p),
            Error::InvalidChannelConfig => f.write_str("invalid button channel configuration"),
            Error::Timeout => f.write_str("timed out"),
        }
    }
}

#[cfg(any(test, feature = "std"))]
impl<E: fmt::Debug> std::error::Error for Error<E> {}
