use embedded_hal::i2c as hal_i2c;

/// Blanket trait for types implementing `i2c::I2c` with 7-bit addressing
pub trait I2cBus: hal_i2c::I2c<hal_i2c::SevenBitAddress> {
    type BusError: From<<Self as hal_i2c::ErrorType>::Error> + core::fmt::Debug;
}

impl<T, E> I2cBus for T
where
    T: hal_i2c::I2c<hal_i2c::SevenBitAddress, Error = E>,
    E: core::fmt::Debug,
{
    type BusError = E;
}

pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
    fn read_regs<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = I2C::BusError;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[reg.into(), value])?;
        Ok(())
    }

    /// Select the register with a pointer write, then fetch one byte in a separate transfer.
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write(addr, &[reg.into()])?;
        self.read(addr, &mut buf)?;
        Ok(buf[0])
    }

    /// Read consecutive registers starting at `reg` in one write-read transaction.
    fn read_regs<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.write_read(addr, &[reg.into()], buf)?;
        Ok(())
    }
}

/// Maximum number of responders collected by [`scan`].
pub const MAX_SCAN_RESULTS: usize = 16;

/// Probe the bus for devices.
///
/// Every non-reserved 7-bit address (`0x08..0x78`) is addressed with an empty write; all addresses
/// which acknowledge are returned.  Useful during board bring-up to check that the expander is
/// wired up at all before calling [`Xl9555::init()`][crate::Xl9555::init].
pub fn scan<I2C: I2cBus>(i2c: &mut I2C) -> heapless::Vec<u8, MAX_SCAN_RESULTS> {
    let mut found = heapless::Vec::new();
    for addr in 0x08..0x78 {
        if i2c.write(addr, &[]).is_ok() {
            log::debug!("i2c device at {:#04x}", addr);
            if found.push(addr).is_err() {
                log::warn!("i2c scan: more than {} devices, stopping", MAX_SCAN_RESULTS);
                break;
            }
        }
    }
    log::info!("i2c scan found {} device(s)", found.len());
    found
}

#[cfg(test)]
mod tests {
    use super::I2cExt;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn register_access() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x03, 0xa5]),
            mock_i2c::Transaction::write(0x20, vec![0x06]),
            mock_i2c::Transaction::read(0x20, vec![0x5a]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        bus.write_reg(0x20, 0x03, 0xa5).unwrap();
        assert_eq!(bus.read_reg(0x20, 0x06).unwrap(), 0x5a);

        bus.done();
    }

    #[test]
    fn register_pair_in_one_transaction() {
        let expectations = [mock_i2c::Transaction::write_read(
            0x20,
            vec![0x00],
            vec![0x12, 0x34],
        )];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut buf = [0x00; 2];
        bus.read_regs(0x20, 0x00, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x34]);

        bus.done();
    }

    #[test]
    fn read_fails_when_pointer_write_fails() {
        let expectations =
            [mock_i2c::Transaction::write(0x20, vec![0x00]).with_error(ErrorKind::Other)];
        let mut bus = mock_i2c::Mock::new(&expectations);

        assert_eq!(bus.read_reg(0x20, 0x00), Err(ErrorKind::Other));

        bus.done();
    }

    #[test]
    fn read_fails_when_data_read_fails() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x01]),
            mock_i2c::Transaction::read(0x20, vec![0x00]).with_error(ErrorKind::Other),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        assert_eq!(bus.read_reg(0x20, 0x01), Err(ErrorKind::Other));

        bus.done();
    }

    #[test]
    fn scan_reports_responders() {
        let expectations: Vec<_> = (0x08..0x78u8)
            .map(|addr| {
                let t = mock_i2c::Transaction::write(addr, vec![]);
                if addr == 0x20 || addr == 0x51 {
                    t
                } else {
                    t.with_error(ErrorKind::NoAcknowledge(
                        embedded_hal::i2c::NoAcknowledgeSource::Address,
                    ))
                }
            })
            .collect();
        let mut bus = mock_i2c::Mock::new(&expectations);

        let found = super::scan(&mut bus);
        assert_eq!(found.as_slice(), &[0x20, 0x51]);

        bus.done();
    }
}
