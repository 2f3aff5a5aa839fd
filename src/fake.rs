//! Register-level model of an XL9555 for tests that need more than a fixed transaction script.
use std::cell::RefCell;
use std::rc::Rc;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

struct Chip {
    regs: [u8; 8],
    /// Externally driven line levels, bit per pin.
    lines: u16,
    pointer: u8,
    fail: bool,
    input_reads: usize,
}

impl Chip {
    fn input(&self, port: usize) -> u8 {
        let direction = self.regs[6 + port];
        let line = (self.lines >> (8 * port)) as u8;
        let level = (line & direction) | (self.regs[2 + port] & !direction);
        level ^ self.regs[4 + port]
    }
}

/// Shared handle to a simulated chip at address `0x20`.
#[derive(Clone)]
pub(crate) struct FakeXl9555(Rc<RefCell<Chip>>);

impl FakeXl9555 {
    pub(crate) fn new() -> Self {
        Self(Rc::new(RefCell::new(Chip {
            regs: [0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0xff, 0xff],
            lines: 0xffff,
            pointer: 0,
            fail: false,
            input_reads: 0,
        })))
    }

    /// Drive the external line of `pin` high or low.
    pub(crate) fn set_line(&self, pin: u8, high: bool) {
        let mut chip = self.0.borrow_mut();
        if high {
            chip.lines |= 1 << pin;
        } else {
            chip.lines &= !(1 << pin);
        }
    }

    /// Make every following transfer fail until cleared.
    pub(crate) fn set_failing(&self, fail: bool) {
        self.0.borrow_mut().fail = fail;
    }

    /// Number of reads so far that started at an input register.
    pub(crate) fn input_reads(&self) -> usize {
        self.0.borrow().input_reads
    }
}

impl ErrorType for FakeXl9555 {
    type Error = ErrorKind;
}

impl I2c for FakeXl9555 {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        let mut chip = self.0.borrow_mut();
        if address != 0x20 {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        if chip.fail {
            return Err(ErrorKind::Other);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    if let Some((&pointer, data)) = bytes.split_first() {
                        chip.pointer = pointer & 0x07;
                        for &b in data {
                            let reg = chip.pointer as usize;
                            if reg >= 2 {
                                chip.regs[reg] = b;
                            }
                            chip.pointer = (chip.pointer + 1) & 0x07;
                        }
                    }
                }
                Operation::Read(buf) => {
                    if chip.pointer < 2 {
                        chip.input_reads += 1;
                    }
                    for b in buf.iter_mut() {
                        let reg = chip.pointer as usize;
                        *b = if reg < 2 {
                            chip.input(reg)
                        } else {
                            chip.regs[reg]
                        };
                        chip.pointer = (chip.pointer + 1) & 0x07;
                    }
                }
            }
        }
        Ok(())
    }
}
