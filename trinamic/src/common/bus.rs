use core::cell::RefCell;
use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};
use generic::tmc_error::TmcError;

/// Raw register access on the physical control bus.
///
/// `node` is the chip's bus address (the UART slave address set by the MS1/MS2 straps), so
/// several drivers can sit on one wire.
pub trait RegisterBus {
    fn read_register(&mut self, node: u8, addr: u8) -> Result<u32, TmcError>;

    fn write_register(&mut self, node: u8, addr: u8, data: u32) -> Result<(), TmcError>;

    /// Whether the transport was actually brought up.
    fn is_available(&self) -> bool {
        true
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    fn read_register(&mut self, node: u8, addr: u8) -> Result<u32, TmcError> {
        (**self).read_register(node, addr)
    }

    fn write_register(&mut self, node: u8, addr: u8, data: u32) -> Result<(), TmcError> {
        (**self).write_register(node, addr, data)
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }
}

/// One physical bus shared by every driver wired to it.
///
/// Exclusive use is taken per transaction by borrowing the cell; a second transaction while one
/// is open fails with `BusBusy` instead of interleaving on the wire.
pub type SharedBus<B> = RefCell<B>;

/// Stand-in for an optional select or enable line that is not wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}
