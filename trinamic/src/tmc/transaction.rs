use core::cell::RefMut;

use embedded_hal::digital::OutputPin;
use generic::tmc_error::TmcError;

use crate::common::bus::{RegisterBus, SharedBus};
use crate::tmc::field::FieldId;
use crate::tmc::register::{Access, RegisterDef, ShadowFile};

/// An open, exclusive window on the bus for one driver.
///
/// Creating the transaction claims the shared bus and asserts the driver's select line; dropping
/// it deasserts the line and releases the bus, whichever way the caller leaves the scope. All
/// register traffic and every shadow update goes through here.
pub struct Transaction<'a, B: RegisterBus, CS: OutputPin> {
    bus: RefMut<'a, B>,
    select: &'a mut CS,
    shadow: &'a mut ShadowFile,
    node: u8,
}

impl<'a, B: RegisterBus, CS: OutputPin> Transaction<'a, B, CS> {
    pub fn begin(
        bus: &'a SharedBus<B>,
        select: &'a mut CS,
        shadow: &'a mut ShadowFile,
        node: u8,
    ) -> Result<Self, TmcError> {
        let bus = bus.try_borrow_mut().map_err(|_| TmcError::BusBusy)?;
        select.set_high().map_err(|_| TmcError::GpioPinError)?;
        Ok(Transaction { bus, select, shadow, node })
    }

    pub fn shadow(&self) -> &ShadowFile {
        &*self.shadow
    }

    fn def(&self, addr: u8) -> Result<&'static RegisterDef, TmcError> {
        self.shadow.def(addr)
    }

    /// Reads a register from the chip and refreshes its shadow.
    pub fn read(&mut self, addr: u8) -> Result<u32, TmcError> {
        let def = self.def(addr)?;
        if !def.access.readable() {
            return Err(TmcError::RegisterNotReadable);
        }
        let word = self.bus.read_register(self.node, addr)? & def.mask();
        self.shadow.set(addr, word)?;
        Ok(word)
    }

    /// Writes a whole register. The shadow only changes once the bus accepted the write.
    pub fn write(&mut self, addr: u8, word: u32) -> Result<(), TmcError> {
        let def = self.def(addr)?;
        if !def.access.writable() {
            return Err(TmcError::RegisterNotWritable);
        }
        let word = word & def.mask();
        self.bus.write_register(self.node, addr, word)?;
        self.shadow.set(addr, word)
    }

    pub fn read_field(&mut self, id: FieldId) -> Result<u32, TmcError> {
        let field = self.shadow.field(id)?;
        let word = self.read(field.addr)?;
        Ok(field.unpack(word))
    }

    /// Read-modify-write of one field against the shadow.
    pub fn write_field(&mut self, id: FieldId, value: u32) -> Result<(), TmcError> {
        self.write_fields(&[(id, value)])
    }

    /// Several fields of the same register in a single bus write.
    pub fn write_fields(&mut self, updates: &[(FieldId, u32)]) -> Result<(), TmcError> {
        let (addr, word) = self.shadow.staged(updates)?;
        self.write(addr, word)
    }

    /// Reissues the shadow of every configuration register, e.g. after the chip was power cycled.
    ///
    /// Write-to-clear status registers are skipped, replaying them would acknowledge flags.
    pub fn push(&mut self) -> Result<(), TmcError> {
        for def in self.shadow.registers() {
            if matches!(def.access, Access::W | Access::RW) {
                let word = self.shadow.get(def.addr)?;
                self.write(def.addr, word)?;
            }
        }
        Ok(())
    }
}

impl<B: RegisterBus, CS: OutputPin> Drop for Transaction<'_, B, CS> {
    fn drop(&mut self) {
        // nowhere to report a failure from here, the next begin() will hit the same pin error.
        let _ = self.select.set_low();
    }
}
