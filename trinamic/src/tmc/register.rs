//! Register descriptors and the per-driver shadow register file.
//!
//! Both supported chips share the Trinamic UART register addresses, but register widths, reset
//! values and field layouts differ per variant.

use generic::tmc_error::TmcError;

use crate::tmc::field::{Field, FieldId};
use crate::tmc::variant::ChipVariant;

/// Register addresses of the single-wire UART register map.
pub mod addr {
    pub const GCONF: u8 = 0x00;
    pub const GSTAT: u8 = 0x01;
    pub const IFCNT: u8 = 0x02;
    pub const SLAVECONF: u8 = 0x03;
    pub const IOIN: u8 = 0x06;
    pub const IHOLD_IRUN: u8 = 0x10;
    pub const TPOWERDOWN: u8 = 0x11;
    pub const TSTEP: u8 = 0x12;
    pub const TPWMTHRS: u8 = 0x13;
    pub const TCOOLTHRS: u8 = 0x14;
    pub const VACTUAL: u8 = 0x22;
    pub const SGTHRS: u8 = 0x40;
    pub const SG_RESULT: u8 = 0x41;
    pub const COOLCONF: u8 = 0x42;
    pub const MSCNT: u8 = 0x6A;
    pub const CHOPCONF: u8 = 0x6C;
    pub const DRV_STATUS: u8 = 0x6F;
    pub const PWMCONF: u8 = 0x70;
    pub const PWM_SCALE: u8 = 0x71;
    pub const PWM_AUTO: u8 = 0x72;
}

/// Upper bound on the number of registers a variant may declare.
pub const MAX_REGISTERS: usize = 24;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Access {
    R,
    W,
    RW,
    /// Readable, bits are cleared by writing one.
    RWC,
}

impl Access {
    pub const fn readable(&self) -> bool {
        !matches!(self, Access::W)
    }

    pub const fn writable(&self) -> bool {
        !matches!(self, Access::R)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RegisterDef {
    pub name: &'static str,
    pub addr: u8,
    pub width: u8,
    pub access: Access,
    /// Power-on value.
    pub reset: u32,
}

impl RegisterDef {
    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }
}

/// Generates a variant's register table.
///
/// Entries are `ACCESS ADDRESS NAME WIDTH = RESET`. The declaration order is the order `push`
/// reissues writable registers in.
macro_rules! register_map {
    ($($RW:ident $addr:path, $name:ident $width:literal = $reset:expr,)*) => {
        /// The total number of documented registers of this variant.
        pub const COUNT: usize = 0 $(+ { let _ = $addr; 1 })*;

        pub const REGISTERS: [RegisterDef; COUNT] = [
            $(
                RegisterDef {
                    name: stringify!($name),
                    addr: $addr,
                    width: $width,
                    access: Access::$RW,
                    reset: $reset,
                },
            )*
        ];

        const _: () = assert!(COUNT <= $crate::tmc::register::MAX_REGISTERS);
    };
}

pub(crate) use register_map;

/// Locally cached copy of every register of one driver.
///
/// The shadow is what read-modify-write operates on: changing one field never touches the bits
/// of the others, and `push` can replay the whole configuration after the chip lost power.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShadowFile {
    variant: ChipVariant,
    words: [u32; MAX_REGISTERS],
}

impl ShadowFile {
    pub fn new(variant: ChipVariant) -> Self {
        let mut shadow = ShadowFile { variant, words: [0; MAX_REGISTERS] };
        shadow.reset();
        shadow
    }

    /// Back to the chip's power-on values.
    pub fn reset(&mut self) {
        for (word, def) in self.words.iter_mut().zip(self.variant.registers()) {
            *word = def.reset;
        }
    }

    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    pub fn registers(&self) -> &'static [RegisterDef] {
        self.variant.registers()
    }

    fn index(&self, addr: u8) -> Result<usize, TmcError> {
        self.registers().iter().position(|d| d.addr == addr).ok_or(TmcError::UnknownRegister)
    }

    pub fn def(&self, addr: u8) -> Result<&'static RegisterDef, TmcError> {
        let idx = self.index(addr)?;
        Ok(&self.registers()[idx])
    }

    pub fn get(&self, addr: u8) -> Result<u32, TmcError> {
        Ok(self.words[self.index(addr)?])
    }

    /// Store a word, truncated to the register width.
    pub fn set(&mut self, addr: u8, word: u32) -> Result<(), TmcError> {
        let idx = self.index(addr)?;
        self.words[idx] = word & self.registers()[idx].mask();
        Ok(())
    }

    pub fn field(&self, id: FieldId) -> Result<Field, TmcError> {
        self.variant.field(id).ok_or(TmcError::UnsupportedField)
    }

    pub fn get_field(&self, id: FieldId) -> Result<u32, TmcError> {
        let field = self.field(id)?;
        Ok(field.unpack(self.get(field.addr)?))
    }

    pub fn set_field(&mut self, id: FieldId, value: u32) -> Result<(), TmcError> {
        let field = self.field(id)?;
        let word = field.pack(self.get(field.addr)?, value);
        self.set(field.addr, word)
    }

    /// Computes the register word that results from applying `updates` on top of the shadow,
    /// without storing it. All fields must live in the same register.
    pub fn staged(&self, updates: &[(FieldId, u32)]) -> Result<(u8, u32), TmcError> {
        let mut target: Option<(u8, u32)> = None;
        for &(id, value) in updates {
            let field = self.field(id)?;
            let (addr, word) = match target {
                None => (field.addr, self.get(field.addr)?),
                Some((addr, word)) if addr == field.addr => (addr, word),
                Some(_) => return Err(TmcError::UnsupportedField),
            };
            target = Some((addr, field.pack(word, value)));
        }
        target.ok_or(TmcError::UnsupportedField)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_starts_at_reset_values() {
        let shadow = ShadowFile::new(ChipVariant::Tmc2209);
        assert_eq!(shadow.get(addr::CHOPCONF), Ok(0x1000_0053));
        assert_eq!(shadow.get(addr::PWMCONF), Ok(0xC10D_0024));
        assert_eq!(shadow.get(addr::SGTHRS), Ok(0));
        assert_eq!(shadow.get(0x7F), Err(TmcError::UnknownRegister));
    }

    #[test]
    fn test_set_truncates_to_register_width() {
        let mut shadow = ShadowFile::new(ChipVariant::Tmc2209);
        shadow.set(addr::SGTHRS, 0x1FF).unwrap();
        assert_eq!(shadow.get(addr::SGTHRS), Ok(0xFF));

        let mut shadow = ShadowFile::new(ChipVariant::Tmc2300);
        shadow.set(addr::TCOOLTHRS, 0xFFFF).unwrap();
        assert_eq!(shadow.get(addr::TCOOLTHRS), Ok(0x3FF));
    }

    #[test]
    fn test_field_update_is_isolated() {
        let mut shadow = ShadowFile::new(ChipVariant::Tmc2209);
        let before = shadow.get(addr::CHOPCONF).unwrap();
        shadow.set_field(FieldId::Mres, 4).unwrap();
        let after = shadow.get(addr::CHOPCONF).unwrap();
        let mres = shadow.field(FieldId::Mres).unwrap();
        assert_eq!(after & !mres.mask(), before & !mres.mask());
        assert_eq!(shadow.get_field(FieldId::Mres), Ok(4));
        assert_eq!(shadow.get_field(FieldId::Toff), Ok(3));
    }

    #[test]
    fn test_staged_combines_fields_of_one_register() {
        let shadow = ShadowFile::new(ChipVariant::Tmc2209);
        let (a, word) = shadow.staged(&[(FieldId::Irun, 20), (FieldId::Ihold, 10)]).unwrap();
        assert_eq!(a, addr::IHOLD_IRUN);
        assert_eq!(word, 0x0001_140A);
        // the shadow itself is untouched
        assert_eq!(shadow.get(addr::IHOLD_IRUN), Ok(0x0001_1F10));

        assert_eq!(
            shadow.staged(&[(FieldId::Irun, 20), (FieldId::Mres, 1)]),
            Err(TmcError::UnsupportedField)
        );
        assert_eq!(shadow.staged(&[]), Err(TmcError::UnsupportedField));
    }

    #[test]
    fn test_missing_field_is_reported() {
        let shadow = ShadowFile::new(ChipVariant::Tmc2300);
        assert_eq!(shadow.get_field(FieldId::Vsense), Err(TmcError::UnsupportedField));
    }
}
