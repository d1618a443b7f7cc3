//! TMC2300: battery-voltage UART stepper driver, stealthChop only.

use generic::tmc_error::TmcError;

use crate::tmc::field::FieldId;
use crate::tmc::register::{addr, ShadowFile};

pub mod reg;

/// `IOIN.version` of TMC2300 silicon.
pub const VERSION: u8 = 0x40;

/// The TMC2300 has no internal sense resistor.
pub const R_SENSE_DEFAULT: f32 = 0.11;

pub fn defaults(shadow: &mut ShadowFile) -> Result<(), TmcError> {
    shadow.set_field(FieldId::EnableDrv, 1)?;
    shadow.set_field(FieldId::Tbl, 0b01)?;
    shadow.set_field(FieldId::Mres, 0b0110)?;
    shadow.set_field(FieldId::Intpol, 1)?; // interpolate to 256 microsteps
    shadow.set_field(FieldId::Dedge, 0)?;
    shadow.set_field(FieldId::Diss2g, 0)?;
    shadow.set_field(FieldId::Diss2vs, 0)?;
    shadow.set(addr::PWMCONF, 0xC10D_0024)?;
    Ok(())
}
