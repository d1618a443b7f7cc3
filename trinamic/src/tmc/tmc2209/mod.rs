//! TMC2209: UART stepper driver with spreadCycle, stealthChop and StallGuard4.

use generic::tmc_error::TmcError;

use crate::tmc::field::FieldId;
use crate::tmc::register::{addr, ShadowFile};

pub mod reg;

/// `IOIN.version` of TMC2209 silicon.
pub const VERSION: u8 = 0x21;

/// Sense resistor fitted on most TMC2209 carrier boards.
pub const R_SENSE_DEFAULT: f32 = 0.11;

/// Startup register pattern, written to the shadow before the first `push`.
pub fn defaults(shadow: &mut ShadowFile) -> Result<(), TmcError> {
    shadow.set_field(FieldId::IScaleAnalog, 1)?;
    shadow.set_field(FieldId::InternalRsense, 0)?;
    shadow.set_field(FieldId::EnSpreadCycle, 0)?;
    shadow.set_field(FieldId::MultistepFilt, 1)?;
    shadow.set_field(FieldId::IholdDelay, 1)?;
    shadow.set_field(FieldId::TpowerDown, 20)?;
    shadow.set(addr::CHOPCONF, 0x1000_0053)?;
    shadow.set(addr::PWMCONF, 0xC10D_0024)?;
    Ok(())
}
