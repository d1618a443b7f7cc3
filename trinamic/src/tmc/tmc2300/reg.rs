//! Declaration of the TMC2300 registers and their fields.
//!
//! The TMC2300 is the low-voltage sibling of the TMC2209. It has no sense-resistor range bit
//! (`vsense`), an 8-bit GCONF, a single `enable_drv` bit instead of the `toff` off-time field and a
//! 10-bit TCOOLTHRS.
//!
//! The datasheet leaves GCONF bits 0, 2 and 7 unnamed. The driver keeps its potentiometer
//! scaling, chopper selection and powerdown-disable controls there, in the same slots the TMC2209
//! uses for the first two.

use crate::tmc::field::{Field, FieldId};
use crate::tmc::register::{addr, register_map, Access, RegisterDef};

// Register Implementations
// --------------------------------------------------------

register_map! {
    // General Registers.
    RW  addr::GCONF,       GCONF 8 = 0,
    RWC addr::GSTAT,       GSTAT 3 = 0x0000_0001,
    R   addr::IFCNT,       IFCNT 8 = 0,
    W   addr::SLAVECONF,   SLAVECONF 12 = 0,
    R   addr::IOIN,        IOIN 32 = 0,

    // Velocity Dependent Control.
    W   addr::IHOLD_IRUN,  IHOLD_IRUN 20 = 0x0001_1F08,
    W   addr::TPOWERDOWN,  TPOWERDOWN 8 = 20,
    R   addr::TSTEP,       TSTEP 20 = 0x000F_FFFF,
    W   addr::TPWMTHRS,    TPWMTHRS 20 = 0,
    W   addr::TCOOLTHRS,   TCOOLTHRS 10 = 0,
    W   addr::VACTUAL,     VACTUAL 24 = 0,

    // StallGuard Control.
    W   addr::SGTHRS,      SGTHRS 8 = 0,
    R   addr::SG_RESULT,   SG_RESULT 10 = 0,
    W   addr::COOLCONF,    COOLCONF 16 = 0,

    // Chopper Control Registers.
    RW  addr::CHOPCONF,    CHOPCONF 32 = 0x1300_8001,
    R   addr::DRV_STATUS,  DRV_STATUS 32 = 0,
    RW  addr::PWMCONF,     PWMCONF 32 = 0xC10D_0024,
    R   addr::PWM_SCALE,   PWM_SCALE 32 = 0,
    R   addr::PWM_AUTO,    PWM_AUTO 32 = 0,
}

pub const FIELDS: &[(FieldId, Field)] = &[
    // GCONF
    (FieldId::IScaleAnalog, Field::bit(addr::GCONF, 0)),
    (FieldId::Extcap, Field::bit(addr::GCONF, 1)),
    (FieldId::EnSpreadCycle, Field::bit(addr::GCONF, 2)),
    (FieldId::Shaft, Field::bit(addr::GCONF, 3)),
    (FieldId::IndexOtpw, Field::bit(addr::GCONF, 4)), // diag_index
    (FieldId::IndexStep, Field::bit(addr::GCONF, 5)), // diag_step
    (FieldId::MultistepFilt, Field::bit(addr::GCONF, 6)),
    (FieldId::PdnDisable, Field::bit(addr::GCONF, 7)),
    // GSTAT
    (FieldId::GstatReset, Field::bit(addr::GSTAT, 0)),
    (FieldId::GstatDrvErr, Field::bit(addr::GSTAT, 1)),
    (FieldId::GstatUvCp, Field::bit(addr::GSTAT, 2)), // u3v5
    (FieldId::Ifcnt, Field::new(addr::IFCNT, 0, 8)),
    (FieldId::SendDelay, Field::new(addr::SLAVECONF, 8, 4)),
    (FieldId::Version, Field::new(addr::IOIN, 24, 8)),
    // IHOLD_IRUN
    (FieldId::Ihold, Field::new(addr::IHOLD_IRUN, 0, 5)),
    (FieldId::Irun, Field::new(addr::IHOLD_IRUN, 8, 5)),
    (FieldId::IholdDelay, Field::new(addr::IHOLD_IRUN, 16, 4)),
    (FieldId::TpowerDown, Field::new(addr::TPOWERDOWN, 0, 8)),
    (FieldId::Tstep, Field::new(addr::TSTEP, 0, 20)),
    (FieldId::TpwmThrs, Field::new(addr::TPWMTHRS, 0, 20)),
    (FieldId::TcoolThrs, Field::new(addr::TCOOLTHRS, 0, 10)),
    (FieldId::Vactual, Field::signed(addr::VACTUAL, 0, 24)),
    (FieldId::SgThrs, Field::new(addr::SGTHRS, 0, 8)),
    (FieldId::SgResult, Field::new(addr::SG_RESULT, 0, 10)),
    // COOLCONF
    (FieldId::Semin, Field::new(addr::COOLCONF, 0, 4)),
    (FieldId::Seup, Field::new(addr::COOLCONF, 5, 2)),
    (FieldId::Semax, Field::new(addr::COOLCONF, 8, 4)),
    (FieldId::Sedn, Field::new(addr::COOLCONF, 13, 2)),
    (FieldId::Seimin, Field::bit(addr::COOLCONF, 15)),
    // CHOPCONF
    (FieldId::EnableDrv, Field::bit(addr::CHOPCONF, 0)),
    (FieldId::Tbl, Field::new(addr::CHOPCONF, 15, 2)),
    (FieldId::Mres, Field::new(addr::CHOPCONF, 24, 4)),
    (FieldId::Intpol, Field::bit(addr::CHOPCONF, 28)),
    (FieldId::Dedge, Field::bit(addr::CHOPCONF, 29)),
    (FieldId::Diss2g, Field::bit(addr::CHOPCONF, 30)),
    (FieldId::Diss2vs, Field::bit(addr::CHOPCONF, 31)),
    // DRV_STATUS
    (FieldId::Otpw, Field::bit(addr::DRV_STATUS, 0)),
    (FieldId::Ot, Field::bit(addr::DRV_STATUS, 1)),
    (FieldId::S2ga, Field::bit(addr::DRV_STATUS, 2)),
    (FieldId::S2gb, Field::bit(addr::DRV_STATUS, 3)),
    (FieldId::S2vsa, Field::bit(addr::DRV_STATUS, 4)),
    (FieldId::S2vsb, Field::bit(addr::DRV_STATUS, 5)),
    (FieldId::Ola, Field::bit(addr::DRV_STATUS, 6)),
    (FieldId::Olb, Field::bit(addr::DRV_STATUS, 7)),
    (FieldId::T120, Field::bit(addr::DRV_STATUS, 8)),
    (FieldId::T150, Field::bit(addr::DRV_STATUS, 9)),
    (FieldId::CsActual, Field::new(addr::DRV_STATUS, 16, 5)),
    (FieldId::Stst, Field::bit(addr::DRV_STATUS, 31)),
    // PWMCONF
    (FieldId::PwmOfs, Field::new(addr::PWMCONF, 0, 8)),
    (FieldId::PwmGrad, Field::new(addr::PWMCONF, 8, 8)),
    (FieldId::PwmFreq, Field::new(addr::PWMCONF, 16, 2)),
    (FieldId::PwmAutoscale, Field::bit(addr::PWMCONF, 18)),
    (FieldId::PwmAutograd, Field::bit(addr::PWMCONF, 19)),
    (FieldId::Freewheel, Field::new(addr::PWMCONF, 20, 2)),
    (FieldId::PwmReg, Field::new(addr::PWMCONF, 24, 4)),
    (FieldId::PwmLim, Field::new(addr::PWMCONF, 28, 4)),
];

// Sanity Checks
// --------------------------------------------------------
