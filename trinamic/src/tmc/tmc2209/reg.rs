//! Declaration of the TMC2209 registers and their fields.
//!
//! Please refer to the TMC2209 datasheet for information on what each of these registers and their
//! fields mean. The register map is described under section 5 of the datasheet.
//!
//! https://www.trinamic.com/fileadmin/assets/Products/ICs_Documents/TMC2209_Datasheet_V103.pdf
//!
//! GCONF bit 6 (`pdn_disable`) is deliberately left out of the field table: the driver never
//! drives it on this chip, so it is carried through read-modify-write untouched.

use crate::tmc::field::{Field, FieldId};
use crate::tmc::register::{addr, register_map, Access, RegisterDef};

// Register Implementations
// --------------------------------------------------------

register_map! {
    // General Registers.
    RW  addr::GCONF,       GCONF 10 = 0x0000_0101,
    RWC addr::GSTAT,       GSTAT 3 = 0x0000_0001,
    R   addr::IFCNT,       IFCNT 8 = 0,
    W   addr::SLAVECONF,   SLAVECONF 12 = 0,
    R   addr::IOIN,        IOIN 32 = 0,

    // Velocity Dependent Control.
    W   addr::IHOLD_IRUN,  IHOLD_IRUN 20 = 0x0001_1F10,
    W   addr::TPOWERDOWN,  TPOWERDOWN 8 = 20,
    R   addr::TSTEP,       TSTEP 20 = 0x000F_FFFF,
    W   addr::TPWMTHRS,    TPWMTHRS 20 = 0,
    W   addr::TCOOLTHRS,   TCOOLTHRS 20 = 0,
    W   addr::VACTUAL,     VACTUAL 24 = 0,

    // StallGuard Control.
    W   addr::SGTHRS,      SGTHRS 8 = 0,
    R   addr::SG_RESULT,   SG_RESULT 10 = 0,
    W   addr::COOLCONF,    COOLCONF 16 = 0,

    // Sequencer Registers.
    R   addr::MSCNT,       MSCNT 10 = 0,

    // Chopper Control Registers.
    RW  addr::CHOPCONF,    CHOPCONF 32 = 0x1000_0053,
    R   addr::DRV_STATUS,  DRV_STATUS 32 = 0,
    RW  addr::PWMCONF,     PWMCONF 32 = 0xC10D_0024,
    R   addr::PWM_SCALE,   PWM_SCALE 32 = 0,
    R   addr::PWM_AUTO,    PWM_AUTO 32 = 0,
}

pub const FIELDS: &[(FieldId, Field)] = &[
    // GCONF
    (FieldId::IScaleAnalog, Field::bit(addr::GCONF, 0)),
    (FieldId::InternalRsense, Field::bit(addr::GCONF, 1)),
    (FieldId::EnSpreadCycle, Field::bit(addr::GCONF, 2)),
    (FieldId::Shaft, Field::bit(addr::GCONF, 3)),
    (FieldId::IndexOtpw, Field::bit(addr::GCONF, 4)),
    (FieldId::IndexStep, Field::bit(addr::GCONF, 5)),
    (FieldId::MstepRegSelect, Field::bit(addr::GCONF, 7)),
    (FieldId::MultistepFilt, Field::bit(addr::GCONF, 8)),
    (FieldId::TestMode, Field::bit(addr::GCONF, 9)),
    // GSTAT
    (FieldId::GstatReset, Field::bit(addr::GSTAT, 0)),
    (FieldId::GstatDrvErr, Field::bit(addr::GSTAT, 1)),
    (FieldId::GstatUvCp, Field::bit(addr::GSTAT, 2)),
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
    (FieldId::TcoolThrs, Field::new(addr::TCOOLTHRS, 0, 20)),
    (FieldId::Vactual, Field::signed(addr::VACTUAL, 0, 24)),
    (FieldId::SgThrs, Field::new(addr::SGTHRS, 0, 8)),
    (FieldId::SgResult, Field::new(addr::SG_RESULT, 0, 10)),
    // COOLCONF
    (FieldId::Semin, Field::new(addr::COOLCONF, 0, 4)),
    (FieldId::Seup, Field::new(addr::COOLCONF, 5, 2)),
    (FieldId::Semax, Field::new(addr::COOLCONF, 8, 4)),
    (FieldId::Sedn, Field::new(addr::COOLCONF, 13, 2)),
    (FieldId::Seimin, Field::bit(addr::COOLCONF, 15)),
    (FieldId::Mscnt, Field::new(addr::MSCNT, 0, 10)),
    // CHOPCONF
    (FieldId::Toff, Field::new(addr::CHOPCONF, 0, 4)),
    (FieldId::Hstrt, Field::new(addr::CHOPCONF, 4, 3)),
    (FieldId::Hend, Field::new(addr::CHOPCONF, 7, 4)),
    (FieldId::Tbl, Field::new(addr::CHOPCONF, 15, 2)),
    (FieldId::Vsense, Field::bit(addr::CHOPCONF, 17)),
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
    (FieldId::T150, Field::bit(addr::DRV_STATUS, 10)),
    (FieldId::CsActual, Field::new(addr::DRV_STATUS, 16, 5)),
    (FieldId::Stealth, Field::bit(addr::DRV_STATUS, 30)),
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

#[cfg(test)]
#[allow(non_camel_case_types)]
mod tests {
    use super::*;
    use bitfield::bitfield;

    bitfield! {
        #[derive(Clone, Copy, Eq, PartialEq)]
        pub struct IHOLD_IRUN(u32);
        impl Debug;
        u8;
        pub ihold, set_ihold: 4, 0;
        pub irun, set_irun: 12, 8;
        pub ihold_delay, set_ihold_delay: 19, 16;
    }

    bitfield! {
        #[derive(Clone, Copy, Eq, PartialEq)]
        pub struct CHOPCONF(u32);
        impl Debug;
        u32;
        pub toff, set_toff: 3, 0;
        pub hstrt, set_hstrt: 6, 4;
        pub hend, set_hend: 10, 7;
        pub tbl, set_tbl: 16, 15;
        pub vsense, set_vsense: 17;
        pub mres, set_mres: 27, 24;
        pub intpol, set_intpol: 28;
    }

    fn field(id: FieldId) -> Field {
        FIELDS.iter().find(|(f, _)| *f == id).map(|(_, f)| *f).unwrap()
    }

    #[test]
    fn test_fields_do_not_overlap() {
        for (i, (_, a)) in FIELDS.iter().enumerate() {
            for (_, b) in FIELDS.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_fields_fit_their_register() {
        for (id, f) in FIELDS {
            let def = REGISTERS.iter().find(|d| d.addr == f.addr).unwrap();
            assert_eq!(f.mask() & !def.mask(), 0, "{:?} exceeds {}", id, def.name);
        }
    }

    #[test]
    fn test_ihold_irun_matches_datasheet_layout() {
        let mut r = IHOLD_IRUN(0);
        r.set_ihold(25);
        r.set_irun(31);
        r.set_ihold_delay(7);

        let mut word = 0;
        word = field(FieldId::Ihold).pack(word, 25);
        word = field(FieldId::Irun).pack(word, 31);
        word = field(FieldId::IholdDelay).pack(word, 7);
        assert_eq!(word, r.0);
    }

    #[test]
    fn test_chopconf_reset_decodes() {
        let r = CHOPCONF(0x1000_0053);
        let word = 0x1000_0053;
        assert_eq!(field(FieldId::Toff).unpack(word), r.toff());
        assert_eq!(field(FieldId::Hstrt).unpack(word), r.hstrt());
        assert_eq!(field(FieldId::Hend).unpack(word), r.hend());
        assert_eq!(field(FieldId::Tbl).unpack(word), r.tbl());
        assert_eq!(field(FieldId::Mres).unpack(word), r.mres());
        assert_eq!(field(FieldId::Intpol).unpack_bool(word), r.intpol());
        assert!(!field(FieldId::Vsense).unpack_bool(word));
    }

    #[test]
    fn test_gconf_has_no_pdn_disable() {
        assert!(FIELDS.iter().all(|(id, _)| *id != FieldId::PdnDisable));
    }
}
