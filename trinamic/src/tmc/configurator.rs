//! Turns an operating mode and motor parameters into register writes.
//!
//! The sequence is the same for every chip variant; fields a variant lacks are skipped based on
//! its field table, so the only per-chip branch left is how StallGuard treats the chopper
//! selection.

use embedded_hal::digital::OutputPin;
use generic::tmc_error::TmcError;
use generic::trinamic_mode::TrinamicMode;
use micromath::F32Ext;

use crate::common::bus::RegisterBus;
use crate::tmc::field::FieldId;
use crate::tmc::machine::MotionContext;
use crate::tmc::register::{addr, ShadowFile};
use crate::tmc::transaction::Transaction;

/// TCOOLTHRS is set to this percentage of the homing speed's TSTEP, so StallGuard stays active a
/// little below the homing speed.
pub const STALLGUARD_TSTEP_PERCENT: f32 = 150.0;

/// Feed rate (mm/min) assumed for axes without a homing configuration.
pub const FALLBACK_HOMING_FEED_RATE: f32 = 200.0;

const MAX_CS: u8 = 31;
const VSENSE_HIGH_VOLTS: f32 = 0.325;
const VSENSE_LOW_VOLTS: f32 = 0.180;

/// Everything one `configure` pass needs.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModeSettings {
    pub mode: TrinamicMode,
    pub run_milliamps: u16,
    /// Hold current as a fraction of the run current, 0.0 to 1.0.
    pub hold_percent: f32,
    pub microsteps: u16,
    pub stall_threshold: u8,
    pub r_sense_ohms: f32,
    pub axis: u8,
}

/// Register value for "full step" is 0, not 1.
pub fn normalize_microsteps(microsteps: u16) -> u16 {
    if microsteps == 1 {
        0
    } else {
        microsteps
    }
}

/// MRES encoding: 256 -> 0, 128 -> 1 ... 2 -> 7, full step -> 8.
///
/// Values that are not a power of two round down to the next lower resolution.
pub fn mres_for(microsteps: u16) -> u8 {
    match microsteps {
        0 | 1 => 8,
        n if n >= 256 => 0,
        n => {
            let log2 = 15 - n.leading_zeros() as u8;
            8 - log2
        }
    }
}

/// Current scale for the run current.
///
/// Returns `(cs, vsense)`. With a `vsense` capable chip, small currents switch to the low sense
/// voltage range to keep resolution.
pub fn current_scale(milliamps: u16, r_sense_ohms: f32, has_vsense: bool) -> (u8, bool) {
    let scale = |volts: f32| {
        let cs = 32.0 * core::f32::consts::SQRT_2 * milliamps as f32 / 1000.0 * (r_sense_ohms + 0.02)
            / volts
            - 1.0;
        // saturating cast, negative results clamp to 0
        cs as u8
    };

    let mut cs = scale(VSENSE_HIGH_VOLTS);
    let mut vsense = false;
    if cs < 16 && has_vsense {
        vsense = true;
        cs = scale(VSENSE_LOW_VOLTS);
    }
    (cs.min(MAX_CS), vsense)
}

/// Rounds a current in amps to whole milliamps.
pub fn milliamps(amps: f32) -> u16 {
    let ma = (amps * 1000.0).round();
    if ma <= 0.0 {
        0
    } else if ma >= u16::MAX as f32 {
        u16::MAX
    } else {
        ma as u16
    }
}

/// Writes the full register set for `settings` inside an open transaction.
pub fn configure<B, CS, M>(
    tx: &mut Transaction<'_, B, CS>,
    settings: &ModeSettings,
    motion: &M,
) -> Result<(), TmcError>
where
    B: RegisterBus,
    CS: OutputPin,
    M: MotionContext + ?Sized,
{
    let variant = tx.shadow().variant();

    tx.write_field(FieldId::IScaleAnalog, 0)?;

    let (cs, vsense) =
        current_scale(settings.run_milliamps, settings.r_sense_ohms, variant.has(FieldId::Vsense));
    if variant.has(FieldId::Vsense) {
        tx.write_field(FieldId::Vsense, vsense as u32)?;
    }
    let ihold = (cs as f32 * settings.hold_percent.clamp(0.0, 1.0)) as u32;
    tx.write_fields(&[(FieldId::Irun, cs as u32), (FieldId::Ihold, ihold)])?;
    debug!("irun {=u8} ihold {=u32} vsense {=bool}", cs, ihold, vsense);

    let microsteps = normalize_microsteps(settings.microsteps);
    tx.write_field(FieldId::Mres, mres_for(microsteps) as u32)?;

    if variant.has(FieldId::PdnDisable) {
        tx.write_field(FieldId::PdnDisable, 1)?;
    }

    match settings.mode {
        TrinamicMode::StealthChop => {
            tx.write_field(FieldId::EnSpreadCycle, 0)?;
            tx.write_field(FieldId::PwmAutoscale, 1)?;
        }
        TrinamicMode::CoolStep => {
            tx.write_field(FieldId::EnSpreadCycle, 1)?;
            tx.write_field(FieldId::PwmAutoscale, 0)?;
        }
        TrinamicMode::StallGuard => {
            let feed_rate = motion
                .homing_feed_rate(settings.axis)
                .unwrap_or(FALLBACK_HOMING_FEED_RATE);
            let tcoolthrs =
                motion.feed_rate_to_tstep(settings.axis, feed_rate, STALLGUARD_TSTEP_PERCENT);
            info!("stallguard homing feed {=f32} tcoolthrs {=u32}", feed_rate, tcoolthrs);

            if variant.stallguard_clears_spreadcycle() {
                tx.write_field(FieldId::EnSpreadCycle, 0)?;
            }
            tx.write_field(FieldId::PwmAutoscale, 1)?;
            tx.write_field(FieldId::TcoolThrs, tcoolthrs)?;
            tx.write_field(FieldId::SgThrs, settings.stall_threshold as u32)?;
        }
    }
    Ok(())
}

/// Registers logged after every configuration pass.
pub const DUMP_REGISTERS: [u8; 7] = [
    addr::CHOPCONF,
    addr::COOLCONF,
    addr::TPWMTHRS,
    addr::TCOOLTHRS,
    addr::GCONF,
    addr::PWMCONF,
    addr::IHOLD_IRUN,
];

pub fn dump_registers(shadow: &ShadowFile) {
    for a in DUMP_REGISTERS {
        if let Ok(def) = shadow.def(a) {
            let word = shadow.get(a).unwrap_or_default();
            debug!("{=str}: {=u32:#010x}", def.name, word);
        }
    }
}
