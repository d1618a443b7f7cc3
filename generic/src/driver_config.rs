use serde::{Deserialize, Serialize};

use crate::tmc_error::TmcError;
use crate::trinamic_mode::TrinamicMode;

/// Per-motor driver settings as they come out of the machine configuration.
///
/// `r_sense_ohms == 0.0` means "use the chip family default".
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    pub axis: u8,
    pub motor: u8,
    pub addr: u8,
    pub r_sense_ohms: f32,

    pub run_amps: f32,
    pub hold_amps: f32,
    pub homing_amps: f32,
    pub microsteps: u16,

    pub run_mode: TrinamicMode,
    pub homing_mode: TrinamicMode,
    pub stallguard: u8,
    pub stallguard_debug: bool,

    pub toff_disable: u8,
    pub toff_stealthchop: u8,
    pub toff_coolstep: u8,
    pub use_enable: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            axis: 0,
            motor: 0,
            addr: 0,
            r_sense_ohms: 0.0,
            run_amps: 0.25,
            hold_amps: 0.25,
            homing_amps: 0.5,
            microsteps: 16,
            run_mode: TrinamicMode::StealthChop,
            homing_mode: TrinamicMode::StealthChop,
            stallguard: 0,
            stallguard_debug: false,
            toff_disable: 0,
            toff_stealthchop: 5,
            toff_coolstep: 3,
            use_enable: false,
        }
    }
}

impl DriverConfig {
    pub const MAX_ADDR: u8 = 3;
    pub const HOMING_AMPS_RANGE: (f32, f32) = (0.5, 10.0);
    pub const TOFF_COOLSTEP_RANGE: (u8, u8) = (2, 15);

    pub fn validate(&self) -> Result<(), TmcError> {
        if self.addr > Self::MAX_ADDR {
            return Err(TmcError::InvalidConfig);
        }
        if self.r_sense_ohms < 0.0 || self.run_amps < 0.0 || self.hold_amps < 0.0 {
            return Err(TmcError::InvalidConfig);
        }
        let (lo, hi) = Self::HOMING_AMPS_RANGE;
        if !(lo..=hi).contains(&self.homing_amps) {
            return Err(TmcError::InvalidConfig);
        }
        if self.microsteps == 0 || self.microsteps > 256 || !self.microsteps.is_power_of_two() {
            return Err(TmcError::InvalidConfig);
        }
        let (lo, hi) = Self::TOFF_COOLSTEP_RANGE;
        if !(lo..=hi).contains(&self.toff_coolstep) {
            return Err(TmcError::InvalidConfig);
        }
        if self.toff_stealthchop > 15 || self.toff_disable > 15 {
            return Err(TmcError::InvalidConfig);
        }
        Ok(())
    }

    /// Mode used for a move, homing moves have their own selection.
    pub fn mode(&self, homing: bool) -> TrinamicMode {
        if homing {
            self.homing_mode
        } else {
            self.run_mode
        }
    }

    pub fn current_amps(&self, homing: bool) -> f32 {
        if homing {
            self.homing_amps
        } else {
            self.run_amps
        }
    }

    /// Hold current as a fraction of the run current, capped at 1.0.
    pub fn hold_percent(&self) -> f32 {
        if self.run_amps == 0.0 {
            return 0.0;
        }
        let percent = self.hold_amps / self.run_amps;
        if percent > 1.0 {
            1.0
        } else {
            percent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(DriverConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut c = DriverConfig::default();
        c.microsteps = 12;
        assert_eq!(c.validate(), Err(TmcError::InvalidConfig));

        let mut c = DriverConfig::default();
        c.homing_amps = 12.0;
        assert_eq!(c.validate(), Err(TmcError::InvalidConfig));

        let mut c = DriverConfig::default();
        c.toff_coolstep = 1;
        assert_eq!(c.validate(), Err(TmcError::InvalidConfig));

        let mut c = DriverConfig::default();
        c.addr = 4;
        assert_eq!(c.validate(), Err(TmcError::InvalidConfig));
    }

    #[test]
    fn test_hold_percent() {
        let mut c = DriverConfig::default();
        c.run_amps = 1.0;
        c.hold_amps = 0.5;
        assert_eq!(c.hold_percent(), 0.5);
        c.hold_amps = 2.0;
        assert_eq!(c.hold_percent(), 1.0);
        c.run_amps = 0.0;
        assert_eq!(c.hold_percent(), 0.0);
    }

    #[test]
    fn test_mode_selection() {
        let mut c = DriverConfig::default();
        c.run_mode = TrinamicMode::CoolStep;
        c.homing_mode = TrinamicMode::StallGuard;
        assert_eq!(c.mode(false), TrinamicMode::CoolStep);
        assert_eq!(c.mode(true), TrinamicMode::StallGuard);
    }
}
