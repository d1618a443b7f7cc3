use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tmc_error::TmcError;

/// Chopper/stall configuration a driver is put into for a run or a homing move.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrinamicMode {
    /// Quiet voltage chopper, automatic PWM scaling.
    #[default]
    StealthChop = 1,
    /// spreadCycle chopper with load feedback.
    CoolStep = 2,
    /// stealthChop plus stall detection, used for sensorless homing.
    StallGuard = 3,
}

impl TrinamicMode {
    pub const ALL: [TrinamicMode; 3] =
        [TrinamicMode::StealthChop, TrinamicMode::CoolStep, TrinamicMode::StallGuard];

    pub fn name(&self) -> &'static str {
        match self {
            TrinamicMode::StealthChop => "StealthChop",
            TrinamicMode::CoolStep => "CoolStep",
            TrinamicMode::StallGuard => "StallGuard",
        }
    }
}

impl TryFrom<u8> for TrinamicMode {
    type Error = TmcError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TrinamicMode::StealthChop),
            2 => Ok(TrinamicMode::CoolStep),
            3 => Ok(TrinamicMode::StallGuard),
            _ => Err(TmcError::InvalidMode),
        }
    }
}

impl FromStr for TrinamicMode {
    type Err = TmcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TrinamicMode::ALL
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or(TmcError::InvalidMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_raw() {
        assert_eq!(TrinamicMode::try_from(1), Ok(TrinamicMode::StealthChop));
        assert_eq!(TrinamicMode::try_from(3), Ok(TrinamicMode::StallGuard));
        assert_eq!(TrinamicMode::try_from(0), Err(TmcError::InvalidMode));
        assert_eq!(TrinamicMode::try_from(4), Err(TmcError::InvalidMode));
    }

    #[test]
    fn test_mode_from_name() {
        assert_eq!("CoolStep".parse::<TrinamicMode>(), Ok(TrinamicMode::CoolStep));
        assert_eq!("stallguard".parse::<TrinamicMode>(), Ok(TrinamicMode::StallGuard));
        assert_eq!("SpreadCycle".parse::<TrinamicMode>(), Err(TmcError::InvalidMode));
    }

    #[test]
    fn test_default_mode() {
        assert_eq!(TrinamicMode::default(), TrinamicMode::StealthChop);
        assert_eq!(TrinamicMode::default() as u8, 1);
    }
}
