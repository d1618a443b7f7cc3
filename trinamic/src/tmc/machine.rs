//! What a driver needs to know about the machine it is mounted in.

/// Driver clock of the TMC22xx/TMC2300 family when running from the internal oscillator.
pub const FCLK_HZ: f32 = 12_700_000.0;

/// Axis motion parameters that feed into the velocity-dependent thresholds.
pub trait MotionContext {
    /// Homing feed rate of `axis` in mm/min, `None` when the axis is not homed.
    fn homing_feed_rate(&self, axis: u8) -> Option<f32>;

    /// Converts a feed rate in mm/min into the chip's TSTEP units, scaled by `percent`.
    fn feed_rate_to_tstep(&self, axis: u8, feed_rate: f32, percent: f32) -> u32;
}

pub trait TelemetrySource {
    /// Current commanded feed rate in mm/min.
    fn realtime_feed_rate(&self) -> f32;
}

pub trait FailureReporter {
    fn report_comms_failure(&self, axis: u8, motor: u8);
}

/// Everything a driver consumes from its surroundings.
pub trait Machine: MotionContext + TelemetrySource + FailureReporter {}

impl<T: MotionContext + TelemetrySource + FailureReporter> Machine for T {}

/// Motion settings of one axis.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AxisSettings {
    pub steps_per_mm: f32,
    pub microsteps: u16,
    /// Homing feed rate in mm/min, `None` for axes without homing.
    pub homing_feed_rate: Option<f32>,
}

impl AxisSettings {
    /// `FCLK / (µsteps per second at full 256 resolution) * percent / 100`.
    ///
    /// Non-positive inputs give 0, which the chip treats as "threshold disabled".
    pub fn tstep(&self, feed_rate: f32, percent: f32) -> u32 {
        if feed_rate <= 0.0 || self.steps_per_mm <= 0.0 || self.microsteps == 0 {
            return 0;
        }
        let usteps_per_sec = feed_rate / 60.0 * self.steps_per_mm * (256.0 / self.microsteps as f32);
        let tstep = FCLK_HZ / usteps_per_sec * percent / 100.0;
        if tstep <= 0.0 {
            0
        } else {
            tstep as u32
        }
    }
}

/// Per-axis settings table, indexed by axis number.
impl<const N: usize> MotionContext for [AxisSettings; N] {
    fn homing_feed_rate(&self, axis: u8) -> Option<f32> {
        self.get(axis as usize).and_then(|a| a.homing_feed_rate)
    }

    fn feed_rate_to_tstep(&self, axis: u8, feed_rate: f32, percent: f32) -> u32 {
        self.get(axis as usize).map_or(0, |a| a.tstep(feed_rate, percent))
    }
}
