use embedded_hal::digital::OutputPin;
use generic::driver_config::DriverConfig;
use generic::driver_status::DriverState;
use generic::tmc_error::TmcError;
use generic::trinamic_mode::TrinamicMode;
use serde::{Deserialize, Serialize};

use crate::common::bus::{RegisterBus, SharedBus};
use crate::tmc::configurator::{self, ModeSettings};
use crate::tmc::field::FieldId;
use crate::tmc::machine::Machine;
use crate::tmc::register::{addr, ShadowFile};
use crate::tmc::registry::DriverRegistry;
use crate::tmc::self_test;
use crate::tmc::transaction::Transaction;
use crate::tmc::variant::ChipVariant;

/// TSTEP reads this when the motor is standing still.
const TSTEP_IDLE: u32 = 0x000F_FFFF;

/// One StallGuard sample taken while the axis moves.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StallReport {
    pub sg_result: u16,
    /// Commanded feed rate in mm/min when the sample was taken.
    pub feed_rate: f32,
    pub threshold: u8,
    pub tstep: u32,
}

/// A Trinamic UART stepper driver on a shared bus.
///
/// `CS` frames every bus transaction of this driver; `EN` is the optional active-low enable
/// line. The driver owns its shadow register file and only touches the chip through
/// [`Transaction`]s.
pub struct TmcDriver<'a, B, CS, EN, M>
where
    B: RegisterBus,
    CS: OutputPin,
    EN: OutputPin,
    M: Machine + ?Sized,
{
    bus: &'a SharedBus<B>,
    select: CS,
    enable_pin: Option<EN>,
    machine: &'a M,

    config: DriverConfig,
    variant: ChipVariant,
    shadow: ShadowFile,
    state: DriverState,
    /// State `clear_error` returns to.
    resume: DriverState,
    disabled: Option<bool>,
}

impl<'a, B, CS, EN, M> TmcDriver<'a, B, CS, EN, M>
where
    B: RegisterBus,
    CS: OutputPin,
    EN: OutputPin,
    M: Machine + ?Sized,
{
    pub fn new(
        variant: ChipVariant,
        mut config: DriverConfig,
        bus: &'a SharedBus<B>,
        select: CS,
        enable_pin: Option<EN>,
        machine: &'a M,
    ) -> Result<Self, TmcError> {
        config.validate()?;
        if config.r_sense_ohms == 0.0 {
            config.r_sense_ohms = variant.r_sense_default();
        }
        Ok(TmcDriver {
            bus,
            select,
            enable_pin,
            machine,
            config,
            variant,
            shadow: ShadowFile::new(variant),
            state: DriverState::Uninitialized,
            resume: DriverState::Initialized,
            disabled: None,
        })
    }

    /// Builds the driver registered under `name`, e.g. `"tmc_2209"`.
    pub fn from_registry(
        registry: &DriverRegistry,
        name: &str,
        config: DriverConfig,
        bus: &'a SharedBus<B>,
        select: CS,
        enable_pin: Option<EN>,
        machine: &'a M,
    ) -> Result<Self, TmcError> {
        let variant = registry.lookup(name)?;
        Self::new(variant, config, bus, select, enable_pin, machine)
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn variant(&self) -> ChipVariant {
        self.variant
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn shadow(&self) -> &ShadowFile {
        &self.shadow
    }

    /// Checks that the transport came up. Nothing is sent to the chip yet.
    pub fn init(&mut self) -> Result<(), TmcError> {
        let available = self.bus.try_borrow().map_err(|_| TmcError::BusBusy)?.is_available();
        if !available {
            error!("{=str} axis {=u8}: transport not available", self.variant.name(), self.config.axis);
            return Err(TmcError::TransportUnavailable);
        }
        if self.state == DriverState::Uninitialized {
            self.state = DriverState::Initialized;
        }
        info!(
            "{=str} axis {=u8} motor {=u8} addr {=u8} r_sense {=f32}",
            self.variant.name(),
            self.config.axis,
            self.config.motor,
            self.config.addr,
            self.config.r_sense_ohms
        );
        Ok(())
    }

    /// Writes the startup register pattern, then verifies the chip took it.
    pub fn config_motor(&mut self) -> Result<(), TmcError> {
        if self.state == DriverState::Uninitialized {
            return Err(TmcError::NotInitialized);
        }
        let startup = self.startup();
        let result = startup.and_then(|_| self.self_test());
        match result {
            Ok(()) => {
                self.state = DriverState::Configured;
                info!("{=str} axis {=u8} configured", self.variant.name(), self.config.axis);
            }
            Err(e) => {
                self.latch_error();
                error!("{=str} axis {=u8} configuration failed: {}", self.variant.name(), self.config.axis, e);
            }
        }
        result
    }

    /// Pushes power-on values plus the chip's startup pattern. The shadow is only replaced once
    /// every register went out.
    fn startup(&mut self) -> Result<(), TmcError> {
        let mut staged = ShadowFile::new(self.variant);
        self.variant.defaults(&mut staged)?;
        Transaction::begin(self.bus, &mut self.select, &mut staged, self.config.addr)?.push()?;
        self.shadow = staged;
        Ok(())
    }

    /// Applies the run or homing mode settings.
    pub fn set_registers(&mut self, homing: bool) -> Result<(), TmcError> {
        self.ensure_ready("set_registers")?;

        let settings = self.mode_settings(homing);
        info!(
            "{=str} axis {=u8}: {=str} {=u16}mA",
            self.variant.name(),
            self.config.axis,
            settings.mode.name(),
            settings.run_milliamps
        );
        {
            let machine = self.machine;
            let mut tx = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)?;
            configurator::configure(&mut tx, &settings, machine)?;
        }
        configurator::dump_registers(&self.shadow);
        Ok(())
    }

    fn mode_settings(&self, homing: bool) -> ModeSettings {
        ModeSettings {
            mode: self.config.mode(homing),
            run_milliamps: configurator::milliamps(self.config.current_amps(homing)),
            hold_percent: self.config.hold_percent(),
            microsteps: self.config.microsteps,
            stall_threshold: self.config.stallguard,
            r_sense_ohms: self.config.r_sense_ohms,
            axis: self.config.axis,
        }
    }

    /// Samples StallGuard while the axis moves. `None` when it stands still.
    pub fn debug_message(&mut self) -> Result<Option<StallReport>, TmcError> {
        self.ensure_ready("debug_message")?;

        let machine = self.machine;
        let threshold = self.config.stallguard;
        let mut tx = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)?;
        let tstep = tx.read_field(FieldId::Tstep)?;
        if tstep == TSTEP_IDLE || tstep == 0 {
            trace!("tstep {=u32}, axis idle", tstep);
            return Ok(None);
        }
        let sg_result = tx.read_field(FieldId::SgResult)? as u16;
        let feed_rate = machine.realtime_feed_rate();
        info!(
            "axis {=u8} SG_Val: {=u16} Rate: {=f32} mm/min SG_Setting: {=u8}",
            self.config.axis,
            sg_result,
            feed_rate,
            threshold
        );
        Ok(Some(StallReport { sg_result, feed_rate, threshold, tstep }))
    }

    /// Periodic hook, only samples when StallGuard debugging is switched on for this motor.
    pub fn poll_stallguard(&mut self) -> Result<Option<StallReport>, TmcError> {
        if !self.config.stallguard_debug {
            return Ok(None);
        }
        self.debug_message()
    }

    /// Drives the enable line and, with `use_enable`, the chopper off-time.
    pub fn set_disable(&mut self, disable: bool) -> Result<(), TmcError> {
        if self.state == DriverState::Uninitialized {
            return Err(TmcError::NotInitialized);
        }
        if self.disabled == Some(disable) {
            return Ok(());
        }

        if let Some(pin) = self.enable_pin.as_mut() {
            if disable {
                pin.set_high().map_err(|_| TmcError::GpioPinError)?;
            } else {
                pin.set_low().map_err(|_| TmcError::GpioPinError)?;
            }
        }

        if self.config.use_enable {
            let toff = self.toff_for(disable) as u32;
            let mut tx = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)?;
            if self.variant.has(FieldId::Toff) {
                tx.write_field(FieldId::Toff, toff)?;
            } else {
                tx.write_field(FieldId::EnableDrv, (toff != 0) as u32)?;
            }
        }
        // a failed call above leaves the cache alone so the next one retries.
        self.disabled = Some(disable);
        debug!("axis {=u8} disable {=bool}", self.config.axis, disable);
        Ok(())
    }

    /// Off-time for the current enable state and run mode, 0 switches the bridges off.
    pub fn toff_value(&self) -> u8 {
        self.toff_for(self.disabled == Some(true))
    }

    fn toff_for(&self, disabled: bool) -> u8 {
        if disabled {
            return self.config.toff_disable;
        }
        match self.config.run_mode {
            TrinamicMode::StealthChop => self.config.toff_stealthchop,
            TrinamicMode::CoolStep | TrinamicMode::StallGuard => self.config.toff_coolstep,
        }
    }

    /// Identity and liveness check. A failure latches the driver in `Error`.
    pub fn test(&mut self) -> bool {
        if self.state == DriverState::Uninitialized {
            return false;
        }
        self.self_test().is_ok()
    }

    /// Any failure after the identity check passed counts as a communication failure and is
    /// reported, transport errors included.
    fn self_test(&mut self) -> Result<(), TmcError> {
        let mut identified = false;
        let result = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)
            .and_then(|mut tx| {
                self_test::identity(&mut tx)?;
                identified = true;
                self_test::liveness(&mut tx)
            });
        if let Err(e) = result {
            if identified {
                self.machine.report_comms_failure(self.config.axis, self.config.motor);
            }
            warn!("{=str} axis {=u8} self test failed: {}", self.variant.name(), self.config.axis, e);
            self.latch_error();
        }
        result
    }

    fn latch_error(&mut self) {
        if self.state != DriverState::Error {
            self.resume = self.state;
            self.state = DriverState::Error;
        }
    }

    /// Leaves the latched error state for the state the error interrupted. The chip is not
    /// touched.
    pub fn clear_error(&mut self) {
        if self.state == DriverState::Error {
            info!("axis {=u8} error cleared", self.config.axis);
            self.state = self.resume;
        }
    }

    /// Rewrites every configuration register from the shadow, e.g. after a driver power cycle.
    pub fn push(&mut self) -> Result<(), TmcError> {
        self.ensure_ready("push")?;
        let mut tx = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)?;
        tx.push()
    }

    /// Reads a register straight from the chip.
    pub fn read_register(&mut self, address: u8) -> Result<u32, TmcError> {
        self.ensure_ready("read_register")?;
        let mut tx = Transaction::begin(self.bus, &mut self.select, &mut self.shadow, self.config.addr)?;
        tx.read(address)
    }

    /// Reads DRV_STATUS and reports over-temperature and short flags.
    pub fn drv_status(&mut self) -> Result<u32, TmcError> {
        let word = self.read_register(addr::DRV_STATUS)?;
        let flag = |id| self.shadow.field(id).map(|f| f.unpack_bool(word)).unwrap_or(false);
        if flag(FieldId::Ot) || flag(FieldId::S2ga) || flag(FieldId::S2gb) {
            warn!("axis {=u8} driver fault, DRV_STATUS {=u32:#010x}", self.config.axis, word);
        } else if flag(FieldId::Otpw) {
            warn!("axis {=u8} over-temperature pre-warning", self.config.axis);
        }
        Ok(word)
    }

    fn ensure_ready(&self, op: &str) -> Result<(), TmcError> {
        match self.state {
            state if state.is_ready() => Ok(()),
            DriverState::Error => {
                error!("axis {=u8}: driver faulted, {=str} skipped", self.config.axis, op);
                Err(TmcError::DriverFaulted)
            }
            _ => Err(TmcError::NotInitialized),
        }
    }
}
