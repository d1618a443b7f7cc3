//! Host-side stand-ins for the hardware and the machine a driver talks to.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use embedded_hal::digital::{ErrorType, OutputPin};
use generic::tmc_error::TmcError;
use heapless::{LinearMap, Vec};

use crate::common::bus::RegisterBus;
use crate::tmc::machine::{FailureReporter, MotionContext, TelemetrySource};
use crate::tmc::register::addr;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Select(bool),
    Read(u8),
    Write(u8, u32),
}

/// Ordered record of everything that happened on the wire and on the select pins.
pub type EventLog = Rc<RefCell<Vec<Event, 256>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

fn record(log: &EventLog, event: Event) {
    log.borrow_mut().push(event).expect("event log full");
}

/// A chip on the other end of the bus.
///
/// Reads answer from the register map (unset registers read as zero); writes land in the map.
/// With `count_writes` the chip bumps IFCNT on every accepted write like real silicon.
pub struct FakeBus {
    pub regs: LinearMap<u8, u32, 32>,
    pub log: EventLog,
    pub available: bool,
    pub count_writes: bool,
    /// Number of bus operations that succeed before every further one fails.
    pub fail_after: Option<usize>,
    ops: usize,
}

impl FakeBus {
    pub fn new(log: EventLog) -> Self {
        FakeBus {
            regs: LinearMap::new(),
            log,
            available: true,
            count_writes: true,
            fail_after: None,
            ops: 0,
        }
    }

    /// A responsive chip reporting `version` in IOIN.
    pub fn chip(log: EventLog, version: u8) -> Self {
        let mut bus = FakeBus::new(log);
        bus.set(addr::IOIN, (version as u32) << 24);
        bus
    }

    pub fn set(&mut self, addr: u8, word: u32) {
        self.regs.insert(addr, word).ok();
    }

    pub fn get(&self, addr: u8) -> u32 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    pub fn writes(&self) -> Vec<(u8, u32), 64> {
        self.log
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Write(a, w) => Some((*a, *w)),
                _ => None,
            })
            .collect()
    }

    /// Lets `n` more bus operations through, then fails every further one.
    pub fn fail_in(&mut self, n: usize) {
        self.fail_after = Some(self.ops + n);
    }

    fn step(&mut self) -> Result<(), TmcError> {
        if let Some(limit) = self.fail_after {
            if self.ops >= limit {
                return Err(TmcError::BusError);
            }
        }
        self.ops += 1;
        Ok(())
    }
}

impl RegisterBus for FakeBus {
    fn read_register(&mut self, _node: u8, addr: u8) -> Result<u32, TmcError> {
        self.step()?;
        record(&self.log, Event::Read(addr));
        Ok(self.get(addr))
    }

    fn write_register(&mut self, _node: u8, addr: u8, data: u32) -> Result<(), TmcError> {
        self.step()?;
        record(&self.log, Event::Write(addr, data));
        self.set(addr, data);
        if self.count_writes {
            let ifcnt = self.get(addr::IFCNT);
            self.set(addr::IFCNT, (ifcnt + 1) & 0xFF);
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.available
    }
}

/// Select or enable line that logs its level changes.
pub struct FakePin {
    pub log: EventLog,
    pub high: bool,
}

impl FakePin {
    pub fn new(log: EventLog) -> Self {
        FakePin { log, high: false }
    }
}

impl ErrorType for FakePin {
    type Error = Infallible;
}

impl OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.high = false;
        record(&self.log, Event::Select(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.high = true;
        record(&self.log, Event::Select(true));
        Ok(())
    }
}

/// Machine context with a fixed homing feed rate and a counter for failure reports.
#[derive(Default)]
pub struct FakeMachine {
    pub homing_feed: Option<f32>,
    pub feed_rate: f32,
    pub last_tstep_request: Cell<Option<(f32, f32)>>,
    pub failures: Cell<u32>,
}

impl MotionContext for FakeMachine {
    fn homing_feed_rate(&self, _axis: u8) -> Option<f32> {
        self.homing_feed
    }

    fn feed_rate_to_tstep(&self, _axis: u8, feed_rate: f32, percent: f32) -> u32 {
        self.last_tstep_request.set(Some((feed_rate, percent)));
        (feed_rate * percent) as u32
    }
}

impl TelemetrySource for FakeMachine {
    fn realtime_feed_rate(&self) -> f32 {
        self.feed_rate
    }
}

impl FailureReporter for FakeMachine {
    fn report_comms_failure(&self, _axis: u8, _motor: u8) {
        self.failures.set(self.failures.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "event log full")]
    fn test_full_event_log_panics() {
        let log = event_log();
        let mut pin = FakePin::new(log);
        for _ in 0..=256 {
            pin.set_high().unwrap();
        }
    }

    #[test]
    fn test_fail_in_counts_from_now() {
        let mut bus = FakeBus::chip(event_log(), 0x21);
        bus.read_register(0, addr::IOIN).unwrap();
        bus.fail_in(1);
        assert!(bus.read_register(0, addr::IOIN).is_ok());
        assert_eq!(bus.read_register(0, addr::IOIN), Err(TmcError::BusError));
    }
}
