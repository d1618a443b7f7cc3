//! Communication check for a bus without acknowledgements.
//!
//! A write on the single-wire UART is never confirmed by the chip. The only evidence it arrived
//! is IFCNT, the interface transmission counter, which the chip bumps after every valid write.

use embedded_hal::digital::OutputPin;
use generic::tmc_error::TmcError;

use crate::common::bus::RegisterBus;
use crate::tmc::field::FieldId;
use crate::tmc::register::addr;
use crate::tmc::transaction::Transaction;

/// IFCNT is an 8 bit counter; exactly one write must have been counted.
pub fn liveness_ok(before: u8, after: u8) -> bool {
    before.wrapping_add(1) == after
}

/// The chip must report the version of the variant it is driven as. Nothing is written.
pub fn identity<B: RegisterBus, CS: OutputPin>(tx: &mut Transaction<'_, B, CS>) -> Result<(), TmcError> {
    let expected = tx.shadow().variant().version();
    let actual = tx.read_field(FieldId::Version)? as u8;
    if actual != expected {
        error!("driver version {=u8:#x}, expected {=u8:#x}", actual, expected);
        return Err(TmcError::IdentityMismatch { expected, actual });
    }
    Ok(())
}

/// Counted dummy write to GSTAT. Any error here, a transport error included, means the chip did
/// not take part in the exchange.
pub fn liveness<B: RegisterBus, CS: OutputPin>(tx: &mut Transaction<'_, B, CS>) -> Result<(), TmcError> {
    let before = tx.read_field(FieldId::Ifcnt)? as u8;
    tx.write(addr::GSTAT, 0)?;
    let after = tx.read_field(FieldId::Ifcnt)? as u8;
    if !liveness_ok(before, after) {
        error!("write not counted, ifcnt {=u8} -> {=u8}", before, after);
        return Err(TmcError::CommsFailure { before, after });
    }
    trace!("ifcnt {=u8} -> {=u8}", before, after);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::bus::SharedBus;
    use crate::common::testing::{event_log, Event, FakeBus, FakePin};
    use crate::tmc::register::ShadowFile;
    use crate::tmc::variant::ChipVariant;

    fn check(bus: FakeBus, variant: ChipVariant) -> (Result<(), TmcError>, FakeBus) {
        let log = bus.log.clone();
        let bus = SharedBus::new(bus);
        let mut cs = FakePin::new(log);
        let mut shadow = ShadowFile::new(variant);
        let result = {
            let mut tx = Transaction::begin(&bus, &mut cs, &mut shadow, 0).unwrap();
            let result = identity(&mut tx).and_then(|_| liveness(&mut tx));
            result
        };
        (result, bus.into_inner())
    }

    #[test]
    fn test_liveness_wraps() {
        assert!(liveness_ok(255, 0));
        assert!(liveness_ok(10, 11));
        assert!(!liveness_ok(10, 10));
        assert!(!liveness_ok(10, 12));
    }

    #[test]
    fn test_healthy_chip_passes() {
        let mut bus = FakeBus::chip(event_log(), 0x21);
        bus.set(addr::IFCNT, 255);
        let (result, bus) = check(bus, ChipVariant::Tmc2209);
        assert_eq!(result, Ok(()));
        assert_eq!(bus.get(addr::IFCNT), 0);
    }

    #[test]
    fn test_lost_write_fails() {
        let mut bus = FakeBus::chip(event_log(), 0x40);
        bus.count_writes = false;
        bus.set(addr::IFCNT, 10);
        let (result, _) = check(bus, ChipVariant::Tmc2300);
        assert_eq!(result, Err(TmcError::CommsFailure { before: 10, after: 10 }));
    }

    #[test]
    fn test_unanswered_counter_read_fails_liveness() {
        let mut bus = FakeBus::chip(event_log(), 0x21);
        bus.fail_in(1);
        let (result, bus) = check(bus, ChipVariant::Tmc2209);
        assert_eq!(result, Err(TmcError::BusError));
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn test_identity_mismatch_skips_liveness() {
        let bus = FakeBus::chip(event_log(), 0x21);
        let (result, bus) = check(bus, ChipVariant::Tmc2300);
        assert_eq!(result, Err(TmcError::IdentityMismatch { expected: 0x40, actual: 0x21 }));
        assert!(bus.writes().is_empty());
        let reads = bus.log.borrow().iter().filter(|e| matches!(e, Event::Read(_))).count();
        assert_eq!(reads, 1);
    }
}
