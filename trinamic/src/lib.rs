//! Register-level driver for Trinamic single-wire UART stepper drivers (TMC2209, TMC2300).
//!
//! Semantic motor settings are turned into register words, kept in a per-driver shadow file and
//! sent over a bus shared by all drivers on the same wire. Since the UART has no write
//! acknowledgement, a self test based on the chip's transmission counter detects lost writes.

#![cfg_attr(not(test), no_std)]

#[macro_use]
pub mod common;
pub mod tmc;

pub use common::bus::{NoPin, RegisterBus, SharedBus};
pub use common::uart::TmcUart;
pub use generic::driver_config::DriverConfig;
pub use generic::driver_status::DriverState;
pub use generic::tmc_error::TmcError;
pub use generic::trinamic_mode::TrinamicMode;
pub use tmc::machine::{AxisSettings, FailureReporter, Machine, MotionContext, TelemetrySource};
pub use tmc::registry::DriverRegistry;
pub use tmc::tmc_driver::{StallReport, TmcDriver};
pub use tmc::variant::ChipVariant;
