#![cfg_attr(not(test), no_std)]

pub mod driver_config;
pub mod driver_status;
pub mod tmc_error;
pub mod trinamic_mode;
