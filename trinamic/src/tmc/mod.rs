pub mod configurator;
pub mod field;
pub mod machine;
pub mod register;
pub mod registry;
pub mod self_test;
pub mod tmc2209;
pub mod tmc2300;
pub mod tmc_driver;
pub mod transaction;
pub mod variant;
