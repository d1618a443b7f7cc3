#[macro_use]
mod fmt;

pub mod bus;
#[cfg(test)]
pub mod testing;
pub mod uart;
