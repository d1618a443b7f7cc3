#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverState {
    Uninitialized, // transport missing or init() not called yet.
    Initialized,
    Configured,

    // latched by a failed self test, cleared by clear_error().
    Error,
}

impl DriverState {
    pub fn is_ready(&self) -> bool {
        matches!(self, DriverState::Initialized | DriverState::Configured)
    }
}
