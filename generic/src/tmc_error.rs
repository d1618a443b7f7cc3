use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TmcError {
    // Driver lifecycle
    TransportUnavailable,
    NotInitialized,
    DriverFaulted,

    // Self test
    IdentityMismatch { expected: u8, actual: u8 },
    CommsFailure { before: u8, after: u8 },

    // Configuration
    InvalidMode,
    InvalidConfig,
    UnknownDriver,
    RegistryFull,

    // Register map
    UnknownRegister,
    RegisterNotReadable,
    RegisterNotWritable,
    UnsupportedField,

    // Bus
    BusBusy,
    BusError,
    GpioPinError,

    UartWriteError,
    UartFlushError,
    UartReadError,
    UartReadTimeout,
    UartInvalidData,
    UartCrcMismatch,
}
