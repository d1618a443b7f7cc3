use generic::tmc_error::TmcError;
use heapless::LinearMap;

use crate::tmc::variant::ChipVariant;

/// Maximum number of driver kinds a registry holds.
pub const MAX_DRIVER_KINDS: usize = 8;

/// Maps configuration names (`"tmc_2209"`, ...) to the chip variant they build.
///
/// Populated once at startup; nothing is registered implicitly.
#[derive(Debug, Default, Clone)]
pub struct DriverRegistry {
    kinds: LinearMap<&'static str, ChipVariant, MAX_DRIVER_KINDS>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every variant this crate supports, under its own name.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for variant in [ChipVariant::Tmc2209, ChipVariant::Tmc2300] {
            // two entries always fit
            let _ = registry.register(variant.name(), variant);
        }
        registry
    }

    /// Adds or replaces `name`.
    pub fn register(&mut self, name: &'static str, variant: ChipVariant) -> Result<(), TmcError> {
        self.kinds.insert(name, variant).map_err(|_| TmcError::RegistryFull)?;
        debug!("registered driver kind {=str}", name);
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<ChipVariant, TmcError> {
        self.kinds.get(name).copied().ok_or(TmcError::UnknownDriver)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }
}
