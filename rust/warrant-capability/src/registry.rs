use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::{Capability, CapabilitySet, WarrantCapabilityError};

static REGISTRY: OnceLock<CapabilityRegistry> = OnceLock::new();

/// The mapping from capability bits to display names.
///
/// One registry is shared process-wide. Build it with
/// [`CapabilityRegistry::builtin`] plus any [`CapabilityRegistry::register`]
/// calls, then [`CapabilityRegistry::install`] it during startup. If nothing
/// is installed, the first call to [`CapabilityRegistry::global`] seals the
/// built-in catalogue in place.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    names: BTreeMap<Capability, String>,
}

impl CapabilityRegistry {
    /// A registry holding only the built-in capabilities.
    pub fn builtin() -> Self {
        let names = Capability::BUILTIN
            .iter()
            .map(|(capability, name)| (*capability, (*name).to_owned()))
            .collect();
        Self { names }
    }

    /// Bind `name` to `capability`. Bits and names must both be unique.
    pub fn register(
        mut self,
        capability: Capability,
        name: impl Into<String>,
    ) -> Result<Self, WarrantCapabilityError> {
        let name = name.into();
        if let Some(existing) = self.names.get(&capability) {
            return Err(WarrantCapabilityError::DuplicateBit {
                bit: capability.bit(),
                name: existing.clone(),
            });
        }
        if self.lookup(&name).is_some() {
            return Err(WarrantCapabilityError::DuplicateName(name));
        }
        self.names.insert(capability, name);
        Ok(self)
    }

    /// Make this the process-wide registry. Fails once any registry has been
    /// installed or read.
    pub fn install(self) -> Result<(), WarrantCapabilityError> {
        REGISTRY
            .set(self)
            .map_err(|_| WarrantCapabilityError::Sealed)
    }

    /// The process-wide registry, sealing the built-in catalogue if nothing
    /// was installed.
    pub fn global() -> &'static CapabilityRegistry {
        REGISTRY.get_or_init(Self::builtin)
    }

    /// The display name registered for `capability`.
    pub fn name(&self, capability: Capability) -> Option<&str> {
        self.names.get(&capability).map(String::as_str)
    }

    /// The capability registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Capability> {
        self.names
            .iter()
            .find(|(_, registered)| registered.as_str() == name)
            .map(|(capability, _)| *capability)
    }

    /// Every registered capability with its name, in bit order.
    pub fn iter(&self) -> impl Iterator<Item = (Capability, &str)> {
        self.names
            .iter()
            .map(|(capability, name)| (*capability, name.as_str()))
    }

    /// The comma-joined names of every registered capability in `set`.
    pub fn describe(&self, set: &CapabilitySet) -> String {
        self.iter()
            .filter(|(capability, _)| set.contains(*capability))
            .map(|(_, name)| name)
            .collect::<Vec<_>>()
            .join(",")
    }
}
