use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use warrant_common::Word;

use crate::{Capability, CapabilityRegistry, WarrantCapabilityError};

const LIMB_BITS: u32 = u64::BITS;

/// An arbitrary-width set of [`Capability`] bits.
///
/// Bits are kept in little-endian 64-bit limbs with trailing zero limbs
/// trimmed, so two sets holding the same bits always compare equal no
/// matter how they were built. Each set owns its storage outright.
///
/// The byte form is the minimal big-endian integer whose bit `i` is set
/// exactly when capability `i` is present; the empty set encodes to no
/// bytes at all.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CapabilitySet {
    limbs: Vec<u64>,
}

impl CapabilitySet {
    /// The empty set.
    pub const fn new() -> Self {
        Self { limbs: Vec::new() }
    }

    /// Read a set from big-endian bytes. Leading zero bytes are ignored.
    pub fn from_be_bytes(bytes: &[u8]) -> Self {
        let mut limbs = vec![0u64; bytes.len().div_ceil(8)];
        for (offset, byte) in bytes.iter().rev().enumerate() {
            limbs[offset / 8] |= u64::from(*byte) << (8 * (offset % 8));
        }
        let mut set = Self { limbs };
        set.normalize();
        set
    }

    /// The minimal big-endian byte form of this set.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let bytes: Vec<u8> = self
            .limbs
            .iter()
            .rev()
            .flat_map(|limb| limb.to_be_bytes())
            .collect();
        let start = bytes
            .iter()
            .position(|byte| *byte != 0)
            .unwrap_or(bytes.len());
        bytes[start..].to_vec()
    }

    /// Read a set from a state store word.
    pub fn from_word(word: &Word) -> Self {
        Self::from_be_bytes(word.significant_bytes())
    }

    /// The state store word for this set, or `None` when the set is wider
    /// than a word can hold.
    pub fn to_word(&self) -> Option<Word> {
        Word::from_be_slice(&self.to_be_bytes())
    }

    /// The minimal big-endian byte form as lowercase hex.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// One past the highest bit present; zero for the empty set.
    pub fn width(&self) -> u32 {
        match self.limbs.last() {
            Some(top) => {
                (self.limbs.len() as u32 - 1) * LIMB_BITS + (LIMB_BITS - top.leading_zeros())
            }
            None => 0,
        }
    }

    /// True when no bit is present.
    pub fn is_empty(&self) -> bool {
        self.limbs.is_empty()
    }

    /// True when `capability` is present.
    pub fn contains(&self, capability: Capability) -> bool {
        let (limb, mask) = Self::locate(capability);
        self.limbs
            .get(limb)
            .is_some_and(|value| value & mask == mask)
    }

    /// Every capability present, in bit order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.limbs.iter().enumerate().flat_map(|(index, limb)| {
            (0..LIMB_BITS)
                .filter(move |bit| limb & (1u64 << bit) != 0)
                .map(move |bit| Capability::new(index as u32 * LIMB_BITS + bit))
        })
    }

    /// Set the bit for `capability`.
    pub fn insert(&mut self, capability: Capability) -> &mut Self {
        let (limb, mask) = Self::locate(capability);
        if self.limbs.len() <= limb {
            self.limbs.resize(limb + 1, 0);
        }
        self.limbs[limb] |= mask;
        self
    }

    /// Union every set in `sets` into this one.
    pub fn add<'a, I>(&mut self, sets: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a CapabilitySet>,
    {
        for set in sets {
            if self.limbs.len() < set.limbs.len() {
                self.limbs.resize(set.limbs.len(), 0);
            }
            for (limb, value) in self.limbs.iter_mut().zip(&set.limbs) {
                *limb |= value;
            }
        }
        self
    }

    /// Clear exactly the bits present in each set in `sets`.
    pub fn subtract<'a, I>(&mut self, sets: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a CapabilitySet>,
    {
        for set in sets {
            for (limb, value) in self.limbs.iter_mut().zip(&set.limbs) {
                *limb &= !value;
            }
        }
        self.normalize();
        self
    }

    /// Clear this set, then union every set in `sets` into it.
    pub fn replace<'a, I>(&mut self, sets: I) -> &mut Self
    where
        I: IntoIterator<Item = &'a CapabilitySet>,
    {
        self.limbs.clear();
        self.add(sets)
    }

    /// True when every set in `sets` is contained in this one. Vacuously
    /// true for no sets.
    pub fn has_all<'a, I>(&self, sets: I) -> bool
    where
        I: IntoIterator<Item = &'a CapabilitySet>,
    {
        sets.into_iter().all(|set| self.covers(set))
    }

    /// True when at least one set in `sets` is contained in this one. False
    /// for no sets.
    pub fn has_one<'a, I>(&self, sets: I) -> bool
    where
        I: IntoIterator<Item = &'a CapabilitySet>,
    {
        sets.into_iter().any(|set| self.covers(set))
    }

    /// True when the ROOT bit is present.
    pub fn is_root(&self) -> bool {
        self.contains(Capability::ROOT)
    }

    /// The comma-joined display names of every registered capability
    /// present, in bit order.
    pub fn describe(&self) -> String {
        CapabilityRegistry::global().describe(self)
    }

    fn covers(&self, other: &CapabilitySet) -> bool {
        other.limbs.iter().enumerate().all(|(index, value)| {
            let held = self.limbs.get(index).copied().unwrap_or_default();
            held & value == *value
        })
    }

    fn locate(capability: Capability) -> (usize, u64) {
        let bit = capability.bit();
        ((bit / LIMB_BITS) as usize, 1u64 << (bit % LIMB_BITS))
    }

    fn normalize(&mut self) {
        while self.limbs.last() == Some(&0) {
            self.limbs.pop();
        }
    }
}

impl From<Capability> for CapabilitySet {
    fn from(value: Capability) -> Self {
        let mut set = Self::new();
        set.insert(value);
        set
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<T: IntoIterator<Item = Capability>>(iter: T) -> Self {
        let mut set = Self::new();
        for capability in iter {
            set.insert(capability);
        }
        set
    }
}

/// Parses comma-separated registered names, e.g. `"add_user,del_user"`.
impl FromStr for CapabilitySet {
    type Err = WarrantCapabilityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let registry = CapabilityRegistry::global();
        value
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| {
                registry
                    .lookup(name)
                    .ok_or_else(|| WarrantCapabilityError::UnknownCapability(name.to_owned()))
            })
            .collect()
    }
}

impl Display for CapabilitySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl Debug for CapabilitySet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "CapabilitySet(0x{} [{self}])", self.to_hex())
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        let digits = text.strip_prefix("0x").unwrap_or(&text);
        let padded = if digits.len() % 2 == 1 {
            format!("0{digits}")
        } else {
            digits.to_owned()
        };
        let bytes = hex::decode(padded).map_err(serde::de::Error::custom)?;
        Ok(Self::from_be_bytes(&bytes))
    }
}
