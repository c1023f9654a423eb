use std::array::TryFromSliceError;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The size of an account identifier in bytes.
pub const ADDRESS_SIZE: usize = 20;

/// Error produced when text cannot be read as an [`Address`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressParseError {
    /// The text is not valid hexadecimal.
    #[error("Address is not valid hex: {0}")]
    InvalidHex(String),

    /// The decoded bytes are not exactly [`ADDRESS_SIZE`] long.
    #[error("Address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// A 20-byte account identifier.
///
/// The all-zero address is reserved: wherever the state store holds an
/// empty slot it reads back as [`Address::ZERO`], which is why it doubles
/// as "no account" in parent links and child slots.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Address([u8; ADDRESS_SIZE]);

impl Address {
    /// The reserved empty address.
    pub const ZERO: Self = Self([0u8; ADDRESS_SIZE]);

    /// Wrap raw address bytes.
    pub const fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of this address.
    pub fn bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    /// True for [`Address::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_SIZE]
    }
}

impl From<[u8; ADDRESS_SIZE]> for Address {
    fn from(value: [u8; ADDRESS_SIZE]) -> Self {
        Self(value)
    }
}

impl TryFrom<&[u8]> for Address {
    type Error = TryFromSliceError;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        Ok(Self(value.try_into()?))
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .unwrap_or(value);
        let bytes =
            hex::decode(digits).map_err(|error| AddressParseError::InvalidHex(format!("{error}")))?;
        let length = bytes.len();
        bytes
            .as_slice()
            .try_into()
            .map_err(|_| AddressParseError::InvalidLength(length))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Debug for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn it_parses_with_and_without_prefix() -> Result<()> {
        let plain: Address = "00000000000000000000000000000000000000ff".parse()?;
        let prefixed: Address = "0x00000000000000000000000000000000000000ff".parse()?;

        assert_eq!(plain, prefixed);
        assert_eq!(plain.bytes()[19], 0xff);
        assert_eq!(
            prefixed.to_string(),
            "0x00000000000000000000000000000000000000ff"
        );
        Ok(())
    }

    #[test]
    fn it_rejects_addresses_of_the_wrong_length() {
        assert_eq!(
            "0xabcd".parse::<Address>(),
            Err(AddressParseError::InvalidLength(2))
        );
        assert!(matches!(
            "0xzz".parse::<Address>(),
            Err(AddressParseError::InvalidHex(_))
        ));
    }

    #[test]
    fn it_serializes_as_a_hex_string() -> Result<()> {
        let address = Address::new([7u8; ADDRESS_SIZE]);
        let json = serde_json::to_string(&address)?;

        assert_eq!(json, format!("\"{address}\""));
        assert_eq!(serde_json::from_str::<Address>(&json)?, address);
        Ok(())
    }
}
