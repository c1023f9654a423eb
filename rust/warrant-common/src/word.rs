use std::fmt::{Debug, Formatter};

use crate::{ADDRESS_SIZE, Address};

/// The size of a state store value in bytes.
pub const WORD_SIZE: usize = 32;

/// A fixed-size state store value.
///
/// Integers are stored big-endian and right-aligned. Unset slots read back
/// as [`Word::ZERO`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Word([u8; WORD_SIZE]);

impl Word {
    /// The empty word.
    pub const ZERO: Self = Self([0u8; WORD_SIZE]);

    /// Wrap raw word bytes.
    pub const fn new(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }

    /// The raw bytes of this word.
    pub fn bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    /// True when every byte is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_SIZE]
    }

    /// Right-align up to [`WORD_SIZE`] big-endian bytes. Returns `None` when
    /// `bytes` is wider than a word.
    pub fn from_be_slice(bytes: &[u8]) -> Option<Self> {
        if bytes.len() > WORD_SIZE {
            return None;
        }
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - bytes.len()..].copy_from_slice(bytes);
        Some(Self(word))
    }

    /// The big-endian bytes with leading zeros stripped; empty for
    /// [`Word::ZERO`].
    pub fn significant_bytes(&self) -> &[u8] {
        let start = self
            .0
            .iter()
            .position(|byte| *byte != 0)
            .unwrap_or(WORD_SIZE);
        &self.0[start..]
    }

    /// An unsigned integer word.
    pub fn from_u64(value: u64) -> Self {
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    /// Read this word as an unsigned integer, or `None` if it does not fit.
    pub fn to_u64(&self) -> Option<u64> {
        let (high, low) = self.0.split_at(WORD_SIZE - 8);
        if high.iter().any(|byte| *byte != 0) {
            return None;
        }
        Some(u64::from_be_bytes(low.try_into().ok()?))
    }

    /// A signed integer word, sign-extended across the full width.
    pub fn from_i64(value: i64) -> Self {
        let fill = if value < 0 { 0xff } else { 0x00 };
        let mut word = [fill; WORD_SIZE];
        word[WORD_SIZE - 8..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    /// Read this word as a sign-extended signed integer, or `None` if it
    /// does not fit.
    pub fn to_i64(&self) -> Option<i64> {
        let (high, low) = self.0.split_at(WORD_SIZE - 8);
        let value = i64::from_be_bytes(low.try_into().ok()?);
        let fill = if value < 0 { 0xff } else { 0x00 };
        if high.iter().any(|byte| *byte != fill) {
            return None;
        }
        Some(value)
    }

    /// An address right-aligned in a word.
    pub fn from_address(address: &Address) -> Self {
        let mut word = [0u8; WORD_SIZE];
        word[WORD_SIZE - ADDRESS_SIZE..].copy_from_slice(address.bytes());
        Self(word)
    }

    /// The low-order [`ADDRESS_SIZE`] bytes read as an address.
    pub fn to_address(&self) -> Address {
        let mut address = [0u8; ADDRESS_SIZE];
        address.copy_from_slice(&self.0[WORD_SIZE - ADDRESS_SIZE..]);
        Address::new(address)
    }
}

impl From<[u8; WORD_SIZE]> for Word {
    fn from(value: [u8; WORD_SIZE]) -> Self {
        Self(value)
    }
}

impl AsRef<[u8]> for Word {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Word(0x{})", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keeps_negative_integers_sign_extended() {
        let word = Word::from_i64(-3);

        assert_eq!(word.bytes()[0], 0xff);
        assert_eq!(word.to_i64(), Some(-3));
        assert_eq!(word.to_u64(), None);
    }

    #[test]
    fn it_refuses_integers_wider_than_64_bits() {
        let mut bytes = [0u8; WORD_SIZE];
        bytes[10] = 1;
        let word = Word::new(bytes);

        assert_eq!(word.to_u64(), None);
        assert_eq!(word.to_i64(), None);
    }

    #[test]
    fn it_right_aligns_addresses() {
        let address = Address::new([9u8; ADDRESS_SIZE]);
        let word = Word::from_address(&address);

        assert_eq!(&word.bytes()[..WORD_SIZE - ADDRESS_SIZE], &[0u8; 12]);
        assert_eq!(word.to_address(), address);
        assert_eq!(word.significant_bytes(), address.bytes());
    }

    #[test]
    fn it_treats_zero_as_having_no_significant_bytes() {
        assert!(Word::ZERO.significant_bytes().is_empty());
        assert_eq!(Word::from_be_slice(&[]), Some(Word::ZERO));
        assert_eq!(Word::from_be_slice(&[0u8; 33]), None);
    }
}
