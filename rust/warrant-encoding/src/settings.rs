use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::WarrantEncodingError;

/// The number of bytes in a [`Magic`] tag.
pub const MAGIC_SIZE: usize = 3;

/// The tag that opens every instruction and marks it as belonging to this
/// subsystem. A tag is always valid UTF-8, so its text form is exact.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Magic([u8; MAGIC_SIZE]);

impl Magic {
    /// Wrap a raw tag. The bytes must be valid UTF-8.
    pub fn new(bytes: [u8; MAGIC_SIZE]) -> Result<Self, WarrantEncodingError> {
        std::str::from_utf8(&bytes).map_err(|error| {
            WarrantEncodingError::MalformedInput(format!(
                "magic tag 0x{} is not text: {error}",
                hex::encode(bytes)
            ))
        })?;
        Ok(Self(bytes))
    }

    /// The raw tag bytes.
    pub fn bytes(&self) -> &[u8; MAGIC_SIZE] {
        &self.0
    }
}

impl Default for Magic {
    fn default() -> Self {
        Self(*b"ygl")
    }
}

impl TryFrom<String> for Magic {
    type Error = WarrantEncodingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes: [u8; MAGIC_SIZE] = value.as_bytes().try_into().map_err(|_| {
            WarrantEncodingError::MalformedInput(format!(
                "magic tag {value:?} is not {MAGIC_SIZE} bytes"
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl From<Magic> for String {
    fn from(value: Magic) -> Self {
        String::from_utf8_lossy(&value.0).into_owned()
    }
}

impl Display for Magic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl Debug for Magic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Magic({self})")
    }
}

/// Configuration of the instruction wire format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecSettings {
    /// The tag that opens every instruction
    pub magic: Magic,
}

impl CodecSettings {
    /// Read settings from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn it_defaults_to_the_ygl_tag() -> Result<()> {
        assert_eq!(CodecSettings::from_json("{}")?.magic.bytes(), b"ygl");
        Ok(())
    }

    #[test]
    fn it_reads_a_custom_tag() -> Result<()> {
        let settings = CodecSettings::from_json(r#"{"magic": "abc"}"#)?;
        assert_eq!(settings.magic, Magic::new(*b"abc")?);
        assert_eq!(serde_json::to_string(&settings)?, r#"{"magic":"abc"}"#);
        Ok(())
    }

    #[test]
    fn it_rejects_tags_of_the_wrong_size() {
        assert!(CodecSettings::from_json(r#"{"magic": "ab"}"#).is_err());
        assert!(CodecSettings::from_json(r#"{"magic": "abcd"}"#).is_err());
    }

    #[test]
    fn it_only_accepts_text_tags() -> Result<()> {
        assert!(matches!(
            Magic::new([0xff, 0, 0]),
            Err(WarrantEncodingError::MalformedInput(_))
        ));

        let magic = Magic::new(*b"ab\x00")?;
        let json = serde_json::to_string(&CodecSettings { magic })?;
        assert_eq!(CodecSettings::from_json(&json)?.magic, magic);
        Ok(())
    }
}
