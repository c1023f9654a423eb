//! Reading and writing instructions embedded at the front of a payload.
//!
//! # Binary Layout
//!
//! ```text
//! ┌───────────┬────────┬────────────────────────────────────┬─────────────┐
//! │   magic   │ length │               body                 │  remainder  │
//! │ (3 bytes) │ (1..)  │          (length bytes)            │ (untouched) │
//! └───────────┴────────┴──┬─────────────────────────────────┴─────────────┘
//!                         │
//!        ┌────────────────┴─────────────────────────────────────────┐
//!        │ Grant / Revoke                                           │
//!        │ ┌────────┬───────────────────────────────────────┐       │
//!        │ │ opcode │ capability set (big-endian, any size) │       │
//!        │ └────────┴───────────────────────────────────────┘       │
//!        │ Increase / Decrease access allowance                     │
//!        │ ┌────────┬──────────────────┬──────────────────────────┐ │
//!        │ │ opcode │ target (20 bytes)│ magnitude (≤ 8 bytes BE) │ │
//!        │ └────────┴──────────────────┴──────────────────────────┘ │
//!        └──────────────────────────────────────────────────────────┘
//! ```
//!
//! [`InstructionCodec::decode`] expects the whole input to be exactly one
//! instruction. [`InstructionCodec::split`] accepts an instruction followed
//! by arbitrary bytes and never looks past the declared body.

use warrant_capability::CapabilitySet;
use warrant_common::{ADDRESS_SIZE, Address};

use crate::{CodecSettings, Instruction, MAGIC_SIZE, Magic, Opcode, WarrantEncodingError};

/// The bytes in front of every instruction body: the magic tag and the
/// length byte.
pub const HEADER_SIZE: usize = MAGIC_SIZE + 1;

/// The largest body the length byte can describe.
pub const MAX_BODY_SIZE: usize = u8::MAX as usize;

const MAGNITUDE_SIZE: usize = 8;

/// A payload separated into its authorization segment and everything after
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    /// The header and body of the leading instruction; empty when the payload
    /// carries none
    pub authorization: &'a [u8],
    /// The bytes left for downstream processing
    pub remainder: &'a [u8],
}

/// Reads and writes authorization instructions.
#[derive(Debug, Clone, Default)]
pub struct InstructionCodec {
    magic: Magic,
}

impl InstructionCodec {
    /// A codec using the configured magic tag.
    pub fn new(settings: &CodecSettings) -> Self {
        Self {
            magic: settings.magic,
        }
    }

    /// The tag this codec recognizes.
    pub fn magic(&self) -> &Magic {
        &self.magic
    }

    /// The declared body length and the bytes after the header, or `None`
    /// when `input` does not open with this codec's header.
    fn header<'a>(&self, input: &'a [u8]) -> Option<(usize, &'a [u8])> {
        if input.len() < HEADER_SIZE || &input[..MAGIC_SIZE] != self.magic.bytes() {
            return None;
        }
        Some((input[MAGIC_SIZE] as usize, &input[HEADER_SIZE..]))
    }

    /// Decode `input` as a single instruction.
    ///
    /// Returns `Ok(None)` when `input` is not addressed to this subsystem at
    /// all (too short for a header, or a different tag).
    pub fn decode(&self, input: &[u8]) -> Result<Option<Instruction>, WarrantEncodingError> {
        let Some((declared, body)) = self.header(input) else {
            return Ok(None);
        };
        if declared == 0 {
            return Err(WarrantEncodingError::MalformedInput(
                "instruction body is empty".into(),
            ));
        }
        if declared != body.len() {
            return Err(WarrantEncodingError::MalformedInput(format!(
                "instruction declares {declared} body bytes but carries {}",
                body.len()
            )));
        }

        let operands = &body[1..];
        let instruction = match Opcode::try_from(body[0])? {
            Opcode::Grant => Instruction::Grant(CapabilitySet::from_be_bytes(operands)),
            Opcode::Revoke => Instruction::Revoke(CapabilitySet::from_be_bytes(operands)),
            Opcode::IncreaseAccessAllowance => {
                let (target, magnitude) = allowance_operands(operands)?;
                let delta = i64::try_from(magnitude).map_err(|_| {
                    WarrantEncodingError::MalformedInput(format!(
                        "allowance increase {magnitude} overflows"
                    ))
                })?;
                Instruction::AdjustAccessAllowance { target, delta }
            }
            Opcode::DecreaseAccessAllowance => {
                let (target, magnitude) = allowance_operands(operands)?;
                let delta = 0i64.checked_sub_unsigned(magnitude).ok_or_else(|| {
                    WarrantEncodingError::MalformedInput(format!(
                        "allowance decrease {magnitude} overflows"
                    ))
                })?;
                Instruction::AdjustAccessAllowance { target, delta }
            }
        };

        Ok(Some(instruction))
    }

    /// Encode `instruction` in the form [`InstructionCodec::decode`] reads.
    pub fn encode(&self, instruction: &Instruction) -> Result<Vec<u8>, WarrantEncodingError> {
        let mut body = vec![u8::from(instruction.opcode())];
        match instruction {
            Instruction::Grant(set) | Instruction::Revoke(set) => {
                body.extend_from_slice(&set.to_be_bytes());
            }
            Instruction::AdjustAccessAllowance { target, delta } => {
                body.extend_from_slice(target.bytes());
                let magnitude = delta.unsigned_abs().to_be_bytes();
                let leading = magnitude.iter().take_while(|byte| **byte == 0).count();
                body.extend_from_slice(&magnitude[leading..]);
            }
        }

        let length = u8::try_from(body.len()).map_err(|_| {
            WarrantEncodingError::MalformedInput(format!(
                "instruction body of {} bytes exceeds {MAX_BODY_SIZE}",
                body.len()
            ))
        })?;

        let mut output = Vec::with_capacity(HEADER_SIZE + body.len());
        output.extend_from_slice(self.magic.bytes());
        output.push(length);
        output.extend_from_slice(&body);
        Ok(output)
    }

    /// Separate a leading instruction from the rest of `input`.
    ///
    /// Input that does not open with this codec's header (or declares an
    /// empty body) carries no instruction and comes back whole as the
    /// remainder. The remainder is never inspected.
    pub fn split<'a>(&self, input: &'a [u8]) -> Result<Split<'a>, WarrantEncodingError> {
        let unaddressed = Split {
            authorization: &input[..0],
            remainder: input,
        };
        let Some((declared, body)) = self.header(input) else {
            return Ok(unaddressed);
        };
        if declared == 0 {
            return Ok(unaddressed);
        }
        if body.len() < declared {
            return Err(WarrantEncodingError::MalformedInput(format!(
                "instruction declares {declared} body bytes but only {} follow",
                body.len()
            )));
        }

        let (authorization, remainder) = input.split_at(HEADER_SIZE + declared);
        Ok(Split {
            authorization,
            remainder,
        })
    }
}

fn allowance_operands(operands: &[u8]) -> Result<(Address, u64), WarrantEncodingError> {
    if operands.len() < ADDRESS_SIZE {
        return Err(WarrantEncodingError::MalformedInput(format!(
            "allowance target needs {ADDRESS_SIZE} bytes, found {}",
            operands.len()
        )));
    }
    let (target, magnitude) = operands.split_at(ADDRESS_SIZE);
    let target = Address::try_from(target)
        .map_err(|error| WarrantEncodingError::MalformedInput(format!("{error}")))?;

    let leading = magnitude.iter().take_while(|byte| **byte == 0).count();
    let significant = &magnitude[leading..];
    if significant.len() > MAGNITUDE_SIZE {
        return Err(WarrantEncodingError::MalformedInput(format!(
            "allowance magnitude of {} bytes overflows",
            significant.len()
        )));
    }
    let mut bytes = [0u8; MAGNITUDE_SIZE];
    bytes[MAGNITUDE_SIZE - significant.len()..].copy_from_slice(significant);

    Ok((target, u64::from_be_bytes(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use proptest::prelude::*;
    use warrant_capability::Capability;

    fn codec() -> InstructionCodec {
        InstructionCodec::default()
    }

    #[test]
    fn it_decodes_a_grant() -> Result<()> {
        let input = [b'y', b'g', b'l', 2, 0x01, 0b0001_0010];
        let expected: CapabilitySet = [Capability::ADD_USER, Capability::SEND_TRANSACTION]
            .into_iter()
            .collect();

        assert_eq!(codec().decode(&input)?, Some(Instruction::Grant(expected)));
        Ok(())
    }

    #[test]
    fn it_decodes_a_grant_without_operands_as_an_empty_set() -> Result<()> {
        let input = [b'y', b'g', b'l', 1, 0x01];
        assert_eq!(
            codec().decode(&input)?,
            Some(Instruction::Grant(CapabilitySet::default()))
        );
        Ok(())
    }

    #[test]
    fn it_decodes_allowance_adjustments() -> Result<()> {
        let mut input = b"ygl".to_vec();
        input.push(23);
        input.push(0x04);
        input.extend_from_slice(&[9; 20]);
        input.extend_from_slice(&[0x01, 0x00]);

        assert_eq!(
            codec().decode(&input)?,
            Some(Instruction::AdjustAccessAllowance {
                target: Address::new([9; 20]),
                delta: -256,
            })
        );
        Ok(())
    }

    #[test]
    fn it_ignores_foreign_payloads() -> Result<()> {
        assert_eq!(codec().decode(b"")?, None);
        assert_eq!(codec().decode(b"ygl")?, None);
        assert_eq!(codec().decode(b"xyz\x01\x01")?, None);
        Ok(())
    }

    #[test]
    fn it_rejects_inconsistent_lengths() {
        for input in [
            &b"ygl\x00"[..],
            &b"ygl\x02\x01"[..],
            &b"ygl\x01\x01\x02"[..],
        ] {
            assert!(
                matches!(
                    codec().decode(input),
                    Err(WarrantEncodingError::MalformedInput(_))
                ),
                "{input:?} should be malformed"
            );
        }
    }

    #[test]
    fn it_rejects_unreadable_allowance_operands() {
        let mut short = b"ygl\x0a\x03".to_vec();
        short.extend_from_slice(&[1; 9]);
        assert!(codec().decode(&short).is_err());

        let mut wide = b"ygl".to_vec();
        wide.push(1 + 20 + 9);
        wide.push(0x03);
        wide.extend_from_slice(&[1; 20]);
        wide.extend_from_slice(&[0xff; 9]);
        assert!(codec().decode(&wide).is_err());

        let mut too_large = b"ygl".to_vec();
        too_large.push(1 + 20 + 8);
        too_large.push(0x03);
        too_large.extend_from_slice(&[1; 20]);
        too_large.extend_from_slice(&[0xff; 8]);
        assert!(codec().decode(&too_large).is_err());
    }

    #[test]
    fn it_reaches_the_most_negative_delta() -> Result<()> {
        let instruction = Instruction::AdjustAccessAllowance {
            target: Address::new([3; 20]),
            delta: i64::MIN,
        };
        let encoded = codec().encode(&instruction)?;

        assert_eq!(&encoded[encoded.len() - 8..], &[0x80, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(codec().decode(&encoded)?, Some(instruction));
        Ok(())
    }

    #[test]
    fn it_encodes_minimal_operands() -> Result<()> {
        let encoded = codec().encode(&Instruction::Revoke(Capability::DEL_USER.into()))?;
        assert_eq!(encoded, b"ygl\x02\x02\x04");

        let encoded = codec().encode(&Instruction::AdjustAccessAllowance {
            target: Address::new([5; 20]),
            delta: 5,
        })?;
        assert_eq!(encoded.len(), HEADER_SIZE + 1 + 20 + 1);
        assert_eq!(encoded[HEADER_SIZE], 0x03);
        Ok(())
    }

    #[test]
    fn it_refuses_to_encode_oversized_bodies() {
        let huge = CapabilitySet::from(Capability::new(8 * 300));
        assert!(matches!(
            codec().encode(&Instruction::Grant(huge)),
            Err(WarrantEncodingError::MalformedInput(_))
        ));
    }

    #[test]
    fn it_splits_the_authorization_segment_from_the_remainder() -> Result<()> {
        let input = b"ygl\x02\x01\x02payload";
        let split = codec().split(input)?;

        assert_eq!(split.authorization, b"ygl\x02\x01\x02");
        assert_eq!(split.remainder, b"payload");
        Ok(())
    }

    #[test]
    fn it_passes_foreign_payloads_through_whole() -> Result<()> {
        for input in [&b"abc\x02\x01\x02"[..], b"yg", b"ygl\x00rest"] {
            let split = codec().split(input)?;
            assert!(split.authorization.is_empty());
            assert_eq!(split.remainder, input);
        }
        Ok(())
    }

    #[test]
    fn it_rejects_truncated_segments() {
        assert!(matches!(
            codec().split(b"ygl\x05\x01"),
            Err(WarrantEncodingError::MalformedInput(_))
        ));
    }

    #[test]
    fn it_honors_a_configured_tag() -> Result<()> {
        let codec = InstructionCodec::new(&CodecSettings {
            magic: Magic::new(*b"abc")?,
        });
        let encoded = codec.encode(&Instruction::Grant(Capability::ROOT.into()))?;

        assert_eq!(&encoded[..3], b"abc");
        assert_eq!(InstructionCodec::default().decode(&encoded)?, None);
        assert!(codec.decode(&encoded)?.is_some());
        Ok(())
    }

    proptest! {
        #[test]
        fn split_never_loses_bytes(input in prop::collection::vec(any::<u8>(), 0..64)) {
            if let Ok(split) = codec().split(&input) {
                let mut joined = split.authorization.to_vec();
                joined.extend_from_slice(split.remainder);
                prop_assert_eq!(joined, input);
            }
        }

        #[test]
        fn decode_accepts_whatever_split_isolates(
            body in prop::collection::vec(any::<u8>(), 1..32),
            rest in prop::collection::vec(any::<u8>(), 0..32),
        ) {
            let mut input = b"ygl".to_vec();
            input.push(body.len() as u8);
            input.extend_from_slice(&body);
            input.extend_from_slice(&rest);

            let split = codec().split(&input).expect("segment is complete");
            prop_assert_eq!(split.remainder, &rest[..]);
            if let Err(error) = codec().decode(split.authorization) {
                prop_assert!(matches!(error, WarrantEncodingError::MalformedInput(_)));
                prop_assert!(!matches!(body[0], 0x01 | 0x02));
            }
        }
    }
}
