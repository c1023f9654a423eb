use warrant_authority::{Authority, Mode, TransactionKind};
use warrant_common::Address;
use warrant_storage::StateStore;

use crate::{Instruction, InstructionCodec, WarrantEncodingError};

/// An externally initiated transaction as seen by the admission pipeline.
#[derive(Debug, Clone, Copy)]
pub struct Transaction<'a> {
    /// The account that signed the transaction
    pub from: Address,
    /// The recipient; grants and revokes carried in the payload act on it
    pub to: Address,
    /// The payload, possibly opening with an authorization instruction
    pub payload: &'a [u8],
    /// What the transaction does
    pub kind: TransactionKind,
}

/// The outcome of admitting a [`Transaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admitted<'a> {
    /// The instruction that was executed, if the payload carried one
    pub instruction: Option<Instruction>,
    /// Whether a unit of the sender's access allowance was spent
    pub spent_allowance: bool,
    /// The payload bytes after the authorization segment
    pub remainder: &'a [u8],
}

/// Pairs an [`Authority`] with an [`InstructionCodec`] to run the
/// instructions that arrive inside transactions.
#[derive(Debug, Clone, Default)]
pub struct Gatekeeper {
    authority: Authority,
    codec: InstructionCodec,
}

impl Gatekeeper {
    /// A gatekeeper deciding with `authority` and reading with `codec`.
    pub fn new(authority: Authority, codec: InstructionCodec) -> Self {
        Self { authority, codec }
    }

    /// The authorization engine.
    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// The wire codec.
    pub fn codec(&self) -> &InstructionCodec {
        &self.codec
    }

    /// Run one decoded instruction sent by `from` to `to`.
    pub fn execute<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        instruction: &Instruction,
        mode: Mode,
    ) -> Result<(), WarrantEncodingError>
    where
        S: StateStore + ?Sized,
    {
        match instruction {
            Instruction::Grant(set) => self.authority.grant(store, from, to, set, mode)?,
            Instruction::Revoke(set) => self.authority.revoke(store, from, to, set, mode)?,
            Instruction::AdjustAccessAllowance { target, delta } => self
                .authority
                .adjust_access_allowance(store, from, target, *delta, mode)?,
        }
        Ok(())
    }

    /// Decode `input` and, if it is an instruction, run it. Returns the
    /// instruction that ran.
    pub fn decode_and_execute<S>(
        &self,
        store: &mut S,
        from: &Address,
        to: &Address,
        input: &[u8],
        mode: Mode,
    ) -> Result<Option<Instruction>, WarrantEncodingError>
    where
        S: StateStore + ?Sized,
    {
        let Some(instruction) = self.codec.decode(input)? else {
            return Ok(None);
        };
        self.execute(store, from, to, &instruction, mode)?;
        Ok(Some(instruction))
    }

    /// Admit one externally initiated transaction.
    ///
    /// The payload is split first, so a truncated authorization segment is
    /// rejected before anything else happens. The sender must then be allowed
    /// to send a transaction of this kind, and one unit of its access
    /// allowance is spent. That unit stays spent even when the carried
    /// instruction is rejected afterwards. The remainder is handed back
    /// untouched.
    pub fn admit<'a, S>(
        &self,
        store: &mut S,
        transaction: &Transaction<'a>,
    ) -> Result<Admitted<'a>, WarrantEncodingError>
    where
        S: StateStore + ?Sized,
    {
        let Transaction {
            from,
            to,
            payload,
            kind,
        } = *transaction;

        let split = self.codec.split(payload).inspect_err(|error| {
            tracing::warn!(%from, %to, payload = %hex::encode(payload), %error, "Malformed payload");
        })?;
        self.authority.check_send_permission(store, &from, kind)?;
        let spent_allowance = self.authority.consume_one_time_allowance(store, &from)?;

        let instruction = match split.authorization {
            [] => None,
            authorization => {
                let instruction = self
                    .decode_and_execute(store, &from, &to, authorization, Mode::Apply)
                    .inspect_err(|error| {
                        tracing::warn!(
                            %from,
                            %to,
                            authorization = %hex::encode(authorization),
                            %error,
                            "Authorization instruction rejected"
                        );
                    })?;
                if let Some(instruction) = &instruction {
                    tracing::debug!(%from, %to, %instruction, "Executed authorization instruction");
                }
                instruction
            }
        };

        Ok(Admitted {
            instruction,
            spent_allowance,
            remainder: split.remainder,
        })
    }
}
