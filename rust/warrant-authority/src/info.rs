use serde::{Deserialize, Serialize};
use warrant_capability::CapabilitySet;
use warrant_common::Address;

/// A snapshot of everything the store records about one account.
///
/// `parent` is the zero address (and `parent_index` zero) for roots and
/// detached accounts. `children` lists occupied slots only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The account described
    pub address: Address,
    /// Capabilities held
    pub capabilities: CapabilitySet,
    /// Display names of the registered capabilities held
    pub description: String,
    /// Remaining one-shot transaction permissions
    pub access_allowance: i64,
    /// Child slots ever allocated, including emptied ones
    pub child_count: u64,
    /// The delegator that attached this account
    pub parent: Address,
    /// This account's slot in the parent's child array
    pub parent_index: u64,
    /// Currently attached children in slot order
    pub children: Vec<Address>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use warrant_capability::Capability;

    #[test]
    fn it_serializes_capabilities_as_hex() -> Result<()> {
        let info = AccountInfo {
            address: Address::new([1; 20]),
            capabilities: [Capability::ADD_USER, Capability::SEND_TRANSACTION]
                .into_iter()
                .collect(),
            description: "add_user,send_transaction".into(),
            access_allowance: -2,
            child_count: 1,
            parent: Address::ZERO,
            parent_index: 0,
            children: vec![Address::new([2; 20])],
        };

        let json = serde_json::to_value(&info)?;
        assert_eq!(json["capabilities"], "12");
        assert_eq!(json["access_allowance"], -2);

        let decoded: AccountInfo = serde_json::from_value(json)?;
        assert_eq!(decoded, info);

        Ok(())
    }
}
