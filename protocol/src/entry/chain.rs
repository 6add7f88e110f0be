//! Chains: the first entry of a new chain plus its derived identifier.
//!
//! A chain id is never chosen, only computed:
//! `SHA-256(SHA-256(extId₀) ‖ SHA-256(extId₁) ‖ …)` over the first entry's
//! external ids. Wrapping an entry into a [`Chain`] rewrites the entry's
//! chain id to that value, discarding whatever the entry carried.

use crate::config::CHAIN_CREATION_COST;
use crate::crypto::hash::sha256;
use crate::error::{FactomError, Result};

use super::builder::Entry;

/// Derive the chain id a first entry would create.
pub fn compute_chain_id(first_entry: &Entry) -> Result<[u8; 32]> {
    compute_chain_id_from_ext_ids(first_entry.ext_ids())
}

/// Same as [`compute_chain_id`] but straight from the external ids.
pub fn compute_chain_id_from_ext_ids(ext_ids: &[Vec<u8>]) -> Result<[u8; 32]> {
    if ext_ids.is_empty() {
        return Err(FactomError::EmptyExtIds);
    }
    let mut concatenated = Vec::with_capacity(32 * ext_ids.len());
    for ext_id in ext_ids {
        concatenated.extend_from_slice(&sha256(ext_id));
    }
    Ok(sha256(&concatenated))
}

/// A chain about to be created: its id and its first entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    id: [u8; 32],
    first_entry: Entry,
}

impl Chain {
    /// Wrap `first_entry` as a new chain. Its chain id is replaced by the
    /// derived one.
    pub fn new(first_entry: Entry) -> Result<Self> {
        let id = compute_chain_id(&first_entry)?;
        let first_entry = Entry::builder_from(&first_entry).chain_id(id).build()?;
        Ok(Self { id, first_entry })
    }

    pub fn id(&self) -> &[u8; 32] {
        &self.id
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }

    pub fn first_entry(&self) -> &Entry {
        &self.first_entry
    }

    /// Creation fee plus the first entry's own cost.
    pub fn ec_cost(&self) -> Result<u8> {
        Ok(CHAIN_CREATION_COST + self.first_entry.ec_cost()?)
    }
}

impl TryFrom<Entry> for Chain {
    type Error = FactomError;

    fn try_from(entry: Entry) -> Result<Self> {
        Self::new(entry)
    }
}
