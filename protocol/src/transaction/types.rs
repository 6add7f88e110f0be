//! Small value types shared by the transaction builder and codec.

use std::fmt;

use crate::address::Address;

/// One input or output: an address and an amount in factoshis
/// (Factoid outputs and inputs) or Entry Credits (EC outputs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionAddress {
    pub address: Address,
    pub amount: u64,
}

impl TransactionAddress {
    pub fn new(address: Address, amount: u64) -> Self {
        Self { address, amount }
    }
}

impl fmt::Display for TransactionAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.address.public(), self.amount)
    }
}

/// How to size the signature section of a transaction that is not signed
/// yet, for fee estimation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeParameters {
    /// One RCD type 1 and one signature per input (97 bytes each).
    Rcd1Defaults,
    /// Caller-provided total RCD + signature length and signature count.
    Explicit {
        rcd_signature_length: usize,
        number_of_signatures: usize,
    },
}
