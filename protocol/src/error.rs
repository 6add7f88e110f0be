//! Error types for the Factom client.
//!
//! Every fallible operation in the crate returns a [`FactomError`]. The
//! variants are the failure kinds a caller needs to tell apart; transport
//! failures keep the node's JSON-RPC error object intact inside
//! [`FactomError::Transport`].
//!
//! A repeated commit is deliberately absent: it is recovered by the
//! submission pipeline and reported as a flag on the commit result.

use std::time::Duration;

use thiserror::Error;

use crate::network::rpc::RpcError;

/// Convenience alias used across the crate.
pub type Result<T, E = FactomError> = std::result::Result<T, E>;

/// Errors produced while building, encoding, signing, or submitting
/// Factom objects.
#[derive(Debug, Error)]
pub enum FactomError {
    /// A caller-supplied value is unusable (wrong address kind for the
    /// operation, too many outputs, malformed hex, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The text is not a valid Factom address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// The entry has no chain id and cannot be marshaled.
    #[error("entry has no chain id")]
    MissingChainId,

    /// A chain id cannot be derived from an entry without external ids.
    #[error("first entry of a chain must have at least one external id")]
    EmptyExtIds,

    /// An entry payload or a transaction exceeds the network limit.
    #[error("{what} size {size} exceeds the maximum of {max} bytes")]
    SizeLimitExceeded {
        /// What was measured ("entry payload", "transaction").
        what: &'static str,
        /// Measured size in bytes.
        size: usize,
        /// Allowed maximum in bytes.
        max: usize,
    },

    /// RCDs and signatures are missing for some inputs, or their counts
    /// disagree with the inputs.
    #[error("inconsistent signatures: {0}")]
    InconsistentSignatures(String),

    /// A signature does not verify against the signed bytes.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// The operation needs a signed transaction.
    #[error("transaction is not signed")]
    UnsignedTransaction,

    /// Fees of an unsigned transaction need the RCD/signature dimensions.
    #[error("unsigned transaction fee requires RCD/signature parameters")]
    MissingFeeParameters,

    /// The transaction pays less than the network requires.
    #[error("insufficient fees: paid {paid}, required {required}")]
    InsufficientFees {
        /// Factoshis paid (inputs minus outputs).
        paid: u64,
        /// Factoshis required at the current Entry Credit rate.
        required: u64,
    },

    /// The transaction pays far more than the network requires.
    #[error("excessive fees: paid {paid}, required {required}")]
    ExcessiveFees {
        /// Factoshis paid (inputs minus outputs).
        paid: u64,
        /// Factoshis required at the current Entry Credit rate.
        required: u64,
    },

    /// No terminal acknowledgment arrived before the deadline.
    #[error("ack for {hash} not received within {timeout:?}")]
    AckTimeout {
        /// Hash (tx id or entry hash) that was being tracked.
        hash: String,
        /// The deadline that expired.
        timeout: Duration,
    },

    /// The RPC transport or the node reported an error.
    #[error("transport error: {0}")]
    Transport(#[from] RpcError),

    /// Bytes could not be decoded into the expected structure.
    #[error("malformed {what}: {reason}")]
    Malformed {
        /// Structure being decoded.
        what: &'static str,
        /// Why decoding stopped.
        reason: String,
    },
}

impl FactomError {
    pub(crate) fn malformed(what: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            what,
            reason: reason.into(),
        }
    }

    /// Returns `true` for failures that happen before anything is sent.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Transport(_) | Self::AckTimeout { .. })
    }
}

impl From<hex::FromHexError> for FactomError {
    fn from(e: hex::FromHexError) -> Self {
        Self::InvalidArgument(format!("bad hex: {}", e))
    }
}
