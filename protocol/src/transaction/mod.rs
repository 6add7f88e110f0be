//! # Factoid Transactions
//!
//! Construction, signing, wire format and fees of Factoid transactions.
//!
//! ```text
//! types.rs   : TransactionAddress and FeeParameters
//! rcd.rs     : Redeem Condition Datum (type 1)
//! builder.rs : Transaction, TransactionBuilder, marshal/unmarshal
//! signing.rs : Signing private inputs, checking external RCD/signature pairs
//! fees.rs    : Required fee in Entry Credits and factoshis
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** with [`TransactionBuilder`]; private inputs are signed here.
//! 2. **Price** with [`Transaction::compute_required_fees`] at the current
//!    EC rate.
//! 3. **Submit** with [`crate::network::submit::send_transaction`].
//!
//! Amounts are `u64` factoshis throughout.

pub mod builder;
pub mod fees;
pub mod rcd;
pub mod signing;
pub mod types;

pub use builder::{Transaction, TransactionBuilder};
pub use rcd::Rcd;
pub use signing::{sign_inputs, verify_rcd_signatures};
pub use types::{FeeParameters, TransactionAddress};
