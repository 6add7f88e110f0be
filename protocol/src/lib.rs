// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Factom Protocol: Client Library
//!
//! Client-side object model and write protocol for the Factom blockchain:
//! the byte-exact encodings of entries, chains and Factoid transactions,
//! their content-addressed identifiers, the signed commits that pay for
//! writes, and the commit → reveal submission sequence against a node.
//!
//! ## Architecture
//!
//! - **codec**: VarInt_F, 6-byte timestamps, a bounds-checked byte reader.
//! - **crypto**: SHA-256/512 and Ed25519 key handling.
//! - **address**: `EC`/`Es`/`FA`/`Fs` base58-check addresses.
//! - **entry**: Entries, chains, commit ledgers and reveals.
//! - **transaction**: Factoid transactions, RCDs, signing and fees.
//! - **network**: RPC interface, ack polling and the submission pipeline.
//! - **config**: Protocol constants and network defaults.
//! - **error**: The crate-wide [`FactomError`].
//!
//! ## Example
//!
//! ```
//! use factom_protocol::address::Address;
//! use factom_protocol::entry::{compose_chain_commit, compose_reveal, Chain, Entry};
//!
//! let first = Entry::builder()
//!     .ext_id_str("my chain")
//!     .content_str("hello")
//!     .timestamp(1_700_000_000_000)
//!     .build()
//!     .unwrap();
//! let chain = Chain::new(first).unwrap();
//! let ec = Address::EntryCreditPrivate([7u8; 32]);
//!
//! let commit = compose_chain_commit(&chain, &ec).unwrap();
//! let reveal = compose_reveal(&chain).unwrap();
//! assert_eq!(commit.to_bytes().len(), 200);
//! assert_eq!(&reveal[1..33], chain.id());
//! ```

pub mod address;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod entry;
pub mod error;
pub mod network;
pub mod transaction;

pub use address::Address;
pub use entry::{Chain, Entry, EntryBuilder};
pub use error::{FactomError, Result};
pub use transaction::{Transaction, TransactionBuilder};
