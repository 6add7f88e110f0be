//! # Entries, Chains and Commits
//!
//! The write side of the Factom object model.
//!
//! ```text
//! builder.rs: Entry value type, EntryBuilder, wire marshal/unmarshal, cost
//! chain.rs  : Chain id derivation and the Chain wrapper
//! commit.rs : Commit ledgers, signing, reveal payloads, commit tx ids
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build** an [`Entry`] (with a chain id, or wrap it in a [`Chain`]).
//! 2. **Commit**: [`compose_entry_commit`] / [`compose_chain_commit`] pay
//!    for it with an Entry Credit key.
//! 3. **Reveal**: [`compose_reveal`] produces the bytes the commit promised.
//!
//! Submission against a node lives in [`crate::network::submit`].

pub mod builder;
pub mod chain;
pub mod commit;

pub use builder::{BlockContext, Entry, EntryBuilder};
pub use chain::{compute_chain_id, compute_chain_id_from_ext_ids, Chain};
pub use commit::{
    compose_chain_commit, compose_commit, compose_commit_with_signature, compose_entry_commit,
    compose_reveal, compose_signed_commit, compute_tx_id, weld, CommitMessage, Commitable,
};
