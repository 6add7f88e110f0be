//! # Network Module
//!
//! Everything that talks to a factomd node. The crate never opens a socket
//! itself: calls go through an [`RpcTransport`] supplied by the caller.
//!
//! ## Architecture
//!
//! ```text
//! rpc.rs    : JSON-RPC method names, envelopes, typed results, transport trait
//! ack.rs    : Acknowledgment polling for commits, reveals and transactions
//! submit.rs : Commit → reveal pipeline, batches, Factoid transaction submission
//! ```

pub mod ack;
pub mod rpc;
pub mod submit;

pub use ack::{
    wait_on_ack, wait_on_commit_ack, wait_on_factoid_transaction_ack, wait_on_reveal_ack,
};
pub use rpc::{AckField, AckResponse, RpcError, RpcMethod, RpcRequest, RpcResponse, RpcTransport};
pub use submit::{
    add, add_all, add_chains, add_entries, commit, commit_with_signature, entry_credit_rate,
    reveal, send_transaction, submit_commit, AckPolicy, AddOptions, AddResult, BatchOptions,
    CommitResult, RevealResult, SendTransactionOptions, Submittable,
};
