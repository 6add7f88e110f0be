//! # Submission pipeline
//!
//! Drives the two-phase write against a node:
//!
//! ```text
//! Composed ──commit──▶ Committed ──(ack)──▶ RevealPending ──reveal──▶ Revealed
//!     └──────────────── any unrecoverable error ────────────────▶ Failed
//! ```
//!
//! A node that already holds the commit answers "Repeated Commit". That is
//! reported as [`CommitResult::repeated_commit`] and the pipeline carries on
//! with the reveal, so resubmitting the same object is always safe.
//!
//! [`add`] has two modes. With [`AckPolicy::Skip`] for the commit, commit and
//! reveal are sent concurrently and may reach the node in either order. With
//! [`AckPolicy::Wait`], the reveal is only sent after the commit's ack has
//! reached a terminal status.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use super::ack::{wait_on_commit_ack, wait_on_factoid_transaction_ack, wait_on_reveal_ack};
use super::rpc::{
    call_typed, CommitResponse, EntryCreditRateResponse, FactoidSubmitResponse, RevealResponse,
    RpcMethod, RpcTransport,
};
use crate::address::Address;
use crate::config::{
    DEFAULT_COMMIT_ACK_TIMEOUT, DEFAULT_REVEAL_ACK_TIMEOUT, DEFAULT_TRANSACTION_ACK_TIMEOUT,
    MAX_FEE_MULTIPLIER,
};
use crate::entry::commit::{compose_commit_with_signature, compose_signed_commit};
use crate::entry::{Chain, CommitMessage, Commitable, Entry};
use crate::error::{FactomError, Result};
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Whether to wait for an acknowledgment after a call is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckPolicy {
    /// Return as soon as the node accepted the call.
    Skip,
    /// Poll `ack` until a terminal status or the timeout.
    Wait(Duration),
}

impl AckPolicy {
    /// Signed seconds, as accepted on the command line: negative skips the
    /// wait, anything else waits that long.
    pub fn from_secs(secs: i64) -> Self {
        if secs < 0 {
            Self::Skip
        } else {
            Self::Wait(Duration::from_secs(secs as u64))
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        match self {
            Self::Skip => None,
            Self::Wait(timeout) => Some(*timeout),
        }
    }
}

/// Ack policies for [`add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOptions {
    /// `Skip` also makes commit and reveal run concurrently.
    pub commit: AckPolicy,
    pub reveal: AckPolicy,
}

impl Default for AddOptions {
    fn default() -> Self {
        Self {
            commit: AckPolicy::Wait(DEFAULT_COMMIT_ACK_TIMEOUT),
            reveal: AckPolicy::Wait(DEFAULT_REVEAL_ACK_TIMEOUT),
        }
    }
}

/// Bound on in-flight [`add`] calls for the batch variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Zero is treated as one.
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

/// Options for [`send_transaction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendTransactionOptions {
    /// Skip the fee sanity checks.
    pub force: bool,
    pub ack: AckPolicy,
}

impl Default for SendTransactionOptions {
    fn default() -> Self {
        Self {
            force: false,
            ack: AckPolicy::Wait(DEFAULT_TRANSACTION_ACK_TIMEOUT),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// Commit transaction id. `None` when the commit was a repeat.
    pub tx_id: Option<String>,
    pub repeated_commit: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealResult {
    pub entry_hash: String,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddResult {
    pub tx_id: Option<String>,
    pub repeated_commit: bool,
    pub chain_id: String,
    pub entry_hash: String,
}

impl AddResult {
    fn new(commit: CommitResult, reveal: RevealResult) -> Self {
        Self {
            tx_id: commit.tx_id,
            repeated_commit: commit.repeated_commit,
            chain_id: reveal.chain_id,
            entry_hash: reveal.entry_hash,
        }
    }
}

// ---------------------------------------------------------------------------
// Submittable
// ---------------------------------------------------------------------------

/// A [`Commitable`] that knows which node methods carry it.
pub trait Submittable: Commitable + Send + Sync {
    const COMMIT_METHOD: RpcMethod;
    const REVEAL_METHOD: RpcMethod;
}

impl Submittable for Entry {
    const COMMIT_METHOD: RpcMethod = RpcMethod::CommitEntry;
    const REVEAL_METHOD: RpcMethod = RpcMethod::RevealEntry;
}

impl Submittable for Chain {
    const COMMIT_METHOD: RpcMethod = RpcMethod::CommitChain;
    const REVEAL_METHOD: RpcMethod = RpcMethod::RevealChain;
}

// ---------------------------------------------------------------------------
// Commit / Reveal / Add
// ---------------------------------------------------------------------------

/// Compose, sign with a private EC address, and submit the commit for
/// `obj`.
pub async fn commit<T, R>(
    transport: &R,
    obj: &T,
    ec_address: &Address,
    ack: AckPolicy,
) -> Result<CommitResult>
where
    T: Submittable + ?Sized,
    R: RpcTransport + ?Sized,
{
    let message = compose_signed_commit(obj, ec_address)?;
    submit_commit(transport, T::COMMIT_METHOD, &message, ack).await
}

/// Submit a commit signed elsewhere by `public_ec_address`. `obj` must carry
/// the timestamp that was signed.
pub async fn commit_with_signature<T, R>(
    transport: &R,
    obj: &T,
    public_ec_address: &Address,
    signature: &[u8; 64],
    ack: AckPolicy,
) -> Result<CommitResult>
where
    T: Submittable + ?Sized,
    R: RpcTransport + ?Sized,
{
    let message = compose_commit_with_signature(obj, public_ec_address, signature)?;
    submit_commit(transport, T::COMMIT_METHOD, &message, ack).await
}

/// Send a composed commit and optionally wait for its ack.
pub async fn submit_commit<R>(
    transport: &R,
    method: RpcMethod,
    message: &CommitMessage,
    ack: AckPolicy,
) -> Result<CommitResult>
where
    R: RpcTransport + ?Sized,
{
    let params = json!({ "message": message.hex() });
    let response: CommitResponse = match call_typed(transport, method, params).await {
        Ok(response) => response,
        Err(FactomError::Transport(e)) if e.is_repeated_commit() => {
            warn!(%method, tx_id = %message.tx_id_hex(), "repeated commit, continuing");
            return Ok(CommitResult {
                tx_id: None,
                repeated_commit: true,
            });
        }
        Err(e) => return Err(e),
    };

    let tx_id = if response.txid.is_empty() {
        message.tx_id_hex()
    } else {
        response.txid
    };
    info!(%method, %tx_id, "commit accepted");

    if let Some(timeout) = ack.timeout() {
        let status = wait_on_commit_ack(transport, &tx_id, timeout).await?;
        info!(%tx_id, %status, "commit acknowledged");
    }

    Ok(CommitResult {
        tx_id: Some(tx_id),
        repeated_commit: false,
    })
}

/// Submit the reveal for `obj` and optionally wait for its ack.
pub async fn reveal<T, R>(transport: &R, obj: &T, ack: AckPolicy) -> Result<RevealResult>
where
    T: Submittable + ?Sized,
    R: RpcTransport + ?Sized,
{
    let params = json!({ "entry": hex::encode(obj.reveal()?) });
    let response: RevealResponse = call_typed(transport, T::REVEAL_METHOD, params).await?;
    info!(
        method = %T::REVEAL_METHOD,
        entry_hash = %response.entryhash,
        chain_id = %response.chainid,
        "reveal accepted"
    );

    if let Some(timeout) = ack.timeout() {
        let status =
            wait_on_reveal_ack(transport, &response.entryhash, &response.chainid, timeout).await?;
        info!(entry_hash = %response.entryhash, %status, "reveal acknowledged");
    }

    Ok(RevealResult {
        entry_hash: response.entryhash,
        chain_id: response.chainid,
    })
}

/// Commit then reveal `obj`.
///
/// With `options.commit == Skip` both calls run concurrently and both are
/// driven to completion before an error is returned; otherwise the reveal
/// waits for the commit's ack.
pub async fn add<T, R>(
    transport: &R,
    obj: &T,
    ec_address: &Address,
    options: AddOptions,
) -> Result<AddResult>
where
    T: Submittable + ?Sized,
    R: RpcTransport + ?Sized,
{
    let (commit_result, reveal_result) = match options.commit {
        AckPolicy::Skip => {
            let (commit_result, reveal_result) = futures::join!(
                commit(transport, obj, ec_address, AckPolicy::Skip),
                reveal(transport, obj, options.reveal),
            );
            (commit_result?, reveal_result?)
        }
        wait => {
            let commit_result = commit(transport, obj, ec_address, wait).await?;
            let reveal_result = reveal(transport, obj, options.reveal).await?;
            (commit_result, reveal_result)
        }
    };
    Ok(AddResult::new(commit_result, reveal_result))
}

/// [`add`] over many objects with at most `batch.concurrency` in flight.
///
/// Every item runs to completion; the first error in input order is
/// returned if any failed.
pub async fn add_all<T, R>(
    transport: &R,
    objs: &[T],
    ec_address: &Address,
    options: AddOptions,
    batch: BatchOptions,
) -> Result<Vec<AddResult>>
where
    T: Submittable,
    R: RpcTransport + ?Sized,
{
    let results: Vec<Result<AddResult>> = stream::iter(objs)
        .map(|obj| add(transport, obj, ec_address, options))
        .buffered(batch.concurrency.max(1))
        .collect()
        .await;
    results.into_iter().collect()
}

pub async fn add_entries<R>(
    transport: &R,
    entries: &[Entry],
    ec_address: &Address,
    options: AddOptions,
    batch: BatchOptions,
) -> Result<Vec<AddResult>>
where
    R: RpcTransport + ?Sized,
{
    add_all(transport, entries, ec_address, options, batch).await
}

pub async fn add_chains<R>(
    transport: &R,
    chains: &[Chain],
    ec_address: &Address,
    options: AddOptions,
    batch: BatchOptions,
) -> Result<Vec<AddResult>>
where
    R: RpcTransport + ?Sized,
{
    add_all(transport, chains, ec_address, options, batch).await
}

// ---------------------------------------------------------------------------
// Factoid transactions
// ---------------------------------------------------------------------------

/// Current Entry Credit rate in factoshis per EC.
pub async fn entry_credit_rate<R>(transport: &R) -> Result<u64>
where
    R: RpcTransport + ?Sized,
{
    let response: EntryCreditRateResponse =
        call_typed(transport, RpcMethod::EntryCreditRate, serde_json::Value::Null).await?;
    Ok(response.rate)
}

/// Submit a signed Factoid transaction and return its id.
///
/// Unless `options.force` is set, the fee paid must be at least the
/// required fee at the current EC rate and at most ten times that.
pub async fn send_transaction<R>(
    transport: &R,
    tx: &Transaction,
    options: SendTransactionOptions,
) -> Result<String>
where
    R: RpcTransport + ?Sized,
{
    if !tx.is_signed() {
        return Err(FactomError::UnsignedTransaction);
    }

    if !options.force {
        let rate = entry_credit_rate(transport).await?;
        let required = tx.compute_required_fees(rate, None)?;
        let paid = tx.fees_paid();
        if paid < required {
            return Err(FactomError::InsufficientFees { paid, required });
        }
        if paid > required.saturating_mul(MAX_FEE_MULTIPLIER) {
            return Err(FactomError::ExcessiveFees { paid, required });
        }
    }

    let params = json!({ "transaction": hex::encode(tx.marshal_binary()?) });
    let response: FactoidSubmitResponse =
        call_typed(transport, RpcMethod::FactoidSubmit, params).await?;
    let tx_id = if response.txid.is_empty() {
        tx.id_hex()
    } else {
        response.txid
    };
    info!(%tx_id, fees = tx.fees_paid(), "transaction submitted");

    if let Some(timeout) = options.ack.timeout() {
        let status = wait_on_factoid_transaction_ack(transport, &tx_id, timeout).await?;
        info!(%tx_id, %status, "transaction acknowledged");
    }
    Ok(tx_id)
}
