//! Acknowledgment polling.
//!
//! After a commit, reveal or Factoid transaction is accepted, the node's
//! `ack` method reports how far it has travelled. The waiter polls every
//! [`ACK_POLL_INTERVAL`] until the status leaves `Unknown` / `NotConfirmed`
//! or the deadline passes.
//!
//! Polls are strictly sequential: the next request is only sent after the
//! previous one resolved. The deadline also bounds a poll still in flight.

use std::time::Duration;

use serde_json::json;
use tokio::time::{sleep, timeout_at, Instant};
use tracing::debug;

use super::rpc::{call_typed, AckField, AckResponse, RpcMethod, RpcTransport};
use crate::config::{ACK_COMMIT_CHAIN_ID, ACK_FACTOID_CHAIN_ID, ACK_POLL_INTERVAL};
use crate::error::{FactomError, Result};

/// Statuses that mean "ask again later".
const PENDING_STATUSES: [&str; 2] = ["Unknown", "NotConfirmed"];

pub fn is_pending_status(status: &str) -> bool {
    PENDING_STATUSES.contains(&status)
}

/// Poll `ack(hash, chain_id)` until the status selected by `field` is
/// terminal, and return that status.
///
/// A missing status block counts as pending. Transport errors end the wait
/// immediately and are returned unchanged. A poll that has not answered by
/// the deadline is abandoned with [`FactomError::AckTimeout`].
pub async fn wait_on_ack<R>(
    transport: &R,
    hash: &str,
    chain_id: &str,
    field: Option<AckField>,
    timeout: Duration,
) -> Result<String>
where
    R: RpcTransport + ?Sized,
{
    let deadline = Instant::now() + timeout;
    let params = json!({ "hash": hash, "chainid": chain_id });
    let mut polls = 0u32;

    let timed_out = || FactomError::AckTimeout {
        hash: hash.to_string(),
        timeout,
    };

    loop {
        let ack: AckResponse =
            timeout_at(deadline, call_typed(transport, RpcMethod::Ack, params.clone()))
                .await
                .map_err(|_| timed_out())??;
        polls += 1;

        let status = ack.status_of(field);
        debug!(hash, chain_id, polls, status = ?status, "ack poll");
        if let Some(status) = status.filter(|s| !is_pending_status(s)) {
            return Ok(status.to_string());
        }

        if Instant::now() >= deadline {
            return Err(timed_out());
        }
        sleep(ACK_POLL_INTERVAL).await;
    }
}

/// Wait for an entry or chain commit, keyed by its commit tx id.
pub async fn wait_on_commit_ack<R>(transport: &R, tx_id: &str, timeout: Duration) -> Result<String>
where
    R: RpcTransport + ?Sized,
{
    wait_on_ack(
        transport,
        tx_id,
        ACK_COMMIT_CHAIN_ID,
        Some(AckField::CommitData),
        timeout,
    )
    .await
}

/// Wait for a reveal, keyed by entry hash and the chain it was written to.
pub async fn wait_on_reveal_ack<R>(
    transport: &R,
    entry_hash: &str,
    chain_id: &str,
    timeout: Duration,
) -> Result<String>
where
    R: RpcTransport + ?Sized,
{
    wait_on_ack(
        transport,
        entry_hash,
        chain_id,
        Some(AckField::EntryData),
        timeout,
    )
    .await
}

/// Wait for a Factoid transaction. Its ack carries a flat status.
pub async fn wait_on_factoid_transaction_ack<R>(
    transport: &R,
    tx_id: &str,
    timeout: Duration,
) -> Result<String>
where
    R: RpcTransport + ?Sized,
{
    wait_on_ack(transport, tx_id, ACK_FACTOID_CHAIN_ID, None, timeout).await
}
