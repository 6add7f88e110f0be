//! Commit composition: the signed, paid half of the two-phase write.
//!
//! A commit is a short *ledger* naming what will be revealed and how many
//! Entry Credits it costs, followed by the paying key and its signature:
//!
//! ```text
//! entry commit  (40 B)  00 ‖ ts(6) ‖ entryHash(32) ‖ ecCost(1)
//! chain commit (104 B)  00 ‖ ts(6) ‖ SHA256d(chainId)(32)
//!                          ‖ SHA256d(entryHash ‖ chainId)(32)   -- the weld
//!                          ‖ entryHash(32) ‖ (ecCost + 10)(1)
//! wire payload          ledger ‖ publicKey(32) ‖ signature(64)
//! ```
//!
//! The commit transaction id is `SHA-256(ledger)`, so it can be predicted
//! before anything is sent. The timestamp is resolved once per composition;
//! the ledger that is signed and the id that is returned always agree.

use chrono::Utc;
use tracing::debug;

use crate::address::Address;
use crate::codec::write_timestamp;
use crate::config::{
    CHAIN_COMMIT_LEDGER_SIZE, CHAIN_CREATION_COST, COMMIT_SIGNATURE_SUFFIX_SIZE,
    ENTRY_COMMIT_LEDGER_SIZE, ENTRY_VERSION,
};
use crate::crypto::hash::{sha256, sha256d, sha256_multi};
use crate::crypto::signatures::{sign, verify_raw};
use crate::error::{FactomError, Result};

use super::builder::Entry;
use super::chain::Chain;

/// Current wall-clock time in milliseconds.
pub(crate) fn now_millis() -> u64 {
    Utc::now().timestamp_millis() as u64
}

// ---------------------------------------------------------------------------
// Commitable
// ---------------------------------------------------------------------------

/// Something that can be paid for with a commit and then revealed.
///
/// Implemented by [`Entry`] (commit-entry / reveal-entry) and [`Chain`]
/// (commit-chain / reveal-chain).
pub trait Commitable {
    /// The unsigned ledger for a commit stamped at `timestamp` ms.
    fn commit_ledger(&self, timestamp: u64) -> Result<Vec<u8>>;

    /// Bytes sent in the reveal call.
    fn reveal(&self) -> Result<Vec<u8>>;

    /// Timestamp fixed by the caller, if any.
    fn fixed_timestamp(&self) -> Option<u64>;

    /// Hash of the entry being revealed.
    fn entry_hash(&self) -> Result<[u8; 32]>;

    /// Chain the entry lands in.
    fn target_chain_id(&self) -> Result<[u8; 32]>;

    /// Timestamp to stamp a commit with: the fixed one, or now.
    fn resolve_timestamp(&self) -> u64 {
        self.fixed_timestamp().unwrap_or_else(now_millis)
    }
}

impl Commitable for Entry {
    fn commit_ledger(&self, timestamp: u64) -> Result<Vec<u8>> {
        let cost = self.ec_cost()?;
        let hash = self.hash()?;

        let mut ledger = Vec::with_capacity(ENTRY_COMMIT_LEDGER_SIZE);
        ledger.push(ENTRY_VERSION);
        write_timestamp(&mut ledger, timestamp);
        ledger.extend_from_slice(&hash);
        ledger.push(cost);
        Ok(ledger)
    }

    fn reveal(&self) -> Result<Vec<u8>> {
        self.marshal_binary()
    }

    fn fixed_timestamp(&self) -> Option<u64> {
        self.timestamp()
    }

    fn entry_hash(&self) -> Result<[u8; 32]> {
        self.hash()
    }

    fn target_chain_id(&self) -> Result<[u8; 32]> {
        self.chain_id().copied().ok_or(FactomError::MissingChainId)
    }
}

impl Commitable for Chain {
    fn commit_ledger(&self, timestamp: u64) -> Result<Vec<u8>> {
        let entry = self.first_entry();
        let cost = entry.ec_cost()? + CHAIN_CREATION_COST;
        let hash = entry.hash()?;
        let chain_id = self.id();

        let mut ledger = Vec::with_capacity(CHAIN_COMMIT_LEDGER_SIZE);
        ledger.push(ENTRY_VERSION);
        write_timestamp(&mut ledger, timestamp);
        ledger.extend_from_slice(&sha256d(chain_id));
        ledger.extend_from_slice(&weld(&hash, chain_id));
        ledger.extend_from_slice(&hash);
        ledger.push(cost);
        Ok(ledger)
    }

    fn reveal(&self) -> Result<Vec<u8>> {
        self.first_entry().marshal_binary()
    }

    fn fixed_timestamp(&self) -> Option<u64> {
        self.first_entry().timestamp()
    }

    fn entry_hash(&self) -> Result<[u8; 32]> {
        self.first_entry().hash()
    }

    fn target_chain_id(&self) -> Result<[u8; 32]> {
        Ok(*self.id())
    }
}

/// `SHA256d(entryHash ‖ chainId)`: binds the commit to one chain.
pub fn weld(entry_hash: &[u8; 32], chain_id: &[u8; 32]) -> [u8; 32] {
    sha256(&sha256_multi(&[entry_hash.as_slice(), chain_id.as_slice()]))
}

// ---------------------------------------------------------------------------
// CommitMessage
// ---------------------------------------------------------------------------

/// A signed commit ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    ledger: Vec<u8>,
    public_key: [u8; 32],
    signature: [u8; 64],
}

impl CommitMessage {
    pub fn ledger(&self) -> &[u8] {
        &self.ledger
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }

    /// `SHA-256(ledger)`, the id the node assigns to the commit.
    pub fn tx_id(&self) -> [u8; 32] {
        sha256(&self.ledger)
    }

    pub fn tx_id_hex(&self) -> String {
        hex::encode(self.tx_id())
    }

    /// `ledger ‖ publicKey ‖ signature`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.ledger.len() + COMMIT_SIGNATURE_SUFFIX_SIZE);
        out.extend_from_slice(&self.ledger);
        out.extend_from_slice(&self.public_key);
        out.extend_from_slice(&self.signature);
        out
    }

    pub fn hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Sign `ledger` with a private EC address, or check an external signature
/// made by a public EC address.
pub fn compose_commit(
    ledger: Vec<u8>,
    ec_address: &Address,
    signature: Option<&[u8; 64]>,
) -> Result<CommitMessage> {
    match ec_address {
        Address::EntryCreditPrivate(seed) => {
            let keypair = crate::crypto::FactomKeypair::from_seed(seed);
            let signature = sign(&keypair, &ledger);
            Ok(CommitMessage {
                ledger,
                public_key: keypair.public_key_bytes(),
                signature,
            })
        }
        Address::EntryCreditPublic(public_key) => {
            let signature = signature.ok_or_else(|| {
                FactomError::InvalidArgument(
                    "a public EC address needs an externally supplied signature".into(),
                )
            })?;
            verify_raw(public_key, &ledger, signature).map_err(|e| {
                FactomError::InvalidSignature(format!("commit signature: {}", e))
            })?;
            Ok(CommitMessage {
                ledger,
                public_key: *public_key,
                signature: *signature,
            })
        }
        other => Err(FactomError::InvalidAddress(format!(
            "{} is not an Entry Credit address",
            other.public()
        ))),
    }
}

/// Compose and sign the commit for `obj` with a private EC address. Objects
/// without a fixed timestamp are stamped with the current time.
pub fn compose_signed_commit<T: Commitable + ?Sized>(
    obj: &T,
    ec_address: &Address,
) -> Result<CommitMessage> {
    if !matches!(ec_address, Address::EntryCreditPrivate(_)) {
        return Err(FactomError::InvalidAddress(format!(
            "{:?} cannot sign; use a private EC address or supply a signature",
            ec_address
        )));
    }
    let timestamp = obj.resolve_timestamp();
    let commit = compose_commit(obj.commit_ledger(timestamp)?, ec_address, None)?;
    debug!(
        tx_id = %commit.tx_id_hex(),
        timestamp,
        size = commit.ledger().len() + COMMIT_SIGNATURE_SUFFIX_SIZE,
        "commit composed"
    );
    Ok(commit)
}

/// Attach an externally produced signature to the commit for `obj`.
///
/// The external signer signed a ledger with a specific timestamp, so `obj`
/// must carry that timestamp; an unfixed one is rejected up front rather
/// than surfacing later as a signature mismatch.
pub fn compose_commit_with_signature<T: Commitable + ?Sized>(
    obj: &T,
    public_ec_address: &Address,
    signature: &[u8; 64],
) -> Result<CommitMessage> {
    let timestamp = obj.fixed_timestamp().ok_or_else(|| {
        FactomError::InvalidArgument(
            "externally signed commits require an explicit timestamp".into(),
        )
    })?;
    compose_commit(
        obj.commit_ledger(timestamp)?,
        public_ec_address,
        Some(signature),
    )
}

/// Entry commit signed with a private EC address.
pub fn compose_entry_commit(entry: &Entry, ec_address: &Address) -> Result<CommitMessage> {
    compose_signed_commit(entry, ec_address)
}

/// Chain commit signed with a private EC address.
pub fn compose_chain_commit(chain: &Chain, ec_address: &Address) -> Result<CommitMessage> {
    compose_signed_commit(chain, ec_address)
}

/// The reveal payload for an entry or chain.
pub fn compose_reveal<T: Commitable + ?Sized>(obj: &T) -> Result<Vec<u8>> {
    obj.reveal()
}

/// Predict the commit transaction id.
///
/// Only stable when the object carries a fixed timestamp.
pub fn compute_tx_id<T: Commitable + ?Sized>(obj: &T) -> Result<[u8; 32]> {
    Ok(sha256(&obj.commit_ledger(obj.resolve_timestamp())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FactomKeypair;

    const ES: &str = "Es2d1a3uPx7o5uXHmsCnSEK2EKatPA56n8RUFmW9uRrpPRBuk5bZ";
    const EC: &str = "EC2UFobcsWom2NvyNDN67Q8eTdpCQvwYe327ZeGTLXbYaZ56e9QR";

    fn chain() -> Chain {
        Chain::new(
            Entry::builder()
                .ext_id_str("my ext id 1784465577795")
                .content_str("first")
                .timestamp(1_523_227_752_000)
                .build()
                .unwrap(),
        )
        .unwrap()
    }

    fn entry() -> Entry {
        chain().first_entry().clone()
    }

    #[test]
    fn chain_commit_known_vector() {
        let commit = compose_chain_commit(&chain(), &Address::parse(ES).unwrap()).unwrap();
        assert_eq!(commit.ledger().len(), CHAIN_COMMIT_LEDGER_SIZE);
        assert_eq!(commit.to_bytes().len(), 200);
        assert_eq!(
            commit.hex(),
            "000162a772f640448ee02e500a8e539bcf5c02e53f8b88fc1f81f0a87d0f18af94ab9384992b5c897aadca09d80a584bd25fc5b6e3e79d5d429035556c77dfd1dcb07cfc77e4d66be488b13f0eaf417875e66b3b65af2dac4985952fe5909cf479f88b7a7067fc0b5d54e4b02234a10b542573645f7ba55650f25eb931985cddcf451df77594b5b619edd5b844b0fdb9f573d5d8f973cfcc65a301009a940a86cc043ed5f7c6fb3cb30dee4cdbd7ccff10e950d8d6e6105f65347d43740ec6006ab43f958a24a00d"
        );
        assert_eq!(
            commit.tx_id_hex(),
            "a234cfcbc40062237e279afbed6c3cd9d5ac7fd89eb4e0ef553fc6f1b561ce4b"
        );
    }

    #[test]
    fn chain_commit_is_stable_with_fixed_timestamp() {
        let ec = Address::parse(ES).unwrap();
        let a = compose_chain_commit(&chain(), &ec).unwrap();
        let b = compose_chain_commit(&chain(), &ec).unwrap();
        assert_eq!(a, b);
        assert_eq!(compute_tx_id(&chain()).unwrap(), a.tx_id());
    }

    #[test]
    fn entry_commit_known_vector() {
        let commit = compose_entry_commit(&entry(), &Address::parse(ES).unwrap()).unwrap();
        assert_eq!(commit.ledger().len(), ENTRY_COMMIT_LEDGER_SIZE);
        assert_eq!(
            commit.hex(),
            "000162a772f6406be488b13f0eaf417875e66b3b65af2dac4985952fe5909cf479f88b7a7067fc015d54e4b02234a10b542573645f7ba55650f25eb931985cddcf451df77594b5b6c43f4743a510a5b3c3eaf4ea23f064e8b4e61c3806c66527e04b51817108d1e3d7dd53ec4bd1f8cc009f22c2918d544e3f0b4ef0bafd309a645f2844f30e220c"
        );
        assert_eq!(
            hex::encode(compute_tx_id(&entry()).unwrap()),
            "30cf6d30c0e07826fba4c868ed8781189d50e4e9c52695a788471c39fc1c8d90"
        );
    }

    #[test]
    fn entry_ledger_is_prefix_of_chain_shape() {
        let ledger = entry().commit_ledger(1_523_227_752_000).unwrap();
        assert_eq!(ledger[0], ENTRY_VERSION);
        assert_eq!(&ledger[7..39], &entry().hash().unwrap());
        assert_eq!(ledger[39], 1);

        let chain_ledger = chain().commit_ledger(1_523_227_752_000).unwrap();
        assert_eq!(&ledger[..7], &chain_ledger[..7]);
        assert_eq!(chain_ledger[103], 11);
    }

    #[test]
    fn reveal_is_first_entry_marshal() {
        assert_eq!(
            hex::encode(compose_reveal(&chain()).unwrap()),
            "00fcfe632c6ab1a7c71448e256e0487c4cfc34ceac90e997de8c4fdf8485e9a0fd001900176d792065787420696420313738343436353537373739356669727374"
        );
        assert_eq!(
            compose_reveal(&entry()).unwrap(),
            entry().marshal_binary().unwrap()
        );
    }

    #[test]
    fn external_signature_is_verified() {
        let private = Address::parse(ES).unwrap();
        let public = Address::parse(EC).unwrap();
        let ledger = chain().commit_ledger(1_523_227_752_000).unwrap();
        let signature = private.keypair().unwrap().sign(&ledger);

        let commit = compose_commit_with_signature(&chain(), &public, &signature).unwrap();
        assert_eq!(
            commit,
            compose_chain_commit(&chain(), &private).unwrap()
        );
    }

    #[test]
    fn external_signature_mismatch_fails() {
        let public = Address::parse(EC).unwrap();
        let other = FactomKeypair::generate();
        let ledger = entry().commit_ledger(1_523_227_752_000).unwrap();
        let signature = other.sign(&ledger);

        assert!(matches!(
            compose_commit_with_signature(&entry(), &public, &signature),
            Err(FactomError::InvalidSignature(_))
        ));
    }

    #[test]
    fn external_signature_requires_fixed_timestamp() {
        let unfixed = Entry::builder()
            .chain_id([1; 32])
            .content_str("x")
            .build()
            .unwrap();
        let public = Address::parse(EC).unwrap();
        assert!(matches!(
            compose_commit_with_signature(&unfixed, &public, &[0u8; 64]),
            Err(FactomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn public_address_without_signature_fails() {
        let public = Address::parse(EC).unwrap();
        assert!(compose_entry_commit(&entry(), &public).is_err());
        let ledger = entry().commit_ledger(0).unwrap();
        assert!(matches!(
            compose_commit(ledger, &public, None),
            Err(FactomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn rejected_private_address_is_not_echoed() {
        let fs = Address::FactoidPrivate([9; 32]);
        let ledger = entry().commit_ledger(0).unwrap();
        let message = compose_commit(ledger, &fs, None).unwrap_err().to_string();
        assert!(!message.contains(&fs.to_string()));
        assert!(message.contains(&fs.public().to_string()));
    }

    #[test]
    fn factoid_address_is_rejected() {
        let fct = Address::FactoidPrivate([1; 32]);
        let ledger = entry().commit_ledger(0).unwrap();
        assert!(matches!(
            compose_commit(ledger, &fct, None),
            Err(FactomError::InvalidAddress(_))
        ));
    }

    #[test]
    fn unfixed_timestamp_defaults_to_now() {
        let unfixed = Entry::builder()
            .chain_id([1; 32])
            .content_str("x")
            .build()
            .unwrap();
        let before = now_millis();
        let commit = compose_entry_commit(&unfixed, &Address::parse(ES).unwrap()).unwrap();
        let after = now_millis();

        let mut ts = [0u8; 8];
        ts[2..].copy_from_slice(&commit.ledger()[1..7]);
        let ts = u64::from_be_bytes(ts);
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn weld_binds_entry_to_chain() {
        let hash = [1u8; 32];
        assert_ne!(weld(&hash, &[2u8; 32]), weld(&hash, &[3u8; 32]));
    }
}
