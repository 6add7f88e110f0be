//! # Protocol Configuration & Constants
//!
//! Every magic number of the Factom write protocol lives here. The values are
//! fixed by the network: a node rejects any commit or reveal that disagrees
//! with them, so none of these are tunables in the usual sense.
//!
//! The submission knobs that *are* tunable (ack timeouts, batch concurrency)
//! live in [`crate::network::submit`] as option structs with defaults taken
//! from the constants below.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Version byte that prefixes every marshaled entry and commit ledger.
pub const ENTRY_VERSION: u8 = 0x00;

/// Fixed entry header: 1 version byte + 32-byte chain id + 2-byte ext-ids size.
pub const ENTRY_HEADER_SIZE: usize = 35;

/// Length prefix carried by every external id on the wire.
pub const EXT_ID_LENGTH_PREFIX: usize = 2;

/// Largest payload (content + ext ids + their length prefixes) a node accepts.
pub const MAX_ENTRY_PAYLOAD_SIZE: usize = 10_240;

/// Each Entry Credit pays for this many payload bytes.
pub const FREE_BYTES_PER_EC: usize = 1_024;

/// Extra Entry Credits charged on top of the first entry when creating a chain.
pub const CHAIN_CREATION_COST: u8 = 10;

/// Size of a chain id, entry hash, public key, or RCD hash.
pub const HASH_LENGTH: usize = 32;

/// Ed25519 detached signature length.
pub const SIGNATURE_LENGTH: usize = 64;

/// Width of the millisecond timestamp field in ledgers and transactions.
pub const TIMESTAMP_LENGTH: usize = 6;

/// Entry commit ledger: version + timestamp + entry hash + cost.
pub const ENTRY_COMMIT_LEDGER_SIZE: usize = 1 + TIMESTAMP_LENGTH + HASH_LENGTH + 1;

/// Chain commit ledger: version + timestamp + chain id hash + weld + entry hash + cost.
pub const CHAIN_COMMIT_LEDGER_SIZE: usize = 1 + TIMESTAMP_LENGTH + 3 * HASH_LENGTH + 1;

/// Bytes appended to a ledger when it is signed: public key + signature.
pub const COMMIT_SIGNATURE_SUFFIX_SIZE: usize = HASH_LENGTH + SIGNATURE_LENGTH;

// ---------------------------------------------------------------------------
// Factoid transactions
// ---------------------------------------------------------------------------

/// Transaction format version written at the head of the signature scope.
pub const TRANSACTION_VERSION: u8 = 0x02;

/// Version + timestamp + three one-byte counts.
pub const TRANSACTION_HEADER_SIZE: usize = 1 + TIMESTAMP_LENGTH + 3;

/// Largest signed transaction a node accepts.
pub const MAX_TRANSACTION_SIZE: usize = 10_240;

/// Input/output counts are single bytes on the wire.
pub const MAX_TRANSACTION_ITEMS: usize = u8::MAX as usize;

/// The only redeem condition type in use: a single Ed25519 public key.
pub const RCD_TYPE_1: u8 = 0x01;

/// Serialized RCD type 1: type byte + public key.
pub const RCD_TYPE_1_SIZE: usize = 1 + HASH_LENGTH;

/// RCD type 1 plus its signature, as appended per input to a signed transaction.
pub const RCD_TYPE_1_SIGNATURE_BLOCK_SIZE: usize = RCD_TYPE_1_SIZE + SIGNATURE_LENGTH;

/// Entry Credits charged per output (Factoid or Entry Credit).
pub const FEE_PER_OUTPUT_EC: u64 = 10;

/// Entry Credits charged per started kilobyte of signed transaction.
pub const FEE_PER_KILOBYTE_EC: u64 = 1;

/// Entry Credits charged per signature.
pub const FEE_PER_SIGNATURE_EC: u64 = 1;

/// A transaction paying more than this multiple of the required fee is
/// refused unless the caller forces submission.
pub const MAX_FEE_MULTIPLIER: u64 = 10;

// ---------------------------------------------------------------------------
// Addresses
// ---------------------------------------------------------------------------

/// Decoded address length: 2-byte prefix + 32-byte key + 4-byte checksum.
pub const ADDRESS_LENGTH: usize = 38;

/// Checksum length at the tail of a decoded address.
pub const ADDRESS_CHECKSUM_LENGTH: usize = 4;

/// `EC...` public Entry Credit address.
pub const EC_PUBLIC_PREFIX: [u8; 2] = [0x59, 0x2a];

/// `Es...` private Entry Credit address.
pub const EC_PRIVATE_PREFIX: [u8; 2] = [0x5d, 0xb6];

/// `FA...` public Factoid address.
pub const FCT_PUBLIC_PREFIX: [u8; 2] = [0x5f, 0xb1];

/// `Fs...` private Factoid address.
pub const FCT_PRIVATE_PREFIX: [u8; 2] = [0x64, 0x78];

// ---------------------------------------------------------------------------
// Node interaction
// ---------------------------------------------------------------------------

/// Pause between two `ack` polls.
pub const ACK_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Default time to wait for a commit acknowledgment.
pub const DEFAULT_COMMIT_ACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time to wait for a reveal acknowledgment.
pub const DEFAULT_REVEAL_ACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Default time to wait for a Factoid transaction acknowledgment.
pub const DEFAULT_TRANSACTION_ACK_TIMEOUT: Duration = Duration::from_secs(60);

/// JSON-RPC error code a node returns when the commit already exists.
pub const REPEATED_COMMIT_ERROR_CODE: i64 = -32011;

/// Message paired with [`REPEATED_COMMIT_ERROR_CODE`].
pub const REPEATED_COMMIT_MESSAGE: &str = "Repeated Commit";

/// Pseudo chain id the `ack` method uses for entry/chain commits.
pub const ACK_COMMIT_CHAIN_ID: &str = "c";

/// Pseudo chain id the `ack` method uses for Factoid transactions.
pub const ACK_FACTOID_CHAIN_ID: &str = "f";
