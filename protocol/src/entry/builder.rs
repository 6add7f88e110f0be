//! Entry construction via the builder pattern.
//!
//! The [`EntryBuilder`] collects fields, and [`EntryBuilder::build`] checks
//! the payload limit before handing back an immutable [`Entry`]. To change
//! anything afterward, start a new builder with [`Entry::builder_from`].

use serde::{Deserialize, Serialize};

use crate::codec::{write_u16_len, ByteReader};
use crate::config::{
    ENTRY_HEADER_SIZE, ENTRY_VERSION, EXT_ID_LENGTH_PREFIX, FREE_BYTES_PER_EC, HASH_LENGTH,
    MAX_ENTRY_PAYLOAD_SIZE,
};
use crate::crypto::hash::entry_hash;
use crate::error::{FactomError, Result};

// ---------------------------------------------------------------------------
// BlockContext
// ---------------------------------------------------------------------------

/// Where an entry sits on the blockchain. Only entries read back from a node
/// carry this; freshly built entries leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Entry timestamp in seconds, as recorded by the entry block.
    pub entry_timestamp: u64,
    /// Height of the directory block that includes the entry block.
    pub directory_block_height: u32,
    /// Entry block timestamp in seconds.
    pub entry_block_timestamp: u64,
    /// Position of the entry block within its chain.
    pub entry_block_sequence_number: u32,
    /// KeyMR of the entry block, hex encoded.
    pub entry_block_key_mr: String,
}

// ---------------------------------------------------------------------------
// Entry
// ---------------------------------------------------------------------------

/// One immutable record appended to a chain.
///
/// The fields are private so an entry can only come out of a builder or a
/// decoder, both of which enforce the payload limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    chain_id: Option<[u8; 32]>,
    ext_ids: Vec<Vec<u8>>,
    content: Vec<u8>,
    timestamp: Option<u64>,
    block_context: Option<BlockContext>,
}

impl Entry {
    pub fn builder() -> EntryBuilder {
        EntryBuilder::default()
    }

    /// Start a new builder pre-filled with every field of `entry`.
    pub fn builder_from(entry: &Entry) -> EntryBuilder {
        EntryBuilder {
            chain_id: entry.chain_id,
            ext_ids: entry.ext_ids.clone(),
            content: entry.content.clone(),
            timestamp: entry.timestamp,
            block_context: entry.block_context.clone(),
        }
    }

    pub fn chain_id(&self) -> Option<&[u8; 32]> {
        self.chain_id.as_ref()
    }

    /// Hex chain id, empty when the entry has none yet.
    pub fn chain_id_hex(&self) -> String {
        self.chain_id.map(hex::encode).unwrap_or_default()
    }

    pub fn ext_ids(&self) -> &[Vec<u8>] {
        &self.ext_ids
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Milliseconds since the epoch, if the caller fixed one.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn block_context(&self) -> Option<&BlockContext> {
        self.block_context.as_ref()
    }

    /// Content length plus the length of every external id.
    pub fn raw_data_size(&self) -> usize {
        self.content.len() + self.ext_ids.iter().map(Vec::len).sum::<usize>()
    }

    /// Bytes the network bills for: raw data plus the 2-byte length prefix
    /// of every external id.
    pub fn payload_size(&self) -> usize {
        self.raw_data_size() + EXT_ID_LENGTH_PREFIX * self.ext_ids.len()
    }

    /// Full marshaled size including the 35-byte header.
    pub fn size(&self) -> usize {
        ENTRY_HEADER_SIZE + self.payload_size()
    }

    /// Bytes that can still be added without raising the Entry Credit cost.
    pub fn remaining_free_bytes(&self) -> usize {
        let size = self.payload_size();
        if size == 0 {
            return FREE_BYTES_PER_EC;
        }
        let rest = size % FREE_BYTES_PER_EC;
        if rest == 0 {
            0
        } else {
            FREE_BYTES_PER_EC - rest
        }
    }

    /// Bytes that can still be added before hitting the payload limit.
    pub fn remaining_max_bytes(&self) -> Result<usize> {
        let size = self.payload_size();
        MAX_ENTRY_PAYLOAD_SIZE
            .checked_sub(size)
            .ok_or(FactomError::SizeLimitExceeded {
                what: "entry payload",
                size,
                max: MAX_ENTRY_PAYLOAD_SIZE,
            })
    }

    /// Entry Credits needed to commit this entry: one per started kilobyte
    /// of payload, at least one.
    pub fn ec_cost(&self) -> Result<u8> {
        let size = self.payload_size();
        if size > MAX_ENTRY_PAYLOAD_SIZE {
            return Err(FactomError::SizeLimitExceeded {
                what: "entry payload",
                size,
                max: MAX_ENTRY_PAYLOAD_SIZE,
            });
        }
        let cost = size.div_ceil(FREE_BYTES_PER_EC).max(1);
        Ok(cost as u8)
    }

    /// The serialized external-ids block: each id behind its 2-byte length.
    fn marshal_ext_ids(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.payload_size() - self.content.len());
        for ext_id in &self.ext_ids {
            write_u16_len(&mut buf, ext_id.len(), "external id")?;
            buf.extend_from_slice(ext_id);
        }
        Ok(buf)
    }

    /// Wire encoding:
    /// `0x00 ‖ chainId(32) ‖ extIdsSize(2, BE) ‖ [len(2, BE) ‖ extId]* ‖ content`.
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        let chain_id = self.chain_id.ok_or(FactomError::MissingChainId)?;
        let ext_ids = self.marshal_ext_ids()?;

        let mut buf = Vec::with_capacity(self.size());
        buf.push(ENTRY_VERSION);
        buf.extend_from_slice(&chain_id);
        write_u16_len(&mut buf, ext_ids.len(), "external ids block")?;
        buf.extend_from_slice(&ext_ids);
        buf.extend_from_slice(&self.content);
        Ok(buf)
    }

    /// Decode a marshaled entry. The result carries no timestamp.
    pub fn unmarshal_binary(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data, "entry");

        let version = reader.u8()?;
        if version != ENTRY_VERSION {
            return Err(FactomError::malformed(
                "entry",
                format!("unsupported version {}", version),
            ));
        }
        let chain_id: [u8; HASH_LENGTH] = reader.take_array()?;

        let ext_ids_size = reader.u16_be()? as usize;
        let mut ext_reader = ByteReader::new(reader.take(ext_ids_size)?, "entry external ids");
        let mut ext_ids = Vec::new();
        while !ext_reader.is_empty() {
            let len = ext_reader.u16_be()? as usize;
            ext_ids.push(ext_reader.take(len)?.to_vec());
        }

        let entry = Self {
            chain_id: Some(chain_id),
            ext_ids,
            content: reader.rest().to_vec(),
            timestamp: None,
            block_context: None,
        };
        entry.remaining_max_bytes()?;
        Ok(entry)
    }

    /// `SHA-256(SHA-512(marshal) ‖ marshal)`.
    pub fn hash(&self) -> Result<[u8; 32]> {
        Ok(entry_hash(&self.marshal_binary()?))
    }

    pub fn hash_hex(&self) -> Result<String> {
        Ok(hex::encode(self.hash()?))
    }
}

// ---------------------------------------------------------------------------
// EntryBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Entry`].
///
/// ```
/// use factom_protocol::entry::Entry;
///
/// let entry = Entry::builder()
///     .chain_id_hex("954d5a49fd70d9b8bcdb35d252267829957f7ef7fa6c74f88419bdc5e82209f4")
///     .unwrap()
///     .ext_id_str("test")
///     .content_str("PayloadHere")
///     .build()
///     .unwrap();
/// assert_eq!(entry.payload_size(), 17);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntryBuilder {
    chain_id: Option<[u8; 32]>,
    ext_ids: Vec<Vec<u8>>,
    content: Vec<u8>,
    timestamp: Option<u64>,
    block_context: Option<BlockContext>,
}

impl EntryBuilder {
    pub fn chain_id(mut self, chain_id: [u8; 32]) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// Set the chain id from its 64-character hex form.
    pub fn chain_id_hex(self, chain_id: &str) -> Result<Self> {
        let bytes: [u8; 32] = hex::decode(chain_id)?.try_into().map_err(|_| {
            FactomError::InvalidArgument(format!("chain id {} is not 32 bytes", chain_id))
        })?;
        Ok(self.chain_id(bytes))
    }

    /// Append one external id. Order is significant.
    pub fn ext_id(mut self, ext_id: impl Into<Vec<u8>>) -> Self {
        self.ext_ids.push(ext_id.into());
        self
    }

    pub fn ext_id_str(self, ext_id: &str) -> Self {
        self.ext_id(ext_id.as_bytes())
    }

    /// Replace all external ids.
    pub fn ext_ids<I, T>(mut self, ext_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Vec<u8>>,
    {
        self.ext_ids = ext_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn content(mut self, content: impl Into<Vec<u8>>) -> Self {
        self.content = content.into();
        self
    }

    pub fn content_str(self, content: &str) -> Self {
        self.content(content.as_bytes())
    }

    /// Fix the commit timestamp (milliseconds since epoch). Without it the
    /// commit composer stamps the entry with the current time.
    pub fn timestamp(mut self, millis: u64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    pub fn block_context(mut self, context: BlockContext) -> Self {
        self.block_context = Some(context);
        self
    }

    /// Freeze the entry, failing if the payload exceeds 10240 bytes.
    pub fn build(self) -> Result<Entry> {
        let entry = Entry {
            chain_id: self.chain_id,
            ext_ids: self.ext_ids,
            content: self.content,
            timestamp: self.timestamp,
            block_context: self.block_context,
        };
        entry.remaining_max_bytes()?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAIN_ID: &str = "954d5a49fd70d9b8bcdb35d252267829957f7ef7fa6c74f88419bdc5e82209f4";

    fn sample_entry() -> Entry {
        Entry::builder()
            .chain_id_hex(CHAIN_ID)
            .unwrap()
            .ext_id_str("test")
            .content_str("PayloadHere")
            .build()
            .unwrap()
    }

    #[test]
    fn marshal_binary_known_vector() {
        let bytes = sample_entry().marshal_binary().unwrap();
        assert_eq!(
            hex::encode(bytes),
            "00954d5a49fd70d9b8bcdb35d252267829957f7ef7fa6c74f88419bdc5e82209f400060004746573745061796c6f616448657265"
        );
    }

    #[test]
    fn hash_known_vectors() {
        assert_eq!(
            sample_entry().hash_hex().unwrap(),
            "be705a58aea4230e99881f625e74cd085b6ef455b94ff144249b9a2f425e8f96"
        );

        let content_only = Entry::builder()
            .chain_id_hex(CHAIN_ID)
            .unwrap()
            .content_str("PayloadHere")
            .build()
            .unwrap();
        assert_eq!(
            content_only.hash_hex().unwrap(),
            "72177d733dcd0492066b79c5f3e417aef7f22909674f7dc351ca13b04742bb91"
        );
    }

    #[test]
    fn marshal_is_deterministic() {
        let entry = sample_entry();
        assert_eq!(entry.marshal_binary().unwrap(), entry.marshal_binary().unwrap());
        assert_eq!(entry.hash().unwrap(), entry.hash().unwrap());
    }

    #[test]
    fn marshal_without_chain_id_fails() {
        let entry = Entry::builder().content_str("orphan").build().unwrap();
        assert!(matches!(
            entry.marshal_binary(),
            Err(FactomError::MissingChainId)
        ));
        assert!(entry.hash().is_err());
        assert_eq!(entry.chain_id_hex(), "");
    }

    #[test]
    fn unmarshal_round_trip() {
        let entry = Entry::builder()
            .chain_id([0x11; 32])
            .ext_id(vec![0u8, 1, 2])
            .ext_id(Vec::new())
            .ext_id_str("third")
            .content(vec![0xff; 300])
            .build()
            .unwrap();
        let bytes = entry.marshal_binary().unwrap();
        let decoded = Entry::unmarshal_binary(&bytes).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(decoded.marshal_binary().unwrap(), bytes);
    }

    #[test]
    fn unmarshal_rejects_bad_input() {
        let bytes = sample_entry().marshal_binary().unwrap();
        assert!(Entry::unmarshal_binary(&bytes[..20]).is_err());

        let mut wrong_version = bytes.clone();
        wrong_version[0] = 1;
        assert!(Entry::unmarshal_binary(&wrong_version).is_err());

        // ext-ids block claims more bytes than it contains
        let mut overrun = bytes;
        overrun[34] = 0x07;
        assert!(Entry::unmarshal_binary(&overrun).is_err());
    }

    #[test]
    fn size_accounting() {
        let entry = sample_entry();
        assert_eq!(entry.raw_data_size(), 15);
        assert_eq!(entry.payload_size(), 17);
        assert_eq!(entry.size(), 52);
        assert_eq!(entry.remaining_free_bytes(), 1024 - 17);
        assert_eq!(entry.remaining_max_bytes().unwrap(), 10240 - 17);
        assert_eq!(entry.ec_cost().unwrap(), 1);
    }

    #[test]
    fn empty_entry_costs_one_and_has_full_free_bytes() {
        let entry = Entry::builder().chain_id([0; 32]).build().unwrap();
        assert_eq!(entry.payload_size(), 0);
        assert_eq!(entry.remaining_free_bytes(), 1024);
        assert_eq!(entry.ec_cost().unwrap(), 1);
        assert_eq!(entry.size(), 35);
    }

    #[test]
    fn cost_steps_per_kilobyte() {
        let at = |n: usize| {
            Entry::builder()
                .chain_id([0; 32])
                .content(vec![0u8; n])
                .build()
                .unwrap()
        };
        assert_eq!(at(1024).ec_cost().unwrap(), 1);
        assert_eq!(at(1024).remaining_free_bytes(), 0);
        assert_eq!(at(1025).ec_cost().unwrap(), 2);
        assert_eq!(at(1025).remaining_free_bytes(), 1023);
        assert_eq!(at(10_240).ec_cost().unwrap(), 10);
    }

    #[test]
    fn payload_limit_boundary() {
        // 10240 bytes of payload: one 4-byte ext id (6 with prefix) + content
        let exact = Entry::builder()
            .chain_id([0; 32])
            .ext_id(vec![1u8; 4])
            .content(vec![0u8; 10_240 - 6])
            .build()
            .unwrap();
        assert_eq!(exact.payload_size(), 10_240);
        assert_eq!(exact.remaining_max_bytes().unwrap(), 0);

        let over = Entry::builder()
            .chain_id([0; 32])
            .ext_id(vec![1u8; 4])
            .content(vec![0u8; 10_240 - 5])
            .build();
        assert!(matches!(
            over,
            Err(FactomError::SizeLimitExceeded { size: 10_241, .. })
        ));
    }

    #[test]
    fn builder_from_copies_every_field() {
        let entry = Entry::builder()
            .chain_id([3; 32])
            .ext_id_str("a")
            .content_str("b")
            .timestamp(42)
            .build()
            .unwrap();
        let copy = Entry::builder_from(&entry).build().unwrap();
        assert_eq!(copy, entry);

        let changed = Entry::builder_from(&entry).content_str("c").build().unwrap();
        assert_ne!(changed.hash().unwrap(), entry.hash().unwrap());
        assert_eq!(entry.content(), b"b");
    }

    #[test]
    fn ext_id_order_matters() {
        let ab = Entry::builder()
            .chain_id([0; 32])
            .ext_ids(["a", "b"])
            .build()
            .unwrap();
        let ba = Entry::builder()
            .chain_id([0; 32])
            .ext_ids(["b", "a"])
            .build()
            .unwrap();
        assert_ne!(ab.hash().unwrap(), ba.hash().unwrap());
    }

    #[test]
    fn chain_id_hex_rejects_wrong_length() {
        assert!(Entry::builder().chain_id_hex("abcd").is_err());
        assert!(Entry::builder().chain_id_hex("zz").is_err());
    }
}
