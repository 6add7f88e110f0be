//! Redeem Condition Datums.
//!
//! An RCD states what it takes to spend a Factoid address. The address itself
//! is `SHA256d(rcd)`, so a spender reveals the RCD next to a signature and the
//! network checks both. Only type 1 (`0x01 ‖ ed25519 public key`) exists in
//! practice, and it is the only type this crate encodes or decodes.

use std::fmt;

use crate::codec::ByteReader;
use crate::config::{RCD_TYPE_1, RCD_TYPE_1_SIZE};
use crate::crypto::hash::sha256d;
use crate::crypto::signatures::verify_raw;
use crate::error::{FactomError, Result};

/// A type 1 RCD: a single Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rcd {
    public_key: [u8; 32],
}

impl Rcd {
    pub fn type1(public_key: [u8; 32]) -> Self {
        Self { public_key }
    }

    /// Parse the serialized form (`0x01 ‖ key`).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(bytes, "rcd");
        let rcd = Self::read(&mut reader)?;
        if !reader.is_empty() {
            return Err(FactomError::malformed("rcd", "trailing bytes"));
        }
        Ok(rcd)
    }

    pub(crate) fn read(reader: &mut ByteReader<'_>) -> Result<Self> {
        let rcd_type = reader.u8()?;
        if rcd_type != RCD_TYPE_1 {
            return Err(FactomError::malformed(
                "rcd",
                format!("unsupported RCD type {}", rcd_type),
            ));
        }
        Ok(Self::type1(reader.take_array()?))
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.public_key
    }

    pub fn to_bytes(&self) -> [u8; RCD_TYPE_1_SIZE] {
        let mut out = [0u8; RCD_TYPE_1_SIZE];
        out[0] = RCD_TYPE_1;
        out[1..].copy_from_slice(&self.public_key);
        out
    }

    /// `SHA256d(rcd)`: the 32 bytes inside a public Factoid address.
    pub fn hash(&self) -> [u8; 32] {
        sha256d(&self.to_bytes())
    }

    /// Check that `signature` signs `message` under this RCD's key.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        verify_raw(&self.public_key, message, signature).is_ok()
    }
}

impl fmt::Debug for Rcd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rcd1({})", hex::encode(self.public_key))
    }
}
