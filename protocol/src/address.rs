//! # Addresses
//!
//! Factom's human-readable addresses: base58 over
//! `prefix(2) ‖ key(32) ‖ checksum(4)`, where the checksum is the first four
//! bytes of `SHA256d(prefix ‖ key)`. The prefix bytes are chosen so that the
//! text always starts with `EC`, `Es`, `FA` or `Fs`.
//!
//! An [`Address`] is parsed once at the API boundary. Past that point the
//! codec works with the variant and its 32 bytes and never looks at the text
//! again.

use std::fmt;
use std::str::FromStr;

use crate::config::{
    ADDRESS_CHECKSUM_LENGTH, ADDRESS_LENGTH, EC_PRIVATE_PREFIX, EC_PUBLIC_PREFIX,
    FCT_PRIVATE_PREFIX, FCT_PUBLIC_PREFIX,
};
use crate::crypto::hash::sha256d;
use crate::crypto::keys::FactomKeypair;
use crate::error::{FactomError, Result};
use crate::transaction::rcd::Rcd;

/// A decoded Factom address.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// `EC...`: an Ed25519 public key that holds Entry Credits.
    EntryCreditPublic([u8; 32]),
    /// `Es...`: the seed behind an Entry Credit address.
    EntryCreditPrivate([u8; 32]),
    /// `FA...`: the RCD hash that holds Factoids.
    FactoidPublic([u8; 32]),
    /// `Fs...`: the seed behind a Factoid address.
    FactoidPrivate([u8; 32]),
}

impl Address {
    /// Parse and checksum-verify an address string.
    pub fn parse(text: &str) -> Result<Self> {
        let raw = bs58::decode(text)
            .into_vec()
            .map_err(|e| FactomError::InvalidAddress(format!("{}: {}", text, e)))?;
        if raw.len() != ADDRESS_LENGTH {
            return Err(FactomError::InvalidAddress(format!(
                "{}: decodes to {} bytes, expected {}",
                text,
                raw.len(),
                ADDRESS_LENGTH
            )));
        }

        let (body, checksum) = raw.split_at(ADDRESS_LENGTH - ADDRESS_CHECKSUM_LENGTH);
        if sha256d(body)[..ADDRESS_CHECKSUM_LENGTH] != *checksum {
            return Err(FactomError::InvalidAddress(format!("{}: bad checksum", text)));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&body[2..]);
        let prefix = [body[0], body[1]];
        match prefix {
            EC_PUBLIC_PREFIX => Ok(Self::EntryCreditPublic(key)),
            EC_PRIVATE_PREFIX => Ok(Self::EntryCreditPrivate(key)),
            FCT_PUBLIC_PREFIX => Ok(Self::FactoidPublic(key)),
            FCT_PRIVATE_PREFIX => Ok(Self::FactoidPrivate(key)),
            _ => Err(FactomError::InvalidAddress(format!(
                "{}: unknown prefix {}",
                text,
                hex::encode(prefix)
            ))),
        }
    }

    /// Public Factoid address of the RCD type 1 wrapping `public_key`.
    pub fn factoid_from_public_key(public_key: &[u8; 32]) -> Self {
        Self::FactoidPublic(Rcd::type1(*public_key).hash())
    }

    /// Fresh random Entry Credit private address.
    pub fn generate_entry_credit() -> Self {
        Self::EntryCreditPrivate(FactomKeypair::generate().seed())
    }

    /// Fresh random Factoid private address.
    pub fn generate_factoid() -> Self {
        Self::FactoidPrivate(FactomKeypair::generate().seed())
    }

    fn prefix(&self) -> [u8; 2] {
        match self {
            Self::EntryCreditPublic(_) => EC_PUBLIC_PREFIX,
            Self::EntryCreditPrivate(_) => EC_PRIVATE_PREFIX,
            Self::FactoidPublic(_) => FCT_PUBLIC_PREFIX,
            Self::FactoidPrivate(_) => FCT_PRIVATE_PREFIX,
        }
    }

    /// The 32 bytes between prefix and checksum.
    pub fn key_bytes(&self) -> &[u8; 32] {
        match self {
            Self::EntryCreditPublic(k)
            | Self::EntryCreditPrivate(k)
            | Self::FactoidPublic(k)
            | Self::FactoidPrivate(k) => k,
        }
    }

    pub fn is_private(&self) -> bool {
        matches!(self, Self::EntryCreditPrivate(_) | Self::FactoidPrivate(_))
    }

    pub fn is_entry_credit(&self) -> bool {
        matches!(self, Self::EntryCreditPublic(_) | Self::EntryCreditPrivate(_))
    }

    pub fn is_factoid(&self) -> bool {
        !self.is_entry_credit()
    }

    /// Signing key pair for private addresses, `None` for public ones.
    pub fn keypair(&self) -> Option<FactomKeypair> {
        match self {
            Self::EntryCreditPrivate(seed) | Self::FactoidPrivate(seed) => {
                Some(FactomKeypair::from_seed(seed))
            }
            _ => None,
        }
    }

    /// The public address matching this one. Public addresses map to
    /// themselves.
    pub fn public(&self) -> Self {
        match self {
            Self::EntryCreditPrivate(seed) => {
                Self::EntryCreditPublic(FactomKeypair::from_seed(seed).public_key_bytes())
            }
            Self::FactoidPrivate(seed) => {
                Self::factoid_from_public_key(&FactomKeypair::from_seed(seed).public_key_bytes())
            }
            public => public.clone(),
        }
    }

    /// The 32 bytes this address contributes to a transaction: the RCD hash
    /// for Factoid addresses, the public key for Entry Credit addresses.
    pub fn public_key_bytes(&self) -> [u8; 32] {
        *self.public().key_bytes()
    }

    /// Base58-check text form.
    pub fn encode(&self) -> String {
        let mut raw = Vec::with_capacity(ADDRESS_LENGTH);
        raw.extend_from_slice(&self.prefix());
        raw.extend_from_slice(self.key_bytes());
        let checksum = sha256d(&raw);
        raw.extend_from_slice(&checksum[..ADDRESS_CHECKSUM_LENGTH]);
        bs58::encode(raw).into_string()
    }
}

impl FromStr for Address {
    type Err = FactomError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.encode())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_private() {
            write!(f, "Address({})", self.public().encode())
        } else {
            write!(f, "Address({})", self.encode())
        }
    }
}
