//! # Key Management
//!
//! Ed25519 key pairs as Factom uses them. Every private address (`Es...`,
//! `Fs...`) is nothing more than a 32-byte Ed25519 seed; every public Entry
//! Credit address is the matching 32-byte public key, and every public Factoid
//! address is the double SHA-256 of an RCD wrapping that key.
//!
//! Key bytes are never logged. `Debug` prints the public half only.

use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;
use std::fmt;

/// An Ed25519 key pair derived from a 32-byte seed.
///
/// Not `Serialize`. The seed is exported only through
/// [`seed`](Self::seed) or an [`Address`](crate::address::Address).
pub struct FactomKeypair {
    signing_key: SigningKey,
}

impl FactomKeypair {
    /// Generate a fresh key pair from the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Derive the key pair deterministically from a 32-byte seed.
    ///
    /// This is how private Factom addresses turn into signing keys.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// The 32-byte seed this key pair was derived from.
    pub fn seed(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Produce a detached 64-byte signature over `message`.
    ///
    /// Deterministic (RFC 8032): the same seed and message always give the
    /// same bytes, which is what makes the commit test vectors stable.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }
}

impl Clone for FactomKeypair {
    fn clone(&self) -> Self {
        Self::from_seed(&self.seed())
    }
}

impl fmt::Debug for FactomKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FactomKeypair(pub={})", hex::encode(self.public_key_bytes()))
    }
}

impl PartialEq for FactomKeypair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for FactomKeypair {}
