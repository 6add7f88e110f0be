//! # Cryptographic Primitives
//!
//! SHA-256, SHA-256d and SHA-512 digests plus Ed25519 key pairs and detached
//! signatures. Everything here is a thin, typed wrapper over `sha2` and
//! `ed25519-dalek`; the protocol-specific constructions (entry hash, weld,
//! RCD hash) are built from these in the modules that own them.

pub mod hash;
pub mod keys;
pub mod signatures;

pub use hash::{entry_hash, sha256, sha256_multi, sha256d, sha512};
pub use keys::FactomKeypair;
pub use signatures::{sign, verify_raw, SignatureError};
