//! # Hashing Utilities
//!
//! The digests the Factom wire format is built from. There are exactly three
//! and none of them is negotiable:
//!
//! - **SHA-256**: chain ids, transaction ids, commit transaction ids.
//! - **SHA-256d** (`SHA-256(SHA-256(x))`): RCD hashes, address checksums,
//!   and the chain-id / weld fields of a chain commit.
//! - **SHA-512**: only as the inner half of the entry hash
//!   `SHA-256(SHA-512(data) ‖ data)`.

use sha2::{Digest, Sha256, Sha512};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use factom_protocol::crypto::sha256;
///
/// let hash = sha256(b"factom");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Compute SHA-256 over several slices without concatenating them first.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Compute the double-SHA-256 hash: `SHA-256(SHA-256(data))`.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// Compute the SHA-512 hash of the input data.
pub fn sha512(data: &[u8]) -> [u8; 64] {
    let mut hasher = Sha512::new();
    hasher.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Hash a marshaled entry: `SHA-256(SHA-512(data) ‖ data)`.
///
/// Plain SHA-256 of the entry bytes would be shorter, but the network
/// addresses entries by this construction and nothing else.
pub fn entry_hash(marshaled: &[u8]) -> [u8; 32] {
    let inner = sha512(marshaled);
    sha256_multi(&[inner.as_slice(), marshaled])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn sha256d_is_sha256_twice() {
        let single = sha256(b"factom");
        assert_eq!(sha256d(b"factom"), sha256(&single));
        assert_ne!(single, sha256d(b"factom"));
    }

    #[test]
    fn test_sha512_known_vector() {
        let hash = sha512(b"abc");
        assert_eq!(
            hex::encode(&hash[..16]),
            "ddaf35a193617abacc417349ae204131"
        );
    }

    #[test]
    fn sha256_multi_equals_concatenation() {
        assert_eq!(sha256_multi(&[b"hello".as_slice(), b" world".as_slice()]), sha256(b"hello world"));
    }

    #[test]
    fn entry_hash_known_vector() {
        // Content-only entry on chain 954d5a49...
        let marshaled = hex::decode(
            "00954d5a49fd70d9b8bcdb35d252267829957f7ef7fa6c74f88419bdc5e82209f400005061796c6f616448657265",
        )
        .unwrap();
        assert_eq!(
            hex::encode(entry_hash(&marshaled)),
            "72177d733dcd0492066b79c5f3e417aef7f22909674f7dc351ca13b04742bb91"
        );
    }
}
