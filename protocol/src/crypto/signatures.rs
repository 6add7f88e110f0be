//! # Detached Signatures
//!
//! Signing and verification over the exact byte buffers the protocol
//! specifies: commit ledgers and transaction signature scopes. Callers hand
//! in raw wire bytes and get a typed error back, which is what the commit
//! composer and the transaction builder need when they check signatures
//! supplied by an external signer (a hardware wallet, typically).

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use thiserror::Error;

use super::keys::FactomKeypair;

/// Errors during signature operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature verification failed")]
    VerificationFailed,

    #[error("invalid public key")]
    InvalidPublicKey,
}

/// Sign `message` with the key pair. Thin wrapper so every signing path in
/// the crate goes through one function.
pub fn sign(keypair: &FactomKeypair, message: &[u8]) -> [u8; 64] {
    keypair.sign(message)
}

/// Verify a signature using raw byte components off the wire.
pub fn verify_raw(
    public_key_bytes: &[u8; 32],
    message: &[u8],
    signature_bytes: &[u8; 64],
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key_bytes).map_err(|_| SignatureError::InvalidPublicKey)?;

    let signature = DalekSignature::from_bytes(signature_bytes);

    verifying_key
        .verify(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_raw() {
        let kp = FactomKeypair::generate();
        let sig = sign(&kp, b"commit ledger");
        assert!(verify_raw(&kp.public_key_bytes(), b"commit ledger", &sig).is_ok());
    }

    #[test]
    fn test_wrong_message_fails() {
        let kp = FactomKeypair::generate();
        let sig = sign(&kp, b"correct message");
        assert_eq!(
            verify_raw(&kp.public_key_bytes(), b"wrong message", &sig),
            Err(SignatureError::VerificationFailed)
        );
    }

    #[test]
    fn test_wrong_key_fails() {
        let kp1 = FactomKeypair::generate();
        let kp2 = FactomKeypair::generate();
        let sig = sign(&kp1, b"test message");
        assert!(verify_raw(&kp2.public_key_bytes(), b"test message", &sig).is_err());
    }

    #[test]
    fn test_deterministic_signatures() {
        let kp = FactomKeypair::from_seed(&[9u8; 32]);
        assert_eq!(sign(&kp, b"same"), sign(&kp, b"same"));
    }

    #[test]
    fn test_empty_message() {
        let kp = FactomKeypair::generate();
        let sig = sign(&kp, b"");
        assert!(verify_raw(&kp.public_key_bytes(), b"", &sig).is_ok());
    }
}
