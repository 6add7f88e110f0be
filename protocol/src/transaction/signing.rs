//! Transaction signing and signature validation.
//!
//! Every input is authorised by an `(RCD, signature)` pair over the
//! transaction's signature scope (`marshal_binary_sig`). Pairs are either
//! produced here from private `Fs...` addresses or handed in by an external
//! signer, in which case they are checked before the transaction is built.

use tracing::debug;

use crate::address::Address;
use crate::error::{FactomError, Result};

use super::rcd::Rcd;
use super::types::TransactionAddress;

/// Sign `scope` once per input. Every input must be a private Factoid
/// address.
pub fn sign_inputs(scope: &[u8], inputs: &[TransactionAddress]) -> Result<Vec<(Rcd, [u8; 64])>> {
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let keypair = match &input.address {
                Address::FactoidPrivate(_) => input.address.keypair(),
                _ => None,
            }
            .ok_or_else(|| {
                FactomError::InconsistentSignatures(format!(
                    "input {} is not a private Factoid address",
                    i
                ))
            })?;
            let rcd = Rcd::type1(keypair.public_key_bytes());
            Ok((rcd, keypair.sign(scope)))
        })
        .collect()
}

/// Check externally supplied pairs against the inputs, in order.
///
/// Each RCD must hash to its input's address and each signature must verify
/// over `scope` under the RCD's key.
pub fn verify_rcd_signatures(
    scope: &[u8],
    inputs: &[TransactionAddress],
    pairs: &[(Rcd, [u8; 64])],
) -> Result<()> {
    if pairs.len() != inputs.len() {
        return Err(FactomError::InconsistentSignatures(format!(
            "{} RCD/signature pairs for {} inputs",
            pairs.len(),
            inputs.len()
        )));
    }

    for (i, (input, (rcd, signature))) in inputs.iter().zip(pairs).enumerate() {
        if rcd.hash() != input.address.public_key_bytes() {
            return Err(FactomError::InconsistentSignatures(format!(
                "RCD {} does not match input address {}",
                i,
                input.address.public()
            )));
        }
        if !rcd.verify(scope, signature) {
            return Err(FactomError::InvalidSignature(format!(
                "signature {} does not verify",
                i
            )));
        }
    }

    debug!(inputs = inputs.len(), "transaction signatures verified");
    Ok(())
}
