//! Transaction fee computation.
//!
//! The network charges, in Entry Credits:
//!
//! ```text
//! ceil(size / 1024) + 10 × (#fct_outputs + #ec_outputs) + #signatures
//! ```
//!
//! and the EC rate (factoshis per EC) converts that into factoshis. The size
//! is that of the signed encoding, so fees of an unsigned transaction need
//! to know how large the signature section will be.

use super::builder::Transaction;
use super::types::FeeParameters;
use crate::config::{
    FEE_PER_KILOBYTE_EC, FEE_PER_OUTPUT_EC, FEE_PER_SIGNATURE_EC, FREE_BYTES_PER_EC,
    MAX_TRANSACTION_SIZE, RCD_TYPE_1_SIGNATURE_BLOCK_SIZE,
};
use crate::error::{FactomError, Result};

impl Transaction {
    /// Required fee in Entry Credits.
    ///
    /// Signed transactions are measured directly and `params` is ignored.
    /// Unsigned ones fail with `MissingFeeParameters` when `params` is
    /// `None`.
    pub fn compute_ec_required_fees(&self, params: Option<FeeParameters>) -> Result<u64> {
        let (size, signatures) = if self.is_signed() {
            (self.marshal_binary()?.len(), self.inputs().len())
        } else {
            let scope = self.marshal_binary_sig().len();
            match params.ok_or(FactomError::MissingFeeParameters)? {
                FeeParameters::Rcd1Defaults => (
                    scope + RCD_TYPE_1_SIGNATURE_BLOCK_SIZE * self.inputs().len(),
                    self.inputs().len(),
                ),
                FeeParameters::Explicit {
                    rcd_signature_length,
                    number_of_signatures,
                } => (scope + rcd_signature_length, number_of_signatures),
            }
        };

        if size > MAX_TRANSACTION_SIZE {
            return Err(FactomError::SizeLimitExceeded {
                what: "transaction",
                size,
                max: MAX_TRANSACTION_SIZE,
            });
        }

        let outputs = (self.factoid_outputs().len() + self.entry_credit_outputs().len()) as u64;
        let kilobytes = size.div_ceil(FREE_BYTES_PER_EC) as u64;
        Ok(kilobytes * FEE_PER_KILOBYTE_EC
            + outputs * FEE_PER_OUTPUT_EC
            + signatures as u64 * FEE_PER_SIGNATURE_EC)
    }

    /// Required fee in factoshis at `ec_rate` factoshis per Entry Credit.
    pub fn compute_required_fees(
        &self,
        ec_rate: u64,
        params: Option<FeeParameters>,
    ) -> Result<u64> {
        let ec = self.compute_ec_required_fees(params)?;
        ec.checked_mul(ec_rate).ok_or_else(|| {
            FactomError::InvalidArgument(format!("fee overflow at EC rate {}", ec_rate))
        })
    }

    /// `true` when the transaction pays at least the required fee. Unsigned
    /// transactions are sized as if every input carried an RCD type 1.
    pub fn validate_fees(&self, ec_rate: u64) -> Result<bool> {
        let required = self.compute_required_fees(ec_rate, Some(FeeParameters::Rcd1Defaults))?;
        Ok(required <= self.fees_paid())
    }
}
