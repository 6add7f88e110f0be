//! Factoid transaction construction and wire format.
//!
//! The [`TransactionBuilder`] collects inputs and outputs as parsed
//! [`Address`]es, checks them, and signs every input held in private form.
//! The resulting [`Transaction`] keeps only public addresses; key material
//! never outlives `build()`.
//!
//! # Wire format
//!
//! ```text
//! 0x02 ‖ timestamp(6, BE) ‖ #inputs(1) ‖ #fct_outputs(1) ‖ #ec_outputs(1)
//!      ‖ [varint(amount) ‖ key(32)]*          <- signature scope
//!      ‖ [0x01 ‖ public_key(32) ‖ sig(64)]*   <- one per input, signed only
//! ```

use tracing::debug;

use super::rcd::Rcd;
use super::signing::{sign_inputs, verify_rcd_signatures};
use super::types::TransactionAddress;
use crate::address::Address;
use crate::codec::{write_timestamp, write_varint, ByteReader};
use crate::config::{
    MAX_TRANSACTION_ITEMS, RCD_TYPE_1_SIGNATURE_BLOCK_SIZE, SIGNATURE_LENGTH,
    TRANSACTION_HEADER_SIZE, TRANSACTION_VERSION,
};
use crate::crypto::hash::sha256;
use crate::entry::commit::now_millis;
use crate::error::{FactomError, Result};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A Factoid transaction: value moves from Factoid inputs to Factoid and
/// Entry Credit outputs; whatever is left over is the fee.
///
/// Instances come out of [`TransactionBuilder::build`] or
/// [`Transaction::unmarshal_binary`], both of which validate signatures, so
/// a `Transaction` is either fully signed or not signed at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    id: [u8; 32],
    timestamp: u64,
    inputs: Vec<TransactionAddress>,
    factoid_outputs: Vec<TransactionAddress>,
    entry_credit_outputs: Vec<TransactionAddress>,
    rcd_signatures: Vec<(Rcd, [u8; 64])>,
}

impl Transaction {
    pub fn builder() -> TransactionBuilder {
        TransactionBuilder::default()
    }

    /// `SHA-256(marshal_binary_sig)`. Stable across signing.
    pub fn id(&self) -> &[u8; 32] {
        &self.id
    }

    pub fn id_hex(&self) -> String {
        hex::encode(self.id)
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn inputs(&self) -> &[TransactionAddress] {
        &self.inputs
    }

    pub fn factoid_outputs(&self) -> &[TransactionAddress] {
        &self.factoid_outputs
    }

    pub fn entry_credit_outputs(&self) -> &[TransactionAddress] {
        &self.entry_credit_outputs
    }

    /// RCDs in input order. Empty for unsigned transactions.
    pub fn rcds(&self) -> impl Iterator<Item = &Rcd> {
        self.rcd_signatures.iter().map(|(rcd, _)| rcd)
    }

    /// Signatures in input order. Empty for unsigned transactions.
    pub fn signatures(&self) -> impl Iterator<Item = &[u8; 64]> {
        self.rcd_signatures.iter().map(|(_, sig)| sig)
    }

    /// A coinbase transaction has no inputs and counts as signed.
    pub fn is_signed(&self) -> bool {
        self.rcd_signatures.len() == self.inputs.len()
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.is_empty()
    }

    // Sums are checked for overflow in `build()`.
    pub fn total_inputs(&self) -> u64 {
        self.inputs.iter().map(|i| i.amount).sum()
    }

    pub fn total_factoid_outputs(&self) -> u64 {
        self.factoid_outputs.iter().map(|o| o.amount).sum()
    }

    pub fn total_entry_credit_outputs(&self) -> u64 {
        self.entry_credit_outputs.iter().map(|o| o.amount).sum()
    }

    /// Inputs minus outputs in factoshis, zero for a coinbase transaction.
    pub fn fees_paid(&self) -> u64 {
        if self.is_coinbase() {
            return 0;
        }
        self.total_inputs()
            .saturating_sub(self.total_factoid_outputs())
            .saturating_sub(self.total_entry_credit_outputs())
    }

    /// The bytes every input signature covers.
    pub fn marshal_binary_sig(&self) -> Vec<u8> {
        marshal_scope(
            self.timestamp,
            &self.inputs,
            &self.factoid_outputs,
            &self.entry_credit_outputs,
        )
    }

    /// Full wire encoding. Fails with `UnsignedTransaction` when the RCDs
    /// and signatures are missing.
    pub fn marshal_binary(&self) -> Result<Vec<u8>> {
        if !self.is_signed() {
            return Err(FactomError::UnsignedTransaction);
        }
        let mut buf = self.marshal_binary_sig();
        buf.reserve(self.rcd_signatures.len() * RCD_TYPE_1_SIGNATURE_BLOCK_SIZE);
        for (rcd, signature) in &self.rcd_signatures {
            buf.extend_from_slice(&rcd.to_bytes());
            buf.extend_from_slice(signature);
        }
        Ok(buf)
    }

    /// Decode either the signed wire format or a bare signature scope.
    ///
    /// Inputs and Factoid outputs come back as public `FA` addresses, EC
    /// outputs as public `EC` addresses. Signatures are verified.
    pub fn unmarshal_binary(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data, "transaction");

        let version = reader.u8()?;
        if version != TRANSACTION_VERSION {
            return Err(FactomError::malformed(
                "transaction",
                format!("unsupported version {}", version),
            ));
        }
        let timestamp = reader.timestamp()?;
        let input_count = reader.u8()? as usize;
        let factoid_output_count = reader.u8()? as usize;
        let entry_credit_output_count = reader.u8()? as usize;

        let mut builder = TransactionBuilder::default().timestamp(timestamp);
        for _ in 0..input_count {
            let amount = reader.varint()?;
            builder = builder.input(Address::FactoidPublic(reader.take_array()?), amount);
        }
        for _ in 0..factoid_output_count {
            let amount = reader.varint()?;
            builder = builder.factoid_output(Address::FactoidPublic(reader.take_array()?), amount);
        }
        for _ in 0..entry_credit_output_count {
            let amount = reader.varint()?;
            builder = builder
                .entry_credit_output(Address::EntryCreditPublic(reader.take_array()?), amount);
        }

        if !reader.is_empty() {
            for _ in 0..input_count {
                let rcd = Rcd::read(&mut reader)?;
                let signature: [u8; SIGNATURE_LENGTH] = reader.take_array()?;
                builder = builder.rcd_signature(rcd, signature);
            }
            if !reader.is_empty() {
                return Err(FactomError::malformed(
                    "transaction",
                    format!("{} trailing bytes", reader.remaining()),
                ));
            }
        }

        builder.build()
    }
}

fn marshal_scope(
    timestamp: u64,
    inputs: &[TransactionAddress],
    factoid_outputs: &[TransactionAddress],
    entry_credit_outputs: &[TransactionAddress],
) -> Vec<u8> {
    let items = inputs.len() + factoid_outputs.len() + entry_credit_outputs.len();
    let mut buf = Vec::with_capacity(TRANSACTION_HEADER_SIZE + items * 40);

    buf.push(TRANSACTION_VERSION);
    write_timestamp(&mut buf, timestamp);
    // Counts are bounded by MAX_TRANSACTION_ITEMS at build time.
    buf.push(inputs.len() as u8);
    buf.push(factoid_outputs.len() as u8);
    buf.push(entry_credit_outputs.len() as u8);

    for item in inputs.iter().chain(factoid_outputs).chain(entry_credit_outputs) {
        write_varint(&mut buf, item.amount);
        buf.extend_from_slice(&item.address.public_key_bytes());
    }
    buf
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// Inputs given as private `Fs...` addresses are signed at build time. For
/// inputs held elsewhere (hardware wallets), pass public `FA...` addresses
/// and one [`rcd_signature`](Self::rcd_signature) per input, in input order.
///
/// ```
/// use factom_protocol::address::Address;
/// use factom_protocol::transaction::Transaction;
///
/// let tx = Transaction::builder()
///     .timestamp(1_521_693_377_958)
///     .input(Address::FactoidPrivate([1u8; 32]), 14_000_000)
///     .factoid_output(Address::FactoidPrivate([3u8; 32]).public(), 5_000_000)
///     .build()
///     .unwrap();
/// assert!(tx.is_signed());
/// assert_eq!(tx.fees_paid(), 9_000_000);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    timestamp: Option<u64>,
    inputs: Vec<TransactionAddress>,
    factoid_outputs: Vec<TransactionAddress>,
    entry_credit_outputs: Vec<TransactionAddress>,
    rcd_signatures: Vec<(Rcd, [u8; 64])>,
}

impl TransactionBuilder {
    /// Copy the inputs, outputs and timestamp of `tx`. Signatures are
    /// dropped, so the copy can be modified and re-signed.
    pub fn from_transaction(tx: &Transaction) -> Self {
        Self {
            timestamp: Some(tx.timestamp),
            inputs: tx.inputs.clone(),
            factoid_outputs: tx.factoid_outputs.clone(),
            entry_credit_outputs: tx.entry_credit_outputs.clone(),
            rcd_signatures: Vec::new(),
        }
    }

    /// Milliseconds since the Unix epoch. Defaults to the build time.
    pub fn timestamp(mut self, millis: u64) -> Self {
        self.timestamp = Some(millis);
        self
    }

    /// Spend `amount` factoshis from a Factoid address.
    pub fn input(mut self, address: Address, amount: u64) -> Self {
        self.inputs.push(TransactionAddress::new(address, amount));
        self
    }

    /// Send `amount` factoshis to a Factoid address.
    pub fn factoid_output(mut self, address: Address, amount: u64) -> Self {
        self.factoid_outputs.push(TransactionAddress::new(address, amount));
        self
    }

    /// Convert `amount` factoshis into Entry Credits for an EC address.
    pub fn entry_credit_output(mut self, address: Address, amount: u64) -> Self {
        self.entry_credit_outputs
            .push(TransactionAddress::new(address, amount));
        self
    }

    /// Attach an externally produced RCD and signature for the next input.
    pub fn rcd_signature(mut self, rcd: Rcd, signature: [u8; 64]) -> Self {
        self.rcd_signatures.push((rcd, signature));
        self
    }

    /// Validate, sign if possible, and produce the transaction.
    ///
    /// - all inputs private and no external pairs: every input is signed;
    /// - external pairs given: they must match the inputs one for one;
    /// - otherwise every input must be public and the result is unsigned.
    pub fn build(self) -> Result<Transaction> {
        check_kinds(&self.inputs, "input", Address::is_factoid)?;
        check_kinds(&self.factoid_outputs, "factoid output", Address::is_factoid)?;
        check_kinds(
            &self.entry_credit_outputs,
            "entry credit output",
            Address::is_entry_credit,
        )?;
        for (items, what) in [
            (&self.inputs, "inputs"),
            (&self.factoid_outputs, "factoid outputs"),
            (&self.entry_credit_outputs, "entry credit outputs"),
        ] {
            if items.len() > MAX_TRANSACTION_ITEMS {
                return Err(FactomError::InvalidArgument(format!(
                    "{} {}, at most {} allowed",
                    items.len(),
                    what,
                    MAX_TRANSACTION_ITEMS
                )));
            }
        }

        let total_in = checked_total(&self.inputs, "inputs")?;
        let total_out = checked_total(&self.factoid_outputs, "factoid outputs")?
            .checked_add(checked_total(
                &self.entry_credit_outputs,
                "entry credit outputs",
            )?)
            .ok_or_else(|| FactomError::InvalidArgument("outputs overflow u64".into()))?;
        if !self.inputs.is_empty() && total_out > total_in {
            return Err(FactomError::InvalidArgument(format!(
                "outputs {} exceed inputs {}",
                total_out, total_in
            )));
        }

        let timestamp = self.timestamp.unwrap_or_else(now_millis);
        let scope = marshal_scope(
            timestamp,
            &self.inputs,
            &self.factoid_outputs,
            &self.entry_credit_outputs,
        );

        let private_inputs = self.inputs.iter().filter(|i| i.address.is_private()).count();
        let rcd_signatures = if !self.rcd_signatures.is_empty() {
            verify_rcd_signatures(&scope, &self.inputs, &self.rcd_signatures)?;
            self.rcd_signatures
        } else if private_inputs == self.inputs.len() {
            sign_inputs(&scope, &self.inputs)?
        } else if private_inputs > 0 {
            return Err(FactomError::InconsistentSignatures(format!(
                "{} of {} inputs are private and no RCD/signature pairs were given",
                private_inputs,
                self.inputs.len()
            )));
        } else {
            Vec::new()
        };

        let public = |items: Vec<TransactionAddress>| -> Vec<TransactionAddress> {
            items
                .into_iter()
                .map(|i| TransactionAddress::new(i.address.public(), i.amount))
                .collect()
        };

        let tx = Transaction {
            id: sha256(&scope),
            timestamp,
            inputs: public(self.inputs),
            factoid_outputs: public(self.factoid_outputs),
            entry_credit_outputs: public(self.entry_credit_outputs),
            rcd_signatures,
        };
        debug!(
            id = %tx.id_hex(),
            inputs = tx.inputs.len(),
            signed = tx.is_signed(),
            "transaction built"
        );
        Ok(tx)
    }
}

fn check_kinds(
    items: &[TransactionAddress],
    what: &str,
    accepts: fn(&Address) -> bool,
) -> Result<()> {
    match items.iter().find(|i| !accepts(&i.address)) {
        Some(bad) => Err(FactomError::InvalidArgument(format!(
            "{} {} has the wrong address type",
            what,
            bad.address.public()
        ))),
        None => Ok(()),
    }
}

fn checked_total(items: &[TransactionAddress], what: &str) -> Result<u64> {
    items
        .iter()
        .try_fold(0u64, |acc, i| acc.checked_add(i.amount))
        .ok_or_else(|| FactomError::InvalidArgument(format!("{} overflow u64", what)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const TIMESTAMP: u64 = 1_521_693_377_958;
    const SCOPE_HEX: &str = "0201624bfe45a602010186d6bf00d6ef0d0edbfcba01000afa5de08c92dc809b488499abbf1700a865362003ddb6859fb140e7697e28c593ae0a0419aeed766a96be271aa0efd6e994024d8e4996732824a182b196408573534ac776b3a10bf81d6a229ac723bf82cfdddbe2c890b87cd2c3b4fcf07c82ee9b00ca93ac1705187071d67b83c7ff0efe8108e8ec4530575d7726879333dbdabe7c";
    const TX_ID: &str = "fce5d3500dc17ec3674291a8ef4e8d4b1c91c989a39027aa0e6469d49a79ecef";

    fn fs(seed: u8) -> Address {
        Address::FactoidPrivate([seed; 32])
    }

    fn es(seed: u8) -> Address {
        Address::EntryCreditPrivate([seed; 32])
    }

    fn sample_builder() -> TransactionBuilder {
        Transaction::builder()
            .timestamp(TIMESTAMP)
            .input(fs(1), 14_000_000)
            .input(fs(2), 11_000_000)
            .factoid_output(fs(3).public(), 5_000_000)
            .entry_credit_output(es(4).public(), 6_000_000)
    }

    #[test]
    fn signature_scope_known_vector() {
        let tx = sample_builder().build().unwrap();
        let scope = tx.marshal_binary_sig();
        assert_eq!(scope.len(), 154);
        assert_eq!(hex::encode(&scope), SCOPE_HEX);
        assert_eq!(tx.id_hex(), TX_ID);
    }

    #[test]
    fn signed_marshal_appends_rcd_and_signature_per_input() {
        let tx = sample_builder().build().unwrap();
        assert!(tx.is_signed());
        let bytes = tx.marshal_binary().unwrap();
        assert_eq!(bytes.len(), 154 + 2 * 97);
        assert_eq!(bytes[154], 0x01);
        assert_eq!(
            hex::encode(&bytes[155..187]),
            "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c"
        );
        assert_eq!(bytes[251], 0x01);
        assert_eq!(
            hex::encode(&bytes[252..284]),
            "8139770ea87d175f56a35466c34c7ecccb8d8a91b4ee37a25df60f5b8fc9b394"
        );
    }

    #[test]
    fn totals_and_fees_paid() {
        let tx = sample_builder().build().unwrap();
        assert_eq!(tx.total_inputs(), 25_000_000);
        assert_eq!(tx.total_factoid_outputs(), 5_000_000);
        assert_eq!(tx.total_entry_credit_outputs(), 6_000_000);
        assert_eq!(tx.fees_paid(), 14_000_000);
    }

    #[test]
    fn stored_addresses_are_public() {
        let tx = sample_builder().build().unwrap();
        assert!(tx.inputs().iter().all(|i| !i.address.is_private()));
        assert_eq!(
            tx.inputs()[0].address.to_string(),
            "FA3bjkbnuXwGbpAQpDa9f3SNwASURwVjA5ZzqzBNeDJKUy3dW4Ay"
        );
    }

    #[test]
    fn unmarshal_signed_round_trip() {
        let tx = sample_builder().build().unwrap();
        let bytes = tx.marshal_binary().unwrap();
        let decoded = Transaction::unmarshal_binary(&bytes).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.marshal_binary().unwrap(), bytes);
    }

    #[test]
    fn unmarshal_unsigned_scope() {
        let scope = hex::decode(SCOPE_HEX).unwrap();
        let decoded = Transaction::unmarshal_binary(&scope).unwrap();
        assert!(!decoded.is_signed());
        assert_eq!(decoded.id_hex(), TX_ID);
        assert_eq!(decoded.marshal_binary_sig(), scope);
        assert!(matches!(
            decoded.marshal_binary(),
            Err(FactomError::UnsignedTransaction)
        ));
    }

    #[test]
    fn unmarshal_rejects_tampered_signature() {
        let tx = sample_builder().build().unwrap();
        let mut bytes = tx.marshal_binary().unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        assert!(matches!(
            Transaction::unmarshal_binary(&bytes),
            Err(FactomError::InvalidSignature(_))
        ));
    }

    #[test]
    fn unmarshal_rejects_truncated_and_trailing() {
        let bytes = sample_builder().build().unwrap().marshal_binary().unwrap();
        assert!(Transaction::unmarshal_binary(&bytes[..200]).is_err());
        let mut extra = bytes.clone();
        extra.push(0);
        assert!(Transaction::unmarshal_binary(&extra).is_err());
        let mut wrong_version = bytes;
        wrong_version[0] = 0x01;
        assert!(Transaction::unmarshal_binary(&wrong_version).is_err());
    }

    #[test]
    fn external_signatures_are_accepted() {
        let unsigned = Transaction::builder()
            .timestamp(TIMESTAMP)
            .input(fs(1).public(), 14_000_000)
            .factoid_output(fs(3).public(), 5_000_000)
            .build()
            .unwrap();
        assert!(!unsigned.is_signed());

        let keypair = fs(1).keypair().unwrap();
        let signature = keypair.sign(&unsigned.marshal_binary_sig());
        let signed = TransactionBuilder::from_transaction(&unsigned)
            .rcd_signature(Rcd::type1(keypair.public_key_bytes()), signature)
            .build()
            .unwrap();
        assert!(signed.is_signed());
        assert_eq!(signed.id(), unsigned.id());
    }

    #[test]
    fn mixed_private_and_public_inputs_fail() {
        let result = Transaction::builder()
            .timestamp(TIMESTAMP)
            .input(fs(1), 10)
            .input(fs(2).public(), 10)
            .build();
        assert!(matches!(result, Err(FactomError::InconsistentSignatures(_))));
    }

    #[test]
    fn signature_count_mismatch_fails() {
        let keypair = fs(1).keypair().unwrap();
        let result = Transaction::builder()
            .timestamp(TIMESTAMP)
            .input(fs(1).public(), 10)
            .input(fs(2).public(), 10)
            .rcd_signature(Rcd::type1(keypair.public_key_bytes()), [0u8; 64])
            .build();
        assert!(matches!(result, Err(FactomError::InconsistentSignatures(_))));
    }

    #[test]
    fn wrong_address_kinds_fail() {
        assert!(matches!(
            Transaction::builder().input(es(1), 10).build(),
            Err(FactomError::InvalidArgument(_))
        ));
        assert!(matches!(
            Transaction::builder()
                .input(fs(1), 10)
                .entry_credit_output(fs(2).public(), 5)
                .build(),
            Err(FactomError::InvalidArgument(_))
        ));
    }

    #[test]
    fn outputs_cannot_exceed_inputs() {
        let result = Transaction::builder()
            .input(fs(1), 10)
            .factoid_output(fs(2).public(), 11)
            .build();
        assert!(matches!(result, Err(FactomError::InvalidArgument(_))));
    }

    #[test]
    fn coinbase_has_no_fees_and_counts_as_signed() {
        let tx = Transaction::builder()
            .timestamp(TIMESTAMP)
            .factoid_output(fs(2).public(), 500)
            .build()
            .unwrap();
        assert!(tx.is_coinbase());
        assert!(tx.is_signed());
        assert_eq!(tx.fees_paid(), 0);
        assert_eq!(tx.marshal_binary().unwrap(), tx.marshal_binary_sig());
    }

    #[test]
    fn too_many_outputs_fail() {
        let mut builder = Transaction::builder().input(fs(1), 1_000_000);
        for _ in 0..=MAX_TRANSACTION_ITEMS {
            builder = builder.factoid_output(fs(2).public(), 1);
        }
        assert!(matches!(builder.build(), Err(FactomError::InvalidArgument(_))));
    }

    #[test]
    fn from_transaction_drops_signatures() {
        let tx = sample_builder().build().unwrap();
        let rebuilt = TransactionBuilder::from_transaction(&tx).build().unwrap();
        assert!(!rebuilt.is_signed());
        assert_eq!(rebuilt.id(), tx.id());
    }

    #[test]
    fn default_timestamp_is_now() {
        let before = now_millis();
        let tx = Transaction::builder().input(fs(1), 10).build().unwrap();
        assert!(tx.timestamp() >= before);
    }
}
