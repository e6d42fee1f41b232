//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] takes the network facts from
//! [`SuggestedParams`], the sender, and one variant payload, runs the
//! preflight checks, resolves the fee, and hands back an unsigned
//! [`Transaction`].
//!
//! The builder does not sign -- that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.

use data_encoding::BASE32_NOPAD;
use tracing::debug;

use super::params::{FeePolicy, SuggestedParams};
use super::signing::{Authorization, SignedTransaction};
use super::types::{
    non_zero, non_zero_address, ApplicationCall, AssetConfig, AssetFreeze, AssetTransfer,
    KeyRegistration, Payment, TxType,
};
use super::verification::TransactionError;
use crate::codec::{self, Decode, DecodeError, Encode, FieldReader, FieldWriter};
use crate::config::MAX_NOTE_LENGTH;
use crate::crypto::hash::{domain_hash, HashDomain};
use crate::crypto::keys::Signature;
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Fields shared by every transaction type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Header {
    pub sender: Address,
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: [u8; 32],
    pub note: Vec<u8>,
    /// While set, no other transaction from the sender with the same lease
    /// can be confirmed inside the validity window.
    pub lease: Option<[u8; 32]>,
    /// Hands signing authority for the sender to another address.
    pub rekey_to: Option<Address>,
    pub group: Option<[u8; 32]>,
}

impl Header {
    fn normalize(&mut self) {
        self.lease = non_zero(self.lease);
        self.rekey_to = non_zero_address(self.rekey_to);
        self.group = non_zero(self.group);
    }
}

impl Encode for Header {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.uint("fee", self.fee);
        w.uint("fv", self.first_valid);
        w.string("gen", &self.genesis_id);
        w.fixed("gh", &self.genesis_hash);
        w.opt_fixed("grp", self.group.as_ref());
        w.opt_fixed("lx", self.lease.as_ref());
        w.uint("lv", self.last_valid);
        w.bytes("note", &self.note);
        w.opt_address("rekey", self.rekey_to.as_ref());
        w.address("snd", &self.sender);
    }
}

impl Decode for Header {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            fee: r.uint("fee")?,
            first_valid: r.uint("fv")?,
            genesis_id: r.string("gen")?,
            genesis_hash: r.fixed_or_zero("gh")?,
            group: r.fixed("grp")?,
            lease: r.fixed("lx")?,
            last_valid: r.uint("lv")?,
            note: r.bytes("note")?,
            rekey_to: r.address("rekey")?,
            sender: r.address_or_zero("snd")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// The type-specific half of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Payment(Payment),
    KeyRegistration(KeyRegistration),
    AssetConfig(AssetConfig),
    AssetTransfer(AssetTransfer),
    AssetFreeze(AssetFreeze),
    ApplicationCall(ApplicationCall),
}

impl TransactionKind {
    pub fn tx_type(&self) -> TxType {
        match self {
            Self::Payment(_) => TxType::Payment,
            Self::KeyRegistration(_) => TxType::KeyRegistration,
            Self::AssetConfig(_) => TxType::AssetConfig,
            Self::AssetTransfer(_) => TxType::AssetTransfer,
            Self::AssetFreeze(_) => TxType::AssetFreeze,
            Self::ApplicationCall(_) => TxType::ApplicationCall,
        }
    }

    fn normalize(&mut self) {
        match self {
            Self::Payment(p) => p.normalize(),
            Self::KeyRegistration(k) => k.normalize(),
            Self::AssetConfig(c) => c.normalize(),
            Self::AssetTransfer(t) => t.normalize(),
            Self::AssetFreeze(_) | Self::ApplicationCall(_) => {}
        }
    }

    fn payload(&self) -> &dyn Encode {
        match self {
            Self::Payment(p) => p,
            Self::KeyRegistration(k) => k,
            Self::AssetConfig(c) => c,
            Self::AssetTransfer(t) => t,
            Self::AssetFreeze(f) => f,
            Self::ApplicationCall(a) => a,
        }
    }

    fn decode_payload(ty: TxType, r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(match ty {
            TxType::Payment => Self::Payment(Payment::decode_fields(r)?),
            TxType::KeyRegistration => Self::KeyRegistration(KeyRegistration::decode_fields(r)?),
            TxType::AssetConfig => Self::AssetConfig(AssetConfig::decode_fields(r)?),
            TxType::AssetTransfer => Self::AssetTransfer(AssetTransfer::decode_fields(r)?),
            TxType::AssetFreeze => Self::AssetFreeze(AssetFreeze::decode_fields(r)?),
            TxType::ApplicationCall => Self::ApplicationCall(ApplicationCall::decode_fields(r)?),
        })
    }
}

/// An unsigned transaction.
///
/// The header and the variant payload share one flat map on the wire, with
/// the variant named by the `type` field. A payment for 1000 units encodes
/// (keys sorted, zero fields absent) as
///
/// ```text
/// {amt: 1000, fee: 1000, fv: 1, gen: "...", gh: <32>, lv: 1001,
///  rcv: <32>, snd: <32>, type: "pay"}
/// ```
///
/// Fields are public for inspection. After construction the only field a
/// caller should change is the group id, through [`Transaction::with_group`]
/// or [`super::group::assign_group_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub header: Header,
    pub kind: TransactionKind,
}

impl Transaction {
    /// Optional fields holding an all-zero value are stored as `None`.
    pub fn new(mut header: Header, mut kind: TransactionKind) -> Self {
        header.normalize();
        kind.normalize();
        Self { header, kind }
    }

    pub fn tx_type(&self) -> TxType {
        self.kind.tx_type()
    }

    pub fn sender(&self) -> &Address {
        &self.header.sender
    }

    /// Canonical bytes.
    pub fn encode(&self) -> Vec<u8> {
        codec::to_vec(self)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        codec::from_slice(bytes)
    }

    /// The message a signer signs: `"TX" || encode(tx)`.
    pub fn bytes_to_sign(&self) -> Vec<u8> {
        HashDomain::Transaction.prefixed(&self.encode())
    }

    /// `SHA-512/256("TX" || encode(tx))`.
    pub fn raw_id(&self) -> [u8; 32] {
        domain_hash(HashDomain::Transaction, &self.encode())
    }

    /// The 52-character transaction ID.
    pub fn id(&self) -> String {
        BASE32_NOPAD.encode(&self.raw_id())
    }

    /// A copy with the group id replaced.
    pub fn with_group(mut self, group: Option<[u8; 32]>) -> Self {
        self.header.group = non_zero(group);
        self
    }

    /// Length of the canonical envelope once signed by a single key.
    pub fn estimate_signed_size(&self) -> usize {
        SignedTransaction {
            transaction: self.clone(),
            authorization: Some(Authorization::Single(Signature::from_bytes([1u8; 64]))),
            auth_address: None,
        }
        .to_bytes()
        .len()
    }
}

impl Encode for Transaction {
    fn encode_fields(&self, w: &mut FieldWriter) {
        self.header.encode_fields(w);
        w.string("type", self.tx_type().tag());
        self.kind.payload().encode_fields(w);
    }
}

impl Decode for Transaction {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        let tag = r.string("type")?;
        let ty = TxType::from_tag(&tag).ok_or_else(|| DecodeError::InvalidValue {
            field: "type".into(),
            reason: if tag.is_empty() {
                "missing transaction type".into()
            } else {
                format!("unknown transaction type {tag:?}")
            },
        })?;
        let header = Header::decode_fields(r)?;
        let kind = TransactionKind::decode_payload(ty, r)?;
        Ok(Self { header, kind })
    }
}

/// The 52-character ID of `tx`.
pub fn compute_id(tx: &Transaction) -> String {
    tx.id()
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```
/// use algo_protocol::identity::Address;
/// use algo_protocol::transaction::{FeePolicy, SuggestedParams, TransactionBuilder};
///
/// let params = SuggestedParams {
///     fee: FeePolicy::Flat(1_000),
///     first_valid: 1,
///     last_valid: 1_001,
///     genesis_hash: [7u8; 32],
///     genesis_id: "devnet-v1".into(),
/// };
/// let sender = Address::new([1u8; 32]);
/// let receiver = Address::new([2u8; 32]);
///
/// let tx = TransactionBuilder::payment(&params, sender, receiver, 5_000)
///     .note(b"rent".to_vec())
///     .build()
///     .unwrap();
/// assert_eq!(tx.header.fee, 1_000);
/// assert_eq!(tx.id().len(), 52);
/// ```
pub struct TransactionBuilder {
    header: Header,
    fee: FeePolicy,
    kind: TransactionKind,
    strict_empty_address_check: bool,
}

impl TransactionBuilder {
    pub fn new(params: &SuggestedParams, sender: Address, kind: TransactionKind) -> Self {
        Self {
            header: Header {
                sender,
                first_valid: params.first_valid,
                last_valid: params.last_valid,
                genesis_id: params.genesis_id.clone(),
                genesis_hash: params.genesis_hash,
                ..Header::default()
            },
            fee: params.fee,
            kind,
            strict_empty_address_check: false,
        }
    }

    pub fn payment(
        params: &SuggestedParams,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> Self {
        Self::new(
            params,
            sender,
            TransactionKind::Payment(Payment::new(receiver, amount)),
        )
    }

    pub fn key_registration(
        params: &SuggestedParams,
        sender: Address,
        keyreg: KeyRegistration,
    ) -> Self {
        Self::new(params, sender, TransactionKind::KeyRegistration(keyreg))
    }

    pub fn asset_config(params: &SuggestedParams, sender: Address, config: AssetConfig) -> Self {
        Self::new(params, sender, TransactionKind::AssetConfig(config))
    }

    pub fn asset_transfer(
        params: &SuggestedParams,
        sender: Address,
        transfer: AssetTransfer,
    ) -> Self {
        Self::new(params, sender, TransactionKind::AssetTransfer(transfer))
    }

    /// Opt `account` in to `asset_id`: a zero-amount transfer to itself.
    pub fn asset_opt_in(params: &SuggestedParams, account: Address, asset_id: u64) -> Self {
        Self::asset_transfer(params, account, AssetTransfer::opt_in(asset_id, account))
    }

    pub fn asset_freeze(params: &SuggestedParams, sender: Address, freeze: AssetFreeze) -> Self {
        Self::new(params, sender, TransactionKind::AssetFreeze(freeze))
    }

    pub fn application_call(
        params: &SuggestedParams,
        sender: Address,
        call: ApplicationCall,
    ) -> Self {
        Self::new(params, sender, TransactionKind::ApplicationCall(call))
    }

    /// Override the fee policy with an exact fee.
    pub fn flat_fee(mut self, fee: u64) -> Self {
        self.fee = FeePolicy::Flat(fee);
        self
    }

    pub fn first_valid(mut self, round: u64) -> Self {
        self.header.first_valid = round;
        self
    }

    pub fn last_valid(mut self, round: u64) -> Self {
        self.header.last_valid = round;
        self
    }

    pub fn note(mut self, note: Vec<u8>) -> Self {
        self.header.note = note;
        self
    }

    pub fn lease(mut self, lease: [u8; 32]) -> Self {
        self.header.lease = Some(lease);
        self
    }

    pub fn rekey_to(mut self, address: Address) -> Self {
        self.header.rekey_to = Some(address);
        self
    }

    pub fn group(mut self, group: [u8; 32]) -> Self {
        self.header.group = Some(group);
        self
    }

    /// Refuse asset configurations that leave a role address empty. Once
    /// cleared, a role can never be set again.
    pub fn strict_empty_address_check(mut self, enabled: bool) -> Self {
        self.strict_empty_address_check = enabled;
        self
    }

    /// Run the preflight checks, resolve the fee, and build.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::InvalidValidityWindow`] if first > last valid.
    /// - [`TransactionError::NoteTooLong`] if the note exceeds 1 KiB.
    /// - [`TransactionError::EmptyAssetParams`] if an asset configuration
    ///   carries params with every field at zero.
    /// - [`TransactionError::EmptyAddress`] if the strict check is enabled
    ///   and an asset configuration leaves a role address empty.
    pub fn build(self) -> Result<Transaction, TransactionError> {
        let header = &self.header;
        if header.first_valid > header.last_valid {
            return Err(TransactionError::InvalidValidityWindow {
                first: header.first_valid,
                last: header.last_valid,
            });
        }
        if header.note.len() > MAX_NOTE_LENGTH {
            return Err(TransactionError::NoteTooLong {
                len: header.note.len(),
                max: MAX_NOTE_LENGTH,
            });
        }
        if let TransactionKind::AssetConfig(AssetConfig {
            asset_id,
            params: Some(params),
        }) = &self.kind
        {
            if params.is_empty() {
                return Err(TransactionError::EmptyAssetParams {
                    asset_id: *asset_id,
                });
            }
            if self.strict_empty_address_check {
                for (role, address) in params.roles() {
                    if address.map_or(true, Address::is_zero) {
                        return Err(TransactionError::EmptyAddress { role });
                    }
                }
            }
        }

        let mut tx = Transaction::new(self.header, self.kind);
        tx.header.fee = match self.fee {
            FeePolicy::Flat(fee) => fee,
            per_byte => {
                let size = tx.estimate_signed_size();
                let fee = per_byte.resolve(size);
                debug!(size, fee, "resolved per-byte fee");
                fee
            }
        };
        Ok(tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::{AssetParams, OnCompletion, StateSchema};
    use proptest::prelude::*;

    fn params() -> SuggestedParams {
        SuggestedParams {
            fee: FeePolicy::Flat(1_000),
            first_valid: 1,
            last_valid: 1_001,
            genesis_hash: [7u8; 32],
            genesis_id: "devnet-v1".into(),
        }
    }

    fn addr(b: u8) -> Address {
        Address::new([b; 32])
    }

    fn payment() -> Transaction {
        TransactionBuilder::payment(&params(), addr(1), addr(2), 1_000)
            .build()
            .unwrap()
    }

    fn roundtrip(tx: &Transaction) {
        let bytes = tx.encode();
        assert_eq!(&Transaction::decode(&bytes).unwrap(), tx);
    }

    #[test]
    fn payment_fields_land_in_header_and_payload() {
        let tx = payment();
        assert_eq!(tx.tx_type(), TxType::Payment);
        assert_eq!(tx.header.fee, 1_000);
        assert_eq!(tx.header.first_valid, 1);
        assert_eq!(tx.header.last_valid, 1_001);
        assert_eq!(*tx.sender(), addr(1));
        match &tx.kind {
            TransactionKind::Payment(p) => {
                assert_eq!(p.receiver, addr(2));
                assert_eq!(p.amount, 1_000);
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn payment_encodes_expected_keys() {
        let tx = payment();
        let bytes = tx.encode();
        // amt fee fv gen gh lv rcv snd type
        assert_eq!(bytes[0], 0x89);
        assert_eq!(&bytes[1..5], b"\xa3amt");
        roundtrip(&tx);
    }

    #[test]
    fn id_is_52_chars_and_stable() {
        let tx = payment();
        assert_eq!(tx.id().len(), 52);
        assert_eq!(tx.id(), compute_id(&payment()));
        assert_ne!(tx.id(), tx.clone().with_group(Some([1u8; 32])).id());
    }

    #[test]
    fn bytes_to_sign_carry_tx_prefix() {
        let tx = payment();
        let msg = tx.bytes_to_sign();
        assert_eq!(&msg[..2], b"TX");
        assert_eq!(&msg[2..], tx.encode().as_slice());
    }

    #[test]
    fn every_variant_roundtrips() {
        let p = params();
        let txs = vec![
            TransactionBuilder::key_registration(
                &p,
                addr(1),
                KeyRegistration {
                    vote_key: Some([4u8; 32]),
                    selection_key: Some([5u8; 32]),
                    state_proof_key: Some([6u8; 64]),
                    vote_first: 10,
                    vote_last: 10_000,
                    vote_key_dilution: 100,
                    non_participation: false,
                },
            ),
            TransactionBuilder::key_registration(&p, addr(1), KeyRegistration::offline()),
            TransactionBuilder::asset_config(
                &p,
                addr(1),
                AssetConfig::create(AssetParams {
                    total: 1_000_000,
                    decimals: 6,
                    default_frozen: true,
                    unit_name: "GLD".into(),
                    asset_name: "gold".into(),
                    url: "https://example.org".into(),
                    metadata_hash: Some([8u8; 32]),
                    manager: Some(addr(1)),
                    reserve: Some(addr(2)),
                    freeze: Some(addr(3)),
                    clawback: Some(addr(4)),
                }),
            ),
            TransactionBuilder::asset_config(&p, addr(1), AssetConfig::destroy(99)),
            TransactionBuilder::asset_transfer(
                &p,
                addr(1),
                AssetTransfer::revoke(99, addr(3), addr(4), 12),
            ),
            TransactionBuilder::asset_opt_in(&p, addr(5), 99),
            TransactionBuilder::asset_freeze(
                &p,
                addr(1),
                AssetFreeze {
                    asset_id: 99,
                    account: addr(6),
                    frozen: true,
                },
            ),
            TransactionBuilder::application_call(
                &p,
                addr(1),
                ApplicationCall {
                    app_id: 0,
                    on_complete: OnCompletion::NoOp,
                    args: vec![b"hello".to_vec(), vec![]],
                    accounts: vec![addr(7)],
                    foreign_apps: vec![1, 2],
                    foreign_assets: vec![3],
                    approval_program: vec![0x06, 0x81, 0x01],
                    clear_program: vec![0x06, 0x81, 0x01],
                    global_schema: StateSchema {
                        num_uints: 1,
                        num_byte_slices: 2,
                    },
                    local_schema: StateSchema::default(),
                    extra_pages: 1,
                },
            ),
        ];
        for builder in txs {
            let tx = builder
                .note(b"n".to_vec())
                .lease([9u8; 32])
                .rekey_to(addr(8))
                .build()
                .unwrap();
            roundtrip(&tx);
        }
    }

    #[test]
    fn decode_rejects_foreign_variant_fields() {
        // A payment carrying an asset-transfer field.
        let tx = payment();
        let mut value = codec::Encode::to_value(&tx);
        if let codec::Value::Map(entries) = &mut value {
            entries.insert("xaid".into(), codec::Value::Uint(5));
        }
        let bytes = codec::encode_value(&value);
        assert_eq!(
            Transaction::decode(&bytes),
            Err(DecodeError::UnknownField("xaid".into()))
        );
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let tx = payment();
        let mut value = codec::Encode::to_value(&tx);
        if let codec::Value::Map(entries) = &mut value {
            entries.insert("type".into(), codec::Value::Str("nope".into()));
        }
        assert!(matches!(
            Transaction::decode(&codec::encode_value(&value)),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn rejects_inverted_validity_window() {
        let err = TransactionBuilder::payment(&params(), addr(1), addr(2), 1)
            .first_valid(500)
            .last_valid(100)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            TransactionError::InvalidValidityWindow {
                first: 500,
                last: 100
            }
        );
    }

    #[test]
    fn rejects_oversized_note() {
        let err = TransactionBuilder::payment(&params(), addr(1), addr(2), 1)
            .note(vec![0u8; MAX_NOTE_LENGTH + 1])
            .build()
            .unwrap_err();
        assert!(matches!(err, TransactionError::NoteTooLong { .. }));
    }

    #[test]
    fn strict_empty_address_check_names_the_role() {
        let reconfig = AssetConfig::reconfigure(
            42,
            AssetParams {
                manager: Some(addr(1)),
                reserve: Some(addr(2)),
                freeze: None,
                clawback: Some(addr(4)),
                ..AssetParams::default()
            },
        );
        let lenient = TransactionBuilder::asset_config(&params(), addr(1), reconfig.clone());
        assert!(lenient.build().is_ok());

        let err = TransactionBuilder::asset_config(&params(), addr(1), reconfig)
            .strict_empty_address_check(true)
            .build()
            .unwrap_err();
        assert_eq!(err, TransactionError::EmptyAddress { role: "freeze" });

        // Destroying carries no params and passes.
        assert!(
            TransactionBuilder::asset_config(&params(), addr(1), AssetConfig::destroy(42))
                .strict_empty_address_check(true)
                .build()
                .is_ok()
        );
    }

    #[test]
    fn zero_lease_rekey_and_group_read_as_unset() {
        let tx = TransactionBuilder::payment(&params(), addr(1), addr(2), 1)
            .lease([0u8; 32])
            .rekey_to(Address::ZERO)
            .group([0u8; 32])
            .build()
            .unwrap();
        assert_eq!(tx.header.lease, None);
        assert_eq!(tx.header.rekey_to, None);
        assert_eq!(tx.header.group, None);
        roundtrip(&tx);

        assert_eq!(payment().with_group(Some([0u8; 32])).header.group, None);
    }

    #[test]
    fn zero_optional_payload_fields_read_as_unset() {
        let p = params();
        let close = TransactionKind::Payment(Payment {
            close_remainder_to: Some(Address::ZERO),
            ..Payment::new(addr(2), 5)
        });
        let keyreg = TransactionKind::KeyRegistration(KeyRegistration {
            vote_key: Some([0u8; 32]),
            selection_key: Some([0u8; 32]),
            state_proof_key: Some([0u8; 64]),
            ..KeyRegistration::default()
        });
        let transfer = TransactionKind::AssetTransfer(AssetTransfer {
            revocation_target: Some(Address::ZERO),
            close_to: Some(Address::ZERO),
            ..AssetTransfer::new(7, addr(2), 3)
        });
        let config = TransactionKind::AssetConfig(AssetConfig::reconfigure(
            42,
            AssetParams {
                manager: Some(addr(1)),
                reserve: Some(Address::ZERO),
                metadata_hash: Some([0u8; 32]),
                ..AssetParams::default()
            },
        ));
        for kind in [close, keyreg, transfer, config] {
            let tx = TransactionBuilder::new(&p, addr(1), kind).build().unwrap();
            roundtrip(&tx);
        }
    }

    #[test]
    fn rejects_reconfigure_with_empty_params() {
        let err = TransactionBuilder::asset_config(
            &params(),
            addr(1),
            AssetConfig::reconfigure(42, AssetParams::default()),
        )
        .build()
        .unwrap_err();
        assert_eq!(err, TransactionError::EmptyAssetParams { asset_id: 42 });

        // Only zero role addresses is still empty.
        let cleared = AssetParams {
            manager: Some(Address::ZERO),
            ..AssetParams::default()
        };
        assert_eq!(
            TransactionBuilder::asset_config(&params(), addr(1), AssetConfig::create(cleared))
                .build()
                .unwrap_err(),
            TransactionError::EmptyAssetParams { asset_id: 0 }
        );
    }

    #[test]
    fn per_byte_fee_uses_estimated_size() {
        let p = SuggestedParams {
            fee: FeePolicy::PerByte {
                fee_per_byte: 10,
                min_fee: 1_000,
            },
            ..params()
        };
        let tx = TransactionBuilder::payment(&p, addr(1), addr(2), 1)
            .build()
            .unwrap();
        // The estimate is taken before the fee field is filled in.
        let mut unpriced = tx.clone();
        unpriced.header.fee = 0;
        let expected = (10 * unpriced.estimate_signed_size() as u64).max(1_000);
        assert_eq!(tx.header.fee, expected);

        let floor = SuggestedParams {
            fee: FeePolicy::PerByte {
                fee_per_byte: 0,
                min_fee: 1_000,
            },
            ..params()
        };
        let tx = TransactionBuilder::payment(&floor, addr(1), addr(2), 1)
            .build()
            .unwrap();
        assert_eq!(tx.header.fee, 1_000);
    }

    #[test]
    fn flat_fee_override_wins() {
        let tx = TransactionBuilder::payment(&params(), addr(1), addr(2), 1)
            .flat_fee(0)
            .build()
            .unwrap();
        assert_eq!(tx.header.fee, 0);
    }

    proptest! {
        #[test]
        fn payment_roundtrip_any_fields(
            amount in any::<u64>(),
            fee in any::<u64>(),
            first in 0u64..1_000_000,
            window in 0u64..10_000,
            note in proptest::collection::vec(any::<u8>(), 0..64),
            rcv in proptest::array::uniform32(any::<u8>()),
        ) {
            let p = SuggestedParams {
                fee: FeePolicy::Flat(fee),
                first_valid: first,
                last_valid: first + window,
                ..params()
            };
            let tx = TransactionBuilder::payment(&p, addr(1), Address::new(rcv), amount)
                .note(note)
                .build()
                .unwrap();
            prop_assert_eq!(Transaction::decode(&tx.encode()).unwrap(), tx);
        }

        #[test]
        fn field_order_does_not_change_bytes(
            note in proptest::collection::vec(any::<u8>(), 1..32),
            lease in proptest::array::uniform32(1u8..),
        ) {
            let a = TransactionBuilder::payment(&params(), addr(1), addr(2), 5)
                .note(note.clone())
                .lease(lease)
                .rekey_to(addr(3))
                .build()
                .unwrap();
            let b = TransactionBuilder::payment(&params(), addr(1), addr(2), 5)
                .rekey_to(addr(3))
                .lease(lease)
                .note(note)
                .build()
                .unwrap();
            prop_assert_eq!(a.encode(), b.encode());
        }
    }
}
