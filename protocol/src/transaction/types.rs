//! Transaction variants and the value types they carry.
//!
//! Each variant is a plain struct with a static field table. The wire names
//! are the protocol's short keys; fields at their zero value never reach
//! the wire (see [`crate::codec`]).

use std::fmt;

use crate::codec::{Decode, DecodeError, Encode, FieldReader, FieldWriter};
use crate::identity::Address;

/// `None` for an all-zero value, which encodes the same as absence.
pub(crate) fn non_zero<const N: usize>(value: Option<[u8; N]>) -> Option<[u8; N]> {
    value.filter(|bytes| bytes.iter().any(|b| *b != 0))
}

pub(crate) fn non_zero_address(value: Option<Address>) -> Option<Address> {
    value.filter(|address| !address.is_zero())
}

// ---------------------------------------------------------------------------
// TxType
// ---------------------------------------------------------------------------

/// The `type` tag of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    Payment,
    KeyRegistration,
    AssetConfig,
    AssetTransfer,
    AssetFreeze,
    ApplicationCall,
}

impl TxType {
    /// The wire tag.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Payment => "pay",
            Self::KeyRegistration => "keyreg",
            Self::AssetConfig => "acfg",
            Self::AssetTransfer => "axfer",
            Self::AssetFreeze => "afrz",
            Self::ApplicationCall => "appl",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Some(match tag {
            "pay" => Self::Payment,
            "keyreg" => Self::KeyRegistration,
            "acfg" => Self::AssetConfig,
            "axfer" => Self::AssetTransfer,
            "afrz" => Self::AssetFreeze,
            "appl" => Self::ApplicationCall,
            _ => return None,
        })
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// Moves native currency. `close_remainder_to` closes the sender's account
/// and sends everything left to that address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payment {
    pub receiver: Address,
    pub amount: u64,
    pub close_remainder_to: Option<Address>,
}

impl Payment {
    pub fn new(receiver: Address, amount: u64) -> Self {
        Self {
            receiver,
            amount,
            close_remainder_to: None,
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.close_remainder_to = non_zero_address(self.close_remainder_to);
    }
}

impl Encode for Payment {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.uint("amt", self.amount);
        w.opt_address("close", self.close_remainder_to.as_ref());
        w.address("rcv", &self.receiver);
    }
}

impl Decode for Payment {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            amount: r.uint("amt")?,
            close_remainder_to: r.address("close")?,
            receiver: r.address_or_zero("rcv")?,
        })
    }
}

// ---------------------------------------------------------------------------
// KeyRegistration
// ---------------------------------------------------------------------------

/// Registers participation keys, or takes the account offline when every
/// key is absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyRegistration {
    pub vote_key: Option<[u8; 32]>,
    pub selection_key: Option<[u8; 32]>,
    pub state_proof_key: Option<[u8; 64]>,
    pub vote_first: u64,
    pub vote_last: u64,
    pub vote_key_dilution: u64,
    /// Marks the account as permanently non-participating.
    pub non_participation: bool,
}

impl KeyRegistration {
    /// Key registration that takes the account offline.
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn is_online(&self) -> bool {
        self.vote_key.is_some() && self.selection_key.is_some()
    }

    pub(crate) fn normalize(&mut self) {
        self.vote_key = non_zero(self.vote_key);
        self.selection_key = non_zero(self.selection_key);
        self.state_proof_key = non_zero(self.state_proof_key);
    }
}

impl Encode for KeyRegistration {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.boolean("nonpart", self.non_participation);
        w.opt_fixed("selkey", self.selection_key.as_ref());
        w.opt_fixed("sprfkey", self.state_proof_key.as_ref());
        w.uint("votefst", self.vote_first);
        w.uint("votekd", self.vote_key_dilution);
        w.opt_fixed("votekey", self.vote_key.as_ref());
        w.uint("votelst", self.vote_last);
    }
}

impl Decode for KeyRegistration {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            non_participation: r.boolean("nonpart")?,
            selection_key: r.fixed("selkey")?,
            state_proof_key: r.fixed("sprfkey")?,
            vote_first: r.uint("votefst")?,
            vote_key_dilution: r.uint("votekd")?,
            vote_key: r.fixed("votekey")?,
            vote_last: r.uint("votelst")?,
        })
    }
}

// ---------------------------------------------------------------------------
// AssetParams / AssetConfig
// ---------------------------------------------------------------------------

/// Parameters of an asset, set at creation and (for the four role
/// addresses) changeable by the manager afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub metadata_hash: Option<[u8; 32]>,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

impl AssetParams {
    /// The role addresses, named, in the order the strict empty address
    /// check reports them.
    pub fn roles(&self) -> [(&'static str, Option<&Address>); 4] {
        [
            ("manager", self.manager.as_ref()),
            ("reserve", self.reserve.as_ref()),
            ("freeze", self.freeze.as_ref()),
            ("clawback", self.clawback.as_ref()),
        ]
    }

    /// True when every field is at its zero value. Such params have no
    /// wire form: `apar` is omitted and the config reads back as a destroy.
    pub fn is_empty(&self) -> bool {
        self.to_value().is_zero()
    }

    pub(crate) fn normalize(&mut self) {
        self.metadata_hash = non_zero(self.metadata_hash);
        self.manager = non_zero_address(self.manager);
        self.reserve = non_zero_address(self.reserve);
        self.freeze = non_zero_address(self.freeze);
        self.clawback = non_zero_address(self.clawback);
    }
}

impl Encode for AssetParams {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.string("an", &self.asset_name);
        w.opt_fixed("am", self.metadata_hash.as_ref());
        w.string("au", &self.url);
        w.opt_address("c", self.clawback.as_ref());
        w.uint("dc", u64::from(self.decimals));
        w.boolean("df", self.default_frozen);
        w.opt_address("f", self.freeze.as_ref());
        w.opt_address("m", self.manager.as_ref());
        w.opt_address("r", self.reserve.as_ref());
        w.uint("t", self.total);
        w.string("un", &self.unit_name);
    }
}

impl Decode for AssetParams {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        let decimals = r.uint("dc")?;
        Ok(Self {
            asset_name: r.string("an")?,
            metadata_hash: r.fixed("am")?,
            url: r.string("au")?,
            clawback: r.address("c")?,
            decimals: u32::try_from(decimals).map_err(|_| DecodeError::InvalidValue {
                field: "dc".into(),
                reason: format!("{decimals} decimals does not fit in 32 bits"),
            })?,
            default_frozen: r.boolean("df")?,
            freeze: r.address("f")?,
            manager: r.address("m")?,
            reserve: r.address("r")?,
            total: r.uint("t")?,
            unit_name: r.string("un")?,
        })
    }
}

/// Creates (`asset_id == 0`), reconfigures, or destroys (`params == None`)
/// an asset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetConfig {
    pub asset_id: u64,
    pub params: Option<AssetParams>,
}

impl AssetConfig {
    pub fn create(params: AssetParams) -> Self {
        Self {
            asset_id: 0,
            params: Some(params),
        }
    }

    pub fn reconfigure(asset_id: u64, params: AssetParams) -> Self {
        Self {
            asset_id,
            params: Some(params),
        }
    }

    pub fn destroy(asset_id: u64) -> Self {
        Self {
            asset_id,
            params: None,
        }
    }

    pub(crate) fn normalize(&mut self) {
        if let Some(params) = &mut self.params {
            params.normalize();
        }
    }
}

impl Encode for AssetConfig {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.opt_record("apar", self.params.as_ref());
        w.uint("caid", self.asset_id);
    }
}

impl Decode for AssetConfig {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            params: r.record("apar")?,
            asset_id: r.uint("caid")?,
        })
    }
}

// ---------------------------------------------------------------------------
// AssetTransfer
// ---------------------------------------------------------------------------

/// Moves units of an asset.
///
/// An opt-in is a zero-amount transfer from an account to itself. A
/// clawback sets `revocation_target`: the sender must then be the asset's
/// clawback address and units move out of the target's holding instead.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetTransfer {
    pub asset_id: u64,
    pub amount: u64,
    pub receiver: Address,
    pub revocation_target: Option<Address>,
    pub close_to: Option<Address>,
}

impl AssetTransfer {
    pub fn new(asset_id: u64, receiver: Address, amount: u64) -> Self {
        Self {
            asset_id,
            amount,
            receiver,
            ..Self::default()
        }
    }

    pub fn opt_in(asset_id: u64, account: Address) -> Self {
        Self::new(asset_id, account, 0)
    }

    pub fn revoke(asset_id: u64, target: Address, receiver: Address, amount: u64) -> Self {
        Self {
            revocation_target: Some(target),
            ..Self::new(asset_id, receiver, amount)
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.revocation_target = non_zero_address(self.revocation_target);
        self.close_to = non_zero_address(self.close_to);
    }
}

impl Encode for AssetTransfer {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.uint("aamt", self.amount);
        w.opt_address("aclose", self.close_to.as_ref());
        w.address("arcv", &self.receiver);
        w.opt_address("asnd", self.revocation_target.as_ref());
        w.uint("xaid", self.asset_id);
    }
}

impl Decode for AssetTransfer {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            amount: r.uint("aamt")?,
            close_to: r.address("aclose")?,
            receiver: r.address_or_zero("arcv")?,
            revocation_target: r.address("asnd")?,
            asset_id: r.uint("xaid")?,
        })
    }
}

// ---------------------------------------------------------------------------
// AssetFreeze
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AssetFreeze {
    pub asset_id: u64,
    pub account: Address,
    pub frozen: bool,
}

impl Encode for AssetFreeze {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.address("fadd", &self.account);
        w.uint("faid", self.asset_id);
        w.boolean("afrz", self.frozen);
    }
}

impl Decode for AssetFreeze {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            account: r.address_or_zero("fadd")?,
            asset_id: r.uint("faid")?,
            frozen: r.boolean("afrz")?,
        })
    }
}

// ---------------------------------------------------------------------------
// ApplicationCall
// ---------------------------------------------------------------------------

/// What an application call does besides running the approval program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OnCompletion {
    #[default]
    NoOp,
    OptIn,
    CloseOut,
    ClearState,
    UpdateApplication,
    DeleteApplication,
}

impl OnCompletion {
    pub fn code(self) -> u64 {
        match self {
            Self::NoOp => 0,
            Self::OptIn => 1,
            Self::CloseOut => 2,
            Self::ClearState => 3,
            Self::UpdateApplication => 4,
            Self::DeleteApplication => 5,
        }
    }

    pub fn from_code(code: u64) -> Option<Self> {
        Some(match code {
            0 => Self::NoOp,
            1 => Self::OptIn,
            2 => Self::CloseOut,
            3 => Self::ClearState,
            4 => Self::UpdateApplication,
            5 => Self::DeleteApplication,
            _ => return None,
        })
    }
}

/// Storage slots an application reserves, per kind of value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateSchema {
    pub num_uints: u64,
    pub num_byte_slices: u64,
}

impl Encode for StateSchema {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.uint("nbs", self.num_byte_slices);
        w.uint("nui", self.num_uints);
    }
}

impl Decode for StateSchema {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        Ok(Self {
            num_byte_slices: r.uint("nbs")?,
            num_uints: r.uint("nui")?,
        })
    }
}

/// Creates (`app_id == 0`) or calls an application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplicationCall {
    pub app_id: u64,
    pub on_complete: OnCompletion,
    pub args: Vec<Vec<u8>>,
    pub accounts: Vec<Address>,
    pub foreign_apps: Vec<u64>,
    pub foreign_assets: Vec<u64>,
    pub approval_program: Vec<u8>,
    pub clear_program: Vec<u8>,
    pub global_schema: StateSchema,
    pub local_schema: StateSchema,
    pub extra_pages: u32,
}

impl ApplicationCall {
    pub fn call(app_id: u64, on_complete: OnCompletion) -> Self {
        Self {
            app_id,
            on_complete,
            ..Self::default()
        }
    }
}

impl Encode for ApplicationCall {
    fn encode_fields(&self, w: &mut FieldWriter) {
        w.bytes_list("apaa", &self.args);
        w.uint("apan", self.on_complete.code());
        w.bytes("apap", &self.approval_program);
        w.address_list("apat", &self.accounts);
        w.uint_list("apas", &self.foreign_assets);
        w.uint("apep", u64::from(self.extra_pages));
        w.uint_list("apfa", &self.foreign_apps);
        w.record("apgs", &self.global_schema);
        w.uint("apid", self.app_id);
        w.record("apls", &self.local_schema);
        w.bytes("apsu", &self.clear_program);
    }
}

impl Decode for ApplicationCall {
    fn decode_fields(r: &mut FieldReader) -> Result<Self, DecodeError> {
        let on_complete = r.uint("apan")?;
        let extra_pages = r.uint("apep")?;
        Ok(Self {
            args: r.bytes_list("apaa")?,
            on_complete: OnCompletion::from_code(on_complete).ok_or_else(|| {
                DecodeError::InvalidValue {
                    field: "apan".into(),
                    reason: format!("unknown on-completion code {on_complete}"),
                }
            })?,
            approval_program: r.bytes("apap")?,
            accounts: r.address_list("apat")?,
            foreign_assets: r.uint_list("apas")?,
            extra_pages: u32::try_from(extra_pages).map_err(|_| DecodeError::InvalidValue {
                field: "apep".into(),
                reason: format!("{extra_pages} extra pages does not fit in 32 bits"),
            })?,
            foreign_apps: r.uint_list("apfa")?,
            global_schema: r.record("apgs")?.unwrap_or_default(),
            app_id: r.uint("apid")?,
            local_schema: r.record("apls")?.unwrap_or_default(),
            clear_program: r.bytes("apsu")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{from_slice, to_vec};

    #[test]
    fn type_tags_roundtrip() {
        for ty in [
            TxType::Payment,
            TxType::KeyRegistration,
            TxType::AssetConfig,
            TxType::AssetTransfer,
            TxType::AssetFreeze,
            TxType::ApplicationCall,
        ] {
            assert_eq!(TxType::from_tag(ty.tag()), Some(ty));
        }
        assert_eq!(TxType::from_tag("stpf"), None);
        assert_eq!(TxType::Payment.to_string(), "pay");
    }

    #[test]
    fn zero_payment_is_empty_map() {
        assert_eq!(to_vec(&Payment::default()), vec![0x80]);
    }

    #[test]
    fn asset_params_skip_unset_roles() {
        let params = AssetParams {
            total: 1_000_000,
            decimals: 2,
            unit_name: "GLD".into(),
            manager: Some(Address::new([9u8; 32])),
            ..AssetParams::default()
        };
        let bytes = to_vec(&params);
        // dc, m, t, un
        assert_eq!(bytes[0], 0x84);
        assert_eq!(from_slice::<AssetParams>(&bytes).unwrap(), params);
    }

    #[test]
    fn empty_schemas_are_omitted() {
        let call = ApplicationCall::call(42, OnCompletion::OptIn);
        // apan, apid
        assert_eq!(to_vec(&call)[0], 0x82);
    }

    #[test]
    fn unknown_on_completion_rejected() {
        // {"apan": 9}
        let bytes = b"\x81\xa4apan\x09";
        assert!(matches!(
            from_slice::<ApplicationCall>(bytes),
            Err(DecodeError::InvalidValue { .. })
        ));
    }

    #[test]
    fn opt_in_targets_self_with_zero_amount() {
        let acct = Address::new([3u8; 32]);
        let t = AssetTransfer::opt_in(7, acct);
        assert_eq!(t.receiver, acct);
        assert_eq!(t.amount, 0);
        assert!(t.revocation_target.is_none());
    }
}
