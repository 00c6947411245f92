use {
  crate::{
    AssetAmount,
    AssetError,
    Operation,
    OperationKind,
    Price,
    ShareType,
    MAX_SHARE_SUPPLY,
  },
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
  thiserror::Error,
};

/// Scale factor meaning 100%.
pub const FULL_SCALE: u32 = 10_000;

/// Upper bound on re-pricing rounds in [`FeeSchedule::set_fee`].
const MAX_FEE_ROUNDS: usize = 4;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeeError {
  #[error(transparent)]
  Asset(#[from] AssetError),

  #[error("operation cannot be encoded: {0}")]
  Encoding(String),

  #[error("fee did not settle after {MAX_FEE_ROUNDS} rounds")]
  Unstable,
}

/// Price of one operation kind in core asset units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeParameters {
  pub base: u64,

  /// Charged for every started kilobyte of the encoded operation.
  pub per_kbyte: u32,
}

impl FeeParameters {
  pub const fn new(base: u64, per_kbyte: u32) -> Self {
    Self { base, per_kbyte }
  }
}

/// Fee parameters for every operation kind, keyed by its tag.
///
/// Kinds without an entry are free, reserved kinds are never
/// affordable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
  pub parameters: BTreeMap<u8, FeeParameters>,

  /// Multiplier applied to every fee, in units of 1/[`FULL_SCALE`].
  pub scale: u32,
}

impl Default for FeeSchedule {
  fn default() -> Self {
    let priced = [
      (OperationKind::Transfer, FeeParameters::new(20, 10)),
      (OperationKind::AccountCreate, FeeParameters::new(50, 10)),
      (OperationKind::AccountUpdate, FeeParameters::new(20, 10)),
      (OperationKind::MinerCreate, FeeParameters::new(500, 10)),
      (OperationKind::MinerUpdate, FeeParameters::new(20, 0)),
      (OperationKind::MinerUpdateGlobalParameters, FeeParameters::new(0, 0)),
      (OperationKind::ProposalCreate, FeeParameters::new(20, 10)),
      (OperationKind::ProposalUpdate, FeeParameters::new(2, 10)),
      (OperationKind::ProposalDelete, FeeParameters::new(0, 0)),
      (OperationKind::SetTransferFreezeBlock, FeeParameters::new(0, 0)),
      (OperationKind::VestingBalanceCreate, FeeParameters::new(50, 0)),
      (OperationKind::VestingBalanceWithdraw, FeeParameters::new(20, 0)),
      (OperationKind::TransferToBlind, FeeParameters::new(50, 10)),
      (OperationKind::TransferFromBlind, FeeParameters::new(50, 10)),
      (OperationKind::BlindTransfer, FeeParameters::new(50, 10)),
      (OperationKind::TransferToConfidential, FeeParameters::new(50, 10)),
      (OperationKind::TransferFromConfidential, FeeParameters::new(50, 10)),
    ];
    Self {
      parameters: priced
        .into_iter()
        .map(|(kind, params)| (kind.tag(), params))
        .collect(),
      scale: FULL_SCALE,
    }
  }
}

impl FeeSchedule {
  /// A schedule where every active operation is free.
  pub fn zero() -> Self {
    Self {
      parameters: BTreeMap::new(),
      scale: FULL_SCALE,
    }
  }

  /// Fee of `op` in core units before conversion.
  pub fn core_fee(&self, op: &Operation) -> Result<ShareType, FeeError> {
    if let OperationKind::Reserved(_) = op.kind() {
      return Ok(MAX_SHARE_SUPPLY);
    }

    let params = match self.parameters.get(&op.kind().tag()) {
      Some(params) => params,
      None => return Ok(0),
    };

    let size = rmp_serde::to_vec(op)
      .map_err(|e| FeeError::Encoding(e.to_string()))?
      .len() as u128;
    let kbytes = (size + 1023) / 1024;
    let raw = params.base as u128 + kbytes * params.per_kbyte as u128;
    let scaled = raw * self.scale as u128 / FULL_SCALE as u128;

    Ok(scaled.min(MAX_SHARE_SUPPLY as u128) as ShareType)
  }

  /// Fee of `op` in the asset quoted by `core_exchange_rate`.
  pub fn calculate_fee(
    &self,
    op: &Operation,
    core_exchange_rate: &Price,
  ) -> Result<AssetAmount, FeeError> {
    let core = AssetAmount::core(self.core_fee(op)?);
    Ok(core.convert(core_exchange_rate)?)
  }

  /// Writes the required fee into `op` and returns it.
  ///
  /// The encoded size, and with it the fee, depends on the fee field
  /// itself, so pricing repeats until the value settles.
  pub fn set_fee(
    &self,
    op: &mut Operation,
    core_exchange_rate: &Price,
  ) -> Result<AssetAmount, FeeError> {
    for _ in 0..MAX_FEE_ROUNDS {
      let fee = self.calculate_fee(op, core_exchange_rate)?;
      if *op.fee() == fee {
        return Ok(fee);
      }
      *op.fee_mut() = fee;
    }
    let fee = self.calculate_fee(op, core_exchange_rate)?;
    if *op.fee() == fee {
      Ok(fee)
    } else {
      Err(FeeError::Unstable)
    }
  }
}
