use {
  super::{RequiredAuthorities, ValidationError},
  crate::{
    verify_sum,
    AccountId,
    AssetAmount,
    AssetId,
    Authority,
    BlindingFactor,
    Commitment,
    PublicKey,
    RangeProof,
    TEMP_ACCOUNT,
  },
  serde::{Deserialize, Serialize},
  std::collections::BTreeSet,
};

/// A new blinded balance spendable by `owner`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindOutput {
  pub commitment: Commitment,

  /// Empty when the operation has a single output.
  pub range_proof: RangeProof,
  pub owner: Authority,
}

/// Reference to an existing blinded balance being consumed in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindInput {
  pub commitment: Commitment,

  /// Must equal the owner recorded with the blinded balance.
  pub owner: Authority,
}

/// Optional payload of a confidential output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputExtension {
  #[default]
  None,
  RangeProof(RangeProof),
  Extended {
    range_proof: RangeProof,
    message: Vec<u8>,
  },
}

impl OutputExtension {
  pub fn range_proof(&self) -> Option<&RangeProof> {
    match self {
      Self::None => None,
      Self::RangeProof(proof) => Some(proof),
      Self::Extended { range_proof, .. } => Some(range_proof),
    }
  }

  pub fn message(&self) -> Option<&[u8]> {
    match self {
      Self::Extended { message, .. } => Some(message),
      _ => None,
    }
  }
}

/// An output addressed to a stealth owner key.
///
/// `tx_key` is the sender's one-time public key that lets the recipient
/// recognise the output, `data` is the amount encrypted to the
/// recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialOutput {
  pub commitment: Commitment,
  pub tx_key: PublicKey,
  pub owner: PublicKey,
  pub data: Vec<u8>,
  pub extension: OutputExtension,
}

impl ConfidentialOutput {
  fn has_range_proof(&self) -> bool {
    self
      .extension
      .range_proof()
      .map(|proof| !proof.is_empty())
      .unwrap_or(false)
  }
}

/// Reference to an unspent confidential output.
///
/// Spending it requires a signature of its stealth `owner` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidentialInput {
  pub commitment: Commitment,
  pub owner: PublicKey,
}

/// Pays part of the spent confidential value out in the open to the
/// account named after `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaintextPayout {
  pub to: PublicKey,
  pub amount: AssetAmount,

  /// Plain memo for the recipient, carried in the pseudo output's
  /// extension.
  #[serde(default)]
  pub message: Option<Vec<u8>>,
}

impl PlaintextPayout {
  /// Packs the amount into 16 bytes, little endian amount followed by
  /// little endian asset instance. The bytes travel in the clear.
  pub fn encode_data(amount: &AssetAmount) -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    data.extend_from_slice(&(amount.amount as u64).to_le_bytes());
    data.extend_from_slice(&amount.asset_id.0.to_le_bytes());
    data
  }

  pub fn decode_data(data: &[u8]) -> Option<AssetAmount> {
    if data.len() != 16 {
      return None;
    }
    let mut value = [0u8; 8];
    let mut unit = [0u8; 8];
    value.copy_from_slice(&data[..8]);
    unit.copy_from_slice(&data[8..]);
    Some(AssetAmount::new(
      u64::from_le_bytes(value) as i64,
      AssetId(u64::from_le_bytes(unit)),
    ))
  }

  /// The pseudo output that carries this payout through the same path
  /// as confidential outputs. Its commitment is the identity.
  pub fn to_output(&self) -> ConfidentialOutput {
    ConfidentialOutput {
      commitment: Commitment::identity(),
      tx_key: self.to,
      owner: self.to,
      data: Self::encode_data(&self.amount),
      extension: match &self.message {
        Some(message) => OutputExtension::Extended {
          range_proof: vec![],
          message: message.clone(),
        },
        None => OutputExtension::None,
      },
    }
  }
}

fn positive(amount: &AssetAmount, field: &'static str) -> Result<u64, ValidationError> {
  if amount.amount <= 0 {
    return Err(ValidationError::NonPositiveAmount(field));
  }
  Ok(amount.amount as u64)
}

fn same_asset(expected: AssetId, found: AssetId) -> Result<(), ValidationError> {
  if expected != found {
    return Err(ValidationError::AssetMismatch { expected, found });
  }
  Ok(())
}

fn unique<'a>(
  commitments: impl Iterator<Item = &'a Commitment>,
) -> Result<(), ValidationError> {
  let mut seen = BTreeSet::new();
  for commitment in commitments {
    if !seen.insert(commitment) {
      return Err(ValidationError::DuplicateCommitment(*commitment));
    }
  }
  Ok(())
}

fn check_blind_outputs(outputs: &[BlindOutput]) -> Result<(), ValidationError> {
  if outputs.is_empty() {
    return Err(ValidationError::NoOutputs);
  }
  unique(outputs.iter().map(|o| &o.commitment))?;
  for out in outputs {
    if out.commitment.is_identity() {
      return Err(ValidationError::IdentityCommitment);
    }
    if outputs.len() > 1 && out.range_proof.is_empty() {
      return Err(ValidationError::MissingRangeProof);
    }
    if out.owner.is_impossible() {
      return Err(ValidationError::ImpossibleAuthority);
    }
  }
  Ok(())
}

fn check_confidential_outputs(
  outputs: &[ConfidentialOutput],
) -> Result<(), ValidationError> {
  unique(outputs.iter().map(|o| &o.commitment))?;
  for out in outputs {
    if out.commitment.is_identity() {
      return Err(ValidationError::IdentityCommitment);
    }
    if outputs.len() > 1 && !out.has_range_proof() {
      return Err(ValidationError::MissingRangeProof);
    }
  }
  Ok(())
}

fn commitments<T>(items: &[T], f: impl Fn(&T) -> Commitment) -> Vec<Commitment> {
  items.iter().map(f).collect()
}

/// Moves an open balance into one or more blinded balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferToBlindOperation {
  pub fee: AssetAmount,
  pub amount: AssetAmount,
  pub from: AccountId,

  /// Sum of the output blinding factors, lets anyone check that the
  /// outputs commit to exactly `amount`.
  pub blinding_factor: BlindingFactor,
  pub outputs: Vec<BlindOutput>,
}

impl TransferToBlindOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.from
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.from);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    let amount = positive(&self.amount, "amount")?;
    check_blind_outputs(&self.outputs)?;

    let net = Commitment::new(&self.blinding_factor, amount);
    let outputs = commitments(&self.outputs, |o| o.commitment);
    if !verify_sum(&[net], &outputs, 0) {
      return Err(ValidationError::CommitmentMismatch);
    }
    Ok(())
  }
}

/// Spends blinded balances into the open balance of `to`.
///
/// Nobody in particular pays for this, the fee comes out of the spent
/// value through the temporary account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromBlindOperation {
  pub fee: AssetAmount,
  pub amount: AssetAmount,
  pub to: AccountId,
  pub blinding_factor: BlindingFactor,
  pub inputs: Vec<BlindInput>,
}

impl TransferFromBlindOperation {
  pub fn fee_payer(&self) -> AccountId {
    TEMP_ACCOUNT
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.other.extend(self.inputs.iter().map(|i| i.owner.clone()));
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    let amount = positive(&self.amount, "amount")?;
    same_asset(self.fee.asset_id, self.amount.asset_id)?;
    if self.inputs.is_empty() {
      return Err(ValidationError::NoInputs);
    }
    unique(self.inputs.iter().map(|i| &i.commitment))?;

    let total = amount
      .checked_add(self.fee.amount as u64)
      .ok_or(ValidationError::Overflow)?;
    let net = Commitment::new(&self.blinding_factor, total);
    let inputs = commitments(&self.inputs, |i| i.commitment);
    if !verify_sum(&inputs, &[net], 0) {
      return Err(ValidationError::CommitmentMismatch);
    }
    Ok(())
  }
}

/// Spends blinded balances into new blinded balances, leaving the fee
/// in the clear.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindTransferOperation {
  pub fee: AssetAmount,
  pub inputs: Vec<BlindInput>,
  pub outputs: Vec<BlindOutput>,
}

impl BlindTransferOperation {
  pub fn fee_payer(&self) -> AccountId {
    TEMP_ACCOUNT
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.other.extend(self.inputs.iter().map(|i| i.owner.clone()));
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.inputs.is_empty() {
      return Err(ValidationError::NoInputs);
    }
    unique(self.inputs.iter().map(|i| &i.commitment))?;
    check_blind_outputs(&self.outputs)?;

    let inputs = commitments(&self.inputs, |i| i.commitment);
    let outputs = commitments(&self.outputs, |o| o.commitment);
    if !verify_sum(&inputs, &outputs, self.fee.amount as u64) {
      return Err(ValidationError::CommitmentMismatch);
    }
    Ok(())
  }
}

/// Moves an open balance into confidential outputs addressed to
/// stealth keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferToConfidentialOperation {
  pub fee: AssetAmount,
  pub amount: AssetAmount,
  pub from: AccountId,
  pub blinding_factor: BlindingFactor,
  pub outputs: Vec<ConfidentialOutput>,
}

impl TransferToConfidentialOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.from
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.from);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    let amount = positive(&self.amount, "amount")?;
    if self.outputs.is_empty() {
      return Err(ValidationError::NoOutputs);
    }
    check_confidential_outputs(&self.outputs)?;

    let net = Commitment::new(&self.blinding_factor, amount);
    let outputs = commitments(&self.outputs, |o| o.commitment);
    if !verify_sum(&[net], &outputs, 0) {
      return Err(ValidationError::CommitmentMismatch);
    }
    Ok(())
  }
}

/// Spends confidential outputs into new confidential outputs and/or
/// plaintext payouts to named accounts.
///
/// `blinding_factor` blinds the value leaving in the clear (fee plus
/// payouts), so that inputs balance against outputs plus that net.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFromConfidentialOperation {
  pub fee: AssetAmount,
  pub blinding_factor: BlindingFactor,
  pub inputs: Vec<ConfidentialInput>,
  pub outputs: Vec<ConfidentialOutput>,
  pub payouts: Vec<PlaintextPayout>,
}

impl TransferFromConfidentialOperation {
  pub fn fee_payer(&self) -> AccountId {
    TEMP_ACCOUNT
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths
      .other
      .extend(self.inputs.iter().map(|i| Authority::single_key(i.owner)));
  }

  /// User supplied outputs never carry the identity commitment, that
  /// marker is reserved for the pseudo outputs built from `payouts`.
  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.inputs.is_empty() {
      return Err(ValidationError::NoInputs);
    }
    if self.outputs.is_empty() && self.payouts.is_empty() {
      return Err(ValidationError::NoOutputs);
    }
    unique(self.inputs.iter().map(|i| &i.commitment))?;
    check_confidential_outputs(&self.outputs)?;

    let mut excess = self.fee.amount as u64;
    for payout in &self.payouts {
      same_asset(self.fee.asset_id, payout.amount.asset_id)?;
      let amount = positive(&payout.amount, "payout")?;
      excess = excess.checked_add(amount).ok_or(ValidationError::Overflow)?;
    }

    let net = Commitment::new(&self.blinding_factor, excess);
    let inputs = commitments(&self.inputs, |i| i.commitment);
    let mut outputs = commitments(&self.outputs, |o| o.commitment);
    outputs.push(net);
    if !verify_sum(&inputs, &outputs, 0) {
      return Err(ValidationError::CommitmentMismatch);
    }
    Ok(())
  }

  /// Outputs followed by one pseudo output per payout.
  pub fn expanded_outputs(&self) -> Vec<ConfidentialOutput> {
    self
      .outputs
      .iter()
      .cloned()
      .chain(self.payouts.iter().map(PlaintextPayout::to_output))
      .collect()
  }
}
