use {
  super::{RequiredAuthorities, ValidationError},
  crate::{
    AccountId,
    AssetAmount,
    ChainParameters,
    MinerId,
    PublicKey,
    MINER_ACCOUNT,
  },
  serde::{Deserialize, Serialize},
};

pub const MAX_URL_LENGTH: usize = 127;

fn check_url(url: &str) -> Result<(), ValidationError> {
  if url.len() > MAX_URL_LENGTH {
    return Err(ValidationError::UrlTooLong(url.len()));
  }
  Ok(())
}

/// Registers an account as a block producer candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerCreateOperation {
  pub fee: AssetAmount,
  pub miner_account: AccountId,
  pub url: String,
  pub block_signing_key: PublicKey,
}

impl MinerCreateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.miner_account
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.miner_account);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    check_url(&self.url)
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerUpdateOperation {
  pub fee: AssetAmount,
  pub miner: MinerId,
  pub miner_account: AccountId,
  pub new_url: Option<String>,
  pub new_signing_key: Option<PublicKey>,
}

impl MinerUpdateOperation {
  pub fn fee_payer(&self) -> AccountId {
    self.miner_account
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(self.miner_account);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    if self.new_url.is_none() && self.new_signing_key.is_none() {
      return Err(ValidationError::NothingToUpdate);
    }
    if let Some(url) = &self.new_url {
      check_url(url)?;
    }
    Ok(())
  }
}

/// Replaces the chain parameters starting with the next block.
///
/// Paid by the miner account, which means it can only ever be executed
/// as part of an approved proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerUpdateGlobalParametersOperation {
  pub fee: AssetAmount,
  pub new_parameters: ChainParameters,
}

impl MinerUpdateGlobalParametersOperation {
  pub fn fee_payer(&self) -> AccountId {
    MINER_ACCOUNT
  }

  pub fn required_authorities(&self, auths: &mut RequiredAuthorities) {
    auths.active.insert(MINER_ACCOUNT);
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    ValidationError::check_fee(&self.fee)?;
    self.new_parameters.validate()
  }
}
