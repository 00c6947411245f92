use {
  crate::{database::Database, error::LedgerError},
  serde::{Deserialize, Serialize},
  veil_primitives::{AssetAmount, AssetId, FeeSchedule, Operation, Price},
};

/// How deep proposals may nest inside each other when being priced.
pub const MAX_FEE_RECURSION: u32 = 4;

/// Price of one operation. Proposals also carry the prices of the
/// operations they wrap, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeResult {
  Fee(AssetAmount),
  Proposal {
    fee: AssetAmount,
    nested: Vec<FeeResult>,
  },
}

impl FeeResult {
  pub fn fee(&self) -> AssetAmount {
    match self {
      FeeResult::Fee(fee) => *fee,
      FeeResult::Proposal { fee, .. } => *fee,
    }
  }
}

struct FeePricer<'a> {
  schedule: &'a FeeSchedule,
  rate: &'a Price,
  current_recursion: u32,
}

impl FeePricer<'_> {
  fn price(&mut self, op: &mut Operation) -> Result<FeeResult, LedgerError> {
    let nested = match op {
      Operation::ProposalCreate(proposal) => {
        let mut nested = Vec::with_capacity(proposal.proposed_ops.len());
        for inner in &mut proposal.proposed_ops {
          if self.current_recursion >= MAX_FEE_RECURSION {
            return Err(LedgerError::FeeRecursionExceeded(MAX_FEE_RECURSION));
          }
          self.current_recursion += 1;
          let priced = self.price(inner);
          self.current_recursion -= 1;
          nested.push(priced?);
        }
        Some(nested)
      }
      _ => None,
    };

    // nested fees are in place now, so the proposal is priced at its
    // final size
    let fee = self.schedule.set_fee(op, self.rate)?;
    Ok(match nested {
      Some(nested) => FeeResult::Proposal { fee, nested },
      None => FeeResult::Fee(fee),
    })
  }
}

/// Prices every operation in `fee_asset` under the current fee
/// schedule. The operations themselves are left untouched, pricing
/// happens on private copies.
pub fn get_required_fees(
  db: &Database,
  ops: &[Operation],
  fee_asset: AssetId,
) -> Result<Vec<FeeResult>, LedgerError> {
  let asset = db.asset(fee_asset)?;
  let mut pricer = FeePricer {
    schedule: &db.parameters().current_fees,
    rate: &asset.core_exchange_rate,
    current_recursion: 0,
  };

  ops
    .iter()
    .map(|op| pricer.price(&mut op.clone()))
    .collect()
}

#[cfg(test)]
mod tests {
  use {
    super::*,
    veil_primitives::{
      AccountId,
      ChainParameters,
      ProposalCreateOperation,
      PublicKey,
      Timestamp,
      TransferOperation,
    },
  };

  fn transfer() -> Operation {
    TransferOperation {
      fee: AssetAmount::core(0),
      from: AccountId(10),
      to: PublicKey::from_bytes([1; 32]),
      amount: AssetAmount::core(100),
      memo: None,
    }
    .into()
  }

  fn nest(levels: usize) -> Operation {
    (0..levels).fold(transfer(), |inner, _| {
      ProposalCreateOperation {
        fee: AssetAmount::core(0),
        fee_paying_account: AccountId(10),
        expiration_time: Timestamp(100),
        proposed_ops: vec![inner],
        review_period_seconds: None,
      }
      .into()
    })
  }

  fn database() -> Database {
    crate::Genesis::default().build().expect("default genesis is valid")
  }

  #[test]
  fn prices_in_order_without_touching_input() -> anyhow::Result<()> {
    let db = database();
    let ops = vec![transfer(), nest(1)];
    let fees = get_required_fees(&db, &ops, AssetId(0))?;

    assert_eq!(fees.len(), 2);
    assert_eq!(fees[0], FeeResult::Fee(AssetAmount::core(30)));
    match &fees[1] {
      FeeResult::Proposal { fee, nested } => {
        assert!(fee.amount > 0);
        assert_eq!(nested, &vec![FeeResult::Fee(AssetAmount::core(30))]);
      }
      other => panic!("expected proposal fees, got {other:?}"),
    }
    assert_eq!(ops[0].fee().amount, 0);
    Ok(())
  }

  #[test]
  fn nesting_is_bounded() {
    let db = database();
    assert!(get_required_fees(&db, &[nest(4)], AssetId(0)).is_ok());
    assert_eq!(
      get_required_fees(&db, &[nest(5)], AssetId(0)),
      Err(LedgerError::FeeRecursionExceeded(MAX_FEE_RECURSION))
    );
  }

  #[test]
  fn zero_schedule_is_free() -> anyhow::Result<()> {
    let params = ChainParameters {
      current_fees: veil_primitives::FeeSchedule::zero(),
      ..Default::default()
    };
    let db = crate::Genesis {
      parameters: params,
      ..Default::default()
    }
    .build()?;
    let fees = get_required_fees(&db, &[transfer()], AssetId(0))?;
    assert_eq!(fees[0].fee(), AssetAmount::core(0));
    Ok(())
  }
}
