use {
  common::{free_parameters, keypair, Chain, GENESIS_TIME},
  veil_primitives::{
    AccountId,
    AssetAmount,
    LinearVestingPolicy,
    Operation,
    VestingBalanceCreateOperation,
    VestingBalanceId,
    VestingBalanceWithdrawOperation,
    CORE_ASSET,
  },
  veil_vm::{LedgerError, OperationResult},
};

mod common;

fn withdraw(
  vesting_balance: VestingBalanceId,
  owner: AccountId,
  amount: i64,
) -> Operation {
  VestingBalanceWithdrawOperation {
    fee: AssetAmount::core(0),
    vesting_balance,
    owner,
    amount: AssetAmount::core(amount),
  }
  .into()
}

#[test]
fn withdraw_as_it_vests() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 2000)?;
  let (a, b) = (chain.account(&alice), chain.account(&bob));

  let processed = chain.push(
    vec![VestingBalanceCreateOperation {
      fee: AssetAmount::core(0),
      creator: a,
      owner: b,
      amount: AssetAmount::core(1000),
      policy: LinearVestingPolicy {
        begin_timestamp: GENESIS_TIME,
        vesting_cliff_seconds: 100,
        vesting_duration_seconds: 1000,
      },
    }
    .into()],
    &[&alice],
  )?;
  let id = match processed.operation_results[..] {
    [OperationResult::VestingBalance(id)] => id,
    ref other => panic!("unexpected results {other:?}"),
  };
  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 1000);

  // before the cliff nothing is available
  chain.advance(50)?;
  let early = chain.push(vec![withdraw(id, b, 1)], &[&bob]).unwrap_err();
  assert!(matches!(
    early.root(),
    LedgerError::InsufficientVested { available: 0, .. }
  ));

  // halfway
  chain.advance(450)?;
  chain.push(vec![withdraw(id, b, 300)], &[&bob])?;
  let over = chain.push(vec![withdraw(id, b, 250)], &[&bob]).unwrap_err();
  assert!(matches!(
    over.root(),
    LedgerError::InsufficientVested { available: 200, .. }
  ));

  // only the owner withdraws
  let foreign = chain.push(vec![withdraw(id, a, 100)], &[&alice]).unwrap_err();
  assert_eq!(foreign.root(), &LedgerError::NotVestingOwner {
    balance: id,
    owner: b
  });

  chain.advance(500)?;
  chain.push(vec![withdraw(id, b, 700)], &[&bob])?;
  assert_eq!(chain.db.get_balance(b, CORE_ASSET).amount, 3000);

  let vesting = chain.db.vesting_balance(id).expect("vesting balance");
  assert_eq!(vesting.balance.amount, 0);
  assert_eq!(vesting.withdrawn, 1000);
  assert_eq!(chain.db.get_transaction_details(b).len(), 2);
  Ok(())
}
