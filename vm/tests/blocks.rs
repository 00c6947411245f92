use {
  common::{free_parameters, keypair, public, Chain, GENESIS_TIME},
  veil_primitives::{
    ed25519_dalek::Keypair,
    AccountId,
    AssetAmount,
    Block,
    ChainParameters,
    Operation,
    SignedTransaction,
    Transaction,
    TransferOperation,
    CORE_ASSET,
  },
  veil_vm::LedgerError,
};

mod common;

fn transfer(from: AccountId, to: &Keypair, amount: i64) -> Operation {
  TransferOperation {
    fee: AssetAmount::core(0),
    from,
    to: public(to),
    amount: AssetAmount::core(amount),
    memo: None,
  }
  .into()
}

#[test]
fn blocks_extend_the_head() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let a = chain.account(&alice);

  let tx = chain.signed(vec![transfer(a, &bob, 5)], &[&alice]);
  let processed = chain.produce_block(10, vec![tx])?;
  assert_eq!(processed.len(), 1);
  assert_eq!(chain.db.head_block_num(), 1);
  assert_eq!(chain.db.head_block_time(), GENESIS_TIME + 10);
  assert_eq!(
    chain.db.dynamic_properties().head_block_id,
    chain.head.hash().to_bytes()
  );

  // skipping a height
  let skipped = Block::new(
    &Block::new(&chain.head, GENESIS_TIME + 20, vec![]),
    GENESIS_TIME + 30,
    vec![],
  );
  assert_eq!(
    chain.db.apply_block(&skipped),
    Err(LedgerError::UnexpectedBlockHeight {
      expected: 2,
      found: 3
    })
  );

  // right height, unknown parent
  let fork = Block::new(
    &Block::new(&Block::zero(GENESIS_TIME + 1), GENESIS_TIME + 2, vec![]),
    GENESIS_TIME + 20,
    vec![],
  );
  assert_eq!(chain.db.apply_block(&fork), Err(LedgerError::UnknownParent));

  let stale = Block::new(&chain.head, GENESIS_TIME + 10, vec![]);
  assert_eq!(
    chain.db.apply_block(&stale),
    Err(LedgerError::BlockTimeNotIncreasing {
      head: GENESIS_TIME + 10,
      found: GENESIS_TIME + 10
    })
  );
  assert_eq!(chain.db.head_block_num(), 1);
  Ok(())
}

#[test]
fn failing_transaction_undoes_the_block() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let (a, b) = (chain.account(&alice), chain.account(&bob));

  let good = chain.signed(vec![transfer(a, &bob, 50)], &[&alice]);
  let bad = chain.signed(vec![transfer(b, &alice, 500)], &[&bob]);
  let error = chain.produce_block(10, vec![good, bad]).unwrap_err();
  assert!(matches!(
    error.root(),
    LedgerError::InsufficientBalance { .. }
  ));

  assert_eq!(chain.db.head_block_num(), 0);
  assert_eq!(chain.db.head_block_time(), GENESIS_TIME);
  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 100);
  assert_eq!(chain.db.get_balance(b, CORE_ASSET).amount, 100);
  Ok(())
}

#[test]
fn expired_and_duplicate_transactions() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let a = chain.account(&alice);

  let tx = chain.signed(vec![transfer(a, &bob, 1)], &[&alice]);
  chain.db.push_transaction(&tx)?;
  assert!(matches!(
    chain.db.push_transaction(&tx),
    Err(LedgerError::DuplicateTransaction(_))
  ));

  let late = chain.signed(vec![transfer(a, &bob, 1)], &[&alice]);
  chain.advance(3600)?;
  assert!(matches!(
    chain.db.push_transaction(&late),
    Err(LedgerError::Expired { .. })
  ));

  let now = chain.db.head_block_time();
  let mut far = SignedTransaction::new(Transaction::new(
    now + chain.db.parameters().maximum_time_until_expiration + 1,
    vec![transfer(a, &bob, 1)],
  ));
  far.sign(&alice);
  assert!(matches!(
    chain.db.push_transaction(&far),
    Err(LedgerError::ExpirationTooFar { .. })
  ));

  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 99);
  Ok(())
}

#[test]
fn fees_follow_the_schedule() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(ChainParameters::default(), &[&alice, &bob], 1000)?;
  let a = chain.account(&alice);

  let unpaid = transfer(a, &bob, 100);
  let error = chain.push(vec![unpaid.clone()], &[&alice]).unwrap_err();
  assert!(matches!(error.root(), LedgerError::InsufficientFee { .. }));

  let fees = chain.db.get_required_fees(&[unpaid.clone()], CORE_ASSET)?;
  let fee = fees[0].fee();
  assert_eq!(fee, AssetAmount::core(30));

  let mut paid = unpaid;
  *paid.fee_mut() = fee;
  chain.push(vec![paid], &[&alice])?;
  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 870);

  let statistics = chain.db.account_statistics(a)?;
  assert_eq!(statistics.total_ops, 1);
  assert_eq!(statistics.pending_fees, 30);
  assert_eq!(chain.db.asset_dynamic_data(CORE_ASSET)?.accumulated_fees, 30);
  Ok(())
}
