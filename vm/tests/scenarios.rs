use {
  common::{blinding, free_parameters, keypair, public, single_key, Chain},
  std::collections::BTreeSet,
  veil_primitives::{
    ed25519_dalek::Keypair,
    AssetAmount,
    BlindInput,
    BlindOutput,
    Commitment,
    TransferFromBlindOperation,
    TransferOperation,
    TransferToBlindOperation,
    CORE_ASSET,
  },
  veil_vm::{LedgerError, OperationResult},
};

mod common;

#[test]
fn account_authority_by_name() -> anyhow::Result<()> {
  let k1 = keypair();
  let k2 = keypair();
  let chain = Chain::new(free_parameters(), &[&k1], 0)?;
  let x = public(&k1).to_string();

  let only = |k: &Keypair| BTreeSet::from([public(k)]);
  assert!(chain.db.verify_account_authority(&x, &only(&k1))?);
  assert!(!chain.db.verify_account_authority(&x, &only(&k2))?);

  // ids work as well as names
  let id = chain.account(&k1).to_string();
  assert!(chain.db.verify_account_authority(&id, &only(&k1))?);

  assert_eq!(
    chain.db.verify_account_authority("nobody", &only(&k1)),
    Err(LedgerError::UnknownAccountName("nobody".into()))
  );
  Ok(())
}

#[test]
fn blind_round_trip_restores_supply() -> anyhow::Result<()> {
  let alice = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice], 1000)?;
  let from = chain.account(&alice);
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 0);

  let r = blinding();
  let commitment = Commitment::new(&r, 100);
  chain.push(
    vec![TransferToBlindOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(100),
      from,
      blinding_factor: r,
      outputs: vec![BlindOutput {
        commitment,
        range_proof: vec![],
        owner: single_key(&alice),
      }],
    }
    .into()],
    &[&alice],
  )?;
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 100);
  assert_eq!(chain.db.get_balance(from, CORE_ASSET).amount, 900);

  let spend = TransferFromBlindOperation {
    fee: AssetAmount::core(10),
    amount: AssetAmount::core(90),
    to: from,
    blinding_factor: r,
    inputs: vec![BlindInput {
      commitment,
      owner: single_key(&alice),
    }],
  };
  chain.push(vec![spend.clone().into()], &[&alice])?;
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 0);
  assert_eq!(chain.db.get_balance(from, CORE_ASSET).amount, 990);
  assert!(chain.db.get_blinded_balances(&[commitment]).is_empty());

  let again = chain.push(vec![spend.into()], &[&alice]).unwrap_err();
  assert_eq!(again.root(), &LedgerError::UnknownCommitment(commitment));
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 0);
  Ok(())
}

#[test]
fn transfer_to_new_key_creates_account() -> anyhow::Result<()> {
  let alice = keypair();
  let newcomer = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice], 1000)?;
  let name = public(&newcomer).to_string();
  assert!(chain.db.get_account_by_name(&name).is_none());
  let registered = |chain: &Chain| {
    chain.db.dynamic_properties().accounts_registered_this_interval
  };
  let before = registered(&chain);

  let processed = chain.push(
    vec![TransferOperation {
      fee: AssetAmount::core(0),
      from: chain.account(&alice),
      to: public(&newcomer),
      amount: AssetAmount::core(250),
      memo: None,
    }
    .into()],
    &[&alice],
  )?;

  let created = chain
    .db
    .get_account_by_name(&name)
    .cloned()
    .expect("account was created");
  assert_eq!(processed.operation_results, vec![OperationResult::Account(
    created.id
  )]);
  assert_eq!(created.owner, single_key(&newcomer));
  assert_eq!(chain.db.get_balance(created.id, CORE_ASSET).amount, 250);
  assert_eq!(registered(&chain), before + 1);

  // a second transfer lands in the same account
  chain.push(
    vec![TransferOperation {
      fee: AssetAmount::core(0),
      from: chain.account(&alice),
      to: public(&newcomer),
      amount: AssetAmount::core(50),
      memo: None,
    }
    .into()],
    &[&alice],
  )?;
  assert_eq!(chain.db.get_balance(created.id, CORE_ASSET).amount, 300);
  assert_eq!(registered(&chain), before + 1);
  Ok(())
}
