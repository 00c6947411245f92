use {
  common::{blinding, free_parameters, keypair, public, scalar, single_key, Chain},
  veil_primitives::{
    stealth_owner_secret,
    AssetAmount,
    BlindInput,
    BlindOutput,
    BlindTransferOperation,
    BlindingFactor,
    Commitment,
    ConfidentialInput,
    ConfidentialOutput,
    Memo,
    Operation,
    OutputExtension,
    PlaintextPayout,
    Scalar,
    StealthAddress,
    TransferFromBlindOperation,
    TransferFromConfidentialOperation,
    TransferToConfidentialOperation,
    TransferToBlindOperation,
    CORE_ASSET,
    NULL_ACCOUNT,
    TEMP_ACCOUNT,
  },
  veil_vm::LedgerError,
};

mod common;

/// Wallet side of a stealth recipient.
struct Recipient {
  scan: Scalar,
  spend: Scalar,
}

impl Recipient {
  fn new() -> Self {
    Self {
      scan: scalar(),
      spend: scalar(),
    }
  }

  fn address(&self) -> StealthAddress {
    StealthAddress::from_secrets(&self.scan, &self.spend)
  }

  fn output(&self, commitment: Commitment) -> ConfidentialOutput {
    let (tx_key, owner) = self
      .address()
      .one_time_keys(&scalar())
      .expect("valid address");
    ConfidentialOutput {
      commitment,
      tx_key,
      owner,
      data: vec![0xAA; 8],
      extension: OutputExtension::None,
    }
  }

  fn owner_secret(&self, output: &ConfidentialOutput) -> Scalar {
    stealth_owner_secret(&self.scan, &self.spend, &output.tx_key)
      .expect("valid tx key")
  }
}

#[test]
fn blinded_value_is_conserved() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 1000)?;
  let (alice_id, bob_id) = (chain.account(&alice), chain.account(&bob));

  let r1 = blinding();
  let c1 = Commitment::new(&r1, 100);
  chain.push(
    vec![TransferToBlindOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(100),
      from: alice_id,
      blinding_factor: r1,
      outputs: vec![BlindOutput {
        commitment: c1,
        range_proof: vec![],
        owner: single_key(&alice),
      }],
    }
    .into()],
    &[&alice],
  )?;

  // 100 in, 60 + 36 out, 4 left in the clear as fee
  let r2 = blinding();
  let r3 = BlindingFactor::sum(&[r1], &[r2]);
  let c2 = Commitment::new(&r2, 60);
  let c3 = Commitment::new(&r3, 36);
  chain.push(
    vec![BlindTransferOperation {
      fee: AssetAmount::core(4),
      inputs: vec![BlindInput {
        commitment: c1,
        owner: single_key(&alice),
      }],
      outputs: vec![
        BlindOutput {
          commitment: c2,
          range_proof: vec![1],
          owner: single_key(&bob),
        },
        BlindOutput {
          commitment: c3,
          range_proof: vec![1],
          owner: single_key(&bob),
        },
      ],
    }
    .into()],
    &[&alice],
  )?;
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 96);
  assert_eq!(chain.db.get_blinded_balances(&[c1, c2, c3]).len(), 2);

  // the fee passes through the temporary account
  assert_eq!(chain.db.get_balance(TEMP_ACCOUNT, CORE_ASSET).amount, 0);

  chain.push(
    vec![TransferFromBlindOperation {
      fee: AssetAmount::core(6),
      amount: AssetAmount::core(90),
      to: bob_id,
      blinding_factor: r1,
      inputs: vec![
        BlindInput {
          commitment: c2,
          owner: single_key(&bob),
        },
        BlindInput {
          commitment: c3,
          owner: single_key(&bob),
        },
      ],
    }
    .into()],
    &[&bob],
  )?;

  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 0);
  assert_eq!(chain.db.get_balance(alice_id, CORE_ASSET).amount, 900);
  assert_eq!(chain.db.get_balance(bob_id, CORE_ASSET).amount, 1090);
  Ok(())
}

#[test]
fn blind_inputs_need_their_owner() -> anyhow::Result<()> {
  let alice = keypair();
  let mallory = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &mallory], 1000)?;

  let r = blinding();
  let commitment = Commitment::new(&r, 50);
  chain.push(
    vec![TransferToBlindOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(50),
      from: chain.account(&alice),
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

  // claiming the balance under a different owner
  let steal = TransferFromBlindOperation {
    fee: AssetAmount::core(0),
    amount: AssetAmount::core(50),
    to: chain.account(&mallory),
    blinding_factor: r,
    inputs: vec![BlindInput {
      commitment,
      owner: single_key(&mallory),
    }],
  };
  let error = chain.push(vec![steal.into()], &[&mallory]).unwrap_err();
  assert_eq!(error.root(), &LedgerError::CommitmentOwnerMismatch(commitment));
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 50);
  Ok(())
}

#[test]
fn confidential_outputs_flow_to_stealth_owner() -> anyhow::Result<()> {
  let alice = keypair();
  let carol = keypair();
  let bob = Recipient::new();
  let mut chain = Chain::new(free_parameters(), &[&alice, &carol], 1000)?;
  let alice_id = chain.account(&alice);

  let r = blinding();
  let received = bob.output(Commitment::new(&r, 100));
  chain.push(
    vec![TransferToConfidentialOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(100),
      from: alice_id,
      blinding_factor: r,
      outputs: vec![received.clone()],
    }
    .into()],
    &[&alice],
  )?;
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 100);

  let sent = chain.db.get_transaction_details(alice_id);
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].to_account, NULL_ACCOUNT);
  assert_eq!(sent[0].amount, AssetAmount::core(100));
  assert_eq!(sent[0].description, "confidential transfer");

  let spend_key = bob.address().spend_key;
  let found = chain
    .db
    .get_confidential_transactions(&bob.scan, &spend_key, true);
  assert_eq!(found.len(), 1);
  assert_eq!(found[0].commitment, received.commitment);
  assert_eq!(found[0].asset_id, CORE_ASSET);

  // someone else scanning sees nothing
  let stranger = Recipient::new();
  assert!(chain
    .db
    .get_confidential_transactions(&stranger.scan, &spend_key, false)
    .is_empty());

  // 100 = 65 change + 30 paid out to carol + 5 fee
  let r_change = blinding();
  let change = bob.output(Commitment::new(&r_change, 65));
  let spend = TransferFromConfidentialOperation {
    fee: AssetAmount::core(5),
    blinding_factor: BlindingFactor::sum(&[r], &[r_change]),
    inputs: vec![ConfidentialInput {
      commitment: received.commitment,
      owner: received.owner,
    }],
    outputs: vec![change.clone()],
    payouts: vec![PlaintextPayout {
      to: public(&carol),
      amount: AssetAmount::core(30),
      message: Some(b"rent".to_vec()),
    }],
  };
  let mut tx = chain.transaction(vec![spend.clone().into()]);
  tx.sign_with_scalar(&bob.owner_secret(&received))?;
  chain.db.push_transaction(&tx)?;

  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 65);
  let carol_id = chain.account(&carol);
  assert_eq!(chain.db.get_balance(carol_id, CORE_ASSET).amount, 1030);

  let paid = chain.db.get_transaction_details(carol_id);
  assert_eq!(paid.len(), 1);
  assert_eq!(paid[0].from_account, TEMP_ACCOUNT);
  assert_eq!(paid[0].amount, AssetAmount::core(30));
  assert_eq!(paid[0].fee, AssetAmount::core(0));
  assert_eq!(paid[0].memo, Some(Memo::plain(b"rent".to_vec())));

  let unspent = chain
    .db
    .get_confidential_transactions(&bob.scan, &spend_key, true);
  assert_eq!(unspent.len(), 1);
  assert_eq!(unspent[0].commitment, change.commitment);

  let all = chain
    .db
    .get_confidential_transactions(&bob.scan, &spend_key, false);
  assert_eq!(all.len(), 2);
  assert!(!all[0].unspent);

  // spent stays spent
  let mut again = chain.transaction(vec![spend.into()]);
  again.sign_with_scalar(&bob.owner_secret(&received))?;
  let error = chain.db.push_transaction(&again).unwrap_err();
  assert_eq!(
    error.root(),
    &LedgerError::AlreadySpent(received.commitment)
  );
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 65);
  assert!(!chain
    .db
    .get_confidential_transactions(&bob.scan, &spend_key, false)[0]
    .unspent);
  Ok(())
}

#[test]
fn confidential_spend_needs_stealth_signature() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = Recipient::new();
  let mut chain = Chain::new(free_parameters(), &[&alice], 1000)?;
  let alice_id = chain.account(&alice);

  let r = blinding();
  let received = bob.output(Commitment::new(&r, 40));
  chain.push(
    vec![TransferToConfidentialOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(40),
      from: alice_id,
      blinding_factor: r,
      outputs: vec![received.clone()],
    }
    .into()],
    &[&alice],
  )?;

  // everything back out in the clear, nothing left hidden
  let spend = TransferFromConfidentialOperation {
    fee: AssetAmount::core(0),
    blinding_factor: r,
    inputs: vec![ConfidentialInput {
      commitment: received.commitment,
      owner: received.owner,
    }],
    outputs: vec![],
    payouts: vec![PlaintextPayout {
      to: public(&alice),
      amount: AssetAmount::core(40),
      message: None,
    }],
  };
  let op: Operation = spend.into();
  op.validate()?;

  // the sender knows the amount but not the owner secret
  let result = chain.push(vec![op.clone()], &[&alice]);
  assert!(matches!(result, Err(LedgerError::Authority(_))));
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 40);

  let mut tx = chain.transaction(vec![op]);
  tx.sign_with_scalar(&bob.owner_secret(&received))?;
  chain.db.push_transaction(&tx)?;
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 0);
  assert_eq!(chain.db.get_balance(alice_id, CORE_ASSET).amount, 1000);
  Ok(())
}

#[test]
fn payouts_need_an_existing_account() -> anyhow::Result<()> {
  let alice = keypair();
  let stranger = keypair();
  let bob = Recipient::new();
  let mut chain = Chain::new(free_parameters(), &[&alice], 1000)?;

  let r = blinding();
  let received = bob.output(Commitment::new(&r, 25));
  chain.push(
    vec![TransferToConfidentialOperation {
      fee: AssetAmount::core(0),
      amount: AssetAmount::core(25),
      from: chain.account(&alice),
      blinding_factor: r,
      outputs: vec![received.clone()],
    }
    .into()],
    &[&alice],
  )?;

  let spend = TransferFromConfidentialOperation {
    fee: AssetAmount::core(0),
    blinding_factor: r,
    inputs: vec![ConfidentialInput {
      commitment: received.commitment,
      owner: received.owner,
    }],
    outputs: vec![],
    payouts: vec![PlaintextPayout {
      to: public(&stranger),
      amount: AssetAmount::core(25),
      message: None,
    }],
  };
  let mut tx = chain.transaction(vec![spend.into()]);
  tx.sign_with_scalar(&bob.owner_secret(&received))?;
  let error = chain.db.push_transaction(&tx).unwrap_err();
  assert_eq!(
    error.root(),
    &LedgerError::UnknownAccountName(public(&stranger).to_string())
  );

  assert!(chain
    .db
    .get_account_by_name(&public(&stranger).to_string())
    .is_none());
  assert_eq!(chain.db.confidential_supply(CORE_ASSET)?, 25);
  assert!(chain
    .db
    .get_confidential_transactions(&bob.scan, &bob.address().spend_key, true)
    .iter()
    .any(|output| output.commitment == received.commitment));
  Ok(())
}
