use {
  common::{free_parameters, keypair, public, single_key, Chain, GENESIS_TIME},
  veil_primitives::{
    ed25519_dalek::Keypair,
    AccountId,
    AccountUpdateOperation,
    AssetAmount,
    Authority,
    ChainParameters,
    MinerUpdateGlobalParametersOperation,
    Operation,
    ProposalCreateOperation,
    ProposalDeleteOperation,
    ProposalId,
    ProposalUpdateOperation,
    TransferOperation,
    CORE_ASSET,
  },
  veil_vm::{Genesis, GenesisAccount, LedgerError, OperationResult},
};

mod common;

const HOUR: u32 = 60 * 60;
const DAY: u32 = 24 * HOUR;

fn propose(
  chain: &mut Chain,
  proposer: &Keypair,
  ops: Vec<Operation>,
  lifetime: u32,
  review_period_seconds: Option<u32>,
) -> Result<ProposalId, LedgerError> {
  let op = ProposalCreateOperation {
    fee: AssetAmount::core(0),
    fee_paying_account: chain.account(proposer),
    expiration_time: chain.db.head_block_time() + lifetime,
    proposed_ops: ops,
    review_period_seconds,
  };
  let processed = chain.push(vec![op.into()], &[proposer])?;
  match processed.operation_results[..] {
    [OperationResult::Proposal(id)] => Ok(id),
    ref other => panic!("unexpected results {other:?}"),
  }
}

fn approval(fee_paying_account: AccountId, proposal: ProposalId) -> ProposalUpdateOperation {
  ProposalUpdateOperation {
    fee: AssetAmount::core(0),
    fee_paying_account,
    proposal,
    ..Default::default()
  }
}

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
fn approved_proposal_executes_immediately() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let (a, b) = (chain.account(&alice), chain.account(&bob));

  let id = propose(&mut chain, &alice, vec![transfer(a, &bob, 10)], HOUR, None)?;
  let proposal = chain.db.proposal(id).expect("proposal exists");
  assert_eq!(proposal.required_active_approvals, [a].into());
  assert!(proposal.required_owner_approvals.is_empty());
  assert_eq!(chain.db.get_balance(b, CORE_ASSET).amount, 100);

  chain.push(
    vec![ProposalUpdateOperation {
      active_approvals_to_add: [a].into(),
      ..approval(a, id)
    }
    .into()],
    &[&alice],
  )?;

  assert!(chain.db.proposal(id).is_none());
  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 90);
  assert_eq!(chain.db.get_balance(b, CORE_ASSET).amount, 110);
  Ok(())
}

#[test]
fn active_approval_does_not_replace_owner() -> anyhow::Result<()> {
  let alice = keypair();
  let heir = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice], 100)?;
  let a = chain.account(&alice);

  let rekey = AccountUpdateOperation {
    fee: AssetAmount::core(0),
    account: a,
    owner: Some(single_key(&heir)),
    new_options: None,
  };
  let id = propose(&mut chain, &alice, vec![rekey.into()], HOUR, None)?;

  chain.push(
    vec![ProposalUpdateOperation {
      active_approvals_to_add: [a].into(),
      ..approval(a, id)
    }
    .into()],
    &[&alice],
  )?;
  assert!(chain.db.proposal(id).is_some());
  assert_eq!(chain.db.get_account(a)?.owner, single_key(&alice));

  chain.push(
    vec![ProposalUpdateOperation {
      owner_approvals_to_add: [a].into(),
      ..approval(a, id)
    }
    .into()],
    &[&alice],
  )?;
  assert!(chain.db.proposal(id).is_none());
  assert_eq!(chain.db.get_account(a)?.owner, single_key(&heir));
  Ok(())
}

#[test]
fn failed_execution_is_recorded() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let a = chain.account(&alice);

  let id = propose(&mut chain, &alice, vec![transfer(a, &bob, 1000)], HOUR, None)?;
  chain.push(
    vec![ProposalUpdateOperation {
      active_approvals_to_add: [a].into(),
      ..approval(a, id)
    }
    .into()],
    &[&alice],
  )?;

  let proposal = chain.db.proposal(id).expect("failed proposal stays");
  assert!(proposal.fail_reason.is_some());
  assert_eq!(chain.db.get_balance(a, CORE_ASSET).amount, 100);

  // a second approval of the same account is refused
  let again = chain.push(
    vec![ProposalUpdateOperation {
      active_approvals_to_add: [a].into(),
      ..approval(a, id)
    }
    .into()],
    &[&alice],
  );
  assert_eq!(
    again.unwrap_err().root(),
    &LedgerError::ApprovalAlreadyPresent(a.to_string())
  );
  Ok(())
}

#[test]
fn only_required_approvers_delete() -> anyhow::Result<()> {
  let alice = keypair();
  let bob = keypair();
  let mut chain = Chain::new(free_parameters(), &[&alice, &bob], 100)?;
  let (a, b) = (chain.account(&alice), chain.account(&bob));

  let id = propose(&mut chain, &alice, vec![transfer(a, &bob, 10)], HOUR, None)?;
  let delete = |account| -> Operation {
    ProposalDeleteOperation {
      fee: AssetAmount::core(0),
      fee_paying_account: account,
      using_owner_authority: false,
      proposal: id,
    }
    .into()
  };

  let refused = chain.push(vec![delete(b)], &[&bob]).unwrap_err();
  assert_eq!(refused.root(), &LedgerError::NotRequiredApprover(b));

  chain.push(vec![delete(a)], &[&alice])?;
  assert!(chain.db.proposal(id).is_none());
  Ok(())
}

fn miner_chain(council: &Keypair) -> anyhow::Result<Chain> {
  Chain::with_genesis(Genesis {
    initial_timestamp: GENESIS_TIME,
    parameters: free_parameters(),
    miner_authority: Some(Authority::single_key(public(council))),
    accounts: vec![GenesisAccount {
      key: public(council),
      balances: [("VEIL".to_owned(), 100)].into(),
    }],
    ..Default::default()
  })
}

fn new_parameters() -> ChainParameters {
  ChainParameters {
    maximum_miner_count: 21,
    ..free_parameters()
  }
}

#[test]
fn miner_proposals_need_review() -> anyhow::Result<()> {
  let council = keypair();
  let mut chain = miner_chain(&council)?;

  let update: Operation = MinerUpdateGlobalParametersOperation {
    fee: AssetAmount::core(0),
    new_parameters: new_parameters(),
  }
  .into();
  let refused = propose(&mut chain, &council, vec![update], 2 * DAY, None);
  assert_eq!(
    refused.unwrap_err().root(),
    &LedgerError::ReviewPeriodRequired(DAY)
  );

  // and cannot be applied directly either
  let direct = chain.push(
    vec![MinerUpdateGlobalParametersOperation {
      fee: AssetAmount::core(0),
      new_parameters: new_parameters(),
    }
    .into()],
    &[&council],
  );
  assert!(matches!(
    direct.unwrap_err().root(),
    LedgerError::ProposalOnly(_)
  ));
  Ok(())
}

#[test]
fn parameters_change_after_review_and_block() -> anyhow::Result<()> {
  let council = keypair();
  let mut chain = miner_chain(&council)?;
  let c = chain.account(&council);

  let update: Operation = MinerUpdateGlobalParametersOperation {
    fee: AssetAmount::core(0),
    new_parameters: new_parameters(),
  }
  .into();
  let id = propose(&mut chain, &council, vec![update], 2 * DAY, Some(DAY))?;

  chain.push(
    vec![ProposalUpdateOperation {
      key_approvals_to_add: [public(&council)].into(),
      ..approval(c, id)
    }
    .into()],
    &[&council],
  )?;

  // fully approved, but waits for its expiration
  assert!(chain.db.proposal(id).is_some());

  // no more approvals once the review period started
  chain.advance(DAY)?;
  let late = chain.push(
    vec![ProposalUpdateOperation {
      key_approvals_to_remove: [public(&council)].into(),
      active_approvals_to_add: [c].into(),
      ..approval(c, id)
    }
    .into()],
    &[&council],
  );
  assert!(matches!(
    late.unwrap_err().root(),
    LedgerError::ReviewPeriodStarted(_)
  ));

  chain.advance(DAY)?;
  assert!(chain.db.proposal(id).is_none());
  assert_eq!(chain.db.parameters().maximum_miner_count, 1001);
  assert_eq!(
    chain.db.global_properties().pending_parameters,
    Some(new_parameters())
  );

  chain.advance(1)?;
  assert_eq!(chain.db.parameters(), &new_parameters());
  assert!(chain.db.global_properties().pending_parameters.is_none());
  Ok(())
}
