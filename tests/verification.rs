#![cfg(feature = "consensus")]

use hedged_htlc::bitcoin::*;
use hedged_htlc::role::Party;
use hedged_htlc::script::{ClaimBranch, RedemptionPath, ScriptPath};

use bitcoin::blockdata::transaction::{OutPoint, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::Transaction;

mod fixture;

use fixture::HTLC;

fn verify(tx: &Transaction, prev: &MetadataOutput) -> bool {
    tx.verify(|out_point: &OutPoint| {
        (*out_point == prev.out_point).then(|| prev.tx_out.clone())
    })
    .is_ok()
}

fn collateral_output() -> MetadataOutput {
    HTLC.claim_utxo().unwrap()
}

#[test]
fn deposit_spends_are_valid() {
    assert!(verify(&HTLC.redeem().unwrap(), &HTLC.redeem_utxo().unwrap()));
    assert!(verify(
        &HTLC.transition().unwrap(),
        &HTLC.transition_utxo().unwrap()
    ));
}

#[test]
fn collateral_spends_are_valid() {
    let prev = collateral_output();
    assert!(verify(&HTLC.claim(ScriptPath::Hashlock).unwrap(), &prev));
    assert!(verify(&HTLC.claim(ScriptPath::Timelock).unwrap(), &prev));
    assert!(verify(&HTLC.burn().unwrap(), &prev));
}

#[test]
fn transition_waits_for_deposit_timelock() {
    let prev = HTLC.transition_utxo().unwrap();
    let early = HTLC.spend(
        &RedemptionPath::Transition {
            pre_b: HTLC.preimage(Party::Bob).clone(),
            timelock: CSVTimelock::new(14),
        },
        &prev,
    );
    assert!(!verify(&early.unwrap(), &prev));
}

#[test]
fn claim_waits_for_collateral_timelock() {
    let prev = collateral_output();
    let early = HTLC.spend(
        &RedemptionPath::Claim(ClaimBranch::Timelock(CSVTimelock::new(3))),
        &prev,
    );
    assert!(!verify(&early.unwrap(), &prev));
}

#[test]
fn amount_is_committed() {
    let mut prev = HTLC.redeem_utxo().unwrap();
    let tx = HTLC.redeem().unwrap();
    prev.tx_out = TxOut {
        value: prev.tx_out.value + 1,
        ..prev.tx_out
    };
    assert!(!verify(&tx, &prev));
}

#[test]
fn transition_requires_bob_secret() {
    let prev = HTLC.transition_utxo().unwrap();
    let mut tx = HTLC.transition().unwrap();
    let mut stack = tx.input[0].witness.to_vec();
    // swap Bob's secret for Alice's
    stack[0] = HTLC.preimage(Party::Alice).as_bytes().to_vec();
    tx.input[0].witness = Witness::from_vec(stack);
    assert!(!verify(&tx, &prev));
}
