// Copyright 2021-2022 Farcaster Devs
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 3 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301, USA

//! SegWit version 0 contracts: the deposit and collateral redeem scripts, the burn marker, and the
//! [`BIP-143`][bip-143] signing helpers used by the four spending transactions.
//!
//! [bip-143]: https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki

use crate::bitcoin::amount::ensure_covered;
use crate::bitcoin::timelock::CSVTimelock;
use crate::bitcoin::transaction::{Error, MetadataOutput, Tx, TxInRef};
use crate::bitcoin::witness::{self, StackItem};
use crate::role::Party;
use crate::script::{Commitment, DataLock, DoubleCommitments, DoubleKeys, ScriptPath};
use crate::transaction::{Error as FError, TxLabel};

use bitcoin::blockdata::opcodes::{self, all};
use bitcoin::blockdata::script::{read_scriptint, Builder, Instruction, Instructions, Script};
use bitcoin::blockdata::transaction::{EcdsaSighashType, Transaction, TxIn, TxOut};
use bitcoin::blockdata::witness::Witness;
use bitcoin::hashes::hash160;
use bitcoin::hashes::sha256d::Hash as Sha256dHash;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey, Signing};
use bitcoin::util::psbt::PartiallySignedTransaction;
use bitcoin::util::sighash::SighashCache;

mod burn;
mod claim;
mod redeem;
mod transition;

pub use burn::Burn;
pub use claim::Claim;
pub use redeem::Redeem;
pub use transition::Transition;

/// Spend the deposit contract immediately, revealing Alice's secret.
pub type RedeemTx = Tx<Redeem>;

/// Move the deposit into the collateral contract after the deposit delay, revealing Bob's secret.
pub type TransitionTx = Tx<Transition>;

/// Spend the collateral contract to Bob.
pub type ClaimTx = Tx<Claim>;

/// Spend the collateral contract to the unspendable burn output.
pub type BurnTx = Tx<Burn>;

/// A redeem script template of the hedged contracts. Both templates share the same `2-of-2`
/// multisig prefix followed by a hashlock on Alice's commitment selecting the branch.
pub trait HedgedLock: Sized {
    /// Build the witness script for the given contract data.
    fn script(data: DataLock) -> Script;

    /// Parse a witness script and return it if it follows the template, fails with
    /// [`FError::WrongTemplate`] otherwise.
    fn from_script(s: &Script) -> Result<Self, FError>;

    /// The contract data carried by the script.
    fn data(&self) -> &DataLock;

    /// The P2WSH `script_pubkey` locking an output to this contract.
    fn v0_p2wsh(data: DataLock) -> Script {
        Self::script(data).to_v0_p2wsh()
    }

    fn get_pubkey(&self, party: Party) -> &PublicKey {
        self.data().keys.get(party)
    }

    fn get_commitment(&self, party: Party) -> &Commitment {
        self.data().commitments.get(party)
    }
}

/// The deposit contract: Alice redeems with `preA` at any time, or Bob moves the funds after
/// `T` blocks with `preB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositLock {
    data: DataLock,
}

impl HedgedLock for DepositLock {
    fn script(data: DataLock) -> Script {
        let DataLock {
            timelock,
            keys,
            commitments: DoubleCommitments { alice, bob },
        } = data;
        multisig_hashlock(Builder::new(), keys, &alice)
            .push_opcode(all::OP_PUSHNUM_1)
            .push_opcode(all::OP_ELSE)
            .push_int(timelock.as_u32().into())
            .push_opcode(all::OP_CSV)
            .push_opcode(all::OP_DROP)
            .push_opcode(all::OP_HASH160)
            .push_slice(bob.as_bytes())
            .push_opcode(all::OP_EQUAL)
            .push_opcode(all::OP_ENDIF)
            .into_script()
    }

    fn from_script(s: &Script) -> Result<Self, FError> {
        let mut ints = s.instructions();
        let (keys, alice) = read_multisig_hashlock(&mut ints)?;
        expect_op(&mut ints, all::OP_PUSHNUM_1, "Missing TRUE opcode")?;
        expect_op(&mut ints, all::OP_ELSE, "Missing ELSE opcode")?;
        let timelock = read_timelock(&mut ints)?;
        expect_op(&mut ints, all::OP_CSV, "Missing CSV opcode")?;
        expect_op(&mut ints, all::OP_DROP, "Missing DROP opcode")?;
        expect_op(&mut ints, all::OP_HASH160, "Missing HASH160 opcode")?;
        let bob = read_commitment(&mut ints)?;
        expect_op(&mut ints, all::OP_EQUAL, "Missing EQUAL opcode")?;
        expect_op(&mut ints, all::OP_ENDIF, "Missing ENDIF opcode")?;
        expect_end(&mut ints)?;

        Ok(Self {
            data: DataLock {
                timelock,
                keys,
                commitments: DoubleCommitments::new(alice, bob),
            },
        })
    }

    fn data(&self) -> &DataLock {
        &self.data
    }
}

/// The collateral contract: Bob redeems with both secrets at any time or with no secret after
/// `ell` blocks. Both parties are required to sign either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollateralLock {
    data: DataLock,
}

impl HedgedLock for CollateralLock {
    fn script(data: DataLock) -> Script {
        let DataLock {
            timelock,
            keys,
            commitments: DoubleCommitments { alice, bob },
        } = data;
        multisig_hashlock(Builder::new(), keys, &alice)
            .push_opcode(all::OP_HASH160)
            .push_slice(bob.as_bytes())
            .push_opcode(all::OP_EQUAL)
            .push_opcode(all::OP_ELSE)
            .push_int(timelock.as_u32().into())
            .push_opcode(all::OP_CSV)
            .push_opcode(all::OP_DROP)
            .push_opcode(all::OP_PUSHNUM_1)
            .push_opcode(all::OP_ENDIF)
            .into_script()
    }

    fn from_script(s: &Script) -> Result<Self, FError> {
        let mut ints = s.instructions();
        let (keys, alice) = read_multisig_hashlock(&mut ints)?;
        expect_op(&mut ints, all::OP_HASH160, "Missing HASH160 opcode")?;
        let bob = read_commitment(&mut ints)?;
        expect_op(&mut ints, all::OP_EQUAL, "Missing EQUAL opcode")?;
        expect_op(&mut ints, all::OP_ELSE, "Missing ELSE opcode")?;
        let timelock = read_timelock(&mut ints)?;
        expect_op(&mut ints, all::OP_CSV, "Missing CSV opcode")?;
        expect_op(&mut ints, all::OP_DROP, "Missing DROP opcode")?;
        expect_op(&mut ints, all::OP_PUSHNUM_1, "Missing TRUE opcode")?;
        expect_op(&mut ints, all::OP_ENDIF, "Missing ENDIF opcode")?;
        expect_end(&mut ints)?;

        Ok(Self {
            data: DataLock {
                timelock,
                keys,
                commitments: DoubleCommitments::new(alice, bob),
            },
        })
    }

    fn data(&self) -> &DataLock {
        &self.data
    }
}

/// The unspendable `OP_RETURN` script receiving the burnt value through a P2SH output.
pub struct BurnLock;

impl BurnLock {
    pub fn script() -> Script {
        Builder::new().push_opcode(all::OP_RETURN).into_script()
    }

    pub fn p2sh() -> Script {
        Self::script().to_p2sh()
    }
}

// OP_2 <pkA> <pkB> OP_2 OP_CHECKMULTISIGVERIFY OP_HASH160 <commitA> OP_EQUAL OP_IF
fn multisig_hashlock(builder: Builder, keys: DoubleKeys, commitment: &Commitment) -> Builder {
    builder
        .push_opcode(all::OP_PUSHNUM_2)
        .push_key(&bitcoin::PublicKey::new(keys.alice))
        .push_key(&bitcoin::PublicKey::new(keys.bob))
        .push_opcode(all::OP_PUSHNUM_2)
        .push_opcode(all::OP_CHECKMULTISIGVERIFY)
        .push_opcode(all::OP_HASH160)
        .push_slice(commitment.as_bytes())
        .push_opcode(all::OP_EQUAL)
        .push_opcode(all::OP_IF)
}

fn read_multisig_hashlock(ints: &mut Instructions) -> Result<(DoubleKeys, Commitment), FError> {
    expect_op(ints, all::OP_PUSHNUM_2, "Missing PUSHNUM_2 opcode")?;
    let alice = read_pubkey(ints)?;
    let bob = read_pubkey(ints)?;
    expect_op(ints, all::OP_PUSHNUM_2, "Missing PUSHNUM_2 opcode")?;
    expect_op(
        ints,
        all::OP_CHECKMULTISIGVERIFY,
        "Missing CHECKMULTISIGVERIFY opcode",
    )?;
    expect_op(ints, all::OP_HASH160, "Missing HASH160 opcode")?;
    let commitment = read_commitment(ints)?;
    expect_op(ints, all::OP_EQUAL, "Missing EQUAL opcode")?;
    expect_op(ints, all::OP_IF, "Missing IF opcode")?;
    Ok((DoubleKeys::new(alice, bob), commitment))
}

fn next_instruction<'a>(ints: &mut Instructions<'a>) -> Result<Instruction<'a>, FError> {
    ints.next()
        .ok_or(FError::WrongTemplate("Missing opcode"))?
        .map_err(|e| FError::from(Error::from(e)))
}

fn expect_op(
    ints: &mut Instructions,
    op: opcodes::All,
    msg: &'static str,
) -> Result<(), FError> {
    match next_instruction(ints)? {
        Instruction::Op(o) if o == op => Ok(()),
        _ => Err(FError::WrongTemplate(msg)),
    }
}

fn read_pubkey(ints: &mut Instructions) -> Result<PublicKey, FError> {
    match next_instruction(ints)? {
        Instruction::PushBytes(b) => PublicKey::from_slice(b).map_err(|_| FError::MissingPublicKey),
        _ => Err(FError::MissingPublicKey),
    }
}

fn read_commitment(ints: &mut Instructions) -> Result<Commitment, FError> {
    match next_instruction(ints)? {
        Instruction::PushBytes(b) => hash160::Hash::from_slice(b)
            .map(Commitment::from_hash)
            .map_err(|_| FError::WrongTemplate("Invalid commitment length")),
        _ => Err(FError::WrongTemplate("Missing commitment")),
    }
}

// Small values are pushed with OP_PUSHNUM_N, larger ones as minimal script integers
fn read_timelock(ints: &mut Instructions) -> Result<CSVTimelock, FError> {
    let value = match next_instruction(ints)? {
        Instruction::Op(op) => {
            let code = op.into_u8();
            let one = all::OP_PUSHNUM_1.into_u8();
            let sixteen = all::OP_PUSHNUM_16.into_u8();
            (one..=sixteen)
                .contains(&code)
                .then(|| (code - one + 1) as i64)
                .ok_or(FError::WrongTemplate("Missing timelock"))?
        }
        Instruction::PushBytes(b) => {
            read_scriptint(b).map_err(|e| FError::from(Error::from(e)))?
        }
    };
    (0..=u32::MAX as i64)
        .contains(&value)
        .then(|| CSVTimelock::new(value as u32))
        .ok_or(FError::WrongTemplate("Timelock out of range"))
}

fn expect_end(ints: &mut Instructions) -> Result<(), FError> {
    // Script done, return an error if some error or some instruction
    match ints.next() {
        None => Ok(()),
        Some(Ok(_)) => Err(FError::WrongTemplate("Too many opcodes")),
        Some(Err(e)) => Err(Error::from(e).into()),
    }
}

/// Bind the consumed output to the contract: its `script_pubkey` must be the P2WSH of the
/// contract script, the witness script is set if missing and must match otherwise.
pub(crate) fn contract_input<L: HedgedLock>(
    mut prev: MetadataOutput,
    lock: DataLock,
) -> Result<MetadataOutput, FError> {
    let script = L::script(lock);
    (prev.tx_out.script_pubkey == script.to_v0_p2wsh())
        .then(|| 0)
        .ok_or(FError::WrongTemplate(
            "Consumed output is not locked by the contract",
        ))?;
    match &prev.script_pubkey {
        Some(s) if s != &script => Err(FError::WrongTemplate(
            "Witness script does not match the contract",
        )),
        Some(_) => Ok(prev),
        None => {
            prev.script_pubkey = Some(script);
            Ok(prev)
        }
    }
}

/// Return the `nSequence` of an input spending a timelock branch, fails with
/// [`FError::WrongTemplate`] if the timelock sets bits outside a relative lock-time.
pub(crate) fn relative_sequence(timelock: CSVTimelock) -> Result<u32, FError> {
    timelock
        .is_relative()
        .then(|| timelock.as_sequence())
        .ok_or(FError::WrongTemplate(
            "Timelock sets bits outside a relative lock-time",
        ))
}

/// Build the unsigned version 2 transaction spending `prev` with the given sequence. Fails with
/// [`FError::NotEnoughAssets`] if the outputs are greater than the consumed value.
pub(crate) fn spending_tx(
    prev: &MetadataOutput,
    sequence: u32,
    output: Vec<TxOut>,
) -> Result<Transaction, FError> {
    let values: Vec<u64> = output.iter().map(|o| o.value).collect();
    ensure_covered(prev.tx_out.value, &values)?;
    Ok(Transaction {
        version: 2,
        lock_time: 0,
        input: vec![TxIn {
            previous_output: prev.out_point,
            script_sig: Script::default(),
            sequence,
            witness: Witness::new(),
        }],
        output,
    })
}

/// Check the shape shared by the four spending transactions and their sequence and outputs.
pub(crate) fn verify_spend_template(
    psbt: &PartiallySignedTransaction,
    sequence: u32,
    output: &[TxOut],
) -> Result<(), FError> {
    let tx = &psbt.unsigned_tx;
    (tx.version == 2)
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Tx version is not 2"))?;
    (tx.lock_time == 0)
        .then(|| 0)
        .ok_or(FError::WrongTemplate("LockTime is not set to 0"))?;
    (tx.input.len() == 1)
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Number of inputs is not 1"))?;
    (tx.output.len() == output.len())
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Number of outputs does not match"))?;
    (tx.input[0].sequence == sequence)
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Sequence does not match the branch"))?;
    (tx.output[..] == output[..])
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Outputs do not match"))?;
    Ok(())
}

/// Return the witness of the single input of a broadcast spending transaction.
pub(crate) fn input_witness(tx: &Transaction) -> Result<&Witness, FError> {
    tx.input
        .first()
        .map(|txin| &txin.witness)
        .ok_or(FError::WrongTemplate("Number of inputs is not 1"))
}

/// Compose and store the final witness of a contract spend. The stack layout is chosen from the
/// transaction label and the executed branch, secrets are looked up in the partial transaction
/// by their commitment in the script.
pub(crate) fn finalize_spend<L: HedgedLock>(
    psbt: &mut PartiallySignedTransaction,
    label: TxLabel,
    path: ScriptPath,
) -> Result<(), FError> {
    let script = psbt.inputs[0]
        .witness_script
        .clone()
        .ok_or(FError::MissingWitness)?;
    let lock = L::from_script(&script)?;
    let input = &psbt.inputs[0];

    let layout = witness::layout(label, path)?;
    let witness = witness::compose(&layout, |item| match item {
        StackItem::Secret(party) => input
            .hash160_preimages
            .get(&lock.get_commitment(*party).as_hash())
            .cloned()
            .ok_or(FError::MissingSecret),
        StackItem::Zero => Ok(vec![0x00]),
        StackItem::Empty => Ok(vec![]),
        StackItem::Signature(party) => input
            .partial_sigs
            .get(&bitcoin::PublicKey::new(*lock.get_pubkey(*party)))
            .map(|sig| sig.to_vec())
            .ok_or(FError::MissingSignature),
        StackItem::WitnessScript => Ok(script.to_bytes()),
    })?;

    psbt.inputs[0].final_script_witness = Some(witness);
    Ok(())
}

/// Computes the [`BIP-143`][bip-143] compliant sighash for the given input, committing to the
/// witness script and the amount of the spent output.
///
/// [bip-143]: https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki
pub fn signature_hash(
    txin: TxInRef,
    script: &Script,
    value: u64,
    sighash_type: EcdsaSighashType,
) -> Result<Sha256dHash, FError> {
    let sighash = SighashCache::new(txin.transaction)
        .segwit_signature_hash(txin.index, script, value, sighash_type)
        .map_err(Error::from)?
        .as_hash();
    trace!("sighash for input {} with value {}: {}", txin.index, value, sighash);
    Ok(sighash)
}

/// Computes the [`BIP-143`][bip-143] compliant signature for the given input.
///
/// [bip-143]: https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki
pub fn sign_input<C>(
    context: &Secp256k1<C>,
    txin: TxInRef,
    script: &Script,
    value: u64,
    sighash_type: EcdsaSighashType,
    secret_key: &SecretKey,
) -> Result<Signature, FError>
where
    C: Signing,
{
    // Computes sighash.
    let sighash = signature_hash(txin, script, value, sighash_type)?;
    // Makes signature.
    let msg = Message::from_slice(&sighash[..]).map_err(Error::from)?;
    let mut sig = context.sign_ecdsa(&msg, secret_key);
    sig.normalize_s();
    Ok(sig)
}

/// Computes the [`BIP-143`][bip-143] compliant signature for the given hash.
/// Assumes that the hash is correctly computed.
///
/// [bip-143]: https://github.com/bitcoin/bips/blob/master/bip-0143.mediawiki
pub fn sign_hash(
    sighash: Sha256dHash,
    secret_key: &SecretKey,
) -> Result<Signature, bitcoin::secp256k1::Error> {
    let context = Secp256k1::signing_only();
    // Makes signature.
    let msg = Message::from_slice(&sighash[..])?;
    let mut sig = context.sign_ecdsa(&msg, secret_key);
    sig.normalize_s();
    Ok(sig)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::str::FromStr;

    use bitcoin::hashes::hex::ToHex;

    use crate::script::Preimage;

    const PK_A: &str = "0272fc1a56b46948a9071eafa0daef7e1c37a943e7db2b3de703e78e25d3edece7";
    const PK_B: &str = "03f546edf7b434b50aa0115c1c82a0f9a96505d9eff55d2fe3b848c4b51c06b643";

    fn data_lock(timelock: u32) -> DataLock {
        DataLock {
            timelock: CSVTimelock::new(timelock),
            keys: DoubleKeys::new(
                PublicKey::from_str(PK_A).unwrap(),
                PublicKey::from_str(PK_B).unwrap(),
            ),
            commitments: DoubleCommitments::from_preimages(
                &Preimage::from("10a1e49e2c56295e1f2fd2dce78294da"),
                &Preimage::from("0dc7c47740a748abed192062f0caf637"),
            ),
        }
    }

    #[test]
    fn deposit_script_bytes() {
        let script = DepositLock::script(data_lock(15));
        let expected = format!(
            "5221{}21{}52afa914{}876351675fb275a914{}8768",
            PK_A,
            PK_B,
            "1bf351d042f4dc4f2ca667d6523db196ba5e0a1b",
            "bfbf4dd90b482da06655a307947f325168eff185"
        );
        assert_eq!(script.to_hex(), expected);
        let asm = script.asm();
        assert!(asm.starts_with("OP_PUSHNUM_2 OP_PUSHBYTES_33"));
        assert!(asm.contains(PK_A));
        assert!(asm.contains("OP_CHECKMULTISIGVERIFY"));
        assert!(asm.ends_with("OP_EQUAL OP_ENDIF"));
    }

    #[test]
    fn collateral_script_bytes() {
        let script = CollateralLock::script(data_lock(4));
        let expected = format!(
            "5221{}21{}52afa914{}8763a914{}876754b27551 68",
            PK_A,
            PK_B,
            "1bf351d042f4dc4f2ca667d6523db196ba5e0a1b",
            "bfbf4dd90b482da06655a307947f325168eff185"
        )
        .replace(' ', "");
        assert_eq!(script.to_hex(), expected);
    }

    #[test]
    fn parse_contract_scripts() {
        let data = data_lock(15);
        let deposit = DepositLock::from_script(&DepositLock::script(data)).unwrap();
        assert_eq!(deposit.data(), &data);
        assert_eq!(deposit.get_pubkey(Party::Bob), &data.keys.bob);
        assert_eq!(deposit.get_commitment(Party::Alice), &data.commitments.alice);

        let data = data_lock(4);
        let collateral = CollateralLock::from_script(&CollateralLock::script(data)).unwrap();
        assert_eq!(collateral.data(), &data);
    }

    #[test]
    fn parse_large_timelock() {
        let data = data_lock(144);
        let deposit = DepositLock::from_script(&DepositLock::script(data)).unwrap();
        assert_eq!(deposit.data().timelock, CSVTimelock::new(144));
        let data = data_lock(0x40_0010);
        let collateral = CollateralLock::from_script(&CollateralLock::script(data)).unwrap();
        assert_eq!(collateral.data().timelock, CSVTimelock::new(0x40_0010));
    }

    #[test]
    fn templates_are_not_interchangeable() {
        let data = data_lock(15);
        assert!(matches!(
            CollateralLock::from_script(&DepositLock::script(data)),
            Err(FError::WrongTemplate(_))
        ));
        assert!(matches!(
            DepositLock::from_script(&CollateralLock::script(data)),
            Err(FError::WrongTemplate(_))
        ));
        assert!(DepositLock::from_script(&BurnLock::script()).is_err());

        let mut bytes = DepositLock::script(data).to_bytes();
        bytes.push(0x51);
        assert!(matches!(
            DepositLock::from_script(&Script::from(bytes)),
            Err(FError::WrongTemplate("Too many opcodes"))
        ));
    }

    #[test]
    fn burn_script() {
        assert_eq!(BurnLock::script().to_hex(), "6a");
        assert!(BurnLock::p2sh().is_p2sh());
    }

    #[test]
    fn p2wsh_commits_to_script() {
        let deposit = DepositLock::v0_p2wsh(data_lock(15));
        assert!(deposit.is_v0_p2wsh());
        assert_ne!(deposit, CollateralLock::v0_p2wsh(data_lock(15)));
        assert_ne!(deposit, DepositLock::v0_p2wsh(data_lock(16)));
        assert_eq!(deposit, DepositLock::v0_p2wsh(data_lock(15)));
    }

    fn deposit_output(value: u64) -> MetadataOutput {
        MetadataOutput::from_utxo(
            "7e684f73cf2d690987d855da1a8b46efe0d6663145386eac1edaed3433883133",
            1,
            TxOut {
                value,
                script_pubkey: DepositLock::v0_p2wsh(data_lock(15)),
            },
            None,
        )
        .unwrap()
    }

    #[test]
    fn contract_input_binds_script() {
        let prev = contract_input::<DepositLock>(deposit_output(200_000), data_lock(15)).unwrap();
        assert_eq!(prev.script_pubkey, Some(DepositLock::script(data_lock(15))));
        assert!(contract_input::<DepositLock>(prev.clone(), data_lock(15)).is_ok());
        assert!(contract_input::<DepositLock>(prev, data_lock(16)).is_err());
        assert!(contract_input::<CollateralLock>(deposit_output(200_000), data_lock(15)).is_err());
    }

    #[test]
    fn outputs_must_be_covered() {
        let prev = deposit_output(1_000);
        let output = |value| TxOut {
            value,
            script_pubkey: Script::new(),
        };
        assert!(spending_tx(&prev, 15, vec![output(1_000)]).is_ok());
        assert!(matches!(
            spending_tx(&prev, 15, vec![output(600), output(401)]),
            Err(FError::NotEnoughAssets)
        ));
    }

    #[test]
    fn sign_input_commits_to_amount() {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[0x01; 32]).unwrap();
        let pk = PublicKey::from_secret_key(&secp, &sk);
        let script = DepositLock::script(data_lock(15));
        let prev = deposit_output(200_000);
        let output = TxOut {
            value: 100_000,
            script_pubkey: Script::new(),
        };
        let tx = spending_tx(&prev, 15, vec![output]).unwrap();
        let txin = TxInRef::new(&tx, 0).unwrap();

        let sig = sign_input(&secp, txin, &script, 200_000, EcdsaSighashType::All, &sk).unwrap();
        let sighash = signature_hash(txin, &script, 200_000, EcdsaSighashType::All).unwrap();
        assert_eq!(sig, sign_hash(sighash, &sk).unwrap());
        let msg = Message::from_slice(&sighash[..]).unwrap();
        assert!(secp.verify_ecdsa(&msg, &sig, &pk).is_ok());

        let other = signature_hash(txin, &script, 199_999, EcdsaSighashType::All).unwrap();
        assert_ne!(sighash, other);
        let msg = Message::from_slice(&other[..]).unwrap();
        assert!(secp.verify_ecdsa(&msg, &sig, &pk).is_err());
    }
}
