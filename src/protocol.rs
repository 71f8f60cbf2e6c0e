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

//! Contract execution: derive both contracts from the parameters, assemble the spending
//! transactions, sign them for both parties, and finalize their witness.

use bitcoin::blockdata::script::Script;
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, Network, Transaction};

use crate::bitcoin::address;
use crate::bitcoin::amount::Amounts;
use crate::bitcoin::segwitv0::{
    sign_hash, BurnLock, BurnTx, ClaimTx, CollateralLock, DepositLock, HedgedLock, RedeemTx,
    TransitionTx,
};
use crate::bitcoin::timelock::CSVTimelock;
use crate::bitcoin::transaction::{self, MetadataOutput, SubTransaction, Tx};
use crate::consensus;
use crate::parameters::{Parameters, Utxos};
use crate::role::{Participant, Party};
use crate::script::{
    ClaimBranch, DataLock, DoubleCommitments, DoubleKeys, Preimage, RedemptionPath, ScriptPath,
};
use crate::transaction::{Broadcastable, Linkable, Witnessable};
use crate::Res;

/// A hedged contract between Alice and Bob. Holds both participants with their keys, both
/// secrets, and the data of the deposit and collateral contracts.
#[derive(Debug, Clone)]
pub struct HedgedHtlc {
    network: Network,
    alice: Participant,
    bob: Participant,
    pre_a: Preimage,
    pre_b: Preimage,
    deposit: DataLock,
    collateral: DataLock,
    amounts: Amounts,
    utxos: Utxos,
}

impl HedgedHtlc {
    /// Build the contract context from validated parameters.
    pub fn new(params: &Parameters) -> Res<Self> {
        let secp = Secp256k1::new();
        let network = params.network()?;
        params.timelocks.check()?;
        let alice = params.participant(&secp, Party::Alice)?;
        let bob = params.participant(&secp, Party::Bob)?;
        let pre_a = params.preimage(Party::Alice);
        let pre_b = params.preimage(Party::Bob);

        let keys = DoubleKeys::new(*alice.public_key(), *bob.public_key());
        let commitments = DoubleCommitments::from_preimages(&pre_a, &pre_b);
        let deposit = DataLock {
            timelock: params.timelocks.deposit,
            keys,
            commitments,
        };
        let collateral = DataLock {
            timelock: params.timelocks.collateral,
            keys,
            commitments,
        };
        debug!("hedged contract created on {}: {}", network, deposit);

        Ok(Self {
            network,
            alice,
            bob,
            pre_a,
            pre_b,
            deposit,
            collateral,
            amounts: params.amounts,
            utxos: params.utxos.clone(),
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn participant(&self, party: Party) -> &Participant {
        match party {
            Party::Alice => &self.alice,
            Party::Bob => &self.bob,
        }
    }

    pub fn preimage(&self, party: Party) -> &Preimage {
        match party {
            Party::Alice => &self.pre_a,
            Party::Bob => &self.pre_b,
        }
    }

    pub fn amounts(&self) -> &Amounts {
        &self.amounts
    }

    /// Data of the deposit contract, timelock `T`.
    pub fn deposit_lock(&self) -> DataLock {
        self.deposit
    }

    /// Data of the collateral contract, timelock `ell`.
    pub fn collateral_lock(&self) -> DataLock {
        self.collateral
    }

    pub fn deposit_script(&self) -> Script {
        DepositLock::script(self.deposit)
    }

    pub fn collateral_script(&self) -> Script {
        CollateralLock::script(self.collateral)
    }

    pub fn burn_script(&self) -> Script {
        BurnLock::script()
    }

    pub fn deposit_address(&self) -> Address {
        address::deposit_address(self.deposit, self.network)
    }

    pub fn collateral_address(&self) -> Address {
        address::collateral_address(self.collateral, self.network)
    }

    pub fn burn_address(&self) -> Res<Address> {
        Ok(address::burn_address(self.network)?)
    }

    /// The deposit output spent by the redeem transaction.
    pub fn redeem_utxo(&self) -> Res<MetadataOutput> {
        Ok(self
            .utxos
            .redeem
            .to_metadata(DepositLock::v0_p2wsh(self.deposit))?)
    }

    /// The deposit output spent by the transition transaction.
    pub fn transition_utxo(&self) -> Res<MetadataOutput> {
        Ok(self
            .utxos
            .transition
            .to_metadata(DepositLock::v0_p2wsh(self.deposit))?)
    }

    /// The collateral output spent by the claim transaction, the output of the transition
    /// transaction if not configured.
    pub fn claim_utxo(&self) -> Res<MetadataOutput> {
        match &self.utxos.claim {
            Some(utxo) => Ok(utxo.to_metadata(CollateralLock::v0_p2wsh(self.collateral))?),
            None => self.transition_output(),
        }
    }

    /// The collateral output spent by the burn transaction, the output of the transition
    /// transaction if not configured.
    pub fn burn_utxo(&self) -> Res<MetadataOutput> {
        match &self.utxos.burn {
            Some(utxo) => Ok(utxo.to_metadata(CollateralLock::v0_p2wsh(self.collateral))?),
            None => self.transition_output(),
        }
    }

    fn transition_output(&self) -> Res<MetadataOutput> {
        let tx = self.transition_tx(&self.transition_utxo()?, self.deposit.timelock)?;
        Ok(tx.get_consumable_output()?)
    }

    /// Assemble the unsigned redeem transaction.
    pub fn redeem_tx(&self, prev: &impl Linkable<MetadataOutput>) -> Res<RedeemTx> {
        Ok(RedeemTx::initialize(
            prev,
            self.deposit,
            &self.pre_a,
            self.alice.address(),
            self.bob.address(),
            &self.amounts,
        )?)
    }

    /// Assemble the unsigned transition transaction with the given input sequence.
    pub fn transition_tx(
        &self,
        prev: &impl Linkable<MetadataOutput>,
        sequence: CSVTimelock,
    ) -> Res<TransitionTx> {
        Ok(TransitionTx::initialize(
            prev,
            self.deposit,
            self.collateral,
            &self.pre_b,
            sequence,
            &self.amounts,
        )?)
    }

    /// Assemble the unsigned claim transaction for the given branch.
    pub fn claim_tx(
        &self,
        prev: &impl Linkable<MetadataOutput>,
        branch: &ClaimBranch,
    ) -> Res<ClaimTx> {
        Ok(ClaimTx::initialize(
            prev,
            self.collateral,
            branch,
            self.bob.address(),
            &self.amounts,
        )?)
    }

    /// Assemble the unsigned burn transaction with the given input sequence.
    pub fn burn_tx(
        &self,
        prev: &impl Linkable<MetadataOutput>,
        sequence: CSVTimelock,
    ) -> Res<BurnTx> {
        Ok(BurnTx::initialize(
            prev,
            self.collateral,
            &self.pre_a,
            &self.pre_b,
            sequence,
            &self.amounts,
        )?)
    }

    /// Sign the transaction with the key of the party and store the signature.
    pub fn sign<T: SubTransaction>(&self, tx: &mut Tx<T>, party: Party) -> Res<()> {
        let participant = self.participant(party);
        let sighash = tx.generate_witness_message()?;
        let sig =
            sign_hash(sighash, participant.secret_key()).map_err(transaction::Error::from)?;
        trace!("{} signed {} transaction {}", party, tx.label(), tx.txid());
        tx.add_witness(*participant.public_key(), sig)?;
        Ok(())
    }

    /// Sign the transaction for both parties, finalize its witness, and extract it.
    pub fn sign_and_finalize<T: SubTransaction>(&self, mut tx: Tx<T>) -> Res<Transaction> {
        for party in Party::both() {
            self.sign(&mut tx, party)?;
        }
        let tx = tx.finalize_and_extract()?;
        debug!("{} transaction {} finalized", T::LABEL, tx.txid());
        Ok(tx)
    }

    /// Build the fully signed transaction taking the redemption path and spending `prev`.
    pub fn spend(
        &self,
        path: &RedemptionPath,
        prev: &impl Linkable<MetadataOutput>,
    ) -> Res<Transaction> {
        match path {
            RedemptionPath::Redeem { pre_a } => {
                let tx = RedeemTx::initialize(
                    prev,
                    self.deposit,
                    pre_a,
                    self.alice.address(),
                    self.bob.address(),
                    &self.amounts,
                )?;
                self.sign_and_finalize(tx)
            }
            RedemptionPath::Transition { pre_b, timelock } => {
                let tx = TransitionTx::initialize(
                    prev,
                    self.deposit,
                    self.collateral,
                    pre_b,
                    *timelock,
                    &self.amounts,
                )?;
                self.sign_and_finalize(tx)
            }
            RedemptionPath::Claim(branch) => self.sign_and_finalize(self.claim_tx(prev, branch)?),
            RedemptionPath::Burn {
                pre_a,
                pre_b,
                timelock,
            } => {
                let tx = BurnTx::initialize(
                    prev,
                    self.collateral,
                    pre_a,
                    pre_b,
                    *timelock,
                    &self.amounts,
                )?;
                self.sign_and_finalize(tx)
            }
        }
    }

    /// Alice redeems the deposit immediately (Dep-A).
    pub fn redeem(&self) -> Res<Transaction> {
        let path = RedemptionPath::Redeem {
            pre_a: self.pre_a.clone(),
        };
        self.spend(&path, &self.redeem_utxo()?)
    }

    /// Bob moves the deposit into the collateral contract (Dep-B).
    pub fn transition(&self) -> Res<Transaction> {
        let path = RedemptionPath::Transition {
            pre_b: self.pre_b.clone(),
            timelock: self.deposit.timelock,
        };
        self.spend(&path, &self.transition_utxo()?)
    }

    /// Bob claims the collateral (Col-B), with both secrets or after the collateral timelock.
    pub fn claim(&self, branch: ScriptPath) -> Res<Transaction> {
        let branch = match branch {
            ScriptPath::Hashlock => ClaimBranch::Preimages {
                pre_a: self.pre_a.clone(),
                pre_b: self.pre_b.clone(),
            },
            ScriptPath::Timelock => ClaimBranch::Timelock(self.collateral.timelock),
        };
        self.spend(&RedemptionPath::Claim(branch), &self.claim_utxo()?)
    }

    /// The collateral is burnt (Col-M).
    pub fn burn(&self) -> Res<Transaction> {
        let path = RedemptionPath::Burn {
            pre_a: self.pre_a.clone(),
            pre_b: self.pre_b.clone(),
            timelock: self.collateral.timelock,
        };
        self.spend(&path, &self.burn_utxo()?)
    }
}

/// Hex encoding of the consensus serialization of a transaction, witness included.
pub fn serialize_hex(tx: &Transaction) -> String {
    consensus::canonical_hex(tx)
}

/// Parse a transaction from the hex encoding of its consensus serialization.
pub fn deserialize_hex(s: &str) -> Res<Transaction> {
    Ok(consensus::from_canonical_hex(s)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::transaction::Chainable;

    const PARAMS: &str = r#"
network: testnet
alice:
  wif: cNnZ1uE6Eb3o2Ziuo2GBTNZxmjJqi3aoj4CHLkfm7as8Z9ruuRcE
  address: tb1qklkpdy0xwcav7q4th97hnxncfd8l8kux4u7pwn
bob:
  wif: cVgxEkRBtnfvd41ssd4PCsiemahAHidFrLWYoDBMNojUeME8dojZ
  address: tb1qdd6cvu6krl6hyhzs2ylhsnul2plj3h330kgfz6
secrets:
  alice: 10a1e49e2c56295e1f2fd2dce78294da
  bob: 0dc7c47740a748abed192062f0caf637
timelocks:
  deposit: 15
  collateral: 4
amounts:
  deposit: 75000
  collateral: 25000
  fee: 500
utxos:
  redeem:
    txid: 7e684f73cf2d690987d855da1a8b46efe0d6663145386eac1edaed3433883133
    vout: 1
    amount: 200000
  transition:
    txid: 7646f2aa75f267718e1ddf1162fe1fccb3dfe5c4dd12173633ba03585c224609
    vout: 0
    amount: 200000
"#;

    fn htlc() -> HedgedHtlc {
        HedgedHtlc::new(&Parameters::from_yaml(PARAMS).unwrap()).unwrap()
    }

    #[test]
    fn contract_scripts_share_prefix() {
        let htlc = htlc();
        let deposit = htlc.deposit_script().to_bytes();
        let collateral = htlc.collateral_script().to_bytes();
        // OP_2 <33> <33> OP_2 CMSV HASH160 <20> EQUAL IF
        let prefix = 1 + 34 + 34 + 1 + 1 + 1 + 21 + 1 + 1;
        assert_eq!(deposit[..prefix], collateral[..prefix]);
        assert_ne!(deposit, collateral);
        assert_eq!(
            htlc.deposit_address().script_pubkey(),
            htlc.redeem_utxo().unwrap().tx_out.script_pubkey
        );
    }

    #[test]
    fn collateral_spends_chain_on_transition() {
        let htlc = htlc();
        let transition = htlc
            .transition_tx(&htlc.transition_utxo().unwrap(), htlc.deposit_lock().timelock)
            .unwrap();
        let claim = htlc
            .claim_tx(
                &htlc.claim_utxo().unwrap(),
                &ClaimBranch::Timelock(htlc.collateral_lock().timelock),
            )
            .unwrap();
        assert!(claim.is_build_on_top_of(&transition).is_ok());
        let burn = htlc
            .burn_tx(&transition, htlc.collateral_lock().timelock)
            .unwrap();
        assert!(burn.is_build_on_top_of(&transition).is_ok());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let htlc = htlc();
        let path = RedemptionPath::Redeem {
            pre_a: htlc.preimage(Party::Bob).clone(),
        };
        assert!(htlc.spend(&path, &htlc.redeem_utxo().unwrap()).is_err());
    }

    #[test]
    fn serialized_hex_round_trip() {
        let htlc = htlc();
        let tx = htlc.redeem().unwrap();
        let hex = serialize_hex(&tx);
        assert_eq!(hex, bitcoin::consensus::encode::serialize_hex(&tx));
        assert_eq!(deserialize_hex(&hex).unwrap(), tx);
        assert!(matches!(
            deserialize_hex(&hex[2..]),
            Err(crate::Error::Consensus(_))
        ));
        assert!(deserialize_hex("zz").is_err());
    }
}
