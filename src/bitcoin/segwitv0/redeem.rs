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

use bitcoin::blockdata::transaction::TxOut;
use bitcoin::util::psbt::PartiallySignedTransaction;
use bitcoin::Address;
use bitcoin::Transaction;

use crate::bitcoin::amount::Amounts;
use crate::bitcoin::segwitv0::{
    contract_input, finalize_spend, input_witness, spending_tx, verify_spend_template,
    DepositLock, HedgedLock,
};
use crate::bitcoin::timelock::SEQUENCE_FINAL;
use crate::bitcoin::transaction::{MetadataOutput, SubTransaction, Tx};
use crate::bitcoin::witness;
use crate::role::Party;
use crate::script::{DataLock, Preimage, ScriptPath};
use crate::transaction::{Error as FError, Linkable, TxLabel};

/// Alice spends the deposit through the hashlock branch, paying `vdep` to herself and `vcol` to
/// Bob.
#[derive(Debug, Clone)]
pub struct Redeem;

impl SubTransaction for Redeem {
    const LABEL: TxLabel = TxLabel::Redeem;

    fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError> {
        finalize_spend::<DepositLock>(psbt, TxLabel::Redeem, ScriptPath::Hashlock)
    }
}

impl Tx<Redeem> {
    /// Create the redeem transaction spending the deposit output, `pre_a` must open Alice's
    /// commitment.
    pub fn initialize(
        prev: &impl Linkable<MetadataOutput>,
        lock: DataLock,
        pre_a: &Preimage,
        alice: &Address,
        bob: &Address,
        amounts: &Amounts,
    ) -> Result<Self, FError> {
        pre_a
            .opens(&lock.commitments.alice)
            .then(|| 0)
            .ok_or(FError::MissingSecret)?;
        let prev = contract_input::<DepositLock>(prev.get_consumable_output()?, lock)?;

        let unsigned_tx = spending_tx(&prev, SEQUENCE_FINAL, Self::outputs(alice, bob, amounts))?;
        let mut tx = Self::from_unsigned_tx(unsigned_tx, prev)?;
        tx.add_secret(pre_a);

        debug!("redeem transaction {} initialized", tx.txid());
        Ok(tx)
    }

    fn outputs(alice: &Address, bob: &Address, amounts: &Amounts) -> Vec<TxOut> {
        vec![
            TxOut {
                value: amounts.deposit.as_sat(),
                script_pubkey: alice.script_pubkey(),
            },
            TxOut {
                value: amounts.collateral.as_sat(),
                script_pubkey: bob.script_pubkey(),
            },
        ]
    }

    /// Verify the transaction spends the deposit contract through the hashlock branch and pays
    /// both parties.
    pub fn verify_template(
        &self,
        lock: DataLock,
        alice: &Address,
        bob: &Address,
        amounts: &Amounts,
    ) -> Result<(), FError> {
        let script = self.psbt.inputs[0]
            .witness_script
            .as_ref()
            .ok_or(FError::MissingWitness)?;
        (DepositLock::script(lock) == *script)
            .then(|| 0)
            .ok_or(FError::WrongTemplate("Witness script is not the deposit contract"))?;
        verify_spend_template(
            &self.psbt,
            SEQUENCE_FINAL,
            &Self::outputs(alice, bob, amounts),
        )
    }

    /// Recover Alice's secret from the broadcast redeem transaction.
    pub fn extract_secret(tx: &Transaction) -> Result<Preimage, FError> {
        witness::extract_secret(
            input_witness(tx)?,
            TxLabel::Redeem,
            ScriptPath::Hashlock,
            Party::Alice,
        )
    }
}
