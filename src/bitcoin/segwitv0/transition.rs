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
use bitcoin::Transaction;

use crate::bitcoin::amount::Amounts;
use crate::bitcoin::segwitv0::{
    contract_input, finalize_spend, input_witness, relative_sequence, spending_tx,
    verify_spend_template, CollateralLock, DepositLock, HedgedLock,
};
use crate::bitcoin::timelock::CSVTimelock;
use crate::bitcoin::transaction::{MetadataOutput, SubTransaction, Tx};
use crate::bitcoin::witness;
use crate::role::Party;
use crate::script::{DataLock, Preimage, ScriptPath};
use crate::transaction::{Error as FError, Linkable, TxLabel};

/// Bob spends the deposit through the timelock branch after `T` blocks, moving `vdep + vcol +
/// fee` into the collateral contract.
#[derive(Debug, Clone)]
pub struct Transition;

impl SubTransaction for Transition {
    const LABEL: TxLabel = TxLabel::Transition;

    fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError> {
        finalize_spend::<DepositLock>(psbt, TxLabel::Transition, ScriptPath::Timelock)
    }
}

impl Tx<Transition> {
    /// Create the transition transaction spending the deposit output into the collateral
    /// contract. The input sequence is set to `sequence`, a value not satisfying the deposit
    /// timelock is accepted here and rejected by script verification, a value that is not a
    /// relative lock-time is rejected.
    pub fn initialize(
        prev: &impl Linkable<MetadataOutput>,
        lock: DataLock,
        collateral_lock: DataLock,
        pre_b: &Preimage,
        sequence: CSVTimelock,
        amounts: &Amounts,
    ) -> Result<Self, FError> {
        pre_b
            .opens(&lock.commitments.bob)
            .then(|| 0)
            .ok_or(FError::MissingSecret)?;
        let n_sequence = relative_sequence(sequence)?;
        if !lock.timelock.is_satisfied_by(n_sequence) {
            warn!(
                "transition sequence {} does not satisfy the deposit timelock {}",
                sequence, lock.timelock
            );
        }
        let prev = contract_input::<DepositLock>(prev.get_consumable_output()?, lock)?;

        let unsigned_tx =
            spending_tx(&prev, n_sequence, Self::outputs(collateral_lock, amounts)?)?;
        let mut tx = Self::from_unsigned_tx(unsigned_tx, prev)?;
        tx.add_secret(pre_b);

        // Set the script witness of the output
        tx.psbt.outputs[0].witness_script = Some(CollateralLock::script(collateral_lock));

        debug!("transition transaction {} initialized", tx.txid());
        Ok(tx)
    }

    fn outputs(collateral_lock: DataLock, amounts: &Amounts) -> Result<Vec<TxOut>, FError> {
        Ok(vec![TxOut {
            value: amounts.transition_value()?.as_sat(),
            script_pubkey: CollateralLock::v0_p2wsh(collateral_lock),
        }])
    }

    /// Verify the transaction spends the deposit contract through the timelock branch and locks
    /// the funds in the collateral contract.
    pub fn verify_template(
        &self,
        lock: DataLock,
        collateral_lock: DataLock,
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
            lock.timelock.as_sequence(),
            &Self::outputs(collateral_lock, amounts)?,
        )
    }

    /// Recover Bob's secret from the broadcast transition transaction.
    pub fn extract_secret(tx: &Transaction) -> Result<Preimage, FError> {
        witness::extract_secret(
            input_witness(tx)?,
            TxLabel::Transition,
            ScriptPath::Timelock,
            Party::Bob,
        )
    }
}
