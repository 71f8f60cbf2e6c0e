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
    verify_spend_template, BurnLock, CollateralLock, HedgedLock,
};
use crate::bitcoin::timelock::CSVTimelock;
use crate::bitcoin::transaction::{MetadataOutput, SubTransaction, Tx};
use crate::bitcoin::witness;
use crate::role::Party;
use crate::script::{DataLock, Preimage, ScriptPath};
use crate::transaction::{Error as FError, Linkable, TxLabel};

/// The collateral is spent through the hashlock branch with both secrets, `vdep` is sent to the
/// unspendable burn output and the remainder is left as fee.
#[derive(Debug, Clone)]
pub struct Burn;

impl SubTransaction for Burn {
    const LABEL: TxLabel = TxLabel::Burn;

    fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError> {
        finalize_spend::<CollateralLock>(psbt, TxLabel::Burn, ScriptPath::Hashlock)
    }
}

impl Tx<Burn> {
    /// Create the burn transaction spending the collateral output, the input sequence is set to
    /// `sequence`.
    pub fn initialize(
        prev: &impl Linkable<MetadataOutput>,
        lock: DataLock,
        pre_a: &Preimage,
        pre_b: &Preimage,
        sequence: CSVTimelock,
        amounts: &Amounts,
    ) -> Result<Self, FError> {
        (pre_a.opens(&lock.commitments.alice) && pre_b.opens(&lock.commitments.bob))
            .then(|| 0)
            .ok_or(FError::MissingSecret)?;
        let prev = contract_input::<CollateralLock>(prev.get_consumable_output()?, lock)?;

        let unsigned_tx =
            spending_tx(&prev, relative_sequence(sequence)?, Self::outputs(amounts))?;
        let mut tx = Self::from_unsigned_tx(unsigned_tx, prev)?;
        tx.add_secret(pre_a);
        tx.add_secret(pre_b);

        debug!("burn transaction {} initialized", tx.txid());
        Ok(tx)
    }

    fn outputs(amounts: &Amounts) -> Vec<TxOut> {
        vec![TxOut {
            value: amounts.burn_value().as_sat(),
            script_pubkey: BurnLock::p2sh(),
        }]
    }

    /// Verify the transaction spends the collateral contract to the burn output.
    pub fn verify_template(&self, lock: DataLock, amounts: &Amounts) -> Result<(), FError> {
        let script = self.psbt.inputs[0]
            .witness_script
            .as_ref()
            .ok_or(FError::MissingWitness)?;
        (CollateralLock::script(lock) == *script)
            .then(|| 0)
            .ok_or(FError::WrongTemplate(
                "Witness script is not the collateral contract",
            ))?;
        verify_spend_template(
            &self.psbt,
            lock.timelock.as_sequence(),
            &Self::outputs(amounts),
        )
    }

    /// Recover the secret of a party from the broadcast burn transaction.
    pub fn extract_secret(tx: &Transaction, party: Party) -> Result<Preimage, FError> {
        witness::extract_secret(input_witness(tx)?, TxLabel::Burn, ScriptPath::Hashlock, party)
    }
}
