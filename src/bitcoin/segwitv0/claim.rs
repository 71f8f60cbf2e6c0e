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

use crate::bitcoin::amount::Amounts;
use crate::bitcoin::segwitv0::{
    contract_input, finalize_spend, relative_sequence, spending_tx, verify_spend_template,
    CollateralLock, HedgedLock,
};
use crate::bitcoin::transaction::{MetadataOutput, SubTransaction, Tx};
use crate::bitcoin::witness::claim_path;
use crate::script::{ClaimBranch, DataLock, RedemptionPath};
use crate::transaction::{Error as FError, Linkable, TxLabel};

/// Bob spends the collateral contract, either with both secrets or after `ell` blocks, and
/// receives `vdep + vcol`.
#[derive(Debug, Clone)]
pub struct Claim;

impl SubTransaction for Claim {
    const LABEL: TxLabel = TxLabel::Claim;

    fn finalize(psbt: &mut PartiallySignedTransaction) -> Result<(), FError> {
        let path = claim_path(psbt.unsigned_tx.input[0].sequence);
        finalize_spend::<CollateralLock>(psbt, TxLabel::Claim, path)
    }
}

impl Tx<Claim> {
    /// Create the claim transaction spending the collateral output to Bob through the given
    /// branch. Both secrets must open their commitments when claiming with preimages.
    pub fn initialize(
        prev: &impl Linkable<MetadataOutput>,
        lock: DataLock,
        branch: &ClaimBranch,
        bob: &Address,
        amounts: &Amounts,
    ) -> Result<Self, FError> {
        match branch {
            ClaimBranch::Preimages { pre_a, pre_b } => {
                (pre_a.opens(&lock.commitments.alice) && pre_b.opens(&lock.commitments.bob))
                    .then(|| 0)
                    .ok_or(FError::MissingSecret)?;
            }
            ClaimBranch::Timelock(timelock) => {
                relative_sequence(*timelock)?;
            }
        }
        let prev = contract_input::<CollateralLock>(prev.get_consumable_output()?, lock)?;
        let path = RedemptionPath::Claim(branch.clone());

        let unsigned_tx = spending_tx(&prev, path.sequence(), Self::outputs(bob, amounts)?)?;
        let mut tx = Self::from_unsigned_tx(unsigned_tx, prev)?;
        if let ClaimBranch::Preimages { pre_a, pre_b } = branch {
            tx.add_secret(pre_a);
            tx.add_secret(pre_b);
        }

        debug!(
            "claim transaction {} initialized, {:?} branch",
            tx.txid(),
            path.script_path()
        );
        Ok(tx)
    }

    fn outputs(bob: &Address, amounts: &Amounts) -> Result<Vec<TxOut>, FError> {
        Ok(vec![TxOut {
            value: amounts.claim_value()?.as_sat(),
            script_pubkey: bob.script_pubkey(),
        }])
    }

    /// Verify the transaction spends the collateral contract to Bob, the sequence must match the
    /// branch.
    pub fn verify_template(
        &self,
        lock: DataLock,
        branch: &ClaimBranch,
        bob: &Address,
        amounts: &Amounts,
    ) -> Result<(), FError> {
        let script = self.psbt.inputs[0]
            .witness_script
            .as_ref()
            .ok_or(FError::MissingWitness)?;
        (CollateralLock::script(lock) == *script)
            .then(|| 0)
            .ok_or(FError::WrongTemplate(
                "Witness script is not the collateral contract",
            ))?;
        let sequence = match branch {
            ClaimBranch::Preimages { .. } => RedemptionPath::Claim(branch.clone()).sequence(),
            ClaimBranch::Timelock(_) => lock.timelock.as_sequence(),
        };
        verify_spend_template(&self.psbt, sequence, &Self::outputs(bob, amounts)?)
    }
}
