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

//! Values moved by the spending transactions.

use crate::consensus::{self, CanonicalBytes};
use crate::transaction::Error as FError;
use bitcoin::Amount;

impl CanonicalBytes for Amount {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        bitcoin::consensus::encode::serialize(&self.as_sat())
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        Ok(Amount::from_sat(
            bitcoin::consensus::encode::deserialize(bytes).map_err(consensus::Error::new)?,
        ))
    }
}

/// The deposit value `vdep`, the collateral value `vcol`, and the fee reserved by the transition
/// for the collateral spend. Serialized as satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("deposit: {deposit}, collateral: {collateral}, fee: {fee}")]
pub struct Amounts {
    #[serde(with = "bitcoin::util::amount::serde::as_sat")]
    pub deposit: Amount,
    #[serde(with = "bitcoin::util::amount::serde::as_sat")]
    pub collateral: Amount,
    #[serde(with = "bitcoin::util::amount::serde::as_sat")]
    pub fee: Amount,
}

impl Amounts {
    pub fn new(deposit: Amount, collateral: Amount, fee: Amount) -> Self {
        Self {
            deposit,
            collateral,
            fee,
        }
    }

    /// Value paid to the collateral contract by the transition, `vdep + vcol + fee`.
    pub fn transition_value(&self) -> Result<Amount, FError> {
        self.claim_value()?
            .checked_add(self.fee)
            .ok_or(FError::NotEnoughAssets)
    }

    /// Value paid to Bob when claiming the collateral, `vdep + vcol`.
    pub fn claim_value(&self) -> Result<Amount, FError> {
        self.deposit
            .checked_add(self.collateral)
            .ok_or(FError::NotEnoughAssets)
    }

    /// Value sent to the burn output, `vdep`.
    pub fn burn_value(&self) -> Amount {
        self.deposit
    }
}

/// Fails with [`FError::NotEnoughAssets`] if the outputs spend more than the consumed value.
pub(crate) fn ensure_covered(input: u64, outputs: &[u64]) -> Result<(), FError> {
    let total = outputs
        .iter()
        .try_fold(0u64, |acc, v| acc.checked_add(*v))
        .ok_or(FError::NotEnoughAssets)?;
    (total <= input)
        .then(|| 0)
        .ok_or(FError::NotEnoughAssets)?;
    Ok(())
}
