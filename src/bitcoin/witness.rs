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

//! Witness stacks of the four spending transactions. The first item of a layout is the bottom of
//! the stack, the witness script is always last.
//!
//! `OP_CHECKMULTISIGVERIFY` pops one extra item below the signatures, an empty vector is placed
//! there on every path. Below it, the item hashed against Alice's commitment selects the branch.

use bitcoin::blockdata::witness::Witness;

use crate::bitcoin::timelock::SEQUENCE_FINAL;
use crate::role::Party;
use crate::script::{Preimage, ScriptPath};
use crate::transaction::{Error as FError, TxLabel};

/// Maximum size of a stack element pushed by a witness.
pub const MAX_SCRIPT_ELEMENT_SIZE: usize = 520;

/// An element of a witness stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(Debug)]
pub enum StackItem {
    /// The secret of the party.
    Secret(Party),
    /// A single `0x00` byte, hashed against a commitment to select the `OP_ELSE` branch.
    Zero,
    /// The empty vector consumed by `OP_CHECKMULTISIGVERIFY`.
    Empty,
    /// The signature of the party, DER encoded with the sighash flag.
    Signature(Party),
    /// The witness script itself.
    WitnessScript,
}

/// Return the witness layout of the transaction taking the given branch.
pub fn layout(label: TxLabel, path: ScriptPath) -> Result<Vec<StackItem>, FError> {
    use StackItem::*;

    let branch_selector = match (label, path) {
        (TxLabel::Redeem, ScriptPath::Hashlock) => vec![Secret(Party::Alice)],
        (TxLabel::Transition, ScriptPath::Timelock) => vec![Secret(Party::Bob), Zero],
        (TxLabel::Claim, ScriptPath::Timelock) => vec![Zero],
        (TxLabel::Claim, ScriptPath::Hashlock) | (TxLabel::Burn, ScriptPath::Hashlock) => {
            vec![Secret(Party::Bob), Secret(Party::Alice)]
        }
        _ => return Err(FError::WrongTemplate("No such branch for the transaction")),
    };

    let mut items = branch_selector;
    items.extend_from_slice(&[
        Empty,
        Signature(Party::Alice),
        Signature(Party::Bob),
        WitnessScript,
    ]);
    Ok(items)
}

/// Return the branch executed by a collateral claim given its input sequence, a final sequence
/// cannot satisfy `OP_CHECKSEQUENCEVERIFY` thus the claim reveals both secrets.
pub fn claim_path(sequence: u32) -> ScriptPath {
    match sequence {
        SEQUENCE_FINAL => ScriptPath::Hashlock,
        _ => ScriptPath::Timelock,
    }
}

/// Build a witness following the layout, each item is resolved by `resolve`. Fails if an element
/// other than the witness script exceeds [`MAX_SCRIPT_ELEMENT_SIZE`].
pub fn compose<F>(layout: &[StackItem], mut resolve: F) -> Result<Witness, FError>
where
    F: FnMut(&StackItem) -> Result<Vec<u8>, FError>,
{
    let mut stack = Vec::with_capacity(layout.len());
    for item in layout {
        let bytes = resolve(item)?;
        if *item != StackItem::WitnessScript && bytes.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(FError::ScriptSerialization(
                "Witness stack element exceeds 520 bytes",
            ));
        }
        stack.push(bytes);
    }
    Ok(Witness::from_vec(stack))
}

/// Recover the secret of a party from a witness, fails with [`FError::MissingSecret`] if the
/// branch does not reveal it.
pub fn extract_secret(
    witness: &Witness,
    label: TxLabel,
    path: ScriptPath,
    party: Party,
) -> Result<Preimage, FError> {
    let layout = layout(label, path)?;
    let stack = witness.to_vec();
    (stack.len() == layout.len())
        .then(|| 0)
        .ok_or(FError::WrongTemplate("Witness stack length does not match"))?;
    layout
        .iter()
        .position(|item| *item == StackItem::Secret(party))
        .map(|i| Preimage::new(stack[i].clone()))
        .ok_or(FError::MissingSecret)
}
