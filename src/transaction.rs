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

//! Transaction traits used to create, sign, and finalize the spending transactions of the hedged
//! contracts. These traits follow the roles defined in BIP 174 (creator, updater, signer,
//! finalizer, extractor).

use std::error;
use std::fmt::Debug;
use std::str::FromStr;

use thiserror::Error;

use crate::consensus::{self, CanonicalBytes};

/// A list specifying general categories of transaction error.
#[derive(Error, Debug)]
pub enum Error {
    /// Missing UTXO.
    #[error("Missing UTXO")]
    MissingUTXO,
    /// Missing signature data.
    #[error("Missing signature")]
    MissingSignature,
    /// Missing witness data.
    #[error("Missing witness data")]
    MissingWitness,
    /// Missing public key in the partial transaction.
    #[error("Public key not found in the partial transaction")]
    MissingPublicKey,
    /// The secret required by the redemption path is not provided or does not match its
    /// commitment.
    #[error("Missing or invalid secret for the redemption path")]
    MissingSecret,
    /// Not enough assets to create the transaction.
    #[error("Not enough assets to create the transaction")]
    NotEnoughAssets,
    /// Wrong transaction template.
    #[error("Wrong transaction template: {0}")]
    WrongTemplate(&'static str),
    /// The witness stack cannot be encoded.
    #[error("Script serialization error: {0}")]
    ScriptSerialization(&'static str),
    /// The transaction chain validation failed
    #[error("The transaction chain validation failed")]
    InvalidTransactionChain,
    /// Any transaction error not part of this list.
    #[error("Transaction error: {0}")]
    Other(Box<dyn error::Error + Send + Sync>),
}

impl Error {
    /// Creates a new transaction error of type other with an arbitrary payload.
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::Other(error.into())
    }

    /// Consumes the `Error`, returning its inner error (if any).
    ///
    /// If this [`enum@Error`] was constructed via [`new`] then this function will return [`Some`],
    /// otherwise it will return [`None`].
    ///
    /// [`new`]: Error::new
    ///
    pub fn into_inner(self) -> Option<Box<dyn error::Error + Send + Sync>> {
        match self {
            Self::Other(error) => Some(error),
            _ => None,
        }
    }
}

/// Defines the transaction identifiers of the four spending transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(Debug)]
pub enum TxLabel {
    /// Alice settles the deposit directly, paying both parties (Dep-A).
    Redeem,
    /// Bob moves the deposit into the collateral contract after the deposit delay (Dep-B).
    Transition,
    /// Bob redeems the collateral contract (Col-B).
    Claim,
    /// The collateral is burnt, the remaining value is left to the miners (Col-M).
    Burn,
}

impl TxLabel {
    pub fn all() -> [TxLabel; 4] {
        [Self::Redeem, Self::Transition, Self::Claim, Self::Burn]
    }
}

impl CanonicalBytes for TxLabel {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        let id: u16 = match self {
            TxLabel::Redeem => 0x01,
            TxLabel::Transition => 0x02,
            TxLabel::Claim => 0x03,
            TxLabel::Burn => 0x04,
        };
        id.to_le_bytes().to_vec()
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        match bytes {
            [0x01, 0x00] => Ok(TxLabel::Redeem),
            [0x02, 0x00] => Ok(TxLabel::Transition),
            [0x03, 0x00] => Ok(TxLabel::Claim),
            [0x04, 0x00] => Ok(TxLabel::Burn),
            _ => Err(consensus::Error::UnknownType),
        }
    }
}

impl FromStr for TxLabel {
    type Err = consensus::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Redeem" | "redeem" | "Dep-A" => Ok(TxLabel::Redeem),
            "Transition" | "transition" | "Dep-B" => Ok(TxLabel::Transition),
            "Claim" | "claim" | "Col-B" => Ok(TxLabel::Claim),
            "Burn" | "burn" | "Col-M" => Ok(TxLabel::Burn),
            _ => Err(consensus::Error::UnknownType),
        }
    }
}

/// Transaction that requries both participants to sign and add witness before finalizing the
/// transaction.
pub trait Witnessable
where
    Self: Sized,
{
    /// The message signed by the participants.
    type Message;
    type PublicKey;
    type Signature;

    /// Generate the witness message to be signed to create a valid transaction.
    fn generate_witness_message(&self) -> Result<Self::Message, Error>;

    /// Add a cooperation to the transaction and store it internally for later usage.
    fn add_witness(&mut self, pubkey: Self::PublicKey, sig: Self::Signature) -> Result<(), Error>;
}

/// Define a transaction that must have a finalization step.
pub trait Finalizable {
    /// Finalize the internal transaction and make it ready for extraction.
    fn finalize(&mut self) -> Result<(), Error>;
}

/// Define a transaction ready to be broadcasted once finalized.
pub trait Broadcastable: Finalizable
where
    Self: Sized,
{
    /// The fully signed transaction type.
    type Transaction;

    /// Extract the finalized transaction and return a fully signed transaction. Used before
    /// broadcasting the transaction on-chain.
    ///
    /// This correspond to the "role" of a "finalizer" as defined in BIP 174 for dealing with
    /// partial transactions.
    fn extract(&self) -> Self::Transaction;

    /// Finalize the internal transaction and extract it, ready to be broadcasted.
    fn finalize_and_extract(&mut self) -> Result<Self::Transaction, Error> {
        self.finalize()?;
        Ok(self.extract())
    }
}

/// Implemented by transactions that can be link to form chains of logic. A linkable transaction
/// can provide the data needed for other transaction to safely build on top of it.
///
/// `O`, the returned type of the consumable output, used to reference the funds and chain other
/// transactions on it. This must contain all necessary data to latter create a valid unlocking
/// witness for the output.
pub trait Linkable<O>
where
    Self: Sized,
{
    /// Return the consumable output of this transaction. The output does not contain the witness
    /// data allowing spending the output, only the data that points to the consumable output and
    /// the data necessary to produce a valid unlocking witness.
    fn get_consumable_output(&self) -> Result<O, Error>;
}

/// Implemented by transactions based on another transaction.
pub trait Chainable<O>: Debug
where
    O: Eq,
    Self: Sized,
{
    /// Returns the metadata that identifies the output this transaction spends.
    fn based_on(&self) -> Result<O, Error>;

    /// Verifies that the transaction build on top of the previous transaction.
    fn is_build_on_top_of(&self, prev: &impl Linkable<O>) -> Result<(), Error> {
        match self.based_on()? == prev.get_consumable_output()? {
            true => Ok(()),
            false => Err(Error::InvalidTransactionChain),
        }
    }
}
