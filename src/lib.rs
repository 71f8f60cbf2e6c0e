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

//! Hedged HTLC core library
//!
//! A hedged hash time-locked contract between two participants, Alice and Bob, built from two
//! P2WSH contracts on Bitcoin: a deposit contract locking Alice's funds and a collateral contract
//! locking Bob's collateral. The deposit is spent either by the redeem transaction, revealing
//! Alice's secret, or by the transition transaction, revealing Bob's secret after the deposit
//! timelock and moving the funds into the collateral contract. The collateral contract is then
//! spent by the claim transaction or by the burn transaction.
//!
//! Contracts, addresses and transactions are derived from a YAML parameter file, see
//! [`parameters::Parameters`], and executed with [`HedgedHtlc`].

use thiserror::Error;

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate serde;
#[macro_use]
extern crate log;

pub mod bitcoin;
pub mod consensus;
pub mod parameters;
pub mod protocol;
pub mod role;
pub mod script;
pub mod transaction;

pub use protocol::HedgedHtlc;

/// A list of possible errors when building and spending the hedged contracts. Each error can
/// have multiple level down to the Bitcoin implementation.
#[derive(Error, Debug)]
pub enum Error {
    /// A consensus error during encoding/decoding operation or data type missmatch.
    #[error("Consensus error: {0}")]
    Consensus(#[from] consensus::Error),
    /// A transaction error while building, signing or finalizing a spend.
    #[error("Transaction error: {0}")]
    Transaction(#[from] transaction::Error),
    /// An error from the Bitcoin implementation of the contracts.
    #[error("Bitcoin error: {0}")]
    Bitcoin(#[from] bitcoin::transaction::Error),
    /// An invalid or inconsistent parameter file.
    #[error("Parameters error: {0}")]
    Parameters(#[from] parameters::Error),
}

/// Result of a high level computation such as a complete spend.
pub type Res<T> = Result<T, Error>;
