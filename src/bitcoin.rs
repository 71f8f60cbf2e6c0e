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

//! Implementation of the hedged contracts on Bitcoin with SegWit version 0 outputs and ECDSA
//! signatures.

pub mod address;
pub mod amount;
pub mod segwitv0;
pub mod timelock;
pub mod transaction;
pub mod witness;

pub use address::{burn_address, collateral_address, deposit_address};
pub use amount::Amounts;
pub use segwitv0::{
    BurnLock, BurnTx, ClaimTx, CollateralLock, DepositLock, HedgedLock, RedeemTx, TransitionTx,
};
pub use timelock::CSVTimelock;
pub use transaction::{MetadataOutput, Tx};
