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

//! Addresses of the contracts, derived from their scripts.

use crate::bitcoin::segwitv0::{BurnLock, CollateralLock, DepositLock, HedgedLock};
use crate::bitcoin::transaction::Error;
use crate::consensus::{self, CanonicalBytes};
use crate::script::DataLock;

use bitcoin::{Address, Network};

use std::str::{self, FromStr};

impl CanonicalBytes for Address {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        self.to_string().into()
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        Address::from_str(str::from_utf8(bytes).map_err(consensus::Error::new)?)
            .map_err(consensus::Error::new)
    }
}

/// P2WSH address of the deposit contract.
pub fn deposit_address(data: DataLock, network: Network) -> Address {
    let address = Address::p2wsh(&DepositLock::script(data), network);
    debug!("deposit contract address: {}", address);
    address
}

/// P2WSH address of the collateral contract.
pub fn collateral_address(data: DataLock, network: Network) -> Address {
    let address = Address::p2wsh(&CollateralLock::script(data), network);
    debug!("collateral contract address: {}", address);
    address
}

/// P2SH address wrapping the `OP_RETURN` burn script.
pub fn burn_address(network: Network) -> Result<Address, Error> {
    Ok(Address::p2sh(&BurnLock::script(), network)?)
}

/// Parse an address and check it belongs to the network.
pub fn parse_address(s: &str, network: Network) -> Result<Address, Error> {
    let address = Address::from_str(s)?;
    // testnet and signet share the same encoding
    match address.network == network
        || (address.network == Network::Testnet && network == Network::Signet)
    {
        true => Ok(address),
        false => Err(Error::NetworkMismatch(address.network, network)),
    }
}
