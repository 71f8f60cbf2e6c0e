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

//! Contract parameters: the participants' keys and addresses, both secrets, the relative
//! timelocks, the amounts, and the outputs to spend. Parameters are loaded from YAML.
//!
//! ```yaml
//! network: testnet
//! alice:
//!   wif: cNnZ1uE6Eb3o2Ziuo2GBTNZxmjJqi3aoj4CHLkfm7as8Z9ruuRcE
//!   address: tb1qklkpdy0xwcav7q4th97hnxncfd8l8kux4u7pwn
//! bob:
//!   wif: cVgxEkRBtnfvd41ssd4PCsiemahAHidFrLWYoDBMNojUeME8dojZ
//!   address: tb1qdd6cvu6krl6hyhzs2ylhsnul2plj3h330kgfz6
//! secrets:
//!   alice: 10a1e49e2c56295e1f2fd2dce78294da
//!   bob: 0dc7c47740a748abed192062f0caf637
//! timelocks:
//!   deposit: 15
//!   collateral: 4
//! amounts:
//!   deposit: 75000
//!   collateral: 25000
//!   fee: 500
//! utxos:
//!   redeem:
//!     txid: 7e684f73cf2d690987d855da1a8b46efe0d6663145386eac1edaed3433883133
//!     vout: 1
//!     amount: 200000
//!   transition:
//!     txid: 7646f2aa75f267718e1ddf1162fe1fccb3dfe5c4dd12173633ba03585c224609
//!     vout: 0
//!     amount: 200000
//! ```

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use bitcoin::blockdata::script::Script;
use bitcoin::blockdata::transaction::TxOut;
use bitcoin::secp256k1::{Secp256k1, Signing};
use bitcoin::util::key;
use bitcoin::{Network, PrivateKey};
use thiserror::Error;

use crate::bitcoin::address::parse_address;
use crate::bitcoin::amount::Amounts;
use crate::bitcoin::timelock::CSVTimelock;
use crate::bitcoin::transaction::{self, MetadataOutput};
use crate::role::{Participant, Party};
use crate::script::Preimage;

/// Configuration errors, raised when loading or resolving parameters.
#[derive(Error, Debug)]
pub enum Error {
    /// The network name is unknown.
    #[error("Unknown network: {0}")]
    UnknownNetwork(String),
    /// A contract timelock is not a relative lock-time.
    #[error("Invalid relative timelock: {0:#010x}")]
    InvalidTimelock(u32),
    /// A private key is not a valid WIF.
    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] key::Error),
    /// A script pubkey is not valid hex.
    #[error("Invalid script pubkey: {0}")]
    InvalidScriptPubkey(#[from] hex::FromHexError),
    /// An address, network, or UTXO reference error.
    #[error("Bitcoin error: {0}")]
    Bitcoin(#[from] transaction::Error),
    /// The parameters cannot be decoded.
    #[error("Yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The parameters file cannot be read.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Signing key in WIF and payout address of a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyParameters {
    pub wif: String,
    pub address: String,
}

/// Secrets of both parties, used as the raw bytes of the strings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secrets {
    pub alice: String,
    pub bob: String,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secrets(<hidden>)")
    }
}

/// Relative timelocks, `T` for the deposit contract and `ell` for the collateral contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timelocks {
    pub deposit: CSVTimelock,
    pub collateral: CSVTimelock,
}

impl Timelocks {
    /// Check both timelocks only set the type flag and value bits of a relative lock-time.
    pub fn check(&self) -> Result<(), Error> {
        [self.deposit, self.collateral]
            .iter()
            .find(|timelock| !timelock.is_relative())
            .map_or(Ok(()), |timelock| Err(Error::InvalidTimelock(timelock.as_u32())))
    }
}

/// An on-chain output to spend. The `script_pubkey` defaults to the P2WSH of the spent contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_pubkey: Option<String>,
}

impl Utxo {
    /// Resolve the reference into a spendable output, `default_script_pubkey` is used when the
    /// parameters do not carry one.
    pub fn to_metadata(&self, default_script_pubkey: Script) -> Result<MetadataOutput, Error> {
        let script_pubkey = match &self.script_pubkey {
            Some(s) => Script::from(hex::decode(s)?),
            None => default_script_pubkey,
        };
        Ok(MetadataOutput::from_utxo(
            &self.txid,
            self.vout,
            TxOut {
                value: self.amount,
                script_pubkey,
            },
            None,
        )?)
    }
}

/// Outputs spent by each transaction. Collateral outputs are optional, the collateral spends are
/// chained on the transition transaction when missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxos {
    pub redeem: Utxo,
    pub transition: Utxo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim: Option<Utxo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burn: Option<Utxo>,
}

/// All the parameters of a hedged contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    pub network: String,
    pub alice: PartyParameters,
    pub bob: PartyParameters,
    pub secrets: Secrets,
    pub timelocks: Timelocks,
    pub amounts: Amounts,
    pub utxos: Utxos,
}

impl Parameters {
    /// Decode the parameters from a YAML document and validate them.
    pub fn from_yaml(s: &str) -> Result<Self, Error> {
        let params: Self = serde_yaml::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    /// Read and decode the parameters from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        debug!("loading parameters from {}", path.display());
        Self::from_yaml(&fs::read_to_string(path)?)
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Check the network, both keys, both addresses, and the timelocks.
    pub fn validate(&self) -> Result<(), Error> {
        self.timelocks.check()?;
        let secp = Secp256k1::signing_only();
        for party in Party::both() {
            self.participant(&secp, party)?;
        }
        Ok(())
    }

    pub fn network(&self) -> Result<Network, Error> {
        Network::from_str(&self.network).map_err(|_| Error::UnknownNetwork(self.network.clone()))
    }

    fn party(&self, party: Party) -> &PartyParameters {
        match party {
            Party::Alice => &self.alice,
            Party::Bob => &self.bob,
        }
    }

    /// Decode the key and the address of a party, both must belong to the network.
    pub fn participant<C: Signing>(
        &self,
        secp: &Secp256k1<C>,
        party: Party,
    ) -> Result<Participant, Error> {
        let network = self.network()?;
        let PartyParameters { wif, address } = self.party(party);
        let key = PrivateKey::from_wif(wif)?;
        // WIF keys only distinguish mainnet from the test networks
        let test_network = |n: Network| n != Network::Bitcoin;
        if key.network != network && !(test_network(key.network) && test_network(network)) {
            return Err(transaction::Error::NetworkMismatch(key.network, network).into());
        }
        let address = parse_address(address, network)?;
        Ok(Participant::new(secp, party, key.inner, address))
    }

    /// The secret of a party, the raw bytes of the configured string.
    pub fn preimage(&self, party: Party) -> Preimage {
        match party {
            Party::Alice => Preimage::from(self.secrets.alice.as_str()),
            Party::Bob => Preimage::from(self.secrets.bob.as_str()),
        }
    }
}
