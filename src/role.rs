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

//! Roles used to distinguish the two participants of a hedged contract. Every redemption path
//! requires the cooperation of both parties, the role only decides who reveals which secret and
//! who receives which output.

use std::fmt;
use std::str::FromStr;

use bitcoin::secp256k1::{PublicKey, Secp256k1, SecretKey, Signing};
use bitcoin::Address;

use crate::consensus::{self, CanonicalBytes};

/// The two parties of a hedged contract.
#[derive(
    Display, Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[display(Debug)]
pub enum Party {
    /// Alice owns the first secret `preA`. She can settle the deposit immediately by revealing it.
    Alice,
    /// Bob owns the second secret `preB`. He can move the deposit into the collateral contract
    /// after the deposit delay by revealing it.
    Bob,
}

impl Party {
    /// Return the other party of the contract.
    pub fn other(&self) -> Self {
        match self {
            Self::Alice => Self::Bob,
            Self::Bob => Self::Alice,
        }
    }

    /// Both parties, in the order their keys and signatures appear in the scripts.
    pub fn both() -> [Party; 2] {
        [Party::Alice, Party::Bob]
    }
}

impl CanonicalBytes for Party {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        match self {
            Party::Alice => vec![0x01],
            Party::Bob => vec![0x02],
        }
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        match bytes {
            [0x01] => Ok(Party::Alice),
            [0x02] => Ok(Party::Bob),
            _ => Err(consensus::Error::UnknownType),
        }
    }
}

impl FromStr for Party {
    type Err = consensus::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Alice" | "alice" | "A" | "a" => Ok(Party::Alice),
            "Bob" | "bob" | "B" | "b" => Ok(Party::Bob),
            _ => Err(consensus::Error::UnknownType),
        }
    }
}

/// A party with its signing key and withdrawal address.
#[derive(Clone)]
pub struct Participant {
    party: Party,
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl Participant {
    /// Create a participant from its secret key, deriving the public key used in the scripts.
    pub fn new<C: Signing>(
        secp: &Secp256k1<C>,
        party: Party,
        secret_key: SecretKey,
        address: Address,
    ) -> Self {
        let public_key = PublicKey::from_secret_key(secp, &secret_key);
        Self {
            party,
            secret_key,
            public_key,
            address,
        }
    }

    pub fn party(&self) -> Party {
        self.party
    }

    /// The key used to co-sign every redemption path.
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// The address receiving this party's payouts.
    pub fn address(&self) -> &Address {
        &self.address
    }
}

// Never print secret keys.
impl fmt::Debug for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Participant")
            .field("party", &self.party)
            .field("public_key", &self.public_key)
            .field("address", &self.address)
            .finish()
    }
}
