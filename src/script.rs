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

//! Data structures used in scripts to create the deposit and collateral contracts, and the
//! redemption paths selecting which branch of a contract a spending transaction takes.

use std::fmt;
use std::str::FromStr;

use bitcoin::hashes::{hash160, Hash};
use bitcoin::secp256k1::PublicKey;
use serde::ser::{Serialize, Serializer};
use serde::{de, Deserialize, Deserializer};

use crate::bitcoin::timelock::{CSVTimelock, SEQUENCE_FINAL};
use crate::consensus::{self, CanonicalBytes};
use crate::role::Party;
use crate::transaction::TxLabel;

/// A secret revealed by a party in a spending witness. The contracts only ever commit to its
/// [`Commitment`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Preimage(Vec<u8>);

impl Preimage {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Return the public commitment `RIPEMD160(SHA256(preimage))` of the secret.
    pub fn commitment(&self) -> Commitment {
        Commitment(hash160::Hash::hash(&self.0[..]))
    }

    /// Check if the secret opens the given commitment.
    pub fn opens(&self, commitment: &Commitment) -> bool {
        &self.commitment() == commitment
    }
}

impl From<&[u8]> for Preimage {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for Preimage {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

// Secrets are only displayed once revealed on-chain, keep them out of debug logs.
impl fmt::Debug for Preimage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preimage(<{} bytes>)", self.0.len())
    }
}

impl CanonicalBytes for Preimage {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        self.0.clone()
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        Ok(Self(bytes.to_vec()))
    }
}

/// The public commitment to a [`Preimage`], a `HASH160` as checked by `OP_HASH160 <c> OP_EQUAL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{0}")]
pub struct Commitment(hash160::Hash);

impl Commitment {
    pub fn from_hash(hash: hash160::Hash) -> Self {
        Self(hash)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    pub fn as_hash(&self) -> hash160::Hash {
        self.0
    }
}

impl FromStr for Commitment {
    type Err = consensus::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hash = hash160::Hash::from_str(s).map_err(consensus::Error::new)?;
        Ok(Self(hash))
    }
}

impl CanonicalBytes for Commitment {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        self.0[..].to_vec()
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        hash160::Hash::from_slice(bytes)
            .map(Self)
            .map_err(consensus::Error::new)
    }
}

impl Serialize for Commitment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(format!("{}", self).as_ref())
    }
}

impl<'de> Deserialize<'de> for Commitment {
    fn deserialize<D>(deserializer: D) -> Result<Commitment, D::Error>
    where
        D: Deserializer<'de>,
    {
        Commitment::from_str(&String::deserialize(deserializer)?).map_err(de::Error::custom)
    }
}

/// Store public keys of both parties, one public key per [`Party`] in the contract. Keys are
/// pushed in this order in the `2-of-2` multisig prefix of both scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("Alice: {alice}, Bob: {bob}")]
pub struct DoubleKeys {
    /// Public key associated to Alice.
    pub alice: PublicKey,
    /// Public key associated to Bob.
    pub bob: PublicKey,
}

impl DoubleKeys {
    /// Store public keys for both parties.
    pub fn new(alice: PublicKey, bob: PublicKey) -> Self {
        Self { alice, bob }
    }

    pub fn get(&self, party: Party) -> &PublicKey {
        match party {
            Party::Alice => &self.alice,
            Party::Bob => &self.bob,
        }
    }
}

/// Store the commitments to both secrets, `commitA` and `commitB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("Alice: {alice}, Bob: {bob}")]
pub struct DoubleCommitments {
    pub alice: Commitment,
    pub bob: Commitment,
}

impl DoubleCommitments {
    pub fn new(alice: Commitment, bob: Commitment) -> Self {
        Self { alice, bob }
    }

    /// Commit to both secrets.
    pub fn from_preimages(pre_a: &Preimage, pre_b: &Preimage) -> Self {
        Self {
            alice: pre_a.commitment(),
            bob: pre_b.commitment(),
        }
    }

    pub fn get(&self, party: Party) -> &Commitment {
        match party {
            Party::Alice => &self.alice,
            Party::Bob => &self.bob,
        }
    }
}

/// Store both parties' public keys, both commitments, and the relative timelock used to create
/// either the deposit contract (timelock `T`) or the collateral contract (timelock `ell`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display("Timelock: {timelock}, Keys: <{keys}>, Commitments: <{commitments}>")]
pub struct DataLock {
    pub timelock: CSVTimelock,
    pub keys: DoubleKeys,
    pub commitments: DoubleCommitments,
}

/// Define the branch taken in a contract script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[display(Debug)]
pub enum ScriptPath {
    /// The `OP_IF` branch, entered when the item below the signatures opens `commitA`.
    Hashlock,
    /// The `OP_ELSE` branch, guarded by `OP_CHECKSEQUENCEVERIFY`.
    Timelock,
}

/// The two sub-branches available to claim the collateral contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimBranch {
    /// Both secrets are known, the hashlock branch is taken and no delay applies.
    Preimages { pre_a: Preimage, pre_b: Preimage },
    /// The collateral delay expired, the timelock branch is taken and no secret is revealed.
    Timelock(CSVTimelock),
}

/// The four redemption paths supported by the hedged contracts. Each variant carries the data
/// needed to build its witness and its input sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedemptionPath {
    /// Alice settles the deposit directly by revealing `preA`.
    Redeem { pre_a: Preimage },
    /// Bob moves the deposit into the collateral contract by revealing `preB` once the deposit
    /// timelock is satisfied by `timelock`.
    Transition {
        pre_b: Preimage,
        timelock: CSVTimelock,
    },
    /// Bob redeems the collateral contract.
    Claim(ClaimBranch),
    /// The collateral is burnt, only the deposit value is sent to the unspendable output.
    Burn {
        pre_a: Preimage,
        pre_b: Preimage,
        timelock: CSVTimelock,
    },
}

impl RedemptionPath {
    /// Return the transaction label produced by this path.
    pub fn label(&self) -> TxLabel {
        match self {
            Self::Redeem { .. } => TxLabel::Redeem,
            Self::Transition { .. } => TxLabel::Transition,
            Self::Claim(_) => TxLabel::Claim,
            Self::Burn { .. } => TxLabel::Burn,
        }
    }

    /// Return the branch of the contract script this path executes.
    pub fn script_path(&self) -> ScriptPath {
        match self {
            Self::Redeem { .. } => ScriptPath::Hashlock,
            Self::Transition { .. } => ScriptPath::Timelock,
            Self::Claim(ClaimBranch::Preimages { .. }) => ScriptPath::Hashlock,
            Self::Claim(ClaimBranch::Timelock(_)) => ScriptPath::Timelock,
            Self::Burn { .. } => ScriptPath::Hashlock,
        }
    }

    /// Return true if the path spends the collateral contract, false for the deposit contract.
    pub fn spends_collateral(&self) -> bool {
        matches!(self, Self::Claim(_) | Self::Burn { .. })
    }

    /// Return the `nSequence` the spending input must carry for this path.
    pub fn sequence(&self) -> u32 {
        match self {
            Self::Redeem { .. } => SEQUENCE_FINAL,
            Self::Transition { timelock, .. } => timelock.as_sequence(),
            Self::Claim(ClaimBranch::Preimages { .. }) => SEQUENCE_FINAL,
            Self::Claim(ClaimBranch::Timelock(timelock)) => timelock.as_sequence(),
            Self::Burn { timelock, .. } => timelock.as_sequence(),
        }
    }

    /// Return the secret of the given party revealed by this path, if any.
    pub fn revealed(&self, party: Party) -> Option<&Preimage> {
        match (self, party) {
            (Self::Redeem { pre_a }, Party::Alice) => Some(pre_a),
            (Self::Transition { pre_b, .. }, Party::Bob) => Some(pre_b),
            (Self::Claim(ClaimBranch::Preimages { pre_a, .. }), Party::Alice) => Some(pre_a),
            (Self::Claim(ClaimBranch::Preimages { pre_b, .. }), Party::Bob) => Some(pre_b),
            (Self::Burn { pre_a, .. }, Party::Alice) => Some(pre_a),
            (Self::Burn { pre_b, .. }, Party::Bob) => Some(pre_b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRE_A: &str = "10a1e49e2c56295e1f2fd2dce78294da";
    const PRE_B: &str = "0dc7c47740a748abed192062f0caf637";

    fn public_key() -> PublicKey {
        PublicKey::from_slice(&[
            0x02, 0xc6, 0x6e, 0x7d, 0x89, 0x66, 0xb5, 0xc5, 0x55, 0xaf, 0x58, 0x05, 0x98, 0x9d,
            0xa9, 0xfb, 0xf8, 0xdb, 0x95, 0xe1, 0x56, 0x31, 0xce, 0x35, 0x8c, 0x3a, 0x17, 0x10,
            0xc9, 0x62, 0x67, 0x90, 0x63,
        ])
        .expect("public keys must be 33 or 65 bytes, serialized according to SEC 2")
    }

    #[test]
    fn commitments_are_hash160() {
        // values of the fixture contract, see the pushed hashes in the deposit script
        let pre_a = Preimage::from(PRE_A);
        let pre_b = Preimage::from(PRE_B);
        assert_eq!(
            format!("{}", pre_a.commitment()),
            "1bf351d042f4dc4f2ca667d6523db196ba5e0a1b"
        );
        assert_eq!(
            format!("{}", pre_b.commitment()),
            "bfbf4dd90b482da06655a307947f325168eff185"
        );
        assert!(pre_a.opens(&pre_a.commitment()));
        assert!(!pre_a.opens(&pre_b.commitment()));
        assert!(!pre_b.opens(&pre_a.commitment()));
    }

    #[test]
    fn preimage_debug_hides_secret() {
        let pre_a = Preimage::from(PRE_A);
        assert_eq!(format!("{:?}", pre_a), "Preimage(<32 bytes>)");
    }

    #[test]
    fn commitment_parse_and_bytes() {
        let commitment = Preimage::from(PRE_A).commitment();
        let parsed = Commitment::from_str(&format!("{}", commitment)).unwrap();
        assert_eq!(parsed, commitment);
        let bytes = commitment.as_canonical_bytes();
        assert_eq!(bytes.len(), 20);
        assert_eq!(Commitment::from_canonical_bytes(&bytes).unwrap(), commitment);
        assert!(Commitment::from_canonical_bytes(&bytes[1..]).is_err());
    }

    #[test]
    fn serde_serialize_double_commitments() {
        let commitments =
            DoubleCommitments::from_preimages(&Preimage::from(PRE_A), &Preimage::from(PRE_B));
        let s = serde_yaml::to_string(&commitments).unwrap();
        let yml = r#"---
alice: 1bf351d042f4dc4f2ca667d6523db196ba5e0a1b
bob: bfbf4dd90b482da06655a307947f325168eff185
"#;
        assert_eq!(yml, s);
        let back: DoubleCommitments = serde_yaml::from_str(yml).unwrap();
        assert_eq!(back, commitments);
    }

    #[test]
    fn double_keys_per_party() {
        let pk = public_key();
        let keys = DoubleKeys::new(pk, pk);
        assert_eq!(keys.get(Party::Alice), &pk);
        assert_eq!(keys.get(Party::Bob), &pk);
    }

    #[test]
    fn redemption_paths() {
        let pre_a = Preimage::from(PRE_A);
        let pre_b = Preimage::from(PRE_B);

        let redeem = RedemptionPath::Redeem {
            pre_a: pre_a.clone(),
        };
        assert_eq!(redeem.label(), TxLabel::Redeem);
        assert_eq!(redeem.script_path(), ScriptPath::Hashlock);
        assert_eq!(redeem.sequence(), SEQUENCE_FINAL);
        assert!(!redeem.spends_collateral());
        assert_eq!(redeem.revealed(Party::Alice), Some(&pre_a));
        assert_eq!(redeem.revealed(Party::Bob), None);

        let transition = RedemptionPath::Transition {
            pre_b: pre_b.clone(),
            timelock: CSVTimelock::new(15),
        };
        assert_eq!(transition.script_path(), ScriptPath::Timelock);
        assert_eq!(transition.sequence(), 15);
        assert_eq!(transition.revealed(Party::Alice), None);

        let claim = RedemptionPath::Claim(ClaimBranch::Timelock(CSVTimelock::new(4)));
        assert_eq!(claim.script_path(), ScriptPath::Timelock);
        assert_eq!(claim.sequence(), 4);
        assert!(claim.spends_collateral());

        let claim = RedemptionPath::Claim(ClaimBranch::Preimages {
            pre_a: pre_a.clone(),
            pre_b: pre_b.clone(),
        });
        assert_eq!(claim.script_path(), ScriptPath::Hashlock);
        assert_eq!(claim.sequence(), SEQUENCE_FINAL);

        let burn = RedemptionPath::Burn {
            pre_a,
            pre_b: pre_b.clone(),
            timelock: CSVTimelock::new(4),
        };
        assert_eq!(burn.label(), TxLabel::Burn);
        assert_eq!(burn.script_path(), ScriptPath::Hashlock);
        assert_eq!(burn.sequence(), 4);
        assert_eq!(burn.revealed(Party::Bob), Some(&pre_b));
    }
}
