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

//! Timelock unit and `OP_CODE` to use in Bitcoin transactions and scripts. Relative timelocks
//! follow [`BIP-68`][bip-68] for the `nSequence` encoding and [`BIP-112`][bip-112] for the script
//! check.
//!
//! [bip-68]: https://github.com/bitcoin/bips/blob/master/bip-0068.mediawiki
//! [bip-112]: https://github.com/bitcoin/bips/blob/master/bip-0112.mediawiki

use crate::consensus::{self, CanonicalBytes};

use std::fmt;
use std::str::FromStr;

/// `nSequence` value of an input that does not use relative timelocks nor replace-by-fee.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// When set, `nSequence` is not interpreted as a relative timelock.
pub const SEQUENCE_LOCKTIME_DISABLE_FLAG: u32 = 1 << 31;

/// When set, the relative timelock is expressed in units of 512 seconds, otherwise in blocks.
pub const SEQUENCE_LOCKTIME_TYPE_FLAG: u32 = 1 << 22;

/// Bits of `nSequence` carrying the relative timelock value.
pub const SEQUENCE_LOCKTIME_MASK: u32 = 0x0000_ffff;

impl FromStr for CSVTimelock {
    type Err = consensus::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let x = s
            .parse::<u32>()
            .map_err(|_| consensus::Error::ParseFailed("Failed parsing CSV timelock"))?;
        Ok(CSVTimelock(x))
    }
}

/// An `OP_CSV` value (32-bits integer) to use in transactions and scripts.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Debug, Copy, Serialize, Deserialize)]
pub struct CSVTimelock(u32);

impl fmt::Display for CSVTimelock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0 & SEQUENCE_LOCKTIME_MASK;
        match self.is_time_based() {
            true => write!(f, "{} x 512 seconds", value),
            false => write!(f, "{} blocks", value),
        }
    }
}

impl CSVTimelock {
    /// Create a new raw check sequence verify timelock of given value.
    pub fn new(timelock: u32) -> Self {
        Self(timelock)
    }

    /// Create a timelock of the given number of blocks.
    pub fn from_blocks(blocks: u16) -> Self {
        Self(blocks as u32)
    }

    /// Create a timelock of the given number of 512 seconds intervals.
    pub fn from_512_second_intervals(intervals: u16) -> Self {
        Self(SEQUENCE_LOCKTIME_TYPE_FLAG | intervals as u32)
    }

    /// Return the value of the check sequence verify.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Check the value only sets the type flag and the value bits of a relative lock-time.
    pub fn is_relative(&self) -> bool {
        self.0 & !(SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK) == 0
    }

    /// Return the `nSequence` value an input must carry to satisfy exactly this timelock. Bits
    /// outside a relative lock-time are dropped, see [`Self::is_relative`].
    pub fn as_sequence(&self) -> u32 {
        self.0 & (SEQUENCE_LOCKTIME_TYPE_FLAG | SEQUENCE_LOCKTIME_MASK)
    }

    /// Return the value of nSequence that disable `CHECK_SEQUENCE_VERIFY`.
    pub fn disable() -> u32 {
        SEQUENCE_LOCKTIME_DISABLE_FLAG
    }

    pub fn is_time_based(&self) -> bool {
        self.0 & SEQUENCE_LOCKTIME_TYPE_FLAG != 0
    }

    /// Check if an input `nSequence` passes `OP_CSV` with this timelock as argument: relative
    /// timelocks enabled, same unit, and a masked value greater or equal.
    pub fn is_satisfied_by(&self, sequence: u32) -> bool {
        if sequence & SEQUENCE_LOCKTIME_DISABLE_FLAG != 0 {
            return false;
        }
        if (sequence & SEQUENCE_LOCKTIME_TYPE_FLAG) != (self.0 & SEQUENCE_LOCKTIME_TYPE_FLAG) {
            return false;
        }
        (sequence & SEQUENCE_LOCKTIME_MASK) >= (self.0 & SEQUENCE_LOCKTIME_MASK)
    }
}

impl From<u32> for CSVTimelock {
    fn from(timelock: u32) -> Self {
        Self(timelock)
    }
}

impl CanonicalBytes for CSVTimelock {
    fn as_canonical_bytes(&self) -> Vec<u8> {
        bitcoin::consensus::encode::serialize(&self.0)
    }

    fn from_canonical_bytes(bytes: &[u8]) -> Result<Self, consensus::Error>
    where
        Self: Sized,
    {
        Ok(CSVTimelock(
            bitcoin::consensus::encode::deserialize(bytes).map_err(consensus::Error::new)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        let timelock = CSVTimelock::from_str("15").unwrap();
        assert_eq!(timelock, CSVTimelock::from_blocks(15));
        assert_eq!(format!("{}", timelock), "15 blocks");
        assert_eq!(
            format!("{}", CSVTimelock::from_512_second_intervals(3)),
            "3 x 512 seconds"
        );
        assert!(CSVTimelock::from_str("fifteen").is_err());
    }

    #[test]
    fn sequence_encoding() {
        assert_eq!(CSVTimelock::new(15).as_sequence(), 15);
        assert_eq!(
            CSVTimelock::from_512_second_intervals(2).as_sequence(),
            SEQUENCE_LOCKTIME_TYPE_FLAG | 2
        );
        assert_eq!(CSVTimelock::disable(), 0x8000_0000);
    }

    #[test]
    fn relative_bits_only() {
        assert!(CSVTimelock::from_blocks(15).is_relative());
        assert!(CSVTimelock::from_512_second_intervals(4).is_relative());
        assert!(!CSVTimelock::new(SEQUENCE_FINAL).is_relative());
        assert!(!CSVTimelock::new(CSVTimelock::disable() | 4).is_relative());
        assert!(!CSVTimelock::new(0x0001_0000).is_relative());
        assert_eq!(CSVTimelock::new(SEQUENCE_FINAL).as_sequence(), 0x0040_ffff);
    }

    #[test]
    fn csv_satisfaction() {
        let timelock = CSVTimelock::from_blocks(4);
        assert!(timelock.is_satisfied_by(4));
        assert!(timelock.is_satisfied_by(10));
        assert!(!timelock.is_satisfied_by(3));
        // disabled relative timelock never satisfies CSV
        assert!(!timelock.is_satisfied_by(SEQUENCE_FINAL));
        assert!(!timelock.is_satisfied_by(CSVTimelock::disable() | 10));
        // unit mismatch
        assert!(!timelock.is_satisfied_by(SEQUENCE_LOCKTIME_TYPE_FLAG | 10));
        let timed = CSVTimelock::from_512_second_intervals(4);
        assert!(timed.is_satisfied_by(SEQUENCE_LOCKTIME_TYPE_FLAG | 4));
        assert!(!timed.is_satisfied_by(4));
    }

    #[test]
    fn timelock_canonical_bytes() {
        let timelock = CSVTimelock::new(144);
        let bytes = timelock.as_canonical_bytes();
        assert_eq!(bytes, vec![0x90, 0x00, 0x00, 0x00]);
        assert_eq!(CSVTimelock::from_canonical_bytes(&bytes).unwrap(), timelock);
    }

    #[test]
    fn serde_timelock_in_yaml() {
        let s = serde_yaml::to_string(&CSVTimelock::new(2)).expect("Encode timelock in yaml");
        assert_eq!("---\n2\n", s);
        let timelock: CSVTimelock = serde_yaml::from_str("---\n2\n").expect("Decode from yaml");
        assert_eq!(timelock, CSVTimelock::new(2));
    }
}
