//! Holder address type: 20 raw bytes, rendered as `0x`-prefixed hex.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The address of a balance holder.
///
/// The all-zero address is reserved: the token substrate refuses to credit or
/// debit it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HolderAddress([u8; 20]);

impl HolderAddress {
    /// The reserved zero address.
    pub const ZERO: Self = Self([0u8; 20]);

    /// Textual prefix of every rendered address.
    pub const PREFIX: &'static str = "0x";

    pub fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address whose last eight bytes hold `n` (big-endian).
    pub fn from_low_u64(n: u64) -> Self {
        let mut bytes = [0u8; 20];
        bytes[12..].copy_from_slice(&n.to_be_bytes());
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Display for HolderAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::PREFIX, hex::encode(self.0))
    }
}

impl FromStr for HolderAddress {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| TypesError::InvalidAddress(s.to_string()))?;
        let raw = hex::decode(digits).map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        let bytes: [u8; 20] = raw
            .try_into()
            .map_err(|_| TypesError::InvalidAddress(s.to_string()))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for HolderAddress {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<HolderAddress> for String {
    fn from(addr: HolderAddress) -> Self {
        addr.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let addr = HolderAddress::from_low_u64(0xdead_beef);
        let text = addr.to_string();
        assert_eq!(text, "0x00000000000000000000000000000000deadbeef");
        assert_eq!(text.parse::<HolderAddress>().unwrap(), addr);
    }

    #[test]
    fn zero_address_is_reserved() {
        assert!(HolderAddress::ZERO.is_zero());
        assert!(!HolderAddress::from_low_u64(1).is_zero());
    }

    #[test]
    fn rejects_missing_prefix_and_wrong_length() {
        assert!("00000000000000000000000000000000deadbeef"
            .parse::<HolderAddress>()
            .is_err());
        assert!("0xdeadbeef".parse::<HolderAddress>().is_err());
        assert!("0xzz000000000000000000000000000000deadbeef"
            .parse::<HolderAddress>()
            .is_err());
    }

    #[test]
    fn serializes_as_hex_string() {
        let addr = HolderAddress::from_low_u64(7);
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{addr}\""));
        let back: HolderAddress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
