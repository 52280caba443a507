//! Core type definitions for the Liquidity Book SDK

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::AddressError;

/// EVM account or contract address (20 bytes)
///
/// Ordering compares the raw bytes, which is the same order as comparing
/// lower-case hex strings.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    /// The zero address, used by factories to signal "no such pair"
    pub const ZERO: Address = Address([0u8; 20]);

    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Build an address from a `0x`-prefixed literal at compile time.
    ///
    /// Panics (at compile time when used in a `const`) on malformed input.
    pub const fn from_hex_literal(s: &str) -> Self {
        let bytes = s.as_bytes();
        assert!(
            bytes.len() == 42 && bytes[0] == b'0' && bytes[1] == b'x',
            "address literal must be 0x followed by 40 hex digits"
        );
        let mut out = [0u8; 20];
        let mut i = 0;
        while i < 20 {
            out[i] = (hex_nibble(bytes[2 + 2 * i]) << 4) | hex_nibble(bytes[3 + 2 * i]);
            i += 1;
        }
        Self(out)
    }

    /// Parse a `0x`-prefixed hex address.
    ///
    /// Malformed input is an error. Well-formed input that is not in EIP-55
    /// checksum form is accepted with a warning.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let address = Self::parse_unchecked(s)?;
        let checksummed = address.to_checksum();
        if s != checksummed {
            tracing::warn!(
                address = s,
                checksummed = %checksummed,
                "Address is not checksummed"
            );
        }
        Ok(address)
    }

    fn parse_unchecked(s: &str) -> Result<Self, AddressError> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| AddressError::MissingPrefix {
                address: s.to_string(),
            })?;
        if digits.len() != 40 {
            return Err(AddressError::InvalidLength {
                address: s.to_string(),
                len: digits.len(),
            });
        }
        let decoded = hex::decode(digits).map_err(|_| AddressError::InvalidHex {
            address: s.to_string(),
        })?;
        let mut out = [0u8; 20];
        out.copy_from_slice(&decoded);
        Ok(Self(out))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Lower-case hex with `0x` prefix
    pub fn to_lower_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// EIP-55 mixed-case checksum encoding
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(42);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 {
                hash[i / 2] >> 4
            } else {
                hash[i / 2] & 0x0f
            };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

const fn hex_nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => panic!("invalid hex digit in address literal"),
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// EVM chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Avalanche Fuji testnet
    pub const FUJI: ChainId = ChainId(43113);
    /// Avalanche C-Chain mainnet
    pub const AVALANCHE: ChainId = ChainId(43114);

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ERC-20 token metadata
///
/// Identity is (chain id, address); symbol, name and decimals are metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub chain_id: ChainId,
    pub address: Address,
    pub decimals: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Token {
    pub fn new(
        chain_id: ChainId,
        address: Address,
        decimals: u8,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            chain_id,
            address,
            decimals,
            symbol: Some(symbol.into()),
            name: Some(name.into()),
        }
    }

    /// Canonical total order used to pick token0/token1 (tokenX/tokenY)
    pub fn sorts_before(&self, other: &Token) -> bool {
        self.address < other.address
    }

    /// Symbol, falling back to the checksummed address
    pub fn display_symbol(&self) -> String {
        self.symbol
            .clone()
            .unwrap_or_else(|| self.address.to_checksum())
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.chain_id == other.chain_id && self.address == other.address
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chain_id.hash(state);
        self.address.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.display_symbol(), self.address)
    }
}

/// Constants
pub mod constants {
    use super::Address;

    /// Wrapped AVAX on Fuji
    pub const WAVAX_FUJI: Address =
        Address::from_hex_literal("0xd00ae08403B9bbb9124bB305C09058E32C39A48c");

    /// Wrapped AVAX on Avalanche C-Chain
    pub const WAVAX_AVALANCHE: Address =
        Address::from_hex_literal("0xB31f66AA3C1e785363F0875A1B74E27b85FD66c7");

    /// Hex encoding of zero, used for the `value` of non-payable calls
    pub const ZERO_HEX: &str = "0x0";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_encoding() {
        let addr = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            addr.to_checksum(),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );

        let addr = Address::parse("0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            addr.to_checksum(),
            "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_parse_accepts_any_case() {
        let checksummed = Address::parse("0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed").unwrap();
        let lower = Address::parse("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let upper = Address::parse("0x5AAEB6053F3E94C9B9A09F33669435E7EF1BEAED").unwrap();
        assert_eq!(checksummed, lower);
        assert_eq!(checksummed, upper);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(matches!(
            Address::parse("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::MissingPrefix { .. })
        ));
        assert!(matches!(
            Address::parse("0x5aaeb6"),
            Err(AddressError::InvalidLength { len: 6, .. })
        ));
        assert!(matches!(
            Address::parse("0xzzaeb6053f3e94c9b9a09f33669435e7ef1beaed"),
            Err(AddressError::InvalidHex { .. })
        ));
    }

    #[test]
    fn test_hex_literal_matches_parse() {
        let parsed = Address::parse("0xd00ae08403B9bbb9124bB305C09058E32C39A48c").unwrap();
        assert_eq!(constants::WAVAX_FUJI, parsed);
        assert!(!constants::WAVAX_FUJI.is_zero());
        assert!(Address::ZERO.is_zero());
    }

    #[test]
    fn test_address_serde() {
        let addr = constants::WAVAX_AVALANCHE;
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, format!("\"{}\"", addr.to_checksum()));
        let parsed: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, addr);
        assert!(serde_json::from_str::<Address>("\"0x1234\"").is_err());
    }

    #[test]
    fn test_token_identity_and_order() {
        let a = Token::new(
            ChainId::FUJI,
            Address::from_hex_literal("0x0000000000000000000000000000000000000001"),
            6,
            "AAA",
            "Token A",
        );
        let mut renamed = a.clone();
        renamed.symbol = Some("OTHER".into());
        assert_eq!(a, renamed);

        let b = Token::new(
            ChainId::FUJI,
            Address::from_hex_literal("0x00000000000000000000000000000000000000Ff"),
            18,
            "BBB",
            "Token B",
        );
        assert!(a.sorts_before(&b));
        assert!(!b.sorts_before(&a));

        let mut other_chain = a.clone();
        other_chain.chain_id = ChainId::AVALANCHE;
        assert_ne!(a, other_chain);
    }
}
