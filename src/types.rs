//! Identifier and response types for the contract and big-map endpoints.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::micheline::Prim;

/// An identifier string that did not match its expected encoding.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value:?}")]
pub struct ParseError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// Base58 alphabet without 0, O, I and l.
macro_rules! b58 {
    ($n:literal) => {
        concat!("[1-9A-HJ-NP-Za-km-z]{", $n, "}")
    };
}

/// Decodes a base58check string and verifies that it carries one of
/// `prefixes` followed by exactly `payload_len` bytes.
fn has_checked_payload(value: &str, prefixes: &[&[u8]], payload_len: usize) -> bool {
    let Ok(bytes) = bs58::decode(value).with_check(None).into_vec() else {
        return false;
    };
    prefixes
        .iter()
        .any(|prefix| bytes.starts_with(prefix) && bytes.len() == prefix.len() + payload_len)
}

/// Declares a validated newtype over a base58check encoded string.
macro_rules! base58_string {
    (
        $(#[$meta:meta])* $name:ident,
        $kind:literal,
        $pattern:expr,
        prefixes: $prefixes:expr,
        payload: $payload:literal
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Returns the canonical string form.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = ParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                static PATTERN: LazyLock<regress::Regex> = LazyLock::new(|| {
                    regress::Regex::new($pattern).expect("identifier pattern is a valid regex")
                });
                if PATTERN.find(value).is_none()
                    || !has_checked_payload(value, $prefixes, $payload)
                {
                    return Err(ParseError::new($kind, value));
                }
                Ok(Self(value.to_string()))
            }
        }

        impl TryFrom<&str> for $name {
            type Error = ParseError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer)?
                    .parse()
                    .map_err(serde::de::Error::custom)
            }
        }
    };
}

base58_string!(
    /// An implicit account, originated contract or rollup address.
    Address,
    "address",
    concat!("^(?:(?:tz[1-4]|KT1|sr1|txr1)", b58!(33), ")$"),
    prefixes: &[
        &[6, 161, 159],   // tz1
        &[6, 161, 161],   // tz2
        &[6, 161, 164],   // tz3
        &[6, 161, 166],   // tz4
        &[2, 90, 121],    // KT1
        &[6, 124, 117],   // sr1
        &[1, 128, 120, 31], // txr1
    ],
    payload: 20
);

base58_string!(
    /// Hash of a packed script expression, used to key big-map contents.
    ExprHash,
    "expression hash",
    concat!("^expr", b58!(50), "$"),
    prefixes: &[&[13, 44, 64, 27]],
    payload: 32
);

base58_string!(
    /// A block hash.
    BlockHash,
    "block hash",
    concat!("^B", b58!(50), "$"),
    prefixes: &[&[1, 52]],
    payload: 32
);

impl Address {
    /// Returns `true` for originated (`KT1`) contracts.
    pub fn is_contract(&self) -> bool {
        self.0.starts_with("KT1")
    }
}

/// Pins a query to a point in chain history.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockId {
    /// The current head of the main chain.
    #[default]
    Head,
    /// The genesis block.
    Genesis,
    /// A block height.
    Level(i64),
    /// A specific block hash.
    Hash(BlockHash),
    /// The Nth predecessor of head (`head~N`).
    HeadOffset(u32),
}

impl BlockId {
    /// Wraps a block height.
    pub fn level(height: i64) -> Self {
        Self::Level(height)
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => f.write_str("head"),
            Self::Genesis => f.write_str("genesis"),
            Self::Level(height) => write!(f, "{height}"),
            Self::Hash(hash) => write!(f, "{hash}"),
            Self::HeadOffset(offset) => write!(f, "head~{offset}"),
        }
    }
}

impl FromStr for BlockId {
    type Err = ParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "head" => return Ok(Self::Head),
            "genesis" => return Ok(Self::Genesis),
            _ => {}
        }
        if let Some(offset) = value.strip_prefix("head~") {
            return offset
                .parse()
                .map(Self::HeadOffset)
                .map_err(|_| ParseError::new("block id", value));
        }
        if let Ok(height) = value.parse::<i64>() {
            return Ok(Self::Level(height));
        }
        value
            .parse()
            .map(Self::Hash)
            .map_err(|_| ParseError::new("block id", value))
    }
}

impl From<i64> for BlockId {
    fn from(value: i64) -> Self {
        Self::Level(value)
    }
}

impl From<BlockHash> for BlockId {
    fn from(value: BlockHash) -> Self {
        Self::Hash(value)
    }
}

/// Contracts known to the node at some block.
pub type Contracts = Vec<Address>;

/// Entrypoint names mapped to their parameter types.
pub type Entrypoints = BTreeMap<String, Prim>;

/// Type descriptors and storage footprint of a big map.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigmapInfo {
    pub key_type: Prim,
    pub value_type: Prim,
    #[serde(with = "string_i64")]
    pub total_bytes: i64,
}

/// Integers the node encodes as JSON strings.
pub(crate) mod string_i64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}
