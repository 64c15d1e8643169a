//! Ledger value types: accounts, amounts, records.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content_id::ContentId;

/// Index of a video in the ledger registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VideoId(pub u64);

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address must start with 0x")]
    MissingPrefix,
    #[error("address must have 40 hex digits, got {0}")]
    BadLength(usize),
    #[error("address contains a non-hex digit")]
    NotHex,
}

/// Account address. Stored lowercased so comparisons ignore checksum casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn parse(raw: &str) -> Result<Self, AddressError> {
        let s = raw.trim();
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        if hex.len() != 40 {
            return Err(AddressError::BadLength(hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::NotHex);
        }
        Ok(Self(format!("0x{}", hex.to_ascii_lowercase())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `0x1234...abcd` form for display.
    pub fn short(&self) -> String {
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Address> for String {
    fn from(a: Address) -> Self {
        a.0
    }
}

const WEI_PER_ETHER: u128 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("invalid ether amount: {0:?}")]
    Invalid(String),
    #[error("more than 18 decimal places: {0:?}")]
    TooPrecise(String),
    #[error("amount overflows: {0:?}")]
    Overflow(String),
}

/// Amount in wei (10^-18 ether).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Wei(pub u128);

impl Wei {
    pub const ZERO: Wei = Wei(0);

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Parse a decimal ether string such as `"0.05"` or `"2"`.
    pub fn from_ether_str(raw: &str) -> Result<Self, AmountError> {
        let s = raw.trim();
        let (whole, frac) = s.split_once('.').unwrap_or((s, ""));
        if (whole.is_empty() && frac.is_empty())
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Invalid(raw.to_string()));
        }
        if frac.len() > ETHER_DECIMALS {
            return Err(AmountError::TooPrecise(raw.to_string()));
        }
        let whole: u128 = if whole.is_empty() {
            0
        } else {
            whole
                .parse()
                .map_err(|_| AmountError::Overflow(raw.to_string()))?
        };
        let frac_wei: u128 = if frac.is_empty() {
            0
        } else {
            format!("{:0<width$}", frac, width = ETHER_DECIMALS)
                .parse()
                .map_err(|_| AmountError::Invalid(raw.to_string()))?
        };
        whole
            .checked_mul(WEI_PER_ETHER)
            .and_then(|w| w.checked_add(frac_wei))
            .map(Wei)
            .ok_or_else(|| AmountError::Overflow(raw.to_string()))
    }

    /// Decimal ether string with trailing zeros trimmed, always keeping one
    /// fractional digit (`1.0`, `0.05`).
    pub fn to_ether_string(&self) -> String {
        let whole = self.0 / WEI_PER_ETHER;
        let frac = self.0 % WEI_PER_ETHER;
        let frac = format!("{:0>width$}", frac, width = ETHER_DECIMALS);
        let trimmed = frac.trim_end_matches('0');
        if trimmed.is_empty() {
            format!("{}.0", whole)
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

impl fmt::Display for Wei {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ETH", self.to_ether_string())
    }
}

/// One registry entry as returned by the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: VideoId,
    /// None once the owner removed the video.
    pub content_id: Option<ContentId>,
    pub title: String,
    pub description: String,
    pub owner: Address,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub price: Wei,
}

impl VideoRecord {
    pub fn is_paid(&self) -> bool {
        !self.price.is_zero()
    }
}

/// Registration request for a freshly pinned video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewListing {
    pub content_id: ContentId,
    pub title: String,
    pub description: String,
    pub price: Wei,
}

/// Confirmation of a settled state-changing call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub tx_hash: String,
}
