//! Content identifiers issued by the storage provider.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash-derived key of an immutable stored asset (e.g. an IPFS CID).
///
/// The value is appended verbatim to gateway base URLs, so parsing rejects
/// anything that would change the path shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentIdError {
    #[error("content identifier is empty")]
    Empty,
    #[error("content identifier contains invalid character {0:?}")]
    InvalidChar(char),
}

impl ContentId {
    pub fn parse(raw: &str) -> Result<Self, ContentIdError> {
        let s = raw.trim();
        if s.is_empty() {
            return Err(ContentIdError::Empty);
        }
        if let Some(c) = s
            .chars()
            .find(|c| c.is_whitespace() || c.is_control() || matches!(c, '/' | '?' | '#'))
        {
            return Err(ContentIdError::InvalidChar(c));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ContentId {
    type Err = ContentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ContentId {
    type Error = ContentIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ContentId> for String {
    fn from(id: ContentId) -> Self {
        id.0
    }
}
