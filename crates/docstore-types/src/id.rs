use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Identifier of a logical document.
///
/// Identifiers are chosen by the caller, never generated by docstore. Through
/// the upload path an identifier is write-once: once registered it keeps
/// pointing at the same content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId(i64);

impl DocumentId {
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Debug for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DocumentId({})", self.0)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = TypeError;

    /// Parse a base-10 signed integer. Surrounding whitespace is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| TypeError::InvalidId(s.to_string()))
    }
}

impl From<i64> for DocumentId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl From<DocumentId> for i64 {
    fn from(id: DocumentId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_decimal() {
        assert_eq!("42".parse::<DocumentId>().unwrap(), DocumentId::new(42));
        assert_eq!("-7".parse::<DocumentId>().unwrap(), DocumentId::new(-7));
        assert_eq!(
            i64::MAX.to_string().parse::<DocumentId>().unwrap().get(),
            i64::MAX
        );
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "abc", "1.5", " 1", "1 ", "99999999999999999999"] {
            assert!(
                matches!(bad.parse::<DocumentId>(), Err(TypeError::InvalidId(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn display_is_plain_integer() {
        assert_eq!(DocumentId::new(1).to_string(), "1");
        assert_eq!(format!("{:?}", DocumentId::new(1)), "DocumentId(1)");
    }

    #[test]
    fn serde_is_transparent_integer() {
        let json = serde_json::to_string(&DocumentId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: DocumentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DocumentId::new(9));
    }
}
