use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a document's bytes live.
///
/// A `Location` is opaque outside the content store that produced it. For the
/// filesystem store it is an absolute path; other backends use their own
/// schemes. Once registered, the location registry owns it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location(String);

impl Location {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The final `/`-separated segment, i.e. the stored filename for every
    /// backend shipped with docstore.
    pub fn file_name(&self) -> &str {
        self.0
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.0.as_str())
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({:?})", self.0)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Location {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
