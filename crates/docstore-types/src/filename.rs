use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A client-supplied filename reduced to a single path component.
///
/// Directory parts are dropped (both `/` and `\` count as separators), so a
/// `Filename` can be joined onto a storage directory without escaping it.
/// Control characters are refused so the name always fits in a response
/// header.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Filename(String);

impl Filename {
    pub fn new(raw: &str) -> Result<Self, TypeError> {
        let name = raw.rsplit(['/', '\\']).next().unwrap_or(raw);
        let reason = if name.is_empty() {
            Some("empty name")
        } else if name == "." || name == ".." {
            Some("relative directory name")
        } else if name.chars().any(char::is_control) {
            Some("contains control character")
        } else {
            None
        };
        match reason {
            Some(reason) => Err(TypeError::InvalidFilename {
                name: raw.to_string(),
                reason,
            }),
            None => Ok(Self(name.to_string())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Filename({:?})", self.0)
    }
}

impl fmt::Display for Filename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Filename {
    type Error = TypeError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::new(&raw)
    }
}

impl From<Filename> for String {
    fn from(name: Filename) -> Self {
        name.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn plain_name_is_kept() {
        assert_eq!(Filename::new("a.txt").unwrap().as_str(), "a.txt");
    }

    #[test]
    fn directories_are_stripped() {
        assert_eq!(Filename::new("../../etc/passwd").unwrap().as_str(), "passwd");
        assert_eq!(Filename::new("C:\\Users\\me\\cv.pdf").unwrap().as_str(), "cv.pdf");
        assert_eq!(Filename::new("/abs/path/img.png").unwrap().as_str(), "img.png");
    }

    #[test]
    fn unusable_names_are_rejected() {
        for bad in ["", "dir/", "..", ".", "a/..", "nul\0byte"] {
            assert!(
                matches!(Filename::new(bad), Err(TypeError::InvalidFilename { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn control_characters_are_rejected() {
        for bad in ["a\nb.txt", "tab\there", "cr\r.txt", "del\u{7f}", "c1\u{85}.pdf"] {
            let err = Filename::new(bad).unwrap_err();
            assert!(err.to_string().contains("control character"), "{bad:?}: {err}");
        }
        assert_eq!(Filename::new("résumé 2024.pdf").unwrap().as_str(), "résumé 2024.pdf");
    }

    #[test]
    fn serde_validates() {
        let ok: Filename = serde_json::from_str("\"x/y.txt\"").unwrap();
        assert_eq!(ok.as_str(), "y.txt");
        assert!(serde_json::from_str::<Filename>("\"..\"").is_err());
    }

    proptest! {
        #[test]
        fn accepted_names_never_contain_separators(raw in ".*") {
            if let Ok(name) = Filename::new(&raw) {
                prop_assert!(!name.as_str().contains('/'));
                prop_assert!(!name.as_str().contains('\\'));
                prop_assert!(name.as_str() != "..");
                prop_assert!(!name.as_str().is_empty());
                prop_assert!(!name.as_str().chars().any(char::is_control));
            }
        }
    }
}
