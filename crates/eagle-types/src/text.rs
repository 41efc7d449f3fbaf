//! Fixed-capacity text values.

use std::fmt;
use std::ops::Deref;

/// Maximum size in bytes of a text field.
///
/// The service declares character columns as at most 256 bytes wide; longer
/// values are truncated to this limit on conversion.
pub const TEXT_CAPACITY: usize = 256;

/// A UTF-8 string holding at most [`TEXT_CAPACITY`] bytes.
///
/// Construction truncates at the last character boundary that fits, so the
/// stored value is always valid UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundedText(String);

impl BoundedText {
    /// Create bounded text, truncating `s` to the capacity.
    #[must_use]
    pub fn new(s: &str) -> Self {
        Self(truncate_to_boundary(s, TEXT_CAPACITY).to_owned())
    }

    /// Create bounded text from an owned string, truncating in place.
    #[must_use]
    pub fn from_string(mut s: String) -> Self {
        let len = truncate_to_boundary(&s, TEXT_CAPACITY).len();
        s.truncate(len);
        Self(s)
    }

    /// Get the text as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the value and return the inner string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl Deref for BoundedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BoundedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BoundedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BoundedText {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BoundedText {
    fn from(s: String) -> Self {
        Self::from_string(s)
    }
}

impl PartialEq<str> for BoundedText {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BoundedText {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
