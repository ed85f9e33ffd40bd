//! User-entered chat text.

/// A trimmed, non-empty message typed by the shopper.
///
/// Blank input never becomes an `Utterance`, so anything that accepts one
/// can assume there is something to send.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utterance(String);

impl Utterance {
    /// Trim the input and reject it if nothing remains.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// The trimmed text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Utterance {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Utterance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
