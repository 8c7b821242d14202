use std::fmt;

/// Exact text that is digested or signed. Opaque to the pipeline: a single
/// changed byte changes the digest.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CanonicalMessage(String);

impl CanonicalMessage {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl From<&str> for CanonicalMessage {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CanonicalMessage {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for CanonicalMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CanonicalMessage(len={})", self.0.len())
    }
}
