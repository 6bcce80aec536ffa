use serde::{Deserialize, Serialize};

/// The serialized game state exactly as the service returned it.
///
/// Never parsed on this side: it is stored, compared and sent back byte for
/// byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpaqueState(String);

impl OpaqueState {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for OpaqueState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for OpaqueState {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One rendered frame: rows of fixed-width text separated by `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame(String);

impl Frame {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Rows in order. A trailing `\r` is stripped from each row.
    pub fn rows(&self) -> impl Iterator<Item = &str> {
        self.0.split('\n').map(|row| row.strip_suffix('\r').unwrap_or(row))
    }
}

impl From<String> for Frame {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Frame {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
