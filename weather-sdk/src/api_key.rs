use std::fmt;

/// Provider credential. Formatting never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub const MIN_REVEAL_LEN: usize = 12;

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building the request query.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Last four characters, enough to tell keys apart in logs. Keys shorter
    /// than [`Self::MIN_REVEAL_LEN`] are masked completely.
    pub fn redacted(&self) -> String {
        if self.0.chars().count() < Self::MIN_REVEAL_LEN {
            return "****".to_string();
        }

        match self.0.char_indices().rev().nth(3) {
            Some((idx, _)) => format!("****{}", &self.0[idx..]),
            None => "****".to_string(),
        }
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.redacted()).finish()
    }
}

impl fmt::Display for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl From<&str> for ApiKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ApiKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}
