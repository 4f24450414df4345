//! Queue references

/// Final `/` segment of a queue locator.
///
/// Bare names come back unchanged, so the function is idempotent.
pub fn short_name(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}

/// A resolved queue URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueRef {
    url: String,
}

impl QueueRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.url)
    }
}

/// Configured queue override, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueTarget {
    /// Already a full queue URL
    Url(String),
    /// Bare queue name, resolved through the queue service
    Name(String),
}

impl QueueTarget {
    /// Parse a configuration value. Blank values mean "not configured".
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if value.starts_with("https://") || value.starts_with("http://") {
            Some(Self::Url(value.to_string()))
        } else {
            Some(Self::Name(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(v) | Self::Name(v) => v,
        }
    }
}
