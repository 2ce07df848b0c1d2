//! Opaque asset handles
//!
//! The core never loads or inspects assets. Icons and video clips are carried
//! around as keys that the host asset provider resolves.

use serde::{Deserialize, Serialize};

/// Opaque reference to an icon image (prize icon or cover icon)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(pub String);

impl IconId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IconId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for IconId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a video clip played during a celebration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub String);

impl ClipId {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ClipId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl std::fmt::Display for ClipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_id_conversions() {
        let id = IconId::new("cover_cat");
        assert_eq!(id.as_str(), "cover_cat");
        assert_eq!(IconId::from("cover_cat"), id);
        assert_eq!(id.to_string(), "cover_cat");
    }
}
