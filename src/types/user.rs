//! User identity and roster entries

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable per-user identifier; also the storage partition name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of this user's partition in the key-value store
    pub fn storage_key(&self) -> String {
        format!("healthLogs_{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One member of the household roster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    /// Display label, e.g. "我"
    pub label: String,
}

impl UserProfile {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: UserId::from(id),
            label: label.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_key() {
        assert_eq!(UserId::from("Me").storage_key(), "healthLogs_Me");
    }

    #[test]
    fn test_user_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&UserId::from("Wife")).unwrap();
        assert_eq!(json, "\"Wife\"");
    }
}
