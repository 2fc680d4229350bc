//! User model
//!
//! Users are also the artists releases are published under.

use serde::{Deserialize, Serialize};

/// A user account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database ID
    pub id: String,
    /// Unique username, used in artist page URLs
    pub username: String,
    /// Optional display name
    #[serde(default)]
    pub display_name: Option<String>,
    /// Creation timestamp
    #[serde(default)]
    pub created_at: i64,
}

impl User {
    /// Name shown next to releases
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_prefers_display_name() {
        let mut user = User {
            id: "u1".to_string(),
            username: "dj_mono".to_string(),
            display_name: None,
            created_at: 0,
        };
        assert_eq!(user.name(), "dj_mono");

        user.display_name = Some("DJ Mono".to_string());
        assert_eq!(user.name(), "DJ Mono");
    }
}
