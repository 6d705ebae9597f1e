use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shelfmark_core::Role;

/// Profile of a user or librarian, mirrored from the identity provider
///
/// # Fields
///
/// * `id` - Identity-provider uid
/// * `role` - Persisted [`Role`] string (`"user"` or `"librarian"`)
/// * `display_name` - Full name, may be empty
/// * `identifier` - Department/admission number or staff id
/// * `email` - Account email
/// * `created_at` - When the profile was first stored
///
/// # Examples
///
/// ```
/// use shelfmark_storage::models::UserProfile;
/// use shelfmark_core::Role;
///
/// let profile = UserProfile::new("alice", Role::User, "", "alice@uni.example");
/// assert_eq!(profile.resolved_name().as_deref(), Some("alice@uni.example"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserProfile {
    /// Identity-provider uid
    pub id: String,

    /// Account role
    ///
    /// Use `get_role()` to convert to the `Role` enum.
    pub role: String,

    /// Full name
    pub display_name: String,

    /// Department/admission or staff identifier
    pub identifier: Option<String>,

    /// Account email
    pub email: String,

    /// Record creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Create a new profile
    pub fn new(
        id: impl Into<String>,
        role: Role,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: role.as_str().to_string(),
            display_name: display_name.into(),
            identifier: None,
            email: email.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the department/admission or staff identifier
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Get the role as an enum
    pub fn get_role(&self) -> Option<Role> {
        self.role.parse().ok()
    }

    /// Check if this profile belongs to a librarian
    pub fn is_librarian(&self) -> bool {
        self.get_role() == Some(Role::Librarian)
    }

    /// Name to denormalize into records: display name, else email
    pub fn resolved_name(&self) -> Option<String> {
        [&self.display_name, &self.email]
            .into_iter()
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_name_prefers_display_name() {
        let profile = UserProfile::new("u1", Role::User, "Alice Doe", "alice@uni.example");
        assert_eq!(profile.resolved_name().as_deref(), Some("Alice Doe"));
    }

    #[test]
    fn test_resolved_name_empty() {
        let profile = UserProfile::new("u1", Role::User, " ", "");
        assert!(profile.resolved_name().is_none());
    }

    #[test]
    fn test_roles() {
        let librarian = UserProfile::new("l1", Role::Librarian, "Bob", "bob@uni.example")
            .with_identifier("STAFF-7");
        assert!(librarian.is_librarian());
        assert_eq!(librarian.identifier.as_deref(), Some("STAFF-7"));

        let user = UserProfile::new("u1", Role::User, "Alice", "");
        assert!(!user.is_librarian());
    }
}
