//! Caller identity and material snapshots passed into lending operations.

use serde::{Deserialize, Serialize};
use shelfmark_core::constants::UNTITLED_MATERIAL;
use shelfmark_storage::Material;

/// Authenticated caller, as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Identity-provider uid
    pub user_id: String,

    /// Display name from the sign-in session, if any
    pub display_name: Option<String>,

    /// Sign-in email, if any
    pub email: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// First non-blank of display name and email
    pub fn best_name(&self) -> Option<String> {
        [&self.display_name, &self.email]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Material fields copied into a transaction at request time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSnapshot {
    pub id: String,
    pub title: String,
    pub author: String,
    pub material_type: String,
}

impl MaterialSnapshot {
    /// Title to store, falling back to a placeholder when blank
    pub fn title_or_default(&self) -> String {
        let title = self.title.trim();
        if title.is_empty() {
            UNTITLED_MATERIAL.to_string()
        } else {
            title.to_string()
        }
    }
}

impl From<&Material> for MaterialSnapshot {
    fn from(material: &Material) -> Self {
        Self {
            id: material.id.clone(),
            title: material.title.clone(),
            author: material.author.clone(),
            material_type: material.material_type.clone(),
        }
    }
}
