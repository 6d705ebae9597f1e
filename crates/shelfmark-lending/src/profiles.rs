#![allow(async_fn_in_trait)]

use crate::error::LendingResult;
use shelfmark_storage::repositories::{ProfileRepository, SqliteProfileRepository};
use shelfmark_storage::UserProfile;

/// Read-only access to user profiles owned by the identity subsystem
///
/// Lending operations call this on every transition; implementations must
/// not cache.
pub trait ProfileResolver: Send + Sync {
    /// Look up a profile, returning `None` when it does not exist
    async fn get_profile(&self, user_id: &str) -> LendingResult<Option<UserProfile>>;
}

impl ProfileResolver for SqliteProfileRepository {
    async fn get_profile(&self, user_id: &str) -> LendingResult<Option<UserProfile>> {
        Ok(self.find_by_id(user_id).await?)
    }
}
