#![allow(async_fn_in_trait)]

use crate::error::StorageResult;
use crate::models::UserProfile;
use sqlx::SqlitePool;

/// Repository trait for profiles mirrored from the identity provider
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait ProfileRepository: Send + Sync {
    /// Find a profile by its identity-provider uid
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<UserProfile>>;

    /// Insert or replace a profile
    ///
    /// The original `created_at` is kept when the profile already exists.
    async fn upsert(&self, profile: &UserProfile) -> StorageResult<()>;
}

/// SQLite implementation of ProfileRepository
pub struct SqliteProfileRepository {
    pool: SqlitePool,
}

impl SqliteProfileRepository {
    /// Create a new SQLite profile repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ProfileRepository for SqliteProfileRepository {
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, role, display_name, identifier, email, created_at
            FROM profiles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn upsert(&self, profile: &UserProfile) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (id, role, display_name, identifier, email, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                role = excluded.role,
                display_name = excluded.display_name,
                identifier = excluded.identifier,
                email = excluded.email
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.role)
        .bind(&profile.display_name)
        .bind(&profile.identifier)
        .bind(&profile.email)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
