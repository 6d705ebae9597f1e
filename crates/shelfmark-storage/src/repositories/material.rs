#![allow(async_fn_in_trait)]

use crate::error::{StorageError, StorageResult};
use crate::models::material::shadow;
use crate::models::{Material, MaterialDraft, MaterialPatch, SearchQuery};
use crate::validation::{validate_draft, validate_patch};
use chrono::Utc;
use shelfmark_core::SearchSort;
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

const MATERIAL_COLUMNS: &str = "id, title, author, title_lower, author_lower, \
     publication_year, material_type, abstract_text, keywords, \
     file_url, file_name, view_count, created_at, updated_at";

/// Repository trait for Material entity operations
///
/// Covers catalog CRUD, the two search paths used by the UI, and the view
/// counter.
///
/// # Implementation Note
///
/// This trait uses native async trait methods (Edition 2024 feature),
/// eliminating the need for the async-trait crate while maintaining
/// full async/await support in trait methods.
pub trait MaterialRepository: Send + Sync {
    /// Validate and insert a new material, returning its generated id
    async fn create(&self, draft: &MaterialDraft) -> StorageResult<String>;

    /// Find a material by its ID
    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Material>>;

    /// Validate and apply a partial update
    async fn update(&self, id: &str, patch: &MaterialPatch) -> StorageResult<()>;

    /// Permanently delete a material
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Most recently created materials
    async fn find_recent(&self, limit: usize) -> StorageResult<Vec<Material>>;

    /// Case-insensitive prefix match on title or author
    ///
    /// Title and author are queried independently; results are merged with
    /// title hits first, de-duplicated by id, and truncated to `limit`.
    async fn search_by_prefix(&self, prefix: &str, limit: usize) -> StorageResult<Vec<Material>>;

    /// Filtered, sorted catalog search with an in-memory free-text pass
    async fn smart_search(&self, query: &SearchQuery) -> StorageResult<Vec<Material>>;

    /// Atomically add one to the view counter
    async fn increment_view_count(&self, id: &str) -> StorageResult<()>;
}

/// SQLite implementation of MaterialRepository
pub struct SqliteMaterialRepository {
    pool: SqlitePool,
}

impl SqliteMaterialRepository {
    /// Create a new SQLite material repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_by_shadow_prefix(
        &self,
        column: &str,
        prefix: &str,
        limit: i64,
    ) -> StorageResult<Vec<Material>> {
        // `column` is one of the two shadow column names, never user input
        let sql = format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials \
             WHERE substr({column}, 1, ?) = ? \
             ORDER BY {column} ASC \
             LIMIT ?"
        );

        let materials = sqlx::query_as::<_, Material>(&sql)
            .bind(to_sql_limit(prefix.chars().count()))
            .bind(prefix)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(materials)
    }

    /// First stage of the smart search: equality filters, order and limit in SQL
    async fn fetch_filtered(&self, query: &SearchQuery) -> StorageResult<Vec<Material>> {
        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {MATERIAL_COLUMNS} FROM materials WHERE 1 = 1"));

        if let Some(material_type) = query.material_type {
            builder
                .push(" AND material_type = ")
                .push_bind(material_type.as_str());
        }
        if let Some(year) = query.year {
            builder.push(" AND publication_year = ").push_bind(year);
        }

        builder.push(match query.sort {
            SearchSort::Popular => " ORDER BY view_count DESC, created_at DESC",
            SearchSort::Recent => " ORDER BY created_at DESC",
            SearchSort::Title => " ORDER BY title ASC",
        });
        builder.push(" LIMIT ").push_bind(to_sql_limit(query.limit));

        let materials = builder
            .build_query_as::<Material>()
            .fetch_all(&self.pool)
            .await?;

        Ok(materials)
    }
}

impl MaterialRepository for SqliteMaterialRepository {
    async fn create(&self, draft: &MaterialDraft) -> StorageResult<String> {
        let draft = validate_draft(draft.clone())?;
        let material = Material::from_draft(Uuid::new_v4().to_string(), &draft);

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, title, author, title_lower, author_lower,
                publication_year, material_type, abstract_text, keywords,
                file_url, file_name, view_count, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&material.id)
        .bind(&material.title)
        .bind(&material.author)
        .bind(&material.title_lower)
        .bind(&material.author_lower)
        .bind(material.publication_year)
        .bind(&material.material_type)
        .bind(&material.abstract_text)
        .bind(&material.keywords)
        .bind(&material.file_url)
        .bind(&material.file_name)
        .bind(material.view_count)
        .bind(material.created_at)
        .bind(material.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(material.id)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Material>> {
        let material = sqlx::query_as::<_, Material>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(material)
    }

    async fn update(&self, id: &str, patch: &MaterialPatch) -> StorageResult<()> {
        let patch = validate_patch(patch.clone())?;
        let title = patch.title.as_deref().map(str::trim);
        let author = patch.author.as_deref().map(str::trim);

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET title = COALESCE(?, title),
                title_lower = COALESCE(?, title_lower),
                author = COALESCE(?, author),
                author_lower = COALESCE(?, author_lower),
                publication_year = COALESCE(?, publication_year),
                material_type = COALESCE(?, material_type),
                abstract_text = COALESCE(?, abstract_text),
                keywords = COALESCE(?, keywords),
                file_url = COALESCE(?, file_url),
                file_name = COALESCE(?, file_name),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(title)
        .bind(title.map(shadow))
        .bind(author)
        .bind(author.map(shadow))
        .bind(patch.publication_year)
        .bind(patch.material_type.map(|t| t.as_str()))
        .bind(patch.abstract_text.as_deref())
        .bind(patch.keywords.as_ref().map(Json))
        .bind(patch.file.as_ref().map(|f| f.url.as_str()))
        .bind(patch.file.as_ref().map(|f| f.name.as_str()))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Material", id));
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Material", id));
        }

        Ok(())
    }

    async fn find_recent(&self, limit: usize) -> StorageResult<Vec<Material>> {
        let materials = sqlx::query_as::<_, Material>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM materials ORDER BY created_at DESC LIMIT ?"
        ))
        .bind(to_sql_limit(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(materials)
    }

    async fn search_by_prefix(&self, prefix: &str, limit: usize) -> StorageResult<Vec<Material>> {
        let prefix = prefix.to_lowercase();
        if prefix.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let sql_limit = to_sql_limit(limit);
        let by_title = self
            .find_by_shadow_prefix("title_lower", &prefix, sql_limit)
            .await?;
        let by_author = self
            .find_by_shadow_prefix("author_lower", &prefix, sql_limit)
            .await?;

        let mut seen = HashSet::new();
        let merged = by_title
            .into_iter()
            .chain(by_author)
            .filter(|m| seen.insert(m.id.clone()))
            .take(limit)
            .collect();

        Ok(merged)
    }

    async fn smart_search(&self, query: &SearchQuery) -> StorageResult<Vec<Material>> {
        let candidates = self.fetch_filtered(query).await?;

        // Second stage runs after the store applied the limit
        let needle = query.normalized_text();
        if needle.is_empty() {
            return Ok(candidates);
        }

        Ok(candidates
            .into_iter()
            .filter(|m| m.matches_text(&needle))
            .collect())
    }

    async fn increment_view_count(&self, id: &str) -> StorageResult<()> {
        let result = sqlx::query(
            "UPDATE materials SET view_count = view_count + 1, updated_at = ? WHERE id = ?",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found("Material", id));
        }

        Ok(())
    }
}

fn to_sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}
