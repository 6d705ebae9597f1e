use crate::config::LendingConfig;
use crate::error::{LendingError, LendingResult};
use shelfmark_core::constants::DEFAULT_RECENT_LIMIT;
use shelfmark_storage::repositories::{MaterialRepository, SqliteMaterialRepository};
use shelfmark_storage::{Material, MaterialDraft, MaterialPatch, SearchQuery};
use tracing::{debug, info, warn};

/// Catalog operations used by the user and librarian screens
///
/// Thin layer over a [`MaterialRepository`] that applies the configured
/// search limits and makes view counting best-effort.
pub struct Catalog<R = SqliteMaterialRepository> {
    repo: R,
    prefix_limit: usize,
    search_limit: usize,
}

impl<R: MaterialRepository> Catalog<R> {
    pub fn new(repo: R, config: &LendingConfig) -> Self {
        Self {
            repo,
            prefix_limit: config.prefix_limit,
            search_limit: config.search_limit,
        }
    }

    /// Validate and add a material, returning its id
    pub async fn create(&self, draft: &MaterialDraft) -> LendingResult<String> {
        let id = self.repo.create(draft).await?;
        info!(material_id = %id, title = %draft.title, "Material created");
        Ok(id)
    }

    /// Apply a partial edit
    pub async fn update(&self, id: &str, patch: &MaterialPatch) -> LendingResult<()> {
        self.repo.update(id, patch).await?;
        info!(material_id = %id, "Material updated");
        Ok(())
    }

    /// Permanently remove a material
    ///
    /// Transactions keep their snapshot of the title and author.
    pub async fn delete(&self, id: &str) -> LendingResult<()> {
        self.repo.delete(id).await?;
        info!(material_id = %id, "Material deleted");
        Ok(())
    }

    /// Fetch one material, failing with `NotFound` when absent
    pub async fn get(&self, id: &str) -> LendingResult<Material> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| LendingError::not_found("Material", id))
    }

    /// Newest materials first, for the librarian dashboard
    pub async fn recent(&self, limit: Option<usize>) -> LendingResult<Vec<Material>> {
        Ok(self
            .repo
            .find_recent(limit.unwrap_or(DEFAULT_RECENT_LIMIT))
            .await?)
    }

    /// Search-as-you-type suggestions on title or author prefix
    pub async fn search_by_prefix(
        &self,
        text: &str,
        limit: Option<usize>,
    ) -> LendingResult<Vec<Material>> {
        let limit = limit.unwrap_or(self.prefix_limit);
        Ok(self.repo.search_by_prefix(text, limit).await?)
    }

    /// Start a smart search query carrying the configured limit
    pub fn query(&self, text: impl Into<String>) -> SearchQuery {
        SearchQuery::new(text).limit(self.search_limit)
    }

    /// Filtered catalog search
    ///
    /// The query's limit caps the rows fetched before the text filter runs.
    pub async fn smart_search(&self, query: &SearchQuery) -> LendingResult<Vec<Material>> {
        let results = self.repo.smart_search(query).await?;
        debug!(
            text = %query.text,
            sort = ?query.sort,
            hits = results.len(),
            "Smart search"
        );
        Ok(results)
    }

    /// Count a detail-page view
    ///
    /// Best-effort: failures are logged and never reach the caller.
    pub async fn record_view(&self, id: &str) {
        if let Err(e) = self.repo.increment_view_count(id).await {
            warn!(material_id = %id, "Failed to record material view: {}", e);
        }
    }
}
