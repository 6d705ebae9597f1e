use shelfmark_core::TransitionPolicy;
use shelfmark_core::constants::{
    DEFAULT_AUDIT_PAGE_SIZE, DEFAULT_FEED_CAPACITY, DEFAULT_PREFIX_LIMIT, DEFAULT_SEARCH_LIMIT,
};

/// Lending service configuration
///
/// # Example
///
/// ```
/// use shelfmark_core::TransitionPolicy;
/// use shelfmark_lending::LendingConfig;
///
/// let config = LendingConfig::default()
///     .policy(TransitionPolicy::Permissive)
///     .audit_page_size(25);
///
/// assert_eq!(config.prefix_limit, 8);
/// assert_eq!(config.audit_page_size, 25);
/// ```
#[derive(Debug, Clone)]
pub struct LendingConfig {
    /// How status changes are checked against the lifecycle graph
    pub policy: TransitionPolicy,

    /// Maximum suggestions returned by prefix search
    pub prefix_limit: usize,

    /// Rows fetched by smart search before text filtering
    pub search_limit: usize,

    /// Audit log entries per page
    pub audit_page_size: usize,

    /// Buffered change events per feed subscriber
    pub feed_capacity: usize,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            policy: TransitionPolicy::default(),
            prefix_limit: DEFAULT_PREFIX_LIMIT,
            search_limit: DEFAULT_SEARCH_LIMIT,
            audit_page_size: DEFAULT_AUDIT_PAGE_SIZE,
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

impl LendingConfig {
    /// Set the transition policy
    pub fn policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the prefix search limit
    pub fn prefix_limit(mut self, limit: usize) -> Self {
        self.prefix_limit = limit;
        self
    }

    /// Set the smart search limit
    pub fn search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the audit page size
    pub fn audit_page_size(mut self, size: usize) -> Self {
        self.audit_page_size = size;
        self
    }

    /// Set the feed channel capacity
    ///
    /// A capacity of zero is raised to one when the channel is created.
    pub fn feed_capacity(mut self, capacity: usize) -> Self {
        self.feed_capacity = capacity;
        self
    }
}
