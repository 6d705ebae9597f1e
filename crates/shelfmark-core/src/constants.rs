//! Shared constants for the Shelfmark lending tracker.
//!
//! Limits and fallback labels used by both the storage layer and the lending
//! services. Keeping them here ensures the repositories and the services agree
//! on defaults without depending on each other.
//!
//! # Usage
//!
//! ```
//! use shelfmark_core::constants::*;
//!
//! assert_eq!(DEFAULT_PREFIX_LIMIT, 8);
//! assert!(MIN_PUBLICATION_YEAR < 2000);
//! ```

// ============================================================================
// Search limits
// ============================================================================

/// Default number of suggestions returned by search-as-you-type.
pub const DEFAULT_PREFIX_LIMIT: usize = 8;

/// Default number of rows fetched by the filtered catalog search.
///
/// The limit is applied by the store before the free-text pass, so fewer
/// results may come back when a query is supplied.
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Default number of materials shown on the librarian dashboard.
pub const DEFAULT_RECENT_LIMIT: usize = 20;

// ============================================================================
// Audit log
// ============================================================================

/// Entries per page on the audit log view.
pub const DEFAULT_AUDIT_PAGE_SIZE: usize = 15;

// ============================================================================
// Material validation
// ============================================================================

/// Earliest accepted publication year.
///
/// The upper bound is the current calendar year, evaluated at validation time.
pub const MIN_PUBLICATION_YEAR: i32 = 1600;

// ============================================================================
// Fallback labels for denormalized fields
// ============================================================================

/// Stored when no display name can be resolved for a borrower.
pub const UNKNOWN_USER: &str = "Unknown User";

/// Stored when no display name can be resolved for the acting librarian.
pub const UNKNOWN_LIBRARIAN: &str = "Unknown Librarian";

/// Stored when a material snapshot has an empty title.
pub const UNTITLED_MATERIAL: &str = "Untitled Material";

/// Comment recorded when an overdue loan is closed without a librarian note.
pub const OVERDUE_RETURN_COMMENT: &str = "Marked as returned (overdue).";

// ============================================================================
// Live feed
// ============================================================================

/// Buffered events per subscriber before older events are dropped.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_are_positive() {
        assert!(DEFAULT_PREFIX_LIMIT > 0);
        assert!(DEFAULT_SEARCH_LIMIT > 0);
        assert!(DEFAULT_RECENT_LIMIT > 0);
        assert!(DEFAULT_AUDIT_PAGE_SIZE > 0);
        assert!(DEFAULT_FEED_CAPACITY > 0);
    }

    #[test]
    fn test_fallback_labels_are_non_empty() {
        for label in [
            UNKNOWN_USER,
            UNKNOWN_LIBRARIAN,
            UNTITLED_MATERIAL,
            OVERDUE_RETURN_COMMENT,
        ] {
            assert!(!label.trim().is_empty());
        }
    }
}
