//! Notice texts shown to borrowers when one of their requests changes status
//!
//! # Usage
//!
//! ```
//! use shelfmark_core::TransactionStatus;
//! use shelfmark_lending::messages::NoticeMessages;
//!
//! let text = NoticeMessages::for_status(TransactionStatus::Approved, "Compilers");
//! assert_eq!(text.as_deref(), Some("Your request for \"Compilers\" was approved!"));
//! ```

use shelfmark_core::TransactionStatus;

/// Notice templates keyed by the new status
///
/// `{title}` is replaced with the material title.
pub struct NoticeMessages;

impl NoticeMessages {
    /// Request approved by a librarian
    pub const APPROVED: &'static str = "Your request for \"{title}\" was approved!";

    /// Request rejected by a librarian
    pub const REJECTED: &'static str = "Your request for \"{title}\" was rejected.";

    /// Material handed over
    pub const BORROWED: &'static str = "You have borrowed \"{title}\".";

    /// Material checked back in
    pub const RETURNED: &'static str = "You returned \"{title}\".";

    /// Template for a status, if borrowers are notified about it
    pub fn template(status: TransactionStatus) -> Option<&'static str> {
        match status {
            TransactionStatus::Approved => Some(Self::APPROVED),
            TransactionStatus::Rejected => Some(Self::REJECTED),
            TransactionStatus::Borrowed => Some(Self::BORROWED),
            TransactionStatus::Returned => Some(Self::RETURNED),
            TransactionStatus::Pending => None,
        }
    }

    /// Rendered notice for a status and material title
    pub fn for_status(status: TransactionStatus, title: &str) -> Option<String> {
        Self::template(status).map(|template| template.replace("{title}", title))
    }
}
