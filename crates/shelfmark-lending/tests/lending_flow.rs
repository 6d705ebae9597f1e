//! End-to-end loan lifecycle tests against in-memory SQLite.
//!
//! Run with: cargo test --package shelfmark-lending --test lending_flow

mod common;

use chrono::Utc;
use common::{algorithms, alice, librarian, seed_profile, setup};
use shelfmark_core::time::parse_due_date;
use shelfmark_core::{AuditAction, Role, TransactionStatus, TransitionPolicy};
use rstest::rstest;
use shelfmark_lending::{
    AuditFilter, Identity, LendingError, ProfileResolver, Reports, TransitionExtra,
};
use shelfmark_storage::repositories::{ProfileRepository, SqliteTransactionRepository};
use shelfmark_storage::{Database, UserProfile};

#[tokio::test]
async fn test_full_loan_scenario() {
    let (db, manager) = setup(TransitionPolicy::Strict).await;
    let reports = Reports::new(SqliteTransactionRepository::new(db.pool().clone()));
    let lib = librarian();

    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    let tx = manager.get(&id).await.unwrap();
    assert_eq!(tx.get_status().unwrap(), TransactionStatus::Pending);
    assert!(tx.borrow_date.is_none() && tx.due_date.is_none() && tx.return_date.is_none());

    let approved = manager
        .transition(
            &id,
            TransactionStatus::Approved,
            TransitionExtra::default().comment("ok"),
            &lib,
        )
        .await
        .unwrap();
    assert_eq!(approved.get_status().unwrap(), TransactionStatus::Approved);
    let logs = manager.audit().get_all_logs().await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "approved");
    assert_eq!(logs[0].comment, "ok");
    assert_eq!(logs[0].librarian_name, "Bob");

    let before_borrow = Utc::now();
    let borrowed = manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2025-12-01"),
            &lib,
        )
        .await
        .unwrap();
    assert_eq!(borrowed.get_status().unwrap(), TransactionStatus::Borrowed);
    assert!(borrowed.borrow_date.unwrap() >= before_borrow);
    assert_eq!(borrowed.due_date, Some(parse_due_date("2025-12-01").unwrap()));

    let report_day = parse_due_date("2025-12-15").unwrap();
    let overdue = reports.overdue(report_day).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].transaction.id, id);
    assert_eq!(overdue[0].days_overdue, 14);

    let before_return = Utc::now();
    let returned = manager
        .transition(&id, TransactionStatus::Returned, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    assert_eq!(returned.get_status().unwrap(), TransactionStatus::Returned);
    assert!(returned.return_date.unwrap() >= before_return);
    assert!(reports.overdue(report_day).await.unwrap().is_empty());

    let logs = manager.audit().get_all_logs().await.unwrap();
    let actions: Vec<_> = logs.iter().map(|l| l.action.as_str()).collect();
    assert_eq!(actions, vec!["returned", "borrowed", "approved"]);
}

#[tokio::test]
async fn test_second_request_is_duplicate() {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    manager.request_loan(&alice(), &algorithms()).await.unwrap();

    let err = manager
        .request_loan(&alice(), &algorithms())
        .await
        .unwrap_err();
    assert!(matches!(err, LendingError::DuplicateRequest { .. }));
    assert_eq!(manager.list_for_user("alice").await.unwrap().len(), 1);

    let bob = Identity::new("bob");
    assert!(manager.request_loan(&bob, &algorithms()).await.is_ok());
}

#[tokio::test]
async fn test_duplicate_check_ignores_approved_and_closed() {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    let lib = librarian();

    let first = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    manager
        .transition(&first, TransactionStatus::Approved, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    let second = manager.request_loan(&alice(), &algorithms()).await.unwrap();

    manager
        .transition(&second, TransactionStatus::Rejected, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    manager
        .transition(
            &first,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2030-01-31"),
            &lib,
        )
        .await
        .unwrap();
    assert!(matches!(
        manager.request_loan(&alice(), &algorithms()).await,
        Err(LendingError::DuplicateRequest { .. })
    ));

    manager
        .transition(&first, TransactionStatus::Returned, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    assert!(manager.request_loan(&alice(), &algorithms()).await.is_ok());
}

#[rstest]
#[case::absent(TransitionExtra::default())]
#[case::empty(TransitionExtra::default().due_date(""))]
#[case::blank(TransitionExtra::default().due_date("   "))]
#[tokio::test]
async fn test_borrow_without_due_date_leaves_record_unchanged(#[case] extra: TransitionExtra) {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    let before = manager.get(&id).await.unwrap();

    let err = manager
        .transition(&id, TransactionStatus::Borrowed, extra, &librarian())
        .await
        .unwrap_err();

    assert!(matches!(err, LendingError::MissingDueDate));
    assert_eq!(manager.get(&id).await.unwrap(), before);
    assert!(manager.audit().get_all_logs().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_is_trimmed_and_blank_keeps_previous() {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    let lib = librarian();
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();

    let approved = manager
        .transition(
            &id,
            TransactionStatus::Approved,
            TransitionExtra::default().comment("  shelf 3B \n"),
            &lib,
        )
        .await
        .unwrap();
    assert_eq!(approved.comment.as_deref(), Some("shelf 3B"));

    let borrowed = manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().comment("   ").due_date("2025-12-01"),
            &lib,
        )
        .await
        .unwrap();
    assert_eq!(borrowed.comment.as_deref(), Some("shelf 3B"));

    let logs = manager.audit().get_all_logs().await.unwrap();
    assert_eq!(logs[0].comment, "");
    assert_eq!(logs[1].comment, "shelf 3B");
}

#[tokio::test]
async fn test_strict_policy_blocks_backward_transition() {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    let lib = librarian();
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();

    let err = manager
        .transition(&id, TransactionStatus::Returned, TransitionExtra::default(), &lib)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LendingError::InvalidTransition {
            from: TransactionStatus::Pending,
            to: TransactionStatus::Returned
        }
    ));

    manager
        .transition(&id, TransactionStatus::Approved, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2030-01-31"),
            &lib,
        )
        .await
        .unwrap();
    manager
        .transition(&id, TransactionStatus::Returned, TransitionExtra::default(), &lib)
        .await
        .unwrap();

    let err = manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2030-02-28"),
            &lib,
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LendingError::InvalidTransition {
            from: TransactionStatus::Returned,
            to: TransactionStatus::Borrowed
        }
    ));
    assert_eq!(manager.audit().get_all_logs().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_permissive_policy_allows_backward_transition() {
    let (_db, manager) = setup(TransitionPolicy::Permissive).await;
    let lib = librarian();
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();

    manager
        .transition(&id, TransactionStatus::Returned, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    let reborrowed = manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2030-02-28"),
            &lib,
        )
        .await
        .unwrap();

    assert_eq!(reborrowed.get_status().unwrap(), TransactionStatus::Borrowed);
    assert!(reborrowed.return_date.is_some());

    assert!(matches!(
        manager
            .transition(&id, TransactionStatus::Pending, TransitionExtra::default(), &lib)
            .await,
        Err(LendingError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_audit_failure_does_not_roll_back_transition() {
    let (db, manager) = setup(TransitionPolicy::Strict).await;
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();

    sqlx::query("DROP TABLE audit_logs")
        .execute(db.pool())
        .await
        .unwrap();

    let approved = manager
        .transition(
            &id,
            TransactionStatus::Approved,
            TransitionExtra::default(),
            &librarian(),
        )
        .await
        .unwrap();

    assert_eq!(approved.get_status().unwrap(), TransactionStatus::Approved);
    assert_eq!(
        manager.get(&id).await.unwrap().get_status().unwrap(),
        TransactionStatus::Approved
    );
    assert!(matches!(
        manager.audit().get_all_logs().await,
        Err(LendingError::Persistence(_))
    ));
}

#[tokio::test]
async fn test_transition_refreshes_denormalized_names() {
    let (db, manager) = setup(TransitionPolicy::Strict).await;
    seed_profile(&db, "alice", Role::User, "Alice").await;
    seed_profile(&db, "lib-1", Role::Librarian, "Bob Librarian").await;

    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    assert_eq!(manager.get(&id).await.unwrap().user_name, "Alice");

    seed_profile(&db, "alice", Role::User, "Alice Married-Name").await;
    let approved = manager
        .transition(
            &id,
            TransactionStatus::Approved,
            TransitionExtra::default(),
            &Identity::new("lib-1"),
        )
        .await
        .unwrap();

    assert_eq!(approved.user_name, "Alice Married-Name");
    assert_eq!(approved.librarian_name.as_deref(), Some("Bob Librarian"));
    let log = &manager.audit().get_all_logs().await.unwrap()[0];
    assert_eq!(log.user_name, "Alice Married-Name");
    assert_eq!(log.material_title, "Intro to Algorithms");
}

#[tokio::test]
async fn test_transition_clears_dropped_identifier() {
    let (db, manager) = setup(TransitionPolicy::Strict).await;
    let profiles = shelfmark_storage::SqliteProfileRepository::new(db.pool().clone());
    profiles
        .upsert(
            &UserProfile::new("alice", Role::User, "Alice", "alice@uni.example")
                .with_identifier("ADM-1"),
        )
        .await
        .unwrap();

    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    assert_eq!(
        manager.get(&id).await.unwrap().user_identifier.as_deref(),
        Some("ADM-1")
    );

    profiles
        .upsert(&UserProfile::new("alice", Role::User, "Alice", "alice@uni.example"))
        .await
        .unwrap();
    let approved = manager
        .transition(&id, TransactionStatus::Approved, TransitionExtra::default(), &librarian())
        .await
        .unwrap();

    assert_eq!(approved.user_identifier, None);
    assert_eq!(manager.get(&id).await.unwrap().user_identifier, None);
}

#[tokio::test]
async fn test_return_overdue_records_distinct_action() {
    let (_db, manager) = setup(TransitionPolicy::Strict).await;
    let lib = librarian();
    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    manager
        .transition(&id, TransactionStatus::Approved, TransitionExtra::default(), &lib)
        .await
        .unwrap();
    manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2025-01-01"),
            &lib,
        )
        .await
        .unwrap();

    let returned = manager.return_overdue(&id, &lib, None).await.unwrap();
    assert_eq!(returned.get_status().unwrap(), TransactionStatus::Returned);
    assert_eq!(returned.comment.as_deref(), Some("Marked as returned (overdue)."));

    let logs = manager
        .audit()
        .browse(
            &AuditFilter::default().action(AuditAction::ReturnedOverdue),
            1,
            15,
        )
        .await
        .unwrap();
    assert_eq!(logs.total_items, 1);
    assert_eq!(logs.items[0].action, "returned (overdue)");
    assert_eq!(manager.audit().logs_for_transaction(&id).await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_overdue_report_by_scanning_borrowed_only() {
    let (db, manager) = setup(TransitionPolicy::Permissive).await;
    let reports = Reports::new(SqliteTransactionRepository::new(db.pool().clone()));
    let lib = librarian();

    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    manager
        .transition(
            &id,
            TransactionStatus::Borrowed,
            TransitionExtra::default().due_date("2025-12-01T12:00:00Z"),
            &lib,
        )
        .await
        .unwrap();

    let same_instant = parse_due_date("2025-12-01T12:00:00Z").unwrap();
    assert!(reports.overdue(same_instant).await.unwrap().is_empty());

    let half_day_later = parse_due_date("2025-12-02T00:00:00Z").unwrap();
    let overdue = reports.overdue(half_day_later).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].days_overdue, 0);

    let counts = reports.status_counts(half_day_later).await.unwrap();
    assert_eq!(counts.count(TransactionStatus::Borrowed), 1);
    assert_eq!(counts.overdue, 1);
}

#[tokio::test]
async fn test_profile_resolver_seam() {
    struct FixedResolver;

    impl ProfileResolver for FixedResolver {
        async fn get_profile(
            &self,
            user_id: &str,
        ) -> shelfmark_lending::LendingResult<Option<UserProfile>> {
            Ok(Some(
                UserProfile::new(user_id, Role::User, "Directory Name", "dir@uni.example")
                    .with_identifier("DEPT-9"),
            ))
        }
    }

    let db = Database::in_memory().await.unwrap();
    let manager = shelfmark_lending::TransactionManager::new(
        SqliteTransactionRepository::new(db.pool().clone()),
        shelfmark_lending::AuditLogWriter::new(
            shelfmark_storage::SqliteAuditLogRepository::new(db.pool().clone()),
        ),
        FixedResolver,
        &shelfmark_lending::LendingConfig::default(),
    );

    let id = manager.request_loan(&alice(), &algorithms()).await.unwrap();
    let tx = manager.get(&id).await.unwrap();
    assert_eq!(tx.user_name, "Directory Name");
    assert_eq!(tx.user_identifier.as_deref(), Some("DEPT-9"));

    let stored = shelfmark_storage::SqliteProfileRepository::new(db.pool().clone())
        .find_by_id("alice")
        .await
        .unwrap();
    assert!(stored.is_none());
}
