//! Shared helpers for lending integration tests.

#![allow(dead_code)]

use shelfmark_core::{Role, TransitionPolicy};
use shelfmark_lending::{Identity, LendingConfig, MaterialSnapshot, TransactionManager};
use shelfmark_storage::repositories::{ProfileRepository, SqliteProfileRepository};
use shelfmark_storage::{Database, UserProfile};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a test-writer subscriber once per test binary
///
/// Honors `RUST_LOG`; defaults to debug output for the lending crate.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shelfmark_lending=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

pub async fn setup(policy: TransitionPolicy) -> (Database, TransactionManager) {
    init_tracing();
    let db = Database::in_memory().await.unwrap();
    let manager =
        TransactionManager::sqlite(db.pool().clone(), &LendingConfig::default().policy(policy));
    (db, manager)
}

pub async fn seed_profile(db: &Database, id: &str, role: Role, name: &str) {
    SqliteProfileRepository::new(db.pool().clone())
        .upsert(&UserProfile::new(id, role, name, format!("{id}@uni.example")))
        .await
        .unwrap();
}

pub fn alice() -> Identity {
    Identity::new("alice").display_name("Alice")
}

pub fn librarian() -> Identity {
    Identity::new("lib-1").display_name("Bob")
}

pub fn algorithms() -> MaterialSnapshot {
    MaterialSnapshot {
        id: "M1".to_string(),
        title: "Intro to Algorithms".to_string(),
        author: "Cormen".to_string(),
        material_type: "Book".to_string(),
    }
}
