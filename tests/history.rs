//! Run history persistence

mod common;

use common::{lease_with, office_lease};
use leasebook::core::RunStatus;
use leasebook::execution::run_lease_model;
use leasebook::persistence::{
    create_summary, failed_summary, InMemoryPersistence, PersistenceBackend,
};

async fn exercise_backend(store: &dyn PersistenceBackend) {
    let outcome = run_lease_model(&office_lease()).unwrap();
    let model = outcome.as_recognised().unwrap();
    let qa = model.run_qa();
    let first = create_summary(&outcome, Some(&qa));
    assert_eq!(first.status, RunStatus::Completed);
    assert_eq!(first.term_months, 36);
    assert_eq!(first.initial_liability, model.liability);
    store.save_run(&first).await.unwrap();

    let mut exempt_config = lease_with("exemptions:\n  low_value: true\n");
    exempt_config.name = "Printer".to_string();
    exempt_config.payment = 25.0;
    let exempt = create_summary(&run_lease_model(&exempt_config).unwrap(), None);
    store.save_run(&exempt).await.unwrap();

    let mut failed =
        failed_summary("Head Office", "Residual value must be less than right-of-use asset value");
    failed.calculated_at = first.calculated_at + chrono::Duration::seconds(1);
    store.save_run(&failed).await.unwrap();

    let loaded = store.load_run(first.run_id).await.unwrap().expect("saved run");
    assert_eq!(loaded.lease_name, "Head Office");
    assert_eq!(loaded.status, RunStatus::Completed);
    assert_eq!(loaded.total_payments, first.total_payments);

    let leases = store.list_leases().await.unwrap();
    assert_eq!(leases, vec!["Head Office".to_string(), "Printer".to_string()]);

    let runs = store.list_runs("Head Office").await.unwrap();
    assert_eq!(runs.len(), 2);
    // Most recent first
    assert_eq!(runs[0].status, RunStatus::Failed);
    assert!(runs[0].error.as_deref().unwrap().contains("Residual"));

    assert_eq!(store.list_runs("Printer").await.unwrap()[0].status, RunStatus::Exempt);
    assert!(store.list_runs("Unknown").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_in_memory_history() {
    let store = InMemoryPersistence::new();
    exercise_backend(&store).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_history() {
    use leasebook::persistence::SqliteRunStore;

    let store = SqliteRunStore::new(":memory:").await.unwrap();
    exercise_backend(&store).await;
}

#[cfg(feature = "sqlite")]
#[tokio::test]
async fn test_sqlite_history_persists_to_file() {
    use leasebook::persistence::SqliteRunStore;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("runs.db");

    let run = failed_summary("Warehouse", "boom");
    {
        let store = SqliteRunStore::open(&path).await.unwrap();
        store.save_run(&run).await.unwrap();
    }

    let reopened = SqliteRunStore::open(&path).await.unwrap();
    let loaded = reopened.load_run(run.run_id).await.unwrap().unwrap();
    assert_eq!(loaded.status, RunStatus::Failed);
    assert_eq!(loaded.error.as_deref(), Some("boom"));
}
