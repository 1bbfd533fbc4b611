mod support;

use std::sync::Arc;

use anyhow::Result;
use hearthbook::autoregister::already_registered;
use hearthbook::models::{Id, RecurringExpense, Transaction};
use hearthbook::recurrence::AUTO_MEMO_PREFIX;
use hearthbook::storage::{
    CheckMarkerStore, JsonFileStorage, MemoryCheckMarker, MemoryStorage, Storage,
};
use support::{date, registrar, BrokenMarker, FailingSink};
use tempfile::TempDir;

fn expense(id: &str, amount: i64, day: u32) -> RecurringExpense {
    RecurringExpense::new_with(Id::from_string(id), id, "housing", amount, day)
}

#[tokio::test]
async fn first_run_of_the_day_registers_and_second_is_a_no_op() -> Result<()> {
    let today = date(2025, 3, 1);
    let marker = Arc::new(MemoryCheckMarker::new());
    let storage = MemoryStorage::new();
    let expenses = vec![expense("rent", 50_000, 1)];

    let first = registrar(today, marker.clone())
        .run(&expenses, &[], "alice", &storage)
        .await;
    assert_eq!(first.count(), 1);
    let tx = &first.registered[0];
    assert_eq!(tx.amount, 50_000);
    assert_eq!(tx.date, today);
    assert_eq!(tx.user_id, "alice");
    assert!(tx.is_auto_registered);
    assert_eq!(tx.fixed_expense_id, Some(Id::from_string("rent")));
    assert!(tx.memo.as_deref().unwrap_or("").starts_with(AUTO_MEMO_PREFIX));

    let existing = storage.list_transactions().await?;
    let second = registrar(today, marker.clone())
        .run(&expenses, &existing, "alice", &storage)
        .await;
    assert!(second.already_checked);
    assert_eq!(second.count(), 0);
    assert_eq!(storage.list_transactions().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn same_day_rerun_without_marker_never_duplicates() -> Result<()> {
    let today = date(2025, 3, 5);
    let storage = MemoryStorage::new();
    let expenses = vec![
        expense("rent", 500_000, 5),
        expense("phone", 60_000, 5),
        expense("gym", 40_000, 20),
    ];

    for _ in 0..3 {
        let existing = storage.list_transactions().await?;
        registrar(today, Arc::new(MemoryCheckMarker::new()))
            .run(&expenses, &existing, "alice", &storage)
            .await;
    }

    let stored = storage.list_transactions().await?;
    assert_eq!(stored.len(), 2);
    for e in &expenses[..2] {
        let hits = stored
            .iter()
            .filter(|tx| tx.registers(&e.id, today))
            .count();
        assert_eq!(hits, 1, "expense {} registered {hits} times", e.id);
    }
    Ok(())
}

#[tokio::test]
async fn already_present_expense_is_skipped_and_the_other_registered() -> Result<()> {
    let today = date(2025, 3, 10);
    let storage = MemoryStorage::new();
    let expenses = vec![expense("rent", 500_000, 10), expense("loan", 300_000, 10)];
    let existing = vec![
        Transaction::expense("housing", 500_000, today, "bob")
            .with_id(Id::from_string("manual-1"))
            .with_fixed_expense(Id::from_string("rent")),
    ];

    let result = registrar(today, Arc::new(MemoryCheckMarker::new()))
        .run(&expenses, &existing, "alice", &storage)
        .await;

    assert_eq!(result.count(), 1);
    assert_eq!(result.already_registered, 1);
    assert_eq!(
        result.registered[0].fixed_expense_id,
        Some(Id::from_string("loan"))
    );
    Ok(())
}

#[tokio::test]
async fn persist_failure_is_isolated_to_its_expense() -> Result<()> {
    let today = date(2025, 3, 15);
    let marker = Arc::new(MemoryCheckMarker::new());
    let sink = FailingSink::new(Id::from_string("rent"));
    let expenses = vec![expense("rent", 500_000, 15), expense("phone", 60_000, 15)];

    let result = registrar(today, marker.clone())
        .run(&expenses, &[], "alice", &sink)
        .await;

    assert_eq!(sink.attempts(), 2);
    assert_eq!(result.count(), 1);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].0, Id::from_string("rent"));
    assert!(result.failed[0].1.contains("disk full"));

    let stored = sink.stored().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].fixed_expense_id, Some(Id::from_string("phone")));
    assert_eq!(marker.last_check().await?, Some(today));
    Ok(())
}

#[tokio::test]
async fn unreadable_marker_still_runs_the_pass() -> Result<()> {
    let today = date(2025, 3, 1);
    let storage = MemoryStorage::new();

    let result = registrar(today, Arc::new(BrokenMarker))
        .run(&[expense("rent", 50_000, 1)], &[], "alice", &storage)
        .await;

    assert!(!result.already_checked);
    assert_eq!(result.count(), 1);
    Ok(())
}

#[tokio::test]
async fn inactive_out_of_window_and_short_month_expenses_are_not_due() -> Result<()> {
    let storage = MemoryStorage::new();
    let expenses = vec![
        expense("paused", 10_000, 28).with_active(false),
        expense("ended", 10_000, 28).with_window(Some(date(2024, 1, 1)), Some(date(2025, 1, 31))),
        expense("month-end", 10_000, 31),
        expense("due", 10_000, 28),
    ];

    let result = registrar(date(2025, 2, 28), Arc::new(MemoryCheckMarker::new()))
        .run(&expenses, &[], "alice", &storage)
        .await;

    assert_eq!(result.not_due, 3);
    assert_eq!(result.count(), 1);
    assert_eq!(
        result.registered[0].fixed_expense_id,
        Some(Id::from_string("due"))
    );
    Ok(())
}

#[tokio::test]
async fn escalated_amount_is_recorded_without_touching_the_definition() -> Result<()> {
    let today = date(2024, 4, 1);
    let storage = MemoryStorage::new();
    let loan = expense("loan", 1_000, 1).with_monthly_increase(100, "2024-01-15");
    storage.save_recurring_expense(&loan).await?;

    let result = registrar(today, Arc::new(MemoryCheckMarker::new()))
        .run(std::slice::from_ref(&loan), &[], "alice", &storage)
        .await;

    assert_eq!(result.registered[0].amount, 1_300);
    let stored = storage
        .get_recurring_expense(&Id::from_string("loan"))
        .await?
        .unwrap();
    assert_eq!(stored.amount, 1_000);
    Ok(())
}

#[tokio::test]
async fn file_marker_persists_across_registrar_instances() -> Result<()> {
    let dir = TempDir::new()?;
    let today = date(2025, 3, 1);
    let expenses = vec![expense("rent", 50_000, 1)];

    let storage = JsonFileStorage::new(dir.path());
    let first = registrar(today, Arc::new(storage.check_marker("alice")?))
        .run(&expenses, &[], "alice", &storage)
        .await;
    assert_eq!(first.count(), 1);

    let reopened = JsonFileStorage::new(dir.path());
    let existing = reopened.list_transactions().await?;
    assert!(already_registered(&existing, &Id::from_string("rent"), today));

    let second = registrar(today, Arc::new(reopened.check_marker("alice")?))
        .run(&expenses, &existing, "alice", &reopened)
        .await;
    assert!(second.already_checked);

    // Markers are per user.
    let other = registrar(today, Arc::new(reopened.check_marker("bob")?))
        .run(&expenses, &existing, "bob", &reopened)
        .await;
    assert!(!other.already_checked);
    assert_eq!(other.already_registered, 1);
    assert_eq!(reopened.list_transactions().await?.len(), 1);
    Ok(())
}
