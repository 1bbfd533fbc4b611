mod support;

use anyhow::Result;
use hearthbook::models::{Holding, Id, RecurringExpense, Transaction};
use hearthbook::storage::{CheckMarkerStore, JsonFileStorage, Storage, TransactionSink};
use support::date;
use tempfile::TempDir;

#[tokio::test]
async fn transactions_are_partitioned_by_month_and_round_trip() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let march = Transaction::expense("food", 12_000, date(2025, 3, 2), "alice")
        .with_id(Id::from_string("a"))
        .with_memo("groceries");
    let april = Transaction::income("salary", 3_000_000, date(2025, 4, 25), "bob")
        .with_id(Id::from_string("b"));
    storage
        .append_transactions(&[march.clone(), april.clone()])
        .await?;

    assert!(dir.path().join("transactions/2025-03.jsonl").exists());
    assert!(dir.path().join("transactions/2025-04.jsonl").exists());

    let loaded = storage.list_transactions().await?;
    assert_eq!(loaded, vec![march, april]);
    Ok(())
}

#[tokio::test]
async fn last_write_wins_for_repeated_ids() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let original = Transaction::expense("food", 10_000, date(2025, 3, 2), "alice")
        .with_id(Id::from_string("a"));
    let corrected = Transaction::expense("food", 9_000, date(2025, 3, 2), "alice")
        .with_id(Id::from_string("a"));
    storage.append_transactions(&[original]).await?;
    storage.append_transactions(&[corrected]).await?;

    let loaded = storage.list_transactions().await?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].amount, 9_000);
    Ok(())
}

#[tokio::test]
async fn reads_records_written_by_other_clients() -> Result<()> {
    let dir = TempDir::new()?;
    let tx_dir = dir.path().join("transactions");
    std::fs::create_dir_all(&tx_dir)?;
    std::fs::write(
        tx_dir.join("2025-03.jsonl"),
        concat!(
            r#"{"id":"x1","type":"expense","category":"housing","amount":500000,"date":"2025-3-1","userId":"alice","fixedExpenseId":"rent","isAutoRegistered":true}"#,
            "\n\n",
            r#"{"id":"x2","type":"income","category":"salary","amount":100,"date":"2025-03-05","userId":"bob"}"#,
            "\n"
        ),
    )?;

    let storage = JsonFileStorage::new(dir.path());
    let loaded = storage.list_transactions().await?;
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].date, date(2025, 3, 1));
    assert!(loaded[0].registers(&Id::from_string("rent"), date(2025, 3, 1)));
    assert!(!loaded[1].is_auto_registered);
    assert_eq!(loaded[1].fixed_expense_id, None);
    Ok(())
}

#[tokio::test]
async fn malformed_lines_are_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let tx_dir = dir.path().join("transactions");
    std::fs::create_dir_all(&tx_dir)?;
    std::fs::write(
        tx_dir.join("2025-03.jsonl"),
        concat!(
            r#"{"id":"x1","type":"expense","category":"food","amount":100,"date":"2025-03-01","userId":"alice"}"#,
            "\n",
            "{ truncated\n",
            r#"{"id":"x2","type":"expense","category":"food","amount":200,"date":"2025-03-02","userId":"alice"}"#,
            "\n"
        ),
    )?;

    let storage = JsonFileStorage::new(dir.path());
    let ids: Vec<String> = storage
        .list_transactions()
        .await?
        .into_iter()
        .map(|tx| tx.id.to_string())
        .collect();
    assert_eq!(ids, vec!["x1", "x2"]);
    Ok(())
}

#[tokio::test]
async fn persist_appends_to_the_registration_month() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let tx = Transaction::expense("housing", 500_000, date(2025, 5, 1), "alice")
        .with_id(Id::from_string("t1"))
        .with_fixed_expense(Id::from_string("rent"));
    storage.persist(&tx, date(2025, 5, 1)).await?;

    let content = std::fs::read_to_string(dir.path().join("transactions/2025-05.jsonl"))?;
    assert_eq!(content.lines().count(), 1);
    assert!(content.contains(r#""fixedExpenseId":"rent""#));
    assert!(content.contains(r#""isAutoRegistered":true"#));
    Ok(())
}

#[tokio::test]
async fn delete_transaction_rewrites_only_matching_file() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    storage
        .append_transactions(&[
            Transaction::expense("food", 1, date(2025, 3, 1), "a").with_id(Id::from_string("a")),
            Transaction::expense("food", 2, date(2025, 3, 2), "a").with_id(Id::from_string("b")),
        ])
        .await?;

    assert!(storage.delete_transaction(&Id::from_string("a")).await?);
    assert!(!storage.delete_transaction(&Id::from_string("a")).await?);

    let ids: Vec<String> = storage
        .list_transactions()
        .await?
        .into_iter()
        .map(|tx| tx.id.to_string())
        .collect();
    assert_eq!(ids, vec!["b"]);
    Ok(())
}

#[tokio::test]
async fn deleting_a_recurring_expense_keeps_its_transactions() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let rent = RecurringExpense::new_with(Id::from_string("rent"), "Rent", "housing", 500_000, 1)
        .with_monthly_increase(10_000, "2025-01-01")
        .with_window(Some(date(2025, 1, 1)), None);
    storage.save_recurring_expense(&rent).await?;
    storage
        .persist(
            &Transaction::expense("housing", 500_000, date(2025, 3, 1), "alice")
                .with_fixed_expense(rent.id.clone()),
            date(2025, 3, 1),
        )
        .await?;

    let loaded = storage.get_recurring_expense(&rent.id).await?;
    assert_eq!(loaded.as_ref(), Some(&rent));
    assert_eq!(storage.list_recurring_expenses().await?, vec![rent.clone()]);

    assert!(storage.delete_recurring_expense(&rent.id).await?);
    assert!(!storage.delete_recurring_expense(&rent.id).await?);
    assert!(storage.list_recurring_expenses().await?.is_empty());
    assert_eq!(storage.list_transactions().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn unsafe_ids_are_rejected() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let sneaky = RecurringExpense::new_with(Id::from_string("../escape"), "x", "housing", 1, 1);
    assert!(storage.save_recurring_expense(&sneaky).await.is_err());
    assert!(storage.check_marker("../bob").is_err());
    assert!(!dir.path().parent().unwrap().join("escape.json").exists());
    Ok(())
}

#[tokio::test]
async fn unreadable_recurring_files_are_skipped() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    storage
        .save_recurring_expense(&RecurringExpense::new_with(
            Id::from_string("ok"),
            "Gym",
            "leisure",
            50_000,
            5,
        ))
        .await?;
    std::fs::write(dir.path().join("recurring/broken.json"), "{ not json")?;

    let loaded = storage.list_recurring_expenses().await?;
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, Id::from_string("ok"));
    Ok(())
}

#[tokio::test]
async fn holdings_upsert_by_id() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());

    let apple = Holding::new("AAPL", 10, 150).with_id(Id::from_string("h1"));
    storage.save_holding(&apple).await?;
    storage
        .save_holding(&Holding::new("MSFT", 5, 300).with_id(Id::from_string("h2")))
        .await?;
    storage
        .save_holding(&apple.clone().with_current_price(175))
        .await?;

    let holdings = storage.list_holdings().await?;
    assert_eq!(holdings.len(), 2);
    assert_eq!(holdings[0].symbol, "AAPL");
    assert_eq!(holdings[0].current_price, 175);
    Ok(())
}

#[tokio::test]
async fn check_marker_round_trips_through_a_file() -> Result<()> {
    let dir = TempDir::new()?;
    let storage = JsonFileStorage::new(dir.path());
    let marker = storage.check_marker("alice")?;

    assert_eq!(marker.last_check().await?, None);
    marker.set_last_check(date(2025, 3, 1)).await?;
    assert_eq!(marker.last_check().await?, Some(date(2025, 3, 1)));

    let content = std::fs::read_to_string(dir.path().join("markers/alice.last_check"))?;
    assert_eq!(content, "2025-03-01");
    Ok(())
}
