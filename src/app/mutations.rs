use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::clock::Clock;
use crate::config::ResolvedConfig;
use crate::dates::{format_date, parse_date};
use crate::models::{
    Holding, Id, IdGenerator, RecurringExpense, TimestampIdGenerator, Transaction,
    TransactionType, UuidIdGenerator,
};
use crate::storage::Storage;

use super::{recurring_output, transaction_output, RecurringExpenseOutput, TransactionOutput};

/// A hand-entered transaction.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionType,
    pub category: String,
    pub amount: i64,
    /// Defaults to today.
    pub date: Option<NaiveDate>,
    /// Defaults to the configured user.
    pub user_id: Option<String>,
    pub subcategory: Option<String>,
    pub payment_method: Option<String>,
    pub memo: Option<String>,
}

/// A new recurring expense definition.
#[derive(Debug, Clone)]
pub struct NewRecurring {
    pub name: String,
    pub category: String,
    pub amount: i64,
    pub auto_register_date: u32,
    pub monthly_increase: i64,
    pub base_date: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub subcategory: Option<String>,
    pub payment_method: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewHolding {
    pub symbol: String,
    pub name: Option<String>,
    pub quantity: i64,
    pub average_price: i64,
    pub current_price: Option<i64>,
}

fn ensure_known_category(
    config: &ResolvedConfig,
    category: &str,
    kind: TransactionType,
) -> Result<()> {
    if config.catalog.contains(category, kind) {
        return Ok(());
    }
    let known: Vec<&str> = config
        .catalog
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.id.as_str())
        .collect();
    anyhow::bail!(
        "Unknown {kind} category '{category}'. Use one of: {}",
        known.join(", ")
    )
}

pub async fn add_transaction(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    input: NewTransaction,
) -> Result<TransactionOutput> {
    let clock = config.clock();
    add_transaction_with(storage, config, input, &UuidIdGenerator, &clock).await
}

pub async fn add_transaction_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    input: NewTransaction,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<TransactionOutput> {
    anyhow::ensure!(input.amount > 0, "Amount must be positive");
    ensure_known_category(config, &input.category, input.kind)?;

    let date = input.date.unwrap_or_else(|| clock.today());
    let user_id = input.user_id.unwrap_or_else(|| config.user_id.clone());
    let mut tx =
        Transaction::new_with_generator(ids, input.kind, input.category, input.amount, date, user_id);
    tx.subcategory = input.subcategory;
    tx.payment_method = input.payment_method;
    tx.memo = input.memo;

    storage
        .append_transactions(std::slice::from_ref(&tx))
        .await
        .context("Failed to save transaction")?;

    Ok(transaction_output(config, &tx))
}

pub async fn delete_transaction(storage: &dyn Storage, id_str: &str) -> Result<serde_json::Value> {
    let id = Id::from_string_checked(id_str)
        .with_context(|| format!("Invalid transaction id: {id_str}"))?;

    if !storage.delete_transaction(&id).await? {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Transaction not found",
            "id": id_str
        }));
    }

    Ok(serde_json::json!({
        "success": true,
        "id": id_str
    }))
}

pub async fn add_recurring(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    input: NewRecurring,
) -> Result<RecurringExpenseOutput> {
    let clock = config.clock();
    add_recurring_with(storage, config, input, &TimestampIdGenerator::default(), &clock).await
}

pub async fn add_recurring_with(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    input: NewRecurring,
    ids: &dyn IdGenerator,
    clock: &dyn Clock,
) -> Result<RecurringExpenseOutput> {
    anyhow::ensure!(input.amount > 0, "Amount must be positive");
    anyhow::ensure!(
        input.monthly_increase >= 0,
        "Monthly increase must not be negative"
    );
    anyhow::ensure!(
        (1..=31).contains(&input.auto_register_date),
        "Registration day must be between 1 and 31 (got {})",
        input.auto_register_date
    );
    ensure_known_category(config, &input.category, TransactionType::Expense)?;
    if let Some(base) = &input.base_date {
        parse_date(base).context("Invalid base date")?;
    }
    if let (Some(start), Some(end)) = (input.start_date, input.end_date) {
        anyhow::ensure!(
            start <= end,
            "Start date {} is after end date {}",
            format_date(start),
            format_date(end)
        );
    }

    let mut expense = RecurringExpense::new_with(
        ids.new_id(),
        input.name,
        input.category,
        input.amount,
        input.auto_register_date,
    );
    if input.monthly_increase != 0 {
        let today = clock.today();
        let base = input.base_date.unwrap_or_else(|| format_date(today));
        expense = expense.with_monthly_increase(input.monthly_increase, base);
    } else if let Some(base) = input.base_date {
        expense.base_date = Some(base);
    }
    if input.start_date.is_some() || input.end_date.is_some() {
        expense = expense.with_window(input.start_date, input.end_date);
    }
    expense.subcategory = input.subcategory;
    expense.payment_method = input.payment_method;
    expense.memo = input.memo;

    storage
        .save_recurring_expense(&expense)
        .await
        .context("Failed to save recurring expense")?;

    tracing::info!(expense_id = %expense.id, name = %expense.name, "Added recurring expense");

    Ok(recurring_output(config, expense, clock.today()))
}

/// Pause or resume a recurring expense. Transactions it already produced
/// are untouched.
pub async fn set_recurring_active(
    storage: &dyn Storage,
    id_str: &str,
    active: bool,
) -> Result<serde_json::Value> {
    let id = Id::from_string_checked(id_str)
        .with_context(|| format!("Invalid recurring expense id: {id_str}"))?;

    let Some(mut expense) = storage.get_recurring_expense(&id).await? else {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Recurring expense not found",
            "id": id_str
        }));
    };

    let previous = expense.is_active;
    expense.is_active = active;
    storage.save_recurring_expense(&expense).await?;

    Ok(serde_json::json!({
        "success": true,
        "id": id_str,
        "name": expense.name,
        "previous_active": previous,
        "active": active
    }))
}

/// Delete a recurring expense definition. Generated transactions stay.
pub async fn remove_recurring(storage: &dyn Storage, id_str: &str) -> Result<serde_json::Value> {
    let id = Id::from_string_checked(id_str)
        .with_context(|| format!("Invalid recurring expense id: {id_str}"))?;

    if !storage.delete_recurring_expense(&id).await? {
        return Ok(serde_json::json!({
            "success": false,
            "error": "Recurring expense not found",
            "id": id_str
        }));
    }

    Ok(serde_json::json!({
        "success": true,
        "id": id_str
    }))
}

pub async fn add_holding(storage: &dyn Storage, input: NewHolding) -> Result<serde_json::Value> {
    anyhow::ensure!(!input.symbol.trim().is_empty(), "Symbol must not be empty");
    anyhow::ensure!(input.quantity > 0, "Quantity must be positive");
    anyhow::ensure!(input.average_price >= 0, "Average price must not be negative");

    let symbol = input.symbol.trim().to_uppercase();
    let existing = storage
        .list_holdings()
        .await?
        .into_iter()
        .find(|h| h.symbol.eq_ignore_ascii_case(&symbol));

    let mut holding = Holding::new(symbol, input.quantity, input.average_price);
    if let Some(existing) = &existing {
        holding = holding.with_id(existing.id.clone());
    }
    if let Some(name) = input.name {
        holding = holding.with_name(name);
    } else if let Some(existing) = &existing {
        holding = holding.with_name(existing.name.clone());
    }
    if let Some(price) = input.current_price {
        anyhow::ensure!(price >= 0, "Current price must not be negative");
        holding = holding.with_current_price(price);
    }

    storage.save_holding(&holding).await?;

    Ok(serde_json::json!({
        "success": true,
        "replaced": existing.is_some(),
        "holding": holding
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::Config;
    use crate::models::FixedIdGenerator;
    use crate::storage::MemoryStorage;
    use std::path::Path;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> ResolvedConfig {
        Config::default().resolve(Path::new("/tmp")).unwrap()
    }

    fn recurring(name: &str, amount: i64, day: u32) -> NewRecurring {
        NewRecurring {
            name: name.to_string(),
            category: "housing".to_string(),
            amount,
            auto_register_date: day,
            monthly_increase: 0,
            base_date: None,
            start_date: None,
            end_date: None,
            subcategory: None,
            payment_method: None,
            memo: None,
        }
    }

    #[tokio::test]
    async fn add_transaction_defaults_date_and_user() -> Result<()> {
        let storage = MemoryStorage::new();
        let clock = FixedClock::on(date(2025, 3, 14));
        let ids = FixedIdGenerator::new([Id::from_string("tx-1")]);

        let out = add_transaction_with(
            &storage,
            &config(),
            NewTransaction {
                kind: TransactionType::Expense,
                category: "food".to_string(),
                amount: 12_000,
                date: None,
                user_id: None,
                subcategory: None,
                payment_method: Some("card".to_string()),
                memo: Some("lunch".to_string()),
            },
            &ids,
            &clock,
        )
        .await?;

        assert_eq!(out.id, "tx-1");
        assert_eq!(out.date, "2025-03-14");
        assert_eq!(out.user_id, "me");
        assert!(!out.is_auto_registered);
        assert_eq!(storage.list_transactions().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn add_transaction_rejects_unknown_category_and_bad_amount() -> Result<()> {
        let storage = MemoryStorage::new();
        let clock = FixedClock::on(date(2025, 3, 14));
        let input = NewTransaction {
            kind: TransactionType::Income,
            category: "food".to_string(),
            amount: 100,
            date: None,
            user_id: None,
            subcategory: None,
            payment_method: None,
            memo: None,
        };

        let err = add_transaction_with(&storage, &config(), input.clone(), &UuidIdGenerator, &clock)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("salary"));

        let zero = NewTransaction {
            kind: TransactionType::Expense,
            amount: 0,
            ..input
        };
        assert!(add_transaction_with(&storage, &config(), zero, &UuidIdGenerator, &clock)
            .await
            .is_err());
        assert!(storage.list_transactions().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn add_recurring_anchors_escalation_today_when_no_base_date() -> Result<()> {
        let storage = MemoryStorage::new();
        let clock = FixedClock::on(date(2025, 3, 14));
        let ids = FixedIdGenerator::new([Id::from_string("fx-1")]);
        let input = NewRecurring {
            monthly_increase: 5_000,
            ..recurring("Rent", 500_000, 25)
        };

        let out = add_recurring_with(&storage, &config(), input, &ids, &clock).await?;
        assert_eq!(out.base_date.as_deref(), Some("2025-03-14"));
        assert_eq!(out.current_amount, 500_000);
        assert!(!out.due_today);

        let stored = storage
            .get_recurring_expense(&Id::from_string("fx-1"))
            .await?
            .unwrap();
        assert_eq!(stored.monthly_increase, 5_000);
        assert!(stored.is_active);
        Ok(())
    }

    #[tokio::test]
    async fn add_recurring_validates_inputs() {
        let storage = MemoryStorage::new();
        let clock = FixedClock::on(date(2025, 3, 14));

        let bad_day = recurring("Rent", 500_000, 32);
        assert!(
            add_recurring_with(&storage, &config(), bad_day, &UuidIdGenerator, &clock)
                .await
                .is_err()
        );

        let bad_window = NewRecurring {
            start_date: Some(date(2025, 6, 1)),
            end_date: Some(date(2025, 1, 1)),
            ..recurring("Rent", 500_000, 1)
        };
        assert!(
            add_recurring_with(&storage, &config(), bad_window, &UuidIdGenerator, &clock)
                .await
                .is_err()
        );

        let bad_base = NewRecurring {
            base_date: Some("someday".to_string()),
            ..recurring("Rent", 500_000, 1)
        };
        assert!(
            add_recurring_with(&storage, &config(), bad_base, &UuidIdGenerator, &clock)
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn add_recurring_rejects_negative_monthly_increase() -> Result<()> {
        let storage = MemoryStorage::new();
        let clock = FixedClock::on(date(2025, 3, 1));

        let shrinking = NewRecurring {
            monthly_increase: -500,
            base_date: Some("2024-01-01".to_string()),
            ..recurring("Loan", 1_000, 1)
        };
        let err = add_recurring_with(&storage, &config(), shrinking, &UuidIdGenerator, &clock)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Monthly increase"));
        assert!(storage.list_recurring_expenses().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn set_recurring_active_toggles_and_reports_missing() -> Result<()> {
        let storage = MemoryStorage::new();
        let expense = RecurringExpense::new_with(Id::from_string("fx-1"), "Gym", "leisure", 50_000, 5);
        storage.save_recurring_expense(&expense).await?;

        let out = set_recurring_active(&storage, "fx-1", false).await?;
        assert_eq!(out["success"], true);
        assert_eq!(out["previous_active"], true);
        let stored = storage
            .get_recurring_expense(&Id::from_string("fx-1"))
            .await?
            .unwrap();
        assert!(!stored.is_active);

        let missing = set_recurring_active(&storage, "nope", true).await?;
        assert_eq!(missing["success"], false);
        Ok(())
    }

    #[tokio::test]
    async fn remove_recurring_keeps_generated_transactions() -> Result<()> {
        let storage = MemoryStorage::new();
        let expense = RecurringExpense::new_with(Id::from_string("fx-1"), "Gym", "leisure", 50_000, 5);
        storage.save_recurring_expense(&expense).await?;
        storage
            .append_transactions(&[Transaction::expense("leisure", 50_000, date(2025, 3, 5), "me")
                .with_fixed_expense(expense.id.clone())])
            .await?;

        let out = remove_recurring(&storage, "fx-1").await?;
        assert_eq!(out["success"], true);
        assert!(storage.list_recurring_expenses().await?.is_empty());
        assert_eq!(storage.list_transactions().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn add_holding_replaces_same_symbol() -> Result<()> {
        let storage = MemoryStorage::new();
        let first = NewHolding {
            symbol: "aapl".to_string(),
            name: Some("Apple".to_string()),
            quantity: 10,
            average_price: 150,
            current_price: None,
        };
        add_holding(&storage, first).await?;

        let second = NewHolding {
            symbol: "AAPL".to_string(),
            name: None,
            quantity: 12,
            average_price: 155,
            current_price: Some(170),
        };
        let out = add_holding(&storage, second).await?;
        assert_eq!(out["replaced"], true);

        let holdings = storage.list_holdings().await?;
        assert_eq!(holdings.len(), 1);
        assert_eq!(holdings[0].symbol, "AAPL");
        assert_eq!(holdings[0].name, "Apple");
        assert_eq!(holdings[0].quantity, 12);
        assert_eq!(holdings[0].current_price, 170);
        Ok(())
    }
}
