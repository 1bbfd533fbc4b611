use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::autoregister::AutoRegistrar;
use crate::config::ResolvedConfig;
use crate::dates::format_date;
use crate::models::Id;
use crate::storage::{JsonFileStorage, Storage, TransactionSink};

use super::{transaction_output, AutoRegisterOutput, RegistrationFailureOutput, TransactionOutput};

/// Today's auto-registration pass against the data directory.
pub async fn auto_register(
    storage: &JsonFileStorage,
    config: &ResolvedConfig,
) -> Result<AutoRegisterOutput> {
    let marker = storage.check_marker(&config.user_id)?;
    let registrar =
        AutoRegistrar::new(Arc::new(marker)).with_clock(Arc::new(config.clock()));
    auto_register_with(storage, storage, &registrar, config).await
}

/// Loads the household's definitions and transactions, then runs one pass.
///
/// Only loading can fail; per-expense persistence failures are reported in
/// the output.
pub async fn auto_register_with(
    storage: &dyn Storage,
    sink: &dyn TransactionSink,
    registrar: &AutoRegistrar,
    config: &ResolvedConfig,
) -> Result<AutoRegisterOutput> {
    let expenses = storage
        .list_recurring_expenses()
        .await
        .context("Failed to load recurring expenses")?;
    let existing = storage
        .list_transactions()
        .await
        .context("Failed to load transactions")?;

    let result = registrar
        .run(&expenses, &existing, &config.user_id, sink)
        .await;

    Ok(AutoRegisterOutput {
        date: format_date(registrar.today()),
        user_id: config.user_id.clone(),
        already_checked: result.already_checked,
        registered_count: result.count(),
        registered: result
            .registered
            .iter()
            .map(|tx| transaction_output(config, tx))
            .collect(),
        not_due: result.not_due,
        already_registered: result.already_registered,
        failed: result
            .failed
            .into_iter()
            .map(|(id, error)| RegistrationFailureOutput {
                expense_id: id.to_string(),
                error,
            })
            .collect(),
    })
}

/// Register one recurring expense on an explicit date, outside the daily
/// pass. Returns `None` when that date already has its transaction.
pub async fn register_recurring(
    storage: &dyn Storage,
    sink: &dyn TransactionSink,
    registrar: &AutoRegistrar,
    config: &ResolvedConfig,
    id_str: &str,
    date: NaiveDate,
) -> Result<Option<TransactionOutput>> {
    let id = Id::from_string_checked(id_str)
        .with_context(|| format!("Invalid recurring expense id: {id_str}"))?;
    let expense = storage
        .get_recurring_expense(&id)
        .await?
        .with_context(|| format!("Recurring expense not found: {id_str}"))?;
    let existing = storage.list_transactions().await?;

    let Some(tx) = registrar.materialize_for_date(&expense, &existing, &config.user_id, date)
    else {
        tracing::info!(expense_id = %id, date = %date, "Already registered; nothing to do");
        return Ok(None);
    };

    sink.persist(&tx, date)
        .await
        .with_context(|| format!("Failed to persist transaction for {id_str}"))?;

    Ok(Some(transaction_output(config, &tx)))
}
