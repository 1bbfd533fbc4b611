use anyhow::Result;
use chrono::NaiveDate;

use crate::config::ResolvedConfig;
use crate::dates::MonthKey;
use crate::storage::Storage;

use super::{recurring_output, transaction_output, RecurringExpenseOutput, TransactionOutput};

/// Transactions, newest first, optionally limited to one month.
pub async fn list_transactions(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    month: Option<MonthKey>,
) -> Result<Vec<TransactionOutput>> {
    let mut txns = storage.list_transactions().await?;
    if let Some(month) = month {
        txns.retain(|tx| month.contains(tx.date));
    }
    txns.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));

    Ok(txns
        .iter()
        .map(|tx| transaction_output(config, tx))
        .collect())
}

/// Recurring expenses with their amount as of `today`.
pub async fn list_recurring(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    today: NaiveDate,
) -> Result<Vec<RecurringExpenseOutput>> {
    let mut expenses = storage.list_recurring_expenses().await?;
    expenses.sort_by(|a, b| {
        a.auto_register_date
            .cmp(&b.auto_register_date)
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(expenses
        .into_iter()
        .map(|e| recurring_output(config, e, today))
        .collect())
}
