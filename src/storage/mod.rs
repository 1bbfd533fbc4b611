mod json_file;
mod memory;

pub use json_file::{FileCheckMarker, JsonFileStorage};
pub use memory::{MemoryCheckMarker, MemoryStorage};

use anyhow::Result;
use chrono::NaiveDate;

use crate::models::{Holding, Id, RecurringExpense, Transaction};

/// Storage trait for household data.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    // Transactions
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;
    async fn append_transactions(&self, txns: &[Transaction]) -> Result<()>;
    async fn delete_transaction(&self, id: &Id) -> Result<bool>;

    // Recurring expenses
    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>>;
    async fn get_recurring_expense(&self, id: &Id) -> Result<Option<RecurringExpense>>;
    async fn save_recurring_expense(&self, expense: &RecurringExpense) -> Result<()>;
    /// Removes the definition only; transactions it produced stay.
    async fn delete_recurring_expense(&self, id: &Id) -> Result<bool>;

    // Stock holdings
    async fn list_holdings(&self) -> Result<Vec<Holding>>;
    async fn save_holding(&self, holding: &Holding) -> Result<()>;
}

/// Where auto-registered transactions get written.
///
/// A successful `persist` means a later `list_transactions` returns the
/// record with the same id.
#[async_trait::async_trait]
pub trait TransactionSink: Send + Sync {
    async fn persist(&self, transaction: &Transaction, date: NaiveDate) -> Result<()>;
}

/// The day the auto-registration pass last completed, scoped to one user.
#[async_trait::async_trait]
pub trait CheckMarkerStore: Send + Sync {
    async fn last_check(&self) -> Result<Option<NaiveDate>>;
    async fn set_last_check(&self, date: NaiveDate) -> Result<()>;
}

/// Last write wins per id, keeping first-seen order.
pub(crate) fn dedupe_by_id(txns: Vec<Transaction>) -> Vec<Transaction> {
    let mut positions: std::collections::HashMap<Id, usize> = std::collections::HashMap::new();
    let mut out: Vec<Transaction> = Vec::with_capacity(txns.len());
    for tx in txns {
        match positions.get(&tx.id) {
            Some(&idx) => out[idx] = tx,
            None => {
                positions.insert(tx.id.clone(), out.len());
                out.push(tx);
            }
        }
    }
    out
}
