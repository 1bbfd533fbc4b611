//! In-memory storage implementation for testing and embedding.

use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use tokio::sync::Mutex;

use crate::models::{Holding, Id, RecurringExpense, Transaction};

use super::{CheckMarkerStore, Storage, TransactionSink};

/// In-memory storage. Recurring expenses keep insertion order.
pub struct MemoryStorage {
    transactions: Mutex<Vec<Transaction>>,
    recurring: Mutex<Vec<RecurringExpense>>,
    holdings: Mutex<HashMap<Id, Holding>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            transactions: Mutex::new(Vec::new()),
            recurring: Mutex::new(Vec::new()),
            holdings: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let txns = self.transactions.lock().await;
        Ok(super::dedupe_by_id(txns.clone()))
    }

    async fn append_transactions(&self, txns: &[Transaction]) -> Result<()> {
        let mut stored = self.transactions.lock().await;
        stored.extend_from_slice(txns);
        Ok(())
    }

    async fn delete_transaction(&self, id: &Id) -> Result<bool> {
        let mut stored = self.transactions.lock().await;
        let before = stored.len();
        stored.retain(|tx| &tx.id != id);
        Ok(stored.len() != before)
    }

    async fn list_recurring_expenses(&self) -> Result<Vec<RecurringExpense>> {
        let recurring = self.recurring.lock().await;
        Ok(recurring.clone())
    }

    async fn get_recurring_expense(&self, id: &Id) -> Result<Option<RecurringExpense>> {
        let recurring = self.recurring.lock().await;
        Ok(recurring.iter().find(|e| &e.id == id).cloned())
    }

    async fn save_recurring_expense(&self, expense: &RecurringExpense) -> Result<()> {
        let mut recurring = self.recurring.lock().await;
        match recurring.iter_mut().find(|e| e.id == expense.id) {
            Some(existing) => *existing = expense.clone(),
            None => recurring.push(expense.clone()),
        }
        Ok(())
    }

    async fn delete_recurring_expense(&self, id: &Id) -> Result<bool> {
        let mut recurring = self.recurring.lock().await;
        let before = recurring.len();
        recurring.retain(|e| &e.id != id);
        Ok(recurring.len() != before)
    }

    async fn list_holdings(&self) -> Result<Vec<Holding>> {
        let holdings = self.holdings.lock().await;
        let mut out: Vec<Holding> = holdings.values().cloned().collect();
        out.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(out)
    }

    async fn save_holding(&self, holding: &Holding) -> Result<()> {
        let mut holdings = self.holdings.lock().await;
        holdings.insert(holding.id.clone(), holding.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionSink for MemoryStorage {
    async fn persist(&self, transaction: &Transaction, _date: NaiveDate) -> Result<()> {
        self.append_transactions(std::slice::from_ref(transaction))
            .await
    }
}

/// Check marker held in memory.
#[derive(Default)]
pub struct MemoryCheckMarker {
    last: Mutex<Option<NaiveDate>>,
}

impl MemoryCheckMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_check(date: NaiveDate) -> Self {
        Self {
            last: Mutex::new(Some(date)),
        }
    }
}

#[async_trait::async_trait]
impl CheckMarkerStore for MemoryCheckMarker {
    async fn last_check(&self) -> Result<Option<NaiveDate>> {
        Ok(*self.last.lock().await)
    }

    async fn set_last_check(&self, date: NaiveDate) -> Result<()> {
        *self.last.lock().await = Some(date);
        Ok(())
    }
}
