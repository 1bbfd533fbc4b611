#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use hearthbook::autoregister::AutoRegistrar;
use hearthbook::clock::FixedClock;
use hearthbook::models::{FixedIdGenerator, Id, Transaction};
use hearthbook::storage::{CheckMarkerStore, MemoryStorage, Storage, TransactionSink};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Registrar pinned to `today`, handing out `tx-1`, `tx-2`, ...
pub fn registrar(today: NaiveDate, marker: Arc<dyn CheckMarkerStore>) -> AutoRegistrar {
    AutoRegistrar::new(marker)
        .with_clock(Arc::new(FixedClock::on(today)))
        .with_id_generator(Arc::new(FixedIdGenerator::new(
            (1..=100).map(|i| Id::from_string(format!("tx-{i}"))),
        )))
}

/// Sink that rejects transactions for one recurring expense and stores the
/// rest.
pub struct FailingSink {
    pub inner: MemoryStorage,
    pub fail_for: Id,
    pub attempts: AtomicUsize,
}

impl FailingSink {
    pub fn new(fail_for: Id) -> Self {
        Self {
            inner: MemoryStorage::new(),
            fail_for,
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub async fn stored(&self) -> Result<Vec<Transaction>> {
        self.inner.list_transactions().await
    }
}

#[async_trait]
impl TransactionSink for FailingSink {
    async fn persist(&self, transaction: &Transaction, date: NaiveDate) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if transaction.fixed_expense_id.as_ref() == Some(&self.fail_for) {
            anyhow::bail!("disk full");
        }
        self.inner.persist(transaction, date).await
    }
}

/// Marker store whose reads and writes always fail.
pub struct BrokenMarker;

#[async_trait]
impl CheckMarkerStore for BrokenMarker {
    async fn last_check(&self) -> Result<Option<NaiveDate>> {
        anyhow::bail!("marker unavailable")
    }

    async fn set_last_check(&self, _date: NaiveDate) -> Result<()> {
        anyhow::bail!("marker unavailable")
    }
}
