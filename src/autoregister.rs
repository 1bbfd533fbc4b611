//! Daily auto-registration of recurring expenses.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::clock::{Clock, SystemClock};
use crate::models::{Id, IdGenerator, RecurringExpense, TimestampIdGenerator, Transaction};
use crate::recurrence::{is_due_on, materialize, months_elapsed};
use crate::storage::{CheckMarkerStore, TransactionSink};

/// Turns due recurring expenses into transactions, at most once per day.
pub struct AutoRegistrar {
    marker: Arc<dyn CheckMarkerStore>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

/// Outcome of one pass.
#[derive(Debug, Default)]
pub struct AutoRegisterResult {
    pub date: Option<NaiveDate>,
    /// The marker showed today's pass had already run; nothing was looked at.
    pub already_checked: bool,
    /// Transactions persisted during this pass, in registration order.
    pub registered: Vec<Transaction>,
    pub not_due: usize,
    pub already_registered: usize,
    pub failed: Vec<(Id, String)>,
}

impl AutoRegisterResult {
    /// Number of newly materialized transactions.
    pub fn count(&self) -> usize {
        self.registered.len()
    }
}

/// True when `existing` already holds `expense_id` on `date`.
pub fn already_registered(existing: &[Transaction], expense_id: &Id, date: NaiveDate) -> bool {
    existing.iter().any(|tx| tx.registers(expense_id, date))
}

impl AutoRegistrar {
    pub fn new(marker: Arc<dyn CheckMarkerStore>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock::default());
        Self {
            marker,
            ids: Arc::new(TimestampIdGenerator::new(clock.clone())),
            clock,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Run today's pass.
    ///
    /// `existing` is a snapshot of every transaction visible to the
    /// household; it is only read. Each due expense is persisted in input
    /// order, one at a time. A failed persist is logged and skipped. The
    /// marker advances once every expense has been looked at, even if some
    /// failed, so a failing expense is retried tomorrow rather than today.
    pub async fn run(
        &self,
        expenses: &[RecurringExpense],
        existing: &[Transaction],
        user_id: &str,
        sink: &dyn TransactionSink,
    ) -> AutoRegisterResult {
        let today = self.clock.today();
        let mut result = AutoRegisterResult {
            date: Some(today),
            ..Default::default()
        };

        match self.marker.last_check().await {
            Ok(Some(last)) if last == today => {
                tracing::debug!(date = %today, "Auto-registration already ran today");
                result.already_checked = true;
                return result;
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(error = %err, "Failed to read auto-registration marker; running anyway");
            }
        }

        for expense in expenses {
            if !is_due_on(expense, today) {
                result.not_due += 1;
                continue;
            }
            if already_registered(existing, &expense.id, today) {
                tracing::debug!(expense_id = %expense.id, date = %today, "Already registered");
                result.already_registered += 1;
                continue;
            }

            let months = months_elapsed(expense, today);
            let tx = materialize(expense, user_id, today, months, self.ids.as_ref());

            match sink.persist(&tx, today).await {
                Ok(()) => {
                    tracing::debug!(
                        expense_id = %expense.id,
                        transaction_id = %tx.id,
                        amount = tx.amount,
                        "Registered recurring expense"
                    );
                    result.registered.push(tx);
                }
                Err(err) => {
                    tracing::warn!(
                        expense_id = %expense.id,
                        error = %err,
                        "Failed to persist recurring expense; will retry on its next due day"
                    );
                    result.failed.push((expense.id.clone(), err.to_string()));
                }
            }
        }

        if let Err(err) = self.marker.set_last_check(today).await {
            tracing::warn!(error = %err, "Failed to record auto-registration marker");
        }

        tracing::info!(
            date = %today,
            registered = result.registered.len(),
            failed = result.failed.len(),
            "Auto-registration pass complete"
        );
        result
    }

    /// Build the transaction for `expense` on an explicit `date`, ignoring
    /// the daily marker and the due-day rule.
    ///
    /// Returns `None` if `existing` already has it. The caller persists.
    pub fn materialize_for_date(
        &self,
        expense: &RecurringExpense,
        existing: &[Transaction],
        user_id: &str,
        date: NaiveDate,
    ) -> Option<Transaction> {
        if already_registered(existing, &expense.id, date) {
            return None;
        }
        let months = months_elapsed(expense, date);
        Some(materialize(expense, user_id, date, months, self.ids.as_ref()))
    }
}
