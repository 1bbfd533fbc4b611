//! Decides when a recurring expense turns into a concrete transaction and
//! what amount it carries.
//!
//! Everything here is pure: no clock, no storage. Callers pass the date they
//! care about.

use chrono::{Datelike, NaiveDate};

use crate::dates::{format_date, months_between, MonthKey};
use crate::models::{IdGenerator, RecurringExpense, Transaction, TransactionType};

/// Prefix marking memos of synthesized transactions.
pub const AUTO_MEMO_PREFIX: &str = "[auto]";

/// Whether `expense` should materialize on `today`.
///
/// Short-circuits in this order: inactive, wrong day of month, unlimited,
/// then the inclusive start/end window. An `auto_register_date` of 29..=31
/// simply never matches in months that lack that day.
pub fn is_due_on(expense: &RecurringExpense, today: NaiveDate) -> bool {
    if !expense.is_active {
        return false;
    }
    if today.day() != expense.auto_register_date {
        return false;
    }
    if !expense.is_time_bounded() {
        return true;
    }
    is_in_window(expense, today)
}

/// Inclusive start/end check. Missing bounds are open.
pub fn is_in_window(expense: &RecurringExpense, date: NaiveDate) -> bool {
    if let Some(start) = expense.start_date {
        if date < start {
            return false;
        }
    }
    if let Some(end) = expense.end_date {
        if date > end {
            return false;
        }
    }
    true
}

/// Whether the expense counts toward `month` at all.
///
/// Time-bounded expenses are checked against the 15th of the month, so a
/// window that opens or closes mid-month can be misclassified.
pub fn is_effective_in_month(expense: &RecurringExpense, month: MonthKey) -> bool {
    if !expense.is_active {
        return false;
    }
    !expense.is_time_bounded() || is_in_window(expense, month.mid_month())
}

/// Months elapsed from the expense's `base_date` to `target`; 0 without a
/// (well-formed) base date.
pub fn months_elapsed(expense: &RecurringExpense, target: NaiveDate) -> i32 {
    expense
        .base_date
        .as_deref()
        .map(|base| months_between(base, &format_date(target)))
        .unwrap_or(0)
}

/// Base amount plus `monthly_increase` for each elapsed month.
pub fn amount_after(expense: &RecurringExpense, months_elapsed: i32) -> i64 {
    expense.amount + expense.monthly_increase * i64::from(months_elapsed)
}

/// The amount due on `target`, recomputed from the definition every time.
pub fn escalated_amount(expense: &RecurringExpense, target: NaiveDate) -> i64 {
    amount_after(expense, months_elapsed(expense, target))
}

/// Build the transaction that records `expense` on `target`.
///
/// Does not check for an existing registration; that is the caller's job.
pub fn materialize(
    expense: &RecurringExpense,
    user_id: &str,
    target: NaiveDate,
    months_elapsed: i32,
    ids: &dyn IdGenerator,
) -> Transaction {
    let mut tx = Transaction::new_with_generator(
        ids,
        TransactionType::Expense,
        expense.category.clone(),
        amount_after(expense, months_elapsed),
        target,
        user_id,
    )
    .with_memo(auto_memo(expense, months_elapsed))
    .with_fixed_expense(expense.id.clone());
    tx.subcategory = expense.subcategory.clone();
    tx.payment_method = expense.payment_method.clone();
    tx
}

fn auto_memo(expense: &RecurringExpense, months_elapsed: i32) -> String {
    let mut memo = format!("{AUTO_MEMO_PREFIX} {}", expense.name);
    if expense.monthly_increase != 0 && months_elapsed > 0 {
        memo.push_str(&format!(
            " (+{} after {} months)",
            expense.monthly_increase * i64::from(months_elapsed),
            months_elapsed
        ));
    }
    if let Some(extra) = expense.memo.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        memo.push_str(" - ");
        memo.push_str(extra);
    }
    memo
}
