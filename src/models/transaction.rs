use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_date;

use super::{Id, IdGenerator, UuidIdGenerator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Expense,
    Income,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Expense => "expense",
            TransactionType::Income => "income",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(TransactionType::Expense),
            "income" => Ok(TransactionType::Income),
            _ => anyhow::bail!("Invalid transaction type: {s}. Use: expense, income"),
        }
    }
}

/// A concrete ledger entry, either typed in by a household member or
/// synthesized from a recurring expense.
///
/// Field names follow the shared document format (`fixedExpenseId`,
/// `isAutoRegistered`, ...) so records written by other clients load as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Id,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    /// Always positive; the sign is implied by `kind`.
    pub amount: i64,
    /// Effective date, not necessarily the day it was entered.
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Back-reference to the recurring expense that produced this record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_expense_id: Option<Id>,
    #[serde(default)]
    pub is_auto_registered: bool,
}

impl Transaction {
    pub fn new(
        kind: TransactionType,
        category: impl Into<String>,
        amount: i64,
        date: NaiveDate,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new_with_generator(&UuidIdGenerator, kind, category, amount, date, user_id)
    }

    pub fn new_with_generator(
        ids: &dyn IdGenerator,
        kind: TransactionType,
        category: impl Into<String>,
        amount: i64,
        date: NaiveDate,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            id: ids.new_id(),
            kind,
            category: category.into(),
            subcategory: None,
            amount,
            date,
            user_id: user_id.into(),
            payment_method: None,
            memo: None,
            fixed_expense_id: None,
            is_auto_registered: false,
        }
    }

    pub fn expense(
        category: impl Into<String>,
        amount: i64,
        date: NaiveDate,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Expense, category, amount, date, user_id)
    }

    pub fn income(
        category: impl Into<String>,
        amount: i64,
        date: NaiveDate,
        user_id: impl Into<String>,
    ) -> Self {
        Self::new(TransactionType::Income, category, amount, date, user_id)
    }

    pub fn with_id(mut self, id: Id) -> Self {
        self.id = id;
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = Some(method.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Mark as generated from the given recurring expense.
    pub fn with_fixed_expense(mut self, expense_id: Id) -> Self {
        self.fixed_expense_id = Some(expense_id);
        self.is_auto_registered = true;
        self
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.kind == TransactionType::Income
    }

    /// True when this record already materializes `expense_id` on `date`.
    pub fn registers(&self, expense_id: &Id, date: NaiveDate) -> bool {
        self.date == date && self.fixed_expense_id.as_ref() == Some(expense_id)
    }
}
