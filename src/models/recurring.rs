use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::deserialize_optional_date;

use super::Id;

fn default_true() -> bool {
    true
}

/// A fixed expense that repeats every month on `auto_register_date`.
///
/// The stored `amount` is the base amount. The amount due in a given month is
/// derived from `monthly_increase` and `base_date` each time it is needed and
/// is never written back here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: Id,
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub amount: i64,
    /// Day of month (1..=31).
    pub auto_register_date: u32,
    #[serde(default)]
    pub monthly_increase: i64,
    /// Anchor for escalation. Kept as the raw string; a malformed value
    /// behaves like an absent one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_date: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// `None` means unlimited, same as `Some(true)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_unlimited: Option<bool>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl RecurringExpense {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: i64,
        auto_register_date: u32,
    ) -> Self {
        Self::new_with(Id::new(), name, category, amount, auto_register_date)
    }

    pub fn new_with(
        id: Id,
        name: impl Into<String>,
        category: impl Into<String>,
        amount: i64,
        auto_register_date: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            subcategory: None,
            amount,
            auto_register_date,
            monthly_increase: 0,
            base_date: None,
            is_active: true,
            is_unlimited: None,
            start_date: None,
            end_date: None,
            payment_method: None,
            memo: None,
        }
    }

    /// Grow the amount by `increase` for every month since `base_date`.
    pub fn with_monthly_increase(mut self, increase: i64, base_date: impl Into<String>) -> Self {
        self.monthly_increase = increase;
        self.base_date = Some(base_date.into());
        self
    }

    /// Limit the expense to an inclusive date window. Either bound may be open.
    pub fn with_window(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.is_unlimited = Some(false);
        self.start_date = start;
        self.end_date = end;
        self
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.is_active = active;
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

    /// Only an explicit `false` makes the start/end window apply.
    pub fn is_time_bounded(&self) -> bool {
        self.is_unlimited == Some(false)
    }
}
