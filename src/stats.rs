//! Monthly rollups: income, spending and saving totals, category and
//! per-member breakdowns, month-over-month change, trailing trends and
//! budget usage.
//!
//! A month's figures combine the transactions dated inside it with the
//! recurring expenses in effect for it. Trend months use transactions only,
//! since past months already hold their auto-registered records.

use std::collections::HashMap;

use serde::Serialize;

use crate::categories::{CategoryBudgets, CategoryResolver};
use crate::dates::MonthKey;
use crate::models::{Id, RecurringExpense, Transaction, TransactionType};
use crate::recurrence::{amount_after, is_effective_in_month, months_elapsed};

/// Category id treated as saving rather than consumption.
pub const DEFAULT_SAVINGS_CATEGORY: &str = "savings";

/// Longest trend window, in months.
pub const MAX_TREND_MONTHS: usize = 120;

/// A recurring expense's share of a given month, at that month's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixedOccurrence {
    pub expense_id: Id,
    pub name: String,
    pub category: String,
    pub amount: i64,
    pub months_elapsed: i32,
    pub auto_register_date: u32,
}

/// Anything that counts toward a month's figures.
#[derive(Debug, Clone, Copy)]
pub enum Occurrence<'a> {
    Transaction(&'a Transaction),
    Fixed(&'a FixedOccurrence),
}

impl Occurrence<'_> {
    pub fn kind(&self) -> TransactionType {
        match self {
            Occurrence::Transaction(tx) => tx.kind,
            Occurrence::Fixed(_) => TransactionType::Expense,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            Occurrence::Transaction(tx) => &tx.category,
            Occurrence::Fixed(f) => &f.category,
        }
    }

    pub fn amount(&self) -> i64 {
        match self {
            Occurrence::Transaction(tx) => tx.amount,
            Occurrence::Fixed(f) => f.amount,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MonthTotals {
    pub income: i64,
    pub saving: i64,
    /// All spending including savings.
    pub expense_gross: i64,
    /// Spending with savings taken out; the "this month's spending" figure.
    pub expense_net: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthComparison {
    pub income_change_pct: f64,
    pub expense_change_pct: f64,
    pub saving_change_pct: f64,
    pub expense_difference: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub amount: i64,
    pub count: usize,
    pub share_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberTotal {
    pub user_id: String,
    pub amount: i64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub month: MonthKey,
    #[serde(flatten)]
    pub totals: MonthTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetUsage {
    pub category: String,
    pub name: String,
    pub budget: i64,
    pub spent: i64,
    pub remaining: i64,
    pub usage_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub month: MonthKey,
    pub totals: MonthTotals,
    pub previous_totals: MonthTotals,
    pub comparison: MonthComparison,
    pub expense_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_member: Option<Vec<MemberTotal>>,
    pub fixed_expenses: Vec<FixedOccurrence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub budgets: Vec<BudgetUsage>,
}

/// `(current - previous) / previous * 100`, or 0 when `previous` is 0.
pub fn percent_change(current: i64, previous: i64) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current - previous) as f64 / previous as f64 * 100.0
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percent_of(part: i64, whole: i64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Recurring expenses in effect for `month`, each at the amount it reaches
/// by the middle of that month.
pub fn fixed_occurrences_for_month(
    expenses: &[RecurringExpense],
    month: MonthKey,
) -> Vec<FixedOccurrence> {
    let reference = month.mid_month();
    expenses
        .iter()
        .filter(|e| is_effective_in_month(e, month))
        .map(|e| {
            let months = months_elapsed(e, reference);
            FixedOccurrence {
                expense_id: e.id.clone(),
                name: e.name.clone(),
                category: e.category.clone(),
                amount: amount_after(e, months),
                months_elapsed: months,
                auto_register_date: e.auto_register_date,
            }
        })
        .collect()
}

/// Transactions dated within `month` (first and last day inclusive).
pub fn transactions_in_month(
    txns: &[Transaction],
    month: MonthKey,
) -> impl Iterator<Item = &Transaction> {
    txns.iter().filter(move |tx| month.contains(tx.date))
}

/// Everything that counts toward `month`: its transactions, then its fixed
/// occurrences.
pub fn month_occurrences<'a>(
    txns: &'a [Transaction],
    fixed: &'a [FixedOccurrence],
    month: MonthKey,
) -> Vec<Occurrence<'a>> {
    transactions_in_month(txns, month)
        .map(Occurrence::Transaction)
        .chain(fixed.iter().map(Occurrence::Fixed))
        .collect()
}

pub fn totals(occurrences: &[Occurrence<'_>], savings_category: &str) -> MonthTotals {
    let mut out = MonthTotals::default();
    for occ in occurrences {
        match occ.kind() {
            TransactionType::Income => out.income += occ.amount(),
            TransactionType::Expense => {
                out.expense_gross += occ.amount();
                if occ.category() == savings_category {
                    out.saving += occ.amount();
                }
            }
        }
    }
    out.expense_net = out.expense_gross - out.saving;
    out
}

pub fn compare_months(current: &MonthTotals, previous: &MonthTotals) -> MonthComparison {
    MonthComparison {
        income_change_pct: percent_change(current.income, previous.income),
        expense_change_pct: percent_change(current.expense_net, previous.expense_net),
        saving_change_pct: percent_change(current.saving, previous.saving),
        expense_difference: current.expense_net - previous.expense_net,
    }
}

/// Group occurrences of one type by display name, largest first.
/// Unknown category ids land in the resolver's "Other" bucket.
pub fn category_breakdown(
    occurrences: &[Occurrence<'_>],
    kind: TransactionType,
    resolver: &dyn CategoryResolver,
) -> Vec<CategoryTotal> {
    let mut grouped: HashMap<String, (i64, usize)> = HashMap::new();
    let mut total = 0i64;
    for occ in occurrences.iter().filter(|o| o.kind() == kind) {
        let entry = grouped
            .entry(resolver.display_name(occ.category(), kind))
            .or_insert((0, 0));
        entry.0 += occ.amount();
        entry.1 += 1;
        total += occ.amount();
    }

    let mut out: Vec<CategoryTotal> = grouped
        .into_iter()
        .map(|(name, (amount, count))| CategoryTotal {
            share_pct: percent_of(amount, total),
            name,
            amount,
            count,
        })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    out
}

/// Expense totals per household member, or `None` unless the transactions
/// name at least two distinct members. Members with income only are listed
/// with a zero amount.
pub fn member_breakdown<'a>(
    txns: impl IntoIterator<Item = &'a Transaction>,
) -> Option<Vec<MemberTotal>> {
    let mut grouped: HashMap<&str, (i64, usize)> = HashMap::new();
    for tx in txns {
        let entry = grouped.entry(tx.user_id.as_str()).or_insert((0, 0));
        if tx.is_expense() {
            entry.0 += tx.amount;
            entry.1 += 1;
        }
    }
    if grouped.len() < 2 {
        return None;
    }

    let mut out: Vec<MemberTotal> = grouped
        .into_iter()
        .map(|(user_id, (amount, count))| MemberTotal {
            user_id: user_id.to_string(),
            amount,
            count,
        })
        .collect();
    out.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| a.user_id.cmp(&b.user_id)));
    Some(out)
}

/// Spending against each budgeted category, in category id order.
pub fn budget_usage(
    budgets: &CategoryBudgets,
    occurrences: &[Occurrence<'_>],
    resolver: &dyn CategoryResolver,
) -> Vec<BudgetUsage> {
    let mut spent: HashMap<&str, i64> = HashMap::new();
    for occ in occurrences
        .iter()
        .filter(|o| o.kind() == TransactionType::Expense)
    {
        *spent.entry(occ.category()).or_insert(0) += occ.amount();
    }

    budgets
        .iter()
        .map(|(category, budget)| {
            let spent = spent.get(category).copied().unwrap_or(0);
            BudgetUsage {
                category: category.to_string(),
                name: resolver.display_name(category, TransactionType::Expense),
                budget,
                spent,
                remaining: budget - spent,
                usage_pct: percent_of(spent, budget),
            }
        })
        .collect()
}

/// Month rollups configured for one household.
pub struct StatsEngine<'a> {
    resolver: &'a dyn CategoryResolver,
    savings_category: String,
    budgets: CategoryBudgets,
}

impl<'a> StatsEngine<'a> {
    pub fn new(resolver: &'a dyn CategoryResolver) -> Self {
        Self {
            resolver,
            savings_category: DEFAULT_SAVINGS_CATEGORY.to_string(),
            budgets: CategoryBudgets::default(),
        }
    }

    pub fn with_savings_category(mut self, category: impl Into<String>) -> Self {
        self.savings_category = category.into();
        self
    }

    pub fn with_budgets(mut self, budgets: CategoryBudgets) -> Self {
        self.budgets = budgets;
        self
    }

    pub fn savings_category(&self) -> &str {
        &self.savings_category
    }

    /// Totals for `month` including its fixed occurrences.
    pub fn month_totals(
        &self,
        txns: &[Transaction],
        recurring: &[RecurringExpense],
        month: MonthKey,
    ) -> MonthTotals {
        let fixed = fixed_occurrences_for_month(recurring, month);
        totals(
            &month_occurrences(txns, &fixed, month),
            &self.savings_category,
        )
    }

    pub fn summary(
        &self,
        txns: &[Transaction],
        recurring: &[RecurringExpense],
        month: MonthKey,
    ) -> MonthlySummary {
        let fixed = fixed_occurrences_for_month(recurring, month);
        let occurrences = month_occurrences(txns, &fixed, month);
        let current = totals(&occurrences, &self.savings_category);
        let previous = self.month_totals(txns, recurring, month.previous());

        MonthlySummary {
            month,
            totals: current,
            previous_totals: previous,
            comparison: compare_months(&current, &previous),
            expense_by_category: category_breakdown(
                &occurrences,
                TransactionType::Expense,
                self.resolver,
            ),
            income_by_category: category_breakdown(
                &occurrences,
                TransactionType::Income,
                self.resolver,
            ),
            by_member: member_breakdown(transactions_in_month(txns, month)),
            budgets: budget_usage(&self.budgets, &occurrences, self.resolver),
            fixed_expenses: fixed.clone(),
        }
    }

    /// Transaction-only totals for the `months` months ending at `end`,
    /// oldest first. Capped at [`MAX_TREND_MONTHS`].
    pub fn trend(&self, txns: &[Transaction], end: MonthKey, months: usize) -> Vec<TrendPoint> {
        (0..months.min(MAX_TREND_MONTHS))
            .rev()
            .map(|back| {
                let month = end.offset(-(back as i32));
                let occurrences = month_occurrences(txns, &[], month);
                TrendPoint {
                    month,
                    totals: totals(&occurrences, &self.savings_category),
                }
            })
            .collect()
    }
}
