use serde::Serialize;

use crate::stats::{BudgetUsage, CategoryTotal, FixedOccurrence, MemberTotal, MonthComparison};

/// JSON output for transactions
#[derive(Debug, Serialize)]
pub struct TransactionOutput {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub category_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_display: Option<String>,
    pub date: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_expense_id: Option<String>,
    pub is_auto_registered: bool,
}

/// JSON output for recurring expense definitions
#[derive(Debug, Serialize)]
pub struct RecurringExpenseOutput {
    pub id: String,
    pub name: String,
    pub category: String,
    pub category_name: String,
    /// Amount as stored.
    pub amount: i64,
    /// Amount after escalation, as of the reference date.
    pub current_amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_amount_display: Option<String>,
    pub auto_register_date: u32,
    pub monthly_increase: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_date: Option<String>,
    pub active: bool,
    pub unlimited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub due_today: bool,
}

#[derive(Debug, Serialize)]
pub struct RegistrationFailureOutput {
    pub expense_id: String,
    pub error: String,
}

/// Output for the daily auto-registration pass
#[derive(Debug, Serialize)]
pub struct AutoRegisterOutput {
    pub date: String,
    pub user_id: String,
    pub already_checked: bool,
    pub registered_count: usize,
    pub registered: Vec<TransactionOutput>,
    pub not_due: usize,
    pub already_registered: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<RegistrationFailureOutput>,
}

/// Month totals with optional display strings.
#[derive(Debug, Serialize)]
pub struct TotalsOutput {
    pub income: i64,
    pub saving: i64,
    pub expense_gross: i64,
    pub expense_net: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saving_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_net_display: Option<String>,
}

/// Output for the monthly report command
#[derive(Debug, Serialize)]
pub struct ReportOutput {
    pub month: String,
    pub totals: TotalsOutput,
    pub previous_month: String,
    pub previous_totals: TotalsOutput,
    pub comparison: MonthComparison,
    pub expense_by_category: Vec<CategoryTotal>,
    pub income_by_category: Vec<CategoryTotal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by_member: Option<Vec<MemberTotal>>,
    pub fixed_expenses: Vec<FixedOccurrence>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub budgets: Vec<BudgetUsage>,
}

#[derive(Debug, Serialize)]
pub struct TrendPointOutput {
    pub month: String,
    #[serde(flatten)]
    pub totals: TotalsOutput,
}

/// Output for the trend command
#[derive(Debug, Serialize)]
pub struct TrendOutput {
    pub start_month: String,
    pub end_month: String,
    pub points: Vec<TrendPointOutput>,
}

#[derive(Debug, Serialize)]
pub struct HoldingOutput {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
    pub average_price: i64,
    pub current_price: i64,
    pub invested: i64,
    pub evaluation: i64,
    pub profit: i64,
    pub return_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_display: Option<String>,
}

/// Output for the portfolio command
#[derive(Debug, Serialize)]
pub struct PortfolioOutput {
    pub holdings: Vec<HoldingOutput>,
    pub total_invested: i64,
    pub total_evaluation: i64,
    pub total_profit: i64,
    pub total_return_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_evaluation_display: Option<String>,
}
