mod config;
mod list;
mod mutations;
mod portfolio;
mod register;
mod report;
mod types;

use chrono::NaiveDate;

use crate::categories::CategoryResolver;
use crate::config::ResolvedConfig;
use crate::dates::format_date;
use crate::format::format_amount_display;
use crate::models::{RecurringExpense, Transaction, TransactionType};
use crate::recurrence::{escalated_amount, is_due_on};
use crate::stats::MonthTotals;

pub use config::config_output;
pub use list::{list_recurring, list_transactions};
pub use mutations::{
    add_holding, add_recurring, add_recurring_with, add_transaction, add_transaction_with,
    delete_transaction, remove_recurring, set_recurring_active, NewHolding, NewRecurring,
    NewTransaction,
};
pub use portfolio::portfolio;
pub use register::{auto_register, auto_register_with, register_recurring};
pub use report::{monthly_report, trend};
pub use types::{
    AutoRegisterOutput, HoldingOutput, PortfolioOutput, RecurringExpenseOutput,
    RegistrationFailureOutput, ReportOutput, TotalsOutput, TransactionOutput, TrendOutput,
    TrendPointOutput,
};

/// `*_display` rendering, only when the config asks for one.
fn amount_display(config: &ResolvedConfig, value: i64) -> Option<String> {
    let display = &config.display;
    if !display.currency_grouping && display.currency_symbol.is_none() {
        return None;
    }
    Some(format_amount_display(
        value,
        display.currency_grouping,
        display.currency_symbol.as_deref(),
    ))
}

fn transaction_output(config: &ResolvedConfig, tx: &Transaction) -> TransactionOutput {
    TransactionOutput {
        id: tx.id.to_string(),
        kind: tx.kind.to_string(),
        category: tx.category.clone(),
        category_name: config.catalog.display_name(&tx.category, tx.kind),
        subcategory: tx.subcategory.clone(),
        amount: tx.amount,
        amount_display: amount_display(config, tx.amount),
        date: format_date(tx.date),
        user_id: tx.user_id.clone(),
        payment_method: tx.payment_method.clone(),
        memo: tx.memo.clone(),
        fixed_expense_id: tx.fixed_expense_id.as_ref().map(|id| id.to_string()),
        is_auto_registered: tx.is_auto_registered,
    }
}

/// Definition as stored, plus its escalated amount and due flag for `today`.
fn recurring_output(
    config: &ResolvedConfig,
    expense: RecurringExpense,
    today: NaiveDate,
) -> RecurringExpenseOutput {
    let current_amount = escalated_amount(&expense, today);
    RecurringExpenseOutput {
        id: expense.id.to_string(),
        category_name: config
            .catalog
            .display_name(&expense.category, TransactionType::Expense),
        current_amount,
        current_amount_display: amount_display(config, current_amount),
        due_today: is_due_on(&expense, today),
        unlimited: !expense.is_time_bounded(),
        start_date: expense.start_date.map(format_date),
        end_date: expense.end_date.map(format_date),
        name: expense.name,
        category: expense.category,
        amount: expense.amount,
        auto_register_date: expense.auto_register_date,
        monthly_increase: expense.monthly_increase,
        base_date: expense.base_date,
        active: expense.is_active,
    }
}

fn totals_output(config: &ResolvedConfig, totals: &MonthTotals) -> TotalsOutput {
    TotalsOutput {
        income: totals.income,
        saving: totals.saving,
        expense_gross: totals.expense_gross,
        expense_net: totals.expense_net,
        income_display: amount_display(config, totals.income),
        saving_display: amount_display(config, totals.saving),
        expense_net_display: amount_display(config, totals.expense_net),
    }
}
