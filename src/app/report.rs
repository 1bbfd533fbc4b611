use anyhow::Result;

use crate::config::ResolvedConfig;
use crate::dates::MonthKey;
use crate::stats::{StatsEngine, MAX_TREND_MONTHS};
use crate::storage::Storage;

use super::{totals_output, ReportOutput, TrendOutput, TrendPointOutput};

fn engine(config: &ResolvedConfig) -> StatsEngine<'_> {
    StatsEngine::new(&config.catalog)
        .with_savings_category(config.stats.savings_category.clone())
        .with_budgets(config.budgets.clone())
}

/// Monthly summary with the previous month for comparison.
pub async fn monthly_report(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    month: MonthKey,
) -> Result<ReportOutput> {
    let txns = storage.list_transactions().await?;
    let recurring = storage.list_recurring_expenses().await?;

    let summary = engine(config).summary(&txns, &recurring, month);

    Ok(ReportOutput {
        month: summary.month.to_string(),
        totals: totals_output(config, &summary.totals),
        previous_month: summary.month.previous().to_string(),
        previous_totals: totals_output(config, &summary.previous_totals),
        comparison: summary.comparison,
        expense_by_category: summary.expense_by_category,
        income_by_category: summary.income_by_category,
        by_member: summary.by_member,
        fixed_expenses: summary.fixed_expenses,
        budgets: summary.budgets,
    })
}

/// Transaction-only totals for the `months` months ending at `end`.
pub async fn trend(
    storage: &dyn Storage,
    config: &ResolvedConfig,
    end: MonthKey,
    months: Option<usize>,
) -> Result<TrendOutput> {
    let months = months
        .unwrap_or(config.stats.trend_months)
        .clamp(1, MAX_TREND_MONTHS);
    let txns = storage.list_transactions().await?;

    let points: Vec<TrendPointOutput> = engine(config)
        .trend(&txns, end, months)
        .iter()
        .map(|p| TrendPointOutput {
            month: p.month.to_string(),
            totals: totals_output(config, &p.totals),
        })
        .collect();

    Ok(TrendOutput {
        start_month: end.offset(1 - months as i32).to_string(),
        end_month: end.to_string(),
        points,
    })
}
