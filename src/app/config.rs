use std::path::Path;

use crate::config::ResolvedConfig;

pub fn config_output(config_path: &Path, config: &ResolvedConfig) -> serde_json::Value {
    let budgets: serde_json::Map<String, serde_json::Value> = config
        .budgets
        .iter()
        .map(|(category, amount)| (category.to_string(), serde_json::Value::from(amount)))
        .collect();

    serde_json::json!({
        "config_file": config_path.display().to_string(),
        "data_directory": config.data_dir.display().to_string(),
        "user_id": config.user_id,
        "timezone": config.zone.label(),
        "stats": {
            "savings_category": config.stats.savings_category,
            "trend_months": config.stats.trend_months
        },
        "display": {
            "currency_grouping": config.display.currency_grouping,
            "currency_symbol": config.display.currency_symbol
        },
        "budgets": budgets,
        "categories": config.catalog.iter().collect::<Vec<_>>()
    })
}
