use anyhow::Result;

use crate::config::ResolvedConfig;
use crate::portfolio::summarize;
use crate::storage::Storage;

use super::{amount_display, HoldingOutput, PortfolioOutput};

/// Valuation of every stored holding at its user-entered price.
pub async fn portfolio(storage: &dyn Storage, config: &ResolvedConfig) -> Result<PortfolioOutput> {
    let holdings = storage.list_holdings().await?;
    let summary = summarize(&holdings);

    Ok(PortfolioOutput {
        holdings: summary
            .holdings
            .into_iter()
            .map(|h| HoldingOutput {
                id: h.id.to_string(),
                evaluation_display: amount_display(config, h.evaluation),
                symbol: h.symbol,
                name: h.name,
                quantity: h.quantity,
                average_price: h.average_price,
                current_price: h.current_price,
                invested: h.invested,
                evaluation: h.evaluation,
                profit: h.profit,
                return_pct: h.return_pct,
            })
            .collect(),
        total_invested: summary.total_invested,
        total_evaluation: summary.total_evaluation,
        total_profit: summary.total_profit,
        total_return_pct: summary.total_return_pct,
        total_evaluation_display: amount_display(config, summary.total_evaluation),
    })
}
