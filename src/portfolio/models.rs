use serde::Serialize;

use crate::models::Id;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingValuation {
    pub id: Id,
    pub symbol: String,
    pub name: String,
    pub quantity: i64,
    pub average_price: i64,
    pub current_price: i64,
    /// quantity * average_price
    pub invested: i64,
    /// quantity * current_price
    pub evaluation: i64,
    pub profit: i64,
    pub return_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingValuation>,
    pub total_invested: i64,
    pub total_evaluation: i64,
    pub total_profit: i64,
    pub total_return_pct: f64,
}
