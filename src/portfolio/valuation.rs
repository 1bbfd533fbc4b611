use crate::models::Holding;
use crate::stats::percent_of;

use super::{HoldingValuation, PortfolioSummary};

pub fn value_holding(holding: &Holding) -> HoldingValuation {
    let invested = holding.quantity * holding.average_price;
    let evaluation = holding.quantity * holding.current_price;
    let profit = evaluation - invested;
    HoldingValuation {
        id: holding.id.clone(),
        symbol: holding.symbol.clone(),
        name: holding.name.clone(),
        quantity: holding.quantity,
        average_price: holding.average_price,
        current_price: holding.current_price,
        invested,
        evaluation,
        profit,
        return_pct: percent_of(profit, invested),
    }
}

/// Value every holding, largest evaluation first, with portfolio totals.
pub fn summarize(holdings: &[Holding]) -> PortfolioSummary {
    let mut valued: Vec<HoldingValuation> = holdings.iter().map(value_holding).collect();
    valued.sort_by(|a, b| {
        b.evaluation
            .cmp(&a.evaluation)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });

    let total_invested: i64 = valued.iter().map(|h| h.invested).sum();
    let total_evaluation: i64 = valued.iter().map(|h| h.evaluation).sum();
    let total_profit = total_evaluation - total_invested;

    PortfolioSummary {
        holdings: valued,
        total_invested,
        total_evaluation,
        total_profit,
        total_return_pct: percent_of(total_profit, total_invested),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_profit_and_return() {
        let h = Holding::new("005930", 10, 70_000).with_current_price(77_000);
        let v = value_holding(&h);
        assert_eq!(v.invested, 700_000);
        assert_eq!(v.evaluation, 770_000);
        assert_eq!(v.profit, 70_000);
        assert_eq!(v.return_pct, 10.0);
    }

    #[test]
    fn zero_cost_basis_has_zero_return() {
        let h = Holding::new("GIFT", 3, 0).with_current_price(100);
        assert_eq!(value_holding(&h).return_pct, 0.0);
    }

    #[test]
    fn summary_totals_and_orders_by_evaluation() {
        let holdings = vec![
            Holding::new("AAA", 1, 100).with_current_price(50),
            Holding::new("BBB", 2, 100).with_current_price(150),
        ];
        let summary = summarize(&holdings);
        assert_eq!(summary.holdings[0].symbol, "BBB");
        assert_eq!(summary.total_invested, 300);
        assert_eq!(summary.total_evaluation, 350);
        assert_eq!(summary.total_profit, 50);
        assert!((summary.total_return_pct - 50.0 / 3.0).abs() < 1e-9);
        assert!(summarize(&[]).holdings.is_empty());
    }
}
