use approx::assert_relative_eq;
use proptest::prelude::*;

use trade_ranker::data::{parse, HistoryStatus};
use trade_ranker::ranking::composite_rank;
use trade_ranker::{AccountRecord, MetricsCalculator, NormalizedTrade, Ranker};

fn trade_strategy() -> impl Strategy<Value = NormalizedTrade> {
    (-5i32..=5, -1_000i32..=1_000).prop_map(|(quantity, profit)| NormalizedTrade {
        quantity: quantity as f64,
        realized_profit: profit as f64 / 4.0,
        ..Default::default()
    })
}

fn trades_strategy() -> impl Strategy<Value = Vec<NormalizedTrade>> {
    prop::collection::vec(trade_strategy(), 0..40)
}

proptest! {
    #[test]
    fn metrics_ignore_trade_order(
        (trades, shuffled) in trades_strategy()
            .prop_flat_map(|t| (Just(t.clone()), Just(t).prop_shuffle()))
    ) {
        let a = MetricsCalculator::calculate(&trades);
        let b = MetricsCalculator::calculate(&shuffled);

        prop_assert_eq!(a.total_trades, b.total_trades);
        prop_assert_eq!(a.winning_trades, b.winning_trades);
        assert_relative_eq!(a.roi, b.roi, epsilon = 1e-9, max_relative = 1e-9);
        assert_relative_eq!(a.pnl, b.pnl, epsilon = 1e-9, max_relative = 1e-9);
        prop_assert_eq!(a.win_rate, b.win_rate);
        assert_relative_eq!(a.sharpe_ratio, b.sharpe_ratio, epsilon = 1e-9, max_relative = 1e-9);
    }

    #[test]
    fn pnl_is_sum_of_all_profits(trades in trades_strategy()) {
        let expected: f64 = trades.iter().map(|t| t.realized_profit).fold(0.0, |a, b| a + b);
        prop_assert_eq!(MetricsCalculator::pnl(&trades), expected);
    }

    #[test]
    fn roi_ignores_non_positive_quantity(trades in trades_strategy()) {
        let positioned: Vec<_> = trades.iter().filter(|t| t.quantity > 0.0).cloned().collect();
        prop_assert_eq!(MetricsCalculator::roi(&trades), MetricsCalculator::roi(&positioned));
    }

    #[test]
    fn win_rate_in_unit_interval(trades in trades_strategy()) {
        let win_rate = MetricsCalculator::win_rate(&trades);
        prop_assert!((0.0..=1.0).contains(&win_rate));
        let any_winner = trades.iter().any(|t| t.realized_profit > 0.0);
        prop_assert_eq!(win_rate == 0.0, !any_winner);
    }

    #[test]
    fn sharpe_zero_without_sample_or_variance(trades in trades_strategy(), profit in -1_000i32..1_000) {
        let positioned = trades.iter().filter(|t| t.quantity > 0.0).count();
        if positioned < 2 {
            prop_assert_eq!(MetricsCalculator::sharpe_ratio(&trades), 0.0);
        }

        // Tenths are mostly inexact in binary.
        let profit = profit as f64 / 10.0;
        let flat: Vec<_> = trades
            .iter()
            .map(|t| NormalizedTrade { realized_profit: profit, ..t.clone() })
            .collect();
        prop_assert_eq!(MetricsCalculator::sharpe_ratio(&flat), 0.0);
    }

    #[test]
    fn sharpe_zero_for_identical_fractional_profits(
        count in 3usize..40,
        quantities in prop::collection::vec(1i32..=5, 40),
        profit in -1_000i32..1_000,
    ) {
        let profit = profit as f64 / 10.0;
        let trades: Vec<_> = quantities[..count]
            .iter()
            .map(|q| NormalizedTrade {
                quantity: *q as f64,
                realized_profit: profit,
                ..Default::default()
            })
            .collect();
        prop_assert_eq!(MetricsCalculator::sharpe_ratio(&trades), 0.0);
    }

    #[test]
    fn ranking_is_non_increasing_and_complete(
        histories in prop::collection::vec(trades_strategy(), 0..30),
        top in 0usize..40,
    ) {
        let accounts: Vec<_> = histories
            .into_iter()
            .enumerate()
            .map(|(i, trades)| {
                AccountRecord::new(format!("acc-{}", i), i, trades, HistoryStatus::Parsed { skipped: 0 })
            })
            .collect();
        let count = accounts.len();

        let ranked = Ranker::rank_accounts(accounts);
        prop_assert_eq!(ranked.len(), count);
        prop_assert!(ranked.windows(2).all(|w| w[0].rank() >= w[1].rank()));
        for account in &ranked {
            prop_assert_eq!(account.rank(), composite_rank(account.metrics()));
        }

        // Ties keep input order.
        for w in ranked.windows(2) {
            if w[0].rank() == w[1].rank() {
                prop_assert!(w[0].account().row_index < w[1].account().row_index);
            }
        }

        prop_assert_eq!(Ranker::top_n(&ranked, top).len(), top.min(count));
    }

    #[test]
    fn parser_never_fails(raw in ".{0,200}") {
        let trades = parse(Some(raw.as_str()));
        let metrics = MetricsCalculator::calculate(&trades);
        prop_assert!(metrics.roi.is_finite());
        prop_assert!(metrics.pnl.is_finite());
    }
}

#[test]
fn unparsable_history_has_zero_metrics() {
    for raw in [None, Some(""), Some("[]"), Some("{{{"), Some("'just a string'")] {
        let metrics = MetricsCalculator::calculate(&parse(raw));
        assert_eq!(metrics.roi, 0.0);
        assert_eq!(metrics.pnl, 0.0);
        assert_eq!(metrics.win_rate, 0.0);
        assert_eq!(metrics.sharpe_ratio, 0.0);
    }
}
