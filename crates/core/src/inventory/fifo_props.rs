//! Property-based tests for inventory costing.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tally_shared::types::{InventoryLotId, ProductId};

use super::average::moving_average_cost;
use super::error::InventoryError;
use super::fifo::{FifoCosting, LotBalance};

fn arb_quantity() -> impl Strategy<Value = Decimal> {
    (1i64..10_000i64).prop_map(|n| Decimal::new(n, 1))
}

fn arb_unit_cost() -> impl Strategy<Value = Decimal> {
    (0i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_lots() -> impl Strategy<Value = Vec<LotBalance>> {
    prop::collection::vec((arb_quantity(), arb_unit_cost()), 1..8).prop_map(|rows| {
        rows.into_iter()
            .map(|(remaining, unit_cost)| LotBalance {
                lot_id: InventoryLotId::new(),
                remaining,
                unit_cost,
            })
            .collect()
    })
}

// ============================================================================
// FIFO Consumption
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 6.1: FIFO cost equals the sum of per-lot draws**
    ///
    /// *For any* lots and any quantity within stock, the consumed cost SHALL
    /// equal the sum of `quantity * unit_cost` over the draws, and the draws
    /// SHALL account for exactly the requested quantity.
    #[test]
    fn prop_fifo_cost_is_sum_of_draws(lots in arb_lots(), pct in 1u32..=100u32) {
        let available = FifoCosting::available(&lots);
        let quantity = (available * Decimal::from(pct) / Decimal::from(100)).round_dp(1);
        prop_assume!(quantity > Decimal::ZERO);

        let result = FifoCosting::consume(ProductId::new(), &lots, quantity).unwrap();
        let drawn: Decimal = result.draws.iter().map(|d| d.quantity).sum();
        let cost: Decimal = result.draws.iter().map(|d| d.quantity * d.unit_cost).sum();

        prop_assert_eq!(drawn, quantity);
        prop_assert_eq!(result.cost, cost);
    }

    /// **Property 6.2: Older lots are exhausted before newer lots are touched**
    #[test]
    fn prop_fifo_consumes_oldest_first(lots in arb_lots(), pct in 1u32..=100u32) {
        let available = FifoCosting::available(&lots);
        let quantity = (available * Decimal::from(pct) / Decimal::from(100)).round_dp(1);
        prop_assume!(quantity > Decimal::ZERO);

        let result = FifoCosting::consume(ProductId::new(), &lots, quantity).unwrap();
        for (i, draw) in result.draws.iter().enumerate() {
            prop_assert_eq!(draw.lot_id, lots[i].lot_id);
            if i + 1 < result.draws.len() {
                prop_assert!(draw.exhausts_lot());
            }
        }
    }

    /// **Property 6.3: Consuming more than the stock on hand fails**
    #[test]
    fn prop_fifo_oversell_rejected(lots in arb_lots(), extra in arb_quantity()) {
        let available = FifoCosting::available(&lots);
        let result = FifoCosting::consume(ProductId::new(), &lots, available + extra);
        let is_shortage = matches!(result, Err(InventoryError::Shortage { .. }));
        prop_assert!(is_shortage);
    }
}

// ============================================================================
// Moving Average
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 7.1: The moving average lies between the old and new cost**
    #[test]
    fn prop_average_is_bounded(
        old_cost in arb_unit_cost(),
        old_qty in arb_quantity(),
        new_cost in arb_unit_cost(),
        new_qty in arb_quantity(),
    ) {
        let avg = moving_average_cost(old_cost, old_qty, new_cost, new_qty);
        prop_assert!(avg >= old_cost.min(new_cost));
        prop_assert!(avg <= old_cost.max(new_cost));
    }
}
