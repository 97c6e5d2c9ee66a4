//! Property-based tests for DepreciationService.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::DepreciationService;

fn arb_value() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|n| Decimal::new(n, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// **Property 9.1: Accumulated depreciation never exceeds acquisition value**
    ///
    /// *For any* asset, charging month after month until no charge remains
    /// SHALL end with accumulated depreciation equal to the acquisition value
    /// and never above it.
    #[test]
    fn prop_accumulated_never_exceeds_value(value in arb_value(), rate in arb_rate()) {
        prop_assume!(DepreciationService::monthly_amount(value, rate) > Decimal::ZERO);

        let mut accumulated = Decimal::ZERO;
        let mut months = 0u32;

        while let Some(charge) = DepreciationService::charge(value, rate, accumulated) {
            prop_assert!(charge.amount > Decimal::ZERO);
            prop_assert!(charge.accumulated <= value);
            prop_assert_eq!(charge.book_value, value - charge.accumulated);
            accumulated = charge.accumulated;
            months += 1;
            prop_assert!(months <= 20_000);
        }

        prop_assert_eq!(accumulated, value);
    }
}
