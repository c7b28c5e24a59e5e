// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// PROPERTY-BASED TESTS — few-core
//
// Pricing invariants that MUST hold for ALL reserve/amount combinations:
// the pool never loses value to rounding, quotes are proportional, and
// derived addresses are stable.
//
// Run: cargo test --release -p few-core --test prop_amm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use few_core::amm::{get_amount_in, get_amount_out, quote};
use few_core::math::{isqrt, U256, U512};
use few_core::{derive_id, template_hash, Address, DexError};
use proptest::prelude::*;

// ─────────────────────────────────────────────────────────────────
// PRICING PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(2000))]

    /// Re-pricing the quoted output never asks for more than was paid (modulo ceiling).
    #[test]
    fn prop_amount_in_covers_amount_out(
        amount_in in 1u128..=u64::MAX as u128,
        reserve_in in 1u128..=u64::MAX as u128,
        reserve_out in 2u128..=u64::MAX as u128,
    ) {
        let out = get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        prop_assume!(out > 0);
        let needed = get_amount_in(out, reserve_in, reserve_out).unwrap();
        // the +1 rounding can overshoot the exact minimum by one unit at most
        prop_assert!(needed <= amount_in + 1);
        // and paying `needed` indeed yields at least `out`
        let again = get_amount_out(needed, reserve_in, reserve_out).unwrap();
        prop_assert!(again >= out);
    }

    /// The inverse direction: a minimal input round-trips to at least its target.
    #[test]
    fn prop_get_amount_in_never_undercharges(
        amount_out in 1u128..=u32::MAX as u128,
        reserve_in in 1u128..=u64::MAX as u128,
        extra in 1u128..=u64::MAX as u128,
    ) {
        let reserve_out = amount_out + extra;
        let needed = get_amount_in(amount_out, reserve_in, reserve_out).unwrap();
        prop_assert!(needed >= 1);
        let got = get_amount_out(needed, reserve_in, reserve_out).unwrap();
        prop_assert!(got >= amount_out);
    }

    /// Output is strictly below the output reserve.
    #[test]
    fn prop_amount_out_bounded_by_reserve(
        amount_in in 1u128..=u128::MAX / 2,
        reserve_in in 1u128..=u128::MAX / 2,
        reserve_out in 1u128..=u128::MAX,
    ) {
        let out = get_amount_out(amount_in, reserve_in, reserve_out).unwrap();
        prop_assert!(out < reserve_out);
    }

    #[test]
    fn prop_quote_proportional(
        amount in 1u128..=u64::MAX as u128,
        reserve in 1u128..=u64::MAX as u128,
    ) {
        prop_assert_eq!(quote(amount, reserve, reserve).unwrap(), amount);
        prop_assert_eq!(quote(amount, reserve, 2 * reserve).unwrap(), 2 * amount);
    }

    #[test]
    fn prop_zero_reserves_rejected(amount in 1u128..=u128::MAX) {
        prop_assert_eq!(get_amount_out(amount, 0, 1), Err(DexError::InsufficientLiquidity));
        prop_assert_eq!(quote(amount, 1, 0), Err(DexError::InsufficientLiquidity));
    }
}

// ─────────────────────────────────────────────────────────────────
// SQRT & IDENTITY PROPERTIES
// ─────────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn prop_isqrt_floor(a in 0u128..=u128::MAX, b in 0u128..=u128::MAX) {
        let n = U256::from(a) * U256::from(b);
        let r = isqrt(n);
        prop_assert!(U512::from(r) * U512::from(r) <= U512::from(n));
        let next = U512::from(r) + U512::one();
        prop_assert!(next * next > U512::from(n));
    }

    #[test]
    fn prop_derive_id_deterministic(seed in "[a-z]{1,16}", input in proptest::collection::vec(any::<u8>(), 1..64)) {
        let registry = Address::from_seed(&seed);
        let t = template_hash("FewWrappedToken");
        let a = derive_id(&registry, &input, &t);
        prop_assert_eq!(a, derive_id(&registry, &input, &t));
        prop_assert!(!a.is_zero());
    }
}
