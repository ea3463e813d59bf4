//! Charge computation for the checkout flow.
//!
//! Nominal amounts are decimal stable-token units; conversions to raw token
//! units round half away from zero, and the 50% coupon discount halves raw
//! units with ceiling division so a nonzero charge never rounds to zero.

use crate::domain::{CheckoutQuery, Product};

/// Coupon balance (whole coupon units) required for the 50% discount
pub const COUPON_DISCOUNT_THRESHOLD: u64 = 5;

/// Whole coupon units redeemed when the discount applies
pub const COUPONS_REDEEMED: u64 = 5;

/// Whole coupon units accrued on a full-price purchase
pub const COUPONS_EARNED: u64 = 1;

/// Total nominal charge: Σ quantity × unit price over the catalog
#[must_use]
pub fn compute_amount(catalog: &[Product], query: &CheckoutQuery) -> f64 {
    catalog
        .iter()
        .map(|product| query.quantity(product.id) as f64 * product.price)
        .sum()
}

/// Convert a nominal decimal amount to raw token units
#[must_use]
pub fn to_base_units(amount: f64, decimals: u8) -> u64 {
    (amount * 10f64.powi(decimals as i32)).round() as u64
}

/// Halve a raw charge for the coupon discount, rounding up
#[must_use]
pub fn apply_discount(raw_amount: u64) -> u64 {
    raw_amount.div_ceil(2)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: "cookie",
                name: "Cookie",
                price: 2.5,
            },
            Product {
                id: "box",
                name: "Box of Cookies",
                price: 10.0,
            },
        ]
    }

    fn query(pairs: &[(&str, &str)]) -> CheckoutQuery {
        let params: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CheckoutQuery::from_params(params)
    }

    #[test]
    fn test_compute_amount_sums_quantities() {
        let amount = compute_amount(&catalog(), &query(&[("cookie", "2"), ("box", "1")]));
        assert_eq!(amount, 15.0);
    }

    #[test]
    fn test_compute_amount_empty_query_is_zero() {
        let amount = compute_amount(&catalog(), &query(&[]));
        assert_eq!(amount, 0.0);
    }

    #[test]
    fn test_compute_amount_ignores_unknown_items() {
        let amount = compute_amount(&catalog(), &query(&[("cake", "4"), ("box", "1")]));
        assert_eq!(amount, 10.0);
    }

    #[test]
    fn test_compute_amount_ignores_unparseable_quantities() {
        let amount = compute_amount(&catalog(), &query(&[("box", "lots")]));
        assert_eq!(amount, 0.0);
    }

    #[test]
    fn test_to_base_units() {
        assert_eq!(to_base_units(10.0, 6), 10_000_000);
        assert_eq!(to_base_units(2.5, 6), 2_500_000);
        assert_eq!(to_base_units(5.0, 0), 5);
        assert_eq!(to_base_units(0.000001, 6), 1);
    }

    #[test]
    fn test_apply_discount_exact_half() {
        assert_eq!(apply_discount(10_000_000), 5_000_000);
    }

    #[test]
    fn test_apply_discount_rounds_up_at_boundaries() {
        // odd raw charges round in the shop's favor
        assert_eq!(apply_discount(3), 2);
        assert_eq!(apply_discount(1), 1);
        assert_eq!(apply_discount(0), 0);
    }
}
