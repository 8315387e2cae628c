//! Wishlist totals.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Share of the wishlist value shown as the estimated rental saving.
pub const SAVINGS_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// The priced part of one wishlist entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WishlistLine {
    /// Price of one unit at the product's advertised rental unit. Entries
    /// without a price count towards quantity only.
    pub unit_price: Option<Decimal>,
    pub quantity: u32,
}

/// Aggregates shown above the wishlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistSummary {
    pub items: usize,
    pub total_quantity: u32,
    pub total_value: Decimal,
    pub estimated_savings: Decimal,
}

impl WishlistSummary {
    #[must_use]
    pub fn from_lines(lines: &[WishlistLine]) -> Self {
        let total_quantity = lines
            .iter()
            .fold(0u32, |acc, line| acc.saturating_add(line.quantity));
        let total_value: Decimal = lines
            .iter()
            .filter_map(|line| line.unit_price.map(|price| price * Decimal::from(line.quantity)))
            .sum();

        Self {
            items: lines.len(),
            total_quantity,
            total_value,
            estimated_savings: (total_value * SAVINGS_RATE).round_dp(2),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(price: Option<i64>, quantity: u32) -> WishlistLine {
        WishlistLine {
            unit_price: price.map(Decimal::from),
            quantity,
        }
    }

    #[test]
    fn test_empty_summary() {
        let summary = WishlistSummary::from_lines(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.total_value, Decimal::ZERO);
        assert_eq!(summary.estimated_savings, Decimal::ZERO);
    }

    #[test]
    fn test_totals_and_savings() {
        let summary = WishlistSummary::from_lines(&[line(Some(250), 2), line(Some(99), 1)]);
        assert_eq!(summary.items, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_value, Decimal::from(599));
        assert_eq!(summary.estimated_savings, Decimal::new(5990, 2));
    }

    #[test]
    fn test_unpriced_lines_count_quantity_only() {
        let summary = WishlistSummary::from_lines(&[line(None, 4), line(Some(10), 1)]);
        assert_eq!(summary.total_quantity, 5);
        assert_eq!(summary.total_value, Decimal::from(10));
        assert_eq!(summary.estimated_savings, Decimal::from(1));
    }

    #[test]
    fn test_savings_rate() {
        assert_eq!(SAVINGS_RATE, Decimal::new(10, 2));
    }
}
