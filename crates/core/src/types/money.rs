//! Money formatting and rental pricing.
//!
//! Rental products carry an optional price per hour, day, week, month and
//! year, plus the unit the seller advertises (`price_unit`). Quotes are
//! computed from the advertised unit, rounding partial units up.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Billing unit of a rental price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RentalUnit {
    Hour,
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl RentalUnit {
    /// All units, shortest first.
    pub const ALL: [Self; 5] = [Self::Hour, Self::Day, Self::Week, Self::Month, Self::Year];

    /// Wire value used by the backend (`hour`, `day`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Human label ("Per Day").
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hour => "Per Hour",
            Self::Day => "Per Day",
            Self::Week => "Per Week",
            Self::Month => "Per Month",
            Self::Year => "Per Year",
        }
    }

    /// Nominal length of one unit. Months are 30 days, years 365.
    #[must_use]
    pub const fn nominal_duration(self) -> TimeDelta {
        match self {
            Self::Hour => TimeDelta::hours(1),
            Self::Day => TimeDelta::days(1),
            Self::Week => TimeDelta::weeks(1),
            Self::Month => TimeDelta::days(30),
            Self::Year => TimeDelta::days(365),
        }
    }

    /// Number of whole units needed to cover `span`, rounding up.
    ///
    /// Returns 0 for zero or negative spans.
    #[must_use]
    pub fn units_covering(self, span: TimeDelta) -> i64 {
        let unit = self.nominal_duration().num_seconds();
        let secs = span.num_seconds();
        if secs <= 0 {
            return 0;
        }
        (secs + unit - 1) / unit
    }
}

impl std::fmt::Display for RentalUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RentalUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" => Ok(Self::Hour),
            "day" | "daily" => Ok(Self::Day),
            "week" | "weekly" => Ok(Self::Week),
            "month" | "monthly" => Ok(Self::Month),
            "year" | "yearly" => Ok(Self::Year),
            other => Err(format!("invalid rental unit: {other}")),
        }
    }
}

/// Errors from [`RentalRates::quote`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// The rental period ends at or before its start.
    #[error("end date must be after start date")]
    EmptyPeriod,
    /// A quantity of zero was requested.
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    /// The product has no price for the requested unit.
    #[error("no {0} price set for this product")]
    NoRate(RentalUnit),
}

/// Prices per rental unit, as listed by the seller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalRates {
    pub per_hour: Option<Decimal>,
    pub per_day: Option<Decimal>,
    pub per_week: Option<Decimal>,
    pub per_month: Option<Decimal>,
    pub per_year: Option<Decimal>,
}

impl RentalRates {
    /// Price for one unit, if the seller set one.
    #[must_use]
    pub const fn rate(&self, unit: RentalUnit) -> Option<Decimal> {
        match unit {
            RentalUnit::Hour => self.per_hour,
            RentalUnit::Day => self.per_day,
            RentalUnit::Week => self.per_week,
            RentalUnit::Month => self.per_month,
            RentalUnit::Year => self.per_year,
        }
    }

    /// Set the price for one unit.
    pub fn set(&mut self, unit: RentalUnit, price: Option<Decimal>) {
        match unit {
            RentalUnit::Hour => self.per_hour = price,
            RentalUnit::Day => self.per_day = price,
            RentalUnit::Week => self.per_week = price,
            RentalUnit::Month => self.per_month = price,
            RentalUnit::Year => self.per_year = price,
        }
    }

    /// Every unit that has a price, shortest first.
    #[must_use]
    pub fn listed(&self) -> Vec<(RentalUnit, Decimal)> {
        RentalUnit::ALL
            .into_iter()
            .filter_map(|unit| self.rate(unit).map(|price| (unit, price)))
            .collect()
    }

    /// Display string like `$240.00/day` for the advertised unit, falling
    /// back to the first listed unit.
    #[must_use]
    pub fn headline(&self, unit: RentalUnit) -> Option<String> {
        self.rate(unit)
            .map(|price| (unit, price))
            .or_else(|| self.listed().into_iter().next())
            .map(|(unit, price)| format!("{}/{}", format_money(price), unit))
    }

    /// Quote a rental of `quantity` items between `start` and `end`.
    ///
    /// # Errors
    ///
    /// Returns an error when the period is empty, the quantity is zero, or
    /// the product has no price for `unit`.
    pub fn quote(
        &self,
        unit: RentalUnit,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        quantity: u32,
    ) -> Result<Decimal, QuoteError> {
        if end <= start {
            return Err(QuoteError::EmptyPeriod);
        }
        if quantity == 0 {
            return Err(QuoteError::ZeroQuantity);
        }
        let rate = self.rate(unit).ok_or(QuoteError::NoRate(unit))?;
        let units = unit.units_covering(end - start);
        Ok(rate * Decimal::from(units) * Decimal::from(quantity))
    }
}

/// Format an amount as dollars with two decimals and thousands separators.
///
/// ```
/// use rust_decimal::Decimal;
/// use rentalhub_core::format_money;
///
/// assert_eq!(format_money(Decimal::new(4523050, 2)), "$45,230.50");
/// assert_eq!(format_money(Decimal::new(-5, 1)), "-$0.50");
/// ```
#[must_use]
pub fn format_money(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn daily(price: i64) -> RentalRates {
        RentalRates {
            per_day: Some(Decimal::from(price)),
            ..RentalRates::default()
        }
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
        assert_eq!(format_money(Decimal::from(240)), "$240.00");
        assert_eq!(format_money(Decimal::new(123_456_789, 2)), "$1,234,567.89");
        assert_eq!(format_money(Decimal::new(-1_250, 0)), "-$1,250.00");
    }

    #[test]
    fn test_units_covering_rounds_up() {
        assert_eq!(RentalUnit::Day.units_covering(TimeDelta::hours(24)), 1);
        assert_eq!(RentalUnit::Day.units_covering(TimeDelta::hours(25)), 2);
        assert_eq!(RentalUnit::Week.units_covering(TimeDelta::days(8)), 2);
        assert_eq!(RentalUnit::Hour.units_covering(TimeDelta::zero()), 0);
    }

    #[test]
    fn test_quote_daily() {
        let quote = daily(240).quote(RentalUnit::Day, at(10, 0), at(12, 0), 2).unwrap();
        assert_eq!(quote, Decimal::from(960));
    }

    #[test]
    fn test_quote_partial_day_rounds_up() {
        let quote = daily(100).quote(RentalUnit::Day, at(10, 0), at(11, 6), 1).unwrap();
        assert_eq!(quote, Decimal::from(200));
    }

    #[test]
    fn test_quote_errors() {
        let rates = daily(100);
        assert_eq!(
            rates.quote(RentalUnit::Day, at(12, 0), at(10, 0), 1),
            Err(QuoteError::EmptyPeriod)
        );
        assert_eq!(
            rates.quote(RentalUnit::Day, at(10, 0), at(12, 0), 0),
            Err(QuoteError::ZeroQuantity)
        );
        assert_eq!(
            rates.quote(RentalUnit::Week, at(10, 0), at(12, 0), 1),
            Err(QuoteError::NoRate(RentalUnit::Week))
        );
    }

    #[test]
    fn test_headline_falls_back_to_listed_unit() {
        let rates = RentalRates {
            per_week: Some(Decimal::from(500)),
            ..RentalRates::default()
        };
        assert_eq!(rates.headline(RentalUnit::Day).unwrap(), "$500.00/week");
        assert_eq!(daily(80).headline(RentalUnit::Day).unwrap(), "$80.00/day");
        assert!(RentalRates::default().headline(RentalUnit::Day).is_none());
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("Daily".parse::<RentalUnit>().unwrap(), RentalUnit::Day);
        assert_eq!("month".parse::<RentalUnit>().unwrap(), RentalUnit::Month);
        assert!("fortnight".parse::<RentalUnit>().is_err());
    }
}
