//! Prices in Tunisian dinars.
//!
//! Stored as `NUMERIC(10,2)` and carried as [`Decimal`] so sums never pick up
//! float drift. Serialized as a JSON number, which is what the storefront
//! client does arithmetic on.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount in dinars (TND).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap an amount, rounded to two decimal places.
    #[must_use]
    pub fn new(amount: Decimal) -> Self {
        Self(amount.round_dp(2))
    }

    #[must_use]
    pub const fn amount(self) -> Decimal {
        self.0
    }

    #[must_use]
    pub fn is_negative(self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Line total for `quantity` units.
    #[must_use]
    pub fn times(self, quantity: i32) -> Self {
        Self::new(self.0 * Decimal::from(quantity))
    }

    /// Format the way receipts and SMS messages show it: `89.90 DT`.
    #[must_use]
    pub fn display_dt(self) -> String {
        format!("{:.2} DT", self.0)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self::new(amount)
    }
}

impl std::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self::new(iter.map(|p| p.0).sum())
    }
}

impl std::fmt::Display for Price {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        Ok(Self(<Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dt(s: &str) -> Price {
        Price::new(Decimal::from_str(s).unwrap())
    }

    #[test]
    fn test_display_dt_pads_decimals() {
        assert_eq!(dt("89.9").display_dt(), "89.90 DT");
        assert_eq!(dt("120").display_dt(), "120.00 DT");
    }

    #[test]
    fn test_times_and_sum() {
        let total: Price = [dt("45.50").times(2), dt("12.25")].into_iter().sum();
        assert_eq!(total, dt("103.25"));
    }

    #[test]
    fn test_json_is_a_number() {
        assert_eq!(serde_json::to_string(&dt("59.99")).unwrap(), "59.99");
        let parsed: Price = serde_json::from_str("120.5").unwrap();
        assert_eq!(parsed, dt("120.50"));
    }

    #[test]
    fn test_is_negative() {
        assert!(dt("-1").is_negative());
        assert!(!Price::ZERO.is_negative());
    }
}
