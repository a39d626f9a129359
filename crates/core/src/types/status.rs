//! Order status and stock location enums.

use serde::{Deserialize, Serialize};

/// Lifecycle of a customer order.
///
/// Orders are created `PENDING` at checkout and then only move between
/// statuses through the admin API. Any transition is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.order_status", rename_all = "SCREAMING_SNAKE_CASE")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Confirmed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("invalid order status: {s}"))
    }
}

/// Where a stock row is counted.
///
/// The three shops hold physical inventory. `Online` is a synthetic
/// aggregate: its quantity is the sum of the physical rows for the same
/// product, color and size, recomputed by the aggregation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "shop.stock_location", rename_all = "lowercase")
)]
#[serde(rename_all = "lowercase")]
pub enum StockLocation {
    Monastir,
    Tunis,
    Sfax,
    Online,
}

impl StockLocation {
    /// Locations that hold real inventory.
    pub const PHYSICAL: [Self; 3] = [Self::Monastir, Self::Tunis, Self::Sfax];

    #[must_use]
    pub const fn is_online(self) -> bool {
        matches!(self, Self::Online)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monastir => "monastir",
            Self::Tunis => "tunis",
            Self::Sfax => "sfax",
            Self::Online => "online",
        }
    }
}

impl std::fmt::Display for StockLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StockLocation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monastir" => Ok(Self::Monastir),
            "tunis" => Ok(Self::Tunis),
            "sfax" => Ok(Self::Sfax),
            "online" => Ok(Self::Online),
            _ => Err(format!("invalid stock location: {s}")),
        }
    }
}
