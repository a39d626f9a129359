//! Dashboard and analytics aggregates.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use dar_koftan_core::{OrderId, OrderStatus, Price};
use serde::Serialize;
use sqlx::PgPool;

use super::RepositoryError;

/// Days covered by the revenue chart, today included.
pub const CHART_DAYS: u64 = 7;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_products: i64,
    pub total_orders: i64,
    pub total_revenue: Price,
    pub recent_orders: Vec<RecentOrder>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RecentOrder {
    pub id: OrderId,
    pub customer_name: String,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusStats {
    pub status: OrderStatus,
    pub count: i64,
    pub revenue: Price,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    /// Short weekday names, oldest first.
    pub labels: Vec<String>,
    pub data: Vec<Price>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TopProduct {
    pub name: String,
    pub sales: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    #[serde(flatten)]
    pub summary: DashboardSummary,
    pub orders_by_status: Vec<StatusStats>,
    pub sales_data: DailySales,
    pub sales_by_status: BTreeMap<String, Vec<Price>>,
    pub top_products: Vec<TopProduct>,
}

/// Revenue of one status on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct DayRevenue {
    pub day: NaiveDate,
    pub status: OrderStatus,
    pub revenue: Price,
}

/// Repository for dashboard aggregates.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    /// Create a new dashboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Counts, revenue and the five latest orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn summary(&self) -> Result<DashboardSummary, RepositoryError> {
        let total_products: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop.product")
            .fetch_one(self.pool)
            .await?;

        let (total_orders, total_revenue): (i64, Price) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_amount), 0) FROM shop.customer_order",
        )
        .fetch_one(self.pool)
        .await?;

        let recent_orders = sqlx::query_as::<_, RecentOrder>(
            r"
            SELECT id, customer_name, total_amount, status, created_at
            FROM shop.customer_order
            ORDER BY created_at DESC, id DESC
            LIMIT 5
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(DashboardSummary {
            total_products,
            total_orders,
            total_revenue,
            recent_orders,
        })
    }

    /// The summary plus per-status figures, the last week of revenue and
    /// the best-selling products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn analytics(&self, today: NaiveDate) -> Result<Analytics, RepositoryError> {
        let summary = self.summary().await?;

        let status_rows: Vec<(OrderStatus, i64, Price)> = sqlx::query_as(
            r"
            SELECT status, COUNT(*), COALESCE(SUM(total_amount), 0)
            FROM shop.customer_order
            GROUP BY status
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let first_day = today
            .checked_sub_days(Days::new(CHART_DAYS - 1))
            .unwrap_or(today);
        let daily = sqlx::query_as::<_, DayRevenue>(
            r"
            SELECT (created_at AT TIME ZONE 'UTC')::date AS day, status,
                   COALESCE(SUM(total_amount), 0) AS revenue
            FROM shop.customer_order
            WHERE (created_at AT TIME ZONE 'UTC')::date >= $1
            GROUP BY 1, 2
            ",
        )
        .bind(first_day)
        .fetch_all(self.pool)
        .await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            r"
            SELECT MAX(product_name) AS name, SUM(quantity)::BIGINT AS sales
            FROM shop.order_item
            GROUP BY product_id
            ORDER BY sales DESC
            LIMIT 5
            ",
        )
        .fetch_all(self.pool)
        .await?;

        let (sales_data, sales_by_status) = daily_sales(&daily, today);

        Ok(Analytics {
            summary,
            orders_by_status: stats_by_status(&status_rows),
            sales_data,
            sales_by_status,
            top_products,
        })
    }
}

/// One entry per status, zero-filled, in lifecycle order.
#[must_use]
pub fn stats_by_status(rows: &[(OrderStatus, i64, Price)]) -> Vec<StatusStats> {
    OrderStatus::ALL
        .into_iter()
        .map(|status| {
            rows.iter()
                .find(|(s, _, _)| *s == status)
                .map_or(
                    StatusStats {
                        status,
                        count: 0,
                        revenue: Price::ZERO,
                    },
                    |(_, count, revenue)| StatusStats {
                        status,
                        count: *count,
                        revenue: *revenue,
                    },
                )
        })
        .collect()
}

/// Fold per-day revenue into the chart window ending on `today`: the total
/// per day, and the same series split by status.
#[must_use]
pub fn daily_sales(
    rows: &[DayRevenue],
    today: NaiveDate,
) -> (DailySales, BTreeMap<String, Vec<Price>>) {
    let days: Vec<NaiveDate> = (0..CHART_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .collect();

    let revenue_on = |day: NaiveDate, status: Option<OrderStatus>| -> Price {
        rows.iter()
            .filter(|r| r.day == day && status.is_none_or(|s| s == r.status))
            .map(|r| r.revenue)
            .sum()
    };

    let sales = DailySales {
        labels: days.iter().map(|d| d.format("%a").to_string()).collect(),
        data: days.iter().map(|d| revenue_on(*d, None)).collect(),
    };

    let by_status = OrderStatus::ALL
        .into_iter()
        .map(|status| {
            let series = days.iter().map(|d| revenue_on(*d, Some(status))).collect();
            (status.to_string(), series)
        })
        .collect();

    (sales, by_status)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn dt(units: i64) -> Price {
        Price::new(Decimal::from(units))
    }

    #[test]
    fn test_stats_by_status_fills_missing_statuses() {
        let stats = stats_by_status(&[(OrderStatus::Shipped, 2, dt(300))]);

        assert_eq!(stats.len(), 5);
        assert_eq!(stats[0].status, OrderStatus::Pending);
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[2], StatusStats { status: OrderStatus::Shipped, count: 2, revenue: dt(300) });
    }

    #[test]
    fn test_daily_sales_window_ends_today() {
        // 2025-03-09 is a Sunday
        let today = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        let rows = vec![
            DayRevenue { day: today, status: OrderStatus::Pending, revenue: dt(100) },
            DayRevenue { day: today, status: OrderStatus::Delivered, revenue: dt(50) },
            DayRevenue {
                day: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
                status: OrderStatus::Confirmed,
                revenue: dt(20),
            },
            DayRevenue {
                day: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
                status: OrderStatus::Confirmed,
                revenue: dt(999),
            },
        ];

        let (sales, by_status) = daily_sales(&rows, today);

        assert_eq!(sales.labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(sales.data[0], dt(20));
        assert_eq!(sales.data[6], dt(150));
        assert_eq!(sales.data.iter().copied().sum::<Price>(), dt(170));
        assert_eq!(by_status["PENDING"][6], dt(100));
        assert_eq!(by_status["CANCELLED"], vec![Price::ZERO; 7]);
    }
}
