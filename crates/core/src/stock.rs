//! Stock ledger policies.
//!
//! The `online` location is not counted by hand. Its rows are derived from
//! the physical shops: for each (product, color, size) the online quantity
//! is the sum of the monastir, tunis and sfax rows. These functions decide
//! what to write; the binaries own the transactions that write it.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::types::{ColorVariantId, ProductId, Stock, StockId, StockLocation};

/// Identifies one size of one color of one product across all locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StockKey {
    pub product_id: ProductId,
    pub color_id: ColorVariantId,
    pub size: String,
}

impl StockKey {
    #[must_use]
    pub fn of(stock: &Stock) -> Self {
        Self {
            product_id: stock.product_id,
            color_id: stock.color_id,
            size: stock.size.clone(),
        }
    }
}

/// An online row the sweep should insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOnlineStock {
    pub key: StockKey,
    pub quantity: i32,
}

/// What one aggregation sweep will do.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnlineStockPlan {
    /// Keys with physical stock and no online row, in key order.
    pub to_create: Vec<NewOnlineStock>,
    /// Keys with physical stock whose online row already exists.
    pub skipped: usize,
}

/// Summary returned by the sweep endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregationSummary {
    pub created: usize,
    pub skipped: usize,
}

impl From<&OnlineStockPlan> for AggregationSummary {
    fn from(plan: &OnlineStockPlan) -> Self {
        Self {
            created: plan.to_create.len(),
            skipped: plan.skipped,
        }
    }
}

/// Plan the online rows missing from `rows`.
///
/// Existing online rows are never touched, even when they no longer match
/// the physical sum. Keys that only have an online row are ignored.
#[must_use]
pub fn plan_online_stock(rows: &[Stock]) -> OnlineStockPlan {
    let mut physical: BTreeMap<StockKey, i32> = BTreeMap::new();
    let mut has_online: BTreeSet<StockKey> = BTreeSet::new();

    for row in rows {
        let key = StockKey::of(row);
        if row.location.is_online() {
            has_online.insert(key);
        } else {
            let total = physical.entry(key).or_insert(0);
            *total = total.saturating_add(row.quantity);
        }
    }

    let mut plan = OnlineStockPlan::default();
    for (key, quantity) in physical {
        if has_online.contains(&key) {
            plan.skipped += 1;
        } else {
            plan.to_create.push(NewOnlineStock { key, quantity });
        }
    }
    plan
}

/// Why a batch stock update was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BatchUpdateError {
    #[error("quantity for stock {0} cannot be negative")]
    NegativeQuantity(StockId),
    #[error("no valid stock updates provided")]
    NothingToUpdate,
}

/// Keep the requested updates that target an existing physical row.
///
/// `existing` maps each known stock id to its location. Unknown ids and
/// online rows are dropped without error. A negative quantity anywhere in the
/// request rejects the whole batch. The result is sorted by id so concurrent
/// batches lock rows in the same order.
///
/// # Errors
///
/// Returns [`BatchUpdateError::NegativeQuantity`] for any negative quantity
/// and [`BatchUpdateError::NothingToUpdate`] when nothing survives filtering.
pub fn filter_batch_updates(
    requested: &HashMap<StockId, i32>,
    existing: &HashMap<StockId, StockLocation>,
) -> Result<Vec<(StockId, i32)>, BatchUpdateError> {
    if let Some((id, _)) = requested
        .iter()
        .filter(|(_, quantity)| **quantity < 0)
        .min_by_key(|(id, _)| **id)
    {
        return Err(BatchUpdateError::NegativeQuantity(*id));
    }

    let mut valid: Vec<(StockId, i32)> = requested
        .iter()
        .filter(|(id, _)| existing.get(id).is_some_and(|location| !location.is_online()))
        .map(|(id, quantity)| (*id, *quantity))
        .collect();

    if valid.is_empty() {
        return Err(BatchUpdateError::NothingToUpdate);
    }

    valid.sort_unstable_by_key(|(id, _)| *id);
    Ok(valid)
}

/// Starting rows for a new color variant: `per_location` units of every size
/// at each physical shop, plus the online row holding their sum.
#[must_use]
pub fn initial_stock(sizes: &[String], per_location: i32) -> Vec<(String, StockLocation, i32)> {
    let physical_count = i32::try_from(StockLocation::PHYSICAL.len()).unwrap_or(i32::MAX);
    let online_total = per_location.saturating_mul(physical_count);

    sizes
        .iter()
        .flat_map(|size| {
            StockLocation::PHYSICAL
                .into_iter()
                .map(move |location| (size.clone(), location, per_location))
                .chain(std::iter::once((size.clone(), StockLocation::Online, online_total)))
        })
        .collect()
}

/// Units each physical shop starts with for a new variant.
pub const INITIAL_QUANTITY_PER_LOCATION: i32 = 5;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::catalog::fixtures::stock;
    use crate::types::StockLocation::{Monastir, Online, Sfax, Tunis};

    #[test]
    fn test_plan_creates_sum_of_physical_rows() {
        let rows = vec![
            stock(1, 1, 10, "M", Monastir, 2),
            stock(2, 1, 10, "M", Tunis, 3),
            stock(3, 1, 10, "M", Sfax, 4),
        ];

        let plan = plan_online_stock(&rows);

        assert_eq!(plan.skipped, 0);
        assert_eq!(plan.to_create.len(), 1);
        assert_eq!(plan.to_create[0].quantity, 9);
        assert_eq!(plan.to_create[0].key.size, "M");
    }

    #[test]
    fn test_plan_never_touches_existing_online_row() {
        // Online row has drifted from the physical sum of 7
        let rows = vec![
            stock(1, 1, 10, "S", Monastir, 4),
            stock(2, 1, 10, "S", Tunis, 3),
            stock(3, 1, 10, "S", Online, 100),
        ];

        let plan = plan_online_stock(&rows);

        assert!(plan.to_create.is_empty());
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_plan_keys_by_product_color_and_size() {
        let rows = vec![
            stock(1, 1, 10, "S", Tunis, 1),
            stock(2, 1, 10, "M", Tunis, 2),
            stock(3, 1, 11, "S", Tunis, 4),
            stock(4, 2, 20, "S", Tunis, 8),
            stock(5, 1, 11, "S", Online, 4),
        ];

        let plan = plan_online_stock(&rows);
        let created: Vec<(i32, i32, &str, i32)> = plan
            .to_create
            .iter()
            .map(|n| {
                (
                    n.key.product_id.as_i32(),
                    n.key.color_id.as_i32(),
                    n.key.size.as_str(),
                    n.quantity,
                )
            })
            .collect();

        assert_eq!(created, vec![(1, 10, "M", 2), (1, 10, "S", 1), (2, 20, "S", 8)]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_plan_ignores_online_only_keys_and_empty_input() {
        let rows = vec![stock(1, 1, 10, "L", Online, 3)];
        assert_eq!(plan_online_stock(&rows), OnlineStockPlan::default());
        assert_eq!(plan_online_stock(&[]), OnlineStockPlan::default());
    }

    #[test]
    fn test_plan_with_zero_physical_stock_creates_zero_row() {
        let rows = vec![stock(1, 1, 10, "XL", Sfax, 0)];
        let plan = plan_online_stock(&rows);
        assert_eq!(plan.to_create[0].quantity, 0);
    }

    #[test]
    fn test_summary_from_plan() {
        let rows = vec![
            stock(1, 1, 10, "S", Tunis, 1),
            stock(2, 1, 10, "M", Tunis, 1),
            stock(3, 1, 10, "M", Online, 1),
        ];
        let summary = AggregationSummary::from(&plan_online_stock(&rows));
        assert_eq!(summary, AggregationSummary { created: 1, skipped: 1 });
    }

    fn existing() -> HashMap<StockId, StockLocation> {
        HashMap::from([
            (StockId::new(1), Monastir),
            (StockId::new(2), Tunis),
            (StockId::new(3), Online),
        ])
    }

    #[test]
    fn test_filter_drops_unknown_and_online_ids() {
        let requested = HashMap::from([
            (StockId::new(2), 7),
            (StockId::new(1), 0),
            (StockId::new(3), 50),
            (StockId::new(99), 4),
        ]);

        let valid = filter_batch_updates(&requested, &existing()).unwrap();

        assert_eq!(valid, vec![(StockId::new(1), 0), (StockId::new(2), 7)]);
    }

    #[test]
    fn test_filter_rejects_when_nothing_valid_remains() {
        let only_online = HashMap::from([(StockId::new(3), 5), (StockId::new(42), 1)]);
        assert_eq!(
            filter_batch_updates(&only_online, &existing()),
            Err(BatchUpdateError::NothingToUpdate)
        );
        assert_eq!(
            filter_batch_updates(&HashMap::new(), &existing()),
            Err(BatchUpdateError::NothingToUpdate)
        );
    }

    #[test]
    fn test_filter_rejects_negative_quantity() {
        let requested = HashMap::from([(StockId::new(1), 3), (StockId::new(2), -1)]);
        assert_eq!(
            filter_batch_updates(&requested, &existing()),
            Err(BatchUpdateError::NegativeQuantity(StockId::new(2)))
        );
    }

    #[test]
    fn test_batch_request_keys_parse_from_json_strings() {
        let requested: HashMap<StockId, i32> =
            serde_json::from_str(r#"{"1": 4, "3": 9}"#).unwrap();
        let valid = filter_batch_updates(&requested, &existing()).unwrap();
        assert_eq!(valid, vec![(StockId::new(1), 4)]);
    }

    #[test]
    fn test_initial_stock_online_is_physical_sum() {
        let rows = initial_stock(&["S".to_owned(), "M".to_owned()], INITIAL_QUANTITY_PER_LOCATION);

        assert_eq!(rows.len(), 8);
        let online: Vec<_> = rows.iter().filter(|(_, l, _)| l.is_online()).collect();
        assert_eq!(online.len(), 2);
        assert!(online.iter().all(|(_, _, q)| *q == 15));
        assert!(rows
            .iter()
            .filter(|(_, l, _)| !l.is_online())
            .all(|(_, _, q)| *q == 5));
    }
}
