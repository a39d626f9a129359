//! Stock screen view: products, their colors and a row per size.

use std::collections::BTreeMap;

use dar_koftan_core::{ColorVariantId, ProductDetail, ProductId, StockId, StockLocation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductStock {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub color_variants: Vec<VariantStock>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantStock {
    pub id: ColorVariantId,
    pub color: String,
    pub main_image: Option<String>,
    /// Size label to the counters at each location.
    pub stocks_by_size: BTreeMap<String, Vec<StockCell>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockCell {
    pub id: StockId,
    pub location: StockLocation,
    pub quantity: i32,
}

impl From<ProductDetail> for ProductStock {
    fn from(detail: ProductDetail) -> Self {
        let color_variants = detail
            .color_variants
            .into_iter()
            .map(|v| {
                let main_image = v
                    .images
                    .iter()
                    .find(|i| i.is_main)
                    .or_else(|| v.images.first())
                    .map(|i| i.url.clone());

                let mut stocks_by_size: BTreeMap<String, Vec<StockCell>> = BTreeMap::new();
                for stock in v.stocks {
                    stocks_by_size.entry(stock.size).or_default().push(StockCell {
                        id: stock.id,
                        location: stock.location,
                        quantity: stock.quantity,
                    });
                }
                for cells in stocks_by_size.values_mut() {
                    cells.sort_by_key(|c| c.location);
                }

                VariantStock {
                    id: v.variant.id,
                    color: v.variant.color,
                    main_image,
                    stocks_by_size,
                }
            })
            .collect();

        Self {
            id: detail.product.id,
            name: detail.product.name,
            category: detail.product.category,
            sizes: detail.product.sizes,
            color_variants,
        }
    }
}

/// Body of `PUT /api/admin/stock`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub stock_id: StockId,
    pub quantity: i32,
}

/// Body of `PUT /api/admin/stock/batch`: stock id to new quantity.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchStockUpdate {
    pub updates: std::collections::HashMap<StockId, i32>,
}
