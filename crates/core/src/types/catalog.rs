//! Rows of the `shop` schema shared by the storefront and admin binaries.
//!
//! Both binaries read the same tables, so the row shapes live here. Queries
//! stay in each binary's `db` module.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::{
    CategoryId, ColorVariantId, OrderId, OrderItemId, ProductId, ProductImageId, SizeId, StockId,
    UserId,
};
use super::price::Price;
use super::status::{OrderStatus, StockLocation};

/// A product as stored in `shop.product`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Price,
    pub sale_price: Option<Price>,
    pub category: String,
    pub sizes: Vec<String>,
    pub collaborator: Option<String>,
    pub show_in_home: bool,
    pub show_in_promo: bool,
    pub show_in_top_sales: bool,
    pub priority: i32,
    pub view_count: i32,
    pub order_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price the customer pays: the sale price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.sale_price.unwrap_or(self.price)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ColorVariant {
    pub id: ColorVariantId,
    pub product_id: ProductId,
    pub color: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: ProductImageId,
    pub color_variant_id: ColorVariantId,
    pub url: String,
    pub alt: Option<String>,
    pub is_main: bool,
    /// `front`, `back`, `side`, ...
    pub position: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One counter of the stock ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub id: StockId,
    pub product_id: ProductId,
    pub color_id: ColorVariantId,
    pub size: String,
    pub location: StockLocation,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Size {
    pub id: SizeId,
    pub value: String,
    #[cfg_attr(feature = "postgres", sqlx(rename = "size_group"))]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "category_group"))]
    pub group: Option<String>,
}

/// A category with the number of products filed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    #[cfg_attr(feature = "postgres", sqlx(rename = "category_group"))]
    pub group: Option<String>,
    pub product_count: i64,
}

/// A customer order as stored in `shop.customer_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    pub total_amount: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. Name, color and price are copied at checkout so the
/// order still reads correctly after the product changes or is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: Option<ProductId>,
    pub product_name: String,
    pub color_variant_id: Option<ColorVariantId>,
    pub color: String,
    pub size: String,
    pub quantity: i32,
    pub price: Price,
}

/// A color variant with its images and stock rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantDetail {
    #[serde(flatten)]
    pub variant: ColorVariant,
    pub images: Vec<ProductImage>,
    pub stocks: Vec<Stock>,
}

/// A product with its variants, as the catalog endpoints return it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub color_variants: Vec<VariantDetail>,
}

impl ProductDetail {
    /// Nest flat rows under their products.
    ///
    /// Product order is kept. Variants are attached in the order given, images
    /// are sorted main-first then by id, and rows whose parent is not in the
    /// input are dropped.
    #[must_use]
    pub fn assemble(
        products: Vec<Product>,
        variants: Vec<ColorVariant>,
        images: Vec<ProductImage>,
        stocks: Vec<Stock>,
    ) -> Vec<Self> {
        let mut images_by_variant: HashMap<ColorVariantId, Vec<ProductImage>> = HashMap::new();
        for image in images {
            images_by_variant
                .entry(image.color_variant_id)
                .or_default()
                .push(image);
        }

        let mut stocks_by_variant: HashMap<ColorVariantId, Vec<Stock>> = HashMap::new();
        for stock in stocks {
            stocks_by_variant.entry(stock.color_id).or_default().push(stock);
        }

        let mut variants_by_product: HashMap<ProductId, Vec<VariantDetail>> = HashMap::new();
        for variant in variants {
            let mut images = images_by_variant.remove(&variant.id).unwrap_or_default();
            images.sort_by_key(|image| (!image.is_main, image.id));
            let stocks = stocks_by_variant.remove(&variant.id).unwrap_or_default();
            variants_by_product
                .entry(variant.product_id)
                .or_default()
                .push(VariantDetail {
                    variant,
                    images,
                    stocks,
                });
        }

        products
            .into_iter()
            .map(|product| Self {
                color_variants: variants_by_product.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect()
    }

    #[must_use]
    pub fn has_images(&self) -> bool {
        self.color_variants.iter().any(|v| !v.images.is_empty())
    }

    /// The variant whose color label matches exactly.
    #[must_use]
    pub fn variant_by_color(&self, color: &str) -> Option<&VariantDetail> {
        self.color_variants.iter().find(|v| v.variant.color == color)
    }
}

/// An order with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderDetail {
    /// Nest items under their orders, keeping the order of `orders`.
    #[must_use]
    pub fn assemble(orders: Vec<Order>, items: Vec<OrderItem>) -> Vec<Self> {
        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }

        orders
            .into_iter()
            .map(|order| Self {
                items: items_by_order.remove(&order.id).unwrap_or_default(),
                order,
            })
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use rust_decimal::Decimal;

    use super::*;

    pub fn product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: String::new(),
            price: Price::new(Decimal::new(8990, 2)),
            sale_price: None,
            category: "koftan".to_owned(),
            sizes: vec!["S".to_owned(), "M".to_owned()],
            collaborator: None,
            show_in_home: false,
            show_in_promo: false,
            show_in_top_sales: false,
            priority: 0,
            view_count: 0,
            order_count: 0,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn variant(id: i32, product_id: i32, color: &str) -> ColorVariant {
        ColorVariant {
            id: ColorVariantId::new(id),
            product_id: ProductId::new(product_id),
            color: color.to_owned(),
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn image(id: i32, variant_id: i32, is_main: bool) -> ProductImage {
        ProductImage {
            id: ProductImageId::new(id),
            color_variant_id: ColorVariantId::new(variant_id),
            url: format!("/uploads/{id}.jpg"),
            alt: None,
            is_main,
            position: "front".to_owned(),
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }

    pub fn stock(
        id: i32,
        product_id: i32,
        color_id: i32,
        size: &str,
        location: StockLocation,
        quantity: i32,
    ) -> Stock {
        Stock {
            id: StockId::new(id),
            product_id: ProductId::new(product_id),
            color_id: ColorVariantId::new(color_id),
            size: size.to_owned(),
            location,
            quantity,
            created_at: DateTime::UNIX_EPOCH,
            updated_at: DateTime::UNIX_EPOCH,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_assemble_nests_rows_and_keeps_product_order() {
        let products = vec![product(2, "Koftan Zahra"), product(1, "Jebba Nour")];
        let variants = vec![variant(10, 1, "Bleu"), variant(20, 2, "Rouge"), variant(21, 2, "Noir")];
        let images = vec![image(101, 20, false), image(100, 20, true), image(102, 99, true)];
        let stocks = vec![stock(1, 2, 20, "S", StockLocation::Tunis, 3)];

        let details = ProductDetail::assemble(products, variants, images, stocks);

        assert_eq!(details.len(), 2);
        assert_eq!(details[0].product.name, "Koftan Zahra");
        assert_eq!(details[0].color_variants.len(), 2);

        let rouge = details[0].variant_by_color("Rouge").unwrap();
        let ids: Vec<i32> = rouge.images.iter().map(|i| i.id.as_i32()).collect();
        assert_eq!(ids, vec![100, 101]);
        assert_eq!(rouge.stocks.len(), 1);

        assert!(details[0].has_images());
        assert!(!details[1].has_images());
    }

    #[test]
    fn test_product_detail_serializes_flat_camel_case() {
        let details = ProductDetail::assemble(vec![product(1, "Jebba")], vec![variant(5, 1, "Vert")], vec![], vec![]);
        let json = serde_json::to_value(&details[0]).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["showInHome"], false);
        assert!((json["price"].as_f64().unwrap() - 89.9).abs() < 1e-9);
        assert_eq!(json["colorVariants"][0]["color"], "Vert");
        assert!(json["colorVariants"][0]["images"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_effective_price_prefers_sale() {
        let mut p = product(1, "Jebba");
        assert_eq!(p.effective_price(), p.price);
        p.sale_price = Some(Price::new(rust_decimal::Decimal::new(5000, 2)));
        assert_eq!(p.effective_price().to_string(), "50.00");
    }
}
