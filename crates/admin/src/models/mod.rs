//! Request payloads and response views for the back office.

pub mod product;
pub mod stock;

pub use product::{DisplayUpdate, ImageInput, ProductInput, VariantInput};
pub use stock::{BatchStockUpdate, ProductStock, StockCell, StockUpdate, VariantStock};
