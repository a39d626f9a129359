//! Checkout request validation.
//!
//! The cart lives on the client, so the request carries everything: the
//! customer's details, the total it computed and one line per item. Fields
//! are optional at the serde level so a missing field becomes a 400 with a
//! readable message instead of a deserialization rejection.

use serde::Deserialize;

use dar_koftan_core::{Price, ProductId};

/// Why a checkout body was rejected before touching the database.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutError {
    #[error("Missing required fields")]
    MissingFields,
    #[error("Invalid item data: missing required fields")]
    InvalidItem,
}

/// `POST /api/orders` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub total_amount: Option<Price>,
    pub items: Option<Vec<CheckoutItemRequest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemRequest {
    pub product_id: Option<ProductId>,
    pub quantity: Option<i32>,
    pub price: Option<Price>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A validated order, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    pub total_amount: Price,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
    pub price: Price,
    pub size: String,
    pub color: String,
}

fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn positive(price: Option<Price>) -> Option<Price> {
    price.filter(|p| *p > Price::ZERO)
}

impl CheckoutRequest {
    /// Check that every field is present and every line is usable.
    ///
    /// Zero amounts and quantities count as missing.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::MissingFields` for a missing order field or an
    /// empty cart, `CheckoutError::InvalidItem` for an incomplete line.
    pub fn validate(self) -> Result<NewOrder, CheckoutError> {
        let (Some(customer_name), Some(phone_number), Some(address), Some(total_amount), Some(items)) = (
            filled(self.customer_name),
            filled(self.phone_number),
            filled(self.address),
            positive(self.total_amount),
            self.items.filter(|items| !items.is_empty()),
        ) else {
            return Err(CheckoutError::MissingFields);
        };

        let items = items
            .into_iter()
            .map(CheckoutItemRequest::validate)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(NewOrder {
            customer_name,
            phone_number,
            address,
            total_amount,
            items,
        })
    }
}

impl CheckoutItemRequest {
    fn validate(self) -> Result<NewOrderItem, CheckoutError> {
        match (
            self.product_id,
            self.quantity.filter(|q| *q > 0),
            positive(self.price),
            filled(self.size),
            filled(self.color),
        ) {
            (Some(product_id), Some(quantity), Some(price), Some(size), Some(color)) => {
                Ok(NewOrderItem {
                    product_id,
                    quantity,
                    price,
                    size,
                    color,
                })
            }
            _ => Err(CheckoutError::InvalidItem),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request() -> CheckoutRequest {
        serde_json::from_value(serde_json::json!({
            "customerName": "Amira Ben Salah",
            "phoneNumber": "22 345 678",
            "address": "12 rue de Carthage, Tunis",
            "totalAmount": 179.8,
            "items": [
                {"productId": 3, "quantity": 2, "price": 89.9, "size": "M", "color": "Bordeaux"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_validate_complete_request() {
        let order = request().validate().unwrap();
        assert_eq!(order.customer_name, "Amira Ben Salah");
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, ProductId::new(3));
        assert_eq!(order.items[0].price.to_string(), "89.90");
    }

    #[test]
    fn test_validate_missing_order_field() {
        let mut req = request();
        req.address = Some("   ".to_owned());
        assert_eq!(req.validate(), Err(CheckoutError::MissingFields));
    }

    #[test]
    fn test_validate_empty_cart() {
        let mut req = request();
        req.items = Some(Vec::new());
        assert_eq!(req.validate(), Err(CheckoutError::MissingFields));
    }

    #[test]
    fn test_validate_zero_total_is_missing() {
        let mut req = request();
        req.total_amount = Some(Price::ZERO);
        assert_eq!(req.validate(), Err(CheckoutError::MissingFields));
    }

    #[test]
    fn test_validate_incomplete_item() {
        let mut req = request();
        if let Some(items) = req.items.as_mut() {
            items[0].color = None;
        }
        assert_eq!(req.validate(), Err(CheckoutError::InvalidItem));
    }

    #[test]
    fn test_validate_non_positive_quantity() {
        let mut req = request();
        if let Some(items) = req.items.as_mut() {
            items[0].quantity = Some(0);
        }
        assert_eq!(req.validate(), Err(CheckoutError::InvalidItem));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(CheckoutError::MissingFields.to_string(), "Missing required fields");
        assert_eq!(
            CheckoutError::InvalidItem.to_string(),
            "Invalid item data: missing required fields"
        );
    }
}
