//! SMS gateway client for order confirmations.
//!
//! The gateway takes a single GET with everything in the query string and
//! answers 200 even for some failures, so a body mentioning `error` counts
//! as a failure too.

use std::fmt::Write as _;

use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use dar_koftan_core::{OrderDetail, PhoneError, PhoneNumber};

use crate::config::SmsConfig;

/// Errors that can occur when sending an SMS.
#[derive(Debug, Error)]
pub enum SmsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Recipient number could not be normalized.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] PhoneError),

    /// Gateway reported a failure.
    #[error("gateway error: {status} - {body}")]
    Gateway { status: u16, body: String },
}

/// SMS gateway client.
#[derive(Clone)]
pub struct SmsClient {
    client: reqwest::Client,
    config: SmsConfig,
}

impl SmsClient {
    /// Create a new SMS client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: SmsConfig) -> Result<Self, SmsError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { client, config })
    }

    fn send_url(&self, to: &PhoneNumber, text: &str) -> Url {
        let mut url = self.config.gateway_url.clone();
        url.query_pairs_mut()
            .append_pair("action", "send-sms")
            .append_pair("api_key", self.config.api_key.expose_secret())
            .append_pair("to", &to.international())
            .append_pair("from", &self.config.sender_id)
            .append_pair("sms", text);
        url
    }

    /// Send `text` to `phone`.
    ///
    /// # Errors
    ///
    /// Returns `SmsError::InvalidPhone` if the number is not a Tunisian mobile,
    /// `SmsError::Gateway` if the gateway refuses the message.
    pub async fn send(&self, phone: &str, text: &str) -> Result<(), SmsError> {
        let to = PhoneNumber::parse(phone)?;
        let response = self.client.get(self.send_url(&to, text)).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !gateway_accepted(status.is_success(), &body) {
            return Err(SmsError::Gateway {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(to = %to.international(), "SMS sent");
        Ok(())
    }

    /// Send the order confirmation to the phone given at checkout.
    ///
    /// # Errors
    ///
    /// See [`SmsClient::send`].
    pub async fn send_order_confirmation(&self, order: &OrderDetail) -> Result<(), SmsError> {
        let text = order_confirmation_message(order);
        self.send(&order.order.phone_number, &text).await
    }
}

fn gateway_accepted(is_success: bool, body: &str) -> bool {
    is_success && !body.to_lowercase().contains("error")
}

/// The French confirmation text. Line prices are unit prices, as entered
/// at checkout.
#[must_use]
pub fn order_confirmation_message(order: &OrderDetail) -> String {
    let mut items = String::new();
    for (i, item) in order.items.iter().enumerate() {
        if i > 0 {
            items.push('\n');
        }
        let _ = write!(
            items,
            "- {} ({}, Taille: {}) x{}: {}",
            item.product_name,
            item.color,
            item.size,
            item.quantity,
            item.price.display_dt()
        );
    }

    format!(
        "Bonjour {name},\n\n\
         Merci pour votre commande chez Dar Koftan!\n\n\
         Détails de la commande #{id}:\n\
         {items}\n\n\
         Total: {total}\n\n\
         Nous vous contacterons bientôt pour confirmer les détails de livraison.\n\n\
         Cordialement,\n\
         L'équipe Dar Koftan",
        name = order.order.customer_name,
        id = order.order.id,
        total = order.order.total_amount.display_dt(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use dar_koftan_core::{
        ColorVariantId, Order, OrderId, OrderItem, OrderItemId, OrderStatus, Price, ProductId,
    };
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use super::*;

    fn order() -> OrderDetail {
        let now = Utc::now();
        let item = |id: i32, name: &str, color: &str, size: &str, qty: i32, cents: i64| OrderItem {
            id: OrderItemId::new(id),
            order_id: OrderId::new(42),
            product_id: Some(ProductId::new(id)),
            product_name: name.to_owned(),
            color_variant_id: Some(ColorVariantId::new(id)),
            color: color.to_owned(),
            size: size.to_owned(),
            quantity: qty,
            price: Price::new(Decimal::new(cents, 2)),
        };

        OrderDetail {
            order: Order {
                id: OrderId::new(42),
                user_id: None,
                customer_name: "Amira".to_owned(),
                phone_number: "22 345 678".to_owned(),
                address: "Tunis".to_owned(),
                total_amount: Price::new(Decimal::new(26970, 2)),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now,
            },
            items: vec![
                item(1, "Kaftan Nour", "Bordeaux", "M", 2, 8990),
                item(2, "Jebba Sfax", "Blanc", "L", 1, 9000),
            ],
        }
    }

    #[test]
    fn test_order_confirmation_message() {
        let expected = "Bonjour Amira,\n\n\
                        Merci pour votre commande chez Dar Koftan!\n\n\
                        Détails de la commande #42:\n\
                        - Kaftan Nour (Bordeaux, Taille: M) x2: 89.90 DT\n\
                        - Jebba Sfax (Blanc, Taille: L) x1: 90.00 DT\n\n\
                        Total: 269.70 DT\n\n\
                        Nous vous contacterons bientôt pour confirmer les détails de livraison.\n\n\
                        Cordialement,\n\
                        L'équipe Dar Koftan";
        assert_eq!(order_confirmation_message(&order()), expected);
    }

    #[test]
    fn test_message_is_deterministic() {
        let order = order();
        assert_eq!(order_confirmation_message(&order), order_confirmation_message(&order));
    }

    #[test]
    fn test_gateway_accepted() {
        assert!(gateway_accepted(true, "OK: message queued"));
        assert!(!gateway_accepted(true, "ERROR: invalid api key"));
        assert!(!gateway_accepted(true, "An Error occurred"));
        assert!(!gateway_accepted(false, "queued"));
    }

    #[test]
    fn test_send_url_carries_international_number() {
        let client = SmsClient::new(SmsConfig {
            gateway_url: Url::parse("https://sms.example.tn/api").unwrap(),
            api_key: SecretString::from("k3y-f0r-t3sts"),
            sender_id: "Dar Koftan".to_owned(),
        })
        .unwrap();

        let to = PhoneNumber::parse("22 345 678").unwrap();
        let url = client.send_url(&to, "Bonjour");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert!(pairs.contains(&("action".to_owned(), "send-sms".to_owned())));
        assert!(pairs.contains(&("to".to_owned(), "21622345678".to_owned())));
        assert!(pairs.contains(&("from".to_owned(), "Dar Koftan".to_owned())));
        assert!(pairs.contains(&("sms".to_owned(), "Bonjour".to_owned())));
    }
}
