//! SMS subscriptions, restock requests and the contact form.
//!
//! Messages shown to visitors are in French, as the storefront is.

use serde::Deserialize;

use dar_koftan_core::{Email, PhoneNumber, ProductId};

/// Name stored when nothing better is known.
pub const UNKNOWN_NAME: &str = "Non spécifié";

pub const MIN_CONTACT_MESSAGE: usize = 10;

/// A form field that failed validation, with the message shown to the visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Numéro de téléphone requis")]
    PhoneRequired,
    #[error("Format de numéro de téléphone invalide")]
    PhoneInvalid,
    #[error("Informations incomplètes")]
    Incomplete,
    #[error("Le message doit contenir au moins 10 caractères")]
    MessageTooShort,
    #[error("Email invalide")]
    EmailInvalid,
    #[error("Le nom et l'email sont requis pour les utilisateurs non connectés")]
    NameAndEmailRequired,
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn phone(raw: Option<&str>, missing: FormError) -> Result<PhoneNumber, FormError> {
    let raw = filled(raw).ok_or(missing)?;
    PhoneNumber::parse(raw).map_err(|_| FormError::PhoneInvalid)
}

/// `POST /api/subscribe` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub phone_number: Option<String>,
    pub source: Option<String>,
}

impl SubscribeRequest {
    /// The normalized phone number.
    ///
    /// # Errors
    ///
    /// `PhoneRequired` when absent, `PhoneInvalid` when it is not 8 local digits.
    pub fn phone(&self) -> Result<PhoneNumber, FormError> {
        phone(self.phone_number.as_deref(), FormError::PhoneRequired)
    }

    #[must_use]
    pub fn source(&self) -> &str {
        filled(self.source.as_deref()).unwrap_or(dar_koftan_core::SOURCE_WEBSITE_FOOTER)
    }
}

/// What subscribing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Created,
    Reactivated,
    AlreadyActive,
}

impl SubscribeOutcome {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Created => "Merci! Vous êtes maintenant inscrit à nos mises à jour par SMS!",
            Self::Reactivated => "Vous êtes maintenant réabonné à nos mises à jour par SMS!",
            Self::AlreadyActive => "Vous êtes déjà inscrit à nos mises à jour par SMS!",
        }
    }
}

/// The subscriber name for a signed-in visitor: the username, else the
/// local part of the email.
#[must_use]
pub fn subscriber_name(username: &str, email: &Email) -> String {
    let username = username.trim();
    if !username.is_empty() {
        return username.to_owned();
    }
    email
        .as_str()
        .split('@')
        .next()
        .filter(|local| !local.is_empty())
        .unwrap_or(UNKNOWN_NAME)
        .to_owned()
}

/// `POST /api/stock-notification` body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockNotificationRequest {
    pub phone_number: Option<String>,
    pub product_id: Option<ProductId>,
    pub product_name: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
}

/// A validated restock request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStockNotification {
    pub phone: PhoneNumber,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub color: String,
}

impl StockNotificationRequest {
    /// # Errors
    ///
    /// `Incomplete` when a required field is missing, `PhoneInvalid` for a
    /// malformed phone number.
    pub fn validate(self) -> Result<NewStockNotification, FormError> {
        let (Some(product_id), Some(size), Some(color)) = (
            self.product_id,
            filled(self.size.as_deref()),
            filled(self.color.as_deref()),
        ) else {
            return Err(FormError::Incomplete);
        };
        let phone = phone(self.phone_number.as_deref(), FormError::Incomplete)?;

        Ok(NewStockNotification {
            phone,
            product_id,
            product_name: self.product_name.unwrap_or_default().trim().to_owned(),
            size: size.to_owned(),
            color: color.to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockNotificationOutcome {
    Registered,
    AlreadyRegistered,
}

impl StockNotificationOutcome {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Registered => "Notification de stock enregistrée avec succès",
            Self::AlreadyRegistered => "Vous êtes déjà inscrit pour cette notification",
        }
    }
}

/// `POST /api/contact` body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: Option<String>,
}

/// A validated contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
}

impl ContactRequest {
    /// Validate the form. `account` is the signed-in user's username and
    /// email, which replace whatever the form says.
    ///
    /// # Errors
    ///
    /// Returns the first `FormError` found.
    pub fn validate(self, account: Option<(&str, &Email)>) -> Result<NewContactMessage, FormError> {
        let message = self.message.unwrap_or_default().trim().to_owned();
        if message.chars().count() < MIN_CONTACT_MESSAGE {
            return Err(FormError::MessageTooShort);
        }
        let phone = filled(self.phone.as_deref()).map(str::to_owned);

        if let Some((username, email)) = account {
            return Ok(NewContactMessage {
                name: Some(username.to_owned()),
                email: Some(email.as_str().to_owned()),
                phone,
                message,
            });
        }

        let (Some(name), Some(email)) = (filled(self.name.as_deref()), filled(self.email.as_deref()))
        else {
            return Err(FormError::NameAndEmailRequired);
        };
        let email = Email::parse(email).map_err(|_| FormError::EmailInvalid)?;

        Ok(NewContactMessage {
            name: Some(name.to_owned()),
            email: Some(email.into_inner()),
            phone,
            message,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_phone_normalized() {
        let req = SubscribeRequest {
            phone_number: Some("+216 22 345 678".to_owned()),
            source: None,
        };
        assert_eq!(req.phone().unwrap().as_str(), "22345678");
        assert_eq!(req.source(), "website_footer");
    }

    #[test]
    fn test_subscribe_phone_errors() {
        let missing = SubscribeRequest::default();
        assert_eq!(missing.phone(), Err(FormError::PhoneRequired));

        let short = SubscribeRequest {
            phone_number: Some("12345".to_owned()),
            source: None,
        };
        assert_eq!(short.phone(), Err(FormError::PhoneInvalid));
    }

    #[test]
    fn test_subscriber_name_fallbacks() {
        let email = Email::parse("leila@example.tn").unwrap();
        assert_eq!(subscriber_name("leila_k", &email), "leila_k");
        assert_eq!(subscriber_name("  ", &email), "leila");
    }

    #[test]
    fn test_stock_notification_incomplete() {
        let req = StockNotificationRequest {
            phone_number: Some("22345678".to_owned()),
            product_id: Some(ProductId::new(4)),
            size: Some("M".to_owned()),
            ..Default::default()
        };
        assert_eq!(req.validate(), Err(FormError::Incomplete));
    }

    #[test]
    fn test_stock_notification_bad_phone() {
        let req = StockNotificationRequest {
            phone_number: Some("0022".to_owned()),
            product_id: Some(ProductId::new(4)),
            product_name: Some("Jebba Sfax".to_owned()),
            size: Some("M".to_owned()),
            color: Some("Blanc".to_owned()),
        };
        assert_eq!(req.validate(), Err(FormError::PhoneInvalid));
    }

    #[test]
    fn test_contact_requires_name_and_email_when_anonymous() {
        let req = ContactRequest {
            name: Some("Sami".to_owned()),
            message: Some("Avez-vous la taille XL ?".to_owned()),
            ..Default::default()
        };
        assert_eq!(req.validate(None), Err(FormError::NameAndEmailRequired));
    }

    #[test]
    fn test_contact_short_message() {
        let req = ContactRequest {
            name: Some("Sami".to_owned()),
            email: Some("sami@example.tn".to_owned()),
            message: Some("Bonjour".to_owned()),
            ..Default::default()
        };
        assert_eq!(req.validate(None), Err(FormError::MessageTooShort));
    }

    #[test]
    fn test_contact_account_overrides_form() {
        let email = Email::parse("nour@example.tn").unwrap();
        let req = ContactRequest {
            name: Some("Someone".to_owned()),
            email: Some("other@example.tn".to_owned()),
            phone: Some(" 22345678 ".to_owned()),
            message: Some("Livraison possible à Sousse ?".to_owned()),
        };
        let contact = req.validate(Some(("nour", &email))).unwrap();
        assert_eq!(contact.name.as_deref(), Some("nour"));
        assert_eq!(contact.email.as_deref(), Some("nour@example.tn"));
        assert_eq!(contact.phone.as_deref(), Some("22345678"));
    }
}
