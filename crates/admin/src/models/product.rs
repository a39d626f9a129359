//! Product payloads accepted by the back office.

use std::collections::HashSet;

use dar_koftan_core::Price;
use serde::Deserialize;

/// Default position label for images sent without one.
pub const DEFAULT_IMAGE_POSITION: &str = "front";

/// Body of `POST /api/admin/products` and `PUT /api/admin/products/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub sale_price: Option<Price>,
    pub category: String,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default, alias = "collaborateur")]
    pub collaborator: Option<String>,
    #[serde(default)]
    pub color_variants: Vec<VariantInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantInput {
    pub color: String,
    #[serde(default)]
    pub images: Vec<ImageInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub url: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl ImageInput {
    #[must_use]
    pub fn position(&self) -> &str {
        self.position
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_IMAGE_POSITION)
    }
}

impl ProductInput {
    /// Trim text fields and drop blank or repeated sizes.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.category = self.category.trim().to_string();
        self.collaborator = self
            .collaborator
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let mut seen = HashSet::new();
        self.sizes = self
            .sizes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect();

        for variant in &mut self.color_variants {
            variant.color = variant.color.trim().to_string();
        }
        self
    }

    /// Check the rules the database does not enforce by itself.
    ///
    /// # Errors
    ///
    /// Returns a message suitable for a 400 response.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.category.is_empty() {
            return Err("Category is required".to_string());
        }
        if self.price.is_negative() {
            return Err("Price cannot be negative".to_string());
        }
        if self.sale_price.is_some_and(Price::is_negative) {
            return Err("Sale price cannot be negative".to_string());
        }
        if self.sizes.is_empty() {
            return Err("At least one size is required".to_string());
        }

        let mut colors = HashSet::new();
        for variant in &self.color_variants {
            if variant.color.is_empty() {
                return Err("Every color variant needs a color".to_string());
            }
            if !colors.insert(variant.color.as_str()) {
                return Err(format!("Color '{}' is listed twice", variant.color));
            }
            if variant.images.iter().any(|i| i.url.trim().is_empty()) {
                return Err(format!("Image without url for color '{}'", variant.color));
            }
        }
        Ok(())
    }
}

/// Body of `PATCH /api/admin/products/{id}/display`. Absent fields are left
/// unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayUpdate {
    pub show_in_home: Option<bool>,
    pub show_in_promo: Option<bool>,
    pub show_in_top_sales: Option<bool>,
    pub priority: Option<i32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(json: serde_json::Value) -> ProductInput {
        serde_json::from_value::<ProductInput>(json).unwrap().normalized()
    }

    #[test]
    fn test_parses_storefront_form_payload() {
        let product = input(serde_json::json!({
            "name": "  Koftan Yasmine ",
            "price": 289.5,
            "salePrice": 249,
            "category": "koftan",
            "sizes": ["S", "M", " M ", ""],
            "collaborateur": "Atelier Nabeul",
            "colorVariants": [
                { "color": "Bordeaux", "images": [{ "url": "/uploads/a.jpg" }, { "url": "/uploads/b.jpg", "position": "back" }] }
            ]
        }));

        assert_eq!(product.name, "Koftan Yasmine");
        assert_eq!(product.sizes, vec!["S", "M"]);
        assert_eq!(product.collaborator.as_deref(), Some("Atelier Nabeul"));
        assert_eq!(product.color_variants[0].images[0].position(), "front");
        assert_eq!(product.color_variants[0].images[1].position(), "back");
        assert!(product.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let base = serde_json::json!({ "name": "Jebba", "price": 120, "category": "jebba", "sizes": ["M"] });
        assert!(input(base.clone()).validate().is_ok());

        let mut no_name = base.clone();
        no_name["name"] = " ".into();
        assert_eq!(input(no_name).validate().unwrap_err(), "Product name is required");

        let mut no_sizes = base.clone();
        no_sizes["sizes"] = serde_json::json!([]);
        assert!(input(no_sizes).validate().is_err());

        let mut negative = base;
        negative["price"] = (-1).into();
        assert_eq!(input(negative).validate().unwrap_err(), "Price cannot be negative");
    }

    #[test]
    fn test_validate_rejects_duplicate_colors() {
        let product = input(serde_json::json!({
            "name": "Jebba", "price": 120, "category": "jebba", "sizes": ["M"],
            "colorVariants": [{ "color": "Noir" }, { "color": " Noir" }]
        }));
        assert!(product.validate().unwrap_err().contains("twice"));
    }

    #[test]
    fn test_display_update_fields_are_optional() {
        let update: DisplayUpdate = serde_json::from_str(r#"{"showInHome": true}"#).unwrap();
        assert_eq!(update.show_in_home, Some(true));
        assert!(update.priority.is_none());
    }
}
