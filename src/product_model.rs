//! Product record definitions.
//!
//! This module defines [`Product`], the single record type held by the
//! catalog. Records arrive from loosely-typed JSON files, so every field
//! except `id` is defaultable and decoded leniently: numbers are accepted
//! where text is expected, numeric strings are accepted as prices, and
//! unknown keys are carried along untouched in [`Product::extra`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// One catalog entry.
///
/// # Structure
///
/// - **id**: Unique identifier within the collection, never empty once loaded
/// - **name / brand / category / description**: Free text, empty when absent
/// - **price**: Optional number; absent prices sort as `0`
/// - **img**: Image URL or an embedded `data:` URI
/// - **specs**: Key/value specification table
/// - **features**: Ordered list of feature bullet points
/// - **extra**: Any other keys found in the source file, exported after `features`
///
/// # Examples
///
/// ## Decoding a loosely-typed record
///
/// ```rust
/// use catalog_editor_core::product_model::Product;
/// use serde_json::json;
///
/// let product: Product = serde_json::from_value(json!({
///     "id": 42,
///     "name": "Desk Lamp",
///     "price": "19.90",
///     "specs": {"Power": "12W", "Bulbs": 1},
///     "features": ["Dimmable"],
///     "sku": "DL-42"
/// }))?;
///
/// assert_eq!(product.id, "42");
/// assert_eq!(product.price, Some(19.9));
/// assert_eq!(product.specs["Bulbs"], "1");
/// assert_eq!(product.extra["sku"], json!("DL-42"));
/// # Ok::<(), serde_json::Error>(())
/// ```
///
/// ## Field order on export
///
/// Serialization always writes `id, name, brand, category, price,
/// description, img, specs, features` followed by the extra keys.
///
/// ```rust
/// use catalog_editor_core::product_model::Product;
///
/// let product = Product::blank("prod-1", "New Product");
/// let json = serde_json::to_string(&product)?;
/// assert!(json.starts_with(r#"{"id":"prod-1","name":"New Product","brand":"""#));
/// assert!(json.contains(r#""price":0,"#));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Primary key of the record inside the collection.
    #[serde(default, deserialize_with = "lenient::text")]
    pub id: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub name: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub brand: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,

    /// Whole prices are written back as JSON integers (`12`, not `12.0`).
    #[serde(
        default,
        deserialize_with = "lenient::price",
        serialize_with = "lenient::serialize_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<f64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub description: String,

    #[serde(default, deserialize_with = "lenient::text")]
    pub img: String,

    #[serde(default, deserialize_with = "lenient::specs")]
    pub specs: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "lenient::features")]
    pub features: Vec<String>,

    /// Keys the editor does not know about, kept in source order.
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

impl Product {
    /// A fresh record as created by the "add product" action.
    pub fn blank(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            brand: String::new(),
            category: String::new(),
            price: Some(0.0),
            description: String::new(),
            img: String::new(),
            specs: BTreeMap::new(),
            features: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Price used for ordering; missing prices count as zero.
    pub fn price_or_zero(&self) -> f64 {
        self.price.unwrap_or(0.0)
    }
}

/// Renders any JSON value the way a text cell shows it.
pub(crate) fn json_to_text(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Strict numeric parse used for user-entered prices.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|p| p.is_finite())
}

mod lenient {
    use std::collections::BTreeMap;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value as JsonValue;

    use super::{json_to_text, parse_price};

    const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Ok(json_to_text(&value))
    }

    pub fn price<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(None),
            JsonValue::Number(n) => n
                .as_f64()
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("price {n} is out of range"))),
            JsonValue::String(s) if s.trim().is_empty() => Ok(None),
            JsonValue::String(s) => parse_price(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("price \"{s}\" is not a number"))),
            other => Err(D::Error::custom(format!("price must be a number, got {other}"))),
        }
    }

    pub fn serialize_price<S: Serializer>(price: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
        match price {
            Some(p) if p.fract() == 0.0 && p.abs() < MAX_EXACT_INTEGER => serializer.serialize_i64(*p as i64),
            Some(p) => serializer.serialize_f64(*p),
            None => serializer.serialize_none(),
        }
    }

    pub fn specs<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(BTreeMap::new()),
            JsonValue::Object(map) => Ok(map.iter().map(|(k, v)| (k.clone(), json_to_text(v))).collect()),
            other => Err(D::Error::custom(format!("specs must be an object, got {other}"))),
        }
    }

    pub fn features<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        match JsonValue::deserialize(deserializer)? {
            JsonValue::Null => Ok(Vec::new()),
            JsonValue::Array(items) => Ok(items.iter().map(json_to_text).collect()),
            JsonValue::String(single) => Ok(vec![single]),
            other => Err(D::Error::custom(format!("features must be an array, got {other}"))),
        }
    }
}
