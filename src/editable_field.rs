//! Typed field edits.
//!
//! Table cells, modal dialogs and the bulk-edit form all name a field and
//! supply a value. Instead of assigning by key string, an intent is turned
//! into a [`FieldEdit`] up front, so invalid values are rejected before any
//! record is touched and each field declares which edit paths it supports.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::editor_error::EditorError;
use crate::product_model::{json_to_text, parse_price, Product};

/// The editable columns of a [`Product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductField {
    Id,
    Name,
    Brand,
    Category,
    Price,
    Description,
    Img,
    Specs,
    Features,
}

impl ProductField {
    pub const ALL: [ProductField; 9] = [
        ProductField::Id,
        ProductField::Name,
        ProductField::Brand,
        ProductField::Category,
        ProductField::Price,
        ProductField::Description,
        ProductField::Img,
        ProductField::Specs,
        ProductField::Features,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Brand => "brand",
            ProductField::Category => "category",
            ProductField::Price => "price",
            ProductField::Description => "description",
            ProductField::Img => "img",
            ProductField::Specs => "specs",
            ProductField::Features => "features",
        }
    }

    /// Ids must stay unique, so they can only be edited one record at a time.
    pub fn is_bulk_editable(self) -> bool {
        !matches!(self, ProductField::Id)
    }
}

impl Display for ProductField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProductField {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ProductField::ALL
            .into_iter()
            .find(|field| field.key().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| EditorError::FieldNotEditable(format!("unknown field \"{}\"", s)))
    }
}

/// A validated new value for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    Id(String),
    Name(String),
    Brand(String),
    Category(String),
    Price(f64),
    Description(String),
    Img(String),
    Specs(BTreeMap<String, String>),
    Features(Vec<String>),
}

impl FieldEdit {
    /// Builds an edit from raw text as typed into a cell or form.
    ///
    /// `specs` expects a JSON object and `features` a JSON array (a bare
    /// line-per-feature list is accepted too).
    pub fn from_input(field: ProductField, raw: &str) -> Result<Self, EditorError> {
        match field {
            ProductField::Id => {
                if raw.trim().is_empty() {
                    return Err(EditorError::InvalidValue("ID cannot be empty.".to_string()));
                }
                Ok(FieldEdit::Id(raw.to_string()))
            }
            ProductField::Name => Ok(FieldEdit::Name(raw.to_string())),
            ProductField::Brand => Ok(FieldEdit::Brand(raw.to_string())),
            ProductField::Category => Ok(FieldEdit::Category(raw.to_string())),
            ProductField::Price => parse_price(raw)
                .map(FieldEdit::Price)
                .ok_or_else(|| EditorError::InvalidValue(format!("Invalid price \"{}\". Please enter a number.", raw))),
            ProductField::Description => Ok(FieldEdit::Description(raw.to_string())),
            ProductField::Img => Ok(FieldEdit::Img(raw.to_string())),
            ProductField::Specs => match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Object(map)) => Ok(FieldEdit::specs(
                    map.iter().map(|(k, v)| (k.clone(), json_to_text(v))),
                )),
                _ => Err(EditorError::InvalidValue("specs must be a JSON object".to_string())),
            },
            ProductField::Features => match serde_json::from_str::<JsonValue>(raw) {
                Ok(JsonValue::Array(items)) => Ok(FieldEdit::features(items.iter().map(json_to_text))),
                Ok(_) => Err(EditorError::InvalidValue("features must be a JSON array".to_string())),
                Err(_) => Ok(FieldEdit::features(raw.lines().map(str::to_string))),
            },
        }
    }

    /// Spec table as saved from the specs dialog: keys and values trimmed,
    /// rows with a blank key dropped.
    pub fn specs<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let table = rows
            .into_iter()
            .filter_map(|(k, v)| {
                let key = k.as_ref().trim();
                (!key.is_empty()).then(|| (key.to_string(), v.as_ref().trim().to_string()))
            })
            .collect();
        FieldEdit::Specs(table)
    }

    /// Feature list as saved from the features dialog: trimmed, blanks dropped.
    pub fn features<S: AsRef<str>>(items: impl IntoIterator<Item = S>) -> Self {
        let list = items
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        FieldEdit::Features(list)
    }

    /// Rejects values no record may hold: an empty id or a non-finite price.
    pub fn validate(&self) -> Result<(), EditorError> {
        match self {
            FieldEdit::Id(id) if id.trim().is_empty() => {
                Err(EditorError::InvalidValue("ID cannot be empty.".to_string()))
            }
            FieldEdit::Price(price) if !price.is_finite() => {
                Err(EditorError::InvalidValue(format!("Invalid price {}. Please enter a number.", price)))
            }
            _ => Ok(()),
        }
    }

    pub fn field(&self) -> ProductField {
        match self {
            FieldEdit::Id(_) => ProductField::Id,
            FieldEdit::Name(_) => ProductField::Name,
            FieldEdit::Brand(_) => ProductField::Brand,
            FieldEdit::Category(_) => ProductField::Category,
            FieldEdit::Price(_) => ProductField::Price,
            FieldEdit::Description(_) => ProductField::Description,
            FieldEdit::Img(_) => ProductField::Img,
            FieldEdit::Specs(_) => ProductField::Specs,
            FieldEdit::Features(_) => ProductField::Features,
        }
    }

    pub(crate) fn apply_to(&self, product: &mut Product) {
        match self {
            FieldEdit::Id(v) => product.id = v.clone(),
            FieldEdit::Name(v) => product.name = v.clone(),
            FieldEdit::Brand(v) => product.brand = v.clone(),
            FieldEdit::Category(v) => product.category = v.clone(),
            FieldEdit::Price(v) => product.price = Some(*v),
            FieldEdit::Description(v) => product.description = v.clone(),
            FieldEdit::Img(v) => product.img = v.clone(),
            FieldEdit::Specs(v) => product.specs = v.clone(),
            FieldEdit::Features(v) => product.features = v.clone(),
        }
    }
}
