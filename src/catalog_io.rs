//! Reading catalog files and writing JSON/CSV exports.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Serializer, Value as JsonValue};

use crate::editor_error::EditorError;
use crate::product_collection::{first_duplicate_id, import_id};
use crate::product_model::Product;

/// Column order of the CSV export.
pub const CSV_HEADERS: [&str; 9] = ["id", "name", "brand", "category", "price", "description", "img", "specs", "features"];

/// Parses a loaded file into a collection.
///
/// The buffer must hold a JSON array of objects. Records with a missing,
/// `null` or blank id get `prod-<now_ms>-<index>`. Ids must be unique.
pub fn parse_import(buffer: &str, now_ms: i64) -> Result<Vec<Product>, EditorError> {
    let parsed: JsonValue = serde_json::from_str(buffer.trim_start_matches('\u{feff}'))
        .map_err(|e| EditorError::Import(format!("Error parsing JSON file. Please check the file format. ({})", e)))?;

    let JsonValue::Array(records) = parsed else {
        return Err(EditorError::Import("Expected a JSON array of products.".to_string()));
    };

    let mut products = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let JsonValue::Object(mut fields) = record else {
            return Err(EditorError::Import(format!("Entry {} is not a product object.", index)));
        };

        let missing_id = match fields.get("id") {
            None | Some(JsonValue::Null) => true,
            Some(JsonValue::String(id)) => id.trim().is_empty(),
            Some(_) => false,
        };
        if missing_id {
            fields.insert("id".to_string(), JsonValue::String(import_id(now_ms, index)));
        }

        let product: Product = serde_json::from_value(JsonValue::Object(fields))
            .map_err(|e| EditorError::Import(format!("Entry {}: {}", index, e)))?;
        products.push(product);
    }

    if let Some(duplicate) = first_duplicate_id(&products) {
        return Err(EditorError::Import(format!("ID \"{}\" appears more than once.", duplicate)));
    }

    Ok(products)
}

/// Pretty-printed JSON array using `indent` spaces per level.
pub fn export_json(products: &[Product], indent: usize) -> Result<String, EditorError> {
    let indent = vec![b' '; indent];
    let mut out = Vec::new();
    {
        let mut serializer = Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        products.serialize(&mut serializer)?;
    }
    String::from_utf8(out).map_err(|e| EditorError::Serialization(e.to_string()))
}

/// CSV with a header row; `specs` and `features` are JSON-encoded cells.
pub fn export_csv(products: &[Product]) -> Result<String, EditorError> {
    let mut rows = Vec::with_capacity(products.len() + 1);
    rows.push(CSV_HEADERS.join(","));

    for product in products {
        let cells = [
            product.id.clone(),
            product.name.clone(),
            product.brand.clone(),
            product.category.clone(),
            product.price.map(format_price).unwrap_or_default(),
            product.description.clone(),
            product.img.clone(),
            serde_json::to_string(&product.specs)?,
            serde_json::to_string(&product.features)?,
        ];
        let escaped: Vec<String> = cells.iter().map(|cell| escape_csv_cell(cell)).collect();
        rows.push(escaped.join(","));
    }

    Ok(rows.join("\n"))
}

/// Shortest round-trip text for a price, switching to exponent form
/// (`1e+21`, `1.5e-7`) outside `1e-6..1e21` like JavaScript number output.
pub fn format_price(price: f64) -> String {
    if price == 0.0 {
        return "0".to_string();
    }
    let magnitude = price.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let text = format!("{:e}", price);
        return match text.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => format!("{}e+{}", mantissa, exponent),
            _ => text,
        };
    }
    price.to_string()
}

/// Quotes a cell (doubling inner quotes) when it holds a comma, quote or newline.
pub fn escape_csv_cell(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// `products.json` becomes `products.csv`; other names get `.csv` appended.
pub fn csv_file_name(file_name: &str) -> String {
    let len = file_name.len();
    if len >= 5 && file_name.is_char_boundary(len - 5) && file_name[len - 5..].eq_ignore_ascii_case(".json") {
        format!("{}.csv", &file_name[..len - 5])
    } else {
        format!("{}.csv", file_name)
    }
}
