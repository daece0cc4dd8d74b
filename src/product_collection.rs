//! Next-state operations over the product collection.
//!
//! Every function here takes the current collection by reference and
//! returns a brand new one (or an error, in which case nothing was
//! changed). Installing the result, recording history and updating the
//! selection is the session's job.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::{Chars, FromStr};

use serde::{Deserialize, Serialize};

use crate::editable_field::{FieldEdit, ProductField};
use crate::editor_error::EditorError;
use crate::product_model::Product;

/// Id given to a record created from the editor.
///
/// Falls back to `prod-<ms>-<n>` when several records are created within
/// the same millisecond.
pub fn generate_id(products: &[Product], now_ms: i64) -> String {
    let base = format!("prod-{}", now_ms);
    if find_index(products, &base).is_none() {
        return base;
    }
    let mut suffix = 1;
    loop {
        let candidate = format!("{}-{}", base, suffix);
        if find_index(products, &candidate).is_none() {
            return candidate;
        }
        suffix += 1;
    }
}

/// Id given to an imported record that arrived without one.
pub fn import_id(now_ms: i64, index: usize) -> String {
    format!("prod-{}-{}", now_ms, index)
}

pub fn find_index(products: &[Product], id: &str) -> Option<usize> {
    products.iter().position(|p| p.id == id)
}

/// First id that occurs more than once, if any.
pub fn first_duplicate_id(products: &[Product]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(products.len());
    products.iter().map(|p| p.id.as_str()).find(|id| !seen.insert(*id))
}

/// Checks the collection-wide rules every installed state must satisfy:
/// ids are non-empty and unique, prices are finite.
pub fn check_invariants(products: &[Product]) -> Result<(), EditorError> {
    if let Some(position) = products.iter().position(|p| p.id.trim().is_empty()) {
        return Err(EditorError::InvalidValue(format!("Product at position {} has an empty ID.", position)));
    }
    if let Some(duplicate) = first_duplicate_id(products) {
        return Err(EditorError::DuplicateId(duplicate.to_string()));
    }
    if let Some(product) = products.iter().find(|p| p.price.is_some_and(|price| !price.is_finite())) {
        return Err(EditorError::InvalidValue(format!("Product \"{}\" has a non-finite price.", product.id)));
    }
    Ok(())
}

/// Replaces one field of the record identified by `target_id`.
///
/// Changing the id to one already used by another record fails with
/// [`EditorError::DuplicateId`].
pub fn set_field(products: &[Product], target_id: &str, edit: &FieldEdit) -> Result<Vec<Product>, EditorError> {
    edit.validate()?;
    let index = find_index(products, target_id).ok_or_else(|| EditorError::ProductNotFound(target_id.to_string()))?;

    if let FieldEdit::Id(new_id) = edit {
        let taken = products.iter().enumerate().any(|(i, p)| i != index && &p.id == new_id);
        if taken {
            return Err(EditorError::DuplicateId(new_id.clone()));
        }
    }

    let mut next = products.to_vec();
    edit.apply_to(&mut next[index]);
    Ok(next)
}

/// Prepends `product`.
pub fn add_record(products: &[Product], product: Product) -> Vec<Product> {
    let mut next = Vec::with_capacity(products.len() + 1);
    next.push(product);
    next.extend_from_slice(products);
    next
}

pub fn delete_record(products: &[Product], target_id: &str) -> Result<Vec<Product>, EditorError> {
    let index = find_index(products, target_id).ok_or_else(|| EditorError::ProductNotFound(target_id.to_string()))?;
    let mut next = products.to_vec();
    next.remove(index);
    Ok(next)
}

pub fn delete_many(products: &[Product], ids: &BTreeSet<String>) -> Vec<Product> {
    products.iter().filter(|p| !ids.contains(&p.id)).cloned().collect()
}

/// Applies one edit to every record whose id is in `ids`.
pub fn bulk_set(products: &[Product], ids: &BTreeSet<String>, edit: &FieldEdit) -> Result<Vec<Product>, EditorError> {
    if ids.is_empty() {
        return Err(EditorError::EmptySelection("No products selected for bulk edit.".to_string()));
    }
    if !edit.field().is_bulk_editable() {
        return Err(EditorError::FieldNotEditable(format!("{} cannot be bulk edited", edit.field())));
    }
    edit.validate()?;

    let mut next = products.to_vec();
    for product in next.iter_mut().filter(|p| ids.contains(&p.id)) {
        edit.apply_to(product);
    }
    Ok(next)
}

/// Uniform random permutation (Fisher-Yates).
pub fn shuffle(products: &[Product], rng: &mut fastrand::Rng) -> Vec<Product> {
    let mut next = products.to_vec();
    for i in (1..next.len()).rev() {
        let j = rng.usize(..=i);
        next.swap(i, j);
    }
    next
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A sort request such as `price_asc` or `name_desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: ProductField,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: ProductField, order: SortOrder) -> Result<Self, EditorError> {
        if matches!(field, ProductField::Specs | ProductField::Features) {
            return Err(EditorError::FieldNotEditable(format!("cannot sort by {}", field)));
        }
        Ok(Self { field, order })
    }
}

impl Display for SortSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let order = match self.order {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        };
        write!(f, "{}_{}", self.field, order)
    }
}

impl FromStr for SortSpec {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, order) = s
            .trim()
            .rsplit_once('_')
            .ok_or_else(|| EditorError::InvalidValue(format!("sort \"{}\" must look like <field>_<asc|desc>", s)))?;
        let order = match order.to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            other => return Err(EditorError::InvalidValue(format!("unknown sort order \"{}\"", other))),
        };
        SortSpec::new(key.parse()?, order)
    }
}

/// Reorders the collection. Prices compare numerically (missing = 0), text
/// fields compare case-insensitively with embedded numbers in numeric order.
pub fn sort_by(products: &[Product], spec: SortSpec) -> Vec<Product> {
    let mut next = products.to_vec();
    next.sort_by(|a, b| {
        let ordering = match spec.field {
            ProductField::Price => a.price_or_zero().total_cmp(&b.price_or_zero()),
            field => natural_cmp(sort_text(a, field), sort_text(b, field)),
        };
        match spec.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    next
}

fn sort_text(product: &Product, field: ProductField) -> &str {
    match field {
        ProductField::Id => &product.id,
        ProductField::Name => &product.name,
        ProductField::Brand => &product.brand,
        ProductField::Category => &product.category,
        ProductField::Description => &product.description,
        ProductField::Img => &product.img,
        ProductField::Price | ProductField::Specs | ProductField::Features => "",
    }
}

/// Case-insensitive comparison where digit runs compare by numeric value,
/// so `"Item 9"` sorts before `"item 10"`.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let lhs = take_digits(&mut left);
                let rhs = take_digits(&mut right);
                let (lhs, rhs) = (lhs.trim_start_matches('0'), rhs.trim_start_matches('0'));
                let ordering = lhs.len().cmp(&rhs.len()).then_with(|| lhs.cmp(rhs));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                left.next();
                right.next();
                let ordering = x.to_lowercase().cmp(y.to_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}
