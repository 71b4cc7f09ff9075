//! Uniform field-extraction policy applied to every raw card.
//!
//! Site adapters only pull raw field values out of markup; whether a missing
//! field skips the card or falls back to a default is decided here, once,
//! for every site. Evaluation order is fixed: name, link, review count,
//! rating, price.

use url::Url;

use crate::record::{absolutize_link, ProductRecord, PRICE_UNKNOWN};

/// Raw field values pulled from one card by a site adapter.
///
/// `None` means the field's markup was absent or unparsable. The link is the
/// raw href as it appears on the page; absolutization happens in
/// [`build_record`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardFields {
    pub name: Option<String>,
    pub link: Option<String>,
    pub review_count: Option<u32>,
    pub rating: Option<f32>,
    pub price: Option<String>,
}

/// Fields a card cannot be emitted without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryField {
    Name,
    Link,
}

/// A card was dropped because a mandatory field could not be resolved.
///
/// This is a per-record skip decision, never an error: the rest of the page
/// keeps extracting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSkip {
    pub missing: MandatoryField,
}

/// Whether a field may default or forces a skip when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Mandatory,
    /// Documented default, for display in diagnostics.
    Optional { default: &'static str },
}

/// The per-field policy, in evaluation order. Kept as data so the
/// mandatory/optional split is auditable in one place.
pub const FIELD_RULES: &[(&str, Requirement)] = &[
    ("name", Requirement::Mandatory),
    ("link", Requirement::Mandatory),
    ("review_count", Requirement::Optional { default: "0" }),
    ("rating", Requirement::Optional { default: "absent" }),
    ("price", Requirement::Optional { default: PRICE_UNKNOWN }),
];

/// Apply the field policy to one card's raw values.
///
/// Pure: the same inputs always produce the same record or skip. A rating
/// outside [0, 5] or non-finite is treated as absent rather than poisoning
/// the record.
pub fn build_record(
    category: &str,
    base: &Url,
    fields: CardFields,
) -> Result<ProductRecord, ExtractionSkip> {
    let name = match fields.name.map(|n| n.trim().to_string()) {
        Some(name) if !name.is_empty() => name,
        _ => {
            return Err(ExtractionSkip {
                missing: MandatoryField::Name,
            })
        }
    };

    let link = fields
        .link
        .as_deref()
        .and_then(|href| absolutize_link(base, href))
        .ok_or(ExtractionSkip {
            missing: MandatoryField::Link,
        })?;

    let review_count = fields.review_count.unwrap_or(0);
    let rating = fields
        .rating
        .filter(|r| r.is_finite() && (0.0..=5.0).contains(r));
    let price = match fields.price.map(|p| p.trim().to_string()) {
        Some(price) if !price.is_empty() => price,
        _ => PRICE_UNKNOWN.to_string(),
    };

    Ok(ProductRecord {
        category: category.to_string(),
        name,
        link,
        review_count,
        rating,
        price,
    })
}
