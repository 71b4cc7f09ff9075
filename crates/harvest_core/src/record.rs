use url::Url;

/// Sentinel stored in [`ProductRecord::price`] when no price renders on the card.
pub const PRICE_UNKNOWN: &str = "unknown";

/// One normalized product listing, comparable across sites.
///
/// `link` is always absolute (resolved against the site base URL at build
/// time), `review_count` is 0 when the site shows no review data, `rating`
/// is `None` when no rating markup is present, and `price` keeps the
/// site-native formatting verbatim or the [`PRICE_UNKNOWN`] sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub category: String,
    pub name: String,
    pub link: String,
    pub review_count: u32,
    pub rating: Option<f32>,
    pub price: String,
}

impl ProductRecord {
    /// Structural identity over every field, usable as a hash key.
    ///
    /// The rating is keyed by its bit pattern so that records differing only
    /// in rating are distinct and `NaN` never leaks in (ratings are
    /// validated on construction).
    pub(crate) fn dedupe_key(&self) -> (String, String, String, u32, Option<u32>, String) {
        (
            self.category.clone(),
            self.name.clone(),
            self.link.clone(),
            self.review_count,
            self.rating.map(f32::to_bits),
            self.price.clone(),
        )
    }
}

/// Resolve a card's href against the site base URL.
///
/// Absolute hrefs pass through unchanged; fragment-only, query-only and
/// javascript pseudo-links resolve to nothing, as do empty hrefs.
pub fn absolutize_link(base: &Url, href: &str) -> Option<String> {
    let trimmed = href.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with('?') || lower.starts_with("javascript:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(String::from(url));
    }
    base.join(trimmed).ok().map(String::from)
}
