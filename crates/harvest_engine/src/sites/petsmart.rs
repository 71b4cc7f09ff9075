//! Click-next reference adapter for the PetSmart catalog (sparky design
//! system markup), driven through a [`PageSession`].
//!
//! Price precedence: the sparky price group can render both a sale and a
//! struck-through regular price; the sale price wins, and the regular price
//! is only used when no sale price is present.

use harvest_core::CardFields;
use scraper::{ElementRef, Html, Selector};

use crate::adapter::SiteAdapter;
use crate::session::{NextControl, PageSession};
use crate::types::{AdvanceOutcome, FetchError, PageRequest, PageResult, RawCard};

const SITE_ID: &str = "petsmart";

/// Where PetSmart renders its next-page control.
pub fn petsmart_next_control() -> NextControl {
    NextControl {
        anchor: r#"li[data-testid="paginate-last-item"] > a"#.to_string(),
        disabled_class: "disabled".to_string(),
    }
}

pub struct PetSmartAdapter<S: PageSession> {
    session: S,
}

impl<S: PageSession> PetSmartAdapter<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

#[async_trait::async_trait]
impl<S: PageSession> SiteAdapter for PetSmartAdapter<S> {
    fn site_id(&self) -> &str {
        SITE_ID
    }

    async fn fetch_page(&mut self, request: PageRequest) -> Result<PageResult, FetchError> {
        debug_assert_eq!(request, PageRequest::Current);
        let html = self.session.current_html().await?;
        let doc = Html::parse_document(&html);

        let cards = Selector::parse("div.sparky-l-grid__item")
            .ok()
            .map(|sel| {
                doc.select(&sel)
                    .map(|item| RawCard { html: item.html() })
                    .collect()
            })
            .unwrap_or_default();

        Ok(PageResult {
            cards,
            reported_total: None,
            next_enabled: next_control_enabled(&doc),
            page_hint: parse_current_page(&doc),
        })
    }

    fn extract_card(&self, card: &RawCard) -> CardFields {
        let item = Html::parse_fragment(&card.html);
        let mut fields = CardFields::default();

        if let Some(anchor) = Selector::parse("a.sparky-c-product-card__text-link")
            .ok()
            .and_then(|sel| item.select(&sel).next())
        {
            let name = anchor.text().collect::<String>().trim().to_string();
            if !name.is_empty() {
                fields.name = Some(name);
            }
            fields.link = anchor.value().attr("href").map(str::to_string);
        }

        // Review count renders as "(532)" after the star icons.
        fields.review_count = Selector::parse("div.sparky-c-star-rating__rating-after")
            .ok()
            .and_then(|sel| item.select(&sel).next())
            .and_then(|div| {
                let text = div.text().collect::<String>();
                text.trim()
                    .trim_matches(['(', ')'].as_ref())
                    .replace(',', "")
                    .parse()
                    .ok()
            });

        // Rating only exists in the icon block's aria-label, "4.5 out of 5".
        fields.rating = Selector::parse("div.sparky-c-star-rating__icons")
            .ok()
            .and_then(|sel| item.select(&sel).next())
            .and_then(|div| div.value().attr("aria-label"))
            .and_then(|label| label.split("out of").next())
            .and_then(|prefix| prefix.trim().parse::<f32>().ok());

        fields.price = extract_price(&item);

        fields
    }

    async fn advance(&mut self) -> Result<AdvanceOutcome, FetchError> {
        self.session.click_next().await
    }
}

fn extract_price(item: &Html) -> Option<String> {
    let sel = Selector::parse("div.sparky-c-price").ok()?;
    let prices: Vec<_> = item.select(&sel).collect();
    let chosen = prices
        .iter()
        .find(|div| div.value().classes().any(|c| c == "sparky-c-price--sale"))
        .or_else(|| prices.first())?;
    let text = chosen.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn next_control_enabled(doc: &Html) -> bool {
    let Ok(sel) = Selector::parse(r#"li[data-testid="paginate-last-item"] > a"#) else {
        return false;
    };
    doc.select(&sel).next().is_some_and(|anchor| {
        let on_anchor = anchor.value().classes().any(|class| class == "disabled")
            || anchor.value().attr("aria-disabled") == Some("true");
        let on_parent = anchor
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|li| li.value().classes().any(|class| class == "disabled"));
        !(on_anchor || on_parent)
    })
}

fn parse_current_page(doc: &Html) -> Option<u32> {
    let sel = Selector::parse(r#"li[data-testid="paginate-current-item"]"#).ok()?;
    doc.select(&sel)
        .next()
        .and_then(|li| li.text().collect::<String>().trim().parse().ok())
}
