//! Counted-total reference adapter for the Pet Valu catalog.
//!
//! Pages are plain HTTP, addressed as `{base}?page=N`; the first page's
//! "x - y of N Products" header bounds the traversal.

use harvest_core::CardFields;
use scraper::{Html, Selector};
use url::Url;

use crate::adapter::SiteAdapter;
use crate::fetch::PageFetcher;
use crate::types::{FetchError, PageRequest, PageResult, RawCard};

const SITE_ID: &str = "petvalu";

pub struct PetValuAdapter {
    fetcher: PageFetcher,
    base_url: Url,
}

impl PetValuAdapter {
    pub fn new(fetcher: PageFetcher, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    fn page_url(&self, page: u32) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }
}

#[async_trait::async_trait]
impl SiteAdapter for PetValuAdapter {
    fn site_id(&self) -> &str {
        SITE_ID
    }

    async fn fetch_page(&mut self, request: PageRequest) -> Result<PageResult, FetchError> {
        let page = match request {
            PageRequest::Numbered(page) => page,
            PageRequest::Current => 1,
        };
        let html = self.fetcher.fetch_html(&self.page_url(page)).await?;
        let doc = Html::parse_document(&html);

        let cards = Selector::parse("div.product-tile__details")
            .ok()
            .map(|sel| {
                doc.select(&sel)
                    .map(|tile| RawCard { html: tile.html() })
                    .collect()
            })
            .unwrap_or_default();

        let range = parse_listing_range(&doc);
        Ok(PageResult {
            cards,
            reported_total: range.map(|(_, total)| total),
            next_enabled: range.is_some_and(|(last_shown, total)| last_shown < total),
            page_hint: Some(page),
        })
    }

    fn extract_card(&self, card: &RawCard) -> CardFields {
        let tile = Html::parse_fragment(&card.html);
        let mut fields = CardFields::default();

        if let Ok(sel) = Selector::parse("div.title p") {
            let joined = tile
                .select(&sel)
                .map(|p| p.text().collect::<String>().trim().to_string())
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !joined.is_empty() {
                fields.name = Some(joined);
            }
        }

        fields.link = Selector::parse("div.title a")
            .ok()
            .and_then(|sel| tile.select(&sel).next())
            .and_then(|a| a.value().attr("href"))
            .map(str::to_string);

        fields.price = Selector::parse("div.price p")
            .ok()
            .and_then(|sel| tile.select(&sel).next())
            .map(|p| p.text().collect::<String>().trim().to_string())
            .filter(|price| !price.is_empty());

        // Reviews block: first <p> is the rating, the count renders as "(n)".
        if let Some(block) = Selector::parse("div.reviews__information")
            .ok()
            .and_then(|sel| tile.select(&sel).next())
        {
            if let Ok(sel) = Selector::parse("p") {
                fields.rating = block
                    .select(&sel)
                    .next()
                    .and_then(|p| p.text().collect::<String>().trim().parse::<f32>().ok());
            }
            let text = block.text().collect::<String>();
            fields.review_count = parenthesized_count(&text);
        }

        fields
    }
}

/// Pull (last shown, total) from the "1 - 36 of 128 Products" listing header.
fn parse_listing_range(doc: &Html) -> Option<(u32, u32)> {
    let sel = Selector::parse("div.filters-sort-order-wrapper p").ok()?;
    doc.select(&sel).find_map(|p| {
        let text = p.text().collect::<String>();
        let (shown, rest) = text.split_once("of")?;
        let last_shown = shown.rsplit('-').next()?.trim().replace(',', "").parse().ok()?;
        let total = rest
            .split("Products")
            .next()?
            .trim()
            .replace(',', "")
            .parse()
            .ok()?;
        Some((last_shown, total))
    })
}

fn parenthesized_count(text: &str) -> Option<u32> {
    let start = text.find('(')?;
    let end = text[start..].find(')')? + start;
    text[start + 1..end].trim().replace(',', "").parse().ok()
}
