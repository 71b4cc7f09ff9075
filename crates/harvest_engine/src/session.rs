//! Interactive paging sessions for click-next sites.
//!
//! The originals drove a process-wide browser; here the session is an
//! explicit handle owned by one category harvest, acquired at its start and
//! dropped at its end.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::fetch::PageFetcher;
use crate::types::{AdvanceOutcome, FailureKind, FetchError};

/// A paging session: shows one page at a time and can try to move forward.
#[async_trait::async_trait]
pub trait PageSession: Send {
    /// HTML of the page the session currently shows.
    async fn current_html(&mut self) -> Result<String, FetchError>;

    /// Activate the next-page control, reporting a disabled or missing
    /// control as an outcome rather than an error.
    async fn click_next(&mut self) -> Result<AdvanceOutcome, FetchError>;
}

/// Where a site renders its next-page control.
#[derive(Debug, Clone)]
pub struct NextControl {
    /// CSS selector for the next-control anchor.
    pub anchor: String,
    /// Class name that marks the anchor (or its parent) as disabled.
    pub disabled_class: String,
}

/// HTTP-backed [`PageSession`] that "clicks" by following the next-control
/// anchor's href. Stands in for a browser session wherever the next link is
/// present in the served markup.
pub struct LinkFollowSession {
    fetcher: PageFetcher,
    current_url: Url,
    control: NextControl,
    current_html: Option<String>,
}

impl LinkFollowSession {
    pub fn new(fetcher: PageFetcher, start_url: Url, control: NextControl) -> Self {
        Self {
            fetcher,
            current_url: start_url,
            control,
            current_html: None,
        }
    }

    fn find_next_href(&self, html: &str) -> Result<Option<String>, AdvanceOutcome> {
        let Ok(selector) = Selector::parse(&self.control.anchor) else {
            return Err(AdvanceOutcome::ControlMissing);
        };
        let doc = Html::parse_document(html);
        let Some(anchor) = doc.select(&selector).next() else {
            return Err(AdvanceOutcome::ControlMissing);
        };
        if self.is_disabled(anchor) {
            return Err(AdvanceOutcome::ControlDisabled);
        }
        Ok(anchor.value().attr("href").map(str::to_string))
    }

    fn is_disabled(&self, anchor: ElementRef<'_>) -> bool {
        let marker = self.control.disabled_class.as_str();
        if anchor.value().classes().any(|class| class == marker) {
            return true;
        }
        if anchor.value().attr("aria-disabled") == Some("true") {
            return true;
        }
        anchor
            .parent()
            .and_then(ElementRef::wrap)
            .map(|parent| parent.value().classes().any(|class| class == marker))
            .unwrap_or(false)
    }
}

#[async_trait::async_trait]
impl PageSession for LinkFollowSession {
    async fn current_html(&mut self) -> Result<String, FetchError> {
        if let Some(html) = &self.current_html {
            return Ok(html.clone());
        }
        let html = self.fetcher.fetch_html(&self.current_url).await?;
        self.current_html = Some(html.clone());
        Ok(html)
    }

    async fn click_next(&mut self) -> Result<AdvanceOutcome, FetchError> {
        let html = self.current_html().await?;
        let href = match self.find_next_href(&html) {
            Ok(Some(href)) => href,
            Ok(None) => return Ok(AdvanceOutcome::ControlMissing),
            Err(outcome) => return Ok(outcome),
        };
        let next_url = self
            .current_url
            .join(&href)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let html = self.fetcher.fetch_html(&next_url).await?;
        self.current_url = next_url;
        self.current_html = Some(html);
        Ok(AdvanceOutcome::Advanced)
    }
}
