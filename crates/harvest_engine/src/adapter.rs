//! The per-site capability boundary consumed by the harvest driver.

use harvest_core::CardFields;

use crate::types::{AdvanceOutcome, FetchError, PageRequest, PageResult, RawCard};

/// Site-specific page access and card parsing.
///
/// One adapter instance serves exactly one running category harvest; the
/// driver advances pages strictly sequentially, so implementations may keep
/// cursor state without synchronization. Adapters are `Send` so harvests can
/// run as independent tasks, but they are never shared between tasks.
#[async_trait::async_trait]
pub trait SiteAdapter: Send {
    /// Stable identifier used in logs and the output manifest.
    fn site_id(&self) -> &str;

    /// Retrieve one page of the category listing.
    async fn fetch_page(&mut self, request: PageRequest) -> Result<PageResult, FetchError>;

    /// Pull raw field values out of one card. Parsing only; the
    /// mandatory/optional policy is applied uniformly by the core.
    fn extract_card(&self, card: &RawCard) -> CardFields;

    /// Move an interactive session to the next page.
    ///
    /// Counted-total adapters never receive this call; the default reports
    /// the control as missing, which the paginator reads as exhaustion.
    async fn advance(&mut self) -> Result<AdvanceOutcome, FetchError> {
        Ok(AdvanceOutcome::ControlMissing)
    }
}
