//! Drives one (category, site) pair from first page to a terminal phase.

use std::time::Duration;

use harvest_core::{
    build_record, dedupe, rank_top_n, AdvanceSignal, Decision, PaginationState, Phase, PlanEntry,
    Strategy,
};
use harvest_logging::{harvest_debug, harvest_info, harvest_warn};

use crate::adapter::SiteAdapter;
use crate::types::{AdvanceOutcome, CategoryHarvest, Completion, FetchError, PageRequest};

/// Per-category knobs the orchestrator hands down.
#[derive(Debug, Clone)]
pub struct HarvestLimits {
    pub top_n: usize,
    /// Pacing delay before each page advance, to stay polite per site.
    pub page_delay: Duration,
}

impl Default for HarvestLimits {
    fn default() -> Self {
        Self {
            top_n: harvest_core::DEFAULT_TOP_N,
            page_delay: Duration::from_millis(500),
        }
    }
}

/// Traverse every page of one category listing, then dedupe and rank.
///
/// A fetch failure ends the traversal but keeps everything accumulated so
/// far; the caller decides nothing here aborts the wider run.
pub async fn harvest_category(
    entry: &PlanEntry,
    adapter: &mut dyn SiteAdapter,
    limits: &HarvestLimits,
) -> CategoryHarvest {
    let mut state = PaginationState::new(entry.strategy);
    let mut records = Vec::new();
    let mut cards_skipped = 0u32;
    let mut completion = Completion::Complete;

    loop {
        let page = state.begin_fetch();
        let request = match entry.strategy {
            Strategy::CountedTotal => PageRequest::Numbered(page),
            Strategy::ClickNext => PageRequest::Current,
        };

        let result = match adapter.fetch_page(request).await {
            Ok(result) => result,
            Err(error) => {
                state.fetch_failed();
                harvest_warn!(
                    "{}/{}: page {page} fetch failed ({error}); keeping {} records",
                    entry.category,
                    entry.site,
                    records.len()
                );
                completion = Completion::Truncated { page, error };
                break;
            }
        };

        state.page_fetched(result.cards.len(), result.reported_total);
        harvest_debug!(
            "{}/{}: page {page} returned {} cards",
            entry.category,
            entry.site,
            result.cards.len()
        );

        for card in &result.cards {
            match build_record(&entry.category, &entry.base_url, adapter.extract_card(card)) {
                Ok(record) => records.push(record),
                Err(skip) => {
                    cards_skipped += 1;
                    harvest_debug!(
                        "{}/{}: card skipped on page {page}, missing {:?}",
                        entry.category,
                        entry.site,
                        skip.missing
                    );
                }
            }
        }
        state.cards_extracted();

        let signal = match entry.strategy {
            Strategy::CountedTotal => AdvanceSignal::Counted,
            Strategy::ClickNext => {
                // Do not click past a zero-card page, nor one whose own
                // markup already shows the control disabled or gone.
                if result.cards.is_empty() || !result.next_enabled {
                    AdvanceSignal::NextControl {
                        advanced: false,
                        page_reported: result.page_hint,
                    }
                } else {
                    match adapter.advance().await {
                        Ok(AdvanceOutcome::Advanced) => AdvanceSignal::NextControl {
                            advanced: true,
                            page_reported: result.page_hint,
                        },
                        Ok(AdvanceOutcome::ControlDisabled | AdvanceOutcome::ControlMissing) => {
                            AdvanceSignal::NextControl {
                                advanced: false,
                                page_reported: result.page_hint,
                            }
                        }
                        Err(error) => {
                            // The click performs the next page load, so a
                            // failure here is the next page's fetch failing.
                            if let Decision::Advance { .. } = state.decide(AdvanceSignal::NextControl {
                                advanced: true,
                                page_reported: result.page_hint,
                            }) {
                                let failed_page = state.begin_fetch();
                                state.fetch_failed();
                                harvest_warn!(
                                    "{}/{}: advance to page {failed_page} failed ({error}); keeping {} records",
                                    entry.category,
                                    entry.site,
                                    records.len()
                                );
                                completion = Completion::Truncated {
                                    page: failed_page,
                                    error,
                                };
                            }
                            break;
                        }
                    }
                }
            }
        };

        match state.decide(signal) {
            Decision::Exhausted => break,
            Decision::Advance { .. } => {
                if !limits.page_delay.is_zero() {
                    tokio::time::sleep(limits.page_delay).await;
                }
            }
        }
    }

    debug_assert!(state.is_terminal());
    let records = rank_top_n(dedupe(records), limits.top_n);
    harvest_info!(
        "{}/{}: {} pages, {} records kept, {} cards skipped, {}",
        entry.category,
        entry.site,
        state.pages_fetched(),
        records.len(),
        cards_skipped,
        if state.phase() == Phase::Failed {
            "cut short"
        } else {
            "complete"
        }
    );

    CategoryHarvest {
        category: entry.category.clone(),
        site: entry.site.clone(),
        records,
        pages_fetched: state.pages_fetched(),
        cards_skipped,
        completion,
    }
}
