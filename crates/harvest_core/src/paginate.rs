//! Pure pagination state machine.
//!
//! The engine drives this type through its phases and performs the actual
//! IO; nothing in here fetches or parses. Phase order is
//! `Idle -> FetchingPage -> ExtractingCards -> DecidingAdvance ->
//! {AdvancingPage -> FetchingPage | Exhausted | Failed}`.

use crate::plan::Strategy;

/// Where a category harvest currently is in its page loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FetchingPage,
    ExtractingCards,
    DecidingAdvance,
    AdvancingPage,
    /// Normal completion: no more pages.
    Exhausted,
    /// Fetch failure; everything accumulated so far stays valid.
    Failed,
}

/// Strategy-dependent input to the advance decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceSignal {
    /// Click-next: whether the next control could be used, and the page
    /// number the pagination widget reports for the page just processed.
    NextControl {
        advanced: bool,
        page_reported: Option<u32>,
    },
    /// Counted-total: the state's own bookkeeping suffices.
    Counted,
}

/// Outcome of [`PaginationState::decide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Advance { next_page: u32 },
    Exhausted,
}

/// Pagination bookkeeping for one category harvest.
///
/// Owned by the driver of a single category; never shared. Page numbers are
/// 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    strategy: Strategy,
    phase: Phase,
    current_page: u32,
    total_known: Option<u32>,
    processed_cards: u32,
    cards_on_page: usize,
    last_reported_page: Option<u32>,
    pages_fetched: u32,
}

impl PaginationState {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            phase: Phase::Idle,
            current_page: 1,
            total_known: None,
            processed_cards: 0,
            cards_on_page: 0,
            last_reported_page: None,
            pages_fetched: 0,
        }
    }

    /// `Idle`/`AdvancingPage` -> `FetchingPage`. Returns the page to request.
    pub fn begin_fetch(&mut self) -> u32 {
        debug_assert!(matches!(self.phase, Phase::Idle | Phase::AdvancingPage));
        self.phase = Phase::FetchingPage;
        self.current_page
    }

    /// `FetchingPage` -> `Failed`.
    pub fn fetch_failed(&mut self) {
        debug_assert_eq!(self.phase, Phase::FetchingPage);
        self.phase = Phase::Failed;
    }

    /// `FetchingPage` -> `ExtractingCards`.
    ///
    /// The reported total is only honored on the first page; later pages
    /// sometimes re-render it with a filtered subset.
    pub fn page_fetched(&mut self, cards_on_page: usize, reported_total: Option<u32>) {
        debug_assert_eq!(self.phase, Phase::FetchingPage);
        self.phase = Phase::ExtractingCards;
        self.pages_fetched += 1;
        self.cards_on_page = cards_on_page;
        self.processed_cards += cards_on_page as u32;
        if self.pages_fetched == 1 {
            self.total_known = reported_total;
        }
    }

    /// `ExtractingCards` -> `DecidingAdvance`.
    pub fn cards_extracted(&mut self) {
        debug_assert_eq!(self.phase, Phase::ExtractingCards);
        self.phase = Phase::DecidingAdvance;
    }

    /// `DecidingAdvance` -> `AdvancingPage` or `Exhausted`.
    ///
    /// A page with zero cards always exhausts, whatever the strategy; it
    /// guards against an off-by-one in total-count bookkeeping.
    pub fn decide(&mut self, signal: AdvanceSignal) -> Decision {
        debug_assert_eq!(self.phase, Phase::DecidingAdvance);

        if self.cards_on_page == 0 {
            return self.exhaust();
        }

        match (self.strategy, signal) {
            (Strategy::CountedTotal, AdvanceSignal::Counted) => {
                // No parsable total on page 1 means the loop has no bound:
                // stop after the single page rather than guess.
                let Some(total) = self.total_known else {
                    return self.exhaust();
                };
                if self.processed_cards >= total {
                    return self.exhaust();
                }
                self.advance()
            }
            (
                Strategy::ClickNext,
                AdvanceSignal::NextControl {
                    advanced,
                    page_reported,
                },
            ) => {
                if !advanced {
                    return self.exhaust();
                }
                // A repeated page number means the click did not move us.
                if page_reported.is_some() && page_reported == self.last_reported_page {
                    return self.exhaust();
                }
                self.last_reported_page = page_reported;
                self.advance()
            }
            // Signal from the wrong strategy: stop rather than loop forever.
            (_, _) => {
                debug_assert!(false, "advance signal does not match strategy");
                self.exhaust()
            }
        }
    }

    fn advance(&mut self) -> Decision {
        self.phase = Phase::AdvancingPage;
        self.current_page += 1;
        Decision::Advance {
            next_page: self.current_page,
        }
    }

    fn exhaust(&mut self) -> Decision {
        self.phase = Phase::Exhausted;
        Decision::Exhausted
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_known(&self) -> Option<u32> {
        self.total_known
    }

    pub fn processed_cards(&self) -> u32 {
        self.processed_cards
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Exhausted | Phase::Failed)
    }
}
