use std::fmt;

use harvest_core::ProductRecord;

/// One product card's markup fragment, opaque to the core.
///
/// Owned by the extractor for the duration of a single `extract_card` call
/// and never retained across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCard {
    pub html: String,
}

/// How a page is addressed, depending on the pagination strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    /// Counted-total: request this 1-based page number.
    Numbered(u32),
    /// Click-next: whatever page the session currently shows.
    Current,
}

/// One fetched page worth of raw cards plus pagination hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult {
    pub cards: Vec<RawCard>,
    /// Site-reported total product count, when the page renders one.
    pub reported_total: Option<u32>,
    /// Local more-pages signal as the page itself renders it. Advisory: the
    /// paginator's own exhaustion rules still apply.
    pub next_enabled: bool,
    /// Page number the pagination widget claims, when readable.
    pub page_hint: Option<u32>,
}

/// Result of trying to advance an interactive session to the next page.
///
/// `ControlDisabled` and `ControlMissing` are exhaustion signals, not
/// errors: a listing's last page renders its next control that way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    Advanced,
    ControlDisabled,
    ControlMissing,
}

/// A page fetch that failed. Terminal for the current category harvest,
/// never for the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    UnsupportedContentType { content_type: String },
    Decode { encoding: String },
    DeadlineExceeded,
    Cancelled,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::UnsupportedContentType { content_type } => {
                write!(f, "unsupported content type {content_type}")
            }
            FailureKind::Decode { encoding } => write!(f, "undecodable as {encoding}"),
            FailureKind::DeadlineExceeded => write!(f, "run deadline exceeded"),
            FailureKind::Cancelled => write!(f, "cancelled"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Whether a category harvest ran to natural exhaustion or was cut short.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Complete,
    Truncated { page: u32, error: FetchError },
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        matches!(self, Completion::Complete)
    }
}

/// The ranked, deduplicated outcome of one (category, site) pair.
///
/// Immutable once produced; the unit handed to the output sink. Partial
/// results from a truncated harvest are valid output.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryHarvest {
    pub category: String,
    pub site: String,
    pub records: Vec<ProductRecord>,
    pub pages_fetched: u32,
    pub cards_skipped: u32,
    pub completion: Completion,
}
