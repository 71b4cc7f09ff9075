//! Validated run configuration: the category -> (site, base URL, strategy)
//! table, in declaration order.

use std::fmt;

use url::Url;

/// How an adapter reaches the next page of a category listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// An interactive next control is advanced between pages; exhaustion is
    /// a disabled or missing control.
    ClickNext,
    /// Pages are requested by number until the running card count reaches
    /// the total reported on page 1.
    CountedTotal,
}

impl Strategy {
    /// Parse the configuration value (`click-next` / `counted-total`).
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "click-next" => Some(Self::ClickNext),
            "counted-total" => Some(Self::CountedTotal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClickNext => "click-next",
            Self::CountedTotal => "counted-total",
        }
    }
}

/// One (category, site) harvest to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub category: String,
    pub site: String,
    pub base_url: Url,
    pub strategy: Strategy,
}

/// The full run configuration. Entry order is the aggregation order of the
/// final output, regardless of how the harvests are scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestPlan {
    pub entries: Vec<PlanEntry>,
}

/// A malformed plan. Fatal to the whole run, reported before any harvesting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    Empty,
    EmptyCategory { index: usize },
    EmptySite { index: usize },
    RelativeBaseUrl { category: String, site: String },
    DuplicateEntry { category: String, site: String },
}

impl fmt::Display for PlanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanError::Empty => write!(f, "plan has no entries"),
            PlanError::EmptyCategory { index } => {
                write!(f, "entry {index} has an empty category label")
            }
            PlanError::EmptySite { index } => write!(f, "entry {index} has an empty site label"),
            PlanError::RelativeBaseUrl { category, site } => {
                write!(f, "base url for {category}/{site} is not absolute")
            }
            PlanError::DuplicateEntry { category, site } => {
                write!(f, "duplicate entry for {category}/{site}")
            }
        }
    }
}

impl std::error::Error for PlanError {}

impl HarvestPlan {
    pub fn new(entries: Vec<PlanEntry>) -> Self {
        Self { entries }
    }

    /// Reject plans the orchestrator cannot run: empty tables, blank labels,
    /// non-absolute base URLs, and repeated (category, site) pairs.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.entries.is_empty() {
            return Err(PlanError::Empty);
        }
        let mut seen = std::collections::HashSet::new();
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.category.trim().is_empty() {
                return Err(PlanError::EmptyCategory { index });
            }
            if entry.site.trim().is_empty() {
                return Err(PlanError::EmptySite { index });
            }
            if entry.base_url.cannot_be_a_base() {
                return Err(PlanError::RelativeBaseUrl {
                    category: entry.category.clone(),
                    site: entry.site.clone(),
                });
            }
            if !seen.insert((entry.category.clone(), entry.site.clone())) {
                return Err(PlanError::DuplicateEntry {
                    category: entry.category.clone(),
                    site: entry.site.clone(),
                });
            }
        }
        Ok(())
    }
}
