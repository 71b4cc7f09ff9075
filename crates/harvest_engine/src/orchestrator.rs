//! Runs every plan entry and aggregates results in declaration order.

use std::sync::Arc;
use std::time::Duration;

use harvest_core::{HarvestPlan, PlanEntry, PlanError};
use harvest_logging::{harvest_info, harvest_warn};
use tokio::sync::Semaphore;

use crate::adapter::SiteAdapter;
use crate::harvest::{harvest_category, HarvestLimits};
use crate::types::{CategoryHarvest, Completion, FailureKind, FetchError};

/// Builds one adapter (and its session, where the site needs one) per plan
/// entry. A fresh adapter per running harvest keeps session state unshared.
pub trait AdapterFactory: Send + Sync {
    fn make(&self, entry: &PlanEntry) -> Result<Box<dyn SiteAdapter>, FetchError>;
}

#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Bounded worker pool size. 1 gives strictly sequential harvesting.
    pub workers: usize,
    pub top_n: usize,
    pub page_delay: Duration,
    /// Optional whole-run deadline; categories that cannot finish in time
    /// are reported as truncated, completed ones are kept.
    pub run_deadline: Option<Duration>,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            workers: 2,
            top_n: harvest_core::DEFAULT_TOP_N,
            page_delay: Duration::from_millis(500),
            run_deadline: None,
        }
    }
}

/// Harvest every plan entry and return one `CategoryHarvest` per entry, in
/// plan order regardless of completion order.
///
/// Only a malformed plan is fatal; any per-category failure is folded into
/// that category's result.
pub async fn run_harvest(
    plan: &HarvestPlan,
    factory: Arc<dyn AdapterFactory>,
    settings: &RunSettings,
) -> Result<Vec<CategoryHarvest>, PlanError> {
    plan.validate()?;

    let semaphore = Arc::new(Semaphore::new(settings.workers.max(1)));
    let deadline = settings
        .run_deadline
        .map(|budget| tokio::time::Instant::now() + budget);
    let limits = HarvestLimits {
        top_n: settings.top_n,
        page_delay: settings.page_delay,
    };

    let mut handles = Vec::with_capacity(plan.entries.len());
    for entry in plan.entries.iter().cloned() {
        let semaphore = semaphore.clone();
        let factory = factory.clone();
        let limits = limits.clone();
        handles.push(tokio::spawn(async move {
            let run = async {
                let Ok(_permit) = semaphore.acquire().await else {
                    return cut_short(&entry, FailureKind::Cancelled, "worker pool closed");
                };
                harvest_info!("{}/{}: harvest starting", entry.category, entry.site);
                match factory.make(&entry) {
                    Ok(mut adapter) => harvest_category(&entry, adapter.as_mut(), &limits).await,
                    Err(error) => {
                        harvest_warn!(
                            "{}/{}: adapter setup failed ({error})",
                            entry.category,
                            entry.site
                        );
                        cut_short(&entry, error.kind, error.message)
                    }
                }
            };
            match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, run).await {
                    Ok(harvest) => harvest,
                    Err(_) => {
                        harvest_warn!(
                            "{}/{}: run deadline reached",
                            entry.category,
                            entry.site
                        );
                        cut_short(&entry, FailureKind::DeadlineExceeded, "run deadline reached")
                    }
                },
                None => run.await,
            }
        }));
    }

    let mut harvests = Vec::with_capacity(handles.len());
    for (entry, handle) in plan.entries.iter().zip(handles) {
        let harvest = match handle.await {
            Ok(harvest) => harvest,
            Err(err) => {
                harvest_warn!(
                    "{}/{}: harvest task aborted ({err})",
                    entry.category,
                    entry.site
                );
                cut_short(entry, FailureKind::Cancelled, err.to_string())
            }
        };
        harvests.push(harvest);
    }
    Ok(harvests)
}

fn cut_short(entry: &PlanEntry, kind: FailureKind, message: impl Into<String>) -> CategoryHarvest {
    CategoryHarvest {
        category: entry.category.clone(),
        site: entry.site.clone(),
        records: Vec::new(),
        pages_fetched: 0,
        cards_skipped: 0,
        completion: Completion::Truncated {
            page: 1,
            error: FetchError {
                kind,
                message: message.into(),
            },
        },
    }
}
