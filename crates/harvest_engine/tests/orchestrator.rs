use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use harvest_core::{CardFields, HarvestPlan, PlanEntry, PlanError, Strategy};
use harvest_engine::{
    run_harvest, AdapterFactory, Completion, FailureKind, FetchError, PageRequest, PageResult,
    RawCard, RunSettings, SiteAdapter,
};
use pretty_assertions::assert_eq;
use url::Url;

fn entry(category: &str) -> PlanEntry {
    PlanEntry {
        category: category.to_string(),
        site: "scripted".to_string(),
        base_url: Url::parse("https://shop.example.com/").unwrap(),
        strategy: Strategy::CountedTotal,
    }
}

fn settings(workers: usize) -> RunSettings {
    RunSettings {
        workers,
        page_delay: Duration::ZERO,
        ..RunSettings::default()
    }
}

fn one_card_page(name: &str) -> Result<PageResult, FetchError> {
    Ok(PageResult {
        cards: vec![RawCard {
            html: name.to_string(),
        }],
        reported_total: Some(1),
        next_enabled: false,
        page_hint: None,
    })
}

/// Scripted per-category behavior for the factory below.
#[derive(Clone, Default)]
struct Script {
    pages: Vec<Result<PageResult, FetchError>>,
    fetch_delay: Duration,
    fail_setup: bool,
}

struct ScriptedFactory {
    scripts: HashMap<String, Script>,
}

impl AdapterFactory for ScriptedFactory {
    fn make(&self, entry: &PlanEntry) -> Result<Box<dyn SiteAdapter>, FetchError> {
        let script = self.scripts.get(&entry.category).cloned().unwrap_or_default();
        if script.fail_setup {
            return Err(FetchError {
                kind: FailureKind::Network,
                message: "session could not be opened".to_string(),
            });
        }
        Ok(Box::new(ScriptedAdapter {
            pages: script.pages.into(),
            fetch_delay: script.fetch_delay,
        }))
    }
}

struct ScriptedAdapter {
    pages: VecDeque<Result<PageResult, FetchError>>,
    fetch_delay: Duration,
}

#[async_trait::async_trait]
impl SiteAdapter for ScriptedAdapter {
    fn site_id(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&mut self, _request: PageRequest) -> Result<PageResult, FetchError> {
        if !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
        }
        self.pages.pop_front().unwrap_or(Ok(PageResult {
            cards: Vec::new(),
            reported_total: None,
            next_enabled: false,
            page_hint: None,
        }))
    }

    fn extract_card(&self, card: &RawCard) -> CardFields {
        CardFields {
            name: Some(card.html.clone()),
            link: Some(format!("/p/{}", card.html)),
            review_count: Some(1),
            ..CardFields::default()
        }
    }
}

#[tokio::test(start_paused = true)]
async fn aggregate_preserves_plan_order_despite_completion_order() {
    // The first entry is slow; with two workers the others finish first.
    let scripts = HashMap::from([
        (
            "Cat Dry Food".to_string(),
            Script {
                pages: vec![one_card_page("slow")],
                fetch_delay: Duration::from_millis(200),
                ..Script::default()
            },
        ),
        (
            "Cat Wet Food".to_string(),
            Script {
                pages: vec![one_card_page("quick")],
                ..Script::default()
            },
        ),
        (
            "Dog Toys".to_string(),
            Script {
                pages: vec![one_card_page("quicker")],
                ..Script::default()
            },
        ),
    ]);
    let plan = HarvestPlan::new(vec![
        entry("Cat Dry Food"),
        entry("Cat Wet Food"),
        entry("Dog Toys"),
    ]);

    let harvests = run_harvest(&plan, Arc::new(ScriptedFactory { scripts }), &settings(2))
        .await
        .unwrap();

    let categories: Vec<&str> = harvests.iter().map(|h| h.category.as_str()).collect();
    assert_eq!(categories, vec!["Cat Dry Food", "Cat Wet Food", "Dog Toys"]);
    assert!(harvests.iter().all(|h| h.completion.is_complete()));
    assert!(harvests.iter().all(|h| h.records.len() == 1));
}

#[tokio::test]
async fn one_failing_category_never_stops_the_others() {
    let scripts = HashMap::from([
        (
            "Cat Dry Food".to_string(),
            Script {
                pages: vec![one_card_page("a")],
                ..Script::default()
            },
        ),
        (
            "Cat Wet Food".to_string(),
            Script {
                fail_setup: true,
                ..Script::default()
            },
        ),
        (
            "Dog Toys".to_string(),
            Script {
                pages: vec![one_card_page("b")],
                ..Script::default()
            },
        ),
    ]);
    let plan = HarvestPlan::new(vec![
        entry("Cat Dry Food"),
        entry("Cat Wet Food"),
        entry("Dog Toys"),
    ]);

    let harvests = run_harvest(&plan, Arc::new(ScriptedFactory { scripts }), &settings(1))
        .await
        .unwrap();

    assert_eq!(harvests.len(), 3);
    assert!(harvests[0].completion.is_complete());
    assert!(matches!(
        harvests[1].completion,
        Completion::Truncated { ref error, .. } if error.kind == FailureKind::Network
    ));
    assert!(harvests[2].completion.is_complete());
}

#[tokio::test]
async fn malformed_plan_is_fatal_before_any_harvesting() {
    let factory = Arc::new(ScriptedFactory {
        scripts: HashMap::new(),
    });
    let err = run_harvest(&HarvestPlan::default(), factory, &settings(1))
        .await
        .unwrap_err();
    assert_eq!(err, PlanError::Empty);
}

#[tokio::test(start_paused = true)]
async fn run_deadline_truncates_unfinished_categories_and_keeps_finished_ones() {
    let scripts = HashMap::from([
        (
            "Cat Dry Food".to_string(),
            Script {
                pages: vec![one_card_page("fast")],
                ..Script::default()
            },
        ),
        (
            "Cat Wet Food".to_string(),
            Script {
                pages: vec![one_card_page("never")],
                fetch_delay: Duration::from_secs(3600),
                ..Script::default()
            },
        ),
    ]);
    let plan = HarvestPlan::new(vec![entry("Cat Dry Food"), entry("Cat Wet Food")]);
    let settings = RunSettings {
        workers: 1,
        page_delay: Duration::ZERO,
        run_deadline: Some(Duration::from_secs(1)),
        ..RunSettings::default()
    };

    let harvests = run_harvest(&plan, Arc::new(ScriptedFactory { scripts }), &settings)
        .await
        .unwrap();

    assert!(harvests[0].completion.is_complete());
    assert_eq!(harvests[0].records.len(), 1);
    assert!(matches!(
        harvests[1].completion,
        Completion::Truncated { ref error, .. }
            if error.kind == FailureKind::DeadlineExceeded
    ));
}
