//! Config-driven harvest runner: reads a RON plan, harvests every
//! (category, site) pair, and writes the ranked table plus a run manifest.

mod config;
mod logging;

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use harvest_core::PlanEntry;
use harvest_engine::{
    run_harvest, sites::petsmart_next_control, sites::PetSmartAdapter, sites::PetValuAdapter,
    AdapterFactory, CsvSink, CsvSinkOptions, FailureKind, FetchError, FetchSettings,
    LinkFollowSession, OutputSink, PageFetcher, SiteAdapter,
};
use harvest_logging::{harvest_error, harvest_info, harvest_warn};

const DEFAULT_CONFIG_PATH: &str = "harvest.ron";
const LOG_FILE: &str = "harvest.log";

/// Maps validated site identifiers to adapter instances. Each call builds a
/// fresh adapter (and session) so concurrent harvests share nothing.
struct SiteDirectory {
    fetch_settings: FetchSettings,
}

impl AdapterFactory for SiteDirectory {
    fn make(&self, entry: &PlanEntry) -> Result<Box<dyn SiteAdapter>, FetchError> {
        let fetcher = PageFetcher::new(self.fetch_settings.clone())?;
        match entry.site.as_str() {
            "petvalu" => Ok(Box::new(PetValuAdapter::new(
                fetcher,
                entry.base_url.clone(),
            ))),
            "petsmart" => {
                let session = LinkFollowSession::new(
                    fetcher,
                    entry.base_url.clone(),
                    petsmart_next_control(),
                );
                Ok(Box::new(PetSmartAdapter::new(session)))
            }
            // Config validation rejects unknown sites before we get here.
            other => Err(FetchError {
                kind: FailureKind::InvalidUrl,
                message: format!("no adapter registered for site '{other}'"),
            }),
        }
    }
}

fn main() -> ExitCode {
    let verbose = std::env::var_os("HARVEST_DEBUG").is_some();
    logging::initialize(Some(Path::new(LOG_FILE)), verbose);

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = match config::load_config(Path::new(&config_path)) {
        Ok(config) => config,
        Err(err) => {
            harvest_error!("{config_path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            harvest_error!("failed to start runtime: {err}");
            return ExitCode::FAILURE;
        }
    };

    let factory = Arc::new(SiteDirectory {
        fetch_settings: config.fetch_settings.clone(),
    });
    harvest_info!(
        "starting harvest: {} entries, {} workers",
        config.plan.entries.len(),
        config.run_settings.workers
    );
    let harvests = match runtime.block_on(run_harvest(
        &config.plan,
        factory,
        &config.run_settings,
    )) {
        Ok(harvests) => harvests,
        Err(err) => {
            harvest_error!("invalid plan: {err}");
            return ExitCode::FAILURE;
        }
    };

    for harvest in &harvests {
        if harvest.completion.is_complete() {
            harvest_info!(
                "{}/{}: {} records, complete",
                harvest.category,
                harvest.site,
                harvest.records.len()
            );
        } else {
            harvest_warn!(
                "{}/{}: {} records, cut short",
                harvest.category,
                harvest.site,
                harvest.records.len()
            );
        }
    }

    let sink = CsvSink::new(
        config.output_dir.clone(),
        CsvSinkOptions {
            generated_utc: Some(
                chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            ),
            ..CsvSinkOptions::default()
        },
    );
    match sink.write_run(&harvests) {
        Ok(summary) => {
            harvest_info!(
                "wrote {} rows to {}",
                summary.rows,
                summary.table_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            harvest_error!("failed to write output: {err}");
            ExitCode::FAILURE
        }
    }
}
