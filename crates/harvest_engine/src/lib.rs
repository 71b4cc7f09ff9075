//! Harvest engine: page fetching, site adapters, and the run orchestrator.
mod adapter;
mod decode;
mod fetch;
mod harvest;
mod orchestrator;
mod session;
mod sink;
pub mod sites;
mod types;

pub use adapter::SiteAdapter;
pub use decode::{decode_page, DecodeError, DecodedPage};
pub use fetch::{FetchSettings, PageFetcher};
pub use harvest::{harvest_category, HarvestLimits};
pub use orchestrator::{run_harvest, AdapterFactory, RunSettings};
pub use session::{LinkFollowSession, NextControl, PageSession};
pub use sink::{
    ensure_output_dir, AtomicFileWriter, CsvSink, CsvSinkOptions, OutputSink, SinkError,
    SinkSummary,
};
pub use types::{
    AdvanceOutcome, CategoryHarvest, Completion, FailureKind, FetchError, PageRequest, PageResult,
    RawCard,
};
