//! Harvest core: pure record model, pagination state machine, and ranking.
mod dedupe;
mod extract;
mod paginate;
mod plan;
mod rank;
mod record;

pub use dedupe::dedupe;
pub use extract::{build_record, CardFields, ExtractionSkip, MandatoryField, Requirement, FIELD_RULES};
pub use paginate::{AdvanceSignal, Decision, PaginationState, Phase};
pub use plan::{HarvestPlan, PlanEntry, PlanError, Strategy};
pub use rank::{rank_top_n, DEFAULT_TOP_N};
pub use record::{absolutize_link, ProductRecord, PRICE_UNKNOWN};
