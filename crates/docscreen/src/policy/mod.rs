//! Accept/reject policy and version deduplication.

mod decision;
mod dedup;
mod rules;

pub use decision::Decision;
pub use dedup::{
    compare_versions, deduplicate, group_versions, logical_name, LogicalName, VersionGroup,
    VersionHints,
};
pub use rules::{
    evaluate, evaluate_with, PolicyConfig, PolicyEngine, ALLOWED_EXTENSIONS, DRAFT_HINTS,
    FINAL_FOLDER_HINTS, REASON_ACCEPTED, REASON_DRAFT, REASON_MISSING_FINAL_SIGNAL,
    REASON_NON_DOCUMENT, RELEASED_STATUS_HINTS,
};
