//! Screening passes over a run's candidate list.
//!
//! The [`DeterministicScreener`] is the reproducible core. A
//! [`JudgmentScreener`] layers an external [`JudgmentProvider`] on top of it
//! and can only narrow the selection.

mod judge;
mod screener;

pub use judge::{JudgmentProvider, MockJudge, ScreenedFile, CONFIDENTIAL_HINTS, TEMPORARY_HINTS};
pub use screener::{DeterministicScreener, JudgmentOverride, JudgmentScreener, Screener, Screening};
