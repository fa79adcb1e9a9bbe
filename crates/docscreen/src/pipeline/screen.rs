//! Screening stage: classify the candidate list written by ingestion.

use tracing::info;

use crate::audit::AuditReport;
use crate::error::DocscreenError;
use crate::screening::{DeterministicScreener, Screener, Screening};

use super::stage::{Stage, StageEvent, StageEvents};
use super::state::PipelineState;

/// Runs a [`Screener`] over `PipelineState::file_list`.
///
/// Emits a short summary followed by the screened list as a JSON array. An
/// empty or missing candidate list yields a single `[]` event.
pub struct ScreeningStage {
    screener: Box<dyn Screener>,
}

impl ScreeningStage {
    pub const NAME: &'static str = "screening";

    pub fn new(screener: impl Screener + 'static) -> Self {
        Self {
            screener: Box::new(screener),
        }
    }

    /// Stage backed by the rule engine alone.
    pub fn deterministic() -> Self {
        Self::new(DeterministicScreener::new())
    }

    pub fn screener(&self) -> &dyn Screener {
        self.screener.as_ref()
    }
}

impl Default for ScreeningStage {
    fn default() -> Self {
        Self::deterministic()
    }
}

impl std::fmt::Debug for ScreeningStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreeningStage")
            .field("screener", &self.screener.name())
            .finish()
    }
}

impl Stage for ScreeningStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run<'a>(&'a self, state: &'a mut PipelineState) -> StageEvents<'a> {
        let candidates = state.candidates();
        if candidates.is_empty() {
            info!(screener = self.screener.name(), "No candidates to screen");
            state.screened_list = Some(Vec::new());
            state.audit_report = Some(AuditReport::from_records(Vec::new()));
            return Box::new(std::iter::once(Ok(StageEvent::new(Self::NAME, "[]"))));
        }

        let screening = match self
            .screener
            .screen(candidates, state.screening_rules.as_ref())
        {
            Ok(screening) => screening,
            Err(e) => {
                return Box::new(std::iter::once(Err(DocscreenError::stage(
                    Self::NAME,
                    e.to_string(),
                ))));
            }
        };

        let json = match serde_json::to_string_pretty(&screening.files) {
            Ok(json) => json,
            Err(e) => return Box::new(std::iter::once(Err(e.into()))),
        };

        let Screening {
            records,
            files,
            overrides,
        } = screening;
        let report = AuditReport::from_records(records);
        let selected = files.iter().filter(|f| f.is_selected).count();

        info!(
            screener = self.screener.name(),
            total = files.len(),
            selected,
            overrides = overrides.len(),
            "Screened candidates"
        );

        let summary = format!(
            "Screened {} files with {}: {} selected, {} rejected",
            files.len(),
            self.screener.name(),
            selected,
            files.len() - selected
        );

        state.screened_list = Some(files);
        state.audit_report = Some(report);
        state.judgment_overrides = overrides;

        Box::new(
            [
                Ok(StageEvent::new(Self::NAME, summary)),
                Ok(StageEvent::new(Self::NAME, json)),
            ]
            .into_iter(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::metadata::{normalize, MetadataInput};
    use crate::policy::Decision;
    use crate::screening::{JudgmentScreener, MockJudge, ScreenedFile};

    fn state_with(paths: &[&str]) -> PipelineState {
        PipelineState::new().with_file_list(
            paths
                .iter()
                .map(|p| normalize(MetadataInput::new("filesource", *p)))
                .collect(),
        )
    }

    #[test]
    fn test_empty_list_emits_empty_array() {
        let stage = ScreeningStage::deterministic();

        let mut state = PipelineState::new();
        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].text, "[]");

        let mut state = state_with(&[]);
        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();
        assert_eq!(events[0].text, "[]");
        assert_eq!(state.audit_report.unwrap().total_evaluated, 0);
    }

    #[test]
    fn test_writes_screened_list_and_report() {
        let stage = ScreeningStage::deterministic();
        let mut state = state_with(&[
            "/docs/final/report_v2.docx",
            "/docs/final/report_final.docx",
            "/docs/wip/notes.md",
        ]);

        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();
        assert_eq!(events.len(), 2);

        let screened: Vec<ScreenedFile> = serde_json::from_str(&events[1].text).unwrap();
        assert_eq!(screened.len(), 3);
        assert_eq!(state.screened_list.as_ref().unwrap(), &screened);

        let report = state.audit_report.unwrap();
        assert_eq!(report.count(Decision::Accepted), 1);
        assert_eq!(report.count(Decision::RejectedSuperseded), 1);
        assert_eq!(report.count(Decision::RejectedMissingFinalSignal), 1);
    }

    #[test]
    fn test_judgment_overrides_land_in_state() {
        let stage = ScreeningStage::new(JudgmentScreener::new(MockJudge::new()));
        let mut state = state_with(&["/docs/final/salaries_confidential.pdf"]);

        stage.run(&mut state).for_each(drop);

        assert_eq!(state.judgment_overrides.len(), 1);
        assert!(!state.screened_list.unwrap()[0].is_selected);
    }
}
