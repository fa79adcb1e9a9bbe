//! Pipeline stages and the events they produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

use super::state::PipelineState;

/// One step event emitted by a stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageEvent {
    /// Name of the stage that produced the event.
    pub author: String,
    /// Text payload; may be empty.
    pub text: String,
    pub emitted_at: DateTime<Utc>,
}

impl StageEvent {
    pub fn new(author: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            text: text.into(),
            emitted_at: Utc::now(),
        }
    }

    /// Trimmed payload, or `None` when the event carries no text.
    pub fn payload(&self) -> Option<&str> {
        let text = self.text.trim();
        (!text.is_empty()).then_some(text)
    }
}

/// Lazily produced events of one stage run.
pub type StageEvents<'a> = Box<dyn Iterator<Item = Result<StageEvent>> + 'a>;

/// A unit of work in a sequential pipeline.
///
/// A stage reads and writes the shared [`PipelineState`] and yields its
/// events in order. An `Err` item is fatal to the run.
pub trait Stage: Send {
    /// Name used as event author and in logs.
    fn name(&self) -> &str;

    /// Start the stage. The returned iterator is drained before the next
    /// stage starts.
    fn run<'a>(&'a self, state: &'a mut PipelineState) -> StageEvents<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_trims() {
        assert_eq!(StageEvent::new("s", "  [] \n").payload(), Some("[]"));
        assert_eq!(StageEvent::new("s", " \n\t").payload(), None);
    }
}
