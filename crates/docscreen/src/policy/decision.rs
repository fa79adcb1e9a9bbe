//! Screening decisions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of screening one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Eligible for downstream processing.
    Accepted,
    /// File name or tags mark the document as a draft.
    RejectedDraft,
    /// No final folder hint and no released status.
    RejectedMissingFinalSignal,
    /// Extension is outside the document allow-list.
    RejectedNonDocument,
    /// Another version of the same logical document was selected.
    RejectedSuperseded,
}

impl Decision {
    /// Every decision, in report order.
    pub const ALL: [Decision; 5] = [
        Decision::Accepted,
        Decision::RejectedDraft,
        Decision::RejectedMissingFinalSignal,
        Decision::RejectedNonDocument,
        Decision::RejectedSuperseded,
    ];

    /// Wire name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Accepted => "accepted",
            Decision::RejectedDraft => "rejected_draft",
            Decision::RejectedMissingFinalSignal => "rejected_missing_final_signal",
            Decision::RejectedNonDocument => "rejected_non_document",
            Decision::RejectedSuperseded => "rejected_superseded",
        }
    }

    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Decision::Accepted => "Accepted",
            Decision::RejectedDraft => "Draft",
            Decision::RejectedMissingFinalSignal => "Missing final signal",
            Decision::RejectedNonDocument => "Not a document",
            Decision::RejectedSuperseded => "Superseded",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Decision::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_match_serde() {
        for decision in Decision::ALL {
            let json = serde_json::to_string(&decision).unwrap();
            assert_eq!(json, format!("\"{}\"", decision.as_str()));
        }
    }

    #[test]
    fn test_decision_checks() {
        assert!(Decision::Accepted.is_accepted());
        assert!(Decision::RejectedSuperseded.is_rejected());
        assert!(!Decision::RejectedDraft.is_accepted());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Decision::RejectedDraft.label(), "Draft");
        assert_eq!(Decision::Accepted.to_string(), "accepted");
    }
}
