//! Version deduplication: keep one version of each logical document.
//!
//! Files are grouped by their name with version tokens (`v<n>`, `rev<n>`,
//! `final`) stripped, plus their extension, within one source. Among the
//! accepted members of a group the best one is kept and the other accepted
//! members are marked superseded.

use std::cmp::Ordering;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::audit::AuditRecord;
use crate::metadata::DocumentMetadata;

static TOKEN_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_\-\s.]+").expect("token separator pattern is valid"));

static VERSION_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:v(\d+)|rev(\d+)|(final))$").expect("version token pattern is valid")
});

/// Version hints recovered from a file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VersionHints {
    pub is_final: bool,
    pub version: Option<u64>,
    pub revision: Option<u64>,
}

impl VersionHints {
    /// Ordering by hint strength: `final`, then `v<n>`, then `rev<n>`.
    fn rank(&self) -> (bool, Option<u64>, Option<u64>) {
        (self.is_final, self.version, self.revision)
    }
}

/// The grouping key of a file name and the version hints removed from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalName {
    pub key: String,
    pub hints: VersionHints,
}

/// Strip version tokens from a file name.
///
/// ```
/// use docscreen::policy::logical_name;
///
/// let a = logical_name("Report_v2.docx");
/// let b = logical_name("report-final.DOCX");
/// assert_eq!(a.key, b.key);
/// assert_eq!(a.hints.version, Some(2));
/// assert!(b.hints.is_final);
/// ```
pub fn logical_name(file_name: &str) -> LogicalName {
    let (stem, extension) = match file_name.rfind('.') {
        Some(dot) => (&file_name[..dot], file_name[dot..].to_lowercase()),
        None => (file_name, String::new()),
    };

    let mut hints = VersionHints::default();
    let mut kept = Vec::new();

    for token in TOKEN_SPLIT.split(stem).filter(|t| !t.is_empty()) {
        match VERSION_TOKEN.captures(token) {
            Some(caps) => {
                if caps.get(3).is_some() {
                    hints.is_final = true;
                }
                if let Some(n) = caps.get(1).and_then(|m| m.as_str().parse().ok()) {
                    hints.version = hints.version.max(Some(n));
                }
                if let Some(n) = caps.get(2).and_then(|m| m.as_str().parse().ok()) {
                    hints.revision = hints.revision.max(Some(n));
                }
            }
            None => kept.push(token.to_lowercase()),
        }
    }

    LogicalName {
        key: format!("{}{}", kept.join("_"), extension),
        hints,
    }
}

/// Compare two candidates; `Greater` means `a` is the better version.
pub fn compare_versions(a: &DocumentMetadata, b: &DocumentMetadata) -> Ordering {
    let hints_a = logical_name(&a.file_name).hints;
    let hints_b = logical_name(&b.file_name).hints;

    hints_a
        .rank()
        .cmp(&hints_b.rank())
        .then_with(|| compare_timestamps(a, b))
}

fn compare_timestamps(a: &DocumentMetadata, b: &DocumentMetadata) -> Ordering {
    if a.updated_at.is_some() || b.updated_at.is_some() {
        a.updated_at.cmp(&b.updated_at)
    } else {
        a.created_at.cmp(&b.created_at)
    }
}

/// Members of one logical document, by index into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGroup {
    pub source_id: String,
    pub key: String,
    pub members: Vec<usize>,
    pub winner: usize,
}

/// Group documents into logical documents and pick each group's winner.
///
/// Groups are returned in order of first appearance. Among equally ranked
/// members the first one encountered wins.
pub fn group_versions<'a, I>(documents: I) -> Vec<VersionGroup>
where
    I: IntoIterator<Item = &'a DocumentMetadata>,
{
    let documents: Vec<&DocumentMetadata> = documents.into_iter().collect();
    let mut groups: IndexMap<(String, String), Vec<usize>> = IndexMap::new();

    for (idx, meta) in documents.iter().enumerate() {
        let key = logical_name(&meta.file_name).key;
        groups
            .entry((meta.source_id.clone(), key))
            .or_default()
            .push(idx);
    }

    groups
        .into_iter()
        .map(|((source_id, key), members)| {
            let mut winner = members[0];
            for &candidate in &members[1..] {
                if compare_versions(documents[candidate], documents[winner]) == Ordering::Greater {
                    winner = candidate;
                }
            }
            VersionGroup {
                source_id,
                key,
                members,
                winner,
            }
        })
        .collect()
}

/// Mark every non-winning accepted version as superseded.
///
/// Returns one record per input, in input order. Only records the policy
/// accepted compete for a group; records rejected by the policy keep their
/// own decision and never supersede an accepted version.
pub fn deduplicate(records: Vec<AuditRecord>) -> Vec<AuditRecord> {
    let accepted: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| r.decision().is_accepted())
        .map(|(idx, _)| idx)
        .collect();
    let groups = group_versions(accepted.iter().map(|&idx| records[idx].metadata()));
    let mut out = records.clone();

    for group in groups.iter().filter(|g| g.members.len() > 1) {
        let winner = accepted[group.winner];
        let winner_name = records[winner].metadata().file_name.clone();
        debug!(
            source_id = %group.source_id,
            key = %group.key,
            winner = %winner_name,
            versions = group.members.len(),
            "Selected latest version"
        );
        for idx in group.members.iter().map(|&m| accepted[m]).filter(|&idx| idx != winner) {
            out[idx] = records[idx].superseded_by(&winner_name);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{normalize, MetadataInput};
    use crate::policy::{evaluate, Decision};
    use chrono::{TimeZone, Utc};

    fn doc(path: &str) -> DocumentMetadata {
        normalize(MetadataInput::new("filesource", path))
    }

    #[test]
    fn test_logical_name_strips_tokens() {
        assert_eq!(logical_name("report_v1.docx").key, "report.docx");
        assert_eq!(logical_name("report-rev12.docx").hints.revision, Some(12));
        assert_eq!(logical_name("Q3 Plan FINAL.pdf").key, "q3_plan.pdf");
        assert_eq!(logical_name("report.docx").hints, VersionHints::default());
    }

    #[test]
    fn test_logical_name_keeps_extension_distinct() {
        assert_ne!(logical_name("report_v1.docx").key, logical_name("report_v1.pdf").key);
    }

    #[test]
    fn test_logical_name_ignores_embedded_tokens() {
        // "finalize" and "v2x" are not version tokens
        let name = logical_name("finalize_v2x.md");
        assert_eq!(name.key, "finalize_v2x.md");
        assert!(!name.hints.is_final);
        assert_eq!(name.hints.version, None);
    }

    #[test]
    fn test_final_beats_numeric_version() {
        let a = doc("/d/final/report_final.docx");
        let b = doc("/d/final/report_v9.docx");
        assert_eq!(compare_versions(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_higher_version_wins() {
        let a = doc("/d/final/report_v10.docx");
        let b = doc("/d/final/report_v2.docx");
        assert_eq!(compare_versions(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_timestamp_fallback() {
        let older = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let newer = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let a = normalize(MetadataInput::new("s", "/d/final/report.docx").with_updated_at(newer));
        let b = normalize(MetadataInput::new("s", "/d/final/report.docx").with_updated_at(older));
        assert_eq!(compare_versions(&a, &b), Ordering::Greater);

        let a = normalize(MetadataInput::new("s", "/d/final/report.docx").with_created_at(older));
        let b = normalize(MetadataInput::new("s", "/d/final/report.docx").with_created_at(newer));
        assert_eq!(compare_versions(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_ties_keep_first() {
        let docs = vec![doc("/a/final/report.md"), doc("/b/final/report.md")];
        let groups = group_versions(&docs);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].winner, 0);
    }

    #[test]
    fn test_groups_are_scoped_per_source() {
        let docs = vec![
            normalize(MetadataInput::new("one", "/final/report_v1.md")),
            normalize(MetadataInput::new("two", "/final/report_v2.md")),
        ];
        assert_eq!(group_versions(&docs).len(), 2);
    }

    #[test]
    fn test_deduplicate_marks_losers() {
        let records: Vec<_> = ["report_v1.docx", "report_v2.docx", "report_final.docx"]
            .iter()
            .map(|name| evaluate(doc(&format!("/docs/final/{name}"))))
            .collect();

        let out = deduplicate(records);

        assert_eq!(out[0].decision(), Decision::RejectedSuperseded);
        assert_eq!(out[1].decision(), Decision::RejectedSuperseded);
        assert_eq!(out[2].decision(), Decision::Accepted);
        assert!(out[0].reason().contains("report_final.docx"));
    }

    #[test]
    fn test_rejected_versions_do_not_compete() {
        let records = vec![
            evaluate(doc("/docs/final/report_v2.docx")),
            evaluate(normalize(
                MetadataInput::new("filesource", "/docs/final/report_v3.docx").with_tags(["draft"]),
            )),
            evaluate(doc("/docs/final/data_v1.xlsx")),
            evaluate(doc("/docs/final/data_v2.xlsx")),
        ];
        let out = deduplicate(records);

        assert_eq!(out[0].decision(), Decision::Accepted);
        assert_eq!(out[1].decision(), Decision::RejectedDraft);
        assert_eq!(out[2].decision(), Decision::RejectedNonDocument);
        assert_eq!(out[3].decision(), Decision::RejectedNonDocument);
        assert_eq!(out.iter().filter(|r| r.decision().is_accepted()).count(), 1);
    }

    #[test]
    fn test_all_rejected_group_keeps_decisions() {
        let records = vec![
            evaluate(doc("/docs/staging/spec_v1.md")),
            evaluate(doc("/docs/staging/spec_v2.md")),
        ];
        let out = deduplicate(records);
        assert_eq!(out[0].decision(), Decision::RejectedMissingFinalSignal);
        assert_eq!(out[1].decision(), Decision::RejectedMissingFinalSignal);
    }
}
