//! Property-based tests for the policy engine, normalizer, and deduplicator.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p docscreen --test property_tests
//!
//! # Run with more cases
//! PROPTEST_CASES=10000 cargo test -p docscreen --test property_tests
//! ```

use std::collections::HashMap;

use proptest::prelude::*;

use docscreen::metadata::{normalize, MetadataInput};
use docscreen::policy::{
    deduplicate, evaluate, group_versions, Decision, ALLOWED_EXTENSIONS, DRAFT_HINTS,
};

// =============================================================================
// Test Strategies
// =============================================================================

fn extension() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(".md".to_string()),
        Just(".PDF".to_string()),
        Just(".docx".to_string()),
        Just(".xlsx".to_string()),
        Just(".png".to_string()),
        Just(String::new()),
        "\\.[a-z]{1,5}",
    ]
}

fn folder() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("/docs/final".to_string()),
        Just("/docs/Approved".to_string()),
        Just("/docs/staging".to_string()),
        Just("C:\\share\\final".to_string()),
        "/[a-z]{1,8}(/[a-z]{1,8}){0,2}",
    ]
}

fn stem() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z]{1,10}",
        "[a-z]{1,8}_v[0-9]{1,2}",
        "[a-z]{1,8}-rev[0-9]{1,2}",
        "[a-z]{1,8}_final",
        "[a-z]{1,8}_draft",
        "[A-Za-z ]{1,12}",
    ]
}

fn status() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("released".to_string())),
        Just(Some("Frozen".to_string())),
        Just(Some("review".to_string())),
    ]
}

fn input() -> impl Strategy<Value = MetadataInput> {
    (folder(), stem(), extension(), status(), prop::collection::vec("[a-z ]{0,12}", 0..3)).prop_map(
        |(folder, stem, extension, status, tags)| {
            let sep = if folder.contains('\\') { "\\" } else { "/" };
            let mut input = MetadataInput::new("filesource", format!("{folder}{sep}{stem}{extension}"))
                .with_tags(tags);
            if let Some(status) = status {
                input = input.with_status(status);
            }
            input
        },
    )
}

// =============================================================================
// Policy properties
// =============================================================================

proptest! {
    #[test]
    fn prop_evaluate_is_deterministic(input in input()) {
        let meta = normalize(input);
        let a = evaluate(meta.clone());
        let b = evaluate(meta);
        prop_assert_eq!(a.decision(), b.decision());
        prop_assert_eq!(a.reason(), b.reason());
    }

    #[test]
    fn prop_evaluate_never_supersedes(input in input()) {
        let record = evaluate(normalize(input));
        prop_assert_ne!(record.decision(), Decision::RejectedSuperseded);
        prop_assert!(!record.reason().is_empty());
    }

    #[test]
    fn prop_unknown_extension_always_wins(input in input()) {
        let meta = normalize(input);
        let allowed = ALLOWED_EXTENSIONS.contains(&meta.extension.as_str());
        let decision = evaluate(meta).decision();
        if !allowed {
            prop_assert_eq!(decision, Decision::RejectedNonDocument);
        } else {
            prop_assert_ne!(decision, Decision::RejectedNonDocument);
        }
    }

    #[test]
    fn prop_draft_beats_final_signal(input in input()) {
        let meta = normalize(input);
        let name = meta.file_name.to_lowercase();
        let is_draft = DRAFT_HINTS.iter().any(|h| name.contains(h))
            || meta.tags.iter().any(|t| DRAFT_HINTS.iter().any(|h| t.to_lowercase().contains(h)));
        let allowed = ALLOWED_EXTENSIONS.contains(&meta.extension.as_str());
        let decision = evaluate(meta).decision();
        if allowed && is_draft {
            prop_assert_eq!(decision, Decision::RejectedDraft);
        }
        if decision == Decision::Accepted {
            prop_assert!(!is_draft);
        }
    }
}

// =============================================================================
// Normalizer properties
// =============================================================================

proptest! {
    #[test]
    fn prop_normalize_is_consistent_with_path(input in input()) {
        let meta = normalize(input);
        let path = meta.source_path.replace('\\', "/");

        prop_assert_eq!(format!("{}{}", meta.source_location, meta.file_name), path);
        prop_assert!(!meta.file_name.contains('/'));
        prop_assert_eq!(&meta.extension, &meta.extension.to_lowercase());
        if meta.extension.is_empty() {
            prop_assert!(!meta.file_name.contains('.'));
        } else {
            prop_assert!(meta.file_name.to_lowercase().ends_with(&meta.extension));
        }
    }
}

// =============================================================================
// Deduplication properties
// =============================================================================

proptest! {
    #[test]
    fn prop_one_winner_per_group(inputs in prop::collection::vec(input(), 0..20)) {
        let docs: Vec<_> = inputs.into_iter().map(normalize).collect();
        let evaluated: Vec<_> = docs.iter().cloned().map(evaluate).collect();
        let records = deduplicate(evaluated.clone());
        prop_assert_eq!(records.len(), docs.len());

        let accepted: Vec<usize> = (0..docs.len())
            .filter(|&idx| evaluated[idx].decision() == Decision::Accepted)
            .collect();
        let groups = group_versions(accepted.iter().map(|&idx| &docs[idx]));
        prop_assert_eq!(groups.iter().map(|g| g.members.len()).sum::<usize>(), accepted.len());

        // policy rejections pass through untouched
        for (before, after) in evaluated.iter().zip(&records) {
            if before.decision() != Decision::Accepted {
                prop_assert_eq!(before.decision(), after.decision());
                prop_assert_eq!(before.reason(), after.reason());
            }
        }

        let mut survivors: HashMap<(String, String), usize> = HashMap::new();
        for group in &groups {
            prop_assert!(group.members.contains(&group.winner));
            for &member in &group.members {
                let idx = accepted[member];
                let superseded = records[idx].decision() == Decision::RejectedSuperseded;
                prop_assert_eq!(superseded, member != group.winner);
                if !superseded {
                    *survivors
                        .entry((group.source_id.clone(), group.key.clone()))
                        .or_default() += 1;
                }
            }
        }
        prop_assert!(survivors.values().all(|&n| n == 1));
    }
}
