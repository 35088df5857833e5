//! Property-based tests for rust_logger_bridge using proptest

use proptest::prelude::*;
use rust_logger_bridge::prelude::*;
use rust_logger_bridge::report::{
    map_severity, map_severity_code, module_matches, BackendLevel, StackCapture, StackFrame,
    StaticFrames,
};
use std::sync::Arc;

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Debug),
        Just(Severity::Info),
        Just(Severity::Warn),
        Just(Severity::Error),
        Just(Severity::Fatal),
    ]
}

fn fields() -> impl Strategy<Value = Vec<Field>> {
    prop::collection::vec(("[a-z]{1,6}", any::<i64>()), 0..6)
        .prop_map(|pairs| pairs.into_iter().map(|(k, v)| field(k, v)).collect())
}

fn rendered(snapshot: &FieldSnapshot) -> Vec<String> {
    snapshot.iter().map(|f| f.to_string()).collect()
}

// ============================================================================
// Severity Tests
// ============================================================================

proptest! {
    /// Severity string conversions roundtrip
    #[test]
    fn test_severity_str_roundtrip(level in severity()) {
        let parsed: Severity = level.to_str().parse().unwrap();
        prop_assert_eq!(level, parsed);
    }

    /// Severity order agrees with its numeric code
    #[test]
    fn test_severity_ordering(a in severity(), b in severity()) {
        prop_assert_eq!(a <= b, a.code() <= b.code());
        prop_assert_eq!(map_severity(a) <= map_severity(b), a <= b);
    }

    /// Every code maps to a backend level; unknown codes map to the most severe
    #[test]
    fn test_mapper_is_total(code in any::<i32>()) {
        let mapped = map_severity_code(code);
        match Severity::from_code(code) {
            Some(level) => prop_assert_eq!(mapped, map_severity(level)),
            None => prop_assert_eq!(mapped, BackendLevel::Fatal),
        }
    }
}

// ============================================================================
// FieldSnapshot Tests
// ============================================================================

proptest! {
    /// Appending in two steps equals appending once, and the base never changes
    #[test]
    fn test_snapshot_accumulation_is_associative(
        base in fields(),
        first in fields(),
        second in fields(),
    ) {
        let snapshot = FieldSnapshot::from_fields(base.clone());
        let before = rendered(&snapshot);

        let stepwise = snapshot.with(first.clone()).with(second.clone());
        let combined = snapshot.with(first.iter().cloned().chain(second.iter().cloned()));

        prop_assert_eq!(rendered(&stepwise), rendered(&combined));
        prop_assert_eq!(rendered(&snapshot), before);
        prop_assert_eq!(stepwise.len(), base.len() + first.len() + second.len());
    }

    /// Sibling snapshots never see each other's fields
    #[test]
    fn test_sibling_snapshots_are_independent(base in fields(), left in fields(), right in fields()) {
        let snapshot = FieldSnapshot::from_fields(base.clone());
        let a = snapshot.with(left.clone());
        let b = snapshot.with(right.clone());

        prop_assert_eq!(a.len(), base.len() + left.len());
        prop_assert_eq!(b.len(), base.len() + right.len());
        let tail: Vec<String> = rendered(&b).split_off(base.len());
        let expected: Vec<String> = right.iter().map(|f| f.to_string()).collect();
        prop_assert_eq!(tail, expected);
    }
}

// ============================================================================
// Stack Filtering Tests
// ============================================================================

proptest! {
    /// Ignoring frames i..=j of N leaves exactly N - (j - i + 1) frames
    #[test]
    fn test_filtered_frame_count(
        (n, i, j) in (1usize..24).prop_flat_map(|n| (Just(n), 0..n)).prop_flat_map(|(n, i)| (Just(n), Just(i), i..n))
    ) {
        let frames: Vec<StackFrame> = (0..n)
            .map(|k| {
                let module = if (i..=j).contains(&k) {
                    format!("vendor::layer{}", k)
                } else {
                    format!("app::layer{}", k)
                };
                StackFrame::new(module, format!("f{}", k))
            })
            .collect();

        let capture = StackCapture::with_source(
            IgnoredModules::new(["vendor"]),
            Arc::new(StaticFrames(frames)),
        );
        let kept = n - (j - i + 1);

        match capture.capture() {
            Some(trace) => {
                prop_assert_eq!(trace.len(), kept);
                prop_assert!(trace.frames().iter().all(|f| f.module.starts_with("app::")));
            }
            None => prop_assert_eq!(kept, 0),
        }
    }

    /// Prefixes match whole path segments only
    #[test]
    fn test_prefix_matches_path_segments(prefix in "[a-z_]{1,8}", rest in "[a-z_]{1,8}") {
        let child = format!("{}::{}", prefix, rest);
        let joined = format!("{}{}", prefix, rest);
        prop_assert!(module_matches(&prefix, &prefix));
        prop_assert!(module_matches(&child, &prefix));
        prop_assert!(!module_matches(&joined, &prefix));
    }
}
