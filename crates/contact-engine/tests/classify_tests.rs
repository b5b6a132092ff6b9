use std::cell::Cell;

use contact_engine::classifier::{MISSING_SHAPE_NOTE, PENETRATION_NOTE, STUB_NOTE};
use contact_engine::{
    pair_count, rows_for, ContactClassifier, ContactEngine, EngineError, ShapeLibrary,
    ShapeResolver,
};
use contact_types::{
    Assembly, ClassificationConfig, ConfigError, ContactRow, Member, MemberRef, Relation,
};
use geom_query::{Capability, MockQuery, MockSolid, PairScript, Scripted, StubQuery};
use proptest::prelude::*;

const PROJECT: &str = "TF10";

/// Helper: members at revision 1, in the given order.
fn members(names: &[&str]) -> Vec<MemberRef> {
    names.iter().map(|n| MemberRef::new(*n, 1)).collect()
}

/// Helper: a library holding a mock solid for each name.
fn library(names: &[&str]) -> ShapeLibrary<MockSolid> {
    let mut lib = ShapeLibrary::new();
    for n in names {
        lib.insert(PROJECT, MemberRef::new(*n, 1), MockSolid::named(*n));
    }
    lib
}

fn classify(
    query: MockQuery,
    names: &[&str],
    config: &ClassificationConfig,
) -> Vec<contact_types::ContactRecord> {
    ContactClassifier::new(query)
        .classify(PROJECT, &members(names), &library(names), config)
        .unwrap()
}

/// Resolver that counts how often it is asked.
struct CountingResolver {
    inner: ShapeLibrary<MockSolid>,
    calls: Cell<usize>,
}

impl ShapeResolver for CountingResolver {
    type Shape = MockSolid;

    fn resolve(&self, project: &str, member: &MemberRef) -> Option<MockSolid> {
        self.calls.set(self.calls.get() + 1);
        self.inner.resolve(project, member)
    }
}

// ── Pair Enumeration ───────────────────────────────────────────────────────

#[test]
fn every_pair_is_classified_once_in_enumeration_order() {
    let mut q = MockQuery::new();
    for (a, b) in [("a", "b"), ("a", "c"), ("a", "d"), ("b", "c"), ("b", "d"), ("c", "d")] {
        q.script(a, b, PairScript::gap(1.0));
    }
    let recs = classify(q, &["a", "b", "c", "d"], &ClassificationConfig::default());

    let pairs: Vec<(&str, &str)> = recs
        .iter()
        .map(|r| (r.member_a.part_name.as_str(), r.member_b.part_name.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("a", "b"), ("a", "c"), ("a", "d"), ("b", "c"), ("b", "d"), ("c", "d")]
    );
    assert!(recs.iter().all(|r| r.relation == Relation::Clearance));
}

#[test]
fn fewer_than_two_members_yield_nothing() {
    let config = ClassificationConfig::default();
    assert!(classify(MockQuery::new(), &[], &config).is_empty());
    assert!(classify(MockQuery::new(), &["solo"], &config).is_empty());
}

#[test]
fn each_member_resolves_once_per_run() {
    let resolver = CountingResolver {
        inner: library(&["a", "b", "c", "d"]),
        calls: Cell::new(0),
    };
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::gap(0.5));
    ContactClassifier::new(q)
        .classify(
            PROJECT,
            &members(&["a", "b", "c", "d"]),
            &resolver,
            &ClassificationConfig::default(),
        )
        .unwrap();
    assert_eq!(resolver.calls.get(), 4);
}

// ── Relation Policy ────────────────────────────────────────────────────────

#[test]
fn small_gap_within_tolerance_is_touching() {
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::gap(0.001));
    let config = ClassificationConfig::default().with_tolerance_mm(0.002);
    let recs = classify(q, &["a", "b"], &config);

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].relation, Relation::Touching);
    let row = ContactRow::from_record(PROJECT, "ASM-1", &recs[0]);
    assert_eq!(row.min_gap_mm, "0.001000");
}

#[test]
fn common_area_makes_touching_beyond_tolerance() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::gap(0.5).with_area(Scripted::Value(2.0)),
    );
    // Touching pairs are never pruned, even beyond the clearance threshold.
    let config = ClassificationConfig::default().with_clearance_max_mm(0.1);
    let recs = classify(q, &["a", "b"], &config);

    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0].relation, Relation::Touching);
    assert_eq!(recs[0].min_gap_mm, Some(0.5));
    assert_eq!(recs[0].contact_area_mm2, 2.0);
}

#[test]
fn negligible_common_area_stays_clearance() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::gap(0.5).with_area(Scripted::Value(1e-4)),
    );
    let recs = classify(q, &["a", "b"], &ClassificationConfig::default());
    assert_eq!(recs[0].relation, Relation::Clearance);
    assert_eq!(recs[0].contact_area_mm2, 0.0);
}

#[test]
fn overlap_volume_is_penetration_without_gap() {
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::overlap(1e-3));
    let config = ClassificationConfig::default().with_clearance_max_mm(0.0);
    let recs = classify(q, &["a", "b"], &config);

    assert_eq!(recs.len(), 1, "penetration is never pruned");
    assert_eq!(recs[0].relation, Relation::Penetration);
    assert_eq!(recs[0].min_gap_mm, None);
    assert!(recs[0].note.contains(PENETRATION_NOTE));

    let row = ContactRow::from_record(PROJECT, "ASM-1", &recs[0]);
    assert_eq!(row.min_gap_mm, "N/A");
    assert_eq!(row.contact_area_mm2, "0.00");
}

#[test]
fn volume_at_epsilon_is_not_penetration() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::gap(1.0).with_volume(Scripted::Value(1e-6)),
    );
    let recs = classify(q, &["a", "b"], &ClassificationConfig::default());
    assert_eq!(recs[0].relation, Relation::Clearance);
}

#[test]
fn penetration_skips_area_query() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::overlap(5.0).with_area(Scripted::Fail("must not be asked".into())),
    );
    let recs = classify(q, &["a", "b"], &ClassificationConfig::default());
    assert_eq!(recs[0].relation, Relation::Penetration);
}

// ── Pruning ────────────────────────────────────────────────────────────────

#[test]
fn far_clearance_pairs_are_dropped() {
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::gap(6.0));
    q.script("a", "c", PairScript::gap(5.0));
    q.script("b", "c", PairScript::gap(2.0));
    let recs = classify(q, &["a", "b", "c"], &ClassificationConfig::default());

    let pairs: Vec<(&str, &str)> = recs
        .iter()
        .map(|r| (r.member_a.part_name.as_str(), r.member_b.part_name.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "c"), ("b", "c")]);
}

#[test]
fn summary_counts_pruned_pairs() {
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::gap(0.5));
    let names = ["a", "b", "c"];
    let c = ContactClassifier::new(q)
        .classify_until(
            PROJECT,
            &members(&names),
            &library(&names),
            &ClassificationConfig::default(),
            || false,
        )
        .unwrap();

    assert_eq!(c.summary.capability, Capability::Full);
    assert_eq!(c.summary.candidate_pairs, 3);
    assert_eq!(c.summary.classified, 3);
    assert_eq!(c.summary.retained, 1);
    assert_eq!(c.summary.pruned, 2);
    assert!(!c.summary.cancelled);
}

// ── Degraded Inputs ────────────────────────────────────────────────────────

#[test]
fn missing_shape_is_unknown_and_always_kept() {
    let names = ["a", "b", "ghost"];
    let config = ClassificationConfig::default().with_clearance_max_mm(0.0);
    let recs = ContactClassifier::new(MockQuery::new())
        .classify(PROJECT, &members(&names), &library(&["a", "b"]), &config)
        .unwrap();

    // a-b sits at the default mock gap and is pruned; both ghost pairs stay.
    assert_eq!(recs.len(), 2);
    for r in &recs {
        assert_eq!(r.member_b.part_name, "ghost");
        assert_eq!(r.relation, Relation::Unknown);
        assert_eq!(r.min_gap_mm, None);
        assert_eq!(r.note, MISSING_SHAPE_NOTE);
    }
}

#[test]
fn missing_shape_never_reaches_the_kernel() {
    let classifier = ContactClassifier::new(MockQuery::new());
    classifier
        .classify(
            PROJECT,
            &members(&["a", "ghost"]),
            &library(&["a"]),
            &ClassificationConfig::default(),
        )
        .unwrap();
    assert_eq!(classifier.query().calls(), 0);
}

#[test]
fn failing_primitive_marks_only_that_pair() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::gap(1.0).with_volume(Scripted::Fail("boolean exploded".into())),
    );
    q.script("a", "c", PairScript::gap(1.0));
    q.script("b", "c", PairScript::gap(1.0));
    let recs = classify(q, &["a", "b", "c"], &ClassificationConfig::default());

    assert_eq!(recs.len(), 3);
    assert_eq!(recs[0].relation, Relation::Error);
    assert_eq!(recs[0].min_gap_mm, None);
    assert!(recs[0].note.contains("boolean exploded"));
    assert_eq!(recs[1].relation, Relation::Clearance);
    assert_eq!(recs[2].relation, Relation::Clearance);
}

#[test]
fn unavailable_volume_degrades_with_note() {
    let mut q = MockQuery::new();
    q.script(
        "a",
        "b",
        PairScript::gap(1.0)
            .with_volume(Scripted::Unavailable("boolean failed".into()))
            .with_area(Scripted::Unavailable("boolean failed".into())),
    );
    let recs = classify(q, &["a", "b"], &ClassificationConfig::default());

    assert_eq!(recs[0].relation, Relation::Clearance);
    assert_eq!(recs[0].min_gap_mm, Some(1.0));
    assert!(recs[0].note.contains("common volume not computed"));
    assert!(recs[0].note.contains("common surface area not computed"));
}

// ── Stub Kernel ────────────────────────────────────────────────────────────

#[test]
fn stub_kernel_reports_placeholder_clearance() {
    let classifier: ContactClassifier<StubQuery<MockSolid>> =
        ContactClassifier::new(StubQuery::new());
    let config = ClassificationConfig::default()
        .with_clearance_max_mm(5.0)
        .with_stub_gap_mm(0.1);
    let recs = classifier
        .classify(
            PROJECT,
            &members(&["A", "B", "C"]),
            &ShapeLibrary::new(),
            &config,
        )
        .unwrap();

    assert_eq!(recs.len(), 3);
    for row in rows_for(PROJECT, "ASM-1", &recs) {
        assert_eq!(row.relation, "clearance");
        assert_eq!(row.min_gap_mm, "0.100000");
        assert_eq!(row.contact_area_mm2, "0.00");
        assert_eq!(row.note, STUB_NOTE);
    }
}

#[test]
fn stub_kernel_still_prunes_placeholder_gap() {
    let classifier: ContactClassifier<StubQuery<MockSolid>> =
        ContactClassifier::new(StubQuery::new());
    let config = ClassificationConfig::default().with_clearance_max_mm(0.05);
    let c = classifier
        .classify_until(
            PROJECT,
            &members(&["A", "B", "C"]),
            &ShapeLibrary::new(),
            &config,
            || false,
        )
        .unwrap();

    assert!(c.records.is_empty());
    assert_eq!(c.summary.capability, Capability::Stub);
    assert_eq!(c.summary.pruned, 3);
}

#[test]
fn stub_kernel_does_not_resolve_shapes() {
    let resolver = CountingResolver {
        inner: library(&["A", "B"]),
        calls: Cell::new(0),
    };
    let classifier: ContactClassifier<StubQuery<MockSolid>> =
        ContactClassifier::new(StubQuery::new());
    classifier
        .classify(
            PROJECT,
            &members(&["A", "B"]),
            &resolver,
            &ClassificationConfig::default(),
        )
        .unwrap();
    assert_eq!(resolver.calls.get(), 0);
}

// ── Configuration & Control ────────────────────────────────────────────────

#[test]
fn invalid_config_fails_before_any_pair() {
    let classifier = ContactClassifier::new(MockQuery::new());
    let config = ClassificationConfig::default().with_tolerance_mm(-0.1);
    let err = classifier
        .classify(PROJECT, &members(&["a", "b"]), &library(&["a", "b"]), &config)
        .unwrap_err();

    assert!(matches!(
        err,
        EngineError::Config(ConfigError::InvalidValue { .. })
    ));
    assert_eq!(classifier.query().calls(), 0);
}

#[test]
fn rerun_is_identical() {
    let names = ["a", "b", "c", "d"];
    let mut q = MockQuery::new();
    q.script("a", "c", PairScript::gap(0.001));
    q.script("b", "d", PairScript::overlap(3.0));
    q.script("c", "d", PairScript::gap(4.0));
    let classifier = ContactClassifier::new(q);
    let config = ClassificationConfig::default();

    let first = classifier
        .classify(PROJECT, &members(&names), &library(&names), &config)
        .unwrap();
    let second = classifier
        .classify(PROJECT, &members(&names), &library(&names), &config)
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn cancellation_returns_classified_prefix() {
    let names = ["a", "b", "c", "d"];
    let mut q = MockQuery::new();
    for (a, b) in [("a", "b"), ("a", "c"), ("a", "d")] {
        q.script(a, b, PairScript::gap(1.0));
    }
    let mut budget = 2;
    let c = ContactClassifier::new(q)
        .classify_until(
            PROJECT,
            &members(&names),
            &library(&names),
            &ClassificationConfig::default(),
            || {
                if budget == 0 {
                    return true;
                }
                budget -= 1;
                false
            },
        )
        .unwrap();

    assert!(c.summary.cancelled);
    assert_eq!(c.summary.classified, 2);
    assert_eq!(c.records.len(), 2);
    assert_eq!(c.records[1].member_b.part_name, "c");
}

// ── Engine ─────────────────────────────────────────────────────────────────

#[test]
fn engine_skips_excluded_members() {
    let assembly = Assembly::new(PROJECT, "ASM-1")
        .with_member(Member::new("a", 1))
        .with_member(Member::excluded("b", 1))
        .with_member(Member::new("c", 1));
    let mut q = MockQuery::new();
    q.script("a", "b", PairScript::overlap(9.0));
    q.script("a", "c", PairScript::gap(0.25));

    let engine = ContactEngine::new(q, library(&["a", "b", "c"]));
    let contacts = engine
        .run(&assembly, &ClassificationConfig::default())
        .unwrap();

    assert_eq!(contacts.summary.candidate_pairs, 1);
    assert_eq!(contacts.records.len(), 1);
    let rows = contacts.rows();
    assert_eq!(rows[0].assembly_id, "ASM-1");
    assert_eq!(rows[0].a_part, "a");
    assert_eq!(rows[0].b_part, "c");
    assert_eq!(rows[0].min_gap_mm, "0.250000");
}

// ── Properties ─────────────────────────────────────────────────────────────

fn member_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("m{i}")).collect()
}

proptest! {
    #[test]
    fn retained_pairs_are_ordered_unique_and_pruned(
        gaps in prop::collection::vec(0.0f64..10.0, 0..=21),
    ) {
        // Largest n whose pair count fits the generated gaps.
        let n = (0..=7).rev().find(|&n| pair_count(n) <= gaps.len()).unwrap();
        let names = member_names(n);
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();

        let mut q = MockQuery::new();
        let mut expected = Vec::new();
        let mut k = 0;
        for i in 0..n {
            for j in (i + 1)..n {
                q.script(&names[i], &names[j], PairScript::gap(gaps[k]));
                if gaps[k] <= 5.0 {
                    expected.push((names[i].clone(), names[j].clone()));
                }
                k += 1;
            }
        }

        let classifier = ContactClassifier::new(q);
        let config = ClassificationConfig::default();
        let c = classifier
            .classify_until(PROJECT, &members(&refs), &library(&refs), &config, || false)
            .unwrap();

        prop_assert_eq!(c.summary.candidate_pairs, n * n.saturating_sub(1) / 2);
        prop_assert_eq!(c.summary.classified, c.summary.candidate_pairs);
        prop_assert_eq!(c.summary.retained + c.summary.pruned, c.summary.candidate_pairs);

        let got: Vec<(String, String)> = c
            .records
            .iter()
            .map(|r| (r.member_a.part_name.clone(), r.member_b.part_name.clone()))
            .collect();
        prop_assert_eq!(got, expected);

        for r in &c.records {
            let gap = r.min_gap_mm.unwrap();
            prop_assert!(!(r.relation == Relation::Clearance && gap > config.clearance_max_mm));
            let touching = gap.abs() <= config.tolerance_mm;
            prop_assert_eq!(r.relation == Relation::Touching, touching);
        }
    }
}
