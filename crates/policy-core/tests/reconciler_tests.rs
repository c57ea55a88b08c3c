//! End-to-end tests for PolicyReconciler against the in-memory controller

use policy_client::{ClientContext, TransportError};
use policy_core::{Error, PolicyReconciler, ReconcilerConfig, SectionState, TrackedSection};
use policy_model::{RuleAction, Section, SectionType, Tag, tags_equal};
use policy_test_utils::fixtures::{allow_rule, double_tags, layer3_section, scoped_rule};
use policy_test_utils::{
    ControllerOptions, MemoryController, Operation, RecordedCall, ReferencedDelete, Tenancy,
    init_test_logging,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[derive(Debug, Clone, Copy)]
enum Surface {
    Local,
    Project,
}

struct Harness {
    controller: MemoryController,
    reconciler: PolicyReconciler,
    tenancy: Tenancy,
}

impl Harness {
    fn new(surface: Surface) -> Self {
        Self::with(surface, ControllerOptions::default(), ReconcilerConfig::default())
    }

    /// Harness whose controller may leave `predecessor_ref` out of responses.
    fn echoing(surface: Surface, echo_predecessor: bool) -> Self {
        Self::with(
            surface,
            ControllerOptions {
                echo_predecessor,
                ..ControllerOptions::default()
            },
            ReconcilerConfig::default(),
        )
    }

    fn with(surface: Surface, options: ControllerOptions, config: ReconcilerConfig) -> Self {
        init_test_logging();
        let controller = MemoryController::with_options(options);
        let (context, tenancy) = match surface {
            Surface::Local => (ClientContext::local(controller.connector()), Tenancy::Local),
            Surface::Project => (
                ClientContext::multitenant("p1", controller.connector()),
                Tenancy::project("default", "p1"),
            ),
        };
        let reconciler = PolicyReconciler::new(&context, config).unwrap();
        Self {
            controller,
            reconciler,
            tenancy,
        }
    }

    fn create(&self, section: Section) -> TrackedSection {
        let mut tracked = TrackedSection::planned(section);
        self.reconciler.create(&mut tracked).unwrap();
        tracked
    }

    fn order(&self) -> Vec<String> {
        self.controller.section_order(&self.tenancy, "default")
    }

    fn remote(&self, tracked: &TrackedSection) -> Section {
        self.controller
            .sections(&self.tenancy, "default")
            .into_iter()
            .find(|s| s.id() == tracked.id())
            .unwrap()
    }

    fn mutations(&self) -> Vec<RecordedCall> {
        self.controller.mutations()
    }
}

fn id_of(tracked: &TrackedSection) -> String {
    tracked.id().unwrap().to_string()
}

/// Three sections chained s1 -> s2 -> s3.
fn chain(harness: &Harness) -> (TrackedSection, TrackedSection, TrackedSection) {
    let s1 = harness.create(layer3_section("s1"));
    let s2 = harness.create(layer3_section("s2").after(id_of(&s1)));
    let s3 = harness.create(layer3_section("s3").after(id_of(&s2)));
    (s1, s2, s3)
}

#[rstest]
#[case::local(Surface::Local, true)]
#[case::project(Surface::Project, true)]
#[case::local_without_echo(Surface::Local, false)]
#[case::project_without_echo(Surface::Project, false)]
fn test_ordered_sections_end_to_end(#[case] surface: Surface, #[case] echo_predecessor: bool) {
    let harness = Harness::echoing(surface, echo_predecessor);
    let (mut s1, s2, s3) = chain(&harness);
    assert_eq!(harness.order(), vec!["s1", "s2", "s3"]);

    let s4 = harness.create(layer3_section("s4"));
    assert_eq!(harness.order(), vec!["s1", "s2", "s3", "s4"]);

    harness.controller.clear_calls();
    s1.desired_mut().predecessor_ref = Some(id_of(&s4));
    harness.reconciler.update(&mut s1).unwrap();

    assert_eq!(harness.order(), vec!["s4", "s1", "s2", "s3"]);
    assert_eq!(s1.synced().unwrap().predecessor_ref, Some(id_of(&s4)));

    let mutations = harness.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!(mutations[0].operation, Operation::Patch);
    assert_eq!(mutations[0].object_id, Some(id_of(&s1)));

    let untouched = [id_of(&s2), id_of(&s3)];
    assert!(
        harness
            .controller
            .calls()
            .iter()
            .all(|c| c.object_id.as_ref().is_none_or(|id| !untouched.contains(id)))
    );
}

#[test]
fn test_create_assigns_ids_and_keeps_tag_set() {
    let harness = Harness::new(Surface::Local);
    let mut tags = double_tags();
    tags.reverse();
    let desired = layer3_section("s1")
        .with_tags(tags.clone())
        .with_rules(vec![scoped_rule("r1"), allow_rule("r2")]);

    let mut tracked = TrackedSection::planned(desired);
    let created = harness.reconciler.create(&mut tracked).unwrap();

    assert_eq!(tracked.state(), SectionState::Active);
    assert_eq!(created.id(), Some("section-1"));
    assert!(created.rules.iter().all(|r| r.id.is_some()));
    assert!(tags_equal(&tags, &created.tags));
    assert_eq!(harness.remote(&tracked).tags, double_tags());

    let read = harness.reconciler.read(&mut tracked).unwrap();
    assert!(tags_equal(&tags, &read.tags));
}

#[rstest]
#[case::local(Surface::Local)]
#[case::project(Surface::Project)]
fn test_update_in_sync_issues_no_mutation(#[case] surface: Surface) {
    let harness = Harness::new(surface);
    let mut tracked = harness.create(
        layer3_section("s1")
            .with_tags(double_tags())
            .with_rules(vec![scoped_rule("r1"), allow_rule("r2")]),
    );
    harness.controller.clear_calls();

    harness.reconciler.update(&mut tracked).unwrap();
    tracked.desired_mut().tags.reverse();
    harness.reconciler.update(&mut tracked).unwrap();

    assert!(harness.mutations().is_empty());
    assert_eq!(tracked.state(), SectionState::Active);
}

#[test]
fn test_tag_change_is_one_section_patch() {
    let harness = Harness::new(Surface::Local);
    let mut tracked = harness.create(layer3_section("s1").with_tags(double_tags()));
    harness.controller.clear_calls();

    tracked.desired_mut().tags = vec![Tag::new("scope3", "tag3")];
    let synced = harness.reconciler.update(&mut tracked).unwrap();

    assert_eq!(synced.tags, vec![Tag::new("scope3", "tag3")]);
    let mutations = harness.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!((mutations[0].kind, mutations[0].operation), ("section", Operation::Patch));
}

#[test]
fn test_rule_reorder_is_single_full_update() {
    let harness = Harness::new(Surface::Local);
    let mut tracked =
        harness.create(layer3_section("s1").with_rules(vec![allow_rule("r1"), allow_rule("r2")]));
    let before: Vec<_> = tracked.synced().unwrap().rules.clone();
    harness.controller.clear_calls();

    tracked.desired_mut().rules.reverse();
    let synced = harness.reconciler.update(&mut tracked).unwrap();

    let mutations = harness.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!((mutations[0].kind, mutations[0].operation), ("section", Operation::Update));

    let names: Vec<&str> = synced.rules.iter().map(|r| r.display_name.as_str()).collect();
    assert_eq!(names, vec!["r2", "r1"]);
    assert_eq!(synced.rules[0].id, before[1].id);
    assert_eq!(synced.rules[1].id, before[0].id);
}

#[test]
fn test_rule_field_change_is_rule_patch() {
    let harness = Harness::new(Surface::Local);
    let mut tracked =
        harness.create(layer3_section("s1").with_rules(vec![allow_rule("r1"), allow_rule("r2")]));
    harness.controller.clear_calls();

    tracked.desired_mut().rules[1].action = RuleAction::Reject;
    let synced = harness.reconciler.update(&mut tracked).unwrap();

    let mutations = harness.mutations();
    assert_eq!(mutations.len(), 1);
    assert_eq!((mutations[0].kind, mutations[0].operation), ("rule", Operation::Patch));
    assert_eq!(mutations[0].object_id, synced.rules[1].id);
    assert_eq!(synced.rules[1].action, RuleAction::Reject);
}

#[test]
fn test_rule_removed_and_appended() {
    let harness = Harness::new(Surface::Local);
    let mut tracked =
        harness.create(layer3_section("s1").with_rules(vec![allow_rule("r1"), allow_rule("r2")]));
    harness.controller.clear_calls();

    let desired = tracked.desired_mut();
    desired.rules.remove(0);
    desired.rules.push(allow_rule("r3"));
    let synced = harness.reconciler.update(&mut tracked).unwrap();

    let operations: Vec<(&str, Operation)> = harness
        .mutations()
        .iter()
        .map(|c| (c.kind, c.operation))
        .collect();
    assert_eq!(
        operations,
        vec![("rule", Operation::Delete), ("rule", Operation::Create)]
    );
    let names: Vec<&str> = synced.rules.iter().map(|r| r.display_name.as_str()).collect();
    assert_eq!(names, vec!["r2", "r3"]);
}

#[test]
fn test_failed_update_keeps_prior_state() {
    let harness = Harness::new(Surface::Local);
    let mut tracked = harness.create(layer3_section("s1").with_rules(vec![allow_rule("r1")]));
    let synced_before = tracked.synced().cloned();

    tracked.desired_mut().description = "changed".to_string();
    tracked.desired_mut().rules.push(allow_rule("r2"));
    harness.controller.fail_next(
        "rule",
        Operation::Create,
        TransportError::Status {
            code: 500,
            message: "boom".into(),
        },
    );

    let err = harness.reconciler.update(&mut tracked).unwrap_err();
    assert!(matches!(
        err.transport_error(),
        Some(TransportError::Status { code: 500, .. })
    ));
    assert_eq!(tracked.state(), SectionState::Active);
    assert_eq!(tracked.synced().cloned(), synced_before);
}

#[test]
fn test_failed_create_stays_planned() {
    let harness = Harness::new(Surface::Local);
    harness.controller.fail_next(
        "section",
        Operation::Create,
        TransportError::Connection {
            message: "reset".into(),
        },
    );

    let mut tracked = TrackedSection::planned(layer3_section("s1"));
    assert!(harness.reconciler.create(&mut tracked).is_err());
    assert_eq!(tracked.state(), SectionState::Planned);
    assert!(tracked.id().is_none());
    assert_eq!(harness.mutations().len(), 1);

    harness.reconciler.create(&mut tracked).unwrap();
    assert_eq!(tracked.state(), SectionState::Active);
    assert_eq!(harness.order(), vec!["s1"]);
}

#[rstest]
#[case::echoed(true)]
#[case::without_echo(false)]
fn test_cycle_rejected_before_any_mutation(#[case] echo_predecessor: bool) {
    let harness = Harness::echoing(Surface::Local, echo_predecessor);
    let mut a = harness.create(layer3_section("a"));
    let b = harness.create(layer3_section("b").after(id_of(&a)));
    harness.controller.clear_calls();

    a.desired_mut().predecessor_ref = Some(id_of(&b));
    let err = harness.reconciler.update(&mut a).unwrap_err();

    match err {
        Error::OrderingCycle { chain } => {
            assert_eq!(chain.first(), chain.last());
            assert!(chain.contains(&id_of(&b)));
        }
        other => panic!("expected ordering cycle, got {:?}", other),
    }
    assert!(harness.mutations().is_empty());
    assert_eq!(a.state(), SectionState::Active);
    assert_eq!(harness.order(), vec!["a", "b"]);
}

#[test]
fn test_batch_with_mutual_references_is_rejected() {
    let harness = Harness::new(Surface::Local);
    let a = harness.create(layer3_section("a"));
    let b = harness.create(layer3_section("b"));
    harness.controller.clear_calls();

    let (a_id, b_id) = (id_of(&a), id_of(&b));
    let mut batch = [a, b];
    batch[0].desired_mut().predecessor_ref = Some(b_id);
    batch[1].desired_mut().predecessor_ref = Some(a_id);

    let err = harness.reconciler.apply(&mut batch).unwrap_err();
    assert!(matches!(err, Error::OrderingCycle { .. }));
    assert!(harness.mutations().is_empty());
}

#[test]
fn test_unknown_predecessor_is_rejected_on_create() {
    let harness = Harness::new(Surface::Local);
    let mut tracked = TrackedSection::planned(layer3_section("s1").after("ghost"));

    let err = harness.reconciler.create(&mut tracked).unwrap_err();
    assert!(matches!(err, Error::UnknownPredecessor { ref predecessor, .. } if predecessor == "ghost"));
    assert_eq!(tracked.state(), SectionState::Planned);
    assert!(harness.mutations().is_empty());
}

#[test]
fn test_validation_blocks_every_call() {
    let harness = Harness::new(Surface::Local);
    let tags = (0..31).map(|i| Tag::new("scope", format!("t{}", i))).collect();
    let mut tracked = TrackedSection::planned(layer3_section("s1").with_tags(tags));

    let err = harness.reconciler.create(&mut tracked).unwrap_err();
    assert!(matches!(err, Error::Model(policy_model::Error::Validation { .. })));
    assert!(harness.controller.calls().is_empty());
}

#[test]
fn test_section_type_is_immutable() {
    let harness = Harness::new(Surface::Local);
    let mut tracked = harness.create(layer3_section("s1"));
    harness.controller.clear_calls();

    tracked.desired_mut().section_type = SectionType::Layer2;
    let err = harness.reconciler.update(&mut tracked).unwrap_err();

    assert!(matches!(err, Error::ImmutableField { field: "section_type", .. }));
    assert!(harness.mutations().is_empty());
}

#[rstest]
#[case::splice_first(ReferencedDelete::Reject, true, true)]
#[case::controller_splices(ReferencedDelete::Splice, false, true)]
#[case::repaired_after_delete(ReferencedDelete::Leave, false, true)]
#[case::splice_first_without_echo(ReferencedDelete::Reject, true, false)]
#[case::controller_splices_without_echo(ReferencedDelete::Splice, false, false)]
fn test_delete_splices_chain(
    #[case] referenced_delete: ReferencedDelete,
    #[case] splice_before_delete: bool,
    #[case] echo_predecessor: bool,
) {
    let harness = Harness::with(
        Surface::Local,
        ControllerOptions {
            referenced_delete,
            echo_predecessor,
            ..ControllerOptions::default()
        },
        ReconcilerConfig {
            splice_before_delete,
            ..ReconcilerConfig::default()
        },
    );
    let (s1, mut s2, s3) = chain(&harness);

    harness.reconciler.delete(&mut s2).unwrap();

    assert_eq!(s2.state(), SectionState::Gone);
    assert_eq!(harness.order(), vec!["s1", "s3"]);
    assert_eq!(harness.remote(&s3).predecessor_ref, Some(id_of(&s1)));
}

#[test]
fn test_delete_without_splice_against_strict_controller() {
    let harness = Harness::with(
        Surface::Local,
        ControllerOptions::default(),
        ReconcilerConfig {
            splice_before_delete: false,
            ..ReconcilerConfig::default()
        },
    );
    let (_s1, mut s2, _s3) = chain(&harness);

    let err = harness.reconciler.delete(&mut s2).unwrap_err();

    assert!(matches!(err.transport_error(), Some(TransportError::Conflict { .. })));
    assert_eq!(s2.state(), SectionState::Active);
    assert_eq!(harness.order(), vec!["s1", "s2", "s3"]);
}

#[test]
fn test_failed_delete_restores_successors() {
    let harness = Harness::new(Surface::Local);
    let (s1, mut s2, s3) = chain(&harness);
    harness.controller.fail_next(
        "section",
        Operation::Delete,
        TransportError::Status {
            code: 500,
            message: "boom".into(),
        },
    );
    harness.controller.clear_calls();

    let err = harness.reconciler.delete(&mut s2).unwrap_err();

    assert!(matches!(
        err.transport_error(),
        Some(TransportError::Status { code: 500, .. })
    ));
    assert_eq!(s2.state(), SectionState::Active);
    assert_eq!(harness.remote(&s2).predecessor_ref, Some(id_of(&s1)));
    assert_eq!(harness.remote(&s3).predecessor_ref, Some(id_of(&s2)));
    assert_eq!(harness.order(), vec!["s1", "s2", "s3"]);

    let operations: Vec<(Operation, Option<String>)> = harness
        .mutations()
        .into_iter()
        .map(|c| (c.operation, c.object_id))
        .collect();
    assert_eq!(
        operations,
        vec![
            (Operation::Patch, Some(id_of(&s3))),
            (Operation::Delete, Some(id_of(&s2))),
            (Operation::Patch, Some(id_of(&s3))),
        ]
    );

    harness.reconciler.delete(&mut s2).unwrap();
    assert_eq!(harness.order(), vec!["s1", "s3"]);
}

#[test]
fn test_delete_succeeds_when_successor_repair_fails() {
    let harness = Harness::with(
        Surface::Local,
        ControllerOptions {
            referenced_delete: ReferencedDelete::Leave,
            ..ControllerOptions::default()
        },
        ReconcilerConfig {
            splice_before_delete: false,
            ..ReconcilerConfig::default()
        },
    );
    let (_s1, mut s2, s3) = chain(&harness);
    harness.controller.fail_next(
        "section",
        Operation::Patch,
        TransportError::Status {
            code: 500,
            message: "boom".into(),
        },
    );

    harness.reconciler.delete(&mut s2).unwrap();

    assert_eq!(s2.state(), SectionState::Gone);
    assert_eq!(harness.order(), vec!["s1", "s3"]);
    assert_eq!(harness.remote(&s3).predecessor_ref, Some(id_of(&s2)));
}

#[test]
fn test_placement_read_from_listing_order() {
    let harness = Harness::echoing(Surface::Local, false);
    let seed = |section: Section| {
        harness
            .controller
            .seed_section(&harness.tenancy, "default", &section)
            .unwrap()
            .id
            .unwrap()
    };
    let s1_id = seed(layer3_section("s1"));
    let s2_id = seed(layer3_section("s2").after(&s1_id));

    let mut s2 = harness.reconciler.import(&s2_id).unwrap();
    assert_eq!(s2.synced().unwrap().predecessor_ref, None);
    s2.desired_mut().predecessor_ref = Some(s1_id.clone());
    harness.reconciler.update(&mut s2).unwrap();
    assert!(harness.mutations().is_empty());

    let mut s1 = harness.reconciler.import(&s1_id).unwrap();
    s1.desired_mut().predecessor_ref = Some(s2_id);
    let err = harness.reconciler.update(&mut s1).unwrap_err();

    assert!(matches!(err, Error::OrderingCycle { .. }));
    assert!(harness.mutations().is_empty());
    assert_eq!(harness.order(), vec!["s1", "s2"]);
}

#[test]
fn test_delete_of_absent_section_succeeds() {
    let harness = Harness::new(Surface::Local);
    let mut tracked = harness.create(layer3_section("s1"));
    let mut twin = harness.reconciler.import(&id_of(&tracked)).unwrap();
    harness.reconciler.delete(&mut twin).unwrap();

    harness.reconciler.delete(&mut tracked).unwrap();
    assert_eq!(tracked.state(), SectionState::Gone);

    let err = harness.reconciler.update(&mut tracked).unwrap_err();
    assert!(matches!(
        err,
        Error::InvalidTransition {
            from: SectionState::Gone,
            ..
        }
    ));
}

#[test]
fn test_import_then_read_after_remote_delete() {
    let harness = Harness::new(Surface::Project);
    let seeded = harness
        .controller
        .seed_section(&harness.tenancy, "default", &layer3_section("s1"))
        .unwrap();

    let mut tracked = harness.reconciler.import(seeded.id().unwrap()).unwrap();
    assert_eq!(tracked.state(), SectionState::Active);
    assert_eq!(tracked.synced(), Some(&seeded));

    let mut other = harness.reconciler.import(seeded.id().unwrap()).unwrap();
    harness.reconciler.delete(&mut other).unwrap();

    let err = harness.reconciler.read(&mut tracked).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_batch_creates_and_repositions_predecessors_first() {
    let harness = Harness::new(Surface::Local);
    let a = harness.create(layer3_section("a"));
    let b = harness.create(layer3_section("b").after(id_of(&a)));
    let c = harness.create(layer3_section("c"));
    assert_eq!(harness.order(), vec!["a", "b", "c"]);

    let mut moved_a = a.clone();
    moved_a.desired_mut().predecessor_ref = Some(id_of(&c));
    let mut batch = [
        TrackedSection::planned(layer3_section("n").after(id_of(&b))),
        moved_a,
        c,
    ];

    harness.reconciler.apply(&mut batch).unwrap();

    assert!(batch.iter().all(|t| t.state() == SectionState::Active));
    assert_eq!(harness.order(), vec!["c", "a", "b", "n"]);
}

#[test]
fn test_list_returns_controller_order() {
    let harness = Harness::new(Surface::Local);
    let _ = chain(&harness);
    harness.create(layer3_section("s0"));

    let names: Vec<String> = harness
        .reconciler
        .list()
        .unwrap()
        .into_iter()
        .map(|s| s.display_name)
        .collect();
    assert_eq!(names, harness.order());
    assert_eq!(names, vec!["s1", "s2", "s3", "s0"]);
}
