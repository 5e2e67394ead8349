use super::*;

const ALL_EVENTS: [MountEvent; 5] = [
    MountEvent::Mount,
    MountEvent::AttemptSucceeded,
    MountEvent::CandidatesExhausted,
    MountEvent::GraceElapsed,
    MountEvent::Unmount,
];

fn run(events: &[MountEvent]) -> (ScenePhase, Vec<Effect>) {
    let mut phase = ScenePhase::Empty;
    let mut effects = Vec::new();
    for &ev in events {
        let t = reduce(phase, ev);
        phase = t.next;
        effects.extend(t.effects);
    }
    (phase, effects)
}

fn ready_count(effects: &[Effect]) -> usize {
    effects
        .iter()
        .filter(|e| matches!(e, Effect::NotifyReady(_)))
        .count()
}

#[test]
fn mount_starts_walk_and_timer() {
    let t = reduce(ScenePhase::Empty, MountEvent::Mount);
    assert_eq!(t.next, ScenePhase::Loading);
    assert_eq!(
        t.effects,
        vec![Effect::StartCandidateWalk, Effect::ArmGraceTimer]
    );
}

#[test]
fn success_mounts_model() {
    let (phase, effects) = run(&[MountEvent::Mount, MountEvent::AttemptSucceeded]);
    assert_eq!(phase, ScenePhase::Loaded);
    assert!(effects.contains(&Effect::MountScene));
    assert!(effects.contains(&Effect::NotifyReady(ReadySource::Model)));
}

#[test]
fn exhaustion_and_grace_both_fall_back() {
    for ev in [MountEvent::CandidatesExhausted, MountEvent::GraceElapsed] {
        let (phase, effects) = run(&[MountEvent::Mount, ev]);
        assert_eq!(phase, ScenePhase::FallbackPopulated);
        assert_eq!(
            &effects[2..],
            &[
                Effect::PopulateFallback,
                Effect::NotifyReady(ReadySource::Fallback)
            ]
        );
    }
}

#[test]
fn late_success_after_fallback_is_discarded() {
    let (phase, effects) = run(&[
        MountEvent::Mount,
        MountEvent::GraceElapsed,
        MountEvent::AttemptSucceeded,
    ]);
    assert_eq!(phase, ScenePhase::FallbackPopulated);
    assert_eq!(effects.last(), Some(&Effect::DiscardLateResult));
    assert!(!effects.contains(&Effect::MountScene));
    assert_eq!(ready_count(&effects), 1);
}

#[test]
fn grace_after_load_is_ignored() {
    let (phase, effects) = run(&[
        MountEvent::Mount,
        MountEvent::AttemptSucceeded,
        MountEvent::GraceElapsed,
        MountEvent::CandidatesExhausted,
    ]);
    assert_eq!(phase, ScenePhase::Loaded);
    assert!(!effects.contains(&Effect::PopulateFallback));
    assert_eq!(ready_count(&effects), 1);
}

#[test]
fn ready_fires_at_most_once_for_any_event_sequence() {
    // Every sequence of four events without an unmount.
    let lifecycle: Vec<_> = ALL_EVENTS
        .iter()
        .copied()
        .filter(|e| *e != MountEvent::Unmount)
        .collect();
    for a in &lifecycle {
        for b in &lifecycle {
            for c in &lifecycle {
                for d in &lifecycle {
                    let (phase, effects) = run(&[*a, *b, *c, *d]);
                    let n = ready_count(&effects);
                    assert!(n <= 1, "{a:?} {b:?} {c:?} {d:?} fired ready {n} times");
                    assert_eq!(n == 1, phase.is_terminal());
                }
            }
        }
    }
}

#[test]
fn unmount_resets_and_allows_remount() {
    let (phase, effects) = run(&[
        MountEvent::Mount,
        MountEvent::AttemptSucceeded,
        MountEvent::Unmount,
    ]);
    assert_eq!(phase, ScenePhase::Empty);
    assert_eq!(effects.last(), Some(&Effect::ReleaseContent));

    let (phase, effects) = run(&[
        MountEvent::Mount,
        MountEvent::AttemptSucceeded,
        MountEvent::Unmount,
        MountEvent::Mount,
        MountEvent::CandidatesExhausted,
    ]);
    assert_eq!(phase, ScenePhase::FallbackPopulated);
    assert_eq!(ready_count(&effects), 2);
}

#[test]
fn unmount_when_empty_is_a_no_op() {
    let t = reduce(ScenePhase::Empty, MountEvent::Unmount);
    assert_eq!(t.next, ScenePhase::Empty);
    assert!(t.effects.is_empty());
}

#[test]
fn double_mount_is_ignored() {
    let t = reduce(ScenePhase::Loading, MountEvent::Mount);
    assert_eq!(t.next, ScenePhase::Loading);
    assert!(t.effects.is_empty());
}
