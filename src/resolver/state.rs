#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Lifecycle phase of one background mount.
pub enum ScenePhase {
    #[default]
    /// Nothing mounted.
    Empty,
    /// Candidate walk in progress, grace timer armed.
    Loading,
    /// A model was resolved and mounted.
    Loaded,
    /// The placeholder field was populated instead of a model.
    FallbackPopulated,
}

impl ScenePhase {
    /// `Loaded` and `FallbackPopulated` end a lifecycle; only `Unmount` leaves them.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Loaded | Self::FallbackPopulated)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Inputs to [`reduce`].
pub enum MountEvent {
    Mount,
    AttemptSucceeded,
    CandidatesExhausted,
    GraceElapsed,
    Unmount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// What the mount ended up showing.
pub enum ReadySource {
    Model,
    Fallback,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
/// Side effects requested by a transition, executed by the mount in order.
pub enum Effect {
    StartCandidateWalk,
    ArmGraceTimer,
    MountScene,
    PopulateFallback,
    NotifyReady(ReadySource),
    DiscardLateResult,
    ReleaseContent,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub next: ScenePhase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: ScenePhase, effects: &[Effect]) -> Self {
        Self {
            next,
            effects: effects.to_vec(),
        }
    }

    /// Stay in `phase` and do nothing.
    fn stay(phase: ScenePhase) -> Self {
        Self::to(phase, &[])
    }
}

/// Pure transition function of the mount lifecycle.
///
/// Events that do not apply to the current phase leave it unchanged with no effects, so a
/// second `Mount`, a grace timeout after `Loaded` or a failed walk after fallback are no-ops.
/// A success that arrives after fallback asks for the result to be discarded.
pub fn reduce(phase: ScenePhase, event: MountEvent) -> Transition {
    use Effect::*;
    use MountEvent::*;
    use ScenePhase::*;

    match (phase, event) {
        (Empty, Mount) => Transition::to(Loading, &[StartCandidateWalk, ArmGraceTimer]),
        (Loading, AttemptSucceeded) => {
            Transition::to(Loaded, &[MountScene, NotifyReady(ReadySource::Model)])
        }
        (Loading, CandidatesExhausted | GraceElapsed) => Transition::to(
            FallbackPopulated,
            &[PopulateFallback, NotifyReady(ReadySource::Fallback)],
        ),
        (FallbackPopulated, AttemptSucceeded) => {
            Transition::to(FallbackPopulated, &[DiscardLateResult])
        }
        (Empty, Unmount) => Transition::stay(Empty),
        (_, Unmount) => Transition::to(Empty, &[ReleaseContent]),
        (p, _) => Transition::stay(p),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolver/state.rs"]
mod tests;
