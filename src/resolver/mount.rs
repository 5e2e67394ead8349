use std::{
    cell::{Cell, Ref, RefCell},
    f32::consts::TAU,
    pin::pin,
    rc::Rc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use futures::future::{Either, select};

use crate::{
    animation::camera::{CameraPose, KeyframeTable, ScrollMetrics, camera_pose_at},
    assets::{
        gpu::{TimeUniforms, inject_gpu_spin},
        scene::SceneHandle,
    },
    foundation::{error::BackdropResult, math::seed_from_strs},
    resolver::{
        fallback::{FallbackField, FallbackOptions},
        resolve::AssetResolver,
        state::{Effect, MountEvent, ReadySource, ScenePhase, reduce},
    },
};

/// Receives the one-shot "background ready" notification of a mount lifecycle.
pub trait ReadyListener {
    fn on_ready(&mut self, source: ReadySource);
}

impl<F: FnMut(ReadySource)> ReadyListener for F {
    fn on_ready(&mut self, source: ReadySource) {
        self(source)
    }
}

#[derive(Debug, Default)]
/// What a mount currently shows.
pub enum MountContent {
    #[default]
    Nothing,
    Model(SceneHandle),
    Fallback(FallbackField),
}

impl MountContent {
    pub fn model(&self) -> Option<&SceneHandle> {
        match self {
            Self::Model(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn fallback(&self) -> Option<&FallbackField> {
        match self {
            Self::Fallback(field) => Some(field),
            _ => None,
        }
    }

    pub fn is_nothing(&self) -> bool {
        matches!(self, Self::Nothing)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MountOptions {
    /// Time allowed for a model to resolve before the fallback is shown.
    pub grace_period: Duration,
    /// Y-spin speed injected into model materials; `None` leaves materials untouched.
    pub gpu_spin_speed: Option<f32>,
    /// Disables idle motion of fallback bodies.
    pub reduced_motion: bool,
    pub fallback: FallbackOptions,
    pub camera: KeyframeTable,
    /// Full model turns over the whole scroll range.
    pub scroll_turns: f32,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            grace_period: Duration::from_millis(900),
            gpu_spin_speed: Some(0.3),
            reduced_motion: false,
            fallback: FallbackOptions::default(),
            camera: KeyframeTable::default(),
            scroll_turns: 2.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Per-frame values a renderer needs.
pub struct FrameState {
    pub camera: CameraPose,
    /// Model rotation about +Y; zero unless a model is mounted.
    pub model_yaw: f32,
    /// Value of the shared time uniform.
    pub u_time: f32,
}

/// One background mount: drives the resolver, the grace timer and the fallback.
///
/// Lives on a single thread; `run` and the per-frame calls share it by reference.
pub struct SceneMount {
    resolver: AssetResolver,
    opts: MountOptions,
    phase: Cell<ScenePhase>,
    content: RefCell<MountContent>,
    uniforms: RefCell<TimeUniforms>,
    listener: RefCell<Box<dyn ReadyListener>>,
    /// Halt flag of the current lifecycle's walk; each `run` installs a fresh one.
    walk_halted: RefCell<Rc<Cell<bool>>>,
    /// Bumped by every `run` and `unmount`; work tagged with an older value is stale.
    generation: Cell<u64>,
    ready_fired: Cell<usize>,
    late_discarded: Cell<usize>,
    lifecycles: Cell<u64>,
}

impl std::fmt::Debug for SceneMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneMount")
            .field("phase", &self.phase.get())
            .field("content", &self.content.borrow())
            .field("ready_fired", &self.ready_fired.get())
            .finish_non_exhaustive()
    }
}

impl SceneMount {
    pub fn new(resolver: AssetResolver, opts: MountOptions) -> Self {
        let listener: Box<dyn ReadyListener> = Box::new(|_: ReadySource| {});
        Self {
            resolver,
            opts,
            phase: Cell::new(ScenePhase::Empty),
            content: RefCell::new(MountContent::Nothing),
            uniforms: RefCell::new(TimeUniforms::new()),
            listener: RefCell::new(listener),
            walk_halted: RefCell::new(Rc::new(Cell::new(false))),
            generation: Cell::new(0),
            ready_fired: Cell::new(0),
            late_discarded: Cell::new(0),
            lifecycles: Cell::new(0),
        }
    }

    /// Replace the ready listener.
    pub fn with_listener(self, listener: impl ReadyListener + 'static) -> Self {
        *self.listener.borrow_mut() = Box::new(listener);
        self
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase.get()
    }

    pub fn content(&self) -> Ref<'_, MountContent> {
        self.content.borrow()
    }

    pub fn resolver(&self) -> &AssetResolver {
        &self.resolver
    }

    pub fn options(&self) -> &MountOptions {
        &self.opts
    }

    /// Ready notifications sent in the current lifecycle (0 or 1).
    pub fn ready_count(&self) -> usize {
        self.ready_fired.get()
    }

    /// Late model results dropped because the fallback was already shown or their lifecycle
    /// was unmounted.
    pub fn late_results_discarded(&self) -> usize {
        self.late_discarded.get()
    }

    /// Number of times this mount has entered `Loading`.
    pub fn lifecycles(&self) -> u64 {
        self.lifecycles.get()
    }

    /// Mount the background and drive it until the candidate walk settles.
    ///
    /// The ready listener fires as soon as a model mounts or the fallback is populated, which
    /// may be well before this returns: after the grace period the walk finishes its current
    /// attempt so the result still reaches the cache. Calling `run` on a mount that is not
    /// `Empty` does nothing.
    ///
    /// If the mount is unmounted while this is pending, the rest of this lifecycle is dropped:
    /// its grace timer is ignored and a late model is discarded, even when a newer `run` has
    /// started in the meantime.
    #[tracing::instrument(skip_all, fields(candidates = candidates.len()))]
    pub async fn run<S: AsRef<str>>(&self, candidates: &[S]) -> ScenePhase {
        let effects = self.step(MountEvent::Mount);
        if !effects.contains(&Effect::StartCandidateWalk) {
            tracing::debug!(phase = ?self.phase.get(), "mount already active");
            return self.phase.get();
        }
        self.lifecycles.set(self.lifecycles.get() + 1);
        let generation = self.bump_generation();
        self.ready_fired.set(0);
        let halted = Rc::new(Cell::new(false));
        *self.walk_halted.borrow_mut() = Rc::clone(&halted);
        let seed = self.fallback_seed(candidates);

        let mut walk = pin!(self.resolver.resolve_until(candidates, &halted));
        let grace = pin!(tokio::time::sleep(self.opts.grace_period));

        let early = match select(walk.as_mut(), grace).await {
            Either::Left((outcome, _)) => Some(outcome),
            Either::Right(_) => None,
        };

        let outcome = match early {
            Some(outcome) => outcome,
            None => {
                if self.is_current(generation) {
                    tracing::warn!(
                        grace_ms = self.opts.grace_period.as_millis() as u64,
                        "no model resolved within the grace period"
                    );
                    let effects = self.step(MountEvent::GraceElapsed);
                    self.apply(effects, None, seed);
                }
                halted.set(true);
                walk.await
            }
        };

        if self.is_current(generation) {
            self.settle(outcome, seed);
        } else {
            self.discard_stale(outcome);
        }
        self.phase.get()
    }

    /// Tear down the current lifecycle. Cache entries are kept.
    pub fn unmount(&self) {
        let effects = self.step(MountEvent::Unmount);
        self.walk_halted.borrow().set(true);
        self.bump_generation();
        self.ready_fired.set(0);
        self.apply(effects, None, 0);
    }

    /// Advance time-driven state and sample the camera for this frame.
    pub fn frame(&self, scroll: &ScrollMetrics, now_secs: f64) -> FrameState {
        self.uniforms.borrow_mut().tick(now_secs);
        let progress = scroll.progress();
        let model_yaw = if self.phase.get() == ScenePhase::Loaded {
            progress * self.opts.scroll_turns * TAU
        } else {
            0.0
        };
        FrameState {
            camera: camera_pose_at(progress, &self.opts.camera),
            model_yaw,
            u_time: self.uniforms.borrow().u_time(),
        }
    }

    /// Materials currently driven by the time uniform.
    pub fn spinning_materials(&self) -> usize {
        self.uniforms.borrow().registered()
    }

    fn bump_generation(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        next
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.get() == generation
    }

    /// Outcome of a walk whose lifecycle was unmounted.
    fn discard_stale(&self, outcome: BackdropResult<SceneHandle>) {
        match outcome {
            Ok(handle) => {
                tracing::debug!(
                    locator = handle.locator(),
                    instance = handle.id().as_u64(),
                    "discarding model of an unmounted lifecycle"
                );
                self.late_discarded.set(self.late_discarded.get() + 1);
            }
            Err(err) => tracing::debug!("{err} (lifecycle unmounted)"),
        }
    }

    fn step(&self, event: MountEvent) -> Vec<Effect> {
        let from = self.phase.get();
        let t = reduce(from, event);
        if t.next != from {
            tracing::debug!(?from, to = ?t.next, ?event, "mount transition");
        }
        self.phase.set(t.next);
        t.effects
    }

    fn settle(&self, outcome: BackdropResult<SceneHandle>, seed: u64) {
        match outcome {
            Ok(handle) => {
                let effects = self.step(MountEvent::AttemptSucceeded);
                self.apply(effects, Some(handle), seed);
            }
            Err(err) => {
                if self.phase.get() == ScenePhase::Loading {
                    tracing::warn!("{err}; populating fallback");
                } else {
                    tracing::debug!("{err}");
                }
                let effects = self.step(MountEvent::CandidatesExhausted);
                self.apply(effects, None, seed);
            }
        }
    }

    fn apply(&self, effects: Vec<Effect>, mut resolved: Option<SceneHandle>, seed: u64) {
        for effect in effects {
            match effect {
                // Driven directly by `run`.
                Effect::StartCandidateWalk | Effect::ArmGraceTimer => {}
                Effect::MountScene => {
                    if let Some(handle) = resolved.take() {
                        self.mount_scene(handle);
                    }
                }
                Effect::PopulateFallback => {
                    let field = FallbackField::populate(
                        &self.opts.fallback,
                        seed,
                        self.opts.reduced_motion,
                    );
                    tracing::debug!(bodies = field.len(), seed, "fallback field populated");
                    *self.content.borrow_mut() = MountContent::Fallback(field);
                }
                Effect::NotifyReady(source) => {
                    self.ready_fired.set(self.ready_fired.get() + 1);
                    tracing::info!(?source, "background ready");
                    self.listener.borrow_mut().on_ready(source);
                }
                Effect::DiscardLateResult => {
                    if let Some(handle) = resolved.take() {
                        tracing::debug!(
                            locator = handle.locator(),
                            instance = handle.id().as_u64(),
                            "discarding late model result"
                        );
                        self.late_discarded.set(self.late_discarded.get() + 1);
                    }
                }
                Effect::ReleaseContent => {
                    *self.content.borrow_mut() = MountContent::Nothing;
                    self.uniforms.borrow_mut().release();
                }
            }
        }
    }

    fn mount_scene(&self, mut handle: SceneHandle) {
        if let Some(speed) = self.opts.gpu_spin_speed {
            inject_gpu_spin(handle.graph_mut(), speed);
            self.uniforms.borrow_mut().register(handle.graph());
        }
        tracing::info!(
            locator = handle.locator(),
            instance = handle.id().as_u64(),
            scale = handle.normalization().scale,
            "model mounted"
        );
        *self.content.borrow_mut() = MountContent::Model(handle);
    }

    fn fallback_seed<S: AsRef<str>>(&self, candidates: &[S]) -> u64 {
        if let Some(seed) = self.opts.fallback.seed {
            return seed;
        }
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        seed_from_strs(
            candidates.iter().map(|c| c.as_ref()),
            nanos ^ self.lifecycles.get(),
        )
    }
}
