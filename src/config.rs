use std::{fs::File, io::BufReader, path::Path, rc::Rc, time::Duration};

use crate::{
    animation::camera::KeyframeTable,
    assets::{
        cache::SceneCache, fetch::AssetFetcher, manifest::CandidateManifest,
        normalize::NormalizeOptions,
    },
    foundation::error::{BackdropError, BackdropResult},
    resolver::{
        fallback::FallbackOptions,
        mount::{MountOptions, SceneMount},
        resolve::{AssetResolver, ResolveOptions},
    },
};

/// JSON-facing configuration of a background mount.
///
/// Every field is optional; missing fields take the defaults of the page the engine was
/// written for.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BackdropConfig {
    /// Explicit candidate locators. When empty, `manifest` is expanded instead.
    pub candidates: Vec<String>,
    pub manifest: CandidateManifest,
    pub grace_period_ms: u64,
    pub retry_delay_ms: u64,
    pub normalize: NormalizeOptions,
    pub fallback: FallbackOptions,
    pub camera: KeyframeTable,
    /// Y-spin injected into model materials; `null` disables injection.
    pub gpu_spin_speed: Option<f32>,
    pub scroll_turns: f32,
    pub reduced_motion: bool,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        let mount = MountOptions::default();
        let resolve = ResolveOptions::default();
        Self {
            candidates: Vec::new(),
            manifest: CandidateManifest::default(),
            grace_period_ms: mount.grace_period.as_millis() as u64,
            retry_delay_ms: resolve.retry_delay.as_millis() as u64,
            normalize: resolve.normalize,
            fallback: mount.fallback,
            camera: mount.camera,
            gpu_spin_speed: mount.gpu_spin_speed,
            scroll_turns: mount.scroll_turns,
            reduced_motion: mount.reduced_motion,
        }
    }
}

impl BackdropConfig {
    /// Parse a configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> BackdropResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| BackdropError::serde(format!("parse backdrop config JSON: {e}")))
    }

    /// Parse a configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> BackdropResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            BackdropError::validation(format!("open backdrop config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> BackdropResult<()> {
        if self.candidates.is_empty() {
            self.manifest.validate()?;
        } else if self.candidates.iter().any(|c| c.trim().is_empty()) {
            return Err(BackdropError::validation("candidate locators must not be empty"));
        }
        if self.grace_period_ms == 0 {
            return Err(BackdropError::validation("grace_period_ms must be > 0"));
        }
        self.normalize.validate()?;
        self.fallback.validate()?;
        self.camera.validate()?;
        if let Some(speed) = self.gpu_spin_speed
            && !speed.is_finite()
        {
            return Err(BackdropError::validation("gpu_spin_speed must be finite"));
        }
        if !self.scroll_turns.is_finite() {
            return Err(BackdropError::validation("scroll_turns must be finite"));
        }
        Ok(())
    }

    /// Ordered, duplicate-free candidate list.
    pub fn candidate_list(&self) -> Vec<String> {
        if self.candidates.is_empty() {
            self.manifest.expand()
        } else {
            crate::assets::manifest::dedup_locators(&self.candidates)
        }
    }

    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            normalize: self.normalize,
        }
    }

    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            grace_period: Duration::from_millis(self.grace_period_ms),
            gpu_spin_speed: self.gpu_spin_speed,
            reduced_motion: self.reduced_motion,
            fallback: self.fallback,
            camera: self.camera.clone(),
            scroll_turns: self.scroll_turns,
        }
    }

    /// Build a mount sharing `cache` and loading through `fetcher`.
    pub fn build_mount(&self, cache: Rc<SceneCache>, fetcher: Rc<dyn AssetFetcher>) -> SceneMount {
        let resolver = AssetResolver::new(cache, fetcher, self.resolve_options());
        SceneMount::new(resolver, self.mount_options())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
