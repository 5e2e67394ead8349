use std::{
    cell::RefCell,
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use futures::future::{FutureExt, LocalBoxFuture};

use crate::{
    assets::{gltf::parse_gltf, scene::SceneGraph},
    foundation::error::{BackdropError, BackdropResult, FetchError},
};

/// Future returned by [`AssetFetcher::fetch`]. Local: fetches resume on the mount's thread.
pub type FetchFuture<'a> = LocalBoxFuture<'a, Result<SceneGraph, FetchError>>;

/// Source of scene assets, injected into the resolver.
pub trait AssetFetcher {
    /// Fetch and parse the asset at `locator`.
    fn fetch<'a>(&'a self, locator: &'a str) -> FetchFuture<'a>;
}

/// Turn a page-style locator into a relative path.
///
/// Accepts `/assets/a.glb`, `assets\a.glb` and `./assets/a.glb?url`; strips query/fragment
/// suffixes and leading `/`; rejects empty paths and `..` traversal.
pub fn normalize_locator(locator: &str) -> BackdropResult<String> {
    let s = locator.replace('\\', "/");
    let s = s.split(['?', '#']).next().unwrap_or_default();

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(BackdropError::validation("asset locators must not contain '..'"));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(BackdropError::validation(
            "asset locator must contain a file name",
        ));
    }
    Ok(out.join("/"))
}

#[derive(Clone, Debug)]
/// Loads `.glb` / `.gltf` files below a root directory.
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    async fn load(&self, locator: &str) -> Result<SceneGraph, FetchError> {
        let rel = normalize_locator(locator).map_err(|e| {
            tracing::debug!(locator, "{e}");
            FetchError::Unsupported(locator.to_string())
        })?;
        let ext = Path::new(&rel)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(ext.as_deref(), Some("glb" | "gltf")) {
            return Err(FetchError::Unsupported(rel));
        }

        let path = self.root.join(&rel);
        let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => FetchError::NotFound,
            _ => FetchError::Io(format!("read '{}': {e}", path.display())),
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "read asset");
        parse_gltf(&bytes).map_err(FetchError::from)
    }
}

impl AssetFetcher for FsFetcher {
    fn fetch<'a>(&'a self, locator: &'a str) -> FetchFuture<'a> {
        self.load(locator).boxed_local()
    }
}

#[derive(Debug, Default)]
/// Serves preloaded scenes from memory, with optional per-locator latency.
///
/// Counts every fetch it serves, which makes it the fetcher of choice for tests and for
/// embedders that bundle their models.
pub struct MemoryFetcher {
    entries: HashMap<String, Result<SceneGraph, FetchError>>,
    latency: HashMap<String, Duration>,
    default_latency: Duration,
    fetches: RefCell<HashMap<String, usize>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `graph` at `locator`.
    pub fn with_scene(mut self, locator: impl Into<String>, graph: SceneGraph) -> Self {
        self.entries.insert(locator.into(), Ok(graph));
        self
    }

    /// Fail fetches of `locator` with `err`.
    pub fn with_failure(mut self, locator: impl Into<String>, err: FetchError) -> Self {
        self.entries.insert(locator.into(), Err(err));
        self
    }

    /// Delay fetches of `locator` by `delay`.
    pub fn with_latency(mut self, locator: impl Into<String>, delay: Duration) -> Self {
        self.latency.insert(locator.into(), delay);
        self
    }

    /// Delay every fetch without an explicit latency by `delay`.
    pub fn with_default_latency(mut self, delay: Duration) -> Self {
        self.default_latency = delay;
        self
    }

    /// Number of fetches started for `locator`.
    pub fn fetch_count(&self, locator: &str) -> usize {
        self.fetches.borrow().get(locator).copied().unwrap_or(0)
    }

    /// Number of fetches started for all locators.
    pub fn total_fetches(&self) -> usize {
        self.fetches.borrow().values().sum()
    }
}

impl AssetFetcher for MemoryFetcher {
    fn fetch<'a>(&'a self, locator: &'a str) -> FetchFuture<'a> {
        *self
            .fetches
            .borrow_mut()
            .entry(locator.to_string())
            .or_default() += 1;
        let delay = self
            .latency
            .get(locator)
            .copied()
            .unwrap_or(self.default_latency);
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            self.entries
                .get(locator)
                .cloned()
                .unwrap_or(Err(FetchError::NotFound))
        }
        .boxed_local()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/fetch.rs"]
mod tests;
