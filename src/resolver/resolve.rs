use std::{cell::Cell, rc::Rc, time::Duration};

use crate::{
    assets::{
        cache::SceneCache,
        fetch::AssetFetcher,
        manifest::dedup_locators,
        normalize::{NormalizeOptions, normalize},
        scene::{SceneGraph, SceneHandle},
    },
    foundation::error::{BackdropError, BackdropResult},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResolveOptions {
    /// Pause after a failed candidate before trying the next one.
    pub retry_delay: Duration,
    /// Applied to every handed-out instance.
    pub normalize: NormalizeOptions,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_millis(200),
            normalize: NormalizeOptions::default(),
        }
    }
}

/// Walks candidate locators in order and hands out normalized scene instances.
pub struct AssetResolver {
    cache: Rc<SceneCache>,
    fetcher: Rc<dyn AssetFetcher>,
    opts: ResolveOptions,
}

impl std::fmt::Debug for AssetResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetResolver")
            .field("cache", &self.cache)
            .field("opts", &self.opts)
            .finish_non_exhaustive()
    }
}

impl AssetResolver {
    pub fn new(cache: Rc<SceneCache>, fetcher: Rc<dyn AssetFetcher>, opts: ResolveOptions) -> Self {
        Self {
            cache,
            fetcher,
            opts,
        }
    }

    pub fn cache(&self) -> &Rc<SceneCache> {
        &self.cache
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.opts
    }

    /// Resolve the first candidate that loads.
    ///
    /// Duplicates are tried once. Each success, cached or fresh, yields an independent
    /// normalized instance with its own id. Fails with
    /// [`BackdropError::AllCandidatesExhausted`] when nothing loads.
    pub async fn resolve<S: AsRef<str>>(&self, candidates: &[S]) -> BackdropResult<SceneHandle> {
        self.resolve_until(candidates, &Cell::new(false)).await
    }

    /// Like [`AssetResolver::resolve`], but starts no further attempt once `halted` is set.
    ///
    /// An attempt already in flight when `halted` is set still completes and still fills the
    /// cache.
    #[tracing::instrument(skip_all, fields(candidates = candidates.len()))]
    pub(crate) async fn resolve_until<S: AsRef<str>>(
        &self,
        candidates: &[S],
        halted: &Cell<bool>,
    ) -> BackdropResult<SceneHandle> {
        let unique = dedup_locators(candidates);
        let mut tried = 0;

        for (i, locator) in unique.iter().enumerate() {
            if i > 0 && !self.opts.retry_delay.is_zero() {
                tokio::time::sleep(self.opts.retry_delay).await;
            }
            if halted.get() {
                tracing::debug!(tried, "candidate walk halted");
                break;
            }

            tried += 1;
            tracing::debug!(%locator, attempt = tried, "trying candidate");
            match self.cache.get_or_fetch(locator, &self.fetcher).await {
                Ok(graph) => {
                    let handle = self.instantiate(locator, graph);
                    tracing::debug!(
                        %locator,
                        instance = handle.id().as_u64(),
                        scale = handle.normalization().scale,
                        "candidate resolved"
                    );
                    return Ok(handle);
                }
                Err(source) => {
                    let err = BackdropError::fetch_failed(locator.as_str(), source);
                    tracing::warn!("{err}");
                }
            }
        }

        Err(BackdropError::AllCandidatesExhausted { tried })
    }

    fn instantiate(&self, locator: &str, mut graph: SceneGraph) -> SceneHandle {
        let normalization = normalize(&mut graph, &self.opts.normalize);
        SceneHandle::new(
            self.cache.next_instance_id(),
            locator.to_string(),
            graph,
            normalization,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolver/resolve.rs"]
mod tests;
