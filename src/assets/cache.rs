use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use futures::future::{FutureExt, LocalBoxFuture, Shared};

use crate::{
    assets::{
        fetch::AssetFetcher,
        scene::{InstanceId, SceneGraph},
    },
    foundation::error::FetchError,
};

type InFlight = Shared<LocalBoxFuture<'static, Result<SceneGraph, FetchError>>>;

#[derive(Default)]
/// Process-wide store of parsed scenes, keyed by locator.
///
/// Entries are write-once and never evicted. Fetches of the same locator that overlap share a
/// single in-flight request; failures are not cached.
pub struct SceneCache {
    entries: RefCell<HashMap<String, SceneGraph>>,
    pending: RefCell<HashMap<String, InFlight>>,
    next_instance: Cell<u64>,
}

impl std::fmt::Debug for SceneCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneCache")
            .field("entries", &self.entries.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .field("next_instance", &self.next_instance.get())
            .finish()
    }
}

impl SceneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a cache ready to be shared between mounts.
    pub fn shared() -> Rc<Self> {
        Rc::new(Self::new())
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.entries.borrow().contains_key(locator)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Number of fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Deep copy of the cached scene at `locator`.
    pub fn get(&self, locator: &str) -> Option<SceneGraph> {
        self.entries.borrow().get(locator).cloned()
    }

    /// Store `graph` unless `locator` is already cached. Returns whether it was stored.
    pub fn insert(&self, locator: &str, graph: SceneGraph) -> bool {
        let mut entries = self.entries.borrow_mut();
        if entries.contains_key(locator) {
            return false;
        }
        entries.insert(locator.to_string(), graph);
        true
    }

    /// Allocate the id of the next handed-out instance.
    pub(crate) fn next_instance_id(&self) -> InstanceId {
        let id = self.next_instance.get() + 1;
        self.next_instance.set(id);
        InstanceId(id)
    }

    /// Return a copy of the cached scene, fetching it through `fetcher` on a miss.
    ///
    /// Callers that arrive while a fetch of the same locator is in flight await that fetch
    /// instead of starting another.
    pub async fn get_or_fetch(
        &self,
        locator: &str,
        fetcher: &Rc<dyn AssetFetcher>,
    ) -> Result<SceneGraph, FetchError> {
        if let Some(hit) = self.get(locator) {
            tracing::debug!(locator, "scene cache hit");
            return Ok(hit);
        }

        let in_flight = {
            let mut pending = self.pending.borrow_mut();
            pending
                .entry(locator.to_string())
                .or_insert_with(|| {
                    tracing::debug!(locator, "scene cache miss, fetching");
                    let fetcher = Rc::clone(fetcher);
                    let owned = locator.to_string();
                    async move { fetcher.fetch(&owned).await }
                        .boxed_local()
                        .shared()
                })
                .clone()
        };

        let result = in_flight.clone().await;
        {
            let mut pending = self.pending.borrow_mut();
            if pending.get(locator).is_some_and(|p| p.ptr_eq(&in_flight)) {
                pending.remove(locator);
            }
        }
        if let Ok(graph) = &result {
            self.insert(locator, graph.clone());
        }
        result
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
