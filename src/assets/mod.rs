//! Scene assets: parsing, fetching, caching and post-load fixes.

/// Process-wide scene cache with single-flight fetches.
pub mod cache;
/// Fetcher trait plus filesystem and in-memory fetchers.
pub mod fetch;
/// glTF / GLB bounds reader.
pub mod gltf;
/// `uTime` driven material spin.
pub mod gpu;
/// Candidate locator lists.
pub mod manifest;
/// Fit-to-view normalization.
pub mod normalize;
/// Scene graph model.
pub mod scene;
