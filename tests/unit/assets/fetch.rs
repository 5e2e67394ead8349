use super::*;
use crate::{assets::scene::SceneNode, foundation::core::Aabb};

fn cube() -> SceneGraph {
    SceneGraph::new(SceneNode::with_mesh(Aabb::new(
        crate::foundation::core::Vec3::splat(-1.0),
        crate::foundation::core::Vec3::splat(1.0),
    )))
}

#[test]
fn normalize_locator_strips_roots_and_queries() {
    assert_eq!(
        normalize_locator("/assets/porsche/scene.gltf").unwrap(),
        "assets/porsche/scene.gltf"
    );
    assert_eq!(
        normalize_locator("assets\\models\\car.glb").unwrap(),
        "assets/models/car.glb"
    );
    assert_eq!(normalize_locator("./car.glb?url").unwrap(), "car.glb");
    assert_eq!(normalize_locator("a//b/./c.glb#frag").unwrap(), "a/b/c.glb");
}

#[test]
fn normalize_locator_rejects_traversal_and_empty() {
    assert!(normalize_locator("../secret.glb").is_err());
    assert!(normalize_locator("assets/../../x.glb").is_err());
    assert!(normalize_locator("/").is_err());
    assert!(normalize_locator("").is_err());
}

#[tokio::test]
async fn memory_fetcher_serves_counts_and_fails() {
    let fetcher = MemoryFetcher::new()
        .with_scene("/good.glb", cube())
        .with_failure("/broken.glb", FetchError::Parse("truncated".into()));

    assert_eq!(fetcher.fetch("/good.glb").await.unwrap(), cube());
    assert_eq!(
        fetcher.fetch("/broken.glb").await.unwrap_err(),
        FetchError::Parse("truncated".into())
    );
    assert_eq!(
        fetcher.fetch("/missing.glb").await.unwrap_err(),
        FetchError::NotFound
    );
    fetcher.fetch("/good.glb").await.unwrap();

    assert_eq!(fetcher.fetch_count("/good.glb"), 2);
    assert_eq!(fetcher.fetch_count("/missing.glb"), 1);
    assert_eq!(fetcher.total_fetches(), 4);
}

#[tokio::test(start_paused = true)]
async fn memory_fetcher_applies_latency() {
    let fetcher = MemoryFetcher::new()
        .with_scene("/slow.glb", cube())
        .with_latency("/slow.glb", Duration::from_secs(3));
    let start = tokio::time::Instant::now();
    fetcher.fetch("/slow.glb").await.unwrap();
    assert_eq!(start.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn fs_fetcher_rejects_unknown_extensions_and_missing_files() {
    let fetcher = FsFetcher::new(env!("CARGO_MANIFEST_DIR"));
    assert_eq!(
        fetcher.fetch("/Cargo.toml").await.unwrap_err(),
        FetchError::Unsupported("Cargo.toml".into())
    );
    assert_eq!(
        fetcher.fetch("/tests/data/nope.glb").await.unwrap_err(),
        FetchError::NotFound
    );
}

#[tokio::test]
async fn fs_fetcher_reports_bad_locators_as_unsupported() {
    let fetcher = FsFetcher::new(env!("CARGO_MANIFEST_DIR"));
    assert_eq!(
        fetcher.fetch("/../x.glb").await.unwrap_err(),
        FetchError::Unsupported("/../x.glb".into())
    );
    assert_eq!(
        fetcher.fetch("/").await.unwrap_err(),
        FetchError::Unsupported("/".into())
    );
}
