//! Engine behind a scroll-driven 3D page background.
//!
//! - An [`AssetResolver`] walks candidate model locators through a shared [`SceneCache`] and
//!   hands out normalized scene instances.
//! - A [`SceneMount`] drives one resolve against a grace timer and falls back to a procedural
//!   [`FallbackField`] when nothing loads in time.
//! - [`camera_pose_at`] maps scroll progress onto a keyframed camera path.
#![forbid(unsafe_code)]

pub mod animation;
pub mod assets;
pub mod config;
pub mod foundation;
pub mod resolver;

pub use crate::animation::camera::{
    CameraKeyframe, CameraPose, KeyframeTable, ScrollMetrics, camera_pose_at,
};
pub use crate::animation::ease::Ease;
pub use crate::assets::cache::SceneCache;
pub use crate::assets::fetch::{AssetFetcher, FetchFuture, FsFetcher, MemoryFetcher};
pub use crate::assets::gltf::parse_gltf;
pub use crate::assets::manifest::CandidateManifest;
pub use crate::assets::normalize::{Normalization, NormalizeOptions, normalize};
pub use crate::assets::scene::{InstanceId, SceneGraph, SceneHandle, SceneNode};
pub use crate::config::BackdropConfig;
pub use crate::foundation::core::{Aabb, Transform, Vec3};
pub use crate::foundation::error::{BackdropError, BackdropResult, FetchError};
pub use crate::resolver::fallback::{FallbackField, FallbackOptions};
pub use crate::resolver::mount::{FrameState, MountContent, MountOptions, ReadyListener, SceneMount};
pub use crate::resolver::resolve::{AssetResolver, ResolveOptions};
pub use crate::resolver::state::{ReadySource, ScenePhase};
