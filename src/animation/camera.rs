use glam::Mat4;

use crate::foundation::{
    core::Vec3,
    error::{BackdropError, BackdropResult},
};

/// Camera position and look-at target.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Component-wise lerp. `t <= 0` and `t >= 1` return the endpoints bit-for-bit.
    pub fn lerp(a: Self, b: Self, t: f32) -> Self {
        if t <= 0.0 {
            return a;
        }
        if t >= 1.0 {
            return b;
        }
        Self {
            position: a.position.lerp(b.position, t),
            look_at: a.look_at.lerp(b.look_at, t),
        }
    }

    /// Right-handed view matrix with +Y up.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }
}

/// One entry of a scroll-driven camera path.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CameraKeyframe {
    /// Scroll progress in `[0, 1]` at which this pose is reached.
    pub scroll: f32,
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraKeyframe {
    pub fn new(scroll: f32, position: Vec3, look_at: Vec3) -> Self {
        Self {
            scroll,
            position,
            look_at,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose::new(self.position, self.look_at)
    }
}

/// Ordered camera keyframes: non-decreasing `scroll`, first at `0`, last at `1`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct KeyframeTable {
    keys: Vec<CameraKeyframe>,
}

impl Default for KeyframeTable {
    fn default() -> Self {
        Self::walkaround()
    }
}

impl KeyframeTable {
    /// Build and validate a table.
    pub fn new(keys: Vec<CameraKeyframe>) -> BackdropResult<Self> {
        let table = Self { keys };
        table.validate()?;
        Ok(table)
    }

    /// Build a table without validation. Sampling stays defined but the poses near a malformed
    /// boundary are unspecified.
    pub fn from_keys_unchecked(keys: Vec<CameraKeyframe>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[CameraKeyframe] {
        &self.keys
    }

    pub fn validate(&self) -> BackdropResult<()> {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return Err(BackdropError::validation(
                "keyframe table must have at least one key",
            ));
        };
        for (i, k) in self.keys.iter().enumerate() {
            if !k.scroll.is_finite() || !k.position.is_finite() || !k.look_at.is_finite() {
                return Err(BackdropError::validation(format!(
                    "keyframe {i} must have finite scroll, position and look_at"
                )));
            }
        }
        if first.scroll != 0.0 {
            return Err(BackdropError::validation("first keyframe must be at scroll 0"));
        }
        if last.scroll != 1.0 {
            return Err(BackdropError::validation("last keyframe must be at scroll 1"));
        }
        if !self.keys.windows(2).all(|w| w[0].scroll <= w[1].scroll) {
            return Err(BackdropError::validation(
                "keyframes must be sorted by non-decreasing scroll",
            ));
        }
        Ok(())
    }

    pub fn pose_at(&self, scroll: f32) -> CameraPose {
        camera_pose_at(scroll, self)
    }

    /// Eye-height walk around an object at the origin, returning to the start.
    pub fn walkaround() -> Self {
        let target = Vec3::new(0.0, 1.4, 0.0);
        let keys = [
            (0.0, Vec3::new(2.0, 1.6, 12.0)),
            (0.15, Vec3::new(4.0, 1.7, 6.0)),
            (0.3, Vec3::new(1.0, 1.65, 2.0)),
            (0.45, Vec3::new(-3.0, 1.7, 1.0)),
            (0.6, Vec3::new(-5.0, 1.65, 4.0)),
            (0.8, Vec3::new(-2.0, 1.6, 9.0)),
            (1.0, Vec3::new(2.0, 1.7, 12.0)),
        ];
        Self {
            keys: keys
                .into_iter()
                .map(|(scroll, position)| CameraKeyframe::new(scroll, position, target))
                .collect(),
        }
    }
}

/// Sample the camera path at `scroll` (clamped to `[0, 1]`, NaN treated as `0`).
///
/// Pure and stateless; call it every frame.
pub fn camera_pose_at(scroll: f32, table: &KeyframeTable) -> CameraPose {
    let keys = table.keys();
    if keys.is_empty() {
        return CameraPose::new(Vec3::ZERO, Vec3::NEG_Z);
    }
    let s = if scroll.is_nan() {
        0.0
    } else {
        scroll.clamp(0.0, 1.0)
    };

    // Tables are tiny; a forward scan finds the first segment whose end key is >= s.
    let last = keys.len() - 1;
    let mut i = 0;
    while i < last && s > keys[i + 1].scroll {
        i += 1;
    }
    if i == last {
        return keys[last].pose();
    }

    let a = &keys[i];
    let b = &keys[i + 1];
    let span = b.scroll - a.scroll;
    let denom = if span == 0.0 { 1.0 } else { span };
    let local_t = ((s - a.scroll) / denom).clamp(0.0, 1.0);
    CameraPose::lerp(a.pose(), b.pose(), local_t)
}

/// Page scroll measurements in CSS pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScrollMetrics {
    pub offset_px: f64,
    pub document_height_px: f64,
    pub viewport_height_px: f64,
}

impl ScrollMetrics {
    pub fn new(offset_px: f64, document_height_px: f64, viewport_height_px: f64) -> Self {
        Self {
            offset_px,
            document_height_px,
            viewport_height_px,
        }
    }

    /// Maximum scroll offset, floored at 1 so short pages never divide by zero.
    pub fn max_offset_px(&self) -> f64 {
        (self.document_height_px - self.viewport_height_px).max(1.0)
    }

    /// Scroll progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let p = self.offset_px / self.max_offset_px();
        if p.is_nan() {
            return 0.0;
        }
        p.clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/camera.rs"]
mod tests;
