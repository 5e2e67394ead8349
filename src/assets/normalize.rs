use crate::{
    assets::scene::SceneGraph,
    foundation::{
        core::Vec3,
        error::{BackdropError, BackdropResult},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Target size and scale clamp used when fitting a loaded model into the view.
pub struct NormalizeOptions {
    /// Longest bounding-box dimension after scaling.
    pub target_size: f32,
    /// Lower scale clamp; also used when the bounds are degenerate.
    pub min_scale: f32,
    /// Upper scale clamp.
    pub max_scale: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            target_size: 12.0,
            min_scale: 0.01,
            max_scale: 100.0,
        }
    }
}

impl NormalizeOptions {
    /// Validate that the clamp range and target are usable.
    pub fn validate(&self) -> BackdropResult<()> {
        if !self.target_size.is_finite() || self.target_size <= 0.0 {
            return Err(BackdropError::validation(
                "normalize target_size must be finite and > 0",
            ));
        }
        if !self.min_scale.is_finite() || self.min_scale <= 0.0 {
            return Err(BackdropError::validation(
                "normalize min_scale must be finite and > 0",
            ));
        }
        if !self.max_scale.is_finite() || self.max_scale < self.min_scale {
            return Err(BackdropError::validation(
                "normalize max_scale must be finite and >= min_scale",
            ));
        }
        Ok(())
    }

    /// Uniform scale that brings `longest_dim` to `target_size`, clamped to
    /// `[min_scale, max_scale]`. Zero, negative or non-finite dimensions yield `min_scale`.
    pub fn scale_for(&self, longest_dim: f32) -> f32 {
        if !longest_dim.is_finite() || longest_dim <= 0.0 {
            return self.min_scale;
        }
        (self.target_size / longest_dim).clamp(self.min_scale, self.max_scale)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// What [`normalize`] did to a scene.
pub struct Normalization {
    /// Uniform factor multiplied into the root scale.
    pub scale: f32,
    /// Translation added to the root to center the scaled bounds at the origin.
    pub offset: Vec3,
    /// True when the source bounds were empty, zero-sized or non-finite.
    pub degenerate: bool,
}

/// Fit `graph` to the target size, center it at the origin and force every mesh visible,
/// opaque and shadowless.
///
/// Deterministic: normalizing two copies of the same source yields identical graphs.
pub fn normalize(graph: &mut SceneGraph, opts: &NormalizeOptions) -> Normalization {
    let bounds = graph.world_bounds();
    let longest = bounds.longest_dim();
    let degenerate = bounds.is_empty() || !bounds.is_finite() || !(longest > 0.0);
    if degenerate {
        tracing::warn!(
            longest,
            "{}",
            BackdropError::malformed("degenerate bounding box, using minimum scale")
        );
    }

    let scale = opts.scale_for(if degenerate { 0.0 } else { longest });
    graph.root.transform.scale *= scale;

    let scaled = graph.world_bounds();
    let offset = if scaled.is_empty() || !scaled.is_finite() {
        Vec3::ZERO
    } else {
        -scaled.center()
    };
    graph.root.transform.translation += offset;

    force_visible(graph);

    Normalization {
        scale,
        offset,
        degenerate,
    }
}

fn force_visible(graph: &mut SceneGraph) {
    graph.for_each_node_mut(|node| {
        let Some(mesh) = &mut node.mesh else {
            return;
        };
        node.visible = true;
        mesh.cast_shadow = false;
        mesh.receive_shadow = false;
        for mat in &mut mesh.materials {
            mat.visible = true;
            mat.transparent = false;
            mat.opacity = 1.0;
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/assets/normalize.rs"]
mod tests;
