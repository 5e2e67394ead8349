//! Time-driven Y rotation injected into mesh materials.
//!
//! A material carrying [`GpuSpin`] is drawn with a vertex shader patched by
//! [`patch_vertex_shader`]; the renderer feeds the shared `uTime` uniform from [`TimeUniforms`]
//! once per frame.

use crate::{
    assets::scene::SceneGraph,
    foundation::{
        core::{Mat3, Vec3},
        error::{BackdropError, BackdropResult},
    },
};

/// Name of the time uniform declared by patched shaders.
pub const TIME_UNIFORM: &str = "uTime";

const ROTATION_MARKER: &str = "_rotY";
const ANCHOR: [&str; 8] = ["vec3", "transformed", "=", "vec3", "(", "position", ")", ";"];

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Spin parameters of one injected material.
pub struct GpuSpin {
    /// Radians per second around +Y.
    pub speed: f32,
}

/// Mark every material of `graph` with a Y spin at `speed`.
///
/// Already injected materials keep their original speed but are forced visible again. Returns
/// the number of newly injected materials.
pub fn inject_gpu_spin(graph: &mut SceneGraph, speed: f32) -> usize {
    let mut injected = 0;
    graph.for_each_material_mut(|mat| {
        mat.visible = true;
        if mat.opacity == 0.0 {
            mat.opacity = 1.0;
        }
        if mat.gpu_spin.is_none() {
            mat.gpu_spin = Some(GpuSpin { speed });
            injected += 1;
        }
    });
    injected
}

/// Insert the `uTime` declaration and a Y rotation of `transformed` into a vertex shader.
///
/// The rotation goes right after `vec3 transformed = vec3( position );`, matched with arbitrary
/// whitespace between tokens. Already patched sources are returned unchanged.
pub fn patch_vertex_shader(src: &str, speed: f32) -> BackdropResult<String> {
    if src.contains(ROTATION_MARKER) {
        return Ok(src.to_string());
    }
    let end = find_anchor(src).ok_or_else(|| {
        BackdropError::validation("vertex shader has no `vec3 transformed = vec3( position );`")
    })?;

    let rotation = format!(
        "\n        float _angle = {TIME_UNIFORM} * {speed:.3};\
         \n        float _c = cos(_angle);\
         \n        float _s = sin(_angle);\
         \n        mat3 {ROTATION_MARKER} = mat3(_c, 0.0, _s, 0.0, 1.0, 0.0, -_s, 0.0, _c);\
         \n        transformed = {ROTATION_MARKER} * transformed;"
    );
    let declaration = format!("uniform float {TIME_UNIFORM};\n");

    // `#version` must stay the first line.
    let header_end = if src.trim_start().starts_with("#version") {
        src.find('\n').map(|i| i + 1).unwrap_or(src.len())
    } else {
        0
    };

    let mut out = String::with_capacity(src.len() + declaration.len() + rotation.len());
    out.push_str(&src[..header_end]);
    out.push_str(&declaration);
    out.push_str(&src[header_end..end]);
    out.push_str(&rotation);
    out.push_str(&src[end..]);
    Ok(out)
}

fn find_anchor(src: &str) -> Option<usize> {
    let mut search_from = 0;
    while let Some(rel) = src[search_from..].find(ANCHOR[0]) {
        let start = search_from + rel;
        if let Some(end) = match_tokens(src, start) {
            return Some(end);
        }
        search_from = start + ANCHOR[0].len();
    }
    None
}

fn match_tokens(src: &str, start: usize) -> Option<usize> {
    let is_ident = |c: char| c.is_ascii_alphanumeric() || c == '_';
    if src[..start].chars().next_back().is_some_and(is_ident) {
        return None;
    }

    let mut pos = start;
    for token in ANCHOR {
        pos += src[pos..].len() - src[pos..].trim_start().len();
        if !src[pos..].starts_with(token) {
            return None;
        }
        pos += token.len();
        if token.chars().all(is_ident) && src[pos..].chars().next().is_some_and(is_ident) {
            return None;
        }
    }
    Some(pos)
}

/// CPU mirror of the patched shader's rotation (GLSL `mat3` is column-major).
pub fn spin_y(u_time: f32, speed: f32) -> Mat3 {
    let angle = u_time * speed;
    let (s, c) = angle.sin_cos();
    Mat3::from_cols(Vec3::new(c, 0.0, s), Vec3::Y, Vec3::new(-s, 0.0, c))
}

#[derive(Clone, Debug, Default)]
/// Per-mount time uniform shared by all injected materials.
pub struct TimeUniforms {
    u_time: f32,
    registered: usize,
}

impl TimeUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track the injected materials of `graph`; returns how many were found.
    pub fn register(&mut self, graph: &SceneGraph) -> usize {
        let mut found = 0;
        graph.for_each_node(|node| {
            if let Some(mesh) = &node.mesh {
                found += mesh.materials.iter().filter(|m| m.gpu_spin.is_some()).count();
            }
        });
        self.registered += found;
        found
    }

    /// Advance the uniform to `now_secs`.
    pub fn tick(&mut self, now_secs: f64) {
        self.u_time = now_secs as f32;
    }

    pub fn u_time(&self) -> f32 {
        self.u_time
    }

    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Rotation a material with `spin` shows at the current time.
    pub fn rotation_for(&self, spin: &GpuSpin) -> Mat3 {
        spin_y(self.u_time, spin.speed)
    }

    /// Forget every registered material (unmount).
    pub fn release(&mut self) {
        self.registered = 0;
        self.u_time = 0.0;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/gpu.rs"]
mod tests;
