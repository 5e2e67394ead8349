//! Minimal glTF 2.0 reader: scene hierarchy, transforms, mesh bounds and material alpha.
//!
//! Vertex data is never decoded. Mesh bounds come from the `min`/`max` of each primitive's
//! `POSITION` accessor, which glTF 2.0 requires to be present.

use std::collections::HashMap;

use glam::Mat4;

use crate::{
    assets::scene::{Material, Mesh, SceneGraph, SceneNode},
    foundation::{
        core::{Aabb, Quat, Transform, Vec3},
        error::{BackdropError, BackdropResult},
    },
};

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const GLB_HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;
const MAX_DEPTH: usize = 256;

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Document {
    asset: AssetInfo,
    #[serde(default)]
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<SceneDef>,
    #[serde(default)]
    nodes: Vec<NodeDef>,
    #[serde(default)]
    meshes: Vec<MeshDef>,
    #[serde(default)]
    accessors: Vec<AccessorDef>,
    #[serde(default)]
    materials: Vec<MaterialDef>,
}

#[derive(serde::Deserialize)]
struct AssetInfo {
    version: String,
}

#[derive(serde::Deserialize)]
struct SceneDef {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(serde::Deserialize)]
struct NodeDef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    children: Vec<usize>,
    #[serde(default)]
    mesh: Option<usize>,
    #[serde(default)]
    translation: Option<[f32; 3]>,
    #[serde(default)]
    rotation: Option<[f32; 4]>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
    #[serde(default)]
    matrix: Option<[f32; 16]>,
}

#[derive(serde::Deserialize)]
struct MeshDef {
    #[serde(default)]
    primitives: Vec<PrimitiveDef>,
}

#[derive(serde::Deserialize)]
struct PrimitiveDef {
    #[serde(default)]
    attributes: HashMap<String, usize>,
    #[serde(default)]
    material: Option<usize>,
}

#[derive(serde::Deserialize)]
struct AccessorDef {
    #[serde(default)]
    min: Option<Vec<f32>>,
    #[serde(default)]
    max: Option<Vec<f32>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialDef {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    alpha_mode: Option<String>,
    #[serde(default)]
    pbr_metallic_roughness: Option<PbrDef>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct PbrDef {
    #[serde(default)]
    base_color_factor: Option<[f32; 4]>,
}

/// Parse a binary GLB container or a plain glTF JSON document into a [`SceneGraph`].
///
/// The returned graph has a grouping root whose children are the default scene's root nodes.
pub fn parse_gltf(bytes: &[u8]) -> BackdropResult<SceneGraph> {
    let json = if bytes.starts_with(b"glTF") {
        glb_json_chunk(bytes)?
    } else {
        bytes
    };
    let doc: Document = serde_json::from_slice(json)
        .map_err(|e| BackdropError::malformed(format!("parse glTF JSON: {e}")))?;
    build_scene(&doc)
}

fn read_u32(bytes: &[u8], at: usize) -> BackdropResult<u32> {
    bytes
        .get(at..at + 4)
        .and_then(|b| <[u8; 4]>::try_from(b).ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| BackdropError::malformed("truncated GLB header"))
}

fn glb_json_chunk(bytes: &[u8]) -> BackdropResult<&[u8]> {
    if read_u32(bytes, 0)? != GLB_MAGIC {
        return Err(BackdropError::malformed("bad GLB magic"));
    }
    let version = read_u32(bytes, 4)?;
    if version != 2 {
        return Err(BackdropError::malformed(format!(
            "unsupported GLB version {version}"
        )));
    }
    let total = read_u32(bytes, 8)? as usize;
    if total > bytes.len() {
        return Err(BackdropError::malformed(format!(
            "GLB declares {total} bytes but only {} are present",
            bytes.len()
        )));
    }

    let chunk_len = read_u32(bytes, GLB_HEADER_LEN)? as usize;
    let chunk_type = read_u32(bytes, GLB_HEADER_LEN + 4)?;
    if chunk_type != CHUNK_JSON {
        return Err(BackdropError::malformed("first GLB chunk must be JSON"));
    }
    let start = GLB_HEADER_LEN + CHUNK_HEADER_LEN;
    bytes
        .get(start..start + chunk_len)
        .filter(|_| start + chunk_len <= total)
        .ok_or_else(|| BackdropError::malformed("GLB JSON chunk overruns the container"))
}

fn build_scene(doc: &Document) -> BackdropResult<SceneGraph> {
    if !doc.asset.version.starts_with('2') {
        return Err(BackdropError::malformed(format!(
            "unsupported glTF version '{}'",
            doc.asset.version
        )));
    }

    let roots: Vec<usize> = if doc.scenes.is_empty() {
        // No scenes: every node that is nobody's child is a root.
        let mut is_child = vec![false; doc.nodes.len()];
        for node in &doc.nodes {
            for &c in &node.children {
                if let Some(flag) = is_child.get_mut(c) {
                    *flag = true;
                }
            }
        }
        (0..doc.nodes.len()).filter(|&i| !is_child[i]).collect()
    } else {
        let idx = doc.scene.unwrap_or(0);
        doc.scenes
            .get(idx)
            .ok_or_else(|| BackdropError::malformed(format!("scene {idx} does not exist")))?
            .nodes
            .clone()
    };

    let children = roots
        .into_iter()
        .map(|i| build_node(doc, i, 0))
        .collect::<BackdropResult<Vec<_>>>()?;
    Ok(SceneGraph::new(SceneNode::group(children)))
}

fn build_node(doc: &Document, index: usize, depth: usize) -> BackdropResult<SceneNode> {
    if depth > MAX_DEPTH {
        return Err(BackdropError::malformed(
            "node hierarchy is cyclic or too deep",
        ));
    }
    let def = doc
        .nodes
        .get(index)
        .ok_or_else(|| BackdropError::malformed(format!("node {index} does not exist")))?;

    let mesh = def.mesh.map(|m| build_mesh(doc, m)).transpose()?;
    let children = def
        .children
        .iter()
        .map(|&c| build_node(doc, c, depth + 1))
        .collect::<BackdropResult<Vec<_>>>()?;

    Ok(SceneNode {
        name: def.name.clone(),
        transform: node_transform(def),
        visible: true,
        mesh,
        children,
    })
}

fn node_transform(def: &NodeDef) -> Transform {
    if let Some(m) = def.matrix {
        let (scale, rotation, translation) =
            Mat4::from_cols_array(&m).to_scale_rotation_translation();
        return Transform {
            translation,
            rotation,
            scale,
        };
    }
    Transform {
        translation: def.translation.map(Vec3::from_array).unwrap_or(Vec3::ZERO),
        rotation: def
            .rotation
            .map(|q| Quat::from_array(q).normalize())
            .unwrap_or(Quat::IDENTITY),
        scale: def.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE),
    }
}

fn build_mesh(doc: &Document, index: usize) -> BackdropResult<Mesh> {
    let def = doc
        .meshes
        .get(index)
        .ok_or_else(|| BackdropError::malformed(format!("mesh {index} does not exist")))?;

    let mut bounds = Aabb::EMPTY;
    let mut materials = Vec::with_capacity(def.primitives.len());
    for prim in &def.primitives {
        if let Some(&acc) = prim.attributes.get("POSITION") {
            bounds = bounds.union(accessor_bounds(doc, acc)?);
        }
        materials.push(match prim.material {
            Some(m) => build_material(doc, m)?,
            None => Material::default(),
        });
    }

    Ok(Mesh {
        bounds,
        materials,
        cast_shadow: true,
        receive_shadow: true,
    })
}

fn accessor_bounds(doc: &Document, index: usize) -> BackdropResult<Aabb> {
    let acc = doc
        .accessors
        .get(index)
        .ok_or_else(|| BackdropError::malformed(format!("accessor {index} does not exist")))?;
    let as_vec3 = |v: &Option<Vec<f32>>| match v.as_deref() {
        Some([x, y, z, ..]) => Some(Vec3::new(*x, *y, *z)),
        _ => None,
    };
    match (as_vec3(&acc.min), as_vec3(&acc.max)) {
        (Some(min), Some(max)) => Ok(Aabb::new(min, max)),
        _ => {
            tracing::warn!(accessor = index, "POSITION accessor without min/max");
            Ok(Aabb::EMPTY)
        }
    }
}

fn build_material(doc: &Document, index: usize) -> BackdropResult<Material> {
    let def = doc
        .materials
        .get(index)
        .ok_or_else(|| BackdropError::malformed(format!("material {index} does not exist")))?;
    let opacity = def
        .pbr_metallic_roughness
        .as_ref()
        .and_then(|p| p.base_color_factor)
        .map(|c| c[3])
        .unwrap_or(1.0);
    Ok(Material {
        name: def.name.clone(),
        opacity,
        transparent: def.alpha_mode.as_deref() == Some("BLEND"),
        visible: true,
        gpu_spin: None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/gltf.rs"]
mod tests;
