use crate::{
    assets::{gpu::GpuSpin, normalize::Normalization},
    foundation::core::{Aabb, Affine3A, Transform},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Surface material of a mesh, reduced to the properties the background cares about.
pub struct Material {
    /// Source name, if any.
    #[serde(default)]
    pub name: Option<String>,
    /// Opacity in `[0, 1]`.
    pub opacity: f32,
    /// Whether the material is alpha blended.
    pub transparent: bool,
    /// Whether the material is drawn at all.
    pub visible: bool,
    /// Time-driven Y spin injected into the vertex stage.
    #[serde(default)]
    pub gpu_spin: Option<GpuSpin>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            opacity: 1.0,
            transparent: false,
            visible: true,
            gpu_spin: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Renderable geometry attached to a node.
pub struct Mesh {
    /// Bounds in the owning node's local space.
    pub bounds: Aabb,
    /// One material per primitive.
    pub materials: Vec<Material>,
    /// Whether the mesh casts shadows.
    pub cast_shadow: bool,
    /// Whether the mesh receives shadows.
    pub receive_shadow: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Node of a scene tree.
pub struct SceneNode {
    /// Source name, if any.
    #[serde(default)]
    pub name: Option<String>,
    /// Transform relative to the parent node.
    #[serde(default)]
    pub transform: Transform,
    /// Node visibility.
    pub visible: bool,
    /// Geometry attached to this node.
    #[serde(default)]
    pub mesh: Option<Mesh>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl Default for SceneNode {
    fn default() -> Self {
        Self {
            name: None,
            transform: Transform::IDENTITY,
            visible: true,
            mesh: None,
            children: Vec::new(),
        }
    }
}

impl SceneNode {
    /// Empty grouping node.
    pub fn group(children: Vec<SceneNode>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    /// Node carrying a mesh with a single default material.
    pub fn with_mesh(bounds: Aabb) -> Self {
        Self {
            mesh: Some(Mesh {
                bounds,
                materials: vec![Material::default()],
                ..Mesh::default()
            }),
            ..Self::default()
        }
    }

    fn accumulate_bounds(&self, parent: &Affine3A, out: &mut Aabb) {
        let world = *parent * self.transform.to_affine();
        if let Some(mesh) = &self.mesh {
            *out = out.union(mesh.bounds.transformed(&world));
        }
        for child in &self.children {
            child.accumulate_bounds(&world, out);
        }
    }

    fn visit_mut(&mut self, f: &mut impl FnMut(&mut SceneNode)) {
        f(self);
        for child in &mut self.children {
            child.visit_mut(f);
        }
    }

    fn visit(&self, f: &mut impl FnMut(&SceneNode)) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// A parsed model: a single root node owning the whole tree.
///
/// `Clone` is a deep copy, so every clone can be transformed and animated independently.
pub struct SceneGraph {
    /// Root node; normalization writes its transform.
    pub root: SceneNode,
}

impl SceneGraph {
    /// Wrap a root node.
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    /// Bounds of every mesh in root space, including the root transform.
    pub fn world_bounds(&self) -> Aabb {
        let mut out = Aabb::EMPTY;
        self.root.accumulate_bounds(&Affine3A::IDENTITY, &mut out);
        out
    }

    /// Visit every node, parents before children.
    pub fn for_each_node(&self, mut f: impl FnMut(&SceneNode)) {
        self.root.visit(&mut f);
    }

    /// Visit every node mutably, parents before children.
    pub fn for_each_node_mut(&mut self, mut f: impl FnMut(&mut SceneNode)) {
        self.root.visit_mut(&mut f);
    }

    /// Visit every material of every mesh.
    pub fn for_each_material_mut(&mut self, mut f: impl FnMut(&mut Material)) {
        self.for_each_node_mut(|node| {
            if let Some(mesh) = &mut node.mesh {
                mesh.materials.iter_mut().for_each(&mut f);
            }
        });
    }

    /// Number of nodes carrying a mesh.
    pub fn mesh_count(&self) -> usize {
        let mut n = 0;
        self.for_each_node(|node| {
            if node.mesh.is_some() {
                n += 1;
            }
        });
        n
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Identity of one handed-out scene instance.
pub struct InstanceId(pub(crate) u64);

impl InstanceId {
    /// Access raw identifier.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

#[derive(Debug)]
/// An independent, normalized scene instance owned by one mount.
///
/// Not `Clone`; further instances come from the cache, each with a fresh id.
pub struct SceneHandle {
    id: InstanceId,
    locator: String,
    graph: SceneGraph,
    normalization: Normalization,
}

impl SceneHandle {
    pub(crate) fn new(
        id: InstanceId,
        locator: String,
        graph: SceneGraph,
        normalization: Normalization,
    ) -> Self {
        Self {
            id,
            locator,
            graph,
            normalization,
        }
    }

    /// Unique id of this instance.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Locator the scene was loaded from.
    pub fn locator(&self) -> &str {
        &self.locator
    }

    /// The normalized scene.
    pub fn graph(&self) -> &SceneGraph {
        &self.graph
    }

    /// Mutable access, e.g. for per-instance animation or GPU injection.
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        &mut self.graph
    }

    /// Scale and recentering applied when the instance was created.
    pub fn normalization(&self) -> Normalization {
        self.normalization
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/scene.rs"]
mod tests;
