use super::*;
use crate::{
    assets::scene::{Material, SceneNode},
    foundation::core::Aabb,
};

const THREE_STYLE: &str = "#include <common>\nvoid main() {\n  #include <beginnormal_vertex>\n  vec3 transformed = vec3( position );\n  gl_Position = vec4(transformed, 1.0);\n}\n";

#[test]
fn patch_inserts_uniform_and_rotation_after_anchor() {
    let out = patch_vertex_shader(THREE_STYLE, 0.3).unwrap();
    assert!(out.starts_with("uniform float uTime;\n"));
    let anchor = out.find("vec3 transformed = vec3( position );").unwrap();
    let rot = out.find("float _angle = uTime * 0.300;").unwrap();
    let gl = out.find("gl_Position").unwrap();
    assert!(anchor < rot && rot < gl);
    assert!(out.contains("transformed = _rotY * transformed;"));
}

#[test]
fn patch_tolerates_whitespace_variants() {
    let src = "void main(){vec3   transformed=vec3(position) ;}";
    let out = patch_vertex_shader(src, 1.0).unwrap();
    assert!(out.contains("_rotY"));
    assert!(out.ends_with("}"));
}

#[test]
fn patch_keeps_version_line_first() {
    let src = "#version 300 es\nvoid main(){ vec3 transformed = vec3( position ); }";
    let out = patch_vertex_shader(src, 0.5).unwrap();
    assert!(out.starts_with("#version 300 es\nuniform float uTime;\n"));
}

#[test]
fn patch_is_idempotent_and_rejects_missing_anchor() {
    let once = patch_vertex_shader(THREE_STYLE, 0.3).unwrap();
    let twice = patch_vertex_shader(&once, 0.3).unwrap();
    assert_eq!(once, twice);
    assert!(patch_vertex_shader("void main(){ myvec3 transformed = vec3(position); }", 0.3).is_err());
    assert!(patch_vertex_shader("void main(){}", 0.3).is_err());
}

#[test]
fn injection_marks_each_material_once() {
    let mut node = SceneNode::with_mesh(Aabb::from_center_size(Vec3::ZERO, Vec3::ONE));
    node.mesh.as_mut().unwrap().materials.push(Material {
        opacity: 0.0,
        visible: false,
        ..Material::default()
    });
    let mut scene = SceneGraph::new(node);

    assert_eq!(inject_gpu_spin(&mut scene, 0.3), 2);
    assert_eq!(inject_gpu_spin(&mut scene, 0.9), 0);
    let mesh = scene.root.mesh.as_ref().unwrap();
    for m in &mesh.materials {
        assert_eq!(m.gpu_spin, Some(GpuSpin { speed: 0.3 }));
        assert!(m.visible);
        assert_eq!(m.opacity, 1.0);
    }

    let mut uniforms = TimeUniforms::new();
    assert_eq!(uniforms.register(&scene), 2);
    uniforms.release();
    assert_eq!(uniforms.registered(), 0);
}

#[test]
fn cpu_rotation_matches_shader_matrix() {
    let mut uniforms = TimeUniforms::new();
    uniforms.tick(2.0);
    let m = uniforms.rotation_for(&GpuSpin { speed: 0.5 });
    let expected = Mat3::from_rotation_y(-1.0);
    assert!(m.abs_diff_eq(expected, 1e-6));
    assert_eq!(spin_y(0.0, 3.0), Mat3::IDENTITY);
}
