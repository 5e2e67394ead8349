use super::*;
use crate::{
    assets::scene::{Material, SceneNode},
    foundation::core::{Aabb, Transform},
};

fn offset_box(center: Vec3, size: Vec3) -> SceneGraph {
    let mut node = SceneNode::with_mesh(Aabb::from_center_size(Vec3::ZERO, size));
    node.transform = Transform::from_translation(center);
    SceneGraph::new(SceneNode::group(vec![node]))
}

#[test]
fn longest_dimension_is_fit_to_target() {
    let mut scene = offset_box(Vec3::new(3.0, -1.0, 7.0), Vec3::new(2.0, 4.0, 1.0));
    let opts = NormalizeOptions::default();
    let n = normalize(&mut scene, &opts);
    assert_eq!(n.scale, 3.0);
    assert!(!n.degenerate);

    let b = scene.world_bounds();
    assert!((b.longest_dim() - opts.target_size).abs() < 1e-4);
    assert!(b.center().length() < 1e-4);
}

#[test]
fn degenerate_bounds_use_minimum_scale() {
    let mut empty = SceneGraph::new(SceneNode::default());
    let n = normalize(&mut empty, &NormalizeOptions::default());
    assert_eq!(n.scale, 0.01);
    assert!(n.degenerate);
    assert!(n.scale.is_finite());

    let mut flat = offset_box(Vec3::ONE, Vec3::ZERO);
    let n = normalize(&mut flat, &NormalizeOptions::default());
    assert_eq!(n.scale, 0.01);
    assert!(n.degenerate);
    assert!(flat.root.transform.translation.is_finite());
}

#[test]
fn scale_is_clamped_for_tiny_and_huge_models() {
    let opts = NormalizeOptions::default();
    assert_eq!(opts.scale_for(1e-6), 100.0);
    assert_eq!(opts.scale_for(1e6), 0.01);
    assert_eq!(opts.scale_for(0.0), 0.01);
    assert_eq!(opts.scale_for(f32::NAN), 0.01);
    assert_eq!(opts.scale_for(-4.0), 0.01);
    assert_eq!(opts.scale_for(6.0), 2.0);
}

#[test]
fn meshes_are_forced_visible_opaque_and_shadowless() {
    let mut scene = offset_box(Vec3::ZERO, Vec3::ONE);
    {
        let node = &mut scene.root.children[0];
        node.visible = false;
        let mesh = node.mesh.as_mut().unwrap();
        mesh.cast_shadow = true;
        mesh.receive_shadow = true;
        mesh.materials = vec![
            Material {
                opacity: 0.0,
                transparent: true,
                visible: false,
                ..Material::default()
            },
            Material::default(),
        ];
    }
    normalize(&mut scene, &NormalizeOptions::default());

    let node = &scene.root.children[0];
    let mesh = node.mesh.as_ref().unwrap();
    assert!(node.visible);
    assert!(!mesh.cast_shadow && !mesh.receive_shadow);
    for m in &mesh.materials {
        assert!(m.visible);
        assert!(!m.transparent);
        assert_eq!(m.opacity, 1.0);
    }
}

#[test]
fn normalization_is_deterministic() {
    let source = offset_box(Vec3::new(-4.0, 2.0, 0.5), Vec3::new(0.3, 0.2, 0.9));
    let mut a = source.clone();
    let mut b = source.clone();
    let na = normalize(&mut a, &NormalizeOptions::default());
    let nb = normalize(&mut b, &NormalizeOptions::default());
    assert_eq!(na, nb);
    assert_eq!(a, b);
}

#[test]
fn options_validate_ranges() {
    assert!(NormalizeOptions::default().validate().is_ok());
    let bad = NormalizeOptions {
        min_scale: 5.0,
        max_scale: 1.0,
        ..NormalizeOptions::default()
    };
    assert!(bad.validate().is_err());
    let bad = NormalizeOptions {
        target_size: 0.0,
        ..NormalizeOptions::default()
    };
    assert!(bad.validate().is_err());
}
