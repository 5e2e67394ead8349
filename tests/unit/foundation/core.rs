use super::*;

#[test]
fn empty_box_has_zero_extent() {
    let b = Aabb::EMPTY;
    assert!(b.is_empty());
    assert_eq!(b.size(), Vec3::ZERO);
    assert_eq!(b.center(), Vec3::ZERO);
    assert_eq!(b.longest_dim(), 0.0);
    assert!(b.transformed(&Affine3A::IDENTITY).is_empty());
}

#[test]
fn union_grows_to_cover_both() {
    let a = Aabb::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
    let b = Aabb::new(Vec3::new(0.0, -2.0, 0.0), Vec3::new(3.0, 0.5, 0.5));
    let u = a.union(b);
    assert_eq!(u.min, Vec3::new(-1.0, -2.0, 0.0));
    assert_eq!(u.max, Vec3::new(3.0, 1.0, 1.0));
    assert_eq!(Aabb::EMPTY.union(a), a);
    assert_eq!(u.longest_dim(), 4.0);
}

#[test]
fn transformed_box_follows_scale_and_translation() {
    let b = Aabb::from_center_size(Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0));
    let t = Transform {
        translation: Vec3::new(10.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
        scale: Vec3::splat(0.5),
    };
    let out = b.transformed(&t.to_affine());
    assert_eq!(out.center(), Vec3::new(10.0, 0.0, 0.0));
    assert_eq!(out.size(), Vec3::new(1.0, 2.0, 3.0));
}

#[test]
fn rotated_box_swaps_axes() {
    let b = Aabb::from_center_size(Vec3::ZERO, Vec3::new(2.0, 1.0, 4.0));
    let t = Transform {
        rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
        ..Transform::IDENTITY
    };
    let size = b.transformed(&t.to_affine()).size();
    assert!((size.x - 4.0).abs() < 1e-5);
    assert!((size.y - 1.0).abs() < 1e-5);
    assert!((size.z - 2.0).abs() < 1e-5);
}
