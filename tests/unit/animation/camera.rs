use super::*;

fn example_table() -> KeyframeTable {
    KeyframeTable::new(vec![
        CameraKeyframe::new(0.0, Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO),
        CameraKeyframe::new(0.5, Vec3::new(5.0, 0.0, 5.0), Vec3::ZERO),
        CameraKeyframe::new(1.0, Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO),
    ])
    .unwrap()
}

#[test]
fn quarter_scroll_hits_first_segment_midpoint() {
    let pose = camera_pose_at(0.25, &example_table());
    assert_eq!(pose.position, Vec3::new(2.5, 0.0, 5.0));
    assert_eq!(pose.look_at, Vec3::ZERO);
}

#[test]
fn keyframe_fractions_return_exact_poses() {
    for table in [example_table(), KeyframeTable::walkaround()] {
        for k in table.keys() {
            assert_eq!(camera_pose_at(k.scroll, &table), k.pose(), "at {}", k.scroll);
        }
    }
}

#[test]
fn boundaries_agree_from_both_sides() {
    let table = KeyframeTable::walkaround();
    for k in &table.keys()[1..table.keys().len() - 1] {
        let below = camera_pose_at(k.scroll - 1e-4, &table);
        let above = camera_pose_at(k.scroll + 1e-4, &table);
        assert!(below.position.distance(k.position) < 1e-2);
        assert!(above.position.distance(k.position) < 1e-2);
    }
}

#[test]
fn sampling_is_idempotent() {
    let table = KeyframeTable::walkaround();
    for i in 0..=100 {
        let s = i as f32 / 100.0;
        assert_eq!(camera_pose_at(s, &table), camera_pose_at(s, &table));
    }
}

#[test]
fn out_of_range_scroll_is_clamped() {
    let table = example_table();
    assert_eq!(camera_pose_at(-2.0, &table), table.keys()[0].pose());
    assert_eq!(camera_pose_at(3.0, &table), table.keys()[2].pose());
    assert_eq!(camera_pose_at(f32::NAN, &table), table.keys()[0].pose());
}

#[test]
fn zero_width_segment_pins_to_left_key() {
    let table = KeyframeTable::new(vec![
        CameraKeyframe::new(0.0, Vec3::ZERO, Vec3::ZERO),
        CameraKeyframe::new(0.5, Vec3::X, Vec3::ZERO),
        CameraKeyframe::new(0.5, Vec3::Y, Vec3::ZERO),
        CameraKeyframe::new(1.0, Vec3::Z, Vec3::ZERO),
    ])
    .unwrap();
    assert_eq!(camera_pose_at(0.5, &table).position, Vec3::X);
    let just_after = camera_pose_at(0.5 + 1e-6, &table).position;
    assert!(just_after.distance(Vec3::Y) < 1e-4);
}

#[test]
fn single_key_table_is_constant() {
    let key = CameraKeyframe::new(0.0, Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO);
    let table = KeyframeTable::from_keys_unchecked(vec![key]);
    assert_eq!(camera_pose_at(0.7, &table), key.pose());
}

#[test]
fn validate_rejects_malformed_tables() {
    let k = |s: f32| CameraKeyframe::new(s, Vec3::ZERO, Vec3::ZERO);
    assert!(KeyframeTable::new(vec![]).is_err());
    assert!(KeyframeTable::new(vec![k(0.1), k(1.0)]).is_err());
    assert!(KeyframeTable::new(vec![k(0.0), k(0.9)]).is_err());
    assert!(KeyframeTable::new(vec![k(0.0), k(0.6), k(0.4), k(1.0)]).is_err());
    assert!(KeyframeTable::new(vec![k(0.0), k(f32::NAN), k(1.0)]).is_err());
    assert!(KeyframeTable::walkaround().validate().is_ok());
}

#[test]
fn scroll_progress_floors_max_offset() {
    assert_eq!(ScrollMetrics::new(0.0, 800.0, 800.0).progress(), 0.0);
    assert_eq!(ScrollMetrics::new(50.0, 800.0, 800.0).progress(), 1.0);
    assert_eq!(ScrollMetrics::new(600.0, 2000.0, 800.0).progress(), 0.5);
    assert_eq!(ScrollMetrics::new(-10.0, 2000.0, 800.0).progress(), 0.0);
    assert_eq!(ScrollMetrics::new(0.5, 0.0, 0.0).max_offset_px(), 1.0);
}

#[test]
fn table_round_trips_as_plain_json_array() {
    let json = serde_json::to_string(&example_table()).unwrap();
    assert!(json.starts_with('['));
    let back: KeyframeTable = serde_json::from_str(&json).unwrap();
    assert_eq!(back, example_table());
}
