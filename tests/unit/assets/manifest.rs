use super::*;

#[test]
fn default_manifest_starts_with_priority_and_has_no_duplicates() {
    let list = CandidateManifest::default().expand();
    assert_eq!(
        list[0],
        "/assets/porsche_911_gt1_straenversion_www.vecarz.com.glb"
    );
    assert_eq!(list[1], "/assets/background.glb");
    assert_eq!(list[2], "/assets/background.gltf");

    // 1 priority + 7*2 root paths (one equal to the priority) + 5*7*2 folder paths.
    assert_eq!(list.len(), 1 + 14 - 1 + 70);
    assert_eq!(dedup_locators(&list), list);
    assert_eq!(list.last().unwrap(), "/assets/models/3d/porsche_911_gt1_straenversion_www.vecarz.com.gltf");
}

#[test]
fn expansion_order_is_root_then_folders() {
    let m = CandidateManifest {
        priority: vec![],
        base: "/m/".into(),
        names: vec!["a".into(), "b".into()],
        extensions: vec![".glb".into()],
        folders: vec!["/x/".into()],
    };
    assert_eq!(
        m.expand(),
        vec!["/m/a.glb", "/m/b.glb", "/m/x/a.glb", "/m/x/b.glb"]
    );
}

#[test]
fn dedup_keeps_first_occurrence() {
    let out = dedup_locators(&["b", "a", "b", "c", "a"]);
    assert_eq!(out, vec!["b", "a", "c"]);
    assert!(dedup_locators::<&str>(&[]).is_empty());
}

#[test]
fn validate_rejects_empty_and_bad_extensions() {
    assert!(CandidateManifest::default().validate().is_ok());

    let empty = CandidateManifest {
        priority: vec![],
        names: vec![],
        ..CandidateManifest::default()
    };
    assert!(empty.validate().is_err());

    let bad_ext = CandidateManifest {
        extensions: vec!["glb".into()],
        ..CandidateManifest::default()
    };
    assert!(bad_ext.validate().is_err());
}
