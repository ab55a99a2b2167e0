use refcheck::diff::CutoffReached;
use refcheck::{Diff, DiffKind, Diffs, DiffsError, Flags, Node, Path};

fn path(s: &str) -> Path {
    Path::parse(s).unwrap()
}

#[test]
fn test_empty() {
    let diffs = Diffs::new();
    assert!(diffs.is_empty());
    assert_eq!(diffs.len(), 0);
    assert!(diffs.get(0).is_none());
    assert!(matches!(diffs.at_path("/"), Err(DiffsError::NotFound { .. })));
}

#[test]
fn test_iteration_follows_recording_order() {
    let mut diffs = Diffs::new();
    for p in ["/z", "/a", "/m"] {
        diffs
            .record(DiffKind::Mismatch, &path(p), Some(&Node::Null), Some(&Node::Null))
            .unwrap();
    }
    let paths: Vec<&str> = diffs.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(paths, vec!["/z", "/a", "/m"]);

    let owned: Vec<Diff> = diffs.clone().into_iter().collect();
    assert_eq!(owned.len(), 3);
    assert_eq!(diffs.as_slice()[2].path, "/m");
}

#[test]
fn test_count_by_kind() {
    let mut diffs = Diffs::new();
    diffs.record(DiffKind::Missing, &path("/a"), Some(&Node::from(1_i64)), None).unwrap();
    diffs.record(DiffKind::Missing, &path("/b"), Some(&Node::from(2_i64)), None).unwrap();
    diffs.record(DiffKind::Extra, &path("/c"), None, Some(&Node::from(3_i64))).unwrap();

    assert_eq!(diffs.count(DiffKind::Missing), 2);
    assert_eq!(diffs.count(DiffKind::Extra), 1);
    assert_eq!(diffs.count(DiffKind::TypeMismatch), 0);
}

#[test]
fn test_fail_fast_allows_one_diff() {
    let flags = Flags::builder().fail_fast(true).build().unwrap();
    let mut diffs = Diffs::for_flags(&flags);

    assert!(diffs.record(DiffKind::Extra, &path("/a"), None, None).is_ok());
    assert_eq!(
        diffs.record(DiffKind::Extra, &path("/b"), None, None),
        Err(CutoffReached)
    );
    assert_eq!(diffs.len(), 1);
    assert!(diffs.at_path("/b").is_err());
}

#[test]
fn test_push_prebuilt_diff() {
    let mut diffs = Diffs::new();
    diffs
        .push(Diff {
            kind: DiffKind::TypeMismatch,
            path: "/x".to_string(),
            reference: Some(Node::Array(vec![])),
            candidate: Some(Node::Null),
        })
        .unwrap();
    assert_eq!(diffs["/x"].kind, DiffKind::TypeMismatch);
}

#[test]
#[should_panic(expected = "No diff recorded at path '/missing'")]
fn test_index_by_unknown_path_panics() {
    let diffs = Diffs::new();
    let _ = &diffs["/missing"];
}
