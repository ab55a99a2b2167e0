use refcheck::{ConfigError, FlagValue, Flags, FlagsFile};
use std::io::Write;
use std::path::Path;

#[test]
fn test_load_fixture() {
    let file = FlagsFile::load(Path::new("tests/fixtures/flags.toml")).unwrap();
    assert_eq!(file.format.as_deref(), Some("json"));
    assert_eq!(
        file.match_by_key,
        Some(FlagValue::from(vec!["/items/:id"]))
    );

    let flags = file.apply(Flags::builder()).unwrap().build().unwrap();
    assert_eq!(flags.match_by_key().len(), 1);
    assert_eq!(flags.reject_paths().len(), 1);
    assert_eq!(flags.max_diffs(), None);
}

#[test]
fn test_load_missing_file() {
    let err = FlagsFile::load(Path::new("tests/fixtures/absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::ReadError { .. }));
    assert!(err
        .to_string()
        .starts_with("Failed to read config file tests/fixtures/absent.toml"));
}

#[test]
fn test_load_rejects_unknown_keys() {
    let err = FlagsFile::load(Path::new("tests/fixtures/bad_flags.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::TomlError { .. }));
    assert!(err.to_string().contains("colour"));
}

#[test]
fn test_empty_file_sets_nothing() {
    let file = FlagsFile::parse("", "empty.toml").unwrap();
    assert_eq!(file, FlagsFile::default());
}

#[test]
fn test_values_use_flag_coercion() {
    let mut tmp = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(tmp, "max_diffs = \"5\"\nfail_fast = true\nmatch_by_value = \"/tags\"").unwrap();

    let flags = FlagsFile::load(tmp.path())
        .unwrap()
        .apply(Flags::builder())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(flags.max_diffs(), Some(5));
    assert_eq!(flags.cutoff(), Some(1));
    assert!(flags.matches_by_value(&"/tags".parse().unwrap()));
}

#[test]
fn test_invalid_value_fails_at_build() {
    let file = FlagsFile::parse("reject_paths = true\n", "bad.toml").unwrap();
    let err = file.apply(Flags::builder()).unwrap().build().unwrap_err();
    assert_eq!(err.to_string(), "true is not a legal value for reject_paths");
}
