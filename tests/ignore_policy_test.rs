use bsm_portfolio::core::ignore_policy::Match;
use bsm_portfolio::{DashError, IgnorePolicy};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_built_in_policy() {
    let policy = IgnorePolicy::default();

    assert!(policy.is_ignored("venv/foo.txt", false));
    assert!(policy.is_ignored("src/module.pyc", false));
    assert!(policy.is_ignored(".DS_Store", false));
    assert!(policy.is_ignored("notes.log", false));
    assert!(policy.is_ignored("pages/__pycache__/app.cpython-312.pyc", false));

    // 資料檔保持可追蹤
    assert!(!policy.is_ignored("data/loan_data.parquet", false));
    assert!(!policy.is_ignored("app.py", false));
}

#[test]
fn test_policy_from_file_overrides_built_in() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(
        b"# build output\n/target\n*.parquet\n!data/loan_data.parquet\nbuild/\n!build/keep.txt\n",
    )
    .unwrap();

    let policy = IgnorePolicy::from_file(file.path()).unwrap();
    assert_eq!(policy.rules().len(), 5);

    assert!(policy.is_ignored("target", true));
    assert!(!policy.is_ignored("crates/target", true));

    assert!(policy.is_ignored("exports/old.parquet", false));
    match policy.matched("data/loan_data.parquet", false) {
        Match::Whitelisted(rule) => assert_eq!(rule.line(), 4),
        other => panic!("unexpected match: {other:?}"),
    }

    // 父目錄被忽略時無法重新納入
    assert!(policy.is_ignored("build/keep.txt", false));
}

#[test]
fn test_rule_display_for_verbose_output() {
    let policy = IgnorePolicy::default();
    let matched = policy.matched("debug.log", false);
    assert!(matched.is_ignored());
    assert!(matched.to_string().ends_with(":*.log"));

    assert_eq!(policy.matched("README.md", false).to_string(), "");
}

#[test]
fn test_invalid_pattern_reports_line() {
    let err = IgnorePolicy::parse("*.log\n[abc\n").unwrap_err();
    match err {
        DashError::InvalidPattern { line, .. } => assert_eq!(line, 2),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_missing_policy_file() {
    let err = IgnorePolicy::from_file("/definitely/not/here/.gitignore").unwrap_err();
    assert!(matches!(err, DashError::IoError(_)));
}
