use predicates::prelude::PredicateBooleanExt;

#[test]
fn check_pcp_help() {
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.arg("--help").assert();
}

fn setup_test_env() -> (tempfile::TempDir, tempfile::TempDir) {
    let src_dir = tempfile::tempdir().unwrap();
    let dst_dir = tempfile::tempdir().unwrap();
    (src_dir, dst_dir)
}

fn create_test_file(path: &std::path::Path, size: usize) -> Vec<u8> {
    let contents: Vec<u8> = (0..size).map(|i| (i % 251) as u8).collect();
    std::fs::write(path, &contents).unwrap();
    contents
}

fn leftover_parts(dst: &std::path::Path) -> Vec<std::path::PathBuf> {
    let dir = dst.parent().unwrap();
    let prefix = format!("{}.", dst.file_name().unwrap().to_str().unwrap());
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_str()
                .unwrap()
                .starts_with(&prefix)
        })
        .collect()
}

#[test]
fn test_basic_copy() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("big.bin");
    let dst_file = dst_dir.path().join("copy.bin");
    let contents = create_test_file(&src_file, 3 * 1024 * 1024 + 17);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success();
    assert!(std::fs::read(&dst_file).unwrap() == contents);
    assert!(leftover_parts(&dst_file).is_empty());
}

#[test]
fn test_copy_many_parts_small_blocks() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("data");
    let dst_file = dst_dir.path().join("data");
    let contents = create_test_file(&src_file, 100_003);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--parts",
        "13",
        "--block-size",
        "4KiB",
        "--poll-interval",
        "5ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success();
    assert!(std::fs::read(&dst_file).unwrap() == contents);
    assert!(leftover_parts(&dst_file).is_empty());
}

#[test]
fn test_copy_into_existing_directory() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("image.iso");
    let contents = create_test_file(&src_file, 4096);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "-p",
        "3",
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_dir.path().to_str().unwrap(),
    ])
    .assert()
    .success();
    assert_eq!(
        std::fs::read(dst_dir.path().join("image.iso")).unwrap(),
        contents
    );
}

#[test]
fn test_copy_into_trailing_slash() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("image.iso");
    let contents = create_test_file(&src_file, 999);
    let dst = format!("{}/", dst_dir.path().to_str().unwrap());
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst.as_str(),
    ])
    .assert()
    .success();
    assert_eq!(
        std::fs::read(dst_dir.path().join("image.iso")).unwrap(),
        contents
    );
}

#[test]
fn test_empty_file() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("empty");
    let dst_file = dst_dir.path().join("empty");
    create_test_file(&src_file, 0);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success();
    assert_eq!(std::fs::metadata(&dst_file).unwrap().len(), 0);
    assert!(leftover_parts(&dst_file).is_empty());
}

#[test]
fn test_overwrites_existing_file() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("new");
    let dst_file = dst_dir.path().join("old");
    let contents = create_test_file(&src_file, 10_000);
    std::fs::write(&dst_file, "old content").unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success();
    assert_eq!(std::fs::read(&dst_file).unwrap(), contents);
}

#[test]
fn test_summary_output() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("src");
    let dst_file = dst_dir.path().join("dst");
    create_test_file(&src_file, 2048);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--summary",
        "--parts",
        "4",
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stdout(
        predicates::str::contains("parts copied: 4").and(predicates::str::contains("parts merged: 4")),
    );
}

#[test]
fn test_progress_text_updates() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("src");
    let dst_file = dst_dir.path().join("dst");
    create_test_file(&src_file, 65536);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--progress-type",
        "text-updates",
        "--progress-delay",
        "10ms",
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .success()
    .stderr(predicates::str::contains("COPIED"));
}

#[test]
fn test_missing_source_fails() {
    let (src_dir, dst_dir) = setup_test_env();
    let dst_file = dst_dir.path().join("dst");
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        src_dir.path().join("nope").to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicates::str::contains("planning failed"));
    assert!(!dst_file.exists());
    assert!(leftover_parts(&dst_file).is_empty());
}

#[test]
fn test_directory_source_fails() {
    let (src_dir, dst_dir) = setup_test_env();
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        src_dir.path().to_str().unwrap(),
        dst_dir.path().join("dst").to_str().unwrap(),
    ])
    .assert()
    .failure();
}

#[test]
fn test_unwritable_destination_fails() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("src");
    create_test_file(&src_file, 1000);
    let dst_file = dst_dir.path().join("no").join("such").join("dir").join("dst");
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicates::str::contains("copy failed"));
}

#[test]
fn test_quiet_suppresses_errors() {
    let (src_dir, dst_dir) = setup_test_env();
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--quiet",
        src_dir.path().join("nope").to_str().unwrap(),
        dst_dir.path().join("dst").to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicates::str::is_empty());
}

#[test]
fn test_verbose_logs_stages() {
    let (src_dir, dst_dir) = setup_test_env();
    let src_file = src_dir.path().join("src");
    let dst_file = dst_dir.path().join("dst");
    create_test_file(&src_file, 4096);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "-v",
        "--parts",
        "2",
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .env_remove("RUST_LOG")
    .assert()
    .success()
    .stdout(
        predicates::str::contains("copying 4096 bytes")
            .and(predicates::str::contains("merging 2 copied parts"))
            .and(predicates::str::contains("complete")),
    );
}

#[test]
fn test_source_named_like_a_part_is_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let src_file = dir.path().join("data.1");
    let dst_file = dir.path().join("data");
    let contents = create_test_file(&src_file, 5000);
    let mut cmd = assert_cmd::Command::cargo_bin("pcp").unwrap();
    cmd.args([
        "--parts",
        "3",
        "--poll-interval",
        "10ms",
        src_file.to_str().unwrap(),
        dst_file.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicates::str::contains("planning failed"));
    assert_eq!(std::fs::read(&src_file).unwrap(), contents);
    assert!(!dst_file.exists());
}
