use assert_cmd::Command;

/*-------------------------------------------------------------------------------------------------
  cloudipranges Binary Tests
-------------------------------------------------------------------------------------------------*/

fn cloudipranges() -> Command {
    Command::cargo_bin("cloudipranges").unwrap()
}

/*--------------------------------------------------------------------------------------
  Version and Help
--------------------------------------------------------------------------------------*/

#[test]
fn command_version() {
    cloudipranges().arg("--version").assert().success();
}

#[test]
fn command_help() {
    cloudipranges().arg("--help").assert().success();
}

/*--------------------------------------------------------------------------------------
  Argument Validation
--------------------------------------------------------------------------------------*/

#[test]
fn command_requires_bucket_name() {
    cloudipranges().arg("--dry-run").assert().failure().code(2);
}

#[test]
fn command_rejects_unknown_provider() {
    cloudipranges()
        .arg("--bucket-name")
        .arg("test-bucket")
        .arg("--skipped-providers")
        .arg("google,digitalocean")
        .assert()
        .failure()
        .code(2);
}

/*--------------------------------------------------------------------------------------
  Nothing To Crawl
--------------------------------------------------------------------------------------*/

#[test]
fn command_all_providers_skipped_fails() {
    let storage_root = tempfile::tempdir().unwrap();

    cloudipranges()
        .arg("--bucket-name")
        .arg("test-bucket")
        .arg("--storage-root")
        .arg(storage_root.path())
        .arg("--skipped-providers")
        .arg("google,amazon,azure,cloudflare,oracle")
        .assert()
        .failure()
        .code(1);

    // Nothing was published.
    assert!(!storage_root.path().join("test-bucket").exists());
}

#[test]
fn command_all_providers_skipped_dry_run_fails() {
    cloudipranges()
        .arg("--bucket-name")
        .arg("test-bucket")
        .arg("--dry-run")
        .arg("--skipped-providers")
        .arg("gcp,aws,azure,cloudflare,oci")
        .assert()
        .failure()
        .code(1);
}
