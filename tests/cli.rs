use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

fn init_gallery() -> Result<TempDir> {
    let conf_dir = TempDir::new()?;
    cargo_run!("eigenface", "-c", conf_dir.path(), "init", "--face-length", "3").success();
    cargo_run!("eigenface", "-c", conf_dir.path(), "enroll", "A", "1,0,0").success();
    cargo_run!("eigenface", "-c", conf_dir.path(), "enroll", "B", "0,1,0").success();
    Ok(conf_dir)
}

#[test]
fn enroll_and_identify() -> Result<()> {
    let conf_dir = init_gallery()?;
    conf_dir.child("gallery.json").assert(predicate::str::contains("\"A\""));

    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "-t", "0.1", "1,0,0")
        .success()
        .stdout(predicate::str::starts_with("match\tA"));
    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "-t", "0.1", "0,1,0")
        .success()
        .stdout(predicate::str::starts_with("match\tB"));
    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "-t", "0.1", "0.5,0.5,0")
        .success()
        .stdout(predicate::str::starts_with("no match"));

    Ok(())
}

#[test]
fn identify_from_file_as_json() -> Result<()> {
    let conf_dir = init_gallery()?;
    let probe = conf_dir.child("probe.txt");
    probe.write_str("0 1 0\n")?;

    cargo_run!(
        "eigenface",
        "-c",
        conf_dir.path(),
        "identify",
        "--file",
        probe.path(),
        "--count",
        "2",
        "--output-format",
        "json"
    )
    .success()
    .stdout(predicate::str::contains("\"id\": \"B\""));

    Ok(())
}

#[test]
fn dimension_mismatch() -> Result<()> {
    let conf_dir = init_gallery()?;

    cargo_run!("eigenface", "-c", conf_dir.path(), "enroll", "C", "1,0").failure();
    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "1,0").failure();
    cargo_run!("eigenface", "-c", conf_dir.path(), "list")
        .success()
        .stdout(predicate::str::contains("C").not());

    Ok(())
}

#[test]
fn duplicate_id_needs_overwrite() -> Result<()> {
    let conf_dir = init_gallery()?;

    cargo_run!("eigenface", "-c", conf_dir.path(), "enroll", "A", "0,0,1").failure();
    cargo_run!("eigenface", "-c", conf_dir.path(), "enroll", "A", "0,0,1", "--overwrite").success();
    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "-t", "0.1", "0,0,1")
        .success()
        .stdout(predicate::str::starts_with("match\tA"));

    Ok(())
}

#[test]
fn withdraw_all() -> Result<()> {
    let conf_dir = init_gallery()?;

    cargo_run!("eigenface", "-c", conf_dir.path(), "withdraw", "A")
        .success()
        .stdout(predicate::str::contains("removed A"));
    cargo_run!("eigenface", "-c", conf_dir.path(), "withdraw", "A")
        .success()
        .stdout(predicate::str::contains("not found A"));
    cargo_run!("eigenface", "-c", conf_dir.path(), "withdraw", "B").success();

    cargo_run!("eigenface", "-c", conf_dir.path(), "identify", "1,0,0")
        .failure()
        .stderr(predicate::str::contains("gallery is empty"));

    Ok(())
}

#[test]
fn export_npy() -> Result<()> {
    let conf_dir = init_gallery()?;
    let output = conf_dir.child("out");

    cargo_run!("eigenface", "-c", conf_dir.path(), "export", "-o", output.path()).success();
    output.child("eigenfaces.npy").assert(predicate::path::exists());
    output.child("mean.npy").assert(predicate::path::exists());

    Ok(())
}

#[test]
fn init_refuses_overwrite() -> Result<()> {
    let conf_dir = init_gallery()?;

    cargo_run!("eigenface", "-c", conf_dir.path(), "init", "--face-length", "4").failure();
    cargo_run!("eigenface", "-c", conf_dir.path(), "init", "--face-length", "4", "--force")
        .success();
    cargo_run!("eigenface", "-c", conf_dir.path(), "list")
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}
