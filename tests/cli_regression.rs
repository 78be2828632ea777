// CLI regression tests: output shape and exit codes of the `regrun` binary.
// Requires: assert_cmd, predicates crates in [dev-dependencies]

use std::fs;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

const MINE14: &str = "tests/fixtures/36-apron/89-mine14-mod.c";

fn regrun() -> Command {
    let mut cmd = Command::cargo_bin("regrun").unwrap();
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd
}

#[test]
fn cli_parse_prints_directives_in_order() {
    regrun().arg("parse").arg(MINE14).assert().success().stdout(
        "SKIP\n\
         --set ana.activated[+] apron\n\
         --set ana.path_sens[+] threadflag\n\
         --sets exp.apron.privatization mutex-meet-tid\n\
         --set ana.activated[-] threadJoins\n",
    );
}

#[test]
fn cli_parse_json_includes_annotations() {
    regrun()
        .args(["parse", "--json", MINE14])
        .assert()
        .success()
        .stdout(contains("\"verb\": \"sets\"").and(contains("\"expectation\": \"success\"")));
}

#[test]
fn cli_args_prints_one_argument_per_line() {
    regrun()
        .args(["args", MINE14])
        .assert()
        .success()
        .stdout(contains("--sets\nexp.apron.privatization\nmutex-meet-tid\n"));
}

#[test]
fn cli_options_applies_base_tree() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("base.json");
    fs::write(&base, r#"{"ana": {"activated": ["base", "threadJoins"]}}"#).unwrap();

    regrun()
        .args(["options", MINE14, "--base"])
        .arg(&base)
        .assert()
        .success()
        .stdout(contains("\"privatization\": \"mutex-meet-tid\"").and(contains("threadJoins").not()));
}

#[test]
fn cli_reports_miette_diagnostics_on_malformed_directive() {
    regrun()
        .args(["parse", "tests/fixtures/99-broken/01-bogus.c"])
        .assert()
        .failure()
        .stderr(contains("regrun::directive::malformed").and(contains("--bogus")));
}

#[test]
fn cli_list_marks_skip_and_invalid() {
    regrun()
        .args(["list", "tests/fixtures"])
        .assert()
        .failure()
        .stdout(
            contains("36-apron/89-mine14-mod.c")
                .and(contains("SKIP"))
                .and(contains("99-broken/01-bogus.c"))
                .and(contains("invalid")),
        );
}

#[test]
fn cli_rejects_unknown_config_keys() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("regrun.yaml");
    fs::write(&config, "anlyzer: goblint\n").unwrap();

    regrun()
        .arg("--config")
        .arg(&config)
        .args(["list", "tests/fixtures"])
        .assert()
        .failure()
        .stderr(contains("regrun::config"));
}

#[cfg(unix)]
#[test]
fn cli_run_takes_root_option_and_filters() {
    regrun()
        .args(["run", "--root", "tests/fixtures", "--analyzer", "true", "36/89"])
        .assert()
        .success()
        .stderr(
            contains("89-mine14-mod.c ... ok")
                .and(contains("1 passed; 0 failed; 0 invalid; 0 skipped")),
        );
}
