use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use ordfix_core::domain::rules::TargetPath;
use ordfix_core::infrastructure::xml::parse_document;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

const WORKED: &str = "order_FU70001236_THALES_corrected.xml";
const GEMENOS: &str = "order_FU70004512_THALES_corrected.xml";
const UNMATCHED: &str = "order_FU79999999_THALES_corrected.xml";

/// Copy of the demo project in a temp dir, so runs never touch the fixture.
struct OrdfixTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl OrdfixTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos/thales_project");

        let dest = tmp.path().join("thales_project");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &Path, dst: &Path) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn ordfix(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("ordfix"));
        cmd.current_dir(&self.root);
        for var in ["ORDFIX_REGISTRY", "ORDFIX_OUTPUT_DIR", "ORDFIX_MISSING_FIELD"] {
            cmd.env_remove(var);
        }
        cmd
    }

    fn text_at(&self, file: &Path, path: &str) -> Result<Option<String>> {
        let content = fs::read(self.root.join(file))?;
        let document = parse_document(&file.to_string_lossy(), &content)?;
        Ok(document.text_at(&TargetPath::parse(path)?))
    }
}

fn summary_line(stdout: &[u8]) -> String {
    String::from_utf8_lossy(stdout)
        .lines()
        .find_map(|l| l.strip_prefix("📊 "))
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_worked_example_is_corrected() -> Result<()> {
    let env = OrdfixTestEnv::new()?;

    env.ordfix()
        .args(["correct", "inbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("from registry snapshot"));

    let out = Path::new("corrected").join(WORKED);
    let expected = [
        ("ReferenceInformation/OrderId/IdValue", "FU70001236"),
        ("PositionCharacteristics/PositionStatus/Code", "10A3071"),
        ("PositionCharacteristics/PositionLevel", "OUVRIER"),
        ("PositionCharacteristics/PositionCoefficient", "B3"),
        ("CustomerReportingRequirements/CostCenterName", "1FRA / PLADI/BP/PST04"),
        ("CustomerReportingRequirements/DepartmentCode", "1FRA"),
        ("CustomerReportingRequirements/CostCenterCode", "1FRA"),
        ("WorkSite/WorkSiteName", "1FRA / PLADI/BP/PST04"),
    ];
    for (path, value) in expected {
        assert_eq!(env.text_at(&out, path)?.as_deref(), Some(value), "{path}");
    }

    // Inputs are never rewritten.
    let input = fs::read_to_string(env.root.join("inbox/order_FU70001236.xml"))?;
    assert!(input.contains("<Code>XXXX</Code>"));
    Ok(())
}

#[test]
fn test_worksite_skipped_for_excluded_site() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix().args(["correct", "inbox"]).assert().success();

    let out = Path::new("corrected").join(GEMENOS);
    assert_eq!(env.text_at(&out, "WorkSite/WorkSiteName")?, None);
    assert_eq!(
        env.text_at(&out, "ReferenceInformation/OrderId/IdValue")?.as_deref(),
        Some("FU70004512")
    );
    assert_eq!(
        env.text_at(&out, "PositionCharacteristics/PositionLevel")?.as_deref(),
        Some("ETAM")
    );
    Ok(())
}

#[test]
fn test_unmatched_order_is_left_alone() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .args(["correct", "inbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("FU79999999 not found in registry"));

    assert!(!env.root.join("corrected").join(UNMATCHED).exists());

    let report: serde_json::Value = serde_json::from_str(&fs::read_to_string(
        env.root.join("corrected/correction_report.json"),
    )?)?;
    assert_eq!(report["summary"]["corrected"], 2);
    assert_eq!(report["summary"]["unmatched"], 1);

    let unmatched = report["documents"]
        .as_array()
        .and_then(|docs| docs.iter().find(|d| d["state"] == "unmatched"))
        .context("unmatched document missing from report")?;
    assert_eq!(unmatched["log"].as_array().map(Vec::len), Some(1));
    assert_eq!(unmatched["log"][0]["reason"], "unmatched_order");
    Ok(())
}

#[test]
fn test_batch_summary() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    let output = env.ordfix().args(["correct", "inbox"]).output()?;
    assert!(output.status.success());

    insta::assert_snapshot!(
        summary_line(&output.stdout),
        @"3 document(s): 2 corrected, 1 unmatched, 0 unlocatable, 0 unparseable, 0 filtered, 0 unwritten | rules: 15 applied (14 changed, 17 created), 1 skipped | warnings: 0"
    );
    Ok(())
}

#[test]
fn test_second_pass_changes_nothing() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix().args(["correct", "inbox"]).assert().success();

    let output = env
        .ordfix()
        .env("ORDFIX_OUTPUT_DIR", "rerun")
        .args(["correct", "corrected"])
        .output()?;
    assert!(output.status.success());
    assert!(summary_line(&output.stdout).contains("(0 changed, 0 created)"));

    let first = fs::read_to_string(env.root.join("corrected").join(WORKED))?;
    let second = fs::read_to_string(
        env.root
            .join("rerun/order_FU70001236_THALES_corrected_THALES_corrected.xml"),
    )?;
    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_dry_run_writes_nothing() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .args(["correct", "--dry-run", "inbox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run"));

    assert!(!env.root.join("corrected").exists());
    Ok(())
}

#[test]
fn test_strict_fails_on_skipped_documents() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .args(["correct", "--strict", "inbox"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("1 document(s) not corrected"));
    Ok(())
}

#[test]
fn test_agency_filter() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    let output = env
        .ordfix()
        .args(["correct", "--agency", "mrs", "inbox"])
        .output()?;
    assert!(output.status.success());

    let summary = summary_line(&output.stdout);
    assert!(summary.contains("1 corrected"), "{summary}");
    assert!(summary.contains("1 filtered"), "{summary}");
    assert!(!env.root.join("corrected").join(GEMENOS).exists());
    Ok(())
}

#[test]
fn test_parse_failure_is_isolated() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    fs::write(env.root.join("inbox/broken.xml"), "<HumanResource><Open></HumanResource>")?;

    let output = env.ordfix().args(["correct", "inbox"]).output()?;
    assert!(output.status.success());
    assert!(summary_line(&output.stdout).contains("2 corrected"));
    assert!(summary_line(&output.stdout).contains("1 unparseable"));
    assert!(env.root.join("corrected").join(WORKED).exists());
    Ok(())
}

#[test]
fn test_same_file_name_in_two_folders() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    for (folder, source) in [("a", "order_FU70001236.xml"), ("b", "order_FU70004512.xml")] {
        let dir = env.root.join("batch").join(folder);
        fs::create_dir_all(&dir)?;
        fs::copy(env.root.join("inbox").join(source), dir.join("order.xml"))?;
    }

    let output = env.ordfix().args(["correct", "batch"]).output()?;
    assert!(output.status.success());
    assert!(summary_line(&output.stdout).contains("2 corrected"));

    let first = Path::new("corrected/order_THALES_corrected.xml");
    let second = Path::new("corrected/order_THALES_corrected_2.xml");
    assert_eq!(
        env.text_at(first, "ReferenceInformation/OrderId/IdValue")?.as_deref(),
        Some("FU70001236")
    );
    assert_eq!(
        env.text_at(second, "ReferenceInformation/OrderId/IdValue")?.as_deref(),
        Some("FU70004512")
    );
    Ok(())
}

#[test]
fn test_validate_demo_snapshot() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Snapshot is valid"))
        .stdout(predicate::str::contains("Agencies: AUB, MRS"));
    Ok(())
}

#[test]
fn test_validate_rejects_wrong_client() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    let path = env.root.join("thales_orders.json");
    let content = fs::read_to_string(&path)?.replace("\"client\": \"THALES\"", "\"client\": \"AIRBUS\"");
    fs::write(&path, content)?;

    env.ordfix()
        .arg("validate")
        .assert()
        .failure()
        .stdout(predicate::str::contains("metadata client is 'AIRBUS'"));
    Ok(())
}

#[test]
fn test_snapshot_then_inspect() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .args(["snapshot", "--values", "sheet_export.json", "--out", "rebuilt.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 row(s) without order number ignored"));

    let rebuilt: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(env.root.join("rebuilt.json"))?)?;
    assert_eq!(rebuilt["statistiques"]["total_commandes"], 2);
    assert_eq!(rebuilt["commandes"][0]["centre_analyse_prefix"], "1FRA");
    assert_eq!(rebuilt["commandes"][0]["date_debut"], "2025-01-15");
    assert_eq!(rebuilt["commandes"][1]["site_not_gemenos"], false);

    env.ordfix()
        .env("ORDFIX_REGISTRY", "rebuilt.json")
        .args(["inspect", "--order", "fu70001236"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10A3071"))
        .stdout(predicate::str::contains("55208131766522"));
    Ok(())
}

#[test]
fn test_inspect_unknown_order_fails() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .args(["inspect", "--order", "FU00000000"])
        .assert()
        .failure();
    Ok(())
}

#[test]
fn test_rules_listing() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    env.ordfix()
        .arg("rules")
        .assert()
        .success()
        .stdout(predicate::str::contains("8 rule(s) from registry snapshot"))
        .stdout(predicate::str::contains("worksite_conditional"))
        .stdout(predicate::str::contains("site_not_excluded"));
    Ok(())
}

#[test]
fn test_missing_config_fails() -> Result<()> {
    let env = OrdfixTestEnv::new()?;
    fs::remove_file(env.root.join("ordfix.yaml"))?;

    env.ordfix()
        .args(["correct", "inbox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No configuration file found"));
    Ok(())
}
