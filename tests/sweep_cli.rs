#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::{TempDir, tempdir};
use xquad_sweep::{
    FailurePolicy, LanguageCode, LanguageStatus, SweepReport, XQUAD_LANGUAGES, load_config,
};

// Records its arguments, working directory and VIRTUAL_ENV next to itself,
// and fails for the language named in a `fail_on` file.
const STUB: &str = r#"#!/bin/sh
here=$(cd "$(dirname "$0")" && pwd -P)
printf '%s\n' "$*" >> "$here/calls.log"
printf '%s|%s\n' "$(pwd -P)" "${VIRTUAL_ENV:-}" >> "$here/env.log"
lang=""
prev=""
for arg in "$@"; do
  if [ "$prev" = "--language" ]; then lang="$arg"; fi
  prev="$arg"
done
if [ -f "$here/fail_on" ]; then
  read fail_lang fail_code < "$here/fail_on"
  if [ "$lang" = "$fail_lang" ]; then
    echo "evaluator crashed on $lang" >&2
    exit "$fail_code"
  fi
fi
echo "Loading dataset $lang"
echo "Validation accuracy: 0.5 Validation loss: 1.0 Validation F1-score: 70.0 Validation Exact Match: 60.0"
"#;

struct Fixture {
    dir: TempDir,
    stub: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let stub = dir.path().join("stub_eval.sh");
        fs::write(&stub, STUB).unwrap();
        Self { dir, stub }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn fail_on(&self, language: &str, code: i32) {
        fs::write(self.root().join("fail_on"), format!("{language} {code}\n")).unwrap();
    }

    fn run(&self, extra: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_xquad-sweep"))
            .arg("--python")
            .arg("sh")
            .arg("--script")
            .arg(&self.stub)
            .arg("--workdir")
            .arg(self.root())
            .arg("--no-venv")
            .args(extra)
            .output()
            .unwrap()
    }

    fn calls(&self) -> Vec<Vec<(String, String)>> {
        read_calls(&self.root().join("calls.log"))
    }
}

fn read_calls(log: &Path) -> Vec<Vec<(String, String)>> {
    let raw = fs::read_to_string(log).unwrap_or_default();
    raw.lines()
        .map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            words
                .iter()
                .position(|w| w.starts_with("--"))
                .map(|start| {
                    words[start..]
                        .chunks(2)
                        .map(|pair| (pair[0].to_string(), pair.get(1).unwrap_or(&"").to_string()))
                        .collect()
                })
                .unwrap_or_default()
        })
        .collect()
}

fn field<'a>(call: &'a [(String, String)], flag: &str) -> &'a str {
    call.iter()
        .find(|(k, _)| k == flag)
        .map(|(_, v)| v.as_str())
        .unwrap()
}

#[test]
fn full_sweep_calls_every_language_in_order() {
    let fx = Fixture::new();
    let report_path = fx.root().join("report.json");

    let out = fx.run(&["--report", report_path.to_str().unwrap()]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let calls = fx.calls();
    assert_eq!(calls.len(), 12);
    let languages: Vec<&str> = calls.iter().map(|c| field(c, "--language")).collect();
    assert_eq!(languages, XQUAD_LANGUAGES);

    for call in &calls {
        assert_eq!(call.len(), 8);
        assert_eq!(field(call, "--model_path"), "/mnt/hdd/canine/models/canine_model.pt");
        assert_eq!(field(call, "--max_answer_length"), "256");
        assert_eq!(field(call, "--max_length"), "2048");
        assert_eq!(field(call, "--doc_stride"), "512");
        assert_eq!(field(call, "--n_best_size"), "20");
        assert_eq!(field(call, "--batch_size"), "8");
        assert_eq!(field(call, "--device"), "cuda");
    }

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Loading dataset xquad.en"));
    assert!(stdout.contains("Loading dataset xquad.ro"));

    let report: SweepReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report.succeeded, 12);
    assert!(report.outcomes.iter().all(|o| o.metrics.map(|m| m.f1) == Some(70.0)));
}

#[test]
fn failure_aborts_remaining_languages_with_child_status() {
    let fx = Fixture::new();
    fx.fail_on("xquad.zh", 3);
    let report_path = fx.root().join("report.json");

    let out = fx.run(&["--report", report_path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(3));
    assert!(!report_path.exists());

    let calls = fx.calls();
    assert_eq!(calls.len(), 4);
    assert_eq!(field(&calls[3], "--language"), "xquad.zh");
    assert!(String::from_utf8_lossy(&out.stderr).contains("evaluator crashed on xquad.zh"));
}

#[test]
fn continue_policy_runs_everything_and_reports_failure() {
    let fx = Fixture::new();
    fx.fail_on("xquad.de", 5);
    let report_path = fx.root().join("report.json");

    let out = fx.run(&[
        "--on-error",
        "continue",
        "--report",
        report_path.to_str().unwrap(),
    ]);
    assert_eq!(out.status.code(), Some(5));
    assert_eq!(fx.calls().len(), 12);

    let report: SweepReport =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report.failed, 1);
    assert!(matches!(report.outcomes[2].status, LanguageStatus::Failed { .. }));
}

#[test]
fn language_list_and_params_come_from_flags() {
    let fx = Fixture::new();
    let out = fx.run(&[
        "--languages",
        "xquad.el,xquad.th",
        "--device",
        "cpu",
        "--n-best-size",
        "5",
    ]);
    assert!(out.status.success());

    let calls = fx.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(field(&calls[1], "--language"), "xquad.th");
    assert!(calls.iter().all(|c| field(c, "--device") == "cpu"));
    assert!(calls.iter().all(|c| field(c, "--n_best_size") == "5"));
    assert!(calls.iter().all(|c| field(c, "--doc_stride") == "512"));
}

#[test]
fn save_config_writes_merged_flags_and_runs_nothing() {
    let fx = Fixture::new();
    let saved = fx.root().join("saved.json");

    let out = fx.run(&[
        "--save-config",
        saved.to_str().unwrap(),
        "--languages",
        "xquad.vi,xquad.es",
        "--batch-size",
        "4",
        "--on-error",
        "continue",
    ]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(fx.calls().is_empty());

    let config = load_config(&saved).unwrap();
    assert_eq!(
        config.languages,
        vec![LanguageCode::new("xquad.vi"), LanguageCode::new("xquad.es")]
    );
    assert_eq!(config.params.batch_size, 4);
    assert_eq!(config.params.device, "cuda");
    assert_eq!(config.on_error, FailurePolicy::Continue);
    assert_eq!(config.evaluator.program, "sh");
    assert_eq!(config.evaluator.script.as_deref(), Some(fx.stub.as_path()));
    assert_eq!(config.venv, None);
}

#[test]
fn dry_run_prints_commands_and_runs_nothing() {
    let fx = Fixture::new();
    let out = fx.run(&["--dry-run"]);
    assert!(out.status.success());

    let stdout = String::from_utf8_lossy(&out.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 12);
    assert!(lines[0].starts_with("sh "));
    assert!(lines[0].contains("--language xquad.en"));
    assert!(fx.calls().is_empty());
}

#[test]
fn missing_evaluator_exits_127() {
    let fx = Fixture::new();
    let out = Command::new(env!("CARGO_BIN_EXE_xquad-sweep"))
        .args(["--python", "no-such-evaluator-xyz", "--no-venv", "--workdir"])
        .arg(fx.root())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(127));
}

#[test]
fn missing_venv_is_a_setup_failure() {
    let fx = Fixture::new();
    let out = Command::new(env!("CARGO_BIN_EXE_xquad-sweep"))
        .args(["--venv", "venv", "--workdir"])
        .arg(fx.root())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(fx.calls().is_empty());
}

#[test]
fn config_file_resolves_workdir_and_activates_venv() {
    let fx = Fixture::new();
    let root = fx.root().canonicalize().unwrap();

    // venv/bin/python is the stub itself
    let bin = root.join("venv").join("bin");
    fs::create_dir_all(&bin).unwrap();
    let python = bin.join("python");
    fs::write(&python, STUB).unwrap();
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();

    let scripts = root.join("scripts").join("qa");
    fs::create_dir_all(&scripts).unwrap();
    let config_path = scripts.join("sweep.json");
    fs::write(
        &config_path,
        r#"// sweep used by the nightly job
{
  "evaluator": { "program": "python", "script": null },
  "languages": ["xquad.ar", "xquad.hi", "xquad.ru"],
  "working_dir": "../..",
  "venv": "venv",
  "params": { "batch_size": 16 }
}"#,
    )
    .unwrap();

    let report = xquad_sweep::sweep_from_file(&config_path).unwrap();
    assert_eq!(report.succeeded, 3);

    let calls = read_calls(&bin.join("calls.log"));
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| field(c, "--batch_size") == "16"));

    let env_log = fs::read_to_string(bin.join("env.log")).unwrap();
    let expected = format!("{}|{}", root.display(), root.join("venv").display());
    assert!(env_log.lines().all(|line| line == expected), "{env_log}");
}
