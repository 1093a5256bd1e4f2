//! Integration tests for the lint pipeline.
//!
//! The external tools are replaced by small shell scripts wired in through
//! `tool_overrides`, so these run anywhere with a POSIX shell.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use lintrun::config::Config;
use lintrun::pipeline::{PipelineEvent, PipelineInput, RunReport, Tool, run_pipeline};
use lintrun::tools::CancelToken;

const TOOLS: [Tool; 4] = [Tool::Black, Tool::Isort, Tool::Flake8, Tool::Mypy];

/// Create a work directory holding a tiny `app/` tree.
fn setup_workdir() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("failed to create tempdir");
    let app = dir.path().join("app");
    fs::create_dir(&app).expect("failed to create app dir");
    fs::write(app.join("main.py"), "print(\"hello\")\n").expect("failed to write main.py");
    (dir, app)
}

/// Install a fake tool that appends its argv to `<name>.argv` and exits with
/// `code`, and wire it into the config.
fn install_fake(dir: &Path, cfg: &mut Config, tool: Tool, code: i32) {
    let name = tool.as_str();
    let trace = dir.join(format!("{name}.argv"));
    let path = dir.join(name);
    let script = format!(
        "#!/bin/sh\necho \"$@\" >> \"{}\"\necho \"{name} output\"\nexit {code}\n",
        trace.display()
    );
    fs::write(&path, script).expect("failed to write fake tool");
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    cfg.tool_overrides
        .insert(name.to_string(), path.display().to_string());
}

fn config_with_fakes(dir: &Path, codes: [i32; 4]) -> Config {
    let mut cfg = Config::default();
    for (tool, code) in TOOLS.into_iter().zip(codes) {
        install_fake(dir, &mut cfg, tool, code);
    }
    cfg
}

/// One line per invocation of the fake tool, each holding its argv.
fn invocations(dir: &Path, tool: Tool) -> Vec<String> {
    let trace = dir.join(format!("{}.argv", tool.as_str()));
    match fs::read_to_string(trace) {
        Ok(contents) => contents.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

/// Collect all events from the pipeline receiver.
fn collect_events(rx: mpsc::Receiver<PipelineEvent>) -> Vec<PipelineEvent> {
    let mut events = Vec::new();
    while let Ok(ev) = rx.recv() {
        events.push(ev);
    }
    events
}

fn run(cfg: Config, app: PathBuf) -> Vec<PipelineEvent> {
    let input = PipelineInput {
        config: cfg,
        target_dir: app,
    };
    collect_events(run_pipeline(input, CancelToken::new()))
}

fn final_report(events: &[PipelineEvent]) -> &RunReport {
    match events.last().expect("expected at least one event") {
        PipelineEvent::Completed(report) => report,
        other => panic!("expected Completed, got: {other:?}"),
    }
}

fn started_tools(events: &[PipelineEvent]) -> Vec<Tool> {
    events
        .iter()
        .filter_map(|ev| match ev {
            PipelineEvent::StepStarted(step) => Some(step.tool),
            _ => None,
        })
        .collect()
}

#[test]
fn all_tools_passing_runs_every_step_in_order() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);

    let events = run(cfg, app);

    assert_eq!(
        started_tools(&events),
        vec![Tool::Black, Tool::Isort, Tool::Flake8, Tool::Mypy]
    );
    for tool in TOOLS {
        assert_eq!(
            invocations(dir.path(), tool).len(),
            1,
            "{} should run exactly once",
            tool.as_str()
        );
    }

    let report = final_report(&events);
    assert_eq!(report.outcome, "pass");
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.passed, 4);
    assert_eq!(report.summary.failed, 0);
}

#[test]
fn tool_output_is_streamed_as_log_events() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);

    let events = run(cfg, app);

    let logged: Vec<&str> = events
        .iter()
        .filter_map(|ev| match ev {
            PipelineEvent::Log { line, .. } => Some(line.as_str()),
            _ => None,
        })
        .collect();
    for tool in TOOLS {
        let expected = format!("{} output", tool.as_str());
        assert!(logged.contains(&expected.as_str()), "missing {expected:?}");
    }
}

#[test]
fn formatter_failure_aborts_the_rest() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [1, 0, 0, 0]);

    let events = run(cfg, app);

    assert_eq!(invocations(dir.path(), Tool::Black).len(), 1);
    for tool in [Tool::Isort, Tool::Flake8, Tool::Mypy] {
        assert!(
            invocations(dir.path(), tool).is_empty(),
            "{} must not run after a formatter failure",
            tool.as_str()
        );
    }

    let report = final_report(&events);
    assert_eq!(report.outcome, "fail");
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].status, "fail");
}

#[test]
fn import_sorter_failure_aborts_the_rest() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 1, 0, 0]);

    let events = run(cfg, app);

    assert!(invocations(dir.path(), Tool::Flake8).is_empty());
    assert!(invocations(dir.path(), Tool::Mypy).is_empty());

    let report = final_report(&events);
    assert_eq!(report.outcome, "fail");
    assert_eq!(report.steps.len(), 2);
    assert_eq!(report.steps[1].tool, Tool::Isort);
    assert_eq!(report.steps[1].status, "fail");
}

#[test]
fn style_findings_do_not_fail_the_run() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 0, 1, 0]);

    let events = run(cfg, app);

    // The type checker still runs after style findings.
    assert_eq!(invocations(dir.path(), Tool::Mypy).len(), 1);

    let report = final_report(&events);
    assert_eq!(report.outcome, "pass");
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.steps[2].status, "fail");
}

#[test]
fn type_findings_do_not_fail_the_run() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 0, 0, 1]);

    let events = run(cfg, app);

    let report = final_report(&events);
    assert_eq!(report.outcome, "pass");
    assert_eq!(report.summary.total, 4);
    assert_eq!(report.steps[3].tool, Tool::Mypy);
    assert_eq!(report.steps[3].status, "fail");
}

#[test]
fn import_sorter_always_receives_exclusions() {
    let (dir, app) = setup_workdir();
    // Neither excluded directory exists on disk.
    assert!(!app.join(".history").exists());
    assert!(!app.join("venv").exists());
    let cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);

    run(cfg, app.clone());

    let argv = invocations(dir.path(), Tool::Isort);
    assert_eq!(argv.len(), 1);
    assert!(argv[0].contains(&app.display().to_string()));
    assert!(argv[0].contains("--skip .history"));
    assert!(argv[0].contains("--skip venv"));
}

#[test]
fn type_checker_receives_package_bases_flag() {
    let (dir, app) = setup_workdir();
    let cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);

    run(cfg, app);

    let argv = invocations(dir.path(), Tool::Mypy);
    assert_eq!(argv.len(), 1);
    assert!(argv[0].contains("--explicit-package-bases"));
}

#[test]
fn missing_formatter_aborts_immediately() {
    let (dir, app) = setup_workdir();
    let mut cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);
    cfg.tool_overrides.insert(
        "black".into(),
        dir.path().join("no-such-black").display().to_string(),
    );

    let events = run(cfg, app);

    match events.last().expect("expected events") {
        PipelineEvent::Aborted(reason) => {
            assert!(reason.contains("no-such-black"), "reason: {reason}");
        }
        other => panic!("expected Aborted, got: {other:?}"),
    }
    assert!(invocations(dir.path(), Tool::Isort).is_empty());
}

#[test]
fn missing_advisory_tool_still_aborts() {
    let (dir, app) = setup_workdir();
    let mut cfg = config_with_fakes(dir.path(), [0, 0, 0, 0]);
    cfg.tool_overrides.insert(
        "mypy".into(),
        dir.path().join("no-such-mypy").display().to_string(),
    );

    let events = run(cfg, app);

    for tool in [Tool::Black, Tool::Isort, Tool::Flake8] {
        assert_eq!(invocations(dir.path(), tool).len(), 1);
    }
    assert!(matches!(
        events.last().expect("expected events"),
        PipelineEvent::Aborted(_)
    ));
}
