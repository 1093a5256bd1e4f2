use anyhow::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use lintrun::config;
use lintrun::pipeline::{self, PipelineEvent, PipelineInput, RunReport};
use lintrun::target;
use lintrun::tools::CancelToken;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("resolve current directory")?;
    let cfg = config::load(&cwd)?;
    let target_dir = target::validate(&cwd)?;

    let sources = target::python_sources(&target_dir);
    println!(
        "Checking {} ({} Python files)",
        target_dir.display(),
        sources.len()
    );

    let input = PipelineInput {
        config: cfg,
        target_dir,
    };
    let cancel = CancelToken::new();
    let rx = pipeline::run_pipeline(input, cancel);

    let mut report: Option<RunReport> = None;
    for event in rx {
        match event {
            PipelineEvent::StepStarted(step) => {
                println!("── {} ({}) ──", step.tool.as_str(), step.tool.role());
            }
            // Tool output passes through verbatim; it is never parsed.
            PipelineEvent::Log { line, .. } => println!("{line}"),
            PipelineEvent::StepFinished { step, success } => {
                let verdict = if success { "ok" } else { "findings" };
                println!("   {} → {verdict}", step.tool.as_str());
            }
            PipelineEvent::Completed(r) => {
                report = Some(r);
                break;
            }
            PipelineEvent::Aborted(reason) => bail!(reason),
        }
    }

    let report = report.context("pipeline ended without a final report")?;

    let json = serde_json::to_string_pretty(&report).context("serialize run report")?;
    std::fs::write(cwd.join("report.json"), json).context("write report.json")?;

    println!(
        "{} of {} steps passed",
        report.summary.passed, report.summary.total
    );

    if report.outcome != "pass" {
        bail!("formatting or import ordering failed — see the output above");
    }
    Ok(())
}
