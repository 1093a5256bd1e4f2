use std::sync::mpsc::{self, Receiver, Sender};

use tracing::debug;

use crate::tools::{self, CancelToken, OutputLine};

use super::commands::{step_list, tool_command};
use super::types::{PipelineEvent, PipelineInput, RunReport, Step, StepResult, Summary};

/// Launch the lint pipeline on a background thread.
///
/// Returns a receiver that streams `PipelineEvent` values. The final event
/// is always either `Completed` or `Aborted`.
pub fn run_pipeline(input: PipelineInput, cancel: CancelToken) -> Receiver<PipelineEvent> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        run_inner(input, cancel, tx);
    });
    rx
}

fn run_inner(input: PipelineInput, cancel: CancelToken, tx: Sender<PipelineEvent>) {
    let cfg = &input.config;
    let mut steps: Vec<StepResult> = Vec::new();
    let mut total: usize = 0;
    let mut passed: usize = 0;
    let mut failed: usize = 0;
    let mut gate_failed = false;

    for step in step_list() {
        let _ = tx.send(PipelineEvent::StepStarted(step));
        debug!(
            tool = step.tool.as_str(),
            policy = step.policy.as_str(),
            "step started"
        );

        let cmd = tool_command(cfg, step.tool, &input.target_dir);
        let outcome = match run_tool(cmd, &cancel, step, &tx) {
            Ok(outcome) => outcome,
            Err(reason) => {
                // A binary that cannot be spawned at all aborts the run
                // outright, whatever the step's policy.
                let _ = tx.send(PipelineEvent::Aborted(reason));
                return;
            }
        };

        total += 1;
        if outcome.success {
            passed += 1;
        } else {
            failed += 1;
        }

        steps.push(StepResult {
            tool: step.tool,
            policy: step.policy,
            status: if outcome.success { "pass" } else { "fail" }.to_string(),
            log: outcome.log,
        });

        let _ = tx.send(PipelineEvent::StepFinished {
            step,
            success: outcome.success,
        });

        if cancel.is_cancelled() {
            let _ = tx.send(PipelineEvent::Aborted("Cancelled by user".into()));
            return;
        }

        if !outcome.success && step.policy.is_fatal() {
            gate_failed = true;
            break;
        }
    }

    let report = RunReport {
        target: input.target_dir.display().to_string(),
        outcome: if gate_failed { "fail" } else { "pass" }.to_string(),
        steps,
        summary: Summary {
            total,
            passed,
            failed,
        },
    };

    let _ = tx.send(PipelineEvent::Completed(report));
}

struct ToolOutcome {
    success: bool,
    log: String,
}

/// Run a single tool, draining its output channel and forwarding lines as
/// `PipelineEvent::Log`. A spawn failure comes back as `Err` with the reason.
fn run_tool(
    cmd: tools::ToolCommand,
    cancel: &CancelToken,
    step: Step,
    tx: &Sender<PipelineEvent>,
) -> Result<ToolOutcome, String> {
    let tool_rx = match tools::spawn(cmd, cancel.clone()) {
        Ok(rx) => rx,
        Err(e) => return Err(format!("{e:#}")),
    };

    let mut log = String::new();
    let mut success = false;

    for line in tool_rx {
        match line {
            OutputLine::Stdout(s) | OutputLine::Stderr(s) => {
                let _ = tx.send(PipelineEvent::Log {
                    step,
                    line: s.clone(),
                });
                log.push_str(&s);
                log.push('\n');
            }
            OutputLine::Done(result) => {
                success = result.success;
                if result.cancelled {
                    success = false;
                }
                // Prefer the runner's accumulated log if our line-by-line
                // accumulation missed anything.
                if log.is_empty() {
                    log = result.log;
                }
                break;
            }
        }
    }

    Ok(ToolOutcome { success, log })
}
