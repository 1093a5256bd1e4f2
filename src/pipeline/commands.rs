use std::path::Path;
use std::time::Duration;

use crate::config::Config;
use crate::tools::ToolCommand;

use super::types::{Policy, Step, Tool};

/// Directories the import sorter must leave alone. Always passed, whether or
/// not they exist under the target.
pub const EXCLUDED_DIRS: [&str; 2] = [".history", "venv"];

/// The fixed step sequence: format, sort imports, style-check, type-check.
///
/// The first two are correctness gates — if the tree cannot even be
/// reformatted, something is structurally broken and the rest is pointless.
/// The last two are advisory: their findings never fail the run.
pub fn step_list() -> [Step; 4] {
    [
        Step {
            tool: Tool::Black,
            policy: Policy::Fatal,
        },
        Step {
            tool: Tool::Isort,
            policy: Policy::Fatal,
        },
        Step {
            tool: Tool::Flake8,
            policy: Policy::Advisory,
        },
        Step {
            tool: Tool::Mypy,
            policy: Policy::Advisory,
        },
    ]
}

/// Build the invocation for one tool against the target tree.
pub fn tool_command(cfg: &Config, tool: Tool, target: &Path) -> ToolCommand {
    match tool {
        Tool::Black => black_command(cfg, target),
        Tool::Isort => isort_command(cfg, target),
        Tool::Flake8 => flake8_command(cfg, target),
        Tool::Mypy => mypy_command(cfg, target),
    }
}

/// Build the `black` invocation. Rewrites files in place.
pub fn black_command(cfg: &Config, target: &Path) -> ToolCommand {
    ToolCommand {
        program: resolve_program(cfg, Tool::Black),
        args: vec![target.display().to_string()],
        timeout: Duration::from_secs(cfg.tool_timeout),
        log_path: None,
    }
}

/// Build the `isort` invocation. Rewrites files in place, skipping the
/// excluded directories.
pub fn isort_command(cfg: &Config, target: &Path) -> ToolCommand {
    let mut args = vec![target.display().to_string()];
    for dir in EXCLUDED_DIRS {
        args.extend(["--skip".to_string(), dir.to_string()]);
    }

    ToolCommand {
        program: resolve_program(cfg, Tool::Isort),
        args,
        timeout: Duration::from_secs(cfg.tool_timeout),
        log_path: None,
    }
}

/// Build the `flake8` invocation. Read-only.
pub fn flake8_command(cfg: &Config, target: &Path) -> ToolCommand {
    ToolCommand {
        program: resolve_program(cfg, Tool::Flake8),
        args: vec![target.display().to_string()],
        timeout: Duration::from_secs(cfg.tool_timeout),
        log_path: None,
    }
}

/// Build the `mypy` invocation. Read-only; resolves modules from explicit
/// package bases so a flat source tree without `__init__.py` files checks
/// cleanly.
pub fn mypy_command(cfg: &Config, target: &Path) -> ToolCommand {
    ToolCommand {
        program: resolve_program(cfg, Tool::Mypy),
        args: vec![
            target.display().to_string(),
            "--explicit-package-bases".to_string(),
        ],
        timeout: Duration::from_secs(cfg.tool_timeout),
        log_path: None,
    }
}

// Use the override path if configured, otherwise let PATH resolve the name.
fn resolve_program(cfg: &Config, tool: Tool) -> String {
    cfg.tool_overrides
        .get(tool.as_str())
        .cloned()
        .unwrap_or_else(|| tool.as_str().to_string())
}
