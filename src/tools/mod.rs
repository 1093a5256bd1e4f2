// External tool invocation — process spawning, streaming output, cancellation.

pub mod run;
pub mod types;

pub use run::spawn;
pub use types::{CancelToken, OutputLine, ToolCommand, ToolResult};
