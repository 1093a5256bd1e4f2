//! Sequential lint pipeline for the `app/` source tree.
//!
//! Runs `black`, `isort`, `flake8` and `mypy` in that fixed order. The first
//! two are correctness gates — a non-zero exit aborts the run. The last two
//! are advisory — their findings are reported but never fail the run.

pub mod config;
pub mod pipeline;
pub mod target;
pub mod tools;
