//! Core building blocks: run parameters, sweep configuration, the scoped
//! environment, per-language invocations, the evaluator seam and the sweep
//! loop itself. The high-level `api` module wires them together.
pub mod config;
pub mod environment;
pub mod evaluator;
pub mod invocation;
pub mod params;
pub mod sweep;
